use diorama::camera3d::{Camera3D, Viewport};
use diorama::config::EngineConfig;
use diorama::scene::{ObjectId, Scene, SceneObject, Shape};
use diorama::stage::StageWorld;
use diorama::Editor;
use glam::{Vec2, Vec3};

const VIEWPORT: Viewport = Viewport { width: 800, height: 600 };

fn picking_camera() -> Camera3D {
    Camera3D::new(Vec3::new(0.0, 0.5, 10.0), Vec3::new(0.0, 0.5, 0.0), 60.0_f32.to_radians(), 0.1, 500.0)
}

fn box_at(x: f32) -> SceneObject {
    let mut object = SceneObject::new(Shape::Box);
    object.transform.position.x = x;
    object.transform.position.y = 0.5;
    object
}

fn editor_with_two_boxes() -> (Editor, ObjectId, ObjectId) {
    let mut scene = Scene::default();
    let a = scene.insert_object(box_at(0.0));
    let b = scene.insert_object(box_at(3.0));
    let mut editor = Editor::new(EngineConfig::default());
    editor.load_scene(scene);
    editor.set_camera(picking_camera());
    editor.set_viewport(VIEWPORT);
    (editor, a, b)
}

fn screen_of(editor: &Editor, world: Vec3) -> Vec2 {
    editor.camera().project_point(world, VIEWPORT).expect("point projects into the viewport")
}

#[test]
fn plain_click_replaces_selection_and_miss_clears_it() {
    let (mut editor, a, b) = editor_with_two_boxes();

    editor.pointer_pressed(screen_of(&editor, Vec3::new(0.0, 0.5, 0.0)), false);
    assert_eq!(editor.scene().selected_object, Some(a));

    editor.pointer_pressed(screen_of(&editor, Vec3::new(3.0, 0.5, 0.0)), false);
    assert_eq!(editor.scene().selected_object, Some(b), "plain click replaces the selection");

    editor.pointer_pressed(Vec2::new(400.0, 40.0), false);
    assert_eq!(editor.scene().selected_object, None, "a miss clears the selection");
    assert!(editor.scene().selected_objects.is_empty());
}

#[test]
fn modifier_click_toggles_multi_selection() {
    let (mut editor, a, b) = editor_with_two_boxes();

    editor.pointer_pressed(screen_of(&editor, Vec3::new(0.0, 0.5, 0.0)), true);
    editor.pointer_pressed(screen_of(&editor, Vec3::new(3.0, 0.5, 0.0)), true);
    assert!(editor.scene().selected_objects.contains(&a));
    assert!(editor.scene().selected_objects.contains(&b));
    assert_eq!(editor.scene().selected_object, None, "two selected objects have no sole selection");

    editor.pointer_pressed(screen_of(&editor, Vec3::new(0.0, 0.5, 0.0)), true);
    assert!(!editor.scene().selected_objects.contains(&a), "modifier click toggles membership off");
    assert_eq!(editor.scene().selected_object, Some(b));

    editor.pointer_pressed(Vec2::new(400.0, 40.0), true);
    assert_eq!(editor.scene().selected_object, Some(b), "a modifier miss leaves the selection alone");
}

#[test]
fn ground_plane_is_not_pickable() {
    let mut stage = StageWorld::new(&EngineConfig::default());
    stage.load_scene(&Scene::default());
    // Straight down onto the slab, away from any object: the only thing the
    // ray can meet is the ground, and the ground must not pick.
    let picked = stage.pick(Vec3::new(10.0, 5.0, 10.0), Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(picked, None);

    let (mut editor, a, _) = editor_with_two_boxes();
    editor.select_object(Some(a));
    editor.pointer_pressed(Vec2::new(400.0, 590.0), false);
    assert_eq!(editor.scene().selected_object, None, "a ground-only ray clears the selection");
}

#[test]
fn pick_returns_the_nearest_hit() {
    let mut scene = Scene::default();
    let far = scene.insert_object(box_at(0.0));
    let mut sphere = SceneObject::new(Shape::Sphere);
    sphere.transform.position.y = 0.5;
    sphere.transform.position.z = 3.0;
    let near = scene.insert_object(sphere);

    let mut stage = StageWorld::new(&EngineConfig::default());
    stage.load_scene(&scene);
    let picked = stage.pick(Vec3::new(0.0, 0.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(picked, Some(near));
    assert_ne!(picked, Some(far));
}

#[test]
fn selection_highlights_exactly_the_selected_set() {
    let (mut editor, a, b) = editor_with_two_boxes();
    editor.select_object(Some(a));
    assert_eq!(editor.stage_mut().is_highlighted(&a), Some(true));
    assert_eq!(editor.stage_mut().is_highlighted(&b), Some(false));

    editor.select_object(None);
    assert_eq!(editor.stage_mut().is_highlighted(&a), Some(false));
}

#[test]
fn translate_drag_moves_object_through_both_worlds() {
    let (mut editor, a, _) = editor_with_two_boxes();
    editor.select_object(Some(a));
    let center_screen = screen_of(&editor, Vec3::new(0.0, 0.5, 0.0));
    let before = editor.scene().objects[&a].transform;

    editor.pointer_pressed(center_screen, false);
    editor.pointer_dragged(center_screen + Vec2::new(60.0, 0.0), false);
    editor.pointer_released();

    let after = editor.scene().objects[&a].transform;
    assert!(after.position.x > before.position.x, "drag toward screen right moves along +x");
    let visual = editor.stage_mut().visual_transform(&a).expect("paired node");
    assert!((visual.position.x - after.position.x).abs() < 1e-5, "visual node tracks the edit");
    let body = editor.stage_mut().body_transform(&a).expect("paired body");
    assert!((body.position.x - after.position.x).abs() < 1e-5, "physics body tracks the edit");
    assert_eq!(editor.scene().selected_object, Some(a), "dragging never changes the selection");
}

#[test]
fn drag_start_snapshots_so_undo_reverts_the_whole_drag() {
    let (mut editor, a, _) = editor_with_two_boxes();
    editor.select_object(Some(a));
    let center_screen = screen_of(&editor, Vec3::new(0.0, 0.5, 0.0));
    let before = editor.scene().objects[&a].transform;

    editor.pointer_pressed(center_screen, false);
    editor.pointer_dragged(center_screen + Vec2::new(40.0, 10.0), false);
    editor.pointer_dragged(center_screen + Vec2::new(90.0, 25.0), false);
    editor.pointer_released();
    assert_ne!(editor.scene().objects[&a].transform, before);

    assert!(editor.undo());
    assert_eq!(editor.scene().objects[&a].transform, before);
}

#[test]
fn drag_while_running_edits_nothing() {
    let (mut editor, a, _) = editor_with_two_boxes();
    editor.select_object(Some(a));
    editor.start_simulation();
    let center_screen = screen_of(&editor, Vec3::new(0.0, 0.5, 0.0));
    let before = editor.scene().objects[&a].transform;

    editor.pointer_pressed(center_screen, false);
    editor.pointer_dragged(center_screen + Vec2::new(80.0, 0.0), false);
    editor.pointer_released();

    assert_eq!(editor.scene().objects[&a].transform, before, "no gizmo edit may land while running");
}
