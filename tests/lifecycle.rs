use diorama::config::EngineConfig;
use diorama::events::EditorEvent;
use diorama::scene::{ObjectId, Scene, SceneObject, Shape};
use diorama::{Editor, SimState};

fn loaded_editor() -> (Editor, ObjectId) {
    let mut scene = Scene::default();
    let mut object = SceneObject::new(Shape::Box);
    object.transform.position.y = 2.0;
    let id = scene.insert_object(object);
    let mut editor = Editor::new(EngineConfig::default());
    editor.load_scene(scene);
    (editor, id)
}

#[test]
fn editor_starts_idle_until_first_scene_load() {
    let mut editor = Editor::new(EngineConfig::default());
    assert_eq!(editor.state(), SimState::Idle);
    editor.start_simulation();
    assert_eq!(editor.state(), SimState::Idle, "start must be ignored with no scene loaded");

    editor.load_scene(Scene::default());
    assert_eq!(editor.state(), SimState::Paused);
}

#[test]
fn gizmo_never_attaches_while_running() {
    let (mut editor, id) = loaded_editor();
    editor.select_object(Some(id));
    assert_eq!(editor.gizmo_target(), Some(id), "paused sole selection attaches");

    editor.start_simulation();
    assert_eq!(editor.state(), SimState::Running);
    assert_eq!(editor.gizmo_target(), None, "running must detach the gizmo");
    for _ in 0..5 {
        editor.update();
        assert_eq!(editor.gizmo_target(), None);
    }

    editor.pause_simulation();
    assert_eq!(editor.state(), SimState::Paused);
    assert_eq!(editor.gizmo_target(), Some(id), "pausing re-attaches to the current selection");
}

#[test]
fn multi_selection_does_not_attach_a_gizmo() {
    let (mut editor, id) = loaded_editor();
    let second = editor.add_object(SceneObject::new(Shape::Sphere));
    editor.select_object(Some(id));
    editor.toggle_selection(second);
    assert_eq!(editor.scene().selected_objects.len(), 2);
    assert_eq!(editor.gizmo_target(), None);
}

#[test]
fn reset_restores_the_initially_loaded_snapshot() {
    let (mut editor, id) = loaded_editor();
    let initial = serde_json::to_value(editor.scene()).expect("serializes");

    editor.start_simulation();
    for _ in 0..120 {
        editor.update();
    }
    let fallen = editor.scene().objects[&id].transform.position.y;
    assert!(fallen < 2.0, "simulation should have moved the box");

    editor.reset_simulation();
    assert_eq!(editor.state(), SimState::Paused);
    assert_eq!(serde_json::to_value(editor.scene()).expect("serializes"), initial);
    let visual = editor.stage_mut().visual_transform(&id).expect("paired node");
    assert!((visual.position.y - 2.0).abs() < 1e-6);
}

#[test]
fn state_changes_are_reported_to_the_shell() {
    let (mut editor, _) = loaded_editor();
    editor.drain_events();

    editor.start_simulation();
    let events = editor.drain_events();
    assert!(events.iter().any(|e| matches!(e, EditorEvent::SimStateChanged { state: SimState::Running })));

    editor.pause_simulation();
    let events = editor.drain_events();
    assert!(events.iter().any(|e| matches!(e, EditorEvent::SimStateChanged { state: SimState::Paused })));
}

#[test]
fn selection_input_is_accepted_in_both_states() {
    let (mut editor, id) = loaded_editor();
    editor.start_simulation();
    editor.select_object(Some(id));
    assert_eq!(editor.scene().selected_object, Some(id));
    editor.select_object(None);
    assert_eq!(editor.scene().selected_object, None);
}
