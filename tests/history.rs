use diorama::config::EngineConfig;
use diorama::scene::{RenderQuality, Scene, SceneObject, Shape};
use diorama::Editor;

fn loaded_editor() -> Editor {
    let mut scene = Scene::default();
    let mut object = SceneObject::new(Shape::Box);
    object.transform.position.y = 1.0;
    scene.insert_object(object);
    let mut editor = Editor::new(EngineConfig::default());
    editor.load_scene(scene);
    editor
}

fn scene_value(editor: &Editor) -> serde_json::Value {
    serde_json::to_value(editor.scene()).expect("scene serializes")
}

#[test]
fn undo_then_redo_restores_each_state_bit_for_bit() {
    let mut editor = loaded_editor();
    let first = *editor.scene().objects.keys().next().expect("seed object");
    editor.select_object(Some(first));

    let initial = scene_value(&editor);
    let mut states = Vec::new();

    editor.add_object(SceneObject::new(Shape::Sphere));
    states.push(scene_value(&editor));
    editor.set_narrative("a quiet stack of crates".to_string());
    states.push(scene_value(&editor));
    editor.set_render_quality(RenderQuality::High);
    states.push(scene_value(&editor));
    editor.duplicate_selected().expect("sole selection duplicates");
    states.push(scene_value(&editor));

    let n = states.len();
    for i in (0..n - 1).rev() {
        assert!(editor.undo(), "undo {i} available");
        assert_eq!(scene_value(&editor), states[i], "undo should land on the prior state");
    }
    assert!(editor.undo(), "final undo to the initial state");
    assert_eq!(scene_value(&editor), initial);
    assert!(!editor.can_undo());

    for state in &states {
        assert!(editor.redo(), "redo available");
        assert_eq!(&scene_value(&editor), state, "redo should land on the recorded state");
    }
    assert!(!editor.can_redo());
}

#[test]
fn undo_with_empty_history_is_a_noop() {
    let mut editor = loaded_editor();
    let before = scene_value(&editor);
    assert!(!editor.undo());
    assert!(!editor.redo());
    assert_eq!(scene_value(&editor), before);
}

#[test]
fn history_is_bounded_to_fifty_snapshots() {
    let mut editor = loaded_editor();
    for i in 0..60 {
        editor.set_narrative(format!("draft {i}"));
    }
    let mut undos = 0;
    while editor.undo() {
        undos += 1;
    }
    assert_eq!(undos, 50, "only the most recent fifty snapshots survive");
}

#[test]
fn new_mutation_clears_the_redo_stack() {
    let mut editor = loaded_editor();
    editor.set_narrative("one".to_string());
    editor.set_narrative("two".to_string());
    assert!(editor.undo());
    assert!(editor.can_redo());
    editor.set_narrative("three".to_string());
    assert!(!editor.can_redo());
}

#[test]
fn undo_reloads_the_stage_against_the_restored_scene() {
    let mut editor = loaded_editor();
    let added = editor.add_object(SceneObject::new(Shape::Cylinder));
    assert!(editor.stage_mut().contains(&added));
    assert!(editor.undo());
    assert!(!editor.stage_mut().contains(&added), "stage must be re-run against the restored scene");
    assert!(editor.redo());
    assert!(editor.stage_mut().contains(&added));
}
