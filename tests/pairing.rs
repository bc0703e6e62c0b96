use diorama::config::EngineConfig;
use diorama::scene::{Scene, SceneObject, Shape};
use diorama::stage::StageWorld;
use std::collections::BTreeSet;

fn sample_scene() -> Scene {
    let mut scene = Scene::default();
    for (i, shape) in [Shape::Box, Shape::Sphere, Shape::Cylinder].into_iter().enumerate() {
        let mut object = SceneObject::new(shape);
        object.transform.position.x = i as f32 * 2.0;
        object.transform.position.y = 1.0;
        scene.insert_object(object);
    }
    scene
}

#[test]
fn load_scene_pairs_every_object() {
    let mut stage = StageWorld::new(&EngineConfig::default());
    let scene = sample_scene();
    stage.load_scene(&scene);

    let expected: BTreeSet<_> = scene.objects.keys().copied().collect();
    assert_eq!(stage.visual_object_ids(), expected);
    assert_eq!(stage.physics_object_ids(), expected);
    assert_eq!(stage.object_count(), scene.objects.len());
}

#[test]
fn reloading_the_same_scene_is_idempotent() {
    let mut stage = StageWorld::new(&EngineConfig::default());
    let scene = sample_scene();
    stage.load_scene(&scene);
    stage.load_scene(&scene);

    let expected: BTreeSet<_> = scene.objects.keys().copied().collect();
    assert_eq!(stage.object_count(), scene.objects.len());
    assert_eq!(stage.visual_object_ids(), expected);
    assert_eq!(stage.physics_object_ids(), expected);
}

#[test]
fn unknown_shape_degrades_but_still_pairs() {
    let json = r#"{
        "objects": {
            "0b0e7a5c-4f7a-4c86-9d4e-0d9f4d9f4d9f": {
                "id": "0b0e7a5c-4f7a-4c86-9d4e-0d9f4d9f4d9f",
                "transform": { "position": { "x": 0.0, "y": 2.0, "z": 0.0 } },
                "visual": { "shape": "torus" }
            }
        }
    }"#;
    let scene: Scene = serde_json::from_str(json).expect("scene with unknown shape parses");
    let object = scene.objects.values().next().expect("one object");
    assert_eq!(object.visual.shape, Shape::Unknown);

    let mut stage = StageWorld::new(&EngineConfig::default());
    stage.load_scene(&scene);
    assert_eq!(stage.object_count(), 1);
    assert!(stage.contains(&object.id));
}

#[test]
fn zero_volume_scale_loads_without_degenerate_collider() {
    let mut scene = Scene::default();
    let mut object = SceneObject::new(Shape::Box);
    object.transform.scale.x = 0.0;
    object.transform.scale.y = 0.0;
    object.transform.scale.z = 0.0;
    let id = scene.insert_object(object);

    let mut stage = StageWorld::new(&EngineConfig::default());
    stage.load_scene(&scene);
    assert!(stage.contains(&id));
    assert!(stage.physics_object_ids().contains(&id));
}

#[test]
fn clear_removes_every_pair() {
    let mut stage = StageWorld::new(&EngineConfig::default());
    stage.load_scene(&sample_scene());
    stage.clear();
    assert_eq!(stage.object_count(), 0);
    assert!(stage.visual_object_ids().is_empty());
    assert!(stage.physics_object_ids().is_empty());
}
