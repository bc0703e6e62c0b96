use super::physics::RapierState;
use super::systems::{
    ray_hit_obb, ray_sphere_intersection, shape_local_bounds, sys_step_rapier, sys_sync_from_rapier,
    TimeDelta,
};
use super::types::{
    GroundPlane, ObjectTag, RapierBody, RapierCollider, Selectable, VisualMaterial, VisualShape,
    VisualTransform,
};
use crate::config::EngineConfig;
use crate::scene::{ObjectId, PhysicsProperties, Scene, SceneObject, Shape, TransformData};
use bevy_ecs::prelude::{Entity, Schedule, With, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use glam::{Quat, Vec3};
use std::collections::{BTreeSet, HashMap};

const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(50.0, 0.25, 50.0);

/// The synchronizer. Owns the one visual world and, through it, the one
/// physics world; maintains a 1:1 pairing between a rigid body + collider and
/// a visual node for every object of the current scene. All reads and
/// mutations of either representation go through these entry points.
pub struct StageWorld {
    pub world: World,
    schedule_fixed: Schedule,
    pairs: HashMap<ObjectId, Entity>,
    collider_epsilon: f32,
    ground: Entity,
}

impl StageWorld {
    pub fn new(config: &EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));

        let mut rapier = RapierState::new(config.gravity.into());
        let ground_center = Vec3::new(0.0, -GROUND_HALF_EXTENTS.y, 0.0);
        let (ground_body, ground_collider) = rapier.insert_ground(ground_center, GROUND_HALF_EXTENTS);
        let ground = world
            .spawn((
                VisualTransform {
                    translation: ground_center,
                    rotation: Quat::IDENTITY,
                    scale: GROUND_HALF_EXTENTS * 2.0,
                },
                VisualMaterial::new(Vec3::new(0.35, 0.4, 0.35)),
                VisualShape(Shape::Box),
                GroundPlane,
                RapierBody { handle: ground_body },
                RapierCollider { handle: ground_collider },
            ))
            .id();
        world.insert_resource(rapier);

        let mut schedule_fixed = Schedule::default();
        schedule_fixed.add_systems((sys_step_rapier, sys_sync_from_rapier).chain());

        Self {
            world,
            schedule_fixed,
            pairs: HashMap::new(),
            collider_epsilon: config.collider_epsilon,
            ground,
        }
    }

    /// Rebuilds the physics/visual pairing from a scene. Clears first, so
    /// loading the same scene twice yields the same pairing rather than
    /// duplicated bodies.
    pub fn load_scene(&mut self, scene: &Scene) {
        self.clear();
        for object in scene.objects.values() {
            self.spawn_object(object);
        }
        log::debug!("stage loaded {} paired objects", self.pairs.len());
    }

    pub fn spawn_object(&mut self, object: &SceneObject) -> Entity {
        if self.pairs.contains_key(&object.id) {
            self.remove_object(&object.id);
        }
        let props = object.physics.sanitized();
        let (position, _, scale) = object.transform.components();
        let rotation = object.transform.rotation_quat();
        let shape = object.visual.shape;
        let epsilon = self.collider_epsilon;
        let (body_handle, collider_handle, degraded) = {
            let mut rapier = self.world.resource_mut::<RapierState>();
            rapier.spawn_object_body(position, rotation, shape, scale, &props, epsilon)
        };
        if degraded {
            log::warn!("object {}: unrecognized shape, falling back to a unit box collider", object.id);
        }
        let entity = self
            .world
            .spawn((
                ObjectTag::new(object.id),
                VisualTransform { translation: position, rotation, scale },
                VisualMaterial::new(object.visual.color.into()),
                VisualShape(shape),
                Selectable,
                RapierBody { handle: body_handle },
                RapierCollider { handle: collider_handle },
            ))
            .id();
        self.pairs.insert(object.id, entity);
        entity
    }

    /// Removes the pair for an object. Physics body, collider, and visual
    /// node all go in the same call, so no caller can observe the object in
    /// one store but not the others.
    pub fn remove_object(&mut self, id: &ObjectId) -> bool {
        let Some(entity) = self.pairs.remove(id) else {
            return false;
        };
        if let Some(handle) = self.world.get::<RapierBody>(entity).map(|b| b.handle) {
            self.world.resource_mut::<RapierState>().remove_body(handle);
        }
        self.world.despawn(entity);
        true
    }

    pub fn clear(&mut self) {
        let ids: Vec<ObjectId> = self.pairs.keys().copied().collect();
        for id in ids {
            self.remove_object(&id);
        }
    }

    /// One fixed physics tick followed by the physics -> visual copy. Only
    /// the running lifecycle state calls this.
    pub fn step(&mut self, dt: f32) {
        self.world.resource_mut::<TimeDelta>().0 = dt;
        self.schedule_fixed.run(&mut self.world);
    }

    /// Current transform of every paired object, for folding back into the
    /// canonical scene model after a step.
    pub fn paired_transforms(&mut self) -> Vec<(ObjectId, TransformData)> {
        let mut query = self.world.query::<(&ObjectTag, &VisualTransform)>();
        query.iter(&self.world).map(|(tag, transform)| (tag.id, transform.to_data())).collect()
    }

    /// The visual -> physics half of a user-driven transform edit: writes the
    /// pose into both representations and resets the body's velocities.
    /// Non-finite input is rejected and the previous value retained.
    pub fn apply_object_transform(&mut self, id: &ObjectId, transform: &TransformData) -> bool {
        if !transform.is_finite() {
            log::warn!("object {id}: rejecting non-finite transform edit");
            return false;
        }
        let Some(&entity) = self.pairs.get(id) else {
            return false;
        };
        let (position, _, scale) = transform.components();
        let rotation = transform.rotation_quat();
        let mut scale_changed = false;
        if let Some(mut visual) = self.world.get_mut::<VisualTransform>(entity) {
            scale_changed = (visual.scale - scale).length_squared() > f32::EPSILON;
            visual.translation = position;
            visual.rotation = rotation;
            visual.scale = scale;
        }
        let shape = self.world.get::<VisualShape>(entity).map(|s| s.0).unwrap_or_default();
        let body = self.world.get::<RapierBody>(entity).map(|b| b.handle);
        let collider = self.world.get::<RapierCollider>(entity).map(|c| c.handle);
        let epsilon = self.collider_epsilon;
        let mut rapier = self.world.resource_mut::<RapierState>();
        if let Some(handle) = body {
            rapier.write_body_pose(handle, position, rotation);
        }
        if scale_changed {
            if let Some(handle) = collider {
                rapier.resize_collider(handle, shape, scale, epsilon);
            }
        }
        true
    }

    pub fn apply_object_physics(&mut self, id: &ObjectId, props: &PhysicsProperties) -> bool {
        let Some(&entity) = self.pairs.get(id) else {
            return false;
        };
        let props = props.sanitized();
        let body = self.world.get::<RapierBody>(entity).map(|b| b.handle);
        let collider = self.world.get::<RapierCollider>(entity).map(|c| c.handle);
        if let (Some(body), Some(collider)) = (body, collider) {
            self.world.resource_mut::<RapierState>().set_body_properties(body, collider, &props);
            true
        } else {
            false
        }
    }

    pub fn set_object_color(&mut self, id: &ObjectId, color: Vec3) -> bool {
        let Some(&entity) = self.pairs.get(id) else {
            return false;
        };
        if let Some(mut material) = self.world.get_mut::<VisualMaterial>(entity) {
            material.color = color;
            true
        } else {
            false
        }
    }

    /// Highlight exactly the given set; every other node is dimmed back.
    pub fn set_highlighted(&mut self, ids: &BTreeSet<ObjectId>) {
        let mut query = self.world.query::<(&ObjectTag, &mut VisualMaterial)>();
        for (tag, mut material) in query.iter_mut(&mut self.world) {
            material.highlighted = ids.contains(&tag.id);
        }
    }

    /// Nearest-hit ray pick over selectable nodes. The ground plane carries
    /// no `Selectable` marker and is skipped; a miss is not an error.
    pub fn pick(&mut self, origin: Vec3, direction: Vec3) -> Option<ObjectId> {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() <= f32::EPSILON {
            return None;
        }
        let mut query = self
            .world
            .query_filtered::<(&ObjectTag, &VisualTransform, &VisualShape), With<Selectable>>();
        let mut closest: Option<(ObjectId, f32)> = None;
        for (tag, transform, shape) in query.iter(&self.world) {
            let hit = match shape.0 {
                Shape::Sphere => {
                    let radius = 0.5
                        * transform
                            .scale
                            .x
                            .abs()
                            .max(transform.scale.y.abs())
                            .max(transform.scale.z.abs())
                            .max(0.0001);
                    ray_sphere_intersection(origin, dir, transform.translation, radius)
                }
                other => {
                    let (min, max) = shape_local_bounds(other);
                    ray_hit_obb(origin, dir, transform, min, max)
                }
            };
            if let Some(distance) = hit {
                match closest {
                    Some((_, best)) if distance >= best => {}
                    _ => closest = Some((tag.id, distance)),
                }
            }
        }
        closest.map(|(id, _)| id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.pairs.contains_key(id)
    }

    pub fn object_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn visual_object_ids(&mut self) -> BTreeSet<ObjectId> {
        let mut query = self.world.query::<(&ObjectTag, &VisualTransform)>();
        query.iter(&self.world).map(|(tag, _)| tag.id).collect()
    }

    pub fn physics_object_ids(&mut self) -> BTreeSet<ObjectId> {
        let mut out = BTreeSet::new();
        let mut query = self.world.query::<(&ObjectTag, &RapierBody)>();
        let mut tagged = Vec::new();
        for (tag, body) in query.iter(&self.world) {
            tagged.push((tag.id, body.handle));
        }
        let rapier = self.world.resource::<RapierState>();
        for (id, handle) in tagged {
            if rapier.body(handle).is_some() {
                out.insert(id);
            }
        }
        out
    }

    pub fn visual_transform(&self, id: &ObjectId) -> Option<TransformData> {
        let entity = *self.pairs.get(id)?;
        self.world.get::<VisualTransform>(entity).map(|t| t.to_data())
    }

    pub fn body_transform(&self, id: &ObjectId) -> Option<TransformData> {
        let entity = *self.pairs.get(id)?;
        let handle = self.world.get::<RapierBody>(entity)?.handle;
        let scale = self.world.get::<VisualTransform>(entity)?.scale;
        let (position, rotation) = self.world.resource::<RapierState>().body_pose(handle)?;
        let (x, y, z) = rotation.to_euler(glam::EulerRot::XYZ);
        Some(TransformData::from_components(position, Vec3::new(x, y, z), scale))
    }

    pub fn is_highlighted(&self, id: &ObjectId) -> Option<bool> {
        let entity = *self.pairs.get(id)?;
        self.world.get::<VisualMaterial>(entity).map(|m| m.highlighted)
    }

    pub fn ground_entity(&self) -> Entity {
        self.ground
    }
}
