use crate::scene::{PhysicsProperties, Shape};
use bevy_ecs::prelude::Resource;
use glam::{Quat, Vec3};
use rapier3d::na::Quaternion;
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryPipeline,
    Real, RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Rotation, SharedShape, Vector,
};

/// The single physics world. Owns every rapier set; nothing outside this
/// module touches rapier types directly.
#[derive(Resource)]
pub struct RapierState {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl RapierState {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vec_to_rapier(gravity),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Static ground slab. Its top face sits at `center.y + half.y`.
    pub fn insert_ground(&mut self, center: Vec3, half: Vec3) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::fixed().translation(vec_to_rapier(center)).build();
        let body_handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .friction(0.8)
            .restitution(0.4)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle)
    }

    /// Dynamic body + collider for one authored object. Properties are
    /// expected pre-sanitized; `degraded` reports an unknown shape that fell
    /// back to a unit box so the caller can log it with the object id.
    pub fn spawn_object_body(
        &mut self,
        position: Vec3,
        rotation: Quat,
        shape: Shape,
        scale: Vec3,
        props: &PhysicsProperties,
        epsilon: f32,
    ) -> (RigidBodyHandle, ColliderHandle, bool) {
        let body = RigidBodyBuilder::dynamic().translation(vec_to_rapier(position)).build();
        let body_handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get_mut(body_handle) {
            body.set_rotation(quat_to_rapier(rotation), true);
            body.set_additional_mass(props.mass, true);
            body.wake_up(true);
        }
        let (shared, degraded) = collider_for_shape(shape, scale, epsilon);
        let collider = ColliderBuilder::new(shared)
            .friction(props.friction)
            .restitution(props.restitution)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle, degraded)
    }

    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        let _ = self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn resize_collider(&mut self, handle: ColliderHandle, shape: Shape, scale: Vec3, epsilon: f32) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            let (shared, _) = collider_for_shape(shape, scale, epsilon);
            collider.set_shape(shared);
        }
    }

    /// Pushes a user-driven pose edit into a body, zeroing its velocities so
    /// the solver does not fight the manual edit on the next tick.
    pub fn write_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vec_to_rapier(position), true);
            body.set_rotation(quat_to_rapier(rotation), true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
            body.wake_up(true);
        }
    }

    pub fn set_body_properties(
        &mut self,
        body: RigidBodyHandle,
        collider: ColliderHandle,
        props: &PhysicsProperties,
    ) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.set_additional_mass(props.mass, true);
        }
        if let Some(collider) = self.colliders.get_mut(collider) {
            collider.set_friction(props.friction);
            collider.set_restitution(props.restitution);
        }
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.bodies.get(handle)?;
        Some((vec_from_rapier(body.translation()), quat_from_rapier(body.rotation())))
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let hooks = ();
        let events = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );
        self.query_pipeline.update(&self.colliders);
    }
}

/// Collider primitive sized from the object scale, half-extents clamped to a
/// small positive epsilon so a zero-volume scale never reaches the solver.
/// Unknown shapes degrade to a unit box.
pub fn collider_for_shape(shape: Shape, scale: Vec3, epsilon: f32) -> (SharedShape, bool) {
    let epsilon = epsilon.max(f32::EPSILON);
    let half = Vec3::new(
        (scale.x.abs() * 0.5).max(epsilon),
        (scale.y.abs() * 0.5).max(epsilon),
        (scale.z.abs() * 0.5).max(epsilon),
    );
    match shape {
        Shape::Box => (SharedShape::cuboid(half.x, half.y, half.z), false),
        Shape::Sphere => {
            let radius = half.x.max(half.y).max(half.z);
            (SharedShape::ball(radius), false)
        }
        Shape::Cylinder => {
            let radius = half.x.max(half.z);
            (SharedShape::cylinder(half.y, radius), false)
        }
        Shape::Unknown => (SharedShape::cuboid(0.5, 0.5, 0.5), true),
    }
}

fn vec_to_rapier(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn vec_from_rapier(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn quat_to_rapier(q: Quat) -> Rotation<Real> {
    Rotation::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn quat_from_rapier(q: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(q.coords.x, q.coords.y, q.coords.z, q.coords.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_volume_scale_is_clamped() {
        let (shape, degraded) = collider_for_shape(Shape::Box, Vec3::ZERO, 1e-3);
        assert!(!degraded);
        let cuboid = shape.as_cuboid().expect("box collider");
        assert!(cuboid.half_extents.x >= 1e-3);
        assert!(cuboid.half_extents.y >= 1e-3);
        assert!(cuboid.half_extents.z >= 1e-3);
    }

    #[test]
    fn unknown_shape_degrades_to_unit_box() {
        let (shape, degraded) = collider_for_shape(Shape::Unknown, Vec3::splat(3.0), 1e-3);
        assert!(degraded);
        let cuboid = shape.as_cuboid().expect("fallback cuboid");
        assert_eq!(cuboid.half_extents.x, 0.5);
    }

    #[test]
    fn quat_round_trips_through_rapier() {
        let q = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -0.7, 1.1);
        let back = quat_from_rapier(&quat_to_rapier(q));
        assert!((q.dot(back)).abs() > 0.9999);
    }
}
