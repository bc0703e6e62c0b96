use crate::scene::{ObjectId, Shape, TransformData};
use bevy_ecs::prelude::*;
use glam::{EulerRot, Quat, Vec3};
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

/// Derived copy of an object's transform held by the visual node. Rotation is
/// kept as a quaternion; the canonical Euler form lives in the scene model.
#[derive(Component, Clone, Copy)]
pub struct VisualTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for VisualTransform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl VisualTransform {
    pub fn from_data(data: &TransformData) -> Self {
        let (position, _, scale) = data.components();
        Self { translation: position, rotation: data.rotation_quat(), scale }
    }

    pub fn to_data(&self) -> TransformData {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        TransformData::from_components(self.translation, Vec3::new(x, y, z), self.scale)
    }
}

#[derive(Component, Clone, Copy)]
pub struct ObjectTag {
    pub id: ObjectId,
}

impl ObjectTag {
    pub fn new(id: ObjectId) -> Self {
        Self { id }
    }
}

#[derive(Component, Clone, Copy)]
pub struct VisualShape(pub Shape);

const HIGHLIGHT_BOOST: f32 = 0.25;

/// Display material of a visual node. Selection highlighting brightens the
/// base color without touching the authored value.
#[derive(Component, Clone, Copy)]
pub struct VisualMaterial {
    pub color: Vec3,
    pub highlighted: bool,
}

impl VisualMaterial {
    pub fn new(color: Vec3) -> Self {
        Self { color, highlighted: false }
    }

    pub fn display_color(&self) -> Vec3 {
        if self.highlighted {
            (self.color + Vec3::splat(HIGHLIGHT_BOOST)).min(Vec3::ONE)
        } else {
            self.color
        }
    }
}

/// Marker for nodes that respond to ray picking. The built-in ground plane
/// does not carry it.
#[derive(Component, Clone, Copy)]
pub struct Selectable;

#[derive(Component, Clone, Copy)]
pub struct GroundPlane;

#[derive(Component, Clone, Copy)]
pub struct RapierBody {
    pub handle: RigidBodyHandle,
}

#[derive(Component, Clone, Copy)]
pub struct RapierCollider {
    pub handle: ColliderHandle,
}
