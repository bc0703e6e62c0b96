use crate::lifecycle::SimState;
use crate::scene::{ObjectId, Scene};
use glam::Vec3;

pub(crate) const GIZMO_TRANSLATE_RADIUS_PX: f32 = 18.0;
pub(crate) const GIZMO_SCALE_OUTER_RADIUS_PX: f32 = 32.0;
pub(crate) const GIZMO_ROTATE_INNER_RADIUS_PX: f32 = 38.0;
pub(crate) const GIZMO_ROTATE_OUTER_RADIUS_PX: f32 = 52.0;
pub(crate) const SCALE_MIN_RATIO: f32 = 0.05;
pub(crate) const SCALE_MAX_RATIO: f32 = 20.0;
pub(crate) const SCALE_SNAP_STEP: f32 = 0.1;
pub(crate) const TRANSLATE_SNAP_STEP: f32 = 0.05;
pub(crate) const ROTATE_SNAP_STEP_RADIANS: f32 = 15.0_f32.to_radians();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoMode {
    Translate,
    Rotate,
    Scale,
}

impl Default for GizmoMode {
    fn default() -> Self {
        GizmoMode::Translate
    }
}

impl GizmoMode {
    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Translate => "translate",
            GizmoMode::Rotate => "rotate",
            GizmoMode::Scale => "scale",
        }
    }
}

/// In-flight drag state. All three interactions work on the plane through the
/// object's center facing the camera.
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum GizmoInteraction {
    Translate {
        id: ObjectId,
        offset: Vec3,
        plane_origin: Vec3,
        plane_normal: Vec3,
    },
    Rotate {
        id: ObjectId,
        axis: Vec3,
        start_rotation: glam::Quat,
        start_vector: Vec3,
    },
    Scale {
        id: ObjectId,
        start_scale: Vec3,
        start_distance: f32,
        plane_normal: Vec3,
    },
}

impl GizmoInteraction {
    pub(crate) fn object_id(&self) -> ObjectId {
        match self {
            GizmoInteraction::Translate { id, .. }
            | GizmoInteraction::Rotate { id, .. }
            | GizmoInteraction::Scale { id, .. } => *id,
        }
    }
}

/// Gizmo attachment is a pure function of lifecycle state and selection
/// cardinality: the sole selected object while paused, nothing otherwise.
/// Recomputed on every transition and selection change instead of imperative
/// attach/detach calls.
pub fn gizmo_target(state: SimState, scene: &Scene) -> Option<ObjectId> {
    if !state.accepts_gizmo() {
        return None;
    }
    scene.sole_selection()
}

pub(crate) fn apply_scale_ratio(ratio: f32, snap: bool) -> f32 {
    let clamped = ratio.clamp(SCALE_MIN_RATIO, SCALE_MAX_RATIO);
    if snap {
        let snapped = (clamped / SCALE_SNAP_STEP).round() * SCALE_SNAP_STEP;
        snapped.clamp(SCALE_MIN_RATIO, SCALE_MAX_RATIO)
    } else {
        clamped
    }
}

pub(crate) fn snap_translation(mut translation: Vec3) -> Vec3 {
    translation.x = (translation.x / TRANSLATE_SNAP_STEP).round() * TRANSLATE_SNAP_STEP;
    translation.y = (translation.y / TRANSLATE_SNAP_STEP).round() * TRANSLATE_SNAP_STEP;
    translation.z = (translation.z / TRANSLATE_SNAP_STEP).round() * TRANSLATE_SNAP_STEP;
    translation
}
