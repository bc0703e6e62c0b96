pub mod physics;
pub mod systems;
pub mod types;
pub mod world;

pub use physics::RapierState;
pub use systems::TimeDelta;
pub use types::{
    GroundPlane, ObjectTag, RapierBody, RapierCollider, Selectable, VisualMaterial, VisualShape,
    VisualTransform,
};
pub use world::StageWorld;
