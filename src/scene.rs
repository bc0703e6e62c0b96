use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Stable identifier for a scene object. Assigned at creation and never
/// reused after deletion within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Data {
    pub fn splat(value: f32) -> Self {
        Self { x: value, y: value, z: value }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorData {
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    pub fn clamped(&self) -> Self {
        Self { r: self.r.clamp(0.0, 1.0), g: self.g.clamp(0.0, 1.0), b: self.b.clamp(0.0, 1.0) }
    }
}

impl Default for ColorData {
    fn default() -> Self {
        Self { r: 0.8, g: 0.8, b: 0.8 }
    }
}

impl From<glam::Vec3> for ColorData {
    fn from(value: glam::Vec3) -> Self {
        Self { r: value.x, g: value.y, b: value.z }
    }
}

impl From<ColorData> for glam::Vec3 {
    fn from(value: ColorData) -> Self {
        glam::Vec3::new(value.r, value.g, value.b)
    }
}

fn default_scale() -> Vec3Data {
    Vec3Data::splat(1.0)
}

/// Authoritative object transform. Rotation is XYZ Euler angles in radians;
/// the physics body and the visual node each hold a derived copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    #[serde(default)]
    pub position: Vec3Data,
    #[serde(default)]
    pub rotation: Vec3Data,
    #[serde(default = "default_scale")]
    pub scale: Vec3Data,
}

impl Default for TransformData {
    fn default() -> Self {
        Self { position: Vec3Data::default(), rotation: Vec3Data::default(), scale: default_scale() }
    }
}

impl TransformData {
    pub fn from_components(position: glam::Vec3, rotation: glam::Vec3, scale: glam::Vec3) -> Self {
        Self { position: position.into(), rotation: rotation.into(), scale: scale.into() }
    }

    pub fn components(&self) -> (glam::Vec3, glam::Vec3, glam::Vec3) {
        (self.position.into(), self.rotation.into(), self.scale.into())
    }

    pub fn rotation_quat(&self) -> glam::Quat {
        glam::Quat::from_euler(glam::EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

const fn default_mass() -> f32 {
    1.0
}

const fn default_friction() -> f32 {
    0.5
}

const fn default_restitution() -> f32 {
    0.3
}

const MIN_DYNAMIC_MASS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsProperties {
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
}

impl Default for PhysicsProperties {
    fn default() -> Self {
        Self { mass: default_mass(), friction: default_friction(), restitution: default_restitution() }
    }
}

impl PhysicsProperties {
    pub fn is_finite(&self) -> bool {
        self.mass.is_finite() && self.friction.is_finite() && self.restitution.is_finite()
    }

    /// Clamps every coefficient into its physical range before it reaches the
    /// solver. Out-of-range authored values are clamped, not rejected;
    /// non-finite values fall back to the defaults.
    pub fn sanitized(&self) -> Self {
        let mass = if self.mass.is_finite() { self.mass.max(MIN_DYNAMIC_MASS) } else { default_mass() };
        let friction = if self.friction.is_finite() { self.friction.max(0.0) } else { default_friction() };
        let restitution = if self.restitution.is_finite() {
            self.restitution.clamp(0.0, 1.0)
        } else {
            default_restitution()
        };
        Self { mass, friction, restitution }
    }
}

/// Collision/render primitive. Immutable after creation: the shape determines
/// both the rendered mesh and the collision primitive, so changing it is a
/// delete + recreate. An unrecognized tag deserializes to `Unknown`, which the
/// stage degrades to a unit box collider instead of failing the scene load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Box,
    Sphere,
    Cylinder,
    Unknown,
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Box
    }
}

impl Shape {
    pub fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "box" => Shape::Box,
            "sphere" => Shape::Sphere,
            "cylinder" => Shape::Cylinder,
            _ => Shape::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Box => "box",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Unknown => "unknown",
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Shape::from_str(&tag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VisualProperties {
    #[serde(default)]
    pub color: ColorData,
    #[serde(default)]
    pub shape: Shape,
}

/// One physical/visual entity of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub transform: TransformData,
    #[serde(default)]
    pub physics: PhysicsProperties,
    #[serde(default)]
    pub visual: VisualProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: ObjectId::new(),
            name: None,
            transform: TransformData::default(),
            physics: PhysicsProperties::default(),
            visual: VisualProperties { color: ColorData::default(), shape },
            description: None,
        }
    }

    pub fn sanitize(&mut self) {
        self.physics = self.physics.sanitized();
        self.visual.color = if self.visual.color.is_finite() {
            self.visual.color.clamped()
        } else {
            ColorData::default()
        };
        if !self.transform.is_finite() {
            self.transform = TransformData::default();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Dawn,
    #[default]
    Noon,
    Dusk,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Snow,
    Fog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    #[default]
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderQuality {
    Draft,
    #[default]
    Standard,
    High,
    Ultra,
}

impl RenderQuality {
    pub fn label(self) -> &'static str {
        match self {
            RenderQuality::Draft => "Draft",
            RenderQuality::Standard => "Standard",
            RenderQuality::High => "High",
            RenderQuality::Ultra => "Ultra",
        }
    }
}

const fn default_atmosphere_density() -> f32 {
    0.1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub season: Season,
    #[serde(default = "default_atmosphere_density")]
    pub atmosphere_density: f32,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            time_of_day: TimeOfDay::default(),
            weather: Weather::default(),
            season: Season::default(),
            atmosphere_density: default_atmosphere_density(),
        }
    }
}

impl EnvironmentSettings {
    pub fn is_finite(&self) -> bool {
        self.atmosphere_density.is_finite()
    }
}

const fn default_ambient_intensity() -> f32 {
    0.3
}

const fn default_directional_intensity() -> f32 {
    1.0
}

fn default_light_color() -> ColorData {
    ColorData { r: 1.0, g: 0.98, b: 0.92 }
}

const fn default_light_angle() -> f32 {
    0.9
}

const fn default_shadows_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingSettings {
    #[serde(default = "default_ambient_intensity")]
    pub ambient_intensity: f32,
    #[serde(default = "default_directional_intensity")]
    pub directional_intensity: f32,
    #[serde(default = "default_light_color")]
    pub color: ColorData,
    /// Elevation angle of the directional light in radians.
    #[serde(default = "default_light_angle")]
    pub angle: f32,
    #[serde(default = "default_shadows_enabled")]
    pub shadows_enabled: bool,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_intensity: default_ambient_intensity(),
            directional_intensity: default_directional_intensity(),
            color: default_light_color(),
            angle: default_light_angle(),
            shadows_enabled: default_shadows_enabled(),
        }
    }
}

impl LightingSettings {
    pub fn is_finite(&self) -> bool {
        self.ambient_intensity.is_finite()
            && self.directional_intensity.is_finite()
            && self.color.is_finite()
            && self.angle.is_finite()
    }
}

/// Scene-wide context consumed by the offline render hand-off; never
/// per-object, never read by physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneContext {
    #[serde(default)]
    pub environment: EnvironmentSettings,
    #[serde(default)]
    pub lighting: LightingSettings,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub narrative: String,
    #[serde(default)]
    pub render_quality: RenderQuality,
}

/// The full authoring unit: every object plus scene-wide context. Selection
/// is transient UI state, not part of the physical model's truth, but it is
/// carried in clones so history snapshots restore it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    #[serde(default)]
    pub objects: BTreeMap<ObjectId, SceneObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_object: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub selected_objects: BTreeSet<ObjectId>,
    #[serde(default)]
    pub context: SceneContext,
}

impl Scene {
    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn insert_object(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    /// The sole selected object, if the selection has exactly one member.
    pub fn sole_selection(&self) -> Option<ObjectId> {
        if self.selected_objects.len() == 1 {
            self.selected_objects.iter().next().copied()
        } else {
            None
        }
    }

    pub fn sanitize(&mut self) {
        for object in self.objects.values_mut() {
            object.sanitize();
        }
        let objects = &self.objects;
        self.selected_objects.retain(|id| objects.contains_key(id));
        if let Some(id) = self.selected_object {
            if !self.objects.contains_key(&id) {
                self.selected_object = None;
            }
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene file {}", path.display()))?;
        let mut scene = serde_json::from_slice::<Scene>(&bytes)
            .with_context(|| format!("Parsing scene file {}", path.display()))?;
        scene.sanitize();
        Ok(scene)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating scene directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes())
            .with_context(|| format!("Writing scene file {}", path.display()))?;
        Ok(())
    }
}

const fn default_duration_seconds() -> f32 {
    5.0
}

const fn default_fps() -> u32 {
    24
}

const fn default_render_width() -> u32 {
    1920
}

const fn default_render_height() -> u32 {
    1080
}

/// Duration/fps/resolution/quality envelope attached to a render hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderEnvelope {
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_render_width")]
    pub width: u32,
    #[serde(default = "default_render_height")]
    pub height: u32,
    #[serde(default)]
    pub quality: RenderQuality,
}

impl Default for RenderEnvelope {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration_seconds(),
            fps: default_fps(),
            width: default_render_width(),
            height: default_render_height(),
            quality: RenderQuality::default(),
        }
    }
}

/// Export payload for the offline photorealistic renderer. This core builds
/// the payload and nothing more; job dispatch, polling, and cost live on the
/// other side of the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderHandoff {
    pub scene: Scene,
    pub envelope: RenderEnvelope,
}

impl RenderHandoff {
    pub fn new(scene: Scene, envelope: RenderEnvelope) -> Self {
        Self { scene, envelope }
    }
}
