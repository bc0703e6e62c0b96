use crate::camera3d::{Camera3D, OrbitCamera, Viewport};
use crate::config::EngineConfig;
use crate::events::{EditorEvent, EventBus};
use crate::gizmo::{
    self, GizmoInteraction, GizmoMode, GIZMO_ROTATE_INNER_RADIUS_PX, GIZMO_ROTATE_OUTER_RADIUS_PX,
    GIZMO_SCALE_OUTER_RADIUS_PX, GIZMO_TRANSLATE_RADIUS_PX, ROTATE_SNAP_STEP_RADIANS,
};
use crate::history::History;
use crate::lifecycle::SimState;
use crate::scene::{
    ColorData, EnvironmentSettings, LightingSettings, ObjectId, PhysicsProperties, RenderEnvelope,
    RenderHandoff, RenderQuality, Scene, SceneObject, TransformData,
};
use crate::stage::StageWorld;
use glam::{EulerRot, Quat, Vec2, Vec3};
use std::collections::BTreeSet;

/// The authoring surface the editor shell talks to. Owns the canonical scene
/// model and mutates the stage exclusively through its entry points; the
/// shell never touches the physics or visual worlds directly.
pub struct Editor {
    config: EngineConfig,
    scene: Scene,
    initial: Option<Scene>,
    stage: StageWorld,
    history: History,
    state: SimState,
    orbit: OrbitCamera,
    camera: Camera3D,
    viewport: Viewport,
    gizmo_mode: GizmoMode,
    interaction: Option<GizmoInteraction>,
    events: EventBus,
}

impl Editor {
    pub fn new(config: EngineConfig) -> Self {
        let stage = StageWorld::new(&config);
        let history = History::with_capacity(config.history_capacity);
        let orbit = OrbitCamera::default();
        let camera = orbit.to_camera(60.0_f32.to_radians(), 0.1, 1000.0);
        Self {
            config,
            scene: Scene::default(),
            initial: None,
            stage,
            history,
            state: SimState::Idle,
            orbit,
            camera,
            viewport: Viewport::default(),
            gizmo_mode: GizmoMode::default(),
            interaction: None,
            events: EventBus::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn gizmo_mode(&self) -> GizmoMode {
        self.gizmo_mode
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera3D) {
        self.camera = camera;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn stage_mut(&mut self) -> &mut StageWorld {
        &mut self.stage
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    /// Orbit the preview camera around its target.
    pub fn orbit_preview(&mut self, delta: Vec2, zoom_factor: f32) {
        self.orbit.orbit(delta);
        if zoom_factor.is_finite() && zoom_factor > 0.0 {
            self.orbit.zoom(zoom_factor);
        }
        self.camera = self.orbit.to_camera(self.camera.fov_y_radians, self.camera.near, self.camera.far);
    }

    // ---------- Lifecycle ----------

    fn set_state(&mut self, state: SimState) {
        if self.state == state {
            return;
        }
        self.state = state;
        if !state.accepts_gizmo() {
            self.interaction = None;
        }
        log::info!("simulation state -> {}", state.label());
        self.events.push(EditorEvent::SimStateChanged { state });
    }

    /// Replaces the live simulation with this scene and captures it as the
    /// reset snapshot. Idempotent: loading the same scene twice produces the
    /// same pairing.
    pub fn load_scene(&mut self, mut scene: Scene) {
        scene.sanitize();
        self.stage.load_scene(&scene);
        self.initial = Some(scene.clone());
        self.scene = scene;
        self.history.clear();
        self.interaction = None;
        self.set_state(SimState::Paused);
        self.refresh_highlight();
        self.events.push(EditorEvent::SceneLoaded { object_count: self.scene.objects.len() });
        self.emit_selection_events();
    }

    pub fn start_simulation(&mut self) {
        if !self.state.can_start() {
            log::warn!("start ignored in state {}", self.state.label());
            return;
        }
        self.interaction = None;
        self.set_state(SimState::Running);
    }

    pub fn pause_simulation(&mut self) {
        if !self.state.can_pause() {
            log::warn!("pause ignored in state {}", self.state.label());
            return;
        }
        self.set_state(SimState::Paused);
    }

    /// Reloads the initially-captured snapshot and returns to paused.
    pub fn reset_simulation(&mut self) {
        if !self.state.can_reset() {
            log::warn!("reset ignored in state {}", self.state.label());
            return;
        }
        let Some(initial) = self.initial.clone() else {
            return;
        };
        self.stage.load_scene(&initial);
        self.scene = initial;
        self.interaction = None;
        self.set_state(SimState::Paused);
        self.refresh_highlight();
        self.emit_selection_events();
    }

    /// Per-frame hook. While running, advances physics one fixed tick and
    /// folds the solved poses back into the canonical model so it never lags
    /// the visible state. Paused and idle frames never mutate a transform.
    pub fn update(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.stage.step(self.config.fixed_timestep);
        for (id, transform) in self.stage.paired_transforms() {
            let Some(object) = self.scene.objects.get_mut(&id) else {
                continue;
            };
            if object.transform != transform {
                object.transform = transform;
                self.events.push(EditorEvent::TransformUpdated { id, transform });
            }
        }
    }

    // ---------- Selection ----------

    /// The object the gizmo is attached to, if any: the sole selected object
    /// while paused. Never attached while running.
    pub fn gizmo_target(&self) -> Option<ObjectId> {
        gizmo::gizmo_target(self.state, &self.scene)
    }

    pub fn select_object(&mut self, id: Option<ObjectId>) {
        let ids = match id {
            Some(id) if self.scene.objects.contains_key(&id) => BTreeSet::from([id]),
            _ => BTreeSet::new(),
        };
        self.set_selection(ids);
    }

    pub fn toggle_selection(&mut self, id: ObjectId) {
        if !self.scene.objects.contains_key(&id) {
            return;
        }
        let mut ids = self.scene.selected_objects.clone();
        if !ids.remove(&id) {
            ids.insert(id);
        }
        self.set_selection(ids);
    }

    fn set_selection(&mut self, ids: BTreeSet<ObjectId>) {
        if ids == self.scene.selected_objects {
            return;
        }
        self.scene.selected_objects = ids;
        self.scene.selected_object = self.scene.sole_selection();
        self.interaction = None;
        self.refresh_highlight();
        self.emit_selection_events();
    }

    fn refresh_highlight(&mut self) {
        self.stage.set_highlighted(&self.scene.selected_objects);
    }

    fn emit_selection_events(&mut self) {
        self.events.push(EditorEvent::SelectionChanged { id: self.scene.selected_object });
        self.events
            .push(EditorEvent::MultiSelectionChanged { ids: self.scene.selected_objects.clone() });
    }

    // ---------- Structural commands ----------

    pub fn add_object(&mut self, mut object: SceneObject) -> ObjectId {
        object.sanitize();
        self.history.snapshot(&self.scene);
        self.stage.spawn_object(&object);
        let id = self.scene.insert_object(object);
        if self.state == SimState::Idle {
            self.set_state(SimState::Paused);
        }
        id
    }

    /// Copies the sole selected object under a fresh id, offset along one
    /// axis so the duplicate does not spawn inside the original. Physics and
    /// visual properties carry over unchanged; the duplicate becomes the
    /// selection.
    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let source_id = self.scene.sole_selection()?;
        let mut copy = self.scene.objects.get(&source_id)?.clone();
        self.history.snapshot(&self.scene);
        copy.id = ObjectId::new();
        copy.transform.position.x += self.config.duplicate_offset;
        if let Some(name) = copy.name.take() {
            copy.name = Some(format!("{name} copy"));
        }
        self.stage.spawn_object(&copy);
        let id = self.scene.insert_object(copy);
        self.set_selection(BTreeSet::from([id]));
        Some(id)
    }

    /// Deletes every selected object from the canonical, physics, and visual
    /// stores in one command; no frame observes it in one but not the others.
    pub fn delete_selected(&mut self) -> bool {
        if self.scene.selected_objects.is_empty() {
            return false;
        }
        self.history.snapshot(&self.scene);
        let ids: Vec<ObjectId> = self.scene.selected_objects.iter().copied().collect();
        for id in &ids {
            self.stage.remove_object(id);
            self.scene.objects.remove(id);
        }
        self.scene.selected_objects.clear();
        self.scene.selected_object = None;
        self.interaction = None;
        self.refresh_highlight();
        self.emit_selection_events();
        true
    }

    // ---------- Property commands ----------

    pub fn set_object_transform(&mut self, id: ObjectId, transform: TransformData) -> bool {
        if !transform.is_finite() {
            log::warn!("object {id}: rejecting non-finite transform");
            return false;
        }
        if !self.scene.objects.contains_key(&id) {
            return false;
        }
        self.history.snapshot(&self.scene);
        self.stage.apply_object_transform(&id, &transform);
        if let Some(object) = self.scene.objects.get_mut(&id) {
            object.transform = transform;
        }
        self.events.push(EditorEvent::TransformUpdated { id, transform });
        true
    }

    pub fn set_object_physics(&mut self, id: ObjectId, props: PhysicsProperties) -> bool {
        if !props.is_finite() {
            log::warn!("object {id}: rejecting non-finite physics properties");
            return false;
        }
        if !self.scene.objects.contains_key(&id) {
            return false;
        }
        self.history.snapshot(&self.scene);
        let clean = props.sanitized();
        if let Some(object) = self.scene.objects.get_mut(&id) {
            object.physics = clean;
        }
        self.stage.apply_object_physics(&id, &clean);
        true
    }

    pub fn set_object_color(&mut self, id: ObjectId, color: ColorData) -> bool {
        if !color.is_finite() {
            log::warn!("object {id}: rejecting non-finite color");
            return false;
        }
        if !self.scene.objects.contains_key(&id) {
            return false;
        }
        self.history.snapshot(&self.scene);
        let clean = color.clamped();
        if let Some(object) = self.scene.objects.get_mut(&id) {
            object.visual.color = clean;
        }
        self.stage.set_object_color(&id, clean.into());
        true
    }

    pub fn set_object_description(&mut self, id: ObjectId, description: Option<String>) -> bool {
        if !self.scene.objects.contains_key(&id) {
            return false;
        }
        self.history.snapshot(&self.scene);
        if let Some(object) = self.scene.objects.get_mut(&id) {
            object.description = description;
        }
        true
    }

    pub fn set_lighting(&mut self, lighting: LightingSettings) -> bool {
        if !lighting.is_finite() {
            log::warn!("rejecting non-finite lighting settings");
            return false;
        }
        self.history.snapshot(&self.scene);
        self.scene.context.lighting = lighting;
        true
    }

    pub fn set_environment(&mut self, environment: EnvironmentSettings) -> bool {
        if !environment.is_finite() {
            log::warn!("rejecting non-finite environment settings");
            return false;
        }
        self.history.snapshot(&self.scene);
        self.scene.context.environment = environment;
        true
    }

    pub fn set_narrative(&mut self, narrative: String) {
        self.history.snapshot(&self.scene);
        self.scene.context.narrative = narrative;
    }

    pub fn set_render_quality(&mut self, quality: RenderQuality) {
        self.history.snapshot(&self.scene);
        self.scene.context.render_quality = quality;
    }

    // ---------- History ----------

    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo(self.scene.clone()) else {
            return false;
        };
        self.apply_restored(restored);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo(self.scene.clone()) else {
            return false;
        };
        self.apply_restored(restored);
        true
    }

    fn apply_restored(&mut self, scene: Scene) {
        self.stage.load_scene(&scene);
        self.scene = scene;
        self.interaction = None;
        self.refresh_highlight();
        self.emit_selection_events();
    }

    // ---------- Pointer input ----------

    /// Click entry point. A press on the attached gizmo's handle region
    /// starts a drag; anything else picks. Plain clicks replace the
    /// selection (clearing it on a miss); modifier-held clicks toggle
    /// membership in the multi-selection and leave it unchanged on a miss.
    pub fn pointer_pressed(&mut self, screen: Vec2, modifier: bool) {
        let Some((origin, dir)) = self.camera.screen_ray(screen, self.viewport) else {
            return;
        };
        if !modifier {
            if let Some(target) = self.gizmo_target() {
                if self.begin_gizmo_interaction(target, screen, origin, dir) {
                    return;
                }
            }
        }
        let hit = self.stage.pick(origin, dir);
        if modifier {
            if let Some(id) = hit {
                self.toggle_selection(id);
            }
        } else {
            self.select_object(hit);
        }
    }

    /// Continuous drag. Reads the pointer ray, computes the edited
    /// transform, and pushes it into the physics body, the visual node, and
    /// the canonical model in the same call. This is the single point where
    /// visual truth flows back into canonical truth.
    pub fn pointer_dragged(&mut self, screen: Vec2, snap: bool) {
        let Some(interaction) = self.interaction else {
            return;
        };
        if !self.state.accepts_gizmo() {
            self.interaction = None;
            return;
        }
        let Some((origin, dir)) = self.camera.screen_ray(screen, self.viewport) else {
            return;
        };
        let id = interaction.object_id();
        let Some(current) = self.scene.objects.get(&id).map(|o| o.transform) else {
            self.interaction = None;
            return;
        };
        let updated = match interaction {
            GizmoInteraction::Translate { offset, plane_origin, plane_normal, .. } => {
                let Some(hit) = intersect_ray_plane(origin, dir, plane_origin, plane_normal) else {
                    return;
                };
                let mut translation = hit + offset;
                if snap {
                    translation = gizmo::snap_translation(translation);
                }
                TransformData { position: translation.into(), ..current }
            }
            GizmoInteraction::Rotate { axis, start_rotation, start_vector, .. } => {
                let center: Vec3 = current.position.into();
                let Some(hit) = intersect_ray_plane(origin, dir, center, axis) else {
                    return;
                };
                let start_vec = start_vector.normalize_or_zero();
                let current_vec = (hit - center).normalize_or_zero();
                let axis_norm = axis.normalize_or_zero();
                if start_vec.length_squared() <= f32::EPSILON
                    || current_vec.length_squared() <= f32::EPSILON
                    || axis_norm.length_squared() <= f32::EPSILON
                {
                    return;
                }
                let dot = start_vec.dot(current_vec).clamp(-1.0, 1.0);
                let sin = start_vec.cross(current_vec).dot(axis_norm);
                let mut delta = sin.atan2(dot);
                if snap {
                    delta = (delta / ROTATE_SNAP_STEP_RADIANS).round() * ROTATE_SNAP_STEP_RADIANS;
                }
                let quat = Quat::from_axis_angle(axis_norm, delta) * start_rotation;
                let (x, y, z) = quat.to_euler(EulerRot::XYZ);
                TransformData { rotation: Vec3::new(x, y, z).into(), ..current }
            }
            GizmoInteraction::Scale { start_scale, start_distance, plane_normal, .. } => {
                let center: Vec3 = current.position.into();
                let Some(hit) = intersect_ray_plane(origin, dir, center, plane_normal) else {
                    return;
                };
                let distance = (hit - center).length();
                if distance <= f32::EPSILON || start_distance <= f32::EPSILON {
                    return;
                }
                let ratio = gizmo::apply_scale_ratio(distance / start_distance, snap);
                let scale = Vec3::new(
                    (start_scale.x * ratio).max(0.01),
                    (start_scale.y * ratio).max(0.01),
                    (start_scale.z * ratio).max(0.01),
                );
                TransformData { scale: scale.into(), ..current }
            }
        };
        if updated != current && self.stage.apply_object_transform(&id, &updated) {
            if let Some(object) = self.scene.objects.get_mut(&id) {
                object.transform = updated;
            }
            self.events.push(EditorEvent::TransformUpdated { id, transform: updated });
        }
    }

    pub fn pointer_released(&mut self) {
        self.interaction = None;
    }

    /// Switches translate/rotate/scale without touching the selection.
    pub fn set_transform_mode(&mut self, mode: GizmoMode) {
        if self.gizmo_mode != mode {
            self.gizmo_mode = mode;
            self.interaction = None;
        }
    }

    fn begin_gizmo_interaction(
        &mut self,
        target: ObjectId,
        screen: Vec2,
        ray_origin: Vec3,
        ray_dir: Vec3,
    ) -> bool {
        let Some(transform) = self.scene.objects.get(&target).map(|o| o.transform) else {
            return false;
        };
        let center: Vec3 = transform.position.into();
        let Some(center_screen) = self.camera.project_point(center, self.viewport) else {
            return false;
        };
        let dist = screen.distance(center_screen);
        let plane_normal = self.camera.forward();
        if plane_normal.length_squared() <= f32::EPSILON {
            return false;
        }
        match self.gizmo_mode {
            GizmoMode::Translate => {
                if dist > GIZMO_TRANSLATE_RADIUS_PX {
                    return false;
                }
                let Some(hit) = intersect_ray_plane(ray_origin, ray_dir, center, plane_normal) else {
                    return false;
                };
                self.history.snapshot(&self.scene);
                self.interaction = Some(GizmoInteraction::Translate {
                    id: target,
                    offset: center - hit,
                    plane_origin: center,
                    plane_normal,
                });
                true
            }
            GizmoMode::Rotate => {
                if dist < GIZMO_ROTATE_INNER_RADIUS_PX || dist > GIZMO_ROTATE_OUTER_RADIUS_PX {
                    return false;
                }
                let Some(hit) = intersect_ray_plane(ray_origin, ray_dir, center, plane_normal) else {
                    return false;
                };
                let start_vector = hit - center;
                if start_vector.length_squared() <= f32::EPSILON {
                    return false;
                }
                self.history.snapshot(&self.scene);
                self.interaction = Some(GizmoInteraction::Rotate {
                    id: target,
                    axis: plane_normal,
                    start_rotation: transform.rotation_quat(),
                    start_vector,
                });
                true
            }
            GizmoMode::Scale => {
                if dist > GIZMO_SCALE_OUTER_RADIUS_PX {
                    return false;
                }
                let Some(hit) = intersect_ray_plane(ray_origin, ray_dir, center, plane_normal) else {
                    return false;
                };
                let start_distance = (hit - center).length();
                if start_distance <= f32::EPSILON {
                    return false;
                }
                self.history.snapshot(&self.scene);
                self.interaction = Some(GizmoInteraction::Scale {
                    id: target,
                    start_scale: transform.scale.into(),
                    start_distance,
                    plane_normal,
                });
                true
            }
        }
    }

    // ---------- Render hand-off ----------

    /// Export payload for the offline renderer: the scene plus the envelope.
    pub fn render_handoff(&self, envelope: RenderEnvelope) -> RenderHandoff {
        RenderHandoff::new(self.scene.clone(), envelope)
    }
}

fn intersect_ray_plane(origin: Vec3, dir: Vec3, plane_origin: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denom = plane_normal.dot(dir);
    if denom.abs() < 1e-4 {
        return None;
    }
    let t = (plane_origin - origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}
