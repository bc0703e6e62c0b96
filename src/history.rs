use crate::scene::Scene;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded undo/redo history over canonical scene snapshots. The editor
/// snapshots before every structural or property mutation; undo/redo swap the
/// current scene against the stacks and are no-ops when empty.
pub struct History {
    undo: VecDeque<Scene>,
    redo: Vec<Scene>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), capacity: capacity.max(1) }
    }

    /// Pushes a deep copy of the scene onto the undo stack, evicting the
    /// oldest entry at capacity, and clears the redo stack.
    pub fn snapshot(&mut self, scene: &Scene) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(scene.clone());
        self.redo.clear();
    }

    /// Pops the most recent snapshot, parking `current` on the redo stack.
    /// Returns `None` (caller keeps the scene unchanged) when empty.
    pub fn undo(&mut self, current: Scene) -> Option<Scene> {
        let restored = self.undo.pop_back()?;
        self.redo.push(current);
        Some(restored)
    }

    pub fn redo(&mut self, current: Scene) -> Option<Scene> {
        let restored = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, SceneObject, Shape};

    fn scene_with_objects(count: usize) -> Scene {
        let mut scene = Scene::default();
        for _ in 0..count {
            scene.insert_object(SceneObject::new(Shape::Box));
        }
        scene
    }

    #[test]
    fn undo_returns_the_previous_snapshot() {
        let mut history = History::default();
        let before = scene_with_objects(1);
        history.snapshot(&before);
        let after = scene_with_objects(2);
        let restored = history.undo(after.clone()).expect("undo available");
        assert_eq!(restored, before);
        let redone = history.redo(restored).expect("redo available");
        assert_eq!(redone, after);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(Scene::default()).is_none());
        assert!(history.redo(Scene::default()).is_none());
    }

    #[test]
    fn snapshot_clears_redo() {
        let mut history = History::default();
        history.snapshot(&scene_with_objects(1));
        let _ = history.undo(scene_with_objects(2));
        assert!(history.can_redo());
        history.snapshot(&scene_with_objects(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for i in 0..5 {
            history.snapshot(&scene_with_objects(i));
        }
        assert_eq!(history.undo_depth(), 3);
    }
}
