use crate::lifecycle::SimState;
use crate::scene::{ObjectId, TransformData};
use std::collections::BTreeSet;
use std::fmt;

/// Outbound notifications consumed by the editor shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectionChanged { id: Option<ObjectId> },
    MultiSelectionChanged { ids: BTreeSet<ObjectId> },
    TransformUpdated { id: ObjectId, transform: TransformData },
    SimStateChanged { state: SimState },
    SceneLoaded { object_count: usize },
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::SelectionChanged { id } => match id {
                Some(id) => write!(f, "SelectionChanged id={id}"),
                None => write!(f, "SelectionChanged none"),
            },
            EditorEvent::MultiSelectionChanged { ids } => {
                write!(f, "MultiSelectionChanged count={}", ids.len())
            }
            EditorEvent::TransformUpdated { id, transform } => {
                let p = transform.position;
                write!(f, "TransformUpdated id={id} position=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
            }
            EditorEvent::SimStateChanged { state } => write!(f, "SimStateChanged state={}", state.label()),
            EditorEvent::SceneLoaded { object_count } => {
                write!(f, "SceneLoaded objects={object_count}")
            }
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<EditorEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
