use crate::model::Model;

/// Notifications emitted by a model
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// One or more attributes changed, or an association reported a mutation
    Change,
    /// A single attribute changed; emitted before `Change`
    FieldChanged { name: String },
    /// The model was fetched from or saved to a sync backend
    Synced,
}

impl ModelEvent {
    pub fn is_change(&self) -> bool {
        matches!(self, ModelEvent::Change)
    }
}

/// Notifications emitted by a collection
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// A model was added at `index`
    Add { model: Model, index: usize },
    /// A model was removed from `index`
    Remove { model: Model, index: usize },
    /// A member model emitted `Change`
    Change { model: Model },
    /// The whole member list was replaced
    Reset,
}

impl CollectionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CollectionEvent::Add { .. } => "add",
            CollectionEvent::Remove { .. } => "remove",
            CollectionEvent::Change { .. } => "change",
            CollectionEvent::Reset => "reset",
        }
    }
}
