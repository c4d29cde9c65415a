// ── Document data controllers ──

mod controller;
mod entity;

pub use controller::{DataController, SyncOutcome};
pub use entity::{EditableEntity, Entity};
