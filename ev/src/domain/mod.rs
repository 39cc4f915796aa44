//! Domain types for the event loop model
//!
//! - `QueueItem` / `TaskKind` / `ItemId` - units of scheduled work
//! - `Example` - the scripted demonstration scenarios

mod example;
mod item;

pub use example::Example;
pub use item::{ItemId, QueueItem, TaskKind};
