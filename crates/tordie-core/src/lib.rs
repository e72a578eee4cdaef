//! # Tordie Core
//!
//! Core types shared by every Tordie crate: opaque identifiers, the error
//! taxonomy, the editor event bus and the shared-ownership aliases used by
//! the single-threaded editing session.

pub mod error;
pub mod event_bus;
pub mod id;
pub mod types;

pub use error::{DiagramError, Error, Result};

pub use event_bus::{
    EditorEvent, EventBus, EventBusConfig, EventCategory, EventFilter, SubscriptionId,
};

pub use id::Identifier;

pub use types::{shared, DisposeFn, Shared};
