//! # Event Bus Module
//!
//! Publish/subscribe notification for the editing session. Stores call
//! `publish` after each change; rulers, scroll proxies, the renderer and
//! inspector panels subscribe to the categories they care about.
//!
//! The bus is owned by the session that creates it. There is no global
//! instance.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tordie_core::event_bus::{EditorEvent, EventBus, EventCategory, EventFilter, SelectionEvent};
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let seen_in_handler = seen.clone();
//! let sub = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Selection]),
//!     move |_event| seen_in_handler.set(seen_in_handler.get() + 1),
//! );
//!
//! bus.publish(EditorEvent::Selection(SelectionEvent::Changed { count: 3 }));
//! assert_eq!(seen.get(), 1);
//! bus.unsubscribe(sub);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
