//! Type aliases for the shared-ownership patterns of the editing session.
//!
//! The engine runs on the UI event thread only, so every alias here is built
//! on `Rc<RefCell<_>>` rather than thread-safe primitives.
//!
//! ## Usage
//!
//! ```rust
//! use tordie_core::types::*;
//!
//! let counter: Shared<u32> = shared(0);
//! *counter.borrow_mut() += 1;
//! assert_eq!(*counter.borrow(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// Surfaces and listeners hold the edit session through this alias.
pub type Shared<T> = Rc<RefCell<T>>;

/// Teardown closure returned by mode installers such as `enable_select_mode`.
///
/// Calling it removes every listener the mode installed.
pub type DisposeFn = Box<dyn FnOnce()>;

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
