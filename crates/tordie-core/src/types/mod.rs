//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Shared handles and the dispose closure type.

pub mod aliases;

pub use aliases::*;
