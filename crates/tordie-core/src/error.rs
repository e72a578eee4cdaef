//! Error handling for Tordie
//!
//! The editing surface recovers most failures locally, so only the mutation
//! boundaries of the diagram model report errors:
//! - Diagram errors (missing entities, bad references, unknown modifiers)
//! - I/O errors from the application shell
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::id::Identifier;

/// Diagram model error type
///
/// Raised by diagram mutators when a request cannot be honoured. Readers of
/// the model never raise these; they substitute safe defaults instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    /// Geometry does not exist
    #[error("Geometry not found: {id}")]
    GeometryNotFound {
        /// The missing geometry identifier.
        id: Identifier,
    },

    /// Item does not exist
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// The missing item identifier.
        id: Identifier,
    },

    /// Modifier does not exist
    #[error("Modifier not found: {id}")]
    ModifierNotFound {
        /// The missing modifier identifier.
        id: Identifier,
    },

    /// No evaluator is registered for the modifier type
    #[error("Unknown modifier type: {modifier_type}")]
    UnknownModifierType {
        /// The unregistered type name.
        modifier_type: String,
    },

    /// Evaluator registration with an unusable type name
    #[error("Invalid modifier type name: {modifier_type:?}")]
    InvalidModifierType {
        /// The rejected type name.
        modifier_type: String,
    },

    /// A point reference points at nothing
    #[error("Dangling reference to {id}")]
    DanglingReference {
        /// The identifier that failed to resolve.
        id: Identifier,
    },

    /// A reference resolved to a geometry of the wrong kind
    #[error("Geometry {id} is a {actual}, expected {expected}")]
    WrongGeometryKind {
        /// The offending geometry.
        id: Identifier,
        /// The kind the caller required.
        expected: String,
        /// The kind actually stored.
        actual: String,
    },

    /// Re-parenting would create a cycle in the item tree
    #[error("Item {child} cannot be parented under its descendant {parent}")]
    CyclicParent {
        /// The item being moved.
        child: Identifier,
        /// The requested parent.
        parent: Identifier,
    },
}

/// Main error type for Tordie
#[derive(Error, Debug)]
pub enum Error {
    /// Diagram model error
    #[error(transparent)]
    Diagram(#[from] DiagramError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a diagram error
    pub fn is_diagram_error(&self) -> bool {
        matches!(self, Error::Diagram(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
