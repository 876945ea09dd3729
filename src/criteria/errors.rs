#![forbid(unsafe_code)]

use std::fmt;
use std::io;

use thiserror::Error;

use crate::types::NodeRef;

/// Result alias used throughout the criteria layer.
pub type Result<T> = std::result::Result<T, CriteriaError>;

/// Errors raised while building or rendering a query tree.
///
/// Navigation errors signal misuse of the path API by the caller. They are
/// never retried; the in-progress tree should be discarded.
#[derive(Debug, Error)]
pub enum CriteriaError {
    /// Navigation attempted past a path that cannot be dereferenced.
    #[error("Illegal attempt to dereference path source{}", bracketed(.path))]
    IllegalDereference {
        /// Identifier of the offending path, when it has one.
        path: Option<String>,
    },
    /// Attribute name does not exist on the path's declared type.
    #[error("Unable to resolve attribute [{attribute}] against path{}", bracketed(.path))]
    UnknownAttribute {
        /// Requested attribute name.
        attribute: String,
        /// Identifier of the path, omitted for roots.
        path: Option<String>,
    },
    /// Root requested for a type the metamodel does not know as an entity.
    #[error("unknown entity type '{name}'")]
    UnknownManagedType {
        /// Requested type name.
        name: String,
    },
    /// Handle was not issued by this tree.
    #[error("{node} does not belong to this query tree")]
    UnknownNode {
        /// The foreign handle.
        node: NodeRef,
    },
    /// Metamodel description is malformed or inconsistent.
    #[error("invalid metamodel: {0}")]
    Metamodel(String),
    /// Failure reading a metamodel description.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn bracketed(path: &Option<String>) -> String {
    match path {
        Some(path) => format!(" [{path}]"),
        None => String::new(),
    }
}

impl CriteriaError {
    /// Builds an [`CriteriaError::UnknownAttribute`].
    pub fn unknown_attribute(attribute: impl Into<String>, path: Option<String>) -> Self {
        CriteriaError::UnknownAttribute {
            attribute: attribute.into(),
            path,
        }
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            CriteriaError::IllegalDereference { .. } => "IllegalDereference",
            CriteriaError::UnknownAttribute { .. } => "UnknownAttribute",
            CriteriaError::UnknownManagedType { .. } => "UnknownManagedType",
            CriteriaError::UnknownNode { .. } => "UnknownNode",
            CriteriaError::Metamodel(_) => "InvalidMetamodel",
            CriteriaError::Io(_) => "Io",
        }
    }

    /// True for errors caused by misuse of the navigation API.
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            CriteriaError::IllegalDereference { .. } | CriteriaError::UnknownAttribute { .. }
        )
    }
}

/// Convenience wrapper that formats criteria errors with their codes.
pub struct CriteriaErrorWithCode<'a>(pub &'a CriteriaError);

impl fmt::Display for CriteriaErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}
