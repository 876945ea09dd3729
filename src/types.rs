//! Copyable handles addressing nodes stored in a [`QueryTree`](crate::criteria::QueryTree).
//!
//! Handles are plain indexes into the tree's arenas. They are only meaningful
//! for the tree that issued them; the tree reports foreign or stale handles as
//! [`CriteriaError::UnknownNode`](crate::criteria::CriteriaError::UnknownNode).

use std::fmt;

/// Identifier of a path node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PathId(pub(crate) usize);

impl PathId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Identifier of an expression node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprId(pub(crate) usize);

impl ExprId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Reference to any node of a query tree, path or expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeRef {
    /// A path node.
    Path(PathId),
    /// An expression node.
    Expr(ExprId),
}

impl From<PathId> for NodeRef {
    fn from(id: PathId) -> Self {
        NodeRef::Path(id)
    }
}

impl From<ExprId> for NodeRef {
    fn from(id: ExprId) -> Self {
        NodeRef::Expr(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Path(id) => write!(f, "path#{}", id.0),
            NodeRef::Expr(id) => write!(f, "expr#{}", id.0),
        }
    }
}
