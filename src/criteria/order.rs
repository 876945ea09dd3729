//! `ORDER BY` terms.

use std::fmt;

use crate::types::NodeRef;

/// Sort direction of an order term.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        })
    }
}

/// Pairs an expression with a sort direction.
///
/// The wrapper only references the expression; rendering the expression and
/// appending the direction keyword is left to the caller (see
/// [`render_order_by`](crate::criteria::render::render_order_by)).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Order {
    expression: NodeRef,
    ascending: bool,
}

impl Order {
    /// Ascending order over `expression`.
    pub fn new(expression: impl Into<NodeRef>) -> Self {
        Self::with_direction(expression, true)
    }

    /// Order over `expression` with an explicit direction.
    pub fn with_direction(expression: impl Into<NodeRef>, ascending: bool) -> Self {
        Self {
            expression: expression.into(),
            ascending,
        }
    }

    /// Ascending order over `expression`.
    pub fn asc(expression: impl Into<NodeRef>) -> Self {
        Self::with_direction(expression, true)
    }

    /// Descending order over `expression`.
    pub fn desc(expression: impl Into<NodeRef>) -> Self {
        Self::with_direction(expression, false)
    }

    /// Flips the direction in place.
    pub fn reverse(&mut self) -> &mut Self {
        self.ascending = !self.ascending;
        self
    }

    /// True for ascending order.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Direction as an enum.
    pub fn direction(&self) -> SortDirection {
        if self.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    /// Wrapped expression.
    pub fn expression(&self) -> NodeRef {
        self.expression
    }
}
