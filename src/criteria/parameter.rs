//! Collection of bind parameters embedded in a query tree.
//!
//! Every node that may be or contain a parameter implements
//! [`ParameterContainer`]. Composite nodes delegate to each child; only
//! standalone placeholders append themselves. The compiler runs one pass per
//! rendered tree and binds values in the registry's order.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::errors::Result;
use super::expression::ParameterExpression;
use super::selection::Selection;
use super::tree::QueryTree;
use crate::types::ExprId;

/// Component capable of either being a parameter or containing parameters.
pub trait ParameterContainer {
    /// Registers every parameter reachable from this node with `registry`.
    fn register_parameters(&self, tree: &QueryTree, registry: &mut ParameterRegistry)
        -> Result<()>;
}

/// Sweeps a selection that may or may not take part in parameter registration.
///
/// Selections expose the capability as an `Option`, so heterogeneous
/// projection lists can be swept without inspecting their concrete types.
pub fn possible_parameter(
    selection: &Selection,
    tree: &QueryTree,
    registry: &mut ParameterRegistry,
) -> Result<()> {
    match selection.parameter_container(tree)? {
        Some(container) => container.register_parameters(tree, registry),
        None => Ok(()),
    }
}

/// Ordered set of parameter placeholders found during a registration pass.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    parameters: Vec<ParameterExpression>,
    seen: FxHashSet<ExprId>,
}

impl ParameterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `parameter` unless it was already registered. Returns true when added.
    pub fn register(&mut self, parameter: &ParameterExpression) -> bool {
        if !self.seen.insert(parameter.id()) {
            return false;
        }
        trace!(param = ?parameter.id(), name = ?parameter.name(), "parameter registered");
        self.parameters.push(parameter.clone());
        true
    }

    /// True when `id` has been registered.
    pub fn contains(&self, id: ExprId) -> bool {
        self.seen.contains(&id)
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterExpression> {
        self.parameters.iter()
    }

    /// Handles of the registered parameters, in registration order.
    pub fn ids(&self) -> Vec<ExprId> {
        self.parameters.iter().map(ParameterExpression::id).collect()
    }
}
