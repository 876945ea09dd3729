//! Rendering of query-tree nodes into textual query fragments.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::errors::Result;
use super::expression::ParameterExpression;
use super::order::Order;
use super::tree::QueryTree;
use crate::types::ExprId;

/// Prefix of aliases generated for roots that were not given one explicitly.
pub const GENERATED_ALIAS_PREFIX: &str = "generatedAlias";

/// Prefix of names generated for unnamed parameters.
pub const GENERATED_PARAMETER_PREFIX: &str = "param";

/// Cross-node state shared by one render pass.
///
/// A context must not be reused across passes over different trees, and a
/// single pass is strictly sequential.
pub trait RenderingContext {
    /// Allocates a fresh alias for a root.
    fn generate_alias(&mut self) -> String;

    /// Returns the placeholder text for `parameter`; the same parameter always
    /// yields the same placeholder within one context.
    fn register_explicit_parameter(&mut self, parameter: &ParameterExpression) -> String;
}

/// Context that numbers aliases and unnamed parameters in encounter order.
#[derive(Debug, Default)]
pub struct BasicRenderingContext {
    alias_count: usize,
    parameter_count: usize,
    implicit_names: FxHashMap<ExprId, String>,
}

impl BasicRenderingContext {
    /// Creates a context with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aliases handed out so far.
    pub fn aliases_generated(&self) -> usize {
        self.alias_count
    }
}

impl RenderingContext for BasicRenderingContext {
    fn generate_alias(&mut self) -> String {
        let alias = format!("{GENERATED_ALIAS_PREFIX}{}", self.alias_count);
        self.alias_count += 1;
        alias
    }

    fn register_explicit_parameter(&mut self, parameter: &ParameterExpression) -> String {
        if let Some(name) = parameter.name() {
            return format!(":{name}");
        }
        let count = &mut self.parameter_count;
        let name = self
            .implicit_names
            .entry(parameter.id())
            .or_insert_with(|| {
                let name = format!("{GENERATED_PARAMETER_PREFIX}{count}");
                *count += 1;
                name
            });
        format!(":{name}")
    }
}

/// Capability of rendering a node to query text.
pub trait Renderable {
    /// Renders the node where it appears inside a larger expression.
    fn render(&self, tree: &QueryTree, ctx: &mut dyn RenderingContext) -> Result<String>;

    /// Renders the node as a selected column.
    fn render_projection(
        &self,
        tree: &QueryTree,
        ctx: &mut dyn RenderingContext,
    ) -> Result<String> {
        self.render(tree, ctx)
    }
}

/// Renders an `ORDER BY` list: each wrapped expression followed by its direction.
pub fn render_order_by(
    tree: &QueryTree,
    orders: &[Order],
    ctx: &mut dyn RenderingContext,
) -> Result<String> {
    let mut terms = Vec::with_capacity(orders.len());
    for order in orders {
        let rendered = tree.render(order.expression(), ctx)?;
        terms.push(format!("{rendered} {}", order.direction()));
    }
    let list = terms.join(", ");
    trace!(terms = orders.len(), %list, "rendered order by");
    Ok(list)
}
