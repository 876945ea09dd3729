//! Projection items of a query.

use super::errors::Result;
use super::parameter::{possible_parameter, ParameterContainer, ParameterRegistry};
use super::render::{Renderable, RenderingContext};
use super::tree::QueryTree;
use crate::types::{ExprId, NodeRef, PathId};

/// One selected item.
#[derive(Clone, Debug)]
pub enum Selection {
    /// A path or expression of the tree.
    Node(NodeRef),
    /// Several selections rendered as one comma separated list.
    Compound(CompoundSelection),
    /// Verbatim projection text; takes no part in parameter registration.
    Raw(String),
}

impl Selection {
    /// Verbatim projection text.
    pub fn raw(text: impl Into<String>) -> Self {
        Selection::Raw(text.into())
    }

    /// Groups `items` into one compound selection.
    pub fn compound(items: Vec<Selection>) -> Self {
        Selection::Compound(CompoundSelection { items })
    }

    /// Registration capability of this selection, if it has one.
    pub fn parameter_container<'a>(
        &'a self,
        tree: &'a QueryTree,
    ) -> Result<Option<&'a dyn ParameterContainer>> {
        match self {
            Selection::Node(node) => tree.container(*node).map(Some),
            Selection::Compound(compound) => Ok(Some(compound)),
            Selection::Raw(_) => Ok(None),
        }
    }
}

impl From<PathId> for Selection {
    fn from(id: PathId) -> Self {
        Selection::Node(id.into())
    }
}

impl From<ExprId> for Selection {
    fn from(id: ExprId) -> Self {
        Selection::Node(id.into())
    }
}

impl From<NodeRef> for Selection {
    fn from(node: NodeRef) -> Self {
        Selection::Node(node)
    }
}

impl Renderable for Selection {
    fn render(&self, tree: &QueryTree, ctx: &mut dyn RenderingContext) -> Result<String> {
        match self {
            Selection::Node(node) => tree.render(*node, ctx),
            Selection::Compound(compound) => compound.render(tree, ctx),
            Selection::Raw(text) => Ok(text.clone()),
        }
    }

    fn render_projection(
        &self,
        tree: &QueryTree,
        ctx: &mut dyn RenderingContext,
    ) -> Result<String> {
        match self {
            Selection::Node(node) => tree.render_projection(*node, ctx),
            Selection::Compound(compound) => compound.render_projection(tree, ctx),
            Selection::Raw(text) => Ok(text.clone()),
        }
    }
}

/// Ordered group of selections.
#[derive(Clone, Debug, Default)]
pub struct CompoundSelection {
    items: Vec<Selection>,
}

impl CompoundSelection {
    /// Grouped selections.
    pub fn items(&self) -> &[Selection] {
        &self.items
    }
}

impl ParameterContainer for CompoundSelection {
    fn register_parameters(
        &self,
        tree: &QueryTree,
        registry: &mut ParameterRegistry,
    ) -> Result<()> {
        for item in &self.items {
            possible_parameter(item, tree, registry)?;
        }
        Ok(())
    }
}

impl Renderable for CompoundSelection {
    fn render(&self, tree: &QueryTree, ctx: &mut dyn RenderingContext) -> Result<String> {
        self.render_projection(tree, ctx)
    }

    fn render_projection(
        &self,
        tree: &QueryTree,
        ctx: &mut dyn RenderingContext,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(self.items.len());
        for item in &self.items {
            parts.push(item.render_projection(tree, ctx)?);
        }
        Ok(parts.join(", "))
    }
}
