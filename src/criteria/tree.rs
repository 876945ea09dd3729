//! Arena owning every node of one query.
//!
//! Nodes are only ever appended, so a path's source always has a lower index
//! than the path itself. Children refer to their parent by index; the parent
//! reaches its children through its attribute cache. Ownership therefore stays
//! strictly tree shaped and no navigation sequence can produce a cycle.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::errors::{CriteriaError, Result};
use super::expression::{
    ComparisonOp, Expression, JunctionOp, ParameterExpression, PathTypeExpression,
};
use super::metamodel::{MetamodelProvider, TypeKind};
use super::parameter::{possible_parameter, ParameterContainer, ParameterRegistry};
use super::path::{PathKind, PathNode, RootPath};
use super::render::{Renderable, RenderingContext};
use super::selection::Selection;
use super::value::Value;
use crate::types::{ExprId, NodeRef, PathId};

/// Owner of the path and expression nodes of one query.
pub struct QueryTree {
    metamodel: Arc<dyn MetamodelProvider>,
    paths: Vec<PathNode>,
    expressions: Vec<Expression>,
}

impl QueryTree {
    /// Creates an empty tree resolving attributes through `metamodel`.
    pub fn new(metamodel: Arc<dyn MetamodelProvider>) -> Self {
        Self {
            metamodel,
            paths: Vec::new(),
            expressions: Vec::new(),
        }
    }

    /// Metamodel used for attribute resolution.
    pub fn metamodel(&self) -> &dyn MetamodelProvider {
        self.metamodel.as_ref()
    }

    /// Adds a root over `entity`; its alias is generated on first render.
    pub fn root(&mut self, entity: &str) -> Result<PathId> {
        self.push_root(entity, None)
    }

    /// Adds a root over `entity` with an explicit alias.
    pub fn root_with_alias(&mut self, entity: &str, alias: impl Into<String>) -> Result<PathId> {
        self.push_root(entity, Some(alias.into()))
    }

    fn push_root(&mut self, entity: &str, alias: Option<String>) -> Result<PathId> {
        if self.metamodel.type_kind(entity) != TypeKind::Entity {
            return Err(CriteriaError::UnknownManagedType {
                name: entity.to_owned(),
            });
        }
        let id = self.push_path(PathKind::Root(RootPath::new(entity, alias)), None);
        debug!(root = ?id, entity, "root created");
        Ok(id)
    }

    pub(crate) fn push_path(&mut self, kind: PathKind, source: Option<PathId>) -> PathId {
        let id = PathId(self.paths.len());
        let type_expression = self.push_expression(Expression::PathType(PathTypeExpression::new(
            id,
            kind.java_type(),
        )));
        self.paths.push(PathNode::new(kind, source, type_expression));
        id
    }

    fn push_expression(&mut self, expression: Expression) -> ExprId {
        let id = ExprId(self.expressions.len());
        self.expressions.push(expression);
        id
    }

    /// Path node addressed by `id`.
    pub fn path(&self, id: PathId) -> Result<&PathNode> {
        self.paths
            .get(id.index())
            .ok_or(CriteriaError::UnknownNode { node: id.into() })
    }

    pub(crate) fn path_mut(&mut self, id: PathId) -> Result<&mut PathNode> {
        self.paths
            .get_mut(id.index())
            .ok_or(CriteriaError::UnknownNode { node: id.into() })
    }

    /// Expression node addressed by `id`.
    pub fn expression(&self, id: ExprId) -> Result<&Expression> {
        self.expressions
            .get(id.index())
            .ok_or(CriteriaError::UnknownNode { node: id.into() })
    }

    /// Number of path nodes in the tree.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of expression nodes in the tree, type expressions included.
    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }

    /// Adds an inline literal.
    pub fn literal(&mut self, value: impl Into<Value>) -> ExprId {
        self.push_expression(Expression::Literal(value.into()))
    }

    /// Adds a bind parameter; unnamed parameters get a generated name on render.
    pub fn parameter(&mut self, name: Option<&str>, java_type: &str) -> ExprId {
        let id = ExprId(self.expressions.len());
        self.push_expression(Expression::Parameter(ParameterExpression::new(
            id,
            name.map(str::to_owned),
            java_type,
        )))
    }

    /// Adds `lhs op rhs`.
    pub fn comparison(
        &mut self,
        op: ComparisonOp,
        lhs: impl Into<NodeRef>,
        rhs: impl Into<NodeRef>,
    ) -> Result<ExprId> {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        self.check(lhs)?;
        self.check(rhs)?;
        Ok(self.push_expression(Expression::Comparison { op, lhs, rhs }))
    }

    /// Adds the conjunction of `terms`.
    pub fn and(&mut self, terms: Vec<NodeRef>) -> Result<ExprId> {
        self.junction(JunctionOp::And, terms)
    }

    /// Adds the disjunction of `terms`.
    pub fn or(&mut self, terms: Vec<NodeRef>) -> Result<ExprId> {
        self.junction(JunctionOp::Or, terms)
    }

    fn junction(&mut self, op: JunctionOp, terms: Vec<NodeRef>) -> Result<ExprId> {
        for term in &terms {
            self.check(*term)?;
        }
        Ok(self.push_expression(Expression::Junction { op, terms }))
    }

    /// Adds a function call.
    pub fn function(&mut self, name: impl Into<String>, args: Vec<NodeRef>) -> Result<ExprId> {
        for arg in &args {
            self.check(*arg)?;
        }
        Ok(self.push_expression(Expression::Function {
            name: name.into(),
            args,
        }))
    }

    fn check(&self, node: NodeRef) -> Result<()> {
        self.container(node).map(|_| ())
    }

    /// Registration capability of `node`.
    pub fn container(&self, node: NodeRef) -> Result<&dyn ParameterContainer> {
        let node: &dyn ParameterContainer = match node {
            NodeRef::Path(id) => self.path(id)?,
            NodeRef::Expr(id) => self.expression(id)?,
        };
        Ok(node)
    }

    fn renderable(&self, node: NodeRef) -> Result<&dyn Renderable> {
        let node: &dyn Renderable = match node {
            NodeRef::Path(id) => self.path(id)?,
            NodeRef::Expr(id) => self.expression(id)?,
        };
        Ok(node)
    }

    /// Renders `node` where it appears inside a larger expression.
    pub fn render(&self, node: NodeRef, ctx: &mut dyn RenderingContext) -> Result<String> {
        self.renderable(node)?.render(self, ctx)
    }

    /// Renders `node` as a selected column.
    pub fn render_projection(
        &self,
        node: NodeRef,
        ctx: &mut dyn RenderingContext,
    ) -> Result<String> {
        self.renderable(node)?.render_projection(self, ctx)
    }

    /// Registers the parameters reachable from `node`.
    pub fn register_parameters(
        &self,
        node: NodeRef,
        registry: &mut ParameterRegistry,
    ) -> Result<()> {
        self.container(node)?.register_parameters(self, registry)
    }

    /// Runs one registration pass over `selections`.
    pub fn collect_parameters(&self, selections: &[Selection]) -> Result<ParameterRegistry> {
        let mut registry = ParameterRegistry::new();
        for selection in selections {
            possible_parameter(selection, self, &mut registry)?;
        }
        debug!(parameters = registry.len(), "parameters collected");
        Ok(registry)
    }
}

impl fmt::Debug for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTree")
            .field("paths", &self.paths)
            .field("expressions", &self.expressions)
            .finish_non_exhaustive()
    }
}
