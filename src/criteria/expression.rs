//! Expression nodes stored in a [`QueryTree`].

use std::fmt;

use super::errors::Result;
use super::parameter::{ParameterContainer, ParameterRegistry};
use super::render::{Renderable, RenderingContext};
use super::tree::QueryTree;
use super::value::Value;
use crate::types::{ExprId, NodeRef, PathId};

/// The synthetic "type of" operator applied to a path.
///
/// Created together with its owning path and never carries parameters.
#[derive(Clone, Debug)]
pub struct PathTypeExpression {
    path: PathId,
    java_type: String,
}

impl PathTypeExpression {
    pub(crate) fn new(path: PathId, java_type: impl Into<String>) -> Self {
        Self {
            path,
            java_type: java_type.into(),
        }
    }

    /// Path whose runtime type this expression denotes.
    pub fn path(&self) -> PathId {
        self.path
    }

    /// Declared type of the owning path.
    pub fn java_type(&self) -> &str {
        &self.java_type
    }
}

impl Renderable for PathTypeExpression {
    fn render(&self, tree: &QueryTree, _ctx: &mut dyn RenderingContext) -> Result<String> {
        Ok(format!("type({})", tree.path_identifier(self.path)?))
    }
}

impl ParameterContainer for PathTypeExpression {
    fn register_parameters(
        &self,
        _tree: &QueryTree,
        _registry: &mut ParameterRegistry,
    ) -> Result<()> {
        Ok(())
    }
}

/// Bind parameter placeholder, named or positional.
#[derive(Clone, Debug)]
pub struct ParameterExpression {
    id: ExprId,
    name: Option<String>,
    java_type: String,
}

impl ParameterExpression {
    pub(crate) fn new(id: ExprId, name: Option<String>, java_type: impl Into<String>) -> Self {
        Self {
            id,
            name,
            java_type: java_type.into(),
        }
    }

    /// Handle of this parameter inside its tree.
    pub fn id(&self) -> ExprId {
        self.id
    }

    /// Explicit name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared type of the bound value.
    pub fn java_type(&self) -> &str {
        &self.java_type
    }
}

/// Binary comparison operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        })
    }
}

/// Boolean junction operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JunctionOp {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl JunctionOp {
    fn keyword(self) -> &'static str {
        match self {
            JunctionOp::And => " and ",
            JunctionOp::Or => " or ",
        }
    }

    // Empty junctions still have to render as valid predicates.
    fn identity(self) -> &'static str {
        match self {
            JunctionOp::And => "1=1",
            JunctionOp::Or => "0=1",
        }
    }
}

/// Expression node.
#[derive(Clone, Debug)]
pub enum Expression {
    /// `type(<path>)`, owned by a path node.
    PathType(PathTypeExpression),
    /// Inline literal.
    Literal(Value),
    /// Bind parameter placeholder.
    Parameter(ParameterExpression),
    /// `lhs op rhs`.
    Comparison {
        /// Comparison operator.
        op: ComparisonOp,
        /// Left operand.
        lhs: NodeRef,
        /// Right operand.
        rhs: NodeRef,
    },
    /// Conjunction or disjunction of predicates.
    Junction {
        /// Junction operator.
        op: JunctionOp,
        /// Joined predicates.
        terms: Vec<NodeRef>,
    },
    /// Function call `name(args...)`.
    Function {
        /// Function name.
        name: String,
        /// Call arguments.
        args: Vec<NodeRef>,
    },
}

impl Expression {
    /// Direct child nodes, in rendering order.
    pub fn children(&self) -> Vec<NodeRef> {
        match self {
            Expression::PathType(_) | Expression::Literal(_) | Expression::Parameter(_) => {
                Vec::new()
            }
            Expression::Comparison { lhs, rhs, .. } => vec![*lhs, *rhs],
            Expression::Junction { terms, .. } => terms.clone(),
            Expression::Function { args, .. } => args.clone(),
        }
    }
}

impl Renderable for Expression {
    fn render(&self, tree: &QueryTree, ctx: &mut dyn RenderingContext) -> Result<String> {
        match self {
            Expression::PathType(expr) => expr.render(tree, ctx),
            Expression::Literal(value) => Ok(value.to_string()),
            Expression::Parameter(param) => Ok(ctx.register_explicit_parameter(param)),
            Expression::Comparison { op, lhs, rhs } => {
                let lhs = tree.render(*lhs, ctx)?;
                let rhs = tree.render(*rhs, ctx)?;
                Ok(format!("{lhs} {op} {rhs}"))
            }
            Expression::Junction { op, terms } => match terms.as_slice() {
                [] => Ok(op.identity().to_owned()),
                [single] => tree.render(*single, ctx),
                terms => {
                    let mut parts = Vec::with_capacity(terms.len());
                    for term in terms {
                        parts.push(tree.render(*term, ctx)?);
                    }
                    Ok(format!("( {} )", parts.join(op.keyword())))
                }
            },
            Expression::Function { name, args } => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(tree.render(*arg, ctx)?);
                }
                Ok(format!("{name}({})", parts.join(", ")))
            }
        }
    }
}

impl ParameterContainer for Expression {
    fn register_parameters(
        &self,
        tree: &QueryTree,
        registry: &mut ParameterRegistry,
    ) -> Result<()> {
        match self {
            Expression::Parameter(param) => {
                registry.register(param);
                Ok(())
            }
            Expression::PathType(expr) => expr.register_parameters(tree, registry),
            Expression::Literal(_) => Ok(()),
            Expression::Comparison { .. }
            | Expression::Junction { .. }
            | Expression::Function { .. } => {
                for child in self.children() {
                    tree.register_parameters(child, registry)?;
                }
                Ok(())
            }
        }
    }
}
