#![forbid(unsafe_code)]

//! Criteria query trees.
//!
//! Clients build a tree of path and expression nodes programmatically inside a
//! [`QueryTree`], then ask it to render query fragments and to enumerate its
//! bind parameters exactly once, in traversal order.

/// Error types for tree construction and rendering.
pub mod errors;

/// Expression nodes: literals, parameters, comparisons and the path type operator.
pub mod expression;

/// Managed types, attribute descriptors and the lookup used by navigation.
pub mod metamodel;

/// `ORDER BY` terms.
pub mod order;

/// Parameter registration protocol and registry.
pub mod parameter;

/// Path nodes and attribute navigation.
pub mod path;

/// Rendering context and the render capability.
pub mod render;

/// Projection items.
pub mod selection;

/// Arena owning the nodes of one query.
pub mod tree;

/// Literal values.
pub mod value;

pub use errors::{CriteriaError, CriteriaErrorWithCode, Result};
pub use expression::{ComparisonOp, Expression, JunctionOp, ParameterExpression, PathTypeExpression};
pub use metamodel::{
    Attribute, CollectionType, InMemoryMetamodel, ManagedType, MapAttribute, MetamodelProvider,
    PluralAttribute, SingularAttribute, TypeKind,
};
pub use order::{Order, SortDirection};
pub use parameter::{possible_parameter, ParameterContainer, ParameterRegistry};
pub use path::{PathKind, PathNode, RootPath};
pub use render::{render_order_by, BasicRenderingContext, Renderable, RenderingContext};
pub use selection::{CompoundSelection, Selection};
pub use tree::QueryTree;
pub use value::Value;
