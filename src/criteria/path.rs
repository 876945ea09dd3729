//! Path nodes: typed attribute navigation from a root.
//!
//! Each node remembers the children it has produced, keyed by attribute name,
//! so navigating twice to the same attribute from the same node yields the same
//! [`PathId`]. The cache is allocated on first use and only ever grows.

use std::cell::OnceCell;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::errors::{CriteriaError, Result};
use super::metamodel::{Attribute, MapAttribute, PluralAttribute, SingularAttribute};
use super::parameter::{ParameterContainer, ParameterRegistry};
use super::render::{Renderable, RenderingContext};
use super::tree::QueryTree;
use crate::types::{ExprId, PathId};

/// Root of a path chain: an entity with its query alias.
#[derive(Debug)]
pub struct RootPath {
    entity: String,
    alias: OnceCell<String>,
}

impl RootPath {
    pub(crate) fn new(entity: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.map(OnceCell::from).unwrap_or_default(),
        }
    }

    /// Entity type the root ranges over.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Alias, once explicitly given or prepared.
    pub fn alias(&self) -> Option<&str> {
        self.alias.get().map(String::as_str)
    }

    fn prepare_alias(&self, ctx: &mut dyn RenderingContext) -> &str {
        self.alias.get_or_init(|| {
            let alias = ctx.generate_alias();
            debug!(entity = %self.entity, %alias, "root alias generated");
            alias
        })
    }

    // Before alias preparation the entity name stands in for the alias.
    fn identifier(&self) -> &str {
        self.alias().unwrap_or(&self.entity)
    }
}

/// What a path node navigates over.
#[derive(Debug)]
pub enum PathKind {
    /// Query root.
    Root(RootPath),
    /// Single-valued attribute.
    Singular(SingularAttribute),
    /// Collection attribute.
    Plural(PluralAttribute),
    /// Map attribute; the node knows both key and value types.
    Map(MapAttribute),
}

impl PathKind {
    /// Declared result type of a path of this kind.
    pub fn java_type(&self) -> &str {
        match self {
            PathKind::Root(root) => root.entity(),
            PathKind::Singular(attr) => attr.java_type(),
            PathKind::Plural(attr) => attr.element_type(),
            PathKind::Map(attr) => attr.value_type(),
        }
    }
}

/// One step of attribute navigation.
#[derive(Debug)]
pub struct PathNode {
    kind: PathKind,
    source: Option<PathId>,
    type_expression: ExprId,
    children: Option<FxHashMap<String, PathId>>,
}

impl PathNode {
    pub(crate) fn new(kind: PathKind, source: Option<PathId>, type_expression: ExprId) -> Self {
        Self {
            kind,
            source,
            type_expression,
            children: None,
        }
    }

    /// Navigation kind.
    pub fn kind(&self) -> &PathKind {
        &self.kind
    }

    /// Declared result type.
    pub fn java_type(&self) -> &str {
        self.kind.java_type()
    }

    /// Node this path was derived from; `None` for roots.
    pub fn source(&self) -> Option<PathId> {
        self.source
    }

    /// The `type(...)` expression owned by this path.
    pub fn type_expression(&self) -> ExprId {
        self.type_expression
    }

    /// Attribute name, or the entity name for roots.
    pub fn name(&self) -> &str {
        match &self.kind {
            PathKind::Root(root) => root.entity(),
            PathKind::Singular(attr) => attr.name(),
            PathKind::Plural(attr) => attr.name(),
            PathKind::Map(attr) => attr.name(),
        }
    }

    /// Whether attribute navigation may continue from this node.
    ///
    /// Roots always can. Singular paths can when their target is an entity or
    /// an embeddable. Collection and map paths must be joined first.
    pub fn can_be_dereferenced(&self) -> bool {
        match &self.kind {
            PathKind::Root(_) => true,
            PathKind::Singular(attr) => attr.type_kind().is_managed(),
            PathKind::Plural(_) | PathKind::Map(_) => false,
        }
    }

    /// True for collection and map paths.
    pub fn is_collection(&self) -> bool {
        matches!(self.kind, PathKind::Plural(_) | PathKind::Map(_))
    }

    /// Key type of a map path.
    pub fn map_key_type(&self) -> Option<&str> {
        match &self.kind {
            PathKind::Map(attr) => Some(attr.key_type()),
            _ => None,
        }
    }

    /// Child previously produced for `attribute`.
    pub fn cached_child(&self, attribute: &str) -> Option<PathId> {
        self.children
            .as_ref()
            .and_then(|children| children.get(attribute).copied())
    }

    /// Number of cached children.
    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, FxHashMap::len)
    }

    fn register_child(&mut self, attribute: &str, child: PathId) {
        self.children
            .get_or_insert_with(FxHashMap::default)
            .insert(attribute.to_owned(), child);
    }

    fn identifier_segment(&self) -> &str {
        match &self.kind {
            PathKind::Root(root) => root.identifier(),
            _ => self.name(),
        }
    }
}

impl Renderable for PathNode {
    fn render(&self, tree: &QueryTree, ctx: &mut dyn RenderingContext) -> Result<String> {
        match (self.source, &self.kind) {
            (Some(source), _) => {
                tree.prepare_alias(source, ctx)?;
                Ok(format!("{}.{}", tree.path_identifier(source)?, self.name()))
            }
            (None, PathKind::Root(root)) => Ok(root.prepare_alias(ctx).to_owned()),
            (None, _) => Ok(self.name().to_owned()),
        }
    }
}

impl ParameterContainer for PathNode {
    fn register_parameters(
        &self,
        _tree: &QueryTree,
        _registry: &mut ParameterRegistry,
    ) -> Result<()> {
        Ok(())
    }
}

impl QueryTree {
    /// Navigates to a single-valued attribute of `path`.
    pub fn get_singular(&mut self, path: PathId, attribute: &SingularAttribute) -> Result<PathId> {
        self.attribute_path(
            path,
            attribute.declaring_type(),
            attribute.name(),
            |kind| matches!(kind, PathKind::Singular(_)),
            || PathKind::Singular(attribute.clone()),
        )
    }

    /// Navigates to a collection attribute of `path`.
    pub fn get_plural(&mut self, path: PathId, attribute: &PluralAttribute) -> Result<PathId> {
        self.attribute_path(
            path,
            attribute.declaring_type(),
            attribute.name(),
            |kind| matches!(kind, PathKind::Plural(_)),
            || PathKind::Plural(attribute.clone()),
        )
    }

    /// Navigates to a map attribute of `path`.
    pub fn get_map(&mut self, path: PathId, attribute: &MapAttribute) -> Result<PathId> {
        self.attribute_path(
            path,
            attribute.declaring_type(),
            attribute.name(),
            |kind| matches!(kind, PathKind::Map(_)),
            || PathKind::Map(attribute.clone()),
        )
    }

    /// Navigates to the attribute called `name`, resolved through the metamodel.
    pub fn get(&mut self, path: PathId, name: &str) -> Result<PathId> {
        self.ensure_dereferenceable(path)?;
        match self.locate_attribute(path, name)? {
            Attribute::Singular(attr) => self.get_singular(path, &attr),
            Attribute::Plural(attr) => self.get_plural(path, &attr),
            Attribute::Map(attr) => self.get_map(path, &attr),
        }
    }

    /// Follows a dotted attribute chain such as `customer.address.city`.
    pub fn get_dotted(&mut self, path: PathId, dotted: &str) -> Result<PathId> {
        dotted
            .split('.')
            .try_fold(path, |current, segment| self.get(current, segment))
    }

    /// Resolves `name` against the declared type of `path`.
    pub fn locate_attribute(&self, path: PathId, name: &str) -> Result<Attribute> {
        let node = self.path(path)?;
        let located = match node.kind() {
            PathKind::Root(root) => self.metamodel().locate_attribute(root.entity(), name),
            PathKind::Singular(attr) if attr.type_kind().is_managed() => {
                self.metamodel().locate_attribute(attr.java_type(), name)
            }
            _ => None,
        };
        located.ok_or_else(|| self.unknown_attribute(path, name))
    }

    /// The `type(...)` expression of `path`; the same handle on every call.
    pub fn type_expression(&self, path: PathId) -> Result<ExprId> {
        Ok(self.path(path)?.type_expression())
    }

    /// Node `path` was derived from.
    pub fn path_source(&self, path: PathId) -> Result<Option<PathId>> {
        Ok(self.path(path)?.source())
    }

    /// Whether navigation may continue from `path`.
    pub fn can_be_dereferenced(&self, path: PathId) -> Result<bool> {
        Ok(self.path(path)?.can_be_dereferenced())
    }

    /// Dotted identifier from the root down to `path`.
    pub fn path_identifier(&self, path: PathId) -> Result<String> {
        let mut segments = Vec::new();
        let mut current = self.path(path)?;
        loop {
            segments.push(current.identifier_segment());
            match current.source() {
                Some(source) => current = self.path(source)?,
                None => break,
            }
        }
        segments.reverse();
        Ok(segments.join("."))
    }

    /// Makes sure the root above `path` has its alias before anything renders.
    pub fn prepare_alias(&self, path: PathId, ctx: &mut dyn RenderingContext) -> Result<()> {
        let mut current = self.path(path)?;
        while let Some(source) = current.source() {
            current = self.path(source)?;
        }
        if let PathKind::Root(root) = current.kind() {
            root.prepare_alias(ctx);
        }
        Ok(())
    }

    fn attribute_path<F>(
        &mut self,
        path: PathId,
        declaring_type: &str,
        name: &str,
        same_kind: fn(&PathKind) -> bool,
        create: F,
    ) -> Result<PathId>
    where
        F: FnOnce() -> PathKind,
    {
        self.ensure_dereferenceable(path)?;
        let source = self.path(path)?;
        // Descriptors must come from the type the path resolves to.
        if source.java_type() != declaring_type {
            return Err(self.unknown_attribute(path, name));
        }
        if let Some(child) = source.cached_child(name) {
            if !same_kind(self.path(child)?.kind()) {
                return Err(self.unknown_attribute(path, name));
            }
            trace!(parent = ?path, attribute = name, child = ?child, "attribute path cache hit");
            return Ok(child);
        }
        let child = self.push_path(create(), Some(path));
        self.path_mut(path)?.register_child(name, child);
        debug!(parent = ?path, attribute = name, child = ?child, "attribute path created");
        Ok(child)
    }

    fn ensure_dereferenceable(&self, path: PathId) -> Result<()> {
        if self.path(path)?.can_be_dereferenced() {
            return Ok(());
        }
        Err(CriteriaError::IllegalDereference {
            path: self.path_identifier(path).ok(),
        })
    }

    fn unknown_attribute(&self, path: PathId, name: &str) -> CriteriaError {
        let identifier = match self.path(path).ok().and_then(PathNode::source) {
            Some(_) => self.path_identifier(path).ok(),
            None => None,
        };
        CriteriaError::unknown_attribute(name, identifier)
    }
}
