//! Metamodel describing managed types and their attributes.
//!
//! Paths resolve attribute names through a [`MetamodelProvider`]. The resolved
//! descriptor is a closed [`Attribute`] enum, so navigation branches on the
//! plurality tag instead of inspecting attribute objects at runtime. Target
//! kinds (basic, entity, embeddable) are settled when the metamodel is built,
//! which is what makes a singular path dereferenceable or not.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{CriteriaError, Result};

/// Classification of a type referenced by the metamodel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Scalar leaf type (strings, numbers, dates, ...).
    Basic,
    /// Entity type with its own identity.
    Entity,
    /// Embeddable value type nested inside an owner.
    Embeddable,
}

impl TypeKind {
    /// True for entity and embeddable types, the only ones with attributes.
    pub fn is_managed(self) -> bool {
        !matches!(self, TypeKind::Basic)
    }
}

/// Collection shape of a plural, non-map attribute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Unordered collection allowing duplicates.
    #[default]
    Bag,
    /// Ordered collection.
    List,
    /// Unordered collection without duplicates.
    Set,
}

/// Single-valued attribute descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SingularAttribute {
    name: String,
    declaring_type: String,
    java_type: String,
    type_kind: TypeKind,
}

impl SingularAttribute {
    /// Creates a descriptor for `declaring_type.name` of type `java_type`.
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        java_type: impl Into<String>,
        type_kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            java_type: java_type.into(),
            type_kind,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type declaring the attribute.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Target type of the attribute.
    pub fn java_type(&self) -> &str {
        &self.java_type
    }

    /// Classification of the target type.
    pub fn type_kind(&self) -> TypeKind {
        self.type_kind
    }
}

/// Collection-valued attribute descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PluralAttribute {
    name: String,
    declaring_type: String,
    collection_type: CollectionType,
    element_type: String,
    element_kind: TypeKind,
}

impl PluralAttribute {
    /// Creates a collection descriptor holding `element_type` elements.
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        collection_type: CollectionType,
        element_type: impl Into<String>,
        element_kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            collection_type,
            element_type: element_type.into(),
            element_kind,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type declaring the attribute.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Collection shape.
    pub fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    /// Element type.
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Classification of the element type.
    pub fn element_kind(&self) -> TypeKind {
        self.element_kind
    }
}

/// Map-valued attribute descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MapAttribute {
    name: String,
    declaring_type: String,
    key_type: String,
    value_type: String,
    value_kind: TypeKind,
}

impl MapAttribute {
    /// Creates a map descriptor from `key_type` to `value_type`.
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        key_type: impl Into<String>,
        value_type: impl Into<String>,
        value_kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            key_type: key_type.into(),
            value_type: value_type.into(),
            value_kind,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type declaring the attribute.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Map key type.
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Map value type.
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    /// Classification of the value type.
    pub fn value_kind(&self) -> TypeKind {
        self.value_kind
    }
}

/// Attribute descriptor tagged by plurality.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Attribute {
    /// Single-valued attribute.
    Singular(SingularAttribute),
    /// Collection attribute (bag, list or set).
    Plural(PluralAttribute),
    /// Map attribute.
    Map(MapAttribute),
}

impl Attribute {
    /// Attribute name.
    pub fn name(&self) -> &str {
        match self {
            Attribute::Singular(attr) => attr.name(),
            Attribute::Plural(attr) => attr.name(),
            Attribute::Map(attr) => attr.name(),
        }
    }

    /// Type declaring the attribute.
    pub fn declaring_type(&self) -> &str {
        match self {
            Attribute::Singular(attr) => attr.declaring_type(),
            Attribute::Plural(attr) => attr.declaring_type(),
            Attribute::Map(attr) => attr.declaring_type(),
        }
    }

    /// True for collection and map attributes.
    pub fn is_collection(&self) -> bool {
        !matches!(self, Attribute::Singular(_))
    }

    /// Type a path over this attribute evaluates to.
    pub fn java_type(&self) -> &str {
        match self {
            Attribute::Singular(attr) => attr.java_type(),
            Attribute::Plural(attr) => attr.element_type(),
            Attribute::Map(attr) => attr.value_type(),
        }
    }
}

/// Entity or embeddable type with its attributes.
#[derive(Clone, Debug, Serialize)]
pub struct ManagedType {
    name: String,
    kind: TypeKind,
    attributes: BTreeMap<String, Attribute>,
}

impl ManagedType {
    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity or embeddable.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }
}

/// Attribute lookup consumed by path navigation.
pub trait MetamodelProvider {
    /// Returns the managed type registered under `name`.
    fn managed_type(&self, name: &str) -> Option<&ManagedType>;

    /// Resolves `attribute` against `type_name`; `None` when either is unknown.
    fn locate_attribute(&self, type_name: &str, attribute: &str) -> Option<Attribute> {
        self.managed_type(type_name)
            .and_then(|ty| ty.attribute(attribute))
            .cloned()
    }

    /// Classifies `name`; anything unregistered is a basic type.
    fn type_kind(&self, name: &str) -> TypeKind {
        self.managed_type(name)
            .map(ManagedType::kind)
            .unwrap_or(TypeKind::Basic)
    }
}

/// Metamodel held entirely in memory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InMemoryMetamodel {
    types: BTreeMap<String, ManagedType>,
}

impl InMemoryMetamodel {
    /// Starts a new builder.
    pub fn builder() -> MetamodelBuilder {
        MetamodelBuilder::default()
    }

    /// Parses a TOML metamodel description.
    ///
    /// ```toml
    /// [entities.Order.attributes]
    /// customer = { kind = "singular", type = "Customer" }
    /// lines = { kind = "collection", collection = "list", element = "OrderLine" }
    /// notes = { kind = "map", key = "String", value = "String" }
    ///
    /// [embeddables.Address.attributes]
    /// city = { kind = "singular", type = "String" }
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let raw: RawMetamodel =
            toml::from_str(input).map_err(|err| CriteriaError::Metamodel(err.to_string()))?;
        let mut builder = Self::builder();
        for (name, ty) in raw.entities {
            builder = builder.declare(name, TypeKind::Entity, ty.attributes);
        }
        for (name, ty) in raw.embeddables {
            builder = builder.declare(name, TypeKind::Embeddable, ty.attributes);
        }
        builder.build()
    }

    /// Reads and parses a TOML metamodel file.
    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path)?;
        let model = Self::from_toml_str(&input)?;
        debug!(path = %path.display(), types = model.types.len(), "metamodel loaded");
        Ok(model)
    }

    /// Entity type names in name order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.types
            .values()
            .filter(|ty| ty.kind == TypeKind::Entity)
            .map(ManagedType::name)
    }
}

impl MetamodelProvider for InMemoryMetamodel {
    fn managed_type(&self, name: &str) -> Option<&ManagedType> {
        self.types.get(name)
    }
}

/// Declarative builder for [`InMemoryMetamodel`].
///
/// Attribute targets are plain type names; whether a name denotes an entity,
/// an embeddable or a basic type is only settled in [`MetamodelBuilder::build`],
/// so types may reference each other in any declaration order.
#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    types: Vec<(String, TypeKind, BTreeMap<String, RawAttribute>)>,
}

impl MetamodelBuilder {
    /// Declares an entity type.
    pub fn entity<F>(self, name: impl Into<String>, attributes: F) -> Self
    where
        F: FnOnce(TypeDecl) -> TypeDecl,
    {
        let decl = attributes(TypeDecl::default());
        self.declare(name.into(), TypeKind::Entity, decl.attributes)
    }

    /// Declares an embeddable type.
    pub fn embeddable<F>(self, name: impl Into<String>, attributes: F) -> Self
    where
        F: FnOnce(TypeDecl) -> TypeDecl,
    {
        let decl = attributes(TypeDecl::default());
        self.declare(name.into(), TypeKind::Embeddable, decl.attributes)
    }

    fn declare(
        mut self,
        name: String,
        kind: TypeKind,
        attributes: BTreeMap<String, RawAttribute>,
    ) -> Self {
        self.types.push((name, kind, attributes));
        self
    }

    /// Resolves target kinds and produces the metamodel.
    pub fn build(self) -> Result<InMemoryMetamodel> {
        let mut kinds = BTreeMap::new();
        for (name, kind, _) in &self.types {
            if name.trim().is_empty() {
                return Err(CriteriaError::Metamodel("type name cannot be empty".into()));
            }
            if kinds.insert(name.clone(), *kind).is_some() {
                return Err(CriteriaError::Metamodel(format!(
                    "type '{name}' declared more than once"
                )));
            }
        }
        let kind_of = |name: &str| kinds.get(name).copied().unwrap_or(TypeKind::Basic);

        let mut types = BTreeMap::new();
        for (name, kind, raw_attributes) in self.types {
            let mut attributes = BTreeMap::new();
            for (attr_name, raw) in raw_attributes {
                if attr_name.contains('.') || attr_name.trim().is_empty() {
                    return Err(CriteriaError::Metamodel(format!(
                        "invalid attribute name '{attr_name}' on '{name}'"
                    )));
                }
                let attribute = match raw {
                    RawAttribute::Singular { java_type } => {
                        let target = kind_of(&java_type);
                        Attribute::Singular(SingularAttribute::new(
                            &name, &attr_name, java_type, target,
                        ))
                    }
                    RawAttribute::Collection {
                        collection,
                        element,
                    } => {
                        let target = kind_of(&element);
                        Attribute::Plural(PluralAttribute::new(
                            &name, &attr_name, collection, element, target,
                        ))
                    }
                    RawAttribute::Map { key, value } => {
                        let target = kind_of(&value);
                        Attribute::Map(MapAttribute::new(&name, &attr_name, key, value, target))
                    }
                };
                attributes.insert(attr_name, attribute);
            }
            types.insert(
                name.clone(),
                ManagedType {
                    name,
                    kind,
                    attributes,
                },
            );
        }
        Ok(InMemoryMetamodel { types })
    }
}

/// Attribute declarations of one managed type.
#[derive(Debug, Default)]
pub struct TypeDecl {
    attributes: BTreeMap<String, RawAttribute>,
}

impl TypeDecl {
    /// Declares a single-valued attribute.
    pub fn singular(mut self, name: impl Into<String>, java_type: impl Into<String>) -> Self {
        self.attributes.insert(
            name.into(),
            RawAttribute::Singular {
                java_type: java_type.into(),
            },
        );
        self
    }

    /// Declares a collection attribute.
    pub fn collection(
        mut self,
        name: impl Into<String>,
        collection: CollectionType,
        element: impl Into<String>,
    ) -> Self {
        self.attributes.insert(
            name.into(),
            RawAttribute::Collection {
                collection,
                element: element.into(),
            },
        );
        self
    }

    /// Declares a map attribute.
    pub fn map(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.insert(
            name.into(),
            RawAttribute::Map {
                key: key.into(),
                value: value.into(),
            },
        );
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetamodel {
    #[serde(default)]
    entities: BTreeMap<String, RawType>,
    #[serde(default)]
    embeddables: BTreeMap<String, RawType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    #[serde(default)]
    attributes: BTreeMap<String, RawAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawAttribute {
    Singular {
        #[serde(rename = "type")]
        java_type: String,
    },
    Collection {
        #[serde(default)]
        collection: CollectionType,
        element: String,
    },
    Map {
        key: String,
        value: String,
    },
}
