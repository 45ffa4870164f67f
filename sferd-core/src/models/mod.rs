//! Data model for Salesforce schema graphs
//!
//! - [`ObjectNode`]: one sObject with its fields and category
//! - [`FieldDef`]: one field as read from metadata
//! - [`RelationshipEdge`]: a child-to-parent reference between two objects

use serde::{Deserialize, Serialize};

/// Suffixes Salesforce appends to customer-defined API names
const CUSTOM_SUFFIXES: [&str; 5] = ["__c", "__mdt", "__e", "__b", "__x"];

/// Which kind of object this is, used for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectCategory {
    /// Shipped by Salesforce (`Account`, `Contact`, ...)
    Standard,
    /// Defined in this org (`Invoice__c`)
    Custom,
    /// Installed from a managed package (`pkg__Invoice__c`)
    Managed,
}

impl ObjectCategory {
    /// Classify an object by its API name.
    ///
    /// A custom suffix makes the object custom unless a namespace prefix
    /// precedes it; any other `__` in the name means a packaged object.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        if let Some(suffix) = CUSTOM_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
            let stem = &name[..name.len() - suffix.len()];
            if stem.contains("__") {
                Self::Managed
            } else {
                Self::Custom
            }
        } else if name.contains("__") {
            Self::Managed
        } else {
            Self::Standard
        }
    }

    /// All categories in display order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Standard, Self::Custom, Self::Managed]
    }
}

impl std::fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Custom => write!(f, "custom"),
            Self::Managed => write!(f, "managed"),
        }
    }
}

/// Relationship strength between a child object and its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// Cascading parent-child link
    MasterDetail,
    /// Weak reference
    Lookup,
}

impl RelationshipKind {
    /// Map a metadata field type onto a relationship kind.
    ///
    /// Returns `None` for non-relationship types.
    #[must_use]
    pub fn from_field_type(field_type: &str) -> Option<Self> {
        match field_type {
            "MasterDetail" => Some(Self::MasterDetail),
            "Lookup" | "MetadataRelationship" | "ExternalLookup" | "IndirectLookup"
            | "Hierarchy" => Some(Self::Lookup),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MasterDetail => write!(f, "Master-Detail"),
            Self::Lookup => write!(f, "Lookup"),
        }
    }
}

/// A field as read from metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// API name (`AccountId`, `Invoice__c`)
    pub name: String,
    /// Metadata type (`Text`, `Lookup`, `MasterDetail`, ...)
    pub field_type: String,
    /// `<required>true</required>`
    pub required: bool,
    /// Parent object for relationship fields
    pub reference_to: Option<String>,
}

impl FieldDef {
    /// Create a plain (non-relationship) field
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required: false,
            reference_to: None,
        }
    }

    /// Builder: mark the field as required
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Builder: set the referenced object
    #[must_use]
    pub fn referencing(mut self, target: impl Into<String>) -> Self {
        self.reference_to = Some(target.into());
        self
    }

    /// Relationship kind when this field links to another object
    #[must_use]
    pub fn relationship_kind(&self) -> Option<RelationshipKind> {
        self.reference_to.as_ref()?;
        RelationshipKind::from_field_type(&self.field_type)
    }

    /// Lookup or master-detail field with a known target
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        self.relationship_kind().is_some()
    }
}

/// One sObject, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectNode {
    /// API name, taken from the metadata directory name
    pub name: String,
    /// Display label, falls back to the API name
    pub label: String,
    pub category: ObjectCategory,
    /// Fields in metadata order
    pub fields: Vec<FieldDef>,
}

impl ObjectNode {
    /// Create an object, classifying it by name
    pub fn new(name: impl Into<String>, label: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let name = name.into();
        Self {
            category: ObjectCategory::classify(&name),
            label: label.into(),
            name,
            fields,
        }
    }

    /// Fields that reference another object
    pub fn relationship_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    /// Look up a field by API name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Child-to-parent reference derived from a relationship field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// Child object (owner of the field)
    pub source: String,
    /// Parent object
    pub target: String,
    pub kind: RelationshipKind,
    /// Field on `source` that holds the reference
    pub field: String,
    /// Edge caption
    pub label: String,
}

impl RelationshipEdge {
    /// Edge for `field` on `source`; the label is the field name
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: RelationshipKind,
        field: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            label: field.clone(),
            field,
        }
    }

    /// Both ends are the same object
    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.source == self.target
    }
}
