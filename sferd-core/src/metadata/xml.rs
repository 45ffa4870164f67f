//! Serde views of the object and field metadata documents
//!
//! Salesforce metadata lives in the default namespace
//! `http://soap.sforce.com/2006/04/metadata`, so elements are matched by their
//! local names. Anything not listed here is skipped by the deserializer.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::models::{FieldDef, ObjectNode};
use crate::{Error, Result};

/// `<CustomObject>` root of `*.object-meta.xml` / `*.object`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectDocument {
    #[serde(default)]
    label: Option<String>,
    /// Inline fields, only present in the metadata API layout
    #[serde(default)]
    fields: Vec<FieldDocument>,
}

/// `<CustomField>` root of `*.field-meta.xml`, or an inline `<fields>` element
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDocument {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default, rename = "type")]
    field_type: Option<String>,
    #[serde(default)]
    required: Option<String>,
    /// Polymorphic lookups list several targets
    #[serde(default)]
    reference_to: Vec<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FieldDocument {
    /// Convert into a field owned by `owner`.
    ///
    /// A missing type is tolerated when the field references another object
    /// (standard relationship fields often omit it); it is then a lookup.
    fn into_field(self, owner: &str) -> Option<FieldDef> {
        let name = non_empty(self.full_name)?;
        let mut targets = self
            .reference_to
            .into_iter()
            .filter_map(|t| non_empty(Some(t)));
        let mut reference_to = targets.next();
        let extra: Vec<String> = targets.collect();
        if !extra.is_empty() {
            debug!(
                "{owner}.{name} references several objects, using {}; ignoring {}",
                reference_to.as_deref().unwrap_or_default(),
                extra.join(", ")
            );
        }
        let field_type = match (non_empty(self.field_type), &reference_to) {
            (Some(field_type), _) => field_type,
            (None, Some(_)) => "Lookup".to_string(),
            (None, None) => return None,
        };

        // Hierarchy fields always point back at their own object.
        if field_type == "Hierarchy" && reference_to.is_none() {
            reference_to = Some(owner.to_string());
        }

        let required = self
            .required
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("true"));

        Some(FieldDef {
            name,
            field_type,
            required,
            reference_to,
        })
    }
}

fn xml_error(path: &Path, err: &quick_xml::DeError) -> Error {
    Error::Xml {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Parse an object document. `source` is only used in error messages.
///
/// Returns the object with its inline fields; field files are appended by
/// the loader.
///
/// # Errors
///
/// [`Error::Xml`] when the document is not well-formed metadata.
pub fn parse_object_str(name: &str, xml: &str, source: &Path) -> Result<ObjectNode> {
    let doc: ObjectDocument = quick_xml::de::from_str(xml).map_err(|e| xml_error(source, &e))?;

    let label = non_empty(doc.label).unwrap_or_else(|| name.to_string());
    let mut seen = HashSet::new();
    let fields = doc
        .fields
        .into_iter()
        .filter_map(|f| f.into_field(name))
        .filter(|f| seen.insert(f.name.clone()))
        .collect();

    Ok(ObjectNode::new(name, label, fields))
}

/// Parse a single field document owned by `owner`.
///
/// `Ok(None)` means the document parsed but does not describe a usable
/// field (no name, or neither a type nor a reference).
///
/// # Errors
///
/// [`Error::Xml`] when the document is not well-formed metadata.
pub fn parse_field_str(owner: &str, xml: &str, source: &Path) -> Result<Option<FieldDef>> {
    let doc: FieldDocument = quick_xml::de::from_str(xml).map_err(|e| xml_error(source, &e))?;
    Ok(doc.into_field(owner))
}
