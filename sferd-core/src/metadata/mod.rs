//! Salesforce object metadata loader
//!
//! Reads an `objects` directory in either layout:
//!
//! - source format: `<Name>/<Name>.object-meta.xml` with field files under
//!   `<Name>/fields/*.field-meta.xml`
//! - metadata API format: `<Name>.object` files with inline `<fields>`
//!
//! Only a missing objects directory is fatal. Unreadable or malformed files
//! are recorded as [`LoadIssue`]s and loading moves on.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::ObjectNode;
use crate::{Error, Result};

pub mod xml;

pub use xml::{parse_field_str, parse_object_str};

const OBJECT_META_SUFFIX: &str = ".object-meta.xml";
const FIELD_META_SUFFIX: &str = ".field-meta.xml";
const MDAPI_OBJECT_EXTENSION: &str = "object";

/// A file that could not be turned into an object or field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Everything a load produced
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Loaded objects, sorted by API name
    pub objects: Vec<ObjectNode>,
    /// Files that were skipped because they failed to parse
    pub issues: Vec<LoadIssue>,
}

/// Walks an objects directory and parses every object it finds
#[derive(Debug, Clone)]
pub struct MetadataLoader {
    objects_path: PathBuf,
    filter: Option<BTreeSet<String>>,
}

impl MetadataLoader {
    /// Loader rooted at `objects_path`
    pub fn new(objects_path: impl Into<PathBuf>) -> Self {
        Self {
            objects_path: objects_path.into(),
            filter: None,
        }
    }

    /// Builder: only load the named objects. An empty list loads everything.
    #[must_use]
    pub fn with_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        self.filter = (!names.is_empty()).then_some(names);
        self
    }

    fn wanted(&self, name: &str) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(name))
    }

    /// Load every object under the root.
    ///
    /// # Errors
    ///
    /// [`Error::ObjectsPathNotFound`] when the root does not exist, or an I/O
    /// error when the root itself cannot be listed.
    pub fn load(&self) -> Result<LoadReport> {
        if !self.objects_path.is_dir() {
            return Err(Error::ObjectsPathNotFound(self.objects_path.clone()));
        }

        info!("Loading Salesforce objects from {}", self.objects_path.display());

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();

        for entry in WalkDir::new(&self.objects_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    report.issues.push(LoadIssue {
                        path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let Some((name, object_file)) = Self::object_file_for(entry.path()) else {
                continue;
            };
            if !self.wanted(&name) || seen.contains(&name) {
                continue;
            }

            match Self::load_object(&name, &object_file, &mut report.issues) {
                Ok(object) => {
                    debug!("Loaded object: {} ({})", object.name, object.label);
                    seen.insert(name);
                    report.objects.push(object);
                }
                Err(e) => {
                    warn!("Error loading {name}: {e}");
                    report.issues.push(LoadIssue {
                        path: object_file,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.objects.sort_by(|a, b| a.name.cmp(&b.name));
        info!(
            "Loaded {} objects ({} files skipped)",
            report.objects.len(),
            report.issues.len()
        );
        Ok(report)
    }

    /// Resolve a directory entry to `(object name, object file)`.
    fn object_file_for(path: &Path) -> Option<(String, PathBuf)> {
        if path.is_dir() {
            let name = path.file_name()?.to_str()?.to_string();
            let object_file = path.join(format!("{name}{OBJECT_META_SUFFIX}"));
            if object_file.is_file() {
                return Some((name, object_file));
            }
            debug!("Skipping {}: no {OBJECT_META_SUFFIX} file", path.display());
            return None;
        }

        if path.extension().and_then(|e| e.to_str()) == Some(MDAPI_OBJECT_EXTENSION) {
            let name = path.file_stem()?.to_str()?.to_string();
            return Some((name, path.to_path_buf()));
        }

        None
    }

    /// Parse one object file plus any sibling `fields/` directory.
    fn load_object(name: &str, object_file: &Path, issues: &mut Vec<LoadIssue>) -> Result<ObjectNode> {
        let content = std::fs::read_to_string(object_file)?;
        let mut object = parse_object_str(name, &content, object_file)?;

        let fields_dir = object_file
            .parent()
            .map(|dir| dir.join("fields"))
            .filter(|dir| dir.is_dir() && object_file.to_string_lossy().ends_with(OBJECT_META_SUFFIX));

        if let Some(fields_dir) = fields_dir {
            let mut known: HashSet<String> = object.fields.iter().map(|f| f.name.clone()).collect();

            for field_file in Self::field_files(&fields_dir) {
                let parsed = std::fs::read_to_string(&field_file)
                    .map_err(Error::from)
                    .and_then(|xml| xml::parse_field_str(name, &xml, &field_file));

                match parsed {
                    Ok(Some(field)) => {
                        if known.insert(field.name.clone()) {
                            object.fields.push(field);
                        }
                    }
                    Ok(None) => debug!("Skipping field without name or type: {}", field_file.display()),
                    Err(e) => {
                        warn!("Error parsing {}: {e}", field_file.display());
                        issues.push(LoadIssue {
                            path: field_file,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(object)
    }

    /// `*.field-meta.xml` files in `fields_dir`, sorted by file name
    fn field_files(fields_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(fields_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(FIELD_META_SUFFIX))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}
