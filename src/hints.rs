//! Collaborator inputs: the TOML-backed hint file and hierarchy file, and
//! the `SuperclassResolver` trait used for superclass member merging.

use crate::class::ClassRecord;
use crate::error::HintsError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// `"ClassName::methodName" -> size`, the historical array-return-hint
/// mechanism: entries populate `have_hint`/`hint_size` on functions whose
/// return type the parser could not size statically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HintFile {
    #[serde(flatten)]
    sizes: HashMap<String, u64>,
}

impl HintFile {
    pub fn load(path: &Path) -> Result<Self, HintsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    #[must_use]
    pub fn size_of(&self, class_name: &str, method_name: &str) -> Option<u64> {
        self.sizes.get(&format!("{class_name}::{method_name}")).copied()
    }

    /// Applies every hint entry to the class's functions.
    pub fn apply(&self, class: &mut ClassRecord<'_>) {
        for f in &mut class.functions {
            if let Some(size) = self.size_of(class.class_name, f.name) {
                f.have_hint = true;
                f.hint_size = size;
            }
        }
    }
}

/// `ClassName -> header-path`, used only by superclass merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyFile {
    #[serde(flatten)]
    headers: HashMap<String, String>,
}

impl HierarchyFile {
    pub fn load(path: &Path) -> Result<Self, HintsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    #[must_use]
    pub fn header_for(&self, class_name: &str) -> Option<&str> {
        self.headers.get(class_name).map(String::as_str)
    }
}

/// Resolves a superclass name to its already-parsed members, so the
/// driver can merge inherited functions/variables without this crate
/// owning the whole project's header graph.
///
/// A host application plugs in its own resolver (e.g. backed by a
/// [`HierarchyFile`] and a cache of previously wrapped classes); this
/// crate only defines the seam.
pub trait SuperclassResolver<'a> {
    fn resolve(&self, class_name: &str) -> Option<&ClassRecord<'a>>;
}

/// A resolver with no superclasses available: every lookup misses.
/// Useful for single-header jobs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuperclasses;

impl<'a> SuperclassResolver<'a> for NoSuperclasses {
    fn resolve(&self, _class_name: &str) -> Option<&ClassRecord<'a>> {
        None
    }
}
