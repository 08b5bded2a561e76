//! Creature display names.
//!
//! Spawn events carry a (zone, template) pair. [`NameCache`] resolves each
//! pair once through a [`NameResolver`], falls back to `"<zone>-<template>"`
//! when the lookup fails, and remembers the name per spawned entity.

mod error;

pub use error::NamesError;

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tracker::TargetId;

/// Looks up creature names by zone and template.
pub trait NameResolver {
    fn lookup(&self, zone_id: u32, template_id: u32) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreatureEntry {
    zone_id: u32,
    template_id: u32,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct CreatureFile {
    #[serde(default)]
    creature: Vec<CreatureEntry>,
}

/// Static name table, usually loaded from TOML:
///
/// ```toml
/// [[creature]]
/// zone_id = 13
/// template_id = 1002
/// name = "Goblin"
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreatureNames {
    names: HashMap<(u32, u32), String>,
}

impl CreatureNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone_id: u32, template_id: u32, name: impl Into<String>) {
        self.names.insert((zone_id, template_id), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, NamesError> {
        let file: CreatureFile = toml::from_str(text).map_err(|source| NamesError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut names = Self::new();
        for entry in file.creature {
            names.insert(entry.zone_id, entry.template_id, entry.name);
        }
        Ok(names)
    }

    pub fn load(path: &Path) -> Result<Self, NamesError> {
        let text = fs::read_to_string(path).map_err(|source| NamesError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let names = Self::from_toml_str(&text, path)?;
        debug!(path = ?path, count = names.len(), "loaded creature names");
        Ok(names)
    }
}

impl NameResolver for CreatureNames {
    fn lookup(&self, zone_id: u32, template_id: u32) -> Option<String> {
        self.names.get(&(zone_id, template_id)).cloned()
    }
}

/// Memoized name resolution for spawned entities.
#[derive(Debug)]
pub struct NameCache<R: NameResolver> {
    resolver: R,
    templates: HashMap<(u32, u32), String>,
    entities: HashMap<TargetId, String>,
}

impl<R: NameResolver> NameCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            templates: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    /// Resolve the name for a (zone, template) pair, consulting the resolver
    /// only the first time the pair is seen.
    pub fn resolve(&mut self, zone_id: u32, template_id: u32) -> &str {
        let resolver = &self.resolver;
        self.templates
            .entry((zone_id, template_id))
            .or_insert_with(|| {
                resolver.lookup(zone_id, template_id).unwrap_or_else(|| {
                    warn!(zone_id, template_id, "could not resolve creature name");
                    fallback_name(zone_id, template_id)
                })
            })
            .as_str()
    }

    /// Remember the name of a freshly spawned entity.
    pub fn record_spawn(&mut self, entity: TargetId, zone_id: u32, template_id: u32) {
        let name = self.resolve(zone_id, template_id).to_string();
        self.entities.insert(entity, name);
    }

    pub fn name_for(&self, entity: TargetId) -> Option<&str> {
        self.entities.get(&entity).map(String::as_str)
    }
}

/// Synthetic name used when a (zone, template) pair cannot be resolved.
pub fn fallback_name(zone_id: u32, template_id: u32) -> String {
    format!("{zone_id}-{template_id}")
}
