// src/catalog/mod.rs

//! In-memory tool catalog.
//!
//! Definitions are loaded once at process start from a persisted cache
//! directory, partitioned by backend family (`subscan/`, `assethub/`).
//! Regenerating the cache (scraping Subscan docs, walking AssetHub runtime
//! metadata) is an offline concern of the generator scripts; the running
//! process treats the directory as read-only input and the loaded catalog
//! as immutable for its whole lifetime.

pub mod definition;

pub use definition::{Backend, HttpMethod, ParamType, ParameterSchema, ParameterSpec, ToolDefinition};

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::CatalogError;

#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolCatalog {
    /// Loads every `*.json` definition under `dir/subscan` and `dir/assethub`.
    /// Both partitions must exist and contain at least one definition; an
    /// empty catalog is a startup failure, not something to serve queries on.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let mut tools = HashMap::new();
        Self::load_partition(&dir.join("subscan"), Backend::Subscan, &mut tools)?;
        Self::load_partition(&dir.join("assethub"), Backend::AssetHub, &mut tools)?;
        info!("loaded {} tool definitions from {}", tools.len(), dir.display());
        Ok(Self { tools })
    }

    /// Builds a catalog from in-memory definitions. Used by tests and by
    /// anything that wants to bypass the filesystem cache.
    pub fn from_definitions(defs: Vec<ToolDefinition>) -> Result<Self, CatalogError> {
        let mut tools = HashMap::new();
        for def in defs {
            def.validate()?;
            let name = def.name.clone();
            if tools.insert(name.clone(), def).is_some() {
                return Err(CatalogError::DuplicateName(name));
            }
        }
        Ok(Self { tools })
    }

    fn load_partition(
        dir: &Path,
        backend: Backend,
        tools: &mut HashMap<String, ToolDefinition>,
    ) -> Result<(), CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::MissingPartition(dir.display().to_string()));
        }

        let mut loaded = 0usize;
        let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
            file: dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                file: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let file = path.display().to_string();
            let contents = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                file: file.clone(),
                source,
            })?;
            let mut def: ToolDefinition =
                serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                    file: file.clone(),
                    source,
                })?;
            def.backend = backend;
            def.validate()?;
            if tools.contains_key(&def.name) {
                return Err(CatalogError::DuplicateName(def.name));
            }
            tools.insert(def.name.clone(), def);
            loaded += 1;
        }

        if loaded == 0 {
            warn!("no tool definitions found under {}", dir.display());
            return Err(CatalogError::MissingPartition(dir.display().to_string()));
        }
        info!("loaded {} {} tool definitions", loaded, backend);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Names of every tool belonging to a backend family, sorted for
    /// deterministic prompts and routing decisions.
    pub fn names_for_backend(&self, backend: Backend) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .values()
            .filter(|t| t.backend == backend)
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }
}
