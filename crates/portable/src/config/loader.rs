// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML loader for marshaller and type configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! # portable.yaml
//! compact_footer: true
//! verify_hash: true
//! schema_cache_capacity: 512
//! types:
//!   - name: TestObject
//!     fields: [fByte, fBool, fInt]
//!   - name: TestOuterObject
//! ```
//!
//! Omitted keys keep their [`PortableConfig::default`] values.

use super::{PortableConfig, TypeConfiguration, TypeConfigurations};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// YAML configuration loader.
pub struct TypeConfigLoader;

/// Root YAML document structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfigDocument {
    pub compact_footer: Option<bool>,
    pub verify_hash: Option<bool>,
    pub schema_cache_capacity: Option<usize>,
    pub types: Vec<YamlTypeEntry>,
}

/// A single type entry.
#[derive(Debug, Deserialize)]
pub struct YamlTypeEntry {
    /// Type name (as passed to the writer).
    pub name: String,
    /// Declared field order (optional).
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl TypeConfigLoader {
    /// Load configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<PortableConfig> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigFileNotFound(format!("{}: {}", path.display(), e)))?;
        Self::parse_yaml(&yaml_content)
    }

    /// Parse YAML content.
    pub fn parse_yaml(yaml_content: &str) -> Result<PortableConfig> {
        let doc: YamlConfigDocument = serde_yaml::from_str(yaml_content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse YAML: {}", e)))?;
        Self::document_to_config(doc)
    }

    /// Convert a parsed document to a validated [`PortableConfig`].
    pub fn document_to_config(doc: YamlConfigDocument) -> Result<PortableConfig> {
        let mut config = PortableConfig::default();

        if let Some(compact) = doc.compact_footer {
            config.compact_footer = compact;
        }
        if let Some(verify) = doc.verify_hash {
            config.verify_hash = verify;
        }
        if let Some(capacity) = doc.schema_cache_capacity {
            config.schema_cache_capacity = capacity;
        }

        let mut types = TypeConfigurations::new();
        for entry in doc.types {
            if types.get(&entry.name).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "type '{}' configured twice",
                    entry.name
                )));
            }
            types.add(TypeConfiguration {
                type_name: entry.name,
                fields: entry.fields,
            })?;
        }
        config.types = types;

        config.validate()?;
        log::debug!(
            "[config] loaded {} type configuration(s), compact_footer={}",
            config.types.len(),
            config.compact_footer
        );
        Ok(config)
    }
}
