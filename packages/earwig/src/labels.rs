//! Class labels, loaded once at startup.
//!
//! The YAML file is either a plain sequence or an index → name map. Position
//! in the resulting list is the class identity used by the model output.

use std::{collections::BTreeMap, fs, ops::Index, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelDoc {
    List(Vec<String>),
    Indexed(BTreeMap<usize, String>),
}

/// Immutable, ordered class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    pub fn new(names: Vec<String>) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::EmptyLabels);
        }
        Ok(Self { names })
    }

    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Labels { reason, .. } => ConfigError::Labels {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let doc: LabelDoc = serde_yaml::from_str(text).map_err(|e| ConfigError::Labels {
            path: Default::default(),
            reason: e.to_string(),
        })?;

        let names = match doc {
            LabelDoc::List(names) => names,
            LabelDoc::Indexed(map) => {
                // BTreeMap iterates in key order, so a gap shows up as the
                // first key that differs from its position.
                if let Some(missing) = map.keys().enumerate().find_map(|(i, &k)| (i != k).then_some(i))
                {
                    return Err(ConfigError::NonContiguousLabels { missing });
                }
                map.into_values().collect()
            }
        };
        Self::new(names)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Index<usize> for ClassLabels {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        &self.names[idx]
    }
}
