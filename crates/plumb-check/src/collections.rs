//! Named collections of categories

use plumb_core::{PlumbError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming the collection to use by default
pub const COLLECTION_ENV: &str = "PLUMB_COLLECTION";

const FALLBACK_COLLECTION: &str = "MDL";

/// One collection: a discipline and the categories it validates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDef {
    pub name: String,
    pub categories: Vec<String>,
}

impl CollectionDef {
    pub fn new(name: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Root structure of a collections TOML file
#[derive(Debug, Deserialize)]
struct CollectionsFile {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    collection: Vec<CollectionDef>,
}

/// The configured collections
#[derive(Debug, Clone)]
pub struct Collections {
    entries: Vec<CollectionDef>,
    default: Option<String>,
}

impl Collections {
    /// The stock collections
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CollectionDef::new("ANIM", &["Animation", "Scene"]),
                CollectionDef::new(
                    "MDL",
                    &["Modelling", "Geometry", "UV", "Shaders", "Render Stats", "Scene"],
                ),
                CollectionDef::new(
                    "RIG",
                    &["Rigging", "Skinning", "Shaders", "Render Stats", "Scene"],
                ),
                CollectionDef::new(
                    "SHD",
                    &["Shaders", "Textures", "UV", "Render Layers", "Render Stats", "Scene"],
                ),
            ],
            default: None,
        }
    }

    /// Load collections from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::load_string(&content)
    }

    /// Load collections from a TOML string
    pub fn load_string(content: &str) -> Result<Self> {
        let file: CollectionsFile = toml::from_str(content).map_err(|e| {
            PlumbError::ConfigError(format!("Failed to parse collections TOML: {}", e))
        })?;

        if file.collection.is_empty() {
            return Err(PlumbError::ConfigError(
                "collections file defines no collections".to_string(),
            ));
        }

        let mut entries: Vec<CollectionDef> = Vec::new();
        for def in file.collection {
            if def.categories.is_empty() {
                return Err(PlumbError::ConfigError(format!(
                    "collection '{}' has no categories",
                    def.name
                )));
            }
            if entries.iter().any(|e| e.name == def.name) {
                return Err(PlumbError::ConfigError(format!(
                    "collection '{}' is defined twice",
                    def.name
                )));
            }
            entries.push(def);
        }

        let collections = Self {
            entries,
            default: file.default,
        };
        if let Some(default) = &collections.default {
            if !collections.contains(default) {
                return Err(PlumbError::ConfigError(format!(
                    "default collection '{}' is not defined",
                    default
                )));
            }
        }
        Ok(collections)
    }

    /// Collection names, in definition order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn all(&self) -> &[CollectionDef] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Categories of the collection `name`
    pub fn categories(&self, name: &str) -> Result<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.categories.as_slice())
            .ok_or_else(|| PlumbError::UnknownCollection(name.to_string()))
    }

    /// Pick the collection to run.
    ///
    /// An explicit choice must exist. Otherwise `env` is used when it names
    /// a known collection, then the configured default, then `MDL`, then the
    /// first collection.
    pub fn choose(&self, explicit: Option<&str>, env: Option<&str>) -> Result<String> {
        if let Some(name) = explicit {
            return if self.contains(name) {
                Ok(name.to_string())
            } else {
                Err(PlumbError::UnknownCollection(name.to_string()))
            };
        }

        if let Some(name) = env.map(str::trim).filter(|n| !n.is_empty()) {
            if self.contains(name) {
                return Ok(name.to_string());
            }
            tracing::warn!(collection = name, "ignoring unknown collection from environment");
        }

        if let Some(name) = &self.default {
            return Ok(name.clone());
        }
        if self.contains(FALLBACK_COLLECTION) {
            return Ok(FALLBACK_COLLECTION.to_string());
        }
        self.entries
            .first()
            .map(|e| e.name.clone())
            .ok_or_else(|| PlumbError::ConfigError("no collections defined".to_string()))
    }

    /// [`Collections::choose`] with the environment read from
    /// [`COLLECTION_ENV`]
    pub fn choose_from_env(&self, explicit: Option<&str>) -> Result<String> {
        let env = std::env::var(COLLECTION_ENV).ok();
        self.choose(explicit, env.as_deref())
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
default = "LGT"

[[collection]]
name = "LGT"
categories = ["Render Layers", "Scene"]

[[collection]]
name = "ANIM"
categories = ["Animation"]
"#
    }

    #[test]
    fn test_builtin_collections() {
        let collections = Collections::builtin();
        assert_eq!(collections.names(), vec!["ANIM", "MDL", "RIG", "SHD"]);
        assert_eq!(
            collections.categories("ANIM").unwrap(),
            &["Animation".to_string(), "Scene".to_string()]
        );
        assert!(collections.categories("SHD").unwrap().contains(&"Render Layers".to_string()));
    }

    #[test]
    fn test_load_from_string() {
        let collections = Collections::load_string(sample_toml()).unwrap();
        assert_eq!(collections.names(), vec!["LGT", "ANIM"]);
        assert_eq!(collections.choose(None, None).unwrap(), "LGT");
    }

    #[test]
    fn test_unknown_collection() {
        let collections = Collections::builtin();
        assert!(matches!(
            collections.categories("LGT"),
            Err(PlumbError::UnknownCollection(_))
        ));
        assert!(matches!(
            collections.choose(Some("LGT"), None),
            Err(PlumbError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_choose_precedence() {
        let collections = Collections::builtin();
        assert_eq!(collections.choose(Some("RIG"), Some("ANIM")).unwrap(), "RIG");
        assert_eq!(collections.choose(None, Some("ANIM")).unwrap(), "ANIM");
        // Unknown environment values fall through to the default
        assert_eq!(collections.choose(None, Some("compositing")).unwrap(), "MDL");
        assert_eq!(collections.choose(None, None).unwrap(), "MDL");
    }

    #[test]
    fn test_no_mdl_falls_back_to_first() {
        let collections = Collections::load_string(
            r#"
[[collection]]
name = "FX"
categories = ["Scene"]
"#,
        )
        .unwrap();
        assert_eq!(collections.choose(None, None).unwrap(), "FX");
    }

    #[test]
    fn test_invalid_files() {
        assert!(Collections::load_string("").is_err());
        assert!(Collections::load_string("[[collection]]\nname = \"X\"\ncategories = []").is_err());
        assert!(Collections::load_string(
            "default = \"Y\"\n[[collection]]\nname = \"X\"\ncategories = [\"Scene\"]"
        )
        .is_err());
        assert!(Collections::load_string("[[collection]]\nname = 3").is_err());
    }
}
