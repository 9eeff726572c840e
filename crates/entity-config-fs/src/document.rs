//! Format-agnostic document loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Serialization formats understood by [`DocumentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a path's extension.
    ///
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic document store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently. Saves are atomic.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let format = DocumentFormat::from_path(path)?;
        let content = io::read_text(path)?;
        Self::parse(path, format, &content)
    }

    /// Load a document, returning `None` when the file does not exist.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let format = DocumentFormat::from_path(path)?;
        match io::read_text_optional(path)? {
            Some(content) => Self::parse(path, format, &content).map(Some),
            None => Ok(None),
        }
    }

    /// Save a document to a file, creating parent directories as needed.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let format = DocumentFormat::from_path(path)?;
        let serialize_error = |message: String| Error::Serialize {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        let content = match format {
            DocumentFormat::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            DocumentFormat::Json => {
                serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            DocumentFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))?
            }
        };

        io::write_atomic(path, content.as_bytes())
    }

    fn parse<T: DeserializeOwned>(path: &Path, format: DocumentFormat, content: &str) -> Result<T> {
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            format: format.name().into(),
            message,
        };

        match format {
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            DocumentFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ScopeFile {
        name: String,
        indexed: Vec<String>,
        defaults: BTreeMap<String, String>,
    }

    fn sample() -> ScopeFile {
        ScopeFile {
            name: "datagrid".into(),
            indexed: vec!["is_visible".into()],
            defaults: BTreeMap::from([("is_visible".into(), "1".into())]),
        }
    }

    #[rstest]
    #[case("scope.toml")]
    #[case("scope.json")]
    #[case("scope.yaml")]
    #[case("scope.yml")]
    fn save_then_load_in_every_format(#[case] file_name: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        let store = DocumentStore::new();

        store.save(&path, &sample()).unwrap();
        let loaded: ScopeFile = store.load(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[rstest]
    #[case("scope.ini", "ini")]
    #[case("scope", "")]
    fn unsupported_extensions_are_rejected(#[case] file_name: &str, #[case] extension: &str) {
        let dir = TempDir::new().unwrap();
        let result = DocumentStore::new().save(&dir.path().join(file_name), &sample());

        match result {
            Err(Error::UnsupportedFormat { extension: e }) => assert_eq!(e, extension),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn parse_errors_name_the_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<ScopeFile> = DocumentStore::new().load(&path);
        match result {
            Err(Error::Parse { format, .. }) => assert_eq!(format, "JSON"),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn load_optional_returns_none_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<ScopeFile> = DocumentStore::new()
            .load_optional(&dir.path().join("missing.toml"))
            .unwrap();
        assert!(loaded.is_none());
    }
}
