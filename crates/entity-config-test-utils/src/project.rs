//! [`TestProject`] builder for file-backed scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use entity_config_fs::DocumentStore;
use tempfile::TempDir;

use crate::fixtures;

/// A temporary directory holding a settings file, demo metadata and the
/// demo scope definitions.
///
/// The store lives at `var/models.json` and is not created until
/// [`init_store`](TestProject::init_store) runs. The shared cache lives
/// under `var/cache`.
///
/// # Example
///
/// ```rust,no_run
/// use entity_config_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.init_store();
/// project.assert_file_exists("var/models.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub const SETTINGS_FILE: &'static str = "entity-config.toml";
    pub const STORE_FILE: &'static str = "var/models.json";

    pub fn new() -> Self {
        let project = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        project.write_definitions();
        project.write_settings(
            r#"scopes = ["scopes/entity.json", "scopes/extend.json", "scopes/datagrid.json"]

[store]
path = "var/models.json"

[cache]
dir = "var/cache"

[metadata]
path = "metadata.json"
"#,
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root().join(Self::SETTINGS_FILE)
    }

    pub fn store_path(&self) -> PathBuf {
        self.root().join(Self::STORE_FILE)
    }

    /// Replace the settings file.
    pub fn write_settings(&self, content: &str) {
        fs::write(self.settings_path(), content).unwrap();
    }

    /// Create an empty store document, as `entity-config init` does.
    pub fn init_store(&self) {
        let path = self.store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, r#"{"next_id": 0, "entities": [], "fields": []}"#).unwrap();
    }

    fn write_definitions(&self) {
        let documents = DocumentStore::new();
        fixtures::metadata()
            .save(&self.root().join("metadata.json"))
            .unwrap();
        for (scope, properties) in fixtures::scopes() {
            let document = BTreeMap::from([(scope, properties)]);
            documents
                .save(&self.root().join(format!("scopes/{scope}.json")), &document)
                .unwrap();
        }
    }

    /// Read a file relative to the root.
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path))
            .unwrap_or_else(|_| panic!("Could not read file: {path}"))
    }

    /// # Panics
    /// Panics if `path` (relative to the root) does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics if `path` (relative to the root) exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
