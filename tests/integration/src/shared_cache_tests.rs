//! Cache coherence between processes sharing the cache directory

use entity_config_core::{ConfigCacheWarmer, ConfigId, ConfigManager, EntityConfigSettings};
use entity_config_test_utils::TestProject;
use entity_config_test_utils::fixtures::{ACCOUNT, CONTACT};
use pretty_assertions::assert_eq;
use serde_json::json;

fn process(project: &TestProject) -> ConfigManager {
    EntityConfigSettings::load(&project.settings_path())
        .unwrap()
        .build_manager()
        .unwrap()
}

fn seeded_project() -> TestProject {
    let project = TestProject::new();
    project.init_store();
    let mut manager = process(&project);
    manager.create_config_entity_model(Some(CONTACT), None).unwrap();
    manager
        .create_config_field_model(CONTACT, "email", "string", None)
        .unwrap();
    manager
        .create_config_field_model(CONTACT, "credit", "decimal", None)
        .unwrap();
    manager.flush().unwrap();
    project
}

#[test]
fn test_flush_invalidates_shared_entry() {
    let project = seeded_project();
    let id = ConfigId::entity("entity", CONTACT);

    let mut reader = process(&project);
    assert_eq!(reader.get_config(&id).unwrap().get("icon"), Some(&json!("icon-user")));

    let mut writer = process(&project);
    let mut config = writer.get_config(&id).unwrap();
    config.set("icon", "icon-star");
    writer.persist(config);
    writer.flush().unwrap();

    assert!(process(&project).cache_mut().get_config(&id, false).unwrap().is_none());
    assert_eq!(
        process(&project).get_config(&id).unwrap().get("icon"),
        Some(&json!("icon-star"))
    );

    // The long-lived reader keeps its local copy until told otherwise
    assert_eq!(reader.get_config(&id).unwrap().get("icon"), Some(&json!("icon-user")));
    reader.clear_model_cache().unwrap();
    reader.clear_cache(&id).unwrap();
    assert_eq!(reader.get_config(&id).unwrap().get("icon"), Some(&json!("icon-star")));
}

#[test]
fn test_rename_drops_old_shared_entry() {
    let project = seeded_project();
    let old_id = ConfigId::field("entity", CONTACT, "email", None);

    let mut manager = process(&project);
    manager.get_config(&old_id).unwrap();
    assert!(manager.change_field_name(CONTACT, "email", "mail").unwrap());
    manager.flush().unwrap();

    let mut other = process(&project);
    assert!(other.cache_mut().get_config(&old_id, false).unwrap().is_none());
    assert!(!other.has_config(CONTACT, Some("email")).unwrap());
    assert!(other.has_config(CONTACT, Some("mail")).unwrap());
    let config = other.get_field_config("entity", CONTACT, "mail").unwrap();
    assert_eq!(config.get("label"), Some(&json!("acme.demo.contact.email.label")));
    assert_eq!(config.id().field_type(), Some("string"));
}

#[test]
fn test_flush_drops_configurable_flags() {
    let project = seeded_project();

    let mut reader = process(&project);
    assert!(!reader.has_config(ACCOUNT, None).unwrap());
    assert!(!process(&project).has_config(ACCOUNT, None).unwrap());

    let mut writer = process(&project);
    writer.create_config_entity_model(Some(ACCOUNT), None).unwrap();
    writer.flush().unwrap();

    assert!(process(&project).has_config(ACCOUNT, None).unwrap());
}

#[test]
fn test_warmed_cache_serves_field_types() {
    let project = seeded_project();
    let mut warmer = process(&project);
    let stats = ConfigCacheWarmer::new(&mut warmer).warm_up().unwrap();
    assert_eq!(stats.fields, 2);

    let mut other = process(&project);
    let fields = other.cache_mut().get_fields(CONTACT).unwrap().unwrap();
    let id = other.get_id("datagrid", CONTACT, Some("credit")).unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(id.field_type(), Some("decimal"));
    assert_eq!(
        other.get_config(&id).unwrap().get("precision"),
        Some(&json!(2))
    );
}
