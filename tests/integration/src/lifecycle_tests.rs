//! Config lifecycle over the file-backed store and cache
//!
//! Every manager is built from the project's settings file, so each one
//! stands for a separate process sharing the store and the cache directory.

use entity_config_core::{
    ConfigEvent, ConfigEventKind, ConfigManager, EntityConfigSettings, Error, Result,
};
use entity_config_model::ModelDocument;
use entity_config_test_utils::TestProject;
use entity_config_test_utils::fixtures::{ACCOUNT, CONTACT};
use pretty_assertions::assert_eq;
use serde_json::json;

fn settings(project: &TestProject) -> EntityConfigSettings {
    EntityConfigSettings::load(&project.settings_path()).unwrap()
}

fn process(project: &TestProject) -> ConfigManager {
    settings(project).build_manager().unwrap()
}

fn seed(project: &TestProject) {
    project.init_store();
    let mut manager = process(project);
    manager.create_config_entity_model(Some(CONTACT), None).unwrap();
    manager
        .create_config_field_model(CONTACT, "email", "string", None)
        .unwrap();
    manager
        .create_config_field_model(CONTACT, "credit", "decimal", None)
        .unwrap();
    manager.flush().unwrap();
}

#[test]
fn test_flushed_models_reach_the_store_file() {
    let project = TestProject::new();
    seed(&project);

    let document: ModelDocument =
        serde_json::from_str(&project.read(TestProject::STORE_FILE)).unwrap();

    let contact = document.find_entity(CONTACT).unwrap();
    assert_eq!(contact.id, Some(1));
    assert!(contact.created.is_some());
    assert_eq!(contact.data.indexed_value("entity", "icon"), Some("icon-user"));
    let credit = document.find_field(CONTACT, "credit").unwrap();
    assert_eq!(credit.field_type, "decimal");
    assert_eq!(credit.data.to_array("datagrid")["precision"], json!(2));
}

#[test]
fn test_other_process_reads_flushed_values() {
    let project = TestProject::new();
    seed(&project);

    let mut writer = process(&project);
    let mut config = writer.get_entity_config("entity", CONTACT).unwrap();
    config.set("label", "Contact");
    writer.persist(config);
    writer.flush().unwrap();

    let mut reader = process(&project);
    let config = reader.get_entity_config("entity", CONTACT).unwrap();
    assert_eq!(config.get("label"), Some(&json!("Contact")));
    assert_eq!(config.get("icon"), Some(&json!("icon-user")));
}

#[test]
fn test_uninitialized_store_is_not_ready() {
    let project = TestProject::new();
    let mut manager = process(&project);

    assert!(!manager.check_database().unwrap());
    assert!(!manager.has_config(CONTACT, None).unwrap());
    assert!(matches!(
        manager.get_entity_config("entity", CONTACT),
        Err(Error::SchemaNotReady)
    ));

    settings(&project).open_store().unwrap().initialize().unwrap();
    // Memoized until the configurable cache is cleared
    assert!(!manager.check_database().unwrap());
    manager.clear_configurable_cache().unwrap();
    assert!(manager.check_database().unwrap());
}

#[test]
fn test_listeners_refine_created_configs() {
    let project = TestProject::new();
    project.init_store();
    let mut manager = process(&project);
    manager.add_listener(
        ConfigEventKind::CreateEntity,
        |event: &ConfigEvent, manager: &mut ConfigManager| -> Result<()> {
            let Some(class_name) = event.class_name() else {
                return Ok(());
            };
            let mut extend = manager.get_entity_config("extend", class_name)?;
            extend.set("is_extend", true);
            manager.persist(extend);
            Ok(())
        },
    );

    manager.create_config_entity_model(Some(ACCOUNT), None).unwrap();
    manager.flush().unwrap();

    let mut reader = process(&project);
    let extend = reader.get_entity_config("extend", ACCOUNT).unwrap();
    assert_eq!(extend.get("is_extend"), Some(&json!(true)));
    assert_eq!(extend.get("owner"), Some(&json!("System")));
}

#[test]
fn test_post_flush_listener_can_flush_again() {
    let project = TestProject::new();
    seed(&project);
    let mut manager = process(&project);
    manager.add_listener(
        ConfigEventKind::PostFlush,
        |event: &ConfigEvent, manager: &mut ConfigManager| -> Result<()> {
            let ConfigEvent::PostFlush { models } = event else {
                return Ok(());
            };
            for model in models.iter().filter(|m| m.field_name().is_none()) {
                let mut config = manager.get_entity_config("entity", model.class_name())?;
                config.set("description", "Audited");
                manager.persist(config);
            }
            manager.flush()
        },
    );

    let mut config = manager.get_entity_config("entity", CONTACT).unwrap();
    config.set("label", "Contact");
    manager.persist(config);
    manager.flush().unwrap();

    assert!(manager.get_update_configs().is_empty());
    let mut reader = process(&project);
    let config = reader.get_entity_config("entity", CONTACT).unwrap();
    assert_eq!(config.get("label"), Some(&json!("Contact")));
    assert_eq!(config.get("description"), Some(&json!("Audited")));
}

#[test]
fn test_model_changes_roll_back_without_flush() {
    let project = TestProject::new();
    seed(&project);
    let mut manager = process(&project);

    manager.create_config_entity_model(Some(ACCOUNT), None).unwrap();
    assert!(manager.has_config_entity_model(ACCOUNT).unwrap());
    manager.clear_model_cache().unwrap();

    assert!(!manager.has_config_entity_model(ACCOUNT).unwrap());
    assert!(process(&project).get_config_entity_model(ACCOUNT).unwrap().is_none());
}
