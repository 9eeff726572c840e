//! Tests for scope-bound config providers

use entity_config_core::{
    ClassInput, ConfigId, ConfigManager, ConfigurableObject, Error, EntityCollection,
};
use entity_config_test_utils::fixtures::{self, CONTACT};
use serde_json::json;

struct Contact;

impl ConfigurableObject for Contact {
    fn class_name(&self) -> &str {
        r"Proxies\__CG__\Acme\DemoBundle\Entity\Contact"
    }
}

struct Contacts;

impl EntityCollection for Contacts {
    fn element_class(&self) -> &str {
        CONTACT
    }
}

fn manager() -> ConfigManager {
    let mut manager = ConfigManager::new(
        Box::new(fixtures::metadata()),
        Box::new(fixtures::store()),
        fixtures::memory_cache(),
    );
    for (scope, properties) in fixtures::scopes() {
        manager.add_scope(scope, properties);
    }
    manager.create_config_entity_model(Some(CONTACT), None).unwrap();
    manager
        .create_config_field_model(CONTACT, "email", "string", None)
        .unwrap();
    manager
        .create_config_field_model(CONTACT, "credit", "decimal", None)
        .unwrap();
    manager.flush().unwrap();
    manager
}

mod lookup_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_providers_follow_registration_order() {
        let mut manager = manager();

        assert_eq!(manager.get_providers(), vec!["entity", "extend", "datagrid"]);
        assert!(matches!(
            manager.get_provider("audit"),
            Err(Error::UnknownScope { .. })
        ));
        assert_eq!(manager.get_provider("extend").unwrap().scope(), "extend");
    }

    #[test]
    fn test_property_config_is_the_scope_rules() {
        let mut manager = manager();
        let provider = manager.get_provider("datagrid").unwrap();

        let properties = provider.property_config().unwrap();

        assert!(properties.indexed_values(entity_config_meta::PropertyType::Field).contains("is_visible"));
    }

    #[test]
    fn test_every_class_input_reaches_the_same_config() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        let by_name = provider.get_config(Some(CONTACT.into()), None).unwrap();
        let by_object = provider
            .get_config(Some(ClassInput::Object(&Contact)), None)
            .unwrap();
        let by_collection = provider
            .get_config(Some(ClassInput::Collection(&Contacts)), None)
            .unwrap();
        let by_list = provider
            .get_config(Some(ClassInput::Objects(&[&Contact])), None)
            .unwrap();

        assert_eq!(by_name.id(), &ConfigId::entity("entity", CONTACT));
        assert_eq!(by_object, by_name);
        assert_eq!(by_collection, by_name);
        assert_eq!(by_list, by_name);
    }

    #[test]
    fn test_unresolvable_input_is_rejected() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        assert!(matches!(
            provider.get_config(Some(ClassInput::Objects(&[])), None),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            provider.has_config(ClassInput::Other("integer"), None),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_field_config_and_id() {
        let mut manager = manager();
        let mut provider = manager.get_provider("datagrid").unwrap();

        let id = provider.get_id(Some(CONTACT.into()), Some("credit"), None).unwrap();
        let explicit = provider
            .get_id(Some(CONTACT.into()), Some("credit"), Some("money"))
            .unwrap();
        let config = provider.get_config(Some(CONTACT.into()), Some("credit")).unwrap();

        assert_eq!(id.field_type(), Some("decimal"));
        assert_eq!(explicit.field_type(), Some("money"));
        assert_eq!(config.get("precision"), Some(&json!(2)));
        assert_eq!(provider.get_config_by_id(&id).unwrap(), config);
    }

    #[test]
    fn test_config_by_id_reads_in_the_provider_scope() {
        let mut manager = manager();
        let mut provider = manager.get_provider("extend").unwrap();

        let config = provider
            .get_config_by_id(&ConfigId::entity("entity", CONTACT))
            .unwrap();

        assert_eq!(config.id().scope(), "extend");
        assert_eq!(config.get("owner"), Some(&json!("System")));
    }

    #[test]
    fn test_blank_class_gives_fresh_config() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        let config = provider.get_config(None, None).unwrap();

        assert_eq!(config.id().class_name(), "");
        assert_eq!(config.get("icon"), Some(&json!("icon-default")));
    }

    #[test]
    fn test_has_config() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        assert!(provider.has_config(ClassInput::Object(&Contact), None).unwrap());
        assert!(provider.has_config(CONTACT.into(), Some("email")).unwrap());
        assert!(!provider.has_config(CONTACT.into(), Some("id")).unwrap());
        assert!(provider
            .has_config_by_id(&ConfigId::field("entity", CONTACT, "credit", None))
            .unwrap());
    }
}

mod listing_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_of_classes_and_fields() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        let classes = provider.get_ids(None, false).unwrap();
        let fields = provider.get_ids(Some(CONTACT.into()), false).unwrap();

        assert_eq!(classes, vec![ConfigId::entity("entity", CONTACT)]);
        let names: Vec<&str> = fields.iter().filter_map(ConfigId::field_name).collect();
        assert_eq!(names, vec!["email", "credit"]);
    }

    #[test]
    fn test_map_and_filter() {
        let mut manager = manager();
        let mut provider = manager.get_provider("datagrid").unwrap();

        let precisions = provider
            .map(|config| config.get("precision").cloned(), Some(CONTACT.into()), false)
            .unwrap();
        let decimals = provider
            .filter(|config| config.has("precision"), Some(CONTACT.into()), false)
            .unwrap();

        assert_eq!(precisions, vec![None, Some(json!(2))]);
        assert_eq!(decimals.len(), 1);
        assert_eq!(decimals[0].id().field_name(), Some("credit"));
    }
}

mod staging_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_persist_and_flush_through_provider() {
        let mut manager = manager();
        {
            let mut provider = manager.get_provider("entity").unwrap();
            let mut config = provider.get_config(Some(CONTACT.into()), None).unwrap();
            config.set("label", "Contact");
            provider.persist(config);
            provider.flush().unwrap();
        }

        let model = manager.get_config_entity_model(CONTACT).unwrap().unwrap();
        assert_eq!(model.data.to_array("entity")["label"], json!("Contact"));
    }

    #[test]
    fn test_merge_through_provider() {
        let mut manager = manager();
        let mut provider = manager.get_provider("entity").unwrap();

        let mut config = provider.get_config(Some(CONTACT.into()), None).unwrap();
        config.set("label", "Contact");
        provider.persist(config);
        let patch = entity_config_core::Config::with_values(
            ConfigId::entity("entity", CONTACT),
            fixtures::values(json!({"icon": "icon-star"})),
        );
        let merged = provider.merge(patch);

        assert_eq!(merged.get("label"), Some(&json!("Contact")));
        assert_eq!(merged.get("icon"), Some(&json!("icon-star")));
        assert_eq!(provider.manager().get_update_configs().len(), 1);
    }

    #[test]
    fn test_clear_cache_drops_the_bucket() {
        let mut manager = manager();
        let id = ConfigId::entity("entity", CONTACT);
        manager.get_config(&id).unwrap();

        manager
            .get_provider("entity")
            .unwrap()
            .clear_cache(CONTACT.into(), None)
            .unwrap();

        assert!(manager.cache_mut().get_config(&id, false).unwrap().is_none());
    }
}
