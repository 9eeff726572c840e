//! Tests for config cache warm-up

use entity_config_core::{ConfigCacheWarmer, ConfigId, ConfigManager, ConfigMode, WarmUpStats};
use entity_config_model::ConfigModelStore;
use entity_config_test_utils::fixtures::{self, ACCOUNT, AUDIT_LOG, CONTACT, SharedCache};
use serde_json::json;

fn manager(store: impl ConfigModelStore + 'static, shared: &SharedCache) -> ConfigManager {
    let mut manager = ConfigManager::new(
        Box::new(fixtures::metadata()),
        Box::new(store),
        shared.cache(),
    );
    for (scope, properties) in fixtures::scopes() {
        manager.add_scope(scope, properties);
    }
    manager
}

fn seeded(shared: &SharedCache) -> ConfigManager {
    let mut manager = manager(fixtures::store(), shared);
    manager.create_config_entity_model(Some(CONTACT), None).unwrap();
    manager
        .create_config_field_model(CONTACT, "email", "string", Some(ConfigMode::Hidden))
        .unwrap();
    manager
        .create_config_field_model(CONTACT, "credit", "decimal", None)
        .unwrap();
    manager.flush().unwrap();
    manager
}

mod warm_up_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_what_was_written() {
        let shared = SharedCache::new();
        let mut manager = seeded(&shared);

        let stats = ConfigCacheWarmer::new(&mut manager).warm_up().unwrap();

        assert_eq!(
            stats,
            WarmUpStats {
                entities: 1,
                fields: 2,
                non_configurable: 2,
            }
        );
    }

    #[test]
    fn test_missing_schema_skips_warm_up() {
        let shared = SharedCache::new();
        let mut manager = manager(fixtures::store_without_schema(), &shared);

        let stats = ConfigCacheWarmer::new(&mut manager).warm_up().unwrap();

        assert_eq!(stats, WarmUpStats::default());
        assert!(shared.cache().get_entities().unwrap().is_none());
    }

    #[test]
    fn test_every_scope_is_cached_even_when_empty() {
        let shared = SharedCache::new();
        let mut manager = seeded(&shared);
        ConfigCacheWarmer::new(&mut manager).warm_up().unwrap();

        let mut cache = shared.cache();
        let grid = cache
            .get_config(&ConfigId::entity("datagrid", CONTACT), false)
            .unwrap()
            .unwrap();
        let icon = cache
            .get_config(&ConfigId::entity("entity", CONTACT), false)
            .unwrap()
            .unwrap();
        let credit = cache
            .get_config(&ConfigId::field("datagrid", CONTACT, "credit", None), false)
            .unwrap()
            .unwrap();

        assert!(grid.all().is_empty());
        assert_eq!(icon.get("icon"), Some(&json!("icon-user")));
        assert_eq!(credit.id().field_type(), Some("decimal"));
        assert_eq!(credit.get("precision"), Some(&json!(2)));
    }

    #[test]
    fn test_lists_and_flags_are_shared() {
        let shared = SharedCache::new();
        let mut manager = seeded(&shared);
        ConfigCacheWarmer::new(&mut manager).warm_up().unwrap();

        let mut cache = shared.cache();
        let entities = cache.get_entities().unwrap().unwrap();
        let fields = cache.get_fields(CONTACT).unwrap().unwrap();

        assert_eq!(entities.get(CONTACT), Some(&false));
        assert!(fields["email"].hidden);
        assert_eq!(fields["credit"].field_type, "decimal");
        assert_eq!(cache.get_configurable(CONTACT, Some("credit")).unwrap(), Some(true));
        assert_eq!(cache.get_configurable(ACCOUNT, None).unwrap(), Some(false));
        assert_eq!(cache.get_configurable(ACCOUNT, Some("name")).unwrap(), Some(false));
        assert_eq!(cache.get_configurable(AUDIT_LOG, Some("message")).unwrap(), Some(false));
    }

    #[test]
    fn test_cached_flags_are_left_alone() {
        let shared = SharedCache::new();
        let mut manager = seeded(&shared);
        manager
            .cache_mut()
            .save_configurable(true, ACCOUNT, None, false)
            .unwrap();

        let stats = ConfigCacheWarmer::new(&mut manager).warm_up().unwrap();

        assert_eq!(stats.non_configurable, 1);
        assert_eq!(
            shared.cache().get_configurable(ACCOUNT, None).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_other_process_reads_warmed_configs() {
        let shared = SharedCache::new();
        let mut writer = seeded(&shared);
        ConfigCacheWarmer::new(&mut writer).warm_up().unwrap();

        // Its own store is empty, so everything comes from the shared tier
        let mut reader = manager(fixtures::store(), &shared);

        assert!(reader.has_config(CONTACT, None).unwrap());
        assert!(!reader.has_config(ACCOUNT, None).unwrap());
        let config = reader.get_entity_config("extend", CONTACT).unwrap();
        assert_eq!(config.get("owner"), Some(&json!("System")));
    }
}
