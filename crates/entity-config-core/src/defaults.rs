//! Default values seeded into new and updated configs

use entity_config_meta::{PropertyConfigContainer, PropertyType, Values, is_empty_value, translation_key};

/// Defaults of one scope for a class or one of its fields.
///
/// Property defaults allowed for `field_type` come first, then the values
/// the class metadata declares for the scope. Translatable codes still
/// empty afterwards get their translation key.
pub(crate) fn default_values(
    properties: &PropertyConfigContainer,
    scope: &str,
    class_name: &str,
    field: Option<(&str, &str)>,
    metadata_defaults: Option<&Values>,
) -> Values {
    let property_type = if field.is_some() {
        PropertyType::Field
    } else {
        PropertyType::Entity
    };
    let field_type = field.map(|(_, field_type)| field_type);
    let field_name = field.map(|(field_name, _)| field_name);

    let mut values = properties.default_values(property_type, field_type);
    if let Some(defaults) = metadata_defaults {
        for (code, value) in defaults {
            values.insert(code.clone(), value.clone());
        }
    }

    for code in properties.translatable_values(property_type) {
        if values.get(&code).is_none_or(is_empty_value) {
            let key = translation_key(scope, &code, class_name, field_name);
            values.insert(code, key.into());
        }
    }

    values
}
