//! Class name helpers

/// Marker Doctrine-style proxies insert into generated class names.
const PROXY_MARKER: &str = r"\__CG__\";

/// Real class name behind a proxy class name.
pub fn real_class_name(class_name: &str) -> &str {
    match class_name.rfind(PROXY_MARKER) {
        Some(pos) => &class_name[pos + PROXY_MARKER.len()..],
        None => class_name,
    }
}

/// Translation key of a property.
///
/// `Acme\DemoBundle\Entity\Contact` with property `label` gives
/// `acme.demo.contact.entity_label` at entity level and
/// `acme.demo.contact.email.label` for field `email`. Scopes other than
/// `entity` prefix the property: `acme.demo.contact.entity_extend_owner`.
pub fn translation_key(
    scope: &str,
    property: &str,
    class_name: &str,
    field_name: Option<&str>,
) -> String {
    let property = if scope == "entity" {
        property.to_string()
    } else {
        format!("{scope}_{property}")
    };

    let prefix = class_key(class_name);
    match field_name {
        Some(field) => format!("{prefix}.{}.{property}", field.to_lowercase()),
        None => format!("{prefix}.entity_{property}"),
    }
}

// vendor.bundle.entity_path, lower-cased
fn class_key(class_name: &str) -> String {
    let parts: Vec<&str> = class_name
        .split(['\\', ':'])
        .filter(|p| !p.is_empty())
        .collect();

    let bundle = parts
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, part)| part.len() > "Bundle".len() && part.ends_with("Bundle"));

    let segments: Vec<String> = match bundle {
        Some((index, bundle_part)) => {
            let mut rest = &parts[index + 1..];
            if rest.len() > 1 && rest[0] == "Entity" {
                rest = &rest[1..];
            }
            let bundle_name = &bundle_part[..bundle_part.len() - "Bundle".len()];
            [parts[0], bundle_name]
                .into_iter()
                .chain(rest.iter().copied())
                .map(str::to_lowercase)
                .collect()
        }
        None => parts.iter().map(|p| p.to_lowercase()).collect(),
    };

    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FIXTURE: &str = r"Acme\Bundle\InventoryBundle\Tests\Unit\Fixture\DemoItem";

    #[rstest]
    #[case("entity", "auto_generated", FIXTURE, None,
        "acme.inventory.tests.unit.fixture.demoitem.entity_auto_generated")]
    #[case("entity", "auto_generated", FIXTURE, Some("id"),
        "acme.inventory.tests.unit.fixture.demoitem.id.auto_generated")]
    #[case("entity", "label", r"Acme\DemoBundle\Entity\Contact", None,
        "acme.demo.contact.entity_label")]
    #[case("extend", "owner", r"Acme\DemoBundle\Entity\Contact", Some("firstName"),
        "acme.demo.contact.firstname.extend_owner")]
    #[case("entity", "label", r"Extend\Entity\Invoice", None,
        "extend.entity.invoice.entity_label")]
    #[case("entity", "label", "Acme::ShopBundle::Entity::Order", None,
        "acme.shop.order.entity_label")]
    fn translation_keys(
        #[case] scope: &str,
        #[case] property: &str,
        #[case] class_name: &str,
        #[case] field_name: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(translation_key(scope, property, class_name, field_name), expected);
    }

    #[rstest]
    #[case(r"Proxies\__CG__\Acme\Entity\User", r"Acme\Entity\User")]
    #[case(r"Acme\Entity\User", r"Acme\Entity\User")]
    fn proxy_marker_is_stripped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(real_class_name(input), expected);
    }
}
