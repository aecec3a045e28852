use chrono::{DateTime, Utc};

use super::api::HubSpotContact;
use crate::item::IntegrationItem;

/// Transform a HubSpot contact into an integration item.
///
/// Name: `"contact " + "{first} {last}"` trimmed, else the email, else the id.
/// Empty strings count as missing.
pub fn contact_to_item(contact: &HubSpotContact) -> IntegrationItem {
    let props = contact.properties.as_ref();
    let first = props.and_then(|p| p.firstname.as_deref()).unwrap_or("");
    let last = props.and_then(|p| p.lastname.as_deref()).unwrap_or("");
    let email = props
        .and_then(|p| p.email.as_deref())
        .filter(|e| !e.is_empty());

    let full_name = format!("{} {}", first, last);
    let full_name = full_name.trim();
    let base_name = if !full_name.is_empty() {
        full_name
    } else {
        email.unwrap_or(contact.id.as_str())
    };

    IntegrationItem {
        id: contact.id.clone(),
        item_type: "contact".to_string(),
        name: format!("contact {}", base_name),
        creation_time: parse_timestamp(contact.created_at.as_deref()),
        last_modified_time: parse_timestamp(contact.updated_at.as_deref()),
        parent_id: None,
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hubspot::api::ContactProperties;
    use chrono::TimeZone;

    fn contact(id: &str, properties: ContactProperties) -> HubSpotContact {
        HubSpotContact {
            id: id.to_string(),
            properties: Some(properties),
            ..HubSpotContact::default()
        }
    }

    #[test]
    fn test_full_name() {
        let item = contact_to_item(&contact(
            "1",
            ContactProperties {
                firstname: Some("Ada".to_string()),
                lastname: Some("Lovelace".to_string()),
                email: None,
            },
        ));
        assert_eq!(item.name, "contact Ada Lovelace");
        assert_eq!(item.id, "1");
        assert_eq!(item.item_type, "contact");
        assert_eq!(item.parent_id, None);
    }

    #[test]
    fn test_single_name_part_is_trimmed() {
        let item = contact_to_item(&contact(
            "1",
            ContactProperties {
                firstname: None,
                lastname: Some("Hopper".to_string()),
                email: Some("grace@example.com".to_string()),
            },
        ));
        assert_eq!(item.name, "contact Hopper");
    }

    #[test]
    fn test_email_fallback() {
        let item = contact_to_item(&contact(
            "2",
            ContactProperties {
                email: Some("x@y.com".to_string()),
                ..ContactProperties::default()
            },
        ));
        assert_eq!(item.name, "contact x@y.com");
    }

    #[test]
    fn test_id_fallback() {
        let item = contact_to_item(&contact("3", ContactProperties::default()));
        assert_eq!(item.name, "contact 3");
    }

    #[test]
    fn test_blank_values_fall_through() {
        let item = contact_to_item(&contact(
            "4",
            ContactProperties {
                firstname: Some("  ".to_string()),
                lastname: Some(String::new()),
                email: Some(String::new()),
            },
        ));
        assert_eq!(item.name, "contact 4");
    }

    #[test]
    fn test_missing_properties_object() {
        let item = contact_to_item(&HubSpotContact {
            id: "5".to_string(),
            ..HubSpotContact::default()
        });
        assert_eq!(item.name, "contact 5");
    }

    #[test]
    fn test_timestamps() {
        let item = contact_to_item(&HubSpotContact {
            id: "6".to_string(),
            created_at: Some("2024-03-01T10:00:00.000Z".to_string()),
            updated_at: Some("yesterday".to_string()),
            ..HubSpotContact::default()
        });
        assert_eq!(
            item.creation_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(item.last_modified_time, None);
    }
}
