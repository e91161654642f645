//! JSON shapes shared across resource providers.

use crate::common::{ArmError, ArmResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Tags = HashMap<String, String>;

/// One page of an ARM list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sku {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
}

impl Sku {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Envelope shared by ARM resources that live in a region.
///
/// `P` is the provider-specific `properties` object. Read-only fields are
/// `None` in request bodies and skipped when serializing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedResource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

impl<P> TrackedResource<P> {
    pub fn new(location: &str, properties: P) -> Self {
        Self {
            id: None,
            name: None,
            resource_type: None,
            location: Some(location.to_string()),
            tags: None,
            sku: None,
            kind: None,
            properties: Some(properties),
        }
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Name, or an empty string for a request body that has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Body of the PATCH calls that only touch tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TagsPatch {
    pub tags: Tags,
}

impl TagsPatch {
    pub fn new(tags: Tags) -> Self {
        Self { tags }
    }
}

/// Builds a [`Tags`] map from string pairs.
pub fn tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Tags {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Reference to another resource by ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubResource {
    pub id: String,
}

/// Body of the `checkNameAvailability` request most providers expose.
#[derive(Debug, Clone, Serialize)]
pub struct CheckNameAvailabilityRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// Providers disagree on casing (`nameAvailable` vs `NameAvailable`), so
/// both are accepted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CheckNameAvailabilityResult {
    #[serde(rename = "nameAvailable", alias = "NameAvailable", default)]
    pub name_available: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic view of a resource returned by `resourceGroups/{rg}/resources`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenericResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Parsed form of an ARM resource ID.
///
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    pub resource_type: String,
    pub name: String,
}

impl ResourceId {
    pub fn parse(id: &str) -> ArmResult<Self> {
        let invalid = || ArmError::Configuration(format!("Invalid resource ID format: {id}"));
        let parts: Vec<&str> = id.trim_matches('/').split('/').collect();

        // subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}[/...]
        if parts.len() < 8
            || !parts[0].eq_ignore_ascii_case("subscriptions")
            || !parts[2].eq_ignore_ascii_case("resourcegroups")
            || !parts[4].eq_ignore_ascii_case("providers")
        {
            return Err(invalid());
        }

        // Nested resources keep every type segment: "servers/databases"
        let tail = &parts[6..];
        if tail.len() % 2 != 0 {
            return Err(invalid());
        }
        let resource_type = tail.iter().step_by(2).copied().collect::<Vec<_>>().join("/");
        let name = tail[tail.len() - 1].to_string();

        Ok(Self {
            subscription_id: parts[1].to_string(),
            resource_group: parts[3].to_string(),
            provider: parts[5].to_string(),
            resource_type,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_level_resource_id() {
        let id = ResourceId::parse(
            "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Storage/storageAccounts/acct1",
        )
        .unwrap();
        assert_eq!(id.subscription_id, "sub-1");
        assert_eq!(id.resource_group, "rg-1");
        assert_eq!(id.provider, "Microsoft.Storage");
        assert_eq!(id.resource_type, "storageAccounts");
        assert_eq!(id.name, "acct1");
    }

    #[test]
    fn parses_nested_resource_id() {
        let id = ResourceId::parse(
            "/subscriptions/s/resourcegroups/rg/providers/Microsoft.Sql/servers/srv/databases/db",
        )
        .unwrap();
        assert_eq!(id.resource_type, "servers/databases");
        assert_eq!(id.name, "db");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(ResourceId::parse("").is_err());
        assert!(ResourceId::parse("/subscriptions/s/resourceGroups/rg").is_err());
        assert!(
            ResourceId::parse("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites").is_err()
        );
    }

    #[test]
    fn tracked_resource_skips_read_only_fields() {
        let body = TrackedResource::new("westus2", serde_json::json!({"a": 1}))
            .with_sku(Sku::named("Standard_LRS"))
            .with_tags(tags([("env", "sample")]));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "location": "westus2",
                "tags": {"env": "sample"},
                "sku": {"name": "Standard_LRS"},
                "properties": {"a": 1}
            })
        );
        assert_eq!(body.display_name(), "");
    }

    #[test]
    fn list_page_defaults() {
        let page: ArmList<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn name_availability_accepts_both_casings() {
        let lower: CheckNameAvailabilityResult =
            serde_json::from_str(r#"{"nameAvailable":false,"reason":"AlreadyExists"}"#).unwrap();
        assert!(!lower.name_available);
        let upper: CheckNameAvailabilityResult =
            serde_json::from_str(r#"{"NameAvailable":true}"#).unwrap();
        assert!(upper.name_available);
    }
}
