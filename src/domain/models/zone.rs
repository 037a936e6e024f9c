//! Zone resource models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes the resource owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub owner_type: String,
}

/// Fields shared by the various plan endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePlanCommon {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub price: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub frequency: String,
}

/// Plan information for a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePlan {
    #[serde(flatten)]
    pub common: ZonePlanCommon,
    #[serde(default)]
    pub legacy_id: String,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub can_subscribe: bool,
    #[serde(default)]
    pub legacy_discount: bool,
    #[serde(default)]
    pub externally_managed: bool,
}

/// Zone metadata.
///
/// `custom_certificate_quota` is deliberately absent: the API returns it as
/// either a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMeta {
    #[serde(default)]
    pub page_rule_quota: i64,
    #[serde(default)]
    pub wildcard_proxiable: bool,
    #[serde(default)]
    pub phishing_detected: bool,
}

/// Hosting partner information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneHost {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website: String,
}

/// Account settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    #[serde(default, rename = "enforce_twofactor")]
    pub enforce_two_factor: bool,
}

/// Account owning a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub account_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AccountSettings>,
}

/// A DNS zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Seconds until development mode expires (positive) or since it expired
    /// (negative). Zero if never used.
    #[serde(default, rename = "development_mode")]
    pub dev_mode: i64,
    #[serde(default, rename = "original_name_servers", deserialize_with = "null_as_empty")]
    pub original_ns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_registrar: String,
    #[serde(default, rename = "original_dnshost", deserialize_with = "null_as_default")]
    pub original_dns_host: String,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name_servers: Vec<String>,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub plan: ZonePlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_pending: Option<ZonePlan>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, rename = "type")]
    pub zone_type: String,
    #[serde(default)]
    pub host: ZoneHost,
    #[serde(default, rename = "vanity_name_servers", deserialize_with = "null_as_empty")]
    pub vanity_ns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub betas: Vec<String>,
    #[serde(default, rename = "deactivation_reason", deserialize_with = "null_as_default")]
    pub deactivation_reason: String,
    #[serde(default)]
    pub meta: ZoneMeta,
    #[serde(default)]
    pub account: Account,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_key: String,
}

/// A result carrying only the zone identifier, as returned by delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneId {
    pub id: String,
}

/// Filters accepted by the zone list endpoint.
///
/// Empty fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneParams {
    /// `any` or `all`
    pub match_type: Option<String>,
    pub name: Option<String>,
    pub account_name: Option<String>,
    pub status: Option<String>,
    pub account_id: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ZoneParams {
    /// Query pairs in the order the API documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("match", &self.match_type),
            ("name", &self.name),
            ("account.name", &self.account_name),
            ("status", &self.status),
            ("account.id", &self.account_id),
            ("direction", &self.direction),
        ];

        let mut pairs: Vec<(&'static str, String)> = text
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| (key, v.to_string()))
            })
            .collect();

        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }

        pairs
    }

    /// Copy of these filters pointed at another page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }
}

/// Zone identifiers are 32 lowercase hex characters.
pub fn is_valid_zone_identifier(zone_id: &str) -> bool {
    zone_id.len() == 32
        && zone_id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

const fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_JSON: &str = r##"{
        "id": "023e105f4ecef8ad9ca31a8372d0c353",
        "name": "example.com",
        "development_mode": 7200,
        "original_name_servers": ["ns1.originaldnshost.com", "ns2.originaldnshost.com"],
        "original_registrar": "GoDaddy",
        "original_dnshost": "NameCheap",
        "created_on": "2014-01-01T05:20:00.12345Z",
        "modified_on": "2014-01-01T05:20:00.12345Z",
        "name_servers": ["tony.ns.cloudflare.com", "woz.ns.cloudflare.com"],
        "owner": {"id": "7c5dae5552338874e5053f2534d2767a", "email": "user@example.com", "type": "user"},
        "permissions": ["#zone:read", "#zone:edit"],
        "plan": {"id": "e592fd9519420ba7405e1307bff33214", "name": "Pro Plan", "price": 20,
                 "currency": "USD", "frequency": "monthly", "legacy_id": "pro",
                 "is_subscribed": true, "can_subscribe": true},
        "status": "active",
        "paused": false,
        "type": "full",
        "vanity_name_servers": null,
        "meta": {"page_rule_quota": 3, "wildcard_proxiable": false, "phishing_detected": false,
                 "custom_certificate_quota": "1"},
        "account": {"id": "01a7362d577a6c3019a474fd6f485823", "name": "Demo Account"}
    }"##;

    #[test]
    fn test_zone_deserialization() {
        let zone: Zone = serde_json::from_str(ZONE_JSON).unwrap();

        assert_eq!(zone.id, "023e105f4ecef8ad9ca31a8372d0c353");
        assert_eq!(zone.dev_mode, 7200);
        assert_eq!(zone.original_ns.len(), 2);
        assert_eq!(zone.owner.owner_type, "user");
        assert_eq!(zone.plan.common.name, "Pro Plan");
        assert_eq!(zone.plan.common.price, 20);
        assert!(zone.plan.is_subscribed);
        assert!(zone.vanity_ns.is_empty());
        assert_eq!(zone.meta.page_rule_quota, 3);
        assert_eq!(zone.account.name, "Demo Account");
        assert!(zone.created_on.is_some());
    }

    #[test]
    fn test_query_pairs_skip_empty_fields() {
        let params = ZoneParams {
            name: Some("example.com".to_string()),
            account_id: Some("01a7362d577a6c3019a474fd6f485823".to_string()),
            status: Some(String::new()),
            per_page: Some(50),
            ..Default::default()
        };

        assert_eq!(
            params.query_pairs(),
            vec![
                ("name", "example.com".to_string()),
                ("account.id", "01a7362d577a6c3019a474fd6f485823".to_string()),
                ("per_page", "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_params_are_empty() {
        assert!(ZoneParams::default().query_pairs().is_empty());
    }

    #[test]
    fn test_zone_identifier_validation() {
        assert!(is_valid_zone_identifier("d56084adb405e0b7e32c52321bf07be6"));
        assert!(!is_valid_zone_identifier(""));
        assert!(!is_valid_zone_identifier("example.com"));
        assert!(!is_valid_zone_identifier("D56084ADB405E0B7E32C52321BF07BE6"));
        assert!(!is_valid_zone_identifier("d56084adb405e0b7e32c52321bf07be"));
    }
}
