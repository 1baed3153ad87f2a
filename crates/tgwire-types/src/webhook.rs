use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current status of a webhook, as returned by `getWebhookInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookInfo {
    /// Empty if no webhook is set up
    pub url: String,
    pub has_custom_certificate: bool,
    /// Updates awaiting delivery
    pub pending_update_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,
    /// Last failure to synchronize updates with the datacenters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synchronization_error_date: Option<i64>,
    /// Maximum simultaneous HTTPS connections for update delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

impl WebhookInfo {
    /// False when the bot is using `getUpdates`
    pub fn is_set(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.last_error_date
            .and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polling_bot_has_empty_url() {
        let info: WebhookInfo = serde_json::from_value(json!({
            "url": "",
            "has_custom_certificate": false,
            "pending_update_count": 0
        }))
        .unwrap();
        assert!(!info.is_set());
        assert!(info.last_error_at().is_none());
    }

    #[test]
    fn test_last_error() {
        let info: WebhookInfo = serde_json::from_value(json!({
            "url": "https://bot.example.com/hook",
            "has_custom_certificate": false,
            "pending_update_count": 3,
            "last_error_date": 1_700_000_000,
            "last_error_message": "Connection timed out"
        }))
        .unwrap();
        assert!(info.is_set());
        assert_eq!(info.last_error_at().unwrap().timestamp(), 1_700_000_000);
    }
}
