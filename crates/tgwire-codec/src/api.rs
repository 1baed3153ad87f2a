//! Bot API method payloads
//!
//! Request bodies for the update-delivery methods and the response envelope
//! every method returns. Nothing here talks to the network; a host sends
//! the bytes from [`encode_request`] and hands the reply to
//! [`decode_response`].

use crate::codec::{Codec, Decoded};
use crate::error::{DecodeError, EncodeError};
use crate::path::FieldPath;
use crate::schema::FieldKind;
use crate::validate::describe;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tgwire_types::{Identifier, Update, UpdateKind, WebhookInfo};
use thiserror::Error;
use tracing::debug;

/// Upper bound shared by `getUpdates.limit` and `setWebhook.max_connections`
pub const MAX_BATCH: u8 = 100;

/// Longest `secret_token` upstream accepts
pub const MAX_SECRET_TOKEN_LEN: usize = 256;

/// A Bot API method: its name, body and result type
pub trait Method: Serialize {
    const NAME: &'static str;
    type Response: ResponseBody;

    /// Reject parameters upstream would refuse
    fn check(&self) -> Result<(), EncodeError> {
        Ok(())
    }
}

/// Result type of a [`Method`]
pub trait ResponseBody: Sized {
    fn decode(codec: &Codec, value: Value) -> Result<Decoded<Self>, DecodeError>;
}

impl ResponseBody for Vec<Update> {
    fn decode(codec: &Codec, value: Value) -> Result<Decoded<Self>, DecodeError> {
        codec.decode_list_value(value)
    }
}

impl ResponseBody for WebhookInfo {
    fn decode(codec: &Codec, value: Value) -> Result<Decoded<Self>, DecodeError> {
        codec.decode_value(value)
    }
}

impl ResponseBody for bool {
    fn decode(_codec: &Codec, value: Value) -> Result<Decoded<Self>, DecodeError> {
        match value {
            Value::Bool(value) => Ok(Decoded {
                value,
                diagnostics: Vec::new(),
            }),
            other => Err(DecodeError::TypeMismatch {
                path: FieldPath::root().child("result"),
                expected: FieldKind::Bool.to_string(),
                found: describe(&FieldKind::Bool, &other),
            }),
        }
    }
}

/// Update variant names accepted by `allowed_updates`
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
}

impl UpdateType {
    pub const ALL: &'static [UpdateType] = &[
        UpdateType::Message,
        UpdateType::EditedMessage,
        UpdateType::ChannelPost,
        UpdateType::EditedChannelPost,
        UpdateType::InlineQuery,
        UpdateType::ChosenInlineResult,
        UpdateType::CallbackQuery,
        UpdateType::ShippingQuery,
        UpdateType::PreCheckoutQuery,
        UpdateType::Poll,
        UpdateType::PollAnswer,
        UpdateType::MyChatMember,
        UpdateType::ChatMember,
        UpdateType::ChatJoinRequest,
    ];

    /// Type of a decoded update, `None` when its variant is unknown
    pub fn of(kind: &UpdateKind) -> Option<Self> {
        let name = kind.field_name()?;
        UpdateKind::FIELDS
            .iter()
            .position(|field| *field == name)
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// `getUpdates`: long polling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetUpdates {
    /// First update to return; earlier ones are confirmed and forgotten
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// 1-100, upstream default 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u8>,
    /// Long polling timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<UpdateType>>,
}

impl GetUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll for updates following `last`, confirming it. `None` when
    /// `last` already carries the largest representable id.
    pub fn after(last: &Update) -> Option<Self> {
        let offset = last.update_id.get().checked_add(1)?;
        Some(Self {
            offset: Some(offset),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn limit(mut self, limit: u8) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX));
        self
    }

    #[must_use]
    pub fn allowed_updates(mut self, types: impl IntoIterator<Item = UpdateType>) -> Self {
        self.allowed_updates = Some(types.into_iter().collect());
        self
    }
}

impl Method for GetUpdates {
    const NAME: &'static str = "getUpdates";
    type Response = Vec<Update>;

    fn check(&self) -> Result<(), EncodeError> {
        if let Some(limit) = self.limit {
            within_batch(Self::NAME, "limit", limit)?;
        }
        Ok(())
    }
}

/// `setWebhook`, without certificate upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetWebhook {
    /// HTTPS URL; empty removes the webhook
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<UpdateType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_pending_updates: Option<bool>,
    /// Echoed back in the `X-Telegram-Bot-Api-Secret-Token` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

impl SetWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ip_address: None,
            max_connections: None,
            allowed_updates: None,
            drop_pending_updates: None,
            secret_token: None,
        }
    }

    #[must_use]
    pub fn max_connections(mut self, max: u8) -> Self {
        self.max_connections = Some(max);
        self
    }

    #[must_use]
    pub fn secret_token(mut self, token: impl Into<String>) -> Self {
        self.secret_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn allowed_updates(mut self, types: impl IntoIterator<Item = UpdateType>) -> Self {
        self.allowed_updates = Some(types.into_iter().collect());
        self
    }

    #[must_use]
    pub fn drop_pending_updates(mut self) -> Self {
        self.drop_pending_updates = Some(true);
        self
    }
}

impl Method for SetWebhook {
    const NAME: &'static str = "setWebhook";
    type Response = bool;

    fn check(&self) -> Result<(), EncodeError> {
        if !self.url.is_empty() && !self.url.starts_with("https://") {
            return Err(invalid(Self::NAME, "url", "must be an https:// URL or empty"));
        }
        if let Some(max) = self.max_connections {
            within_batch(Self::NAME, "max_connections", max)?;
        }
        if let Some(token) = &self.secret_token {
            if token.is_empty() || token.len() > MAX_SECRET_TOKEN_LEN {
                return Err(invalid(
                    Self::NAME,
                    "secret_token",
                    format!("length must be 1-{MAX_SECRET_TOKEN_LEN}"),
                ));
            }
            if !token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(invalid(
                    Self::NAME,
                    "secret_token",
                    "only A-Z, a-z, 0-9, _ and - are allowed",
                ));
            }
        }
        Ok(())
    }
}

/// `deleteWebhook`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteWebhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_pending_updates: Option<bool>,
}

impl Method for DeleteWebhook {
    const NAME: &'static str = "deleteWebhook";
    type Response = bool;
}

/// `getWebhookInfo`; takes no parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetWebhookInfo {}

impl Method for GetWebhookInfo {
    const NAME: &'static str = "getWebhookInfo";
    type Response = WebhookInfo;
}

fn invalid(method: &'static str, field: &'static str, reason: impl Into<String>) -> EncodeError {
    EncodeError::InvalidParameter {
        method,
        field,
        reason: reason.into(),
    }
}

fn within_batch(method: &'static str, field: &'static str, value: u8) -> Result<(), EncodeError> {
    if (1..=MAX_BATCH).contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            method,
            field,
            format!("{value} is outside 1-{MAX_BATCH}"),
        ))
    }
}

/// Check a method's parameters and encode its JSON body
pub fn encode_request<M: Method>(method: &M) -> Result<Vec<u8>, EncodeError> {
    method.check()?;
    let bytes = serde_json::to_vec(method)?;
    debug!(method = M::NAME, bytes = bytes.len(), "Encoded request");
    Ok(bytes)
}

/// Extra information attached to a failed request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseParameters {
    /// The group moved to a supergroup with this id
    pub migrate_to_chat_id: Option<Identifier>,
    /// Seconds to wait before repeating the request
    pub retry_after: Option<u32>,
}

/// `ok: false` reply from the Bot API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bot API error {}: {description}", .error_code.map_or_else(|| "?".to_string(), |c| c.to_string()))]
pub struct ApiError {
    pub description: String,
    pub error_code: Option<i32>,
    pub retry_after: Option<u32>,
    pub migrate_to_chat_id: Option<Identifier>,
}

impl ApiError {
    /// How long to back off before retrying, when upstream says so
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_after.map(|s| Duration::from_secs(u64::from(s)))
    }
}

/// Failure to turn a Bot API reply into a method result
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Not a `{ok, ...}` object
    #[error("Malformed response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

impl Codec {
    /// Decode the reply to method `M`
    pub fn decode_response<M: Method>(
        &self,
        bytes: &[u8],
    ) -> Result<Decoded<M::Response>, ResponseError> {
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(ResponseError::Envelope)?;
        if !envelope.ok {
            let parameters = envelope.parameters;
            let error = ApiError {
                description: envelope.description.unwrap_or_default(),
                error_code: envelope.error_code,
                retry_after: parameters.as_ref().and_then(|p| p.retry_after),
                migrate_to_chat_id: parameters.and_then(|p| p.migrate_to_chat_id),
            };
            debug!(method = M::NAME, %error, "Request failed");
            return Err(error.into());
        }
        let result = envelope
            .result
            .filter(|value| !value.is_null())
            .ok_or_else(|| DecodeError::MissingField {
                path: FieldPath::root().child("result"),
            })?;
        Ok(<M::Response as ResponseBody>::decode(self, result)?)
    }
}

/// Decode the reply to method `M` with the default configuration
pub fn decode_response<M: Method>(bytes: &[u8]) -> Result<Decoded<M::Response>, ResponseError> {
    Codec::default().decode_response::<M>(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_type_names_match_update_variants() {
        let names: Vec<Value> = UpdateType::ALL
            .iter()
            .map(|t| serde_json::to_value(t).unwrap())
            .collect();
        let fields: Vec<Value> = UpdateKind::FIELDS.iter().map(|f| json!(f)).collect();
        assert_eq!(names, fields);
    }

    #[test]
    fn test_update_type_of() {
        let update: Update =
            serde_json::from_value(json!({ "update_id": 1, "poll": { "id": "p" } })).unwrap();
        assert_eq!(UpdateType::of(&update.kind), Some(UpdateType::Poll));
        assert_eq!(UpdateType::of(&UpdateKind::Unknown), None);
    }

    #[test]
    fn test_get_updates_body() {
        let request = GetUpdates::new()
            .limit(50)
            .timeout(Duration::from_secs(30))
            .allowed_updates([UpdateType::Message, UpdateType::CallbackQuery]);
        let body: Value = serde_json::from_slice(&encode_request(&request).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "limit": 50,
                "timeout": 30,
                "allowed_updates": ["message", "callback_query"]
            })
        );
    }

    #[test]
    fn test_get_updates_after() {
        let update = Update::new(41, UpdateKind::Unknown);
        assert_eq!(GetUpdates::after(&update).unwrap().offset, Some(42));
    }

    #[test]
    fn test_get_updates_after_largest_id() {
        let update = Update::new(i64::MAX, UpdateKind::Unknown);
        assert!(GetUpdates::after(&update).is_none());
        let update = Update::new(i64::MAX - 1, UpdateKind::Unknown);
        assert_eq!(GetUpdates::after(&update).unwrap().offset, Some(i64::MAX));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(encode_request(&GetUpdates::new().limit(0)).is_err());
        assert!(encode_request(&GetUpdates::new().limit(101)).is_err());
        assert!(encode_request(&GetUpdates::new().limit(100)).is_ok());
    }

    #[test]
    fn test_set_webhook_checks() {
        let ok = SetWebhook::new("https://bot.example.com/hook")
            .max_connections(40)
            .secret_token("s3cr3t_token-1");
        assert!(encode_request(&ok).is_ok());
        assert!(encode_request(&SetWebhook::new("")).is_ok());

        let http = SetWebhook::new("http://bot.example.com/hook");
        assert!(matches!(
            encode_request(&http),
            Err(EncodeError::InvalidParameter { field: "url", .. })
        ));

        let bad_token = SetWebhook::new("https://a.example").secret_token("has space");
        assert!(matches!(
            encode_request(&bad_token),
            Err(EncodeError::InvalidParameter { field: "secret_token", .. })
        ));

        let long_token = SetWebhook::new("https://a.example").secret_token("a".repeat(257));
        assert!(encode_request(&long_token).is_err());

        let too_many = SetWebhook::new("https://a.example").max_connections(101);
        assert!(encode_request(&too_many).is_err());
    }

    #[test]
    fn test_get_webhook_info_body_is_empty_object() {
        assert_eq!(encode_request(&GetWebhookInfo {}).unwrap(), b"{}");
    }

    #[test]
    fn test_decode_bool_response() {
        let decoded = decode_response::<DeleteWebhook>(br#"{"ok":true,"result":true}"#).unwrap();
        assert!(decoded.value);
    }

    #[test]
    fn test_decode_api_error() {
        let err = decode_response::<GetUpdates>(
            br#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 5","parameters":{"retry_after":5}}"#,
        )
        .unwrap_err();
        let ResponseError::Api(api) = err else {
            panic!("expected an API error, got {err:?}");
        };
        assert_eq!(api.error_code, Some(429));
        assert_eq!(api.retry_delay(), Some(Duration::from_secs(5)));
        assert_eq!(
            api.to_string(),
            "Bot API error 429: Too Many Requests: retry after 5"
        );
    }

    #[test]
    fn test_migrate_to_chat_id() {
        let err = decode_response::<GetWebhookInfo>(
            br#"{"ok":false,"error_code":400,"description":"Bad Request: group chat was upgraded to a supergroup chat","parameters":{"migrate_to_chat_id":-1001234567890}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResponseError::Api(ApiError {
                migrate_to_chat_id: Some(id),
                ..
            }) if id.get() == -1_001_234_567_890
        ));
    }

    #[test]
    fn test_ok_without_result() {
        let err = decode_response::<GetWebhookInfo>(br#"{"ok":true}"#).unwrap_err();
        assert!(matches!(
            err,
            ResponseError::Decode(DecodeError::MissingField { .. })
        ));
    }

    #[test]
    fn test_not_an_envelope() {
        assert!(matches!(
            decode_response::<GetUpdates>(b"[1,2,3]"),
            Err(ResponseError::Envelope(_))
        ));
    }
}
