//! Decode and encode entry points
//!
//! Decoding is two passes over the same `serde_json::Value`: the schema
//! validator first (paths, precision, variant resolution, entity spans),
//! then serde builds the typed record. Both passes pick variants in the
//! same declaration order, so the record always matches what was validated.

use crate::config::CodecConfig;
use crate::diagnostic::Diagnostic;
use crate::error::{DecodeError, EncodeError, Result};
use crate::schema::EntityKind;
use crate::validate::Validator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tgwire_types::{
    CallbackQuery, Chat, ChatFullInfo, InlineKeyboardMarkup, Message, MessageEntity, MessageId,
    Update, User, WebhookInfo,
};
use tracing::{debug, warn};

/// A typed record the codec has a schema for
pub trait WireEntity: Serialize + DeserializeOwned {
    const KIND: EntityKind;
}

macro_rules! wire_entity {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl WireEntity for $ty {
                const KIND: EntityKind = EntityKind::$kind;
            }
        )+
    };
}

wire_entity! {
    Update => Update,
    Message => Message,
    MessageId => MessageId,
    User => User,
    Chat => Chat,
    ChatFullInfo => ChatFullInfo,
    MessageEntity => MessageEntity,
    CallbackQuery => CallbackQuery,
    InlineKeyboardMarkup => InlineKeyboardMarkup,
    WebhookInfo => WebhookInfo,
}

/// A decoded value together with the non-fatal findings about its payload
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    /// True if nothing was reported
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

/// Schema-checked decoder and encoder
///
/// Holds only configuration, so one instance can be shared freely between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode one record from JSON bytes
    pub fn decode<T: WireEntity>(&self, bytes: &[u8]) -> Result<Decoded<T>> {
        self.decode_value(parse(bytes)?)
    }

    /// Decode one record from an already parsed JSON value
    pub fn decode_value<T: WireEntity>(&self, value: Value) -> Result<Decoded<T>> {
        let mut validator = Validator::new(&self.config);
        validator.entity(T::KIND, &value)?;
        let diagnostics = validator.into_diagnostics();
        let value = construct(T::KIND, value)?;
        Ok(self.finish(T::KIND, value, diagnostics))
    }

    /// Decode a JSON array of records; diagnostic paths start with the index
    pub fn decode_list<T: WireEntity>(&self, bytes: &[u8]) -> Result<Decoded<Vec<T>>> {
        self.decode_list_value(parse(bytes)?)
    }

    pub fn decode_list_value<T: WireEntity>(&self, value: Value) -> Result<Decoded<Vec<T>>> {
        let mut validator = Validator::new(&self.config);
        validator.list(T::KIND, &value)?;
        let diagnostics = validator.into_diagnostics();
        let value = construct(T::KIND, value)?;
        Ok(self.finish(T::KIND, value, diagnostics))
    }

    pub fn decode_update(&self, bytes: &[u8]) -> Result<Decoded<Update>> {
        self.decode(bytes)
    }

    /// Decode a `getUpdates` result array
    pub fn decode_updates(&self, bytes: &[u8]) -> Result<Decoded<Vec<Update>>> {
        self.decode_list(bytes)
    }

    pub fn decode_message(&self, bytes: &[u8]) -> Result<Decoded<Message>> {
        self.decode(bytes)
    }

    pub fn decode_chat(&self, bytes: &[u8]) -> Result<Decoded<Chat>> {
        self.decode(bytes)
    }

    /// Decode a `getChat` result
    pub fn decode_chat_full_info(&self, bytes: &[u8]) -> Result<Decoded<ChatFullInfo>> {
        self.decode(bytes)
    }

    pub fn decode_user(&self, bytes: &[u8]) -> Result<Decoded<User>> {
        self.decode(bytes)
    }

    pub fn decode_webhook_info(&self, bytes: &[u8]) -> Result<Decoded<WebhookInfo>> {
        self.decode(bytes)
    }

    /// Encode any record to JSON bytes
    pub fn encode<T: WireEntity>(&self, value: &T) -> std::result::Result<Vec<u8>, EncodeError> {
        let bytes = serde_json::to_vec(value)?;
        debug!(entity = %T::KIND, bytes = bytes.len(), "Encoded");
        Ok(bytes)
    }

    fn finish<T>(&self, entity: EntityKind, value: T, diagnostics: Vec<Diagnostic>) -> Decoded<T> {
        for diagnostic in &diagnostics {
            warn!(entity = %entity, path = %diagnostic.path(), "{diagnostic}");
        }
        debug!(
            entity = %entity,
            strictness = ?self.config.strictness,
            diagnostics = diagnostics.len(),
            "Decoded"
        );
        Decoded { value, diagnostics }
    }
}

fn parse(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(DecodeError::Syntax)
}

fn construct<T: DeserializeOwned>(entity: EntityKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| DecodeError::Construct { entity, source })
}

/// Decode an update with the default (lenient) configuration
pub fn decode_update(bytes: &[u8]) -> Result<Decoded<Update>> {
    Codec::default().decode_update(bytes)
}

/// Decode a `getUpdates` result array with the default configuration
pub fn decode_updates(bytes: &[u8]) -> Result<Decoded<Vec<Update>>> {
    Codec::default().decode_updates(bytes)
}

/// Decode a message with the default configuration
pub fn decode_message(bytes: &[u8]) -> Result<Decoded<Message>> {
    Codec::default().decode_message(bytes)
}

pub fn decode_chat(bytes: &[u8]) -> Result<Decoded<Chat>> {
    Codec::default().decode_chat(bytes)
}

pub fn decode_chat_full_info(bytes: &[u8]) -> Result<Decoded<ChatFullInfo>> {
    Codec::default().decode_chat_full_info(bytes)
}

pub fn decode_user(bytes: &[u8]) -> Result<Decoded<User>> {
    Codec::default().decode_user(bytes)
}

pub fn decode_webhook_info(bytes: &[u8]) -> Result<Decoded<WebhookInfo>> {
    Codec::default().decode_webhook_info(bytes)
}

pub fn encode_update(update: &Update) -> std::result::Result<Vec<u8>, EncodeError> {
    Codec::default().encode(update)
}

pub fn encode_message(message: &Message) -> std::result::Result<Vec<u8>, EncodeError> {
    Codec::default().encode(message)
}

pub fn encode_chat(chat: &Chat) -> std::result::Result<Vec<u8>, EncodeError> {
    Codec::default().encode(chat)
}

pub fn encode_user(user: &User) -> std::result::Result<Vec<u8>, EncodeError> {
    Codec::default().encode(user)
}

/// Encode an inline keyboard for the `reply_markup` parameter
pub fn encode_reply_markup(
    markup: &InlineKeyboardMarkup,
) -> std::result::Result<Vec<u8>, EncodeError> {
    Codec::default().encode(markup)
}
