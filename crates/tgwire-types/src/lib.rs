//! tgwire Types - Telegram Bot API records
//!
//! Typed, immutable records for the subset of the Bot API schema handled by
//! tgwire. Field names match the wire format exactly; optional fields are
//! `Option` so an omitted field is distinguishable from a falsy one.
//!
//! `Update` and `Message` are variant containers: envelope fields plus a
//! closed enum holding the one populated variant (see [`variant`]).

#[macro_use]
pub mod variant;

pub mod chat;
pub mod entity;
pub mod identifier;
pub mod markup;
pub mod media;
pub mod message;
pub mod update;
pub mod user;
pub mod webhook;

pub use chat::{Chat, ChatFullInfo, ChatPhoto, ChatType};
pub use entity::{
    check_span, utf16_len, EntityRangeError, MessageEntity, MessageEntityKind, MissingEntityField,
    UnknownEntityType, Utf16Text,
};
pub use identifier::{Identifier, IdentifierError, MAX_SAFE_FLOAT_INTEGER};
pub use markup::{InlineKeyboardButton, InlineKeyboardMarkup};
pub use media::{
    Animation, Audio, Contact, Dice, Document, FileId, FileUniqueId, Location, PhotoSize,
    Sticker, Venue, Video, VideoNote, Voice,
};
pub use message::{Message, MessageId, MessageKind};
pub use update::{CallbackQuery, Update, UpdateKind};
pub use user::User;
pub use variant::True;
pub use webhook::WebhookInfo;

/// JSON object kept exactly as received, for payloads this crate does not model
pub type RawObject = serde_json::Map<String, serde_json::Value>;
