//! tgwire Codec - schema-checked decoding and encoding of Bot API payloads
//!
//! Decoding validates the JSON against a declarative schema table before
//! building the typed records from `tgwire-types`. Fatal problems
//! ([`DecodeError`]) carry the path of the offending field; recoverable
//! ones come back as [`Diagnostic`]s next to the decoded value.
//!
//! ```
//! let decoded = tgwire_codec::decode_update(br#"{"update_id": 1}"#).unwrap();
//! assert_eq!(decoded.value.update_id.get(), 1);
//! assert_eq!(decoded.diagnostics.len(), 1); // no variant field set
//! ```
//!
//! Every call is a pure function of its input and the codec's
//! configuration; no I/O, no shared state.

pub mod api;
pub mod codec;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod path;
pub mod schema;
mod validate;

pub use api::{
    decode_response, encode_request, ApiError, DeleteWebhook, GetUpdates, GetWebhookInfo, Method,
    ResponseBody, ResponseError, SetWebhook, UpdateType,
};
pub use codec::{
    decode_chat, decode_chat_full_info, decode_message, decode_update, decode_updates,
    decode_user, decode_webhook_info, encode_chat, encode_message, encode_reply_markup,
    encode_update, encode_user, Codec, Decoded, WireEntity,
};
pub use config::{CodecConfig, Strictness};
pub use diagnostic::{Diagnostic, UnknownVariantWarning, VariantIssue};
pub use error::{DecodeError, EncodeError, Result};
pub use path::{FieldPath, PathSegment};
pub use schema::{EntityKind, EntitySchema, FieldKind, FieldSpec, Presence};
