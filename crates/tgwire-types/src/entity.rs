//! Message entities
//!
//! Offsets and lengths are measured in UTF-16 code units, not bytes or
//! code points. A span that runs past the end of the text, or that cuts a
//! surrogate pair in half, is rejected instead of producing garbage.

use crate::User;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Span of a message entity that does not fit its text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityRangeError {
    #[error("entity {offset}+{length} exceeds text length of {text_len} UTF-16 units")]
    OutOfBounds {
        offset: u32,
        length: u32,
        text_len: usize,
    },

    #[error("entity {offset}+{length} splits a surrogate pair")]
    SplitsSurrogatePair { offset: u32, length: u32 },
}

/// Type-specific field missing from a wire entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{entity_type}\" entity requires field `{field}`")]
pub struct MissingEntityField {
    pub entity_type: &'static str,
    pub field: &'static str,
}

/// Entity type together with the extras that are only meaningful for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre { language: Option<String> },
    TextLink { url: String },
    TextMention { user: User },
    CustomEmoji { custom_emoji_id: String },
    /// Type introduced upstream after this crate; extras are not kept
    Other(UnknownEntityType),
}

/// Name of an entity type this crate does not model.
///
/// Never one of [`MessageEntityKind::KNOWN_TYPES`]: a modelled type carries
/// its extras in its own variant, and an `Other("text_link")` would encode
/// without the `url` that decoding requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownEntityType(String);

impl UnknownEntityType {
    /// `None` when `name` is a type with its own [`MessageEntityKind`] variant
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!MessageEntityKind::KNOWN_TYPES.contains(&name.as_str())).then_some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MessageEntityKind {
    /// Wire names of the modelled entity types
    pub const KNOWN_TYPES: &'static [&'static str] = &[
        "mention",
        "hashtag",
        "cashtag",
        "bot_command",
        "url",
        "email",
        "phone_number",
        "bold",
        "italic",
        "underline",
        "strikethrough",
        "spoiler",
        "code",
        "pre",
        "text_link",
        "text_mention",
        "custom_emoji",
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mention => "mention",
            Self::Hashtag => "hashtag",
            Self::Cashtag => "cashtag",
            Self::BotCommand => "bot_command",
            Self::Url => "url",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strikethrough => "strikethrough",
            Self::Spoiler => "spoiler",
            Self::Code => "code",
            Self::Pre { .. } => "pre",
            Self::TextLink { .. } => "text_link",
            Self::TextMention { .. } => "text_mention",
            Self::CustomEmoji { .. } => "custom_emoji",
            Self::Other(name) => name.as_str(),
        }
    }
}

/// One special entity in a text message: hashtag, mention, link, formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEntity", into = "WireEntity")]
pub struct MessageEntity {
    pub kind: MessageEntityKind,
    /// Offset in UTF-16 code units
    pub offset: u32,
    /// Length in UTF-16 code units
    pub length: u32,
}

#[derive(Serialize, Deserialize)]
struct WireEntity {
    #[serde(rename = "type")]
    entity_type: String,
    offset: u32,
    length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_emoji_id: Option<String>,
}

impl TryFrom<WireEntity> for MessageEntity {
    type Error = MissingEntityField;

    fn try_from(wire: WireEntity) -> Result<Self, Self::Error> {
        let missing = |entity_type, field| MissingEntityField { entity_type, field };
        let kind = match wire.entity_type.as_str() {
            "mention" => MessageEntityKind::Mention,
            "hashtag" => MessageEntityKind::Hashtag,
            "cashtag" => MessageEntityKind::Cashtag,
            "bot_command" => MessageEntityKind::BotCommand,
            "url" => MessageEntityKind::Url,
            "email" => MessageEntityKind::Email,
            "phone_number" => MessageEntityKind::PhoneNumber,
            "bold" => MessageEntityKind::Bold,
            "italic" => MessageEntityKind::Italic,
            "underline" => MessageEntityKind::Underline,
            "strikethrough" => MessageEntityKind::Strikethrough,
            "spoiler" => MessageEntityKind::Spoiler,
            "code" => MessageEntityKind::Code,
            "pre" => MessageEntityKind::Pre {
                language: wire.language,
            },
            "text_link" => MessageEntityKind::TextLink {
                url: wire.url.ok_or_else(|| missing("text_link", "url"))?,
            },
            "text_mention" => MessageEntityKind::TextMention {
                user: wire.user.ok_or_else(|| missing("text_mention", "user"))?,
            },
            "custom_emoji" => MessageEntityKind::CustomEmoji {
                custom_emoji_id: wire
                    .custom_emoji_id
                    .ok_or_else(|| missing("custom_emoji", "custom_emoji_id"))?,
            },
            _ => MessageEntityKind::Other(UnknownEntityType(wire.entity_type)),
        };
        Ok(Self {
            kind,
            offset: wire.offset,
            length: wire.length,
        })
    }
}

impl From<MessageEntity> for WireEntity {
    fn from(entity: MessageEntity) -> Self {
        let mut wire = WireEntity {
            entity_type: entity.kind.as_str().to_string(),
            offset: entity.offset,
            length: entity.length,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        };
        match entity.kind {
            MessageEntityKind::Pre { language } => wire.language = language,
            MessageEntityKind::TextLink { url } => wire.url = Some(url),
            MessageEntityKind::TextMention { user } => wire.user = Some(user),
            MessageEntityKind::CustomEmoji { custom_emoji_id } => {
                wire.custom_emoji_id = Some(custom_emoji_id);
            }
            _ => {}
        }
        wire
    }
}

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Check that `offset..offset+length` (UTF-16 units) is a valid span of `text`.
/// Use [`Utf16Text`] when checking several spans over the same text.
pub fn check_span(text: &str, offset: u32, length: u32) -> Result<(), EntityRangeError> {
    Utf16Text::new(text).check_span(offset, length)
}

/// Text encoded once as UTF-16, for checking or slicing many entities over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf16Text(Vec<u16>);

impl Utf16Text {
    pub fn new(text: &str) -> Self {
        Self(text.encode_utf16().collect())
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn check_span(&self, offset: u32, length: u32) -> Result<(), EntityRangeError> {
        let start = offset as usize;
        let end = start + length as usize;
        if end > self.0.len() {
            return Err(EntityRangeError::OutOfBounds {
                offset,
                length,
                text_len: self.0.len(),
            });
        }
        // A boundary sitting on a low surrogate cuts a pair in half
        let splits = |i: usize| self.0.get(i).is_some_and(|u| (0xDC00..=0xDFFF).contains(u));
        if splits(start) || splits(end) {
            return Err(EntityRangeError::SplitsSurrogatePair { offset, length });
        }
        Ok(())
    }

    /// The part of the text covered by `entity`
    pub fn extract(&self, entity: &MessageEntity) -> Result<String, EntityRangeError> {
        self.check_span(entity.offset, entity.length)?;
        String::from_utf16(&self.0[entity.utf16_range()]).map_err(|_| {
            EntityRangeError::SplitsSurrogatePair {
                offset: entity.offset,
                length: entity.length,
            }
        })
    }
}

impl MessageEntity {
    pub fn new(kind: MessageEntityKind, offset: u32, length: u32) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    /// The span as a range of UTF-16 code units
    pub fn utf16_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }

    /// Check that the span lies within `text` without extracting it
    pub fn check_range(&self, text: &str) -> Result<(), EntityRangeError> {
        check_span(text, self.offset, self.length)
    }

    /// The part of `text` covered by this entity
    pub fn extract(&self, text: &str) -> Result<String, EntityRangeError> {
        Utf16Text::new(text).extract(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_ascii() {
        let entity = MessageEntity::new(MessageEntityKind::Bold, 0, 5);
        assert_eq!(entity.extract("hello world").unwrap(), "hello");
    }

    #[test]
    fn test_extract_counts_utf16_units() {
        // "🦀" is two UTF-16 units
        let text = "🦀 #rust";
        let entity = MessageEntity::new(MessageEntityKind::Hashtag, 3, 5);
        assert_eq!(entity.extract(text).unwrap(), "#rust");
        assert_eq!(utf16_len(text), 8);
        assert!(check_span(text, 1, 2).is_err());
    }

    #[test]
    fn test_encoded_text_serves_many_entities() {
        let text = Utf16Text::new("🦀 #rust @ferris");
        assert_eq!(text.len(), 16);
        let hashtag = MessageEntity::new(MessageEntityKind::Hashtag, 3, 5);
        let mention = MessageEntity::new(MessageEntityKind::Mention, 9, 7);
        assert_eq!(text.extract(&hashtag).unwrap(), "#rust");
        assert_eq!(text.extract(&mention).unwrap(), "@ferris");
        assert!(text.check_span(9, 8).is_err());
        assert!(text.check_span(1, 1).is_err());
    }

    #[test]
    fn test_out_of_bounds() {
        let entity = MessageEntity::new(MessageEntityKind::Code, 3, 5);
        assert_eq!(
            entity.extract("hello"),
            Err(EntityRangeError::OutOfBounds {
                offset: 3,
                length: 5,
                text_len: 5
            })
        );
        assert!(entity.check_range("hello").is_err());
    }

    #[test]
    fn test_split_surrogate_pair() {
        let entity = MessageEntity::new(MessageEntityKind::Italic, 0, 1);
        assert!(matches!(
            entity.extract("🦀"),
            Err(EntityRangeError::SplitsSurrogatePair { .. })
        ));
    }

    #[test]
    fn test_text_link_requires_url() {
        let err = serde_json::from_value::<MessageEntity>(json!({
            "type": "text_link",
            "offset": 0,
            "length": 4
        }))
        .unwrap_err();
        assert!(err.to_string().contains("`url`"));
    }

    #[test]
    fn test_extras_dropped_for_other_types() {
        let entity: MessageEntity = serde_json::from_value(json!({
            "type": "bold",
            "offset": 0,
            "length": 4,
            "url": "https://example.com"
        }))
        .unwrap();
        assert_eq!(entity.kind, MessageEntityKind::Bold);
        assert!(serde_json::to_value(&entity).unwrap().get("url").is_none());
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let entity: MessageEntity = serde_json::from_value(json!({
            "type": "blockquote",
            "offset": 1,
            "length": 2
        }))
        .unwrap();
        assert_eq!(entity.kind.as_str(), "blockquote");
        assert_eq!(serde_json::to_value(&entity).unwrap()["type"], "blockquote");
    }

    #[test]
    fn test_unknown_type_cannot_shadow_known_one() {
        for name in MessageEntityKind::KNOWN_TYPES {
            assert!(UnknownEntityType::new(*name).is_none(), "{name}");
        }
        let kind = MessageEntityKind::Other(UnknownEntityType::new("expandable_blockquote").unwrap());
        let entity = MessageEntity::new(kind, 0, 3);
        let back: MessageEntity =
            serde_json::from_value(serde_json::to_value(&entity).unwrap()).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_known_types_match_variants() {
        let user = User::new(1, false, "Ada");
        let kinds = [
            MessageEntityKind::Mention,
            MessageEntityKind::Hashtag,
            MessageEntityKind::Cashtag,
            MessageEntityKind::BotCommand,
            MessageEntityKind::Url,
            MessageEntityKind::Email,
            MessageEntityKind::PhoneNumber,
            MessageEntityKind::Bold,
            MessageEntityKind::Italic,
            MessageEntityKind::Underline,
            MessageEntityKind::Strikethrough,
            MessageEntityKind::Spoiler,
            MessageEntityKind::Code,
            MessageEntityKind::Pre { language: None },
            MessageEntityKind::TextLink { url: "u".into() },
            MessageEntityKind::TextMention { user },
            MessageEntityKind::CustomEmoji { custom_emoji_id: "e".into() },
        ];
        let names: Vec<&str> = kinds.iter().map(MessageEntityKind::as_str).collect();
        assert_eq!(names, MessageEntityKind::KNOWN_TYPES);
    }
}
