use crate::entity::EntityRangeError;
use crate::markup::InlineKeyboardMarkup;
use crate::media::{
    Animation, Audio, Contact, Dice, Document, Location, PhotoSize, Sticker, Venue, Video,
    VideoNote, Voice,
};
use crate::variant::True;
use crate::{Chat, Identifier, MessageEntity, RawObject, User, Utf16Text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

variant_container! {
    /// What a message carries. Upstream sets at most one of these fields.
    pub enum MessageKind {
        Text(String) = "text",
        Animation(Animation) = "animation",
        Audio(Audio) = "audio",
        Document(Document) = "document",
        /// Available sizes of the photo
        Photo(Vec<PhotoSize>) = "photo",
        Sticker(Sticker) = "sticker",
        Video(Video) = "video",
        VideoNote(VideoNote) = "video_note",
        Voice(Voice) = "voice",
        Contact(Contact) = "contact",
        Dice(Dice) = "dice",
        Game(RawObject) = "game",
        Poll(RawObject) = "poll",
        Venue(Venue) = "venue",
        Location(Location) = "location",
        NewChatMembers(Vec<User>) = "new_chat_members",
        LeftChatMember(User) = "left_chat_member",
        NewChatTitle(String) = "new_chat_title",
        NewChatPhoto(Vec<PhotoSize>) = "new_chat_photo",
        DeleteChatPhoto(True) = "delete_chat_photo",
        GroupChatCreated(True) = "group_chat_created",
        SupergroupChatCreated(True) = "supergroup_chat_created",
        ChannelChatCreated(True) = "channel_chat_created",
        MessageAutoDeleteTimerChanged(RawObject) = "message_auto_delete_timer_changed",
        MigrateToChatId(Identifier) = "migrate_to_chat_id",
        MigrateFromChatId(Identifier) = "migrate_from_chat_id",
        /// Never carries a further `reply_to_message`
        PinnedMessage(Box<Message>) = "pinned_message",
        Invoice(RawObject) = "invoice",
        SuccessfulPayment(RawObject) = "successful_payment",
        UserShared(RawObject) = "user_shared",
        ChatShared(RawObject) = "chat_shared",
        /// Domain name of the website the user logged in to
        ConnectedWebsite(String) = "connected_website",
        WriteAccessAllowed(RawObject) = "write_access_allowed",
        PassportData(RawObject) = "passport_data",
        ProximityAlertTriggered(RawObject) = "proximity_alert_triggered",
        ForumTopicCreated(RawObject) = "forum_topic_created",
        ForumTopicEdited(RawObject) = "forum_topic_edited",
        ForumTopicClosed(RawObject) = "forum_topic_closed",
        ForumTopicReopened(RawObject) = "forum_topic_reopened",
        GeneralForumTopicHidden(RawObject) = "general_forum_topic_hidden",
        GeneralForumTopicUnhidden(RawObject) = "general_forum_topic_unhidden",
        VideoChatScheduled(RawObject) = "video_chat_scheduled",
        VideoChatStarted(RawObject) = "video_chat_started",
        VideoChatEnded(RawObject) = "video_chat_ended",
        VideoChatParticipantsInvited(RawObject) = "video_chat_participants_invited",
        WebAppData(RawObject) = "web_app_data",
    }
    companions {
        Animation(animation) => "document": Document::from(animation),
        Venue(venue) => "location": venue.location,
    }
}

impl MessageKind {
    /// Pairs that upstream sets together for backward compatibility.
    /// The first field wins; the second is not an ambiguity and is written
    /// back out on encode.
    pub const COMPANIONS: &'static [(&'static str, &'static str)] =
        &[("animation", "document"), ("venue", "location")];

    /// True for join/leave/pin and other events generated by the service
    pub fn is_service(&self) -> bool {
        !matches!(
            self,
            Self::Text(_)
                | Self::Animation(_)
                | Self::Audio(_)
                | Self::Document(_)
                | Self::Photo(_)
                | Self::Sticker(_)
                | Self::Video(_)
                | Self::VideoNote(_)
                | Self::Voice(_)
                | Self::Contact(_)
                | Self::Dice(_)
                | Self::Game(_)
                | Self::Poll(_)
                | Self::Venue(_)
                | Self::Location(_)
                | Self::Invoice(_)
                | Self::Unknown
        )
    }
}

/// A message: envelope fields plus exactly one [`MessageKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Identifier,
    /// Forum topic the message belongs to; supergroups only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<Identifier>,
    /// Empty for messages sent to channels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// Sender when the message is sent on behalf of a chat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    /// Unix time the message was sent
    pub date: i64,
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_from: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_from_chat: Option<Chat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_from_message_id: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_signature: Option<String>,
    /// Sender name for users who hide their account in forwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_topic_message: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_automatic_forward: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_bot: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_protected_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_signature: Option<String>,
    /// Entities over `text`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    /// Caption for animation, audio, document, photo, video or voice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Entities over `caption`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<Vec<MessageEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_media_spoiler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    /// Message with only the envelope fields and `kind` set
    pub fn new(message_id: impl Into<Identifier>, date: i64, chat: Chat, kind: MessageKind) -> Self {
        Self {
            message_id: message_id.into(),
            message_thread_id: None,
            from: None,
            sender_chat: None,
            date,
            chat,
            forward_from: None,
            forward_from_chat: None,
            forward_from_message_id: None,
            forward_signature: None,
            forward_sender_name: None,
            forward_date: None,
            is_topic_message: None,
            is_automatic_forward: None,
            reply_to_message: None,
            via_bot: None,
            edit_date: None,
            has_protected_content: None,
            media_group_id: None,
            author_signature: None,
            entities: None,
            caption: None,
            caption_entities: None,
            has_media_spoiler: None,
            reply_markup: None,
            kind,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The wire field holding the content, `None` if unrecognised
    pub fn content_field(&self) -> Option<&'static str> {
        self.kind.field_name()
    }

    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    pub fn edit_date_time(&self) -> Option<DateTime<Utc>> {
        self.edit_date.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn is_forwarded(&self) -> bool {
        self.forward_date.is_some()
    }

    /// Largest size of a photo message
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        match &self.kind {
            MessageKind::Photo(sizes) => sizes.iter().max_by_key(|p| p.area()),
            _ => None,
        }
    }

    /// Text entities paired with the text they cover
    pub fn text_spans(&self) -> Result<Vec<(&MessageEntity, String)>, EntityRangeError> {
        spans(self.text(), self.entities.as_deref())
    }

    /// Caption entities paired with the caption text they cover
    pub fn caption_spans(&self) -> Result<Vec<(&MessageEntity, String)>, EntityRangeError> {
        spans(self.caption.as_deref(), self.caption_entities.as_deref())
    }
}

fn spans<'a>(
    text: Option<&str>,
    entities: Option<&'a [MessageEntity]>,
) -> Result<Vec<(&'a MessageEntity, String)>, EntityRangeError> {
    let (Some(text), Some(entities)) = (text, entities) else {
        return Ok(Vec::new());
    };
    let text = Utf16Text::new(text);
    entities
        .iter()
        .map(|entity| text.extract(entity).map(|s| (entity, s)))
        .collect()
}

/// Unique message identifier, as returned by `copyMessage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId {
    pub message_id: Identifier,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{ChatType, MessageEntityKind};
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": { "id": 5, "type": "private", "first_name": "Ada" }
        })
    }

    #[test]
    fn test_text_variant() {
        let mut raw = base();
        raw["text"] = json!("/start now");
        raw["entities"] = json!([{ "type": "bot_command", "offset": 0, "length": 6 }]);
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.text(), Some("/start now"));
        assert_eq!(msg.content_field(), Some("text"));
        let spans = msg.text_spans().unwrap();
        assert_eq!(spans[0].0.kind, MessageEntityKind::BotCommand);
        assert_eq!(spans[0].1, "/start");
    }

    #[test]
    fn test_first_declared_variant_wins() {
        let mut raw = base();
        raw["audio"] = json!({ "file_id": "a", "file_unique_id": "b", "duration": 3 });
        raw["text"] = json!("hi");
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.kind, MessageKind::Text("hi".into()));
    }

    #[test]
    fn test_no_variant_is_unknown() {
        let msg: Message = serde_json::from_value(base()).unwrap();
        assert!(msg.kind.is_unknown());
        assert_eq!(msg.chat.chat_type, ChatType::Private);
        assert_eq!(
            msg.date_time().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_true_marker_round_trip() {
        let mut raw = base();
        raw["group_chat_created"] = json!(true);
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.kind, MessageKind::GroupChatCreated(True));
        assert!(msg.kind.is_service());
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_false_for_true_field_is_an_error() {
        let mut raw = base();
        raw["delete_chat_photo"] = json!(false);
        let err = serde_json::from_value::<Message>(raw).unwrap_err();
        assert!(err.to_string().contains("delete_chat_photo"));
    }

    #[test]
    fn test_pinned_message_nests() {
        let mut pinned = base();
        pinned["text"] = json!("pin me");
        let mut raw = base();
        raw["pinned_message"] = pinned;
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        match &msg.kind {
            MessageKind::PinnedMessage(inner) => assert_eq!(inner.text(), Some("pin me")),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_largest_photo() {
        let mut raw = base();
        raw["photo"] = json!([
            { "file_id": "s", "file_unique_id": "s1", "width": 90, "height": 90 },
            { "file_id": "l", "file_unique_id": "l1", "width": 1280, "height": 960 },
            { "file_id": "m", "file_unique_id": "m1", "width": 320, "height": 240 }
        ]);
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.largest_photo().unwrap().file_id.as_str(), "l");
    }

    #[test]
    fn test_companions_are_written_back() {
        let mut raw = base();
        raw["venue"] = json!({
            "location": { "longitude": 13.4, "latitude": 52.5 },
            "title": "Tor",
            "address": "Pariser Platz"
        });
        raw["location"] = json!({ "longitude": 13.4, "latitude": 52.5 });
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.content_field(), Some("venue"));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);

        let mut raw = base();
        raw["animation"] = json!({
            "file_id": "CgA", "file_unique_id": "AgA",
            "width": 320, "height": 240, "duration": 2, "mime_type": "video/mp4"
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        let encoded = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            encoded["document"],
            json!({ "file_id": "CgA", "file_unique_id": "AgA", "mime_type": "video/mp4" })
        );
    }

    #[test]
    fn test_fields_table_order() {
        assert_eq!(MessageKind::FIELDS[0], "text");
        assert_eq!(MessageKind::FIELDS.len(), 46);
        let animation = MessageKind::FIELDS.iter().position(|f| *f == "animation");
        let document = MessageKind::FIELDS.iter().position(|f| *f == "document");
        assert!(animation < document);
    }
}
