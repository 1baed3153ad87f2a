//! Declarative wire schema
//!
//! Every record the codec understands is described by one static
//! [`EntitySchema`]: its envelope fields, its variant fields (for
//! containers), and which text fields carry entity spans. The validator is
//! driven entirely by these tables.

use std::fmt;
use tgwire_types::{ChatType, MessageKind};

/// Records known to the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Update,
    Message,
    MessageId,
    User,
    Chat,
    ChatFullInfo,
    ChatPhoto,
    MessageEntity,
    PhotoSize,
    Audio,
    Document,
    Video,
    Animation,
    Voice,
    VideoNote,
    Sticker,
    Contact,
    Dice,
    Location,
    Venue,
    CallbackQuery,
    InlineKeyboardMarkup,
    InlineKeyboardButton,
    WebhookInfo,
}

/// Wire type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer id, subject to the precision policy
    Identifier,
    /// Signed 64-bit integer such as a unix timestamp
    Integer,
    /// Non-negative 32-bit integer: sizes, durations, offsets
    Count,
    /// Any JSON number
    Float,
    Bool,
    /// Boolean that may only be `true`
    True,
    String,
    /// String restricted to the listed values
    Enum(&'static [&'static str]),
    Entity(EntityKind),
    ListOf(&'static FieldKind),
    /// JSON object kept verbatim
    Object,
}

/// When a field has to be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Required when the sibling string field `field` equals `equals`
    RequiredWhen {
        field: &'static str,
        equals: &'static str,
    },
}

/// One field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

/// Full description of one record
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: EntityKind,
    /// Record whose fields this one also carries
    pub extends: Option<EntityKind>,
    pub fields: &'static [FieldSpec],
    /// Variant fields in upstream declaration order; empty for plain records
    pub variants: &'static [FieldSpec],
    /// Variant pairs set together on purpose; the first one wins
    pub companions: &'static [(&'static str, &'static str)],
    /// `(text field, entity list field)` pairs whose spans are checked
    pub spans: &'static [(&'static str, &'static str)],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields
            .iter()
            .chain(self.variants)
            .find(|spec| spec.name == name)
    }

    /// True if `name` is a field of this record or of the one it extends
    pub fn knows(&self, name: &str) -> bool {
        self.field(name).is_some()
            || self
                .extends
                .is_some_and(|base| base.schema().field(name).is_some())
    }

    pub fn is_container(&self) -> bool {
        !self.variants.is_empty()
    }
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Required,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Optional,
    }
}

const fn required_when(
    name: &'static str,
    kind: FieldKind,
    field: &'static str,
    equals: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::RequiredWhen { field, equals },
    }
}

use EntityKind as E;
use FieldKind as K;

/// Schema of a record without variants
macro_rules! plain {
    ($entity:expr, [$($field:expr),+ $(,)?] $(,)?) => {
        EntitySchema {
            entity: $entity,
            extends: None,
            fields: &[$($field),+],
            variants: &[],
            companions: &[],
            spans: &[],
        }
    };
}

const PHOTO_LIST: FieldKind = K::ListOf(&K::Entity(E::PhotoSize));
const ENTITY_LIST: FieldKind = K::ListOf(&K::Entity(E::MessageEntity));

static UPDATE: EntitySchema = EntitySchema {
    entity: E::Update,
    extends: None,
    fields: &[required("update_id", K::Identifier)],
    variants: &[
        optional("message", K::Entity(E::Message)),
        optional("edited_message", K::Entity(E::Message)),
        optional("channel_post", K::Entity(E::Message)),
        optional("edited_channel_post", K::Entity(E::Message)),
        optional("inline_query", K::Object),
        optional("chosen_inline_result", K::Object),
        optional("callback_query", K::Entity(E::CallbackQuery)),
        optional("shipping_query", K::Object),
        optional("pre_checkout_query", K::Object),
        optional("poll", K::Object),
        optional("poll_answer", K::Object),
        optional("my_chat_member", K::Object),
        optional("chat_member", K::Object),
        optional("chat_join_request", K::Object),
    ],
    companions: &[],
    spans: &[],
};

static MESSAGE: EntitySchema = EntitySchema {
    entity: E::Message,
    extends: None,
    fields: &[
        required("message_id", K::Identifier),
        optional("message_thread_id", K::Identifier),
        optional("from", K::Entity(E::User)),
        optional("sender_chat", K::Entity(E::Chat)),
        required("date", K::Integer),
        required("chat", K::Entity(E::Chat)),
        optional("forward_from", K::Entity(E::User)),
        optional("forward_from_chat", K::Entity(E::Chat)),
        optional("forward_from_message_id", K::Identifier),
        optional("forward_signature", K::String),
        optional("forward_sender_name", K::String),
        optional("forward_date", K::Integer),
        optional("is_topic_message", K::Bool),
        optional("is_automatic_forward", K::Bool),
        optional("reply_to_message", K::Entity(E::Message)),
        optional("via_bot", K::Entity(E::User)),
        optional("edit_date", K::Integer),
        optional("has_protected_content", K::Bool),
        optional("media_group_id", K::String),
        optional("author_signature", K::String),
        optional("entities", ENTITY_LIST),
        optional("caption", K::String),
        optional("caption_entities", ENTITY_LIST),
        optional("has_media_spoiler", K::Bool),
        optional("reply_markup", K::Entity(E::InlineKeyboardMarkup)),
    ],
    variants: &[
        optional("text", K::String),
        optional("animation", K::Entity(E::Animation)),
        optional("audio", K::Entity(E::Audio)),
        optional("document", K::Entity(E::Document)),
        optional("photo", PHOTO_LIST),
        optional("sticker", K::Entity(E::Sticker)),
        optional("video", K::Entity(E::Video)),
        optional("video_note", K::Entity(E::VideoNote)),
        optional("voice", K::Entity(E::Voice)),
        optional("contact", K::Entity(E::Contact)),
        optional("dice", K::Entity(E::Dice)),
        optional("game", K::Object),
        optional("poll", K::Object),
        optional("venue", K::Entity(E::Venue)),
        optional("location", K::Entity(E::Location)),
        optional("new_chat_members", K::ListOf(&K::Entity(E::User))),
        optional("left_chat_member", K::Entity(E::User)),
        optional("new_chat_title", K::String),
        optional("new_chat_photo", PHOTO_LIST),
        optional("delete_chat_photo", K::True),
        optional("group_chat_created", K::True),
        optional("supergroup_chat_created", K::True),
        optional("channel_chat_created", K::True),
        optional("message_auto_delete_timer_changed", K::Object),
        optional("migrate_to_chat_id", K::Identifier),
        optional("migrate_from_chat_id", K::Identifier),
        optional("pinned_message", K::Entity(E::Message)),
        optional("invoice", K::Object),
        optional("successful_payment", K::Object),
        optional("user_shared", K::Object),
        optional("chat_shared", K::Object),
        optional("connected_website", K::String),
        optional("write_access_allowed", K::Object),
        optional("passport_data", K::Object),
        optional("proximity_alert_triggered", K::Object),
        optional("forum_topic_created", K::Object),
        optional("forum_topic_edited", K::Object),
        optional("forum_topic_closed", K::Object),
        optional("forum_topic_reopened", K::Object),
        optional("general_forum_topic_hidden", K::Object),
        optional("general_forum_topic_unhidden", K::Object),
        optional("video_chat_scheduled", K::Object),
        optional("video_chat_started", K::Object),
        optional("video_chat_ended", K::Object),
        optional("video_chat_participants_invited", K::Object),
        optional("web_app_data", K::Object),
    ],
    companions: MessageKind::COMPANIONS,
    spans: &[("text", "entities"), ("caption", "caption_entities")],
};

static MESSAGE_ID: EntitySchema = plain!(E::MessageId, [required("message_id", K::Identifier)]);

static USER: EntitySchema = plain!(
    E::User,
    [
        required("id", K::Identifier),
        required("is_bot", K::Bool),
        required("first_name", K::String),
        optional("last_name", K::String),
        optional("username", K::String),
        optional("language_code", K::String),
        optional("is_premium", K::Bool),
        optional("added_to_attachment_menu", K::Bool),
        optional("can_join_groups", K::Bool),
        optional("can_read_all_group_messages", K::Bool),
        optional("supports_inline_queries", K::Bool),
    ],
);

static CHAT: EntitySchema = plain!(
    E::Chat,
    [
        required("id", K::Identifier),
        required("type", K::Enum(ChatType::NAMES)),
        optional("title", K::String),
        optional("username", K::String),
        optional("first_name", K::String),
        optional("last_name", K::String),
        optional("is_forum", K::Bool),
    ],
);

static CHAT_FULL_INFO: EntitySchema = EntitySchema {
    entity: E::ChatFullInfo,
    extends: Some(E::Chat),
    fields: &[
        optional("photo", K::Entity(E::ChatPhoto)),
        optional("active_usernames", K::ListOf(&K::String)),
        optional("emoji_status_custom_emoji_id", K::String),
        optional("bio", K::String),
        optional("has_private_forwards", K::Bool),
        optional("has_restricted_voice_and_video_messages", K::Bool),
        optional("join_to_send_messages", K::Bool),
        optional("join_by_request", K::Bool),
        optional("description", K::String),
        optional("invite_link", K::String),
        optional("pinned_message", K::Entity(E::Message)),
        optional("permissions", K::Object),
        optional("slow_mode_delay", K::Count),
        optional("message_auto_delete_time", K::Count),
        optional("has_aggressive_anti_spam_enabled", K::Bool),
        optional("has_hidden_members", K::Bool),
        optional("has_protected_content", K::Bool),
        optional("sticker_set_name", K::String),
        optional("can_set_sticker_set", K::Bool),
        optional("linked_chat_id", K::Identifier),
        optional("location", K::Object),
    ],
    variants: &[],
    companions: &[],
    spans: &[],
};

static CHAT_PHOTO: EntitySchema = plain!(
    E::ChatPhoto,
    [
        required("small_file_id", K::String),
        required("small_file_unique_id", K::String),
        required("big_file_id", K::String),
        required("big_file_unique_id", K::String),
    ],
);

static MESSAGE_ENTITY: EntitySchema = plain!(
    E::MessageEntity,
    [
        required("type", K::String),
        required("offset", K::Count),
        required("length", K::Count),
        required_when("url", K::String, "type", "text_link"),
        required_when("user", K::Entity(E::User), "type", "text_mention"),
        optional("language", K::String),
        required_when("custom_emoji_id", K::String, "type", "custom_emoji"),
    ],
);

static PHOTO_SIZE: EntitySchema = plain!(
    E::PhotoSize,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("width", K::Count),
        required("height", K::Count),
        optional("file_size", K::Identifier),
    ],
);

static AUDIO: EntitySchema = plain!(
    E::Audio,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("duration", K::Count),
        optional("performer", K::String),
        optional("title", K::String),
        optional("file_name", K::String),
        optional("mime_type", K::String),
        optional("file_size", K::Identifier),
        optional("thumb", K::Entity(E::PhotoSize)),
    ],
);

static DOCUMENT: EntitySchema = plain!(
    E::Document,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        optional("thumb", K::Entity(E::PhotoSize)),
        optional("file_name", K::String),
        optional("mime_type", K::String),
        optional("file_size", K::Identifier),
    ],
);

static VIDEO: EntitySchema = plain!(
    E::Video,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("width", K::Count),
        required("height", K::Count),
        required("duration", K::Count),
        optional("thumb", K::Entity(E::PhotoSize)),
        optional("file_name", K::String),
        optional("mime_type", K::String),
        optional("file_size", K::Identifier),
    ],
);

static ANIMATION: EntitySchema = plain!(
    E::Animation,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("width", K::Count),
        required("height", K::Count),
        required("duration", K::Count),
        optional("thumb", K::Entity(E::PhotoSize)),
        optional("file_name", K::String),
        optional("mime_type", K::String),
        optional("file_size", K::Identifier),
    ],
);

static VOICE: EntitySchema = plain!(
    E::Voice,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("duration", K::Count),
        optional("mime_type", K::String),
        optional("file_size", K::Identifier),
    ],
);

static VIDEO_NOTE: EntitySchema = plain!(
    E::VideoNote,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("length", K::Count),
        required("duration", K::Count),
        optional("thumb", K::Entity(E::PhotoSize)),
        optional("file_size", K::Identifier),
    ],
);

static STICKER: EntitySchema = plain!(
    E::Sticker,
    [
        required("file_id", K::String),
        required("file_unique_id", K::String),
        required("type", K::String),
        required("width", K::Count),
        required("height", K::Count),
        required("is_animated", K::Bool),
        required("is_video", K::Bool),
        optional("thumb", K::Entity(E::PhotoSize)),
        optional("emoji", K::String),
        optional("set_name", K::String),
        optional("custom_emoji_id", K::String),
        optional("file_size", K::Identifier),
    ],
);

static CONTACT: EntitySchema = plain!(
    E::Contact,
    [
        required("phone_number", K::String),
        required("first_name", K::String),
        optional("last_name", K::String),
        optional("user_id", K::Identifier),
        optional("vcard", K::String),
    ],
);

static DICE: EntitySchema = plain!(
    E::Dice,
    [required("emoji", K::String), required("value", K::Count)],
);

static LOCATION: EntitySchema = plain!(
    E::Location,
    [
        required("longitude", K::Float),
        required("latitude", K::Float),
        optional("horizontal_accuracy", K::Float),
        optional("live_period", K::Count),
        optional("heading", K::Count),
        optional("proximity_alert_radius", K::Count),
    ],
);

static VENUE: EntitySchema = plain!(
    E::Venue,
    [
        required("location", K::Entity(E::Location)),
        required("title", K::String),
        required("address", K::String),
        optional("foursquare_id", K::String),
        optional("foursquare_type", K::String),
        optional("google_place_id", K::String),
        optional("google_place_type", K::String),
    ],
);

static CALLBACK_QUERY: EntitySchema = plain!(
    E::CallbackQuery,
    [
        required("id", K::String),
        required("from", K::Entity(E::User)),
        optional("message", K::Entity(E::Message)),
        optional("inline_message_id", K::String),
        required("chat_instance", K::String),
        optional("data", K::String),
        optional("game_short_name", K::String),
    ],
);

static INLINE_KEYBOARD_MARKUP: EntitySchema = plain!(
    E::InlineKeyboardMarkup,
    [required(
        "inline_keyboard",
        K::ListOf(&K::ListOf(&K::Entity(E::InlineKeyboardButton))),
    )],
);

static INLINE_KEYBOARD_BUTTON: EntitySchema = plain!(
    E::InlineKeyboardButton,
    [
        required("text", K::String),
        optional("url", K::String),
        optional("callback_data", K::String),
        optional("switch_inline_query", K::String),
        optional("switch_inline_query_current_chat", K::String),
        optional("pay", K::Bool),
    ],
);

static WEBHOOK_INFO: EntitySchema = plain!(
    E::WebhookInfo,
    [
        required("url", K::String),
        required("has_custom_certificate", K::Bool),
        required("pending_update_count", K::Count),
        optional("ip_address", K::String),
        optional("last_error_date", K::Integer),
        optional("last_error_message", K::String),
        optional("last_synchronization_error_date", K::Integer),
        optional("max_connections", K::Count),
        optional("allowed_updates", K::ListOf(&K::String)),
    ],
);

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        E::Update,
        E::Message,
        E::MessageId,
        E::User,
        E::Chat,
        E::ChatFullInfo,
        E::ChatPhoto,
        E::MessageEntity,
        E::PhotoSize,
        E::Audio,
        E::Document,
        E::Video,
        E::Animation,
        E::Voice,
        E::VideoNote,
        E::Sticker,
        E::Contact,
        E::Dice,
        E::Location,
        E::Venue,
        E::CallbackQuery,
        E::InlineKeyboardMarkup,
        E::InlineKeyboardButton,
        E::WebhookInfo,
    ];

    /// Schema table for this record
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            E::Update => &UPDATE,
            E::Message => &MESSAGE,
            E::MessageId => &MESSAGE_ID,
            E::User => &USER,
            E::Chat => &CHAT,
            E::ChatFullInfo => &CHAT_FULL_INFO,
            E::ChatPhoto => &CHAT_PHOTO,
            E::MessageEntity => &MESSAGE_ENTITY,
            E::PhotoSize => &PHOTO_SIZE,
            E::Audio => &AUDIO,
            E::Document => &DOCUMENT,
            E::Video => &VIDEO,
            E::Animation => &ANIMATION,
            E::Voice => &VOICE,
            E::VideoNote => &VIDEO_NOTE,
            E::Sticker => &STICKER,
            E::Contact => &CONTACT,
            E::Dice => &DICE,
            E::Location => &LOCATION,
            E::Venue => &VENUE,
            E::CallbackQuery => &CALLBACK_QUERY,
            E::InlineKeyboardMarkup => &INLINE_KEYBOARD_MARKUP,
            E::InlineKeyboardButton => &INLINE_KEYBOARD_BUTTON,
            E::WebhookInfo => &WEBHOOK_INFO,
        }
    }

    /// Upstream type name
    pub fn name(self) -> &'static str {
        match self {
            E::Update => "Update",
            E::Message => "Message",
            E::MessageId => "MessageId",
            E::User => "User",
            E::Chat => "Chat",
            E::ChatFullInfo => "ChatFullInfo",
            E::ChatPhoto => "ChatPhoto",
            E::MessageEntity => "MessageEntity",
            E::PhotoSize => "PhotoSize",
            E::Audio => "Audio",
            E::Document => "Document",
            E::Video => "Video",
            E::Animation => "Animation",
            E::Voice => "Voice",
            E::VideoNote => "VideoNote",
            E::Sticker => "Sticker",
            E::Contact => "Contact",
            E::Dice => "Dice",
            E::Location => "Location",
            E::Venue => "Venue",
            E::CallbackQuery => "CallbackQuery",
            E::InlineKeyboardMarkup => "InlineKeyboardMarkup",
            E::InlineKeyboardButton => "InlineKeyboardButton",
            E::WebhookInfo => "WebhookInfo",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            K::Identifier => f.write_str("integer identifier"),
            K::Integer => f.write_str("integer"),
            K::Count => f.write_str("non-negative integer"),
            K::Float => f.write_str("number"),
            K::Bool => f.write_str("boolean"),
            K::True => f.write_str("`true`"),
            K::String => f.write_str("string"),
            K::Enum(names) => write!(f, "one of {}", names.join("|")),
            K::Entity(entity) => write!(f, "object {entity}"),
            K::ListOf(inner) => write!(f, "array of {inner}"),
            K::Object => f.write_str("object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgwire_types::UpdateKind;

    fn variant_names(kind: EntityKind) -> Vec<&'static str> {
        kind.schema().variants.iter().map(|spec| spec.name).collect()
    }

    #[test]
    fn test_variant_order_matches_typed_containers() {
        assert_eq!(variant_names(E::Update), UpdateKind::FIELDS);
        assert_eq!(variant_names(E::Message), MessageKind::FIELDS);
    }

    #[test]
    fn test_every_schema_is_registered_under_its_own_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.schema().entity, *kind);
        }
    }

    #[test]
    fn test_only_update_and_message_are_containers() {
        let containers: Vec<_> = EntityKind::ALL
            .iter()
            .filter(|kind| kind.schema().is_container())
            .collect();
        assert_eq!(containers, [&E::Update, &E::Message]);
    }

    #[test]
    fn test_companions_are_variants() {
        let schema = E::Message.schema();
        for (first, second) in schema.companions {
            assert!(schema.variants.iter().any(|s| s.name == *first));
            assert!(schema.variants.iter().any(|s| s.name == *second));
        }
    }

    #[test]
    fn test_detail_record_knows_summary_fields() {
        let schema = E::ChatFullInfo.schema();
        assert!(schema.knows("type"));
        assert!(schema.knows("bio"));
        assert!(!E::Chat.schema().knows("bio"));
    }

    #[test]
    fn test_field_kind_display() {
        assert_eq!(ENTITY_LIST.to_string(), "array of object MessageEntity");
        assert_eq!(
            K::Enum(ChatType::NAMES).to_string(),
            "one of private|group|supergroup|channel"
        );
    }
}
