use crate::{Chat, Identifier, Message, RawObject, User};
use serde::{Deserialize, Serialize};

variant_container! {
    /// What an update is about. Upstream sets at most one of these fields.
    pub enum UpdateKind {
        /// New incoming message of any kind
        Message(Message) = "message",
        EditedMessage(Message) = "edited_message",
        ChannelPost(Message) = "channel_post",
        EditedChannelPost(Message) = "edited_channel_post",
        InlineQuery(RawObject) = "inline_query",
        ChosenInlineResult(RawObject) = "chosen_inline_result",
        CallbackQuery(CallbackQuery) = "callback_query",
        ShippingQuery(RawObject) = "shipping_query",
        PreCheckoutQuery(RawObject) = "pre_checkout_query",
        Poll(RawObject) = "poll",
        PollAnswer(RawObject) = "poll_answer",
        MyChatMember(RawObject) = "my_chat_member",
        ChatMember(RawObject) = "chat_member",
        ChatJoinRequest(RawObject) = "chat_join_request",
    }
}

/// An incoming update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Increases sequentially, but jumps to a random value after a week
    /// without updates
    pub update_id: Identifier,
    #[serde(flatten)]
    pub kind: UpdateKind,
}

/// Incoming callback query from an inline keyboard button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Message with the button; absent if it is too old
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    pub chat_instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_short_name: Option<String>,
}

impl Update {
    pub fn new(update_id: impl Into<Identifier>, kind: UpdateKind) -> Self {
        Self {
            update_id: update_id.into(),
            kind,
        }
    }

    /// Wire field of the populated variant, `None` if unrecognised
    pub fn kind_name(&self) -> Option<&'static str> {
        self.kind.field_name()
    }

    /// The message carried by a message-like update, or by a callback query
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => Some(m),
            UpdateKind::CallbackQuery(q) => q.message.as_deref(),
            _ => None,
        }
    }

    pub fn chat(&self) -> Option<&Chat> {
        self.message().map(|m| &m.chat)
    }

    /// User who caused the update, when known
    pub fn sender(&self) -> Option<&User> {
        match &self.kind {
            UpdateKind::CallbackQuery(q) => Some(&q.from),
            _ => self.message().and_then(|m| m.from.as_ref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_update() {
        let update: Update = serde_json::from_value(json!({ "update_id": 5 })).unwrap();
        assert_eq!(update.update_id, Identifier::new(5));
        assert!(update.kind.is_unknown());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "update_id": 5 }));
    }

    #[test]
    fn test_callback_query() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 9,
            "callback_query": {
                "id": "4382",
                "from": { "id": 77, "is_bot": false, "first_name": "Ada" },
                "chat_instance": "-1234",
                "data": "answer:yes"
            }
        }))
        .unwrap();
        assert_eq!(update.kind_name(), Some("callback_query"));
        assert_eq!(update.sender().unwrap().first_name, "Ada");
        assert!(update.message().is_none());
    }

    #[test]
    fn test_raw_variant_round_trip() {
        let raw = json!({
            "update_id": 11,
            "poll_answer": { "poll_id": "p1", "option_ids": [0, 2] }
        });
        let update: Update = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(update.kind_name(), Some("poll_answer"));
        assert_eq!(serde_json::to_value(&update).unwrap(), raw);
    }

    #[test]
    fn test_null_variant_is_absent() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 12,
            "message": null,
            "poll": { "id": "p" }
        }))
        .unwrap();
        assert_eq!(update.kind_name(), Some("poll"));
    }
}
