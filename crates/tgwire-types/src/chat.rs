//! Chats
//!
//! Updates only ever carry the summary fields of a chat ([`Chat`]). The
//! detail fields that upstream returns from `getChat` live on
//! [`ChatFullInfo`], so code handling an update cannot read them by mistake.

use crate::{Identifier, Message, RawObject};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    /// Wire names in declaration order
    pub const NAMES: &'static [&'static str] = &["private", "group", "supergroup", "channel"];

    pub fn as_str(self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
            ChatType::Supergroup => "supergroup",
            ChatType::Channel => "channel",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat as it appears inside messages and updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Identifier,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    /// Supergroups, channels and group chats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// True if the supergroup chat is a forum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_forum: Option<bool>,
}

impl Chat {
    pub fn new(id: impl Into<Identifier>, chat_type: ChatType) -> Self {
        Self {
            id: id.into(),
            chat_type,
            title: None,
            username: None,
            first_name: None,
            last_name: None,
            is_forum: None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.chat_type == ChatType::Private
    }

    /// Title for groups and channels, otherwise the other party's name
    pub fn display_name(&self) -> Option<String> {
        if let Some(title) = &self.title {
            return Some(title.clone());
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => self.username.clone(),
        }
    }
}

/// Chat photo file handles, small (160x160) and big (640x640)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPhoto {
    pub small_file_id: crate::FileId,
    pub small_file_unique_id: crate::FileUniqueId,
    pub big_file_id: crate::FileId,
    pub big_file_unique_id: crate::FileUniqueId,
}

/// Full chat information as returned by `getChat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFullInfo {
    #[serde(flatten)]
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<ChatPhoto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_usernames: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji_status_custom_emoji_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_private_forwards: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_restricted_voice_and_video_messages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_to_send_messages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_by_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_message: Option<Box<Message>>,
    /// Default member permissions, kept as received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<RawObject>,
    /// Minimum delay between consecutive messages, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_mode_delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_auto_delete_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_aggressive_anti_spam_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_hidden_members: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_protected_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker_set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_set_sticker_set: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_chat_id: Option<Identifier>,
    /// Location a supergroup is connected to, kept as received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawObject>,
}

impl ChatFullInfo {
    /// Detail record with nothing but the summary fields
    pub fn from_summary(chat: Chat) -> Self {
        Self {
            chat,
            photo: None,
            active_usernames: None,
            emoji_status_custom_emoji_id: None,
            bio: None,
            has_private_forwards: None,
            has_restricted_voice_and_video_messages: None,
            join_to_send_messages: None,
            join_by_request: None,
            description: None,
            invite_link: None,
            pinned_message: None,
            permissions: None,
            slow_mode_delay: None,
            message_auto_delete_time: None,
            has_aggressive_anti_spam_enabled: None,
            has_hidden_members: None,
            has_protected_content: None,
            sticker_set_name: None,
            can_set_sticker_set: None,
            linked_chat_id: None,
            location: None,
        }
    }

    /// The summary view of this chat
    pub fn summary(&self) -> &Chat {
        &self.chat
    }
}
