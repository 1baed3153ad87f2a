//! Inline keyboards attached to messages

use serde::{Deserialize, Serialize};

/// Inline keyboard that appears next to the message it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One button of an inline keyboard.
///
/// Exactly one of the optional fields should be set; buttons built with the
/// constructors below always satisfy that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 1-64 bytes sent back in a callback query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay: Option<bool>,
}

impl InlineKeyboardButton {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: None,
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
            pay: None,
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(text)
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Self::bare(text)
        }
    }

    pub fn switch_inline_query(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            switch_inline_query: Some(query.into()),
            ..Self::bare(text)
        }
    }
}

impl InlineKeyboardMarkup {
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }

    /// Append a row of buttons
    #[must_use]
    pub fn append_row(mut self, row: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(row);
        self
    }

    /// One button per row
    pub fn single_column(buttons: impl IntoIterator<Item = InlineKeyboardButton>) -> Self {
        Self::new(buttons.into_iter().map(|b| vec![b]).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_callback_button_encoding() {
        let markup = InlineKeyboardMarkup::default().append_row(vec![
            InlineKeyboardButton::callback("Yes", "answer:yes"),
            InlineKeyboardButton::url("Docs", "https://core.telegram.org/bots/api"),
        ]);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "inline_keyboard": [[
                    { "text": "Yes", "callback_data": "answer:yes" },
                    { "text": "Docs", "url": "https://core.telegram.org/bots/api" }
                ]]
            })
        );
    }

    #[test]
    fn test_single_column() {
        let markup = InlineKeyboardMarkup::single_column([
            InlineKeyboardButton::callback("a", "1"),
            InlineKeyboardButton::callback("b", "2"),
        ]);
        assert_eq!(markup.inline_keyboard.len(), 2);
    }
}
