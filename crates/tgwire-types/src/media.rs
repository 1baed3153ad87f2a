//! Media descriptors and other leaf attachments
//!
//! Every file-backed record carries two handles. [`FileId`] is the
//! session-scoped handle used to download or resend a file; it can differ
//! between bots and over time. [`FileUniqueId`] identifies the same file
//! across bots and sessions but cannot be used to fetch it. The two are
//! separate types so one is never passed where the other is expected.

use crate::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Retrieval handle for a file, valid for the current bot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

/// Stable identity of a file; not usable for downloads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileUniqueId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FileUniqueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FileUniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One size of a photo or a file/sticker thumbnail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

/// Audio file to be treated as music
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    /// Duration in seconds as defined by the sender
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
    /// Album cover thumbnail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
}

/// General file (as opposed to photos, voice messages and audio files)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    pub width: u32,
    pub height: u32,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

/// GIF or H.264/MPEG-4 AVC video without sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    pub width: u32,
    pub height: u32,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

/// Round video message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoNote {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    /// Width and height (diameter of the circle)
    pub length: u32,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: FileId,
    pub file_unique_id: FileUniqueId,
    /// "regular", "mask" or "custom_emoji"
    #[serde(rename = "type")]
    pub sticker_type: String,
    pub width: u32,
    pub height: u32,
    pub is_animated: bool,
    pub is_video: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Identifier>,
}

/// Phone contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcard: Option<String>,
}

/// Animated emoji that displays a random value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub emoji: String,
    pub value: u32,
}

/// Point on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    /// Radius of uncertainty in meters, 0-1500
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_accuracy: Option<f64>,
    /// Seconds the location can be updated for; live locations only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity_alert_radius: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub location: Location,
    pub title: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foursquare_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foursquare_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_type: Option<String>,
}

/// The `document` upstream sends alongside every `animation`
impl From<&Animation> for Document {
    fn from(animation: &Animation) -> Self {
        Self {
            file_id: animation.file_id.clone(),
            file_unique_id: animation.file_unique_id.clone(),
            thumb: animation.thumb.clone(),
            file_name: animation.file_name.clone(),
            mime_type: animation.mime_type.clone(),
            file_size: animation.file_size,
        }
    }
}

impl PhotoSize {
    /// Pixel area, used to pick the largest size from a photo array
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_omits_absent_fields() {
        let doc = Document {
            file_id: FileId::new("BQACAgIAAxk"),
            file_unique_id: FileUniqueId::new("AgADxQ"),
            thumb: None,
            file_name: Some("report.pdf".into()),
            mime_type: None,
            file_size: Some(Identifier::new(4_503_599_627_370_496)),
        };
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "file_id": "BQACAgIAAxk",
                "file_unique_id": "AgADxQ",
                "file_name": "report.pdf",
                "file_size": 4_503_599_627_370_496_i64
            })
        );
    }

    #[test]
    fn test_sticker_type_keeps_wire_name() {
        let sticker: Sticker = serde_json::from_value(json!({
            "file_id": "CAACAgIAAxk",
            "file_unique_id": "AgADmw",
            "type": "regular",
            "width": 512,
            "height": 512,
            "is_animated": false,
            "is_video": false,
            "emoji": "😀"
        }))
        .unwrap();
        assert_eq!(sticker.sticker_type, "regular");
        assert_eq!(serde_json::to_value(&sticker).unwrap()["type"], "regular");
    }

    #[test]
    fn test_animation_document_shares_file_handles() {
        let animation = Animation {
            file_id: FileId::new("CgACAgQAAxk"),
            file_unique_id: FileUniqueId::new("AgADJw"),
            width: 320,
            height: 240,
            duration: 2,
            thumb: None,
            file_name: Some("party.mp4".into()),
            mime_type: Some("video/mp4".into()),
            file_size: Some(Identifier::new(81_234)),
        };
        let doc = Document::from(&animation);
        assert_eq!(doc.file_id, animation.file_id);
        assert_eq!(doc.file_unique_id, animation.file_unique_id);
        assert_eq!(doc.file_name.as_deref(), Some("party.mp4"));
        assert_eq!(doc.file_size, Some(Identifier::new(81_234)));
    }

    #[test]
    fn test_photo_area() {
        let photo = PhotoSize {
            file_id: FileId::new("a"),
            file_unique_id: FileUniqueId::new("b"),
            width: 1280,
            height: 720,
            file_size: None,
        };
        assert_eq!(photo.area(), 921_600);
    }
}
