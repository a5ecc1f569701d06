use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::types::{ChatError, ChatResult};

/// Declared kind of an uploaded media attachment.
///
/// Matching is exact: `"Image"` is not `"image"`. Unknown kinds are kept
/// verbatim so the dispatcher can reject them precisely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Other(String),
}

impl MediaKind {
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for MediaKind {
    fn from(s: &str) -> Self {
        match s {
            "image" => MediaKind::Image,
            "audio" => MediaKind::Audio,
            "video" => MediaKind::Video,
            _ => MediaKind::Other(s.to_string()),
        }
    }
}

impl From<String> for MediaKind {
    fn from(s: String) -> Self {
        MediaKind::from(s.as_str())
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an uploaded media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, kind: impl Into<MediaKind>) -> Self {
        Self {
            url: url.into(),
            kind: kind.into(),
        }
    }
}

/// The unit exchanged between participants: text, media, or both.
///
/// Blank text and blank media urls count as absent. A value built through
/// [`MessageContent::new`] always carries at least one payload; deserialised
/// values are checked by whoever consumes them.
///
/// On the wire this is the mobile client's shape, `{message, mediaUrl: {url, type}}`,
/// with both keys always present and empty strings standing in for absent parts.
/// `text` and `media` are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(
        default,
        rename = "message",
        alias = "text",
        serialize_with = "text_or_empty"
    )]
    text: Option<String>,
    #[serde(
        default,
        rename = "mediaUrl",
        alias = "media",
        serialize_with = "media_or_empty"
    )]
    media: Option<MediaRef>,
}

fn text_or_empty<S: Serializer>(text: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(text.as_deref().unwrap_or_default())
}

fn media_or_empty<S: Serializer>(
    media: &Option<MediaRef>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match media {
        Some(media) => media.serialize(serializer),
        None => MediaRef::new("", MediaKind::Other(String::new())).serialize(serializer),
    }
}

impl MessageContent {
    pub fn new(text: Option<String>, media: Option<MediaRef>) -> ChatResult<Self> {
        let content = Self { text, media };
        content.validate()?;
        Ok(content)
    }

    pub fn from_text(text: impl Into<String>) -> ChatResult<Self> {
        Self::new(Some(text.into()), None)
    }

    pub fn from_media(url: impl Into<String>, kind: impl Into<MediaKind>) -> ChatResult<Self> {
        Self::new(None, Some(MediaRef::new(url, kind)))
    }

    /// Text payload, if non-blank
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }

    /// Media payload, if its url is non-blank
    pub fn media(&self) -> Option<&MediaRef> {
        self.media
            .as_ref()
            .filter(|media| !media.url.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.media().is_none()
    }

    pub fn validate(&self) -> ChatResult<()> {
        if self.is_empty() {
            return Err(ChatError::EmptyContent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(
            MessageContent::new(Some("   ".to_string()), Some(MediaRef::new("", "image"))),
            Err(ChatError::EmptyContent)
        );
        assert!(MessageContent::default().is_empty());
    }

    #[test]
    fn media_kind_keeps_unknown_values() {
        assert_eq!(MediaKind::from("image"), MediaKind::Image);
        assert_eq!(MediaKind::from("pdf"), MediaKind::Other("pdf".to_string()));
        assert_eq!(MediaKind::from("pdf").as_str(), "pdf");
    }

    #[test]
    fn media_kind_is_case_sensitive() {
        assert_eq!(MediaKind::from("Image"), MediaKind::Other("Image".to_string()));
        assert_eq!(MediaKind::from("AUDIO").as_str(), "AUDIO");
    }

    #[test]
    fn accepts_mobile_client_field_names() {
        let content: MessageContent = serde_json::from_value(serde_json::json!({
            "message": "",
            "mediaUrl": { "url": "https://cdn.test/clip.mp4", "type": "video" }
        }))
        .unwrap();

        assert!(content.text().is_none());
        assert_eq!(content.media().map(|m| &m.kind), Some(&MediaKind::Video));
        assert!(content.validate().is_ok());
    }

    #[test]
    fn serializes_in_mobile_client_shape() {
        let content = MessageContent::from_media("https://cdn.test/a.mp3", "audio").unwrap();
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "message": "",
                "mediaUrl": { "url": "https://cdn.test/a.mp3", "type": "audio" }
            })
        );

        let content = MessageContent::from_text("hi").unwrap();
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "message": "hi", "mediaUrl": { "url": "", "type": "" } })
        );
    }

    #[test]
    fn serialized_content_reads_back() {
        let content = MessageContent::from_text("hi").unwrap();
        let value = serde_json::to_value(&content).unwrap();
        let back: MessageContent = serde_json::from_value(value).unwrap();
        assert_eq!(back.text(), Some("hi"));
        assert!(back.media().is_none());
    }
}
