//! Capability table of the conversion services.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::entities::MediaKind;

/// Conversion services a client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceName {
    #[serde(rename = "textTranslate")]
    TextTranslate,
    #[serde(rename = "textToIsl")]
    TextToIsl,
    #[serde(rename = "textToSpeech")]
    TextToSpeech,
    #[serde(rename = "imgToIsl")]
    ImgToIsl,
    #[serde(rename = "speechToText")]
    SpeechToText,
    #[serde(rename = "speechToIsl")]
    SpeechToIsl,
    #[serde(rename = "IslVideoToText")]
    IslVideoToText,
    #[serde(rename = "IslVideoToVoice")]
    IslVideoToVoice,
}

impl ServiceName {
    pub const ALL: [ServiceName; 8] = [
        ServiceName::TextTranslate,
        ServiceName::TextToIsl,
        ServiceName::TextToSpeech,
        ServiceName::ImgToIsl,
        ServiceName::SpeechToText,
        ServiceName::SpeechToIsl,
        ServiceName::IslVideoToText,
        ServiceName::IslVideoToVoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::TextTranslate => "textTranslate",
            ServiceName::TextToIsl => "textToIsl",
            ServiceName::TextToSpeech => "textToSpeech",
            ServiceName::ImgToIsl => "imgToIsl",
            ServiceName::SpeechToText => "speechToText",
            ServiceName::SpeechToIsl => "speechToIsl",
            ServiceName::IslVideoToText => "IslVideoToText",
            ServiceName::IslVideoToVoice => "IslVideoToVoice",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownService(pub String);

impl FromStr for ServiceName {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceName::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

/// Kind of payload a request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Image,
    Audio,
    Video,
}

impl InputKind {
    pub const ALL: [InputKind; 4] = [
        InputKind::Text,
        InputKind::Image,
        InputKind::Audio,
        InputKind::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Image => "image",
            InputKind::Audio => "audio",
            InputKind::Video => "video",
        }
    }

    /// Input kind of a media attachment; `None` for kinds outside image/audio/video
    pub fn from_media(kind: &MediaKind) -> Option<Self> {
        match kind {
            MediaKind::Image => Some(InputKind::Image),
            MediaKind::Audio => Some(InputKind::Audio),
            MediaKind::Video => Some(InputKind::Video),
            MediaKind::Other(_) => None,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Kind of the payload a service produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Text,
    Video,
    Audio,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Text => "text",
            ResultKind::Video => "video",
            ResultKind::Audio => "audio",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Routine chain behind an available service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// translate
    Translate,
    /// translate as a stand-in for sign-language generation
    TextToIsl,
    /// image-to-text, then the text-to-ISL stand-in
    ImageToIsl,
    /// speech-to-text
    SpeechToText,
}

impl Pipeline {
    pub fn result_kind(&self) -> ResultKind {
        match self {
            Pipeline::Translate | Pipeline::ImageToIsl | Pipeline::SpeechToText => ResultKind::Text,
            Pipeline::TextToIsl => ResultKind::Video,
        }
    }
}

/// Outcome of requesting a service for an input kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Invoke(Pipeline),
    /// Recognised, but no backing routine exists yet
    Unimplemented(ResultKind),
    Unsupported,
}

impl Capability {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Capability::Unsupported)
    }

    pub fn result_kind(&self) -> Option<ResultKind> {
        match self {
            Capability::Invoke(pipeline) => Some(pipeline.result_kind()),
            Capability::Unimplemented(kind) => Some(*kind),
            Capability::Unsupported => None,
        }
    }
}

/// What `service` does with an `input` payload.
pub fn capability(input: InputKind, service: ServiceName) -> Capability {
    use InputKind as In;
    use ServiceName as S;

    match (input, service) {
        (In::Text, S::TextTranslate) => Capability::Invoke(Pipeline::Translate),
        (In::Text, S::TextToIsl) => Capability::Invoke(Pipeline::TextToIsl),
        (In::Text, S::TextToSpeech) => Capability::Unimplemented(ResultKind::Audio),
        (In::Text, S::ImgToIsl | S::SpeechToText | S::SpeechToIsl) => Capability::Unsupported,
        (In::Text, S::IslVideoToText | S::IslVideoToVoice) => Capability::Unsupported,

        (In::Image, S::ImgToIsl) => Capability::Invoke(Pipeline::ImageToIsl),
        (In::Image, _) => Capability::Unsupported,

        (In::Audio, S::SpeechToText) => Capability::Invoke(Pipeline::SpeechToText),
        (In::Audio, S::SpeechToIsl) => Capability::Unimplemented(ResultKind::Video),
        (In::Audio, _) => Capability::Unsupported,

        (In::Video, S::IslVideoToText) => Capability::Unimplemented(ResultKind::Text),
        (In::Video, S::IslVideoToVoice) => Capability::Unimplemented(ResultKind::Audio),
        (In::Video, _) => Capability::Unsupported,
    }
}

/// One row of the catalog as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub input: InputKind,
    pub service: ServiceName,
    pub result_kind: ResultKind,
    pub available: bool,
}

/// The full `(InputKind, ServiceName)` table, computed once.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    table: HashMap<(InputKind, ServiceName), Capability>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        let table = InputKind::ALL
            .into_iter()
            .flat_map(|input| {
                ServiceName::ALL
                    .into_iter()
                    .map(move |service| ((input, service), capability(input, service)))
            })
            .collect();
        Self { table }
    }

    pub fn lookup(&self, input: InputKind, service: ServiceName) -> Capability {
        self.table
            .get(&(input, service))
            .copied()
            .unwrap_or(Capability::Unsupported)
    }

    /// Services accepted for `input`, in declaration order
    pub fn services_for(&self, input: InputKind) -> Vec<ServiceName> {
        ServiceName::ALL
            .into_iter()
            .filter(|service| self.lookup(input, *service).is_supported())
            .collect()
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        InputKind::ALL
            .into_iter()
            .flat_map(|input| {
                ServiceName::ALL.into_iter().filter_map(move |service| {
                    let capability = self.lookup(input, service);
                    capability.result_kind().map(|result_kind| CatalogEntry {
                        input,
                        service,
                        result_kind,
                        available: matches!(capability, Capability::Invoke(_)),
                    })
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
