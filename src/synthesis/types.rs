//! Voice and audio encoding configuration.

use serde::{Deserialize, Serialize};

/// Audio encodings the synthesis provider can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    #[serde(rename = "LINEAR16")]
    Linear16,
    OggOpus,
    Mulaw,
    Alaw,
}

impl AudioEncoding {
    /// Name used in the provider's `audioConfig.audioEncoding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Linear16 => "LINEAR16",
            Self::OggOpus => "OGG_OPUS",
            Self::Mulaw => "MULAW",
            Self::Alaw => "ALAW",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Linear16 | Self::Mulaw | Self::Alaw => "audio/wav",
            Self::OggOpus => "audio/ogg",
        }
    }

    /// File extension for cached entries and display names.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Linear16 | Self::Mulaw | Self::Alaw => "wav",
            Self::OggOpus => "ogg",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
    Neutral,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

/// Fixed voice selection sent with every synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSpec {
    pub language_code: String,
    pub gender: VoiceGender,
    /// Specific provider voice name; provider picks one when absent.
    pub name: Option<String>,
}

impl Default for VoiceSpec {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            gender: VoiceGender::Female,
            name: None,
        }
    }
}

/// One synthesis call: markup plus the fixed voice/encoding configuration.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub ssml: &'a str,
    pub voice: &'a VoiceSpec,
    pub encoding: AudioEncoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_wire_names() {
        assert_eq!(serde_json::to_string(&AudioEncoding::Mp3).unwrap(), "\"MP3\"");
        assert_eq!(
            serde_json::from_str::<AudioEncoding>("\"LINEAR16\"").unwrap(),
            AudioEncoding::Linear16
        );
        assert_eq!(
            serde_json::from_str::<AudioEncoding>("\"OGG_OPUS\"").unwrap(),
            AudioEncoding::OggOpus
        );
        assert_eq!(AudioEncoding::OggOpus.as_str(), "OGG_OPUS");
        assert_eq!(AudioEncoding::Mp3.mime_type(), "audio/mpeg");
    }

    #[test]
    fn test_default_voice() {
        let voice = VoiceSpec::default();
        assert_eq!(voice.language_code, "en-US");
        assert_eq!(voice.gender.as_str(), "FEMALE");
    }
}
