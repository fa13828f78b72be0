//! Generation settings controlling the pipeline prompts.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Inclusive bounds for an explicit slide count.
pub const MIN_SLIDE_COUNT: u8 = 1;
pub const MAX_SLIDE_COUNT: u8 = 50;

/// Desired number of slides: automatic (the model picks 5-8) or an exact
/// count in [1, 50].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideCount {
    Auto,
    Exact(u8),
}

impl SlideCount {
    /// Build an exact count, rejecting values outside [1, 50].
    pub fn exact(count: u8) -> Option<Self> {
        if (MIN_SLIDE_COUNT..=MAX_SLIDE_COUNT).contains(&count) {
            Some(Self::Exact(count))
        } else {
            None
        }
    }
}

impl Default for SlideCount {
    fn default() -> Self {
        Self::Auto
    }
}

// Wire format follows the persisted settings object: the string "auto" or a
// bare number.
impl Serialize for SlideCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::Exact(count) => serializer.serialize_u8(*count),
        }
    }
}

impl<'de> Deserialize<'de> for SlideCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(count) => SlideCount::exact(count)
                .ok_or_else(|| D::Error::custom(format!("slide count {count} out of range"))),
            Raw::Text(text) if text == "auto" => Ok(SlideCount::Auto),
            Raw::Text(text) => Err(D::Error::custom(format!("invalid slide count {text:?}"))),
        }
    }
}

/// Overall register the deck is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationStyle {
    Professional,
    Educational,
    Creative,
    Technical,
    Business,
}

impl fmt::Display for PresentationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Professional => "professional",
            Self::Educational => "educational",
            Self::Creative => "creative",
            Self::Technical => "technical",
            Self::Business => "business",
        };
        write!(f, "{text}")
    }
}

/// How much content each slide should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Concise,
    Balanced,
    Detailed,
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Concise => "concise",
            Self::Balanced => "balanced",
            Self::Detailed => "detailed",
        };
        write!(f, "{text}")
    }
}

/// Settings governing a generation run. Immutable while a pipeline call is
/// in flight; mutated only between stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub slide_count: SlideCount,
    pub generate_speaker_notes: bool,
    pub include_conclusion: bool,
    pub include_title_slide: bool,
    pub presentation_style: PresentationStyle,
    pub detail_level: DetailLevel,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            slide_count: SlideCount::Auto,
            generate_speaker_notes: true,
            include_conclusion: true,
            include_title_slide: true,
            presentation_style: PresentationStyle::Professional,
            detail_level: DetailLevel::Balanced,
        }
    }
}

impl GenerationSettings {
    /// Set an exact slide count. Returns false and keeps the previous value
    /// when `count` is outside [1, 50].
    pub fn set_slide_count(&mut self, count: u8) -> bool {
        match SlideCount::exact(count) {
            Some(valid) => {
                self.slide_count = valid;
                true
            }
            None => false,
        }
    }
}
