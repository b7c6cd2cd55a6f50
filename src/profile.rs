//! # Beer Profile Module
//!
//! The record produced for every captured label, plus the small controlled
//! vocabularies it is built from. Serialized field names and enum values match
//! the JSON documents kept in the history and favorites lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse style bucket grouping related beer styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleFamily {
    #[serde(rename = "Crisp & clean")]
    CrispClean,
    #[serde(rename = "Hoppy & bitter")]
    HoppyBitter,
    #[serde(rename = "Malty & sweet")]
    MaltySweet,
    #[serde(rename = "Dark & roasted")]
    DarkRoasted,
    #[serde(rename = "Sour & funky")]
    SourFunky,
}

impl StyleFamily {
    pub const ALL: [StyleFamily; 5] = [
        StyleFamily::CrispClean,
        StyleFamily::HoppyBitter,
        StyleFamily::MaltySweet,
        StyleFamily::DarkRoasted,
        StyleFamily::SourFunky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleFamily::CrispClean => "Crisp & clean",
            StyleFamily::HoppyBitter => "Hoppy & bitter",
            StyleFamily::MaltySweet => "Malty & sweet",
            StyleFamily::DarkRoasted => "Dark & roasted",
            StyleFamily::SourFunky => "Sour & funky",
        }
    }

    /// Case-insensitive lookup by display label
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().to_lowercase() == wanted)
    }
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ABV-derived banding used for quick comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrengthCategory {
    #[serde(rename = "Session (<4.5%)")]
    Session,
    #[serde(rename = "Regular (4.5–6%)")]
    Regular,
    #[serde(rename = "Strong (6–8%)")]
    Strong,
    #[serde(rename = "Heavy hitter (>8%)")]
    HeavyHitter,
}

impl StrengthCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthCategory::Session => "Session (<4.5%)",
            StrengthCategory::Regular => "Regular (4.5–6%)",
            StrengthCategory::Strong => "Strong (6–8%)",
            StrengthCategory::HeavyHitter => "Heavy hitter (>8%)",
        }
    }

    /// Band an ABV percentage.
    ///
    /// The checks run in a fixed order: below 4.5 is Session, above 8 is a
    /// heavy hitter, above 6 is Strong, anything else is Regular. So 6.0 is
    /// Regular and 8.0 is Strong.
    pub fn from_abv(abv: f64) -> Self {
        if abv < 4.5 {
            StrengthCategory::Session
        } else if abv > 8.0 {
            StrengthCategory::HeavyHitter
        } else if abv > 6.0 {
            StrengthCategory::Strong
        } else {
            StrengthCategory::Regular
        }
    }
}

impl fmt::Display for StrengthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Drinkability {
    #[serde(rename = "Easy-drinking")]
    Easy,
    #[serde(rename = "Balanced")]
    Balanced,
    #[serde(rename = "Sip-slowly")]
    SipSlowly,
}

impl Drinkability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Drinkability::Easy => "Easy-drinking",
            Drinkability::Balanced => "Balanced",
            Drinkability::SipSlowly => "Sip-slowly",
        }
    }
}

impl fmt::Display for Drinkability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual clarity of the pour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazeLevel {
    Clear,
    #[serde(rename = "Slightly hazy")]
    SlightlyHazy,
    Hazy,
    Opaque,
}

impl HazeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazeLevel::Clear => "Clear",
            HazeLevel::SlightlyHazy => "Slightly hazy",
            HazeLevel::Hazy => "Hazy",
            HazeLevel::Opaque => "Opaque",
        }
    }

    /// Anything past slightly hazy counts as a hazy pour
    pub fn is_hazy(&self) -> bool {
        matches!(self, HazeLevel::Hazy | HazeLevel::Opaque)
    }
}

impl fmt::Display for HazeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Four taste sliders, each nominally in 0..=10
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub bitterness: f64,
    pub sweetness: f64,
    pub body: f64,
    pub carbonation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub why: String,
}

/// Structured description of one captured beer.
///
/// Produced once per image and never changed afterwards, except for the two
/// image payloads which the caller attaches after inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeerProfile {
    pub id: String,
    pub name: String,
    pub brewery: String,
    pub country: String,
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substyle: Option<String>,
    pub style_family: StyleFamily,
    pub abv: f64,
    pub strength_category: StrengthCategory,
    pub drinkability: Drinkability,
    pub haze: HazeLevel,
    pub taste: TasteProfile,
    pub flavour_notes: Vec<String>,
    pub verdict: String,
    pub you_will_like_if: Vec<String>,
    pub avoid_if: Vec<String>,
    #[serde(default)]
    pub food_pairing: Vec<String>,
    pub confidence: Confidence,
    /// Milliseconds since the Unix epoch
    pub captured_at: i64,
    /// Full-size data URL, kept in memory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Small data URL, safe to persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_data: Option<String>,
}

impl BeerProfile {
    /// Attach caller-produced image payloads
    pub fn with_images(mut self, image_data: Option<String>, thumbnail_data: Option<String>) -> Self {
        self.image_data = image_data;
        self.thumbnail_data = thumbnail_data;
        self
    }

    /// Copy suitable for size-limited storage: the full-size image is dropped
    pub fn stripped_for_storage(&self) -> Self {
        let mut stored = self.clone();
        stored.image_data = None;
        stored
    }
}
