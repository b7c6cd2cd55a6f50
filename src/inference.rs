//! # Text Profile Inference Module
//!
//! Offline fallback that turns OCR text from a label or menu into a complete
//! [`BeerProfile`] using keyword rules only.
//!
//! ## Algorithm
//!
//! 1. Lines longer than three characters become name and brewery candidates
//! 2. The first `<digits>[.<digits>]%` in the text is the ABV (default 5.0)
//! 3. [`STYLE_TABLE`] is scanned in declared order; the first trigger contained
//!    in the lowercased text overrides fields of [`BASELINE_STYLE`]
//! 4. Strength band, drinkability, verdict and reason lists are derived from
//!    the ABV and the resolved style
//!
//! The inferencer is total: every input, including the empty string, yields a
//! fully populated record. Identifier and timestamp come from injectable
//! [`IdSource`] and [`Clock`] implementations so tests can pin them.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::profile::{
    BeerProfile, Confidence, ConfidenceLevel, Drinkability, HazeLevel, StrengthCategory,
    StyleFamily, TasteProfile,
};

pub const UNKNOWN_BEER: &str = "Unknown Beer";
pub const UNKNOWN_BREWERY: &str = "Unknown Brewery";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const DEFAULT_ABV: f64 = 5.0;
/// Above this ABV the beer is sipped rather than drunk
pub const SIP_SLOWLY_ABV: f64 = 7.0;
pub const FOOD_PAIRING: [&str; 2] = ["Bar snacks", "Grilled meats"];
pub const LOW_CONFIDENCE_REASON: &str = "Inferred from keywords in OCR text.";

lazy_static! {
    // ASCII digits only; OCR output may contain other numeral scripts
    static ref ABV_REGEX: Regex =
        Regex::new(r"([0-9]+(?:\.[0-9]+)?)%").expect("ABV pattern is valid");
}

/// Source of fresh profile identifiers
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Source of capture timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Style attributes after a descriptor has been merged onto the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub style: &'static str,
    pub family: StyleFamily,
    pub taste: TasteProfile,
    pub notes: &'static [&'static str],
    pub haze: HazeLevel,
}

/// Attributes used when no trigger matches
pub const BASELINE_STYLE: ResolvedStyle = ResolvedStyle {
    style: "Lager",
    family: StyleFamily::CrispClean,
    taste: TasteProfile {
        bitterness: 3.0,
        sweetness: 3.0,
        body: 4.0,
        carbonation: 6.0,
    },
    notes: &["malty", "refreshing"],
    haze: HazeLevel::Clear,
};

/// One keyword rule. `None` fields keep the baseline value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDescriptor {
    /// Lowercase substring looked up in the lowercased text
    pub trigger: &'static str,
    pub style: &'static str,
    pub family: StyleFamily,
    pub bitterness: Option<f64>,
    pub sweetness: Option<f64>,
    pub body: Option<f64>,
    pub carbonation: Option<f64>,
    pub notes: Option<&'static [&'static str]>,
    pub haze: Option<HazeLevel>,
}

impl StyleDescriptor {
    pub fn apply(&self, base: &ResolvedStyle) -> ResolvedStyle {
        ResolvedStyle {
            style: self.style,
            family: self.family,
            taste: TasteProfile {
                bitterness: self.bitterness.unwrap_or(base.taste.bitterness),
                sweetness: self.sweetness.unwrap_or(base.taste.sweetness),
                body: self.body.unwrap_or(base.taste.body),
                carbonation: self.carbonation.unwrap_or(base.taste.carbonation),
            },
            notes: self.notes.unwrap_or(base.notes),
            haze: self.haze.unwrap_or(base.haze),
        }
    }
}

/// Keyword rules in priority order.
///
/// Order is significant: the scan stops at the first trigger found anywhere in
/// the text, so "ipa" shadows "hazy" and "neipa", and "hazy" shadows "neipa".
/// Any text containing "neipa" also contains "ipa" and resolves to IPA.
pub const STYLE_TABLE: &[StyleDescriptor] = &[
    StyleDescriptor {
        trigger: "ipa",
        style: "IPA",
        family: StyleFamily::HoppyBitter,
        bitterness: Some(7.0),
        sweetness: None,
        body: None,
        carbonation: None,
        notes: Some(&["citrus", "pine"]),
        haze: Some(HazeLevel::Clear),
    },
    StyleDescriptor {
        trigger: "hazy",
        style: "Hazy IPA",
        family: StyleFamily::HoppyBitter,
        bitterness: Some(5.0),
        sweetness: None,
        body: None,
        carbonation: None,
        notes: Some(&["tropical", "stone fruit"]),
        haze: Some(HazeLevel::Hazy),
    },
    StyleDescriptor {
        trigger: "neipa",
        style: "NEIPA",
        family: StyleFamily::HoppyBitter,
        bitterness: Some(4.0),
        sweetness: None,
        body: None,
        carbonation: None,
        notes: Some(&["tropical", "juicy"]),
        haze: Some(HazeLevel::Hazy),
    },
    StyleDescriptor {
        trigger: "stout",
        style: "Stout",
        family: StyleFamily::DarkRoasted,
        bitterness: Some(4.0),
        sweetness: Some(5.0),
        body: Some(8.0),
        carbonation: Some(3.0),
        notes: Some(&["coffee", "chocolate"]),
        haze: Some(HazeLevel::Opaque),
    },
    StyleDescriptor {
        trigger: "porter",
        style: "Porter",
        family: StyleFamily::DarkRoasted,
        bitterness: Some(4.0),
        sweetness: Some(4.0),
        body: Some(7.0),
        carbonation: Some(4.0),
        notes: Some(&["roasted", "caramel"]),
        haze: Some(HazeLevel::Opaque),
    },
    StyleDescriptor {
        trigger: "sour",
        style: "Sour",
        family: StyleFamily::SourFunky,
        bitterness: Some(1.0),
        sweetness: Some(2.0),
        body: Some(3.0),
        carbonation: None,
        notes: Some(&["lemony", "tart"]),
        haze: Some(HazeLevel::SlightlyHazy),
    },
    StyleDescriptor {
        trigger: "pilsner",
        style: "Pilsner",
        family: StyleFamily::CrispClean,
        bitterness: Some(4.0),
        sweetness: None,
        body: None,
        carbonation: None,
        notes: Some(&["crisp", "herbal"]),
        haze: Some(HazeLevel::Clear),
    },
    StyleDescriptor {
        trigger: "wheat",
        style: "Wheat Beer",
        family: StyleFamily::CrispClean,
        bitterness: Some(2.0),
        sweetness: Some(3.0),
        body: Some(5.0),
        carbonation: None,
        notes: Some(&["clove", "banana"]),
        haze: Some(HazeLevel::Hazy),
    },
];

/// Name, brewery and country guessed from the raw text
#[derive(Debug, Clone, PartialEq)]
pub struct LabelIdentity {
    pub name: String,
    pub brewery: String,
    pub country: String,
}

/// First two lines longer than three characters once trimmed.
///
/// Length is counted in Unicode scalar values, so "🍺🍺" is two characters
/// and is skipped even though it is four UTF-16 code units. Country is never
/// read from the text.
pub fn extract_identity(text: &str) -> LabelIdentity {
    let mut candidates = text
        .split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() > 3);

    let name = candidates.next().unwrap_or(UNKNOWN_BEER).to_string();
    let brewery = candidates.next().unwrap_or(UNKNOWN_BREWERY).to_string();

    LabelIdentity {
        name,
        brewery,
        country: UNKNOWN_COUNTRY.to_string(),
    }
}

/// First percentage in the text, if any.
///
/// A digit run too long for `f64` parses to infinity and is ignored, since
/// JSON has no representation for it.
pub fn extract_abv(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    ABV_REGEX
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|abv| abv.is_finite())
}

/// First descriptor, in table order, whose trigger occurs in `lowered`
pub fn match_style(lowered: &str) -> Option<&'static StyleDescriptor> {
    STYLE_TABLE
        .iter()
        .find(|descriptor| lowered.contains(descriptor.trigger))
}

pub fn resolve_style(lowered: &str) -> ResolvedStyle {
    match match_style(lowered) {
        Some(descriptor) => {
            trace!(trigger = descriptor.trigger, "Style trigger matched");
            descriptor.apply(&BASELINE_STYLE)
        }
        None => BASELINE_STYLE,
    }
}

pub fn drinkability_for(abv: f64) -> Drinkability {
    if abv > SIP_SLOWLY_ABV {
        Drinkability::SipSlowly
    } else {
        Drinkability::Balanced
    }
}

/// Join notes for prose: "a", "a and b", "a, b, and c"
pub fn join_notes(notes: &[String]) -> String {
    match notes {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

pub fn compose_verdict(strength: StrengthCategory, style: &str, notes: &[String]) -> String {
    let strength = strength.as_str().to_lowercase();
    if notes.is_empty() {
        return format!("A {} {}.", strength, style);
    }
    format!("A {} {} with {} notes.", strength, style, join_notes(notes))
}

/// Keyword-driven profile builder
pub struct TextProfileInferencer {
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
}

impl Default for TextProfileInferencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProfileInferencer {
    /// Inferencer with random UUIDs and the system clock
    pub fn new() -> Self {
        Self::with_sources(Box::new(UuidSource), Box::new(SystemClock))
    }

    pub fn with_sources(ids: Box<dyn IdSource>, clock: Box<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    /// Build a complete profile from OCR text. Never fails.
    pub fn infer(&self, text: &str) -> BeerProfile {
        let lowered = text.to_lowercase();

        let identity = extract_identity(text);
        let abv = extract_abv(text).unwrap_or(DEFAULT_ABV);
        let resolved = resolve_style(&lowered);
        let strength = StrengthCategory::from_abv(abv);

        let notes: Vec<String> = resolved.notes.iter().map(|n| n.to_string()).collect();
        let verdict = compose_verdict(strength, resolved.style, &notes);

        let avoid = if abv > SIP_SLOWLY_ABV {
            "You want something light and easy"
        } else {
            "You want a complex heavy hitter"
        };

        debug!(
            style = resolved.style,
            abv = abv,
            strength = %strength,
            "Inferred beer profile from text"
        );
        crate::observability::record_inference(resolved.style);

        BeerProfile {
            id: self.ids.next_id(),
            name: identity.name,
            brewery: identity.brewery,
            country: identity.country,
            style: resolved.style.to_string(),
            substyle: None,
            style_family: resolved.family,
            abv,
            strength_category: strength,
            drinkability: drinkability_for(abv),
            haze: resolved.haze,
            taste: resolved.taste,
            flavour_notes: notes,
            verdict,
            you_will_like_if: vec![
                format!("You enjoy {} styles", resolved.style),
                format!("You prefer {} flavors", resolved.family.as_str().to_lowercase()),
            ],
            avoid_if: vec![avoid.to_string()],
            food_pairing: FOOD_PAIRING.iter().map(|f| f.to_string()).collect(),
            confidence: Confidence {
                level: ConfidenceLevel::Low,
                why: LOW_CONFIDENCE_REASON.to_string(),
            },
            captured_at: self.clock.now().timestamp_millis(),
            image_data: None,
            thumbnail_data: None,
        }
    }
}

/// Infer with the default identifier and clock sources
pub fn infer_profile(text: &str) -> BeerProfile {
    TextProfileInferencer::new().infer(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_join_notes() {
        assert_eq!(join_notes(&[]), "");
        assert_eq!(join_notes(&notes(&["tart"])), "tart");
        assert_eq!(join_notes(&notes(&["coffee", "chocolate"])), "coffee and chocolate");
        assert_eq!(
            join_notes(&notes(&["citrus", "pine", "resin"])),
            "citrus, pine, and resin"
        );
    }

    #[test]
    fn test_compose_verdict() {
        let verdict = compose_verdict(
            StrengthCategory::Regular,
            "Lager",
            &notes(&["malty", "refreshing"]),
        );
        assert_eq!(verdict, "A regular (4.5–6%) Lager with malty and refreshing notes.");
    }

    #[test]
    fn test_descriptor_merge_keeps_baseline_for_missing_fields() {
        let sour = STYLE_TABLE
            .iter()
            .find(|d| d.trigger == "sour")
            .unwrap()
            .apply(&BASELINE_STYLE);
        assert_eq!(sour.taste.bitterness, 1.0);
        assert_eq!(sour.taste.sweetness, 2.0);
        assert_eq!(sour.taste.body, 3.0);
        assert_eq!(sour.taste.carbonation, 6.0);
    }

    #[test]
    fn test_table_order_is_fixed() {
        let triggers: Vec<&str> = STYLE_TABLE.iter().map(|d| d.trigger).collect();
        assert_eq!(
            triggers,
            vec!["ipa", "hazy", "neipa", "stout", "porter", "sour", "pilsner", "wheat"]
        );
    }

    #[test]
    fn test_extract_abv_ignores_non_ascii_digits() {
        assert_eq!(extract_abv("٥%"), None);
        assert_eq!(extract_abv("abv 6.5% vol"), Some(6.5));
        assert_eq!(extract_abv("12.% strong"), None);
    }

    #[test]
    fn test_identity_length_counts_scalar_values() {
        let identity = extract_identity("🍺🍺\nHop Yard");
        assert_eq!(identity.name, "Hop Yard");
        assert_eq!(identity.brewery, UNKNOWN_BREWERY);
    }
}
