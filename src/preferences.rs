//! # Preferences Module
//!
//! What the user likes, and the "will I like it" decision shown next to a
//! profile's verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AppError, AppResult};
use crate::profile::{BeerProfile, StyleFamily};

pub const MAX_MIN_ABV: f64 = 12.0;
/// Slider granularity for the minimum ABV
pub const MIN_ABV_STEP: f64 = 0.5;

fn default_min_abv() -> f64 {
    4.0
}

fn default_likes_hazy() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_min_abv")]
    pub min_abv: f64,
    #[serde(default = "default_likes_hazy")]
    pub likes_hazy: bool,
    #[serde(default)]
    pub fav_families: Vec<StyleFamily>,
    #[serde(default)]
    pub fav_styles: Vec<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            min_abv: default_min_abv(),
            likes_hazy: default_likes_hazy(),
            fav_families: Vec::new(),
            fav_styles: Vec::new(),
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=MAX_MIN_ABV).contains(&self.min_abv) {
            return Err(AppError::Validation(format!(
                "min_abv must be between 0 and {}, got {}",
                MAX_MIN_ABV, self.min_abv
            )));
        }
        if (self.min_abv / MIN_ABV_STEP).fract() != 0.0 {
            return Err(AppError::Validation(format!(
                "min_abv must be a multiple of {}, got {}",
                MIN_ABV_STEP, self.min_abv
            )));
        }
        if self.fav_styles.iter().any(|s| s.trim().is_empty()) {
            return Err(AppError::Validation(
                "favourite styles cannot be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fit {
    #[serde(rename = "Good match")]
    GoodMatch,
    Maybe,
    #[serde(rename = "Not for you")]
    NotForYou,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fit::GoodMatch => "Good match",
            Fit::Maybe => "Maybe",
            Fit::NotForYou => "Not for you",
        })
    }
}

/// Personal read on a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub fit: Fit,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Weigh a profile against the user's preferences.
///
/// Each matching preference adds a point and each clash removes one; a
/// positive total is a good match, zero is a maybe.
pub fn assess(profile: &BeerProfile, prefs: &UserPreferences) -> Decision {
    let mut score = 0;
    let mut reasons = Vec::new();

    if profile.abv < prefs.min_abv {
        score -= 1;
        reasons.push(format!(
            "At {}% it is below your {}% minimum",
            profile.abv, prefs.min_abv
        ));
    }

    if profile.haze.is_hazy() {
        if prefs.likes_hazy {
            score += 1;
            reasons.push("Hazy, the way you like it".to_string());
        } else {
            score -= 1;
            reasons.push("Hazy pour, and you prefer clear beers".to_string());
        }
    }

    if prefs.fav_families.contains(&profile.style_family) {
        score += 1;
        reasons.push(format!(
            "Belongs to a family you love ({})",
            profile.style_family
        ));
    }

    if prefs
        .fav_styles
        .iter()
        .any(|style| style.trim().eq_ignore_ascii_case(profile.style.trim()))
    {
        score += 1;
        reasons.push(format!("{} is one of your favourite styles", profile.style));
    }

    let fit = match score {
        s if s > 0 => Fit::GoodMatch,
        0 => Fit::Maybe,
        _ => Fit::NotForYou,
    };

    Decision { fit, score, reasons }
}
