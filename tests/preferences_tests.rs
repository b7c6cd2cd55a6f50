use beer_snap::infer_profile;
use beer_snap::preferences::{assess, Fit, UserPreferences};
use beer_snap::profile::StyleFamily;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazy_beer_for_haze_lover_is_good_match() {
        let decision = assess(&infer_profile("hazy 6%"), &UserPreferences::default());
        assert_eq!(decision.fit, Fit::GoodMatch);
        assert_eq!(decision.score, 1);
        assert_eq!(decision.reasons.len(), 1);
    }

    #[test]
    fn test_plain_lager_with_defaults_is_maybe() {
        let decision = assess(&infer_profile("Golden Lager"), &UserPreferences::default());
        assert_eq!(decision.fit, Fit::Maybe);
        assert_eq!(decision.score, 0);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_weak_cloudy_beer_for_clear_beer_fan_is_not_for_you() {
        let prefs = UserPreferences {
            min_abv: 6.0,
            likes_hazy: false,
            ..UserPreferences::default()
        };
        let decision = assess(&infer_profile("wheat 5%"), &prefs);
        assert_eq!(decision.fit, Fit::NotForYou);
        assert_eq!(decision.score, -2);
    }

    #[test]
    fn test_favourite_family_and_style_both_count() {
        let prefs = UserPreferences {
            min_abv: 0.0,
            likes_hazy: false,
            fav_families: vec![StyleFamily::DarkRoasted],
            fav_styles: vec!["  porter ".to_string()],
        };
        // Opaque pours count as hazy
        let decision = assess(&infer_profile("Robust porter 6.5%"), &prefs);
        assert_eq!(decision.score, 1);
        assert_eq!(decision.fit, Fit::GoodMatch);
        assert_eq!(decision.reasons.len(), 3);
    }

    #[test]
    fn test_fit_labels() {
        assert_eq!(Fit::GoodMatch.to_string(), "Good match");
        assert_eq!(serde_json::to_string(&Fit::NotForYou).unwrap(), "\"Not for you\"");
    }
}
