//! Display policy
//!
//! The confidence threshold and the mood → (name, color, icon) lookup are product decisions kept
//! apart from the model so either can change without retraining.

use serde::Serialize;

/// Label reported when confidence falls below the threshold
pub const UNCERTAIN_LABEL: &str = "uncertain";

/// Default minimum confidence for reporting the model's top class
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.55;

/// Color used for labels with no dedicated styling
pub const NEUTRAL_COLOR: &str = "#6B7280";

/// Icon used for labels with no dedicated styling
pub const GENERIC_ICON: &str = "🎵";

/// Presentation of a mood label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodDisplay {
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// `label`, or [`UNCERTAIN_LABEL`] when `confidence < threshold`
pub fn apply_threshold<'a>(label: &'a str, confidence: f64, threshold: f64) -> &'a str {
    if confidence < threshold {
        UNCERTAIN_LABEL
    } else {
        label
    }
}

pub fn mood_display(label: &str) -> MoodDisplay {
    let (name, color, icon) = match label {
        "happy" => ("Happy", "#FBBF24", "😊"),
        "calm" => ("Calm", "#60A5FA", "😌"),
        "energetic" => ("Energetic", "#EC4899", "⚡"),
        "sad" => ("Melancholic", "#A78BFA", "😢"),
        UNCERTAIN_LABEL => ("Uncertain", "#9CA3AF", "❓"),
        other => {
            return MoodDisplay {
                name: title_case(other),
                color: NEUTRAL_COLOR.to_string(),
                icon: GENERIC_ICON.to_string(),
            }
        }
    };

    MoodDisplay {
        name: name.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
    }
}

/// Uppercase the first letter of each word and lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_overrides_low_confidence() {
        assert_eq!(apply_threshold("happy", 0.54, 0.55), UNCERTAIN_LABEL);
        assert_eq!(apply_threshold("happy", 0.55, 0.55), "happy");
        assert_eq!(apply_threshold("sad", 0.9, 0.95), UNCERTAIN_LABEL);
        assert_eq!(apply_threshold("sad", 0.1, 0.0), "sad");
    }

    #[test]
    fn test_known_moods() {
        let sad = mood_display("sad");
        assert_eq!(sad.name, "Melancholic");
        assert_eq!(sad.color, "#A78BFA");
        assert_eq!(sad.icon, "😢");

        let uncertain = mood_display(UNCERTAIN_LABEL);
        assert_eq!(uncertain.name, "Uncertain");
        assert_eq!(uncertain.color, "#9CA3AF");
    }

    #[test]
    fn test_unknown_mood_fallback() {
        let display = mood_display("dreamy");
        assert_eq!(display.name, "Dreamy");
        assert_eq!(display.color, NEUTRAL_COLOR);
        assert_eq!(display.icon, GENERIC_ICON);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("unknown"), "Unknown");
        assert_eq!(title_case("lo-fi CHILL"), "Lo-Fi Chill");
        assert_eq!(title_case(""), "");
    }
}
