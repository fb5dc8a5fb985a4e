//! Prompt composition
//!
//! Merges the creator's description with their settings into the single
//! instruction sent to the image model. Output depends only on the inputs.

use std::fmt;

use crate::types::GenerationSettings;

const CLOSING_DIRECTIVE: &str = "Create a high-quality 3D render without any text. High resolution, photorealistic.";

/// Detail wording selected from the numeric detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailBand {
    Minimal,
    Somewhat,
    Moderate,
    High,
}

impl DetailBand {
    /// Band a detail level; each threshold excludes its own value
    pub const fn from_level(level: u8) -> Self {
        match level {
            76.. => Self::High,
            51..=75 => Self::Moderate,
            26..=50 => Self::Somewhat,
            _ => Self::Minimal,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimally detailed",
            Self::Somewhat => "somewhat detailed",
            Self::Moderate => "moderately detailed",
            Self::High => "highly detailed",
        }
    }
}

impl fmt::Display for DetailBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the enhanced prompt
///
/// An empty `prompt` is allowed when a reference image accompanies the
/// request; the caller enforces that.
pub fn compose(prompt: &str, settings: &GenerationSettings) -> String {
    format!(
        "Create a photorealistic 3D mockup of the following: {prompt}. \
         Make it {detail}. \
         Use a {style} style. \
         Use a {color} color scheme. \
         {CLOSING_DIRECTIVE}",
        detail = DetailBand::from_level(settings.detail_level),
        style = settings.style_preference,
        color = settings.color_scheme,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorScheme, StylePreference};

    fn settings(detail_level: u8) -> GenerationSettings {
        GenerationSettings {
            detail_level,
            ..GenerationSettings::default()
        }
    }

    #[test]
    fn bands_at_sample_levels() {
        let bands: Vec<_> = [0, 26, 51, 76, 100].into_iter().map(DetailBand::from_level).collect();
        assert_eq!(
            bands,
            [
                DetailBand::Minimal,
                DetailBand::Somewhat,
                DetailBand::Moderate,
                DetailBand::High,
                DetailBand::High
            ]
        );
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(DetailBand::from_level(25), DetailBand::Minimal);
        assert_eq!(DetailBand::from_level(50), DetailBand::Somewhat);
        assert_eq!(DetailBand::from_level(75), DetailBand::Moderate);
        assert_eq!(DetailBand::from_level(76), DetailBand::High);
    }

    #[test]
    fn zero_detail_still_gets_a_clause() {
        let prompt = compose("a laptop", &settings(0));
        assert!(prompt.contains("Make it minimally detailed. "));
    }

    #[test]
    fn full_instruction_text() {
        let settings = GenerationSettings {
            detail_level: 80,
            style_preference: StylePreference::Stylized,
            color_scheme: ColorScheme::Muted,
        };

        assert_eq!(
            compose("A smart speaker in a minimalist living room", &settings),
            "Create a photorealistic 3D mockup of the following: A smart speaker in a minimalist living room. \
             Make it highly detailed. Use a stylized style. Use a muted color scheme. \
             Create a high-quality 3D render without any text. High resolution, photorealistic."
        );
    }

    #[test]
    fn clauses_keep_fixed_order() {
        let prompt = compose("phone", &GenerationSettings::default());
        let detail = prompt.find("Make it").unwrap();
        let style = prompt.find("style.").unwrap();
        let color = prompt.find("color scheme.").unwrap();
        let closing = prompt.find(CLOSING_DIRECTIVE).unwrap();
        assert!(detail < style && style < color && color < closing);
        assert!(prompt.ends_with(CLOSING_DIRECTIVE));
    }

    #[test]
    fn deterministic() {
        let settings = GenerationSettings {
            detail_level: 33,
            style_preference: StylePreference::Abstract,
            color_scheme: ColorScheme::Monochrome,
        };
        assert_eq!(compose("a chair", &settings), compose("a chair", &settings));
        assert_eq!(compose("", &settings), compose("", &settings));
    }
}
