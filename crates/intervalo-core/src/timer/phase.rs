use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::storage::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preparation,
    Exercise,
    Rest,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preparation => "preparation",
            Phase::Exercise => "exercise",
            Phase::Rest => "rest",
            Phase::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed)
    }

    /// Display label in the given language.
    pub fn label(&self, language: Language) -> &'static str {
        crate::i18n::phase_label(language, *self)
    }

    /// Hex color used for this phase under `theme`.
    ///
    /// `Theme::System` falls back to the dark palette; callers that know the
    /// system preference should resolve the theme first.
    pub fn color(&self, theme: Theme) -> &'static str {
        let dark = !matches!(theme, Theme::Light);
        match (self, dark) {
            (Phase::Preparation, false) => "#F59E0B",
            (Phase::Preparation, true) => "#FBBF24",
            (Phase::Exercise, false) => "#EF4444",
            (Phase::Exercise, true) => "#F87171",
            (Phase::Rest, false) => "#22C55E",
            (Phase::Rest, true) => "#4ADE80",
            (Phase::Completed, false) => "#3B82F6",
            (Phase::Completed, true) => "#60A5FA",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
