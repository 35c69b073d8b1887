//! Translation tables for phase labels and spoken cues.

use serde::{Deserialize, Serialize};

use crate::timer::Phase;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// BCP 47 tag handed to speech engines.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Es => "es-ES",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Language::En),
            "es" | "es-es" | "spanish" | "español" => Ok(Language::Es),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

pub fn phase_label(language: Language, phase: Phase) -> &'static str {
    match (language, phase) {
        (Language::En, Phase::Preparation) => "Get Ready",
        (Language::En, Phase::Exercise) => "Work",
        (Language::En, Phase::Rest) => "Rest",
        (Language::En, Phase::Completed) => "Done",
        (Language::Es, Phase::Preparation) => "Prepárate",
        (Language::Es, Phase::Exercise) => "Ejercicio",
        (Language::Es, Phase::Rest) => "Descanso",
        (Language::Es, Phase::Completed) => "Terminado",
    }
}

/// Something the speech sink can say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    GetReady,
    Go,
    Round { round: u32, total: u32 },
    LastRound,
    Rest,
    Halfway,
    Count(u32),
    Paused,
    Resumed,
    Completed,
    Stopped,
}

pub fn phrase(language: Language, phrase: Phrase) -> String {
    match language {
        Language::En => match phrase {
            Phrase::GetReady => "Get ready".into(),
            Phrase::Go => "Go".into(),
            Phrase::Round { round, total } => format!("Round {round} of {total}"),
            Phrase::LastRound => "Last round".into(),
            Phrase::Rest => "Rest".into(),
            Phrase::Halfway => "Halfway there".into(),
            Phrase::Count(n) => n.to_string(),
            Phrase::Paused => "Paused".into(),
            Phrase::Resumed => "Resumed".into(),
            Phrase::Completed => "Workout complete. Great job".into(),
            Phrase::Stopped => "Workout stopped".into(),
        },
        Language::Es => match phrase {
            Phrase::GetReady => "Prepárate".into(),
            Phrase::Go => "Vamos".into(),
            Phrase::Round { round, total } => format!("Ronda {round} de {total}"),
            Phrase::LastRound => "Última ronda".into(),
            Phrase::Rest => "Descanso".into(),
            Phrase::Halfway => "Mitad del camino".into(),
            Phrase::Count(n) => n.to_string(),
            Phrase::Paused => "En pausa".into(),
            Phrase::Resumed => "Continuamos".into(),
            Phrase::Completed => "Entrenamiento completado. Buen trabajo".into(),
            Phrase::Stopped => "Entrenamiento detenido".into(),
        },
    }
}
