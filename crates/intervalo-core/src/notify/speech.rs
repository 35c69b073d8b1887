use super::{Cue, CueEvent, CueMeta, Notifier};
use crate::i18n::{phrase, Language, Phrase};
use crate::storage::SpeechSettings;

pub struct SpeechNotifier {
    settings: SpeechSettings,
    language: Language,
}

impl SpeechNotifier {
    pub fn new(settings: SpeechSettings, language: Language) -> Self {
        Self { settings, language }
    }

    fn phrase_for(&self, event: CueEvent, meta: &CueMeta) -> Option<Phrase> {
        let p = match event {
            CueEvent::PreparationStart => Phrase::GetReady,
            CueEvent::RoundStart if !self.settings.announce_rounds => Phrase::Go,
            CueEvent::RoundStart if meta.total_rounds > 1 && meta.round == meta.total_rounds => {
                Phrase::LastRound
            }
            CueEvent::RoundStart => Phrase::Round {
                round: meta.round,
                total: meta.total_rounds,
            },
            CueEvent::RestStart => Phrase::Rest,
            CueEvent::Countdown if self.settings.announce_countdown => {
                Phrase::Count(meta.remaining_secs)
            }
            CueEvent::Countdown => return None,
            CueEvent::Halfway => Phrase::Halfway,
            CueEvent::Paused => Phrase::Paused,
            CueEvent::Resumed => Phrase::Resumed,
            CueEvent::WorkoutComplete => Phrase::Completed,
            CueEvent::WorkoutStopped => Phrase::Stopped,
        };
        Some(p)
    }
}

impl Notifier for SpeechNotifier {
    fn name(&self) -> &'static str {
        "speech"
    }

    fn notify(&mut self, event: CueEvent, meta: &CueMeta) -> Option<Cue> {
        if !self.settings.enabled {
            return None;
        }
        let p = self.phrase_for(event, meta)?;
        Some(Cue::Speak {
            text: phrase(self.language, p),
            language: self.language,
            rate: self.settings.rate,
            pitch: self.settings.pitch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> SpeechSettings {
        SpeechSettings {
            enabled: true,
            ..Default::default()
        }
    }

    fn text(cue: Option<Cue>) -> Option<String> {
        match cue {
            Some(Cue::Speak { text, .. }) => Some(text),
            _ => None,
        }
    }

    #[test]
    fn off_by_default() {
        let mut sink = SpeechNotifier::new(SpeechSettings::default(), Language::En);
        assert!(sink.notify(CueEvent::RoundStart, &CueMeta::default()).is_none());
    }

    #[test]
    fn announces_rounds_and_last_round() {
        let mut sink = SpeechNotifier::new(enabled(), Language::En);
        let round = |round| CueMeta {
            round,
            total_rounds: 4,
            remaining_secs: 20,
        };
        assert_eq!(
            text(sink.notify(CueEvent::RoundStart, &round(2))).as_deref(),
            Some("Round 2 of 4")
        );
        assert_eq!(
            text(sink.notify(CueEvent::RoundStart, &round(4))).as_deref(),
            Some("Last round")
        );
    }

    #[test]
    fn countdown_only_when_asked() {
        let meta = CueMeta {
            remaining_secs: 2,
            ..Default::default()
        };
        let mut quiet = SpeechNotifier::new(enabled(), Language::En);
        assert!(quiet.notify(CueEvent::Countdown, &meta).is_none());

        let mut counting = SpeechNotifier::new(
            SpeechSettings {
                announce_countdown: true,
                ..enabled()
            },
            Language::Es,
        );
        assert_eq!(text(counting.notify(CueEvent::Countdown, &meta)).as_deref(), Some("2"));
        assert_eq!(
            text(counting.notify(CueEvent::RestStart, &meta)).as_deref(),
            Some("Descanso")
        );
    }
}
