use super::{Cue, CueEvent, CueMeta, Notifier};
use crate::storage::SoundSettings;

pub struct SoundNotifier {
    settings: SoundSettings,
}

impl SoundNotifier {
    pub fn new(settings: SoundSettings) -> Self {
        Self { settings }
    }

    fn wants(&self, event: CueEvent) -> bool {
        let s = &self.settings;
        match event {
            CueEvent::PreparationStart | CueEvent::RoundStart => s.round_start,
            CueEvent::RestStart => s.rest_start,
            CueEvent::Countdown => s.countdown,
            CueEvent::Halfway => s.halfway,
            CueEvent::WorkoutComplete | CueEvent::WorkoutStopped => s.workout_complete,
            CueEvent::Paused | CueEvent::Resumed => false,
        }
    }
}

impl Notifier for SoundNotifier {
    fn name(&self) -> &'static str {
        "sound"
    }

    fn notify(&mut self, event: CueEvent, _meta: &CueMeta) -> Option<Cue> {
        if !self.settings.enabled || self.settings.volume == 0 || !self.wants(event) {
            return None;
        }
        Some(Cue::Sound {
            event,
            sound: self.settings.sound.clone(),
            volume: self.settings.volume.min(100),
        })
    }
}
