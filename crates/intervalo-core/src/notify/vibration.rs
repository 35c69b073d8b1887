use super::{Cue, CueEvent, CueMeta, Notifier};
use crate::storage::{AppPreferences, HapticStrength};

pub struct VibrationNotifier {
    preferences: AppPreferences,
}

impl VibrationNotifier {
    pub fn new(preferences: AppPreferences) -> Self {
        Self { preferences }
    }

    /// (long, short) pulse lengths in ms.
    fn pulses(&self) -> (u64, u64) {
        match self.preferences.haptic_strength {
            HapticStrength::Light => (250, 50),
            HapticStrength::Medium => (400, 100),
            HapticStrength::Heavy => (600, 150),
        }
    }
}

impl Notifier for VibrationNotifier {
    fn name(&self) -> &'static str {
        "vibration"
    }

    fn notify(&mut self, event: CueEvent, _meta: &CueMeta) -> Option<Cue> {
        if !self.preferences.vibration_enabled {
            return None;
        }
        let (long, short) = self.pulses();
        let pattern_ms = match event {
            CueEvent::PreparationStart | CueEvent::RoundStart | CueEvent::RestStart => vec![long],
            CueEvent::Countdown => vec![short],
            CueEvent::WorkoutComplete => vec![long, 100, long, 100, long],
            CueEvent::WorkoutStopped => vec![long, 100, short],
            CueEvent::Halfway | CueEvent::Paused | CueEvent::Resumed => return None,
        };
        Some(Cue::Vibrate { pattern_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_is_a_short_pulse() {
        let mut sink = VibrationNotifier::new(AppPreferences::default());
        let meta = CueMeta::default();
        assert_eq!(
            sink.notify(CueEvent::Countdown, &meta),
            Some(Cue::Vibrate { pattern_ms: vec![100] })
        );
        assert_eq!(
            sink.notify(CueEvent::RoundStart, &meta),
            Some(Cue::Vibrate { pattern_ms: vec![400] })
        );
    }

    #[test]
    fn strength_scales_pulses() {
        let mut sink = VibrationNotifier::new(AppPreferences {
            haptic_strength: HapticStrength::Heavy,
            ..Default::default()
        });
        assert_eq!(
            sink.notify(CueEvent::RestStart, &CueMeta::default()),
            Some(Cue::Vibrate { pattern_ms: vec![600] })
        );
    }

    #[test]
    fn disabled_vibration() {
        let mut sink = VibrationNotifier::new(AppPreferences {
            vibration_enabled: false,
            ..Default::default()
        });
        assert!(sink
            .notify(CueEvent::WorkoutComplete, &CueMeta::default())
            .is_none());
    }
}
