use lanex_core::{AudioCue, CollaboratorError, ReactionLogger, TrialReport};
use tracing::{info, warn};

/// Forwards terminal reports to the experiment logger and the audio system.
///
/// Delivery is one-shot: a collaborator failure is logged and counted, never
/// retried.
pub struct ReportingBridge<L, A> {
    logger: L,
    audio: A,
    delivered: usize,
    failures: usize,
}

impl<L: ReactionLogger, A: AudioCue> ReportingBridge<L, A> {
    pub fn new(logger: L, audio: A) -> Self {
        Self {
            logger,
            audio,
            delivered: 0,
            failures: 0,
        }
    }

    pub fn report(&mut self, report: &TrialReport, sound: &str) {
        let logged = match (report.reaction_record(), report.missed_record()) {
            (Some(record), _) => self.logger.add(&record),
            (None, Some(missed)) => self.logger.add_missed(&missed),
            (None, None) => Ok(()),
        };
        self.note("reaction logger", logged);
        let written = self.logger.write_trial_log(&report.log);
        self.note("trial log", written);
        self.play(sound);

        self.delivered += 1;
        info!(
            trial = report.trial_id,
            outcome = ?report.outcome,
            reaction_ms = ?report.reaction_time_ms,
            avg_ttc = report.avg_ttc,
            min_ttc = report.min_ttc,
            lat_accel = report.peak_lat_accel,
            "Trial {} reported",
            report.trial_id
        );
    }

    pub fn play(&mut self, sound_id: &str) {
        if sound_id.is_empty() {
            return;
        }
        let played = self.audio.play(sound_id);
        self.note("audio", played);
    }

    fn note(&mut self, collaborator: &str, result: Result<(), CollaboratorError>) {
        if let Err(err) = result {
            self.failures += 1;
            warn!(collaborator, error = %err, "collaborator failed to handle report");
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn into_parts(self) -> (L, A) {
        (self.logger, self.audio)
    }
}
