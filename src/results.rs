// results.rs

use anyhow::{Context, Result};
use lanex_core::{
    AudioCue, CollaboratorError, MissedRecord, ReactionLogger, ReactionRecord, TrialLog,
    TrialOutcome, TrialReport,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// In-memory reaction log, written out once the run is over.
#[derive(Debug, Default, Serialize)]
pub struct ResultsLog {
    pub reactions: Vec<ReactionRecord>,
    pub missed: Vec<MissedRecord>,
    pub trial_logs: Vec<TrialLog>,
}

impl ReactionLogger for ResultsLog {
    fn add(&mut self, record: &ReactionRecord) -> Result<(), CollaboratorError> {
        self.reactions.push(record.clone());
        Ok(())
    }

    fn add_missed(&mut self, record: &MissedRecord) -> Result<(), CollaboratorError> {
        self.missed.push(record.clone());
        Ok(())
    }

    fn write_trial_log(&mut self, log: &TrialLog) -> Result<(), CollaboratorError> {
        self.trial_logs.push(log.clone());
        Ok(())
    }
}

/// Headless stand-in for the simulator's audio: every cue becomes a log line.
#[derive(Debug, Default)]
pub struct LoggedAudio {
    pub played: Vec<String>,
}

impl AudioCue for LoggedAudio {
    fn play(&mut self, sound_id: &str) -> Result<(), CollaboratorError> {
        info!(sound = sound_id, "Playing sound");
        self.played.push(sound_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub trials: usize,
    pub successes: usize,
    pub failures: usize,
    pub missed: usize,
    pub response_rate: f64,
    pub mean_reaction_ms: Option<f64>,
    pub min_reaction_ms: Option<i64>,
    pub max_reaction_ms: Option<i64>,
}

impl Summary {
    pub fn from_reports(reports: &[TrialReport]) -> Self {
        let count = |outcome: TrialOutcome| reports.iter().filter(|r| r.outcome == outcome).count();
        let times: Vec<i64> = reports.iter().filter_map(|r| r.reaction_time_ms).collect();
        let responded = times.len();

        Summary {
            trials: reports.len(),
            successes: count(TrialOutcome::Success),
            failures: count(TrialOutcome::Failure),
            missed: count(TrialOutcome::Missed),
            response_rate: if reports.is_empty() {
                0.0
            } else {
                responded as f64 / reports.len() as f64 * 100.0
            },
            mean_reaction_ms: (responded > 0)
                .then(|| times.iter().sum::<i64>() as f64 / responded as f64),
            min_reaction_ms: times.iter().copied().min(),
            max_reaction_ms: times.iter().copied().max(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct ExperimentResults {
    pub summary: Summary,
    pub reports: Vec<TrialReport>,
    #[serde(flatten)]
    pub log: ResultsLog,
}

impl ExperimentResults {
    pub fn new(reports: Vec<TrialReport>, log: ResultsLog) -> Self {
        Self {
            summary: Summary::from_reports(&reports),
            reports,
            log,
        }
    }

    pub fn analyze(&self) {
        let s = &self.summary;
        info!("Experiment Results:");
        info!(
            "Trials: {}, success {}, failure {}, missed {}, response rate: {:.1}%",
            s.trials, s.successes, s.failures, s.missed, s.response_rate
        );
        if let (Some(mean), Some(min), Some(max)) =
            (s.mean_reaction_ms, s.min_reaction_ms, s.max_reaction_ms)
        {
            info!(
                "Reaction times: mean {:.1} ms, min {} ms, max {} ms",
                mean, min, max
            );
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create result file {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .context("failed to write results")?;
        info!("Results saved to {}", path.display());
        Ok(())
    }
}
