//! Step counter and its textual readout.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStyle {
    /// `Step {current}/{total}` for every readout.
    #[default]
    Uniform,
    /// `Step 0/{total}` before the first move and `Steps: Step {current}/{total}`
    /// after each launch.
    Legacy,
}

/// Run progress. `launched` counts moves whose relocation has begun.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub launched: u64,
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Readout shown before any move; identical in both styles.
    pub fn initial_readout(&self) -> String {
        format!("Step {}/{}", self.launched, self.total)
    }

    pub fn step_readout(&self, style: ProgressStyle) -> String {
        match style {
            ProgressStyle::Uniform => format!("Step {}/{}", self.launched, self.total),
            ProgressStyle::Legacy => format!("Steps: Step {}/{}", self.launched, self.total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Receives progress readouts.
pub trait ProgressSink {
    fn show(&mut self, readout: &str);
}

impl ProgressSink for () {
    fn show(&mut self, _readout: &str) {}
}

#[derive(Default, Debug)]
pub struct RecordingProgress {
    pub readouts: Vec<String>,
}

impl RecordingProgress {
    pub fn last(&self) -> Option<&str> {
        self.readouts.last().map(String::as_str)
    }
}

impl ProgressSink for RecordingProgress {
    fn show(&mut self, readout: &str) {
        self.readouts.push(readout.to_owned());
    }
}
