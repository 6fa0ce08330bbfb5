use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stages, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Outline,
    Writer,
    Style,
    Editor,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Stage::Outline, Stage::Writer, Stage::Style, Stage::Editor];

    /// Human-readable status line announced when the stage starts.
    pub fn status_message(self) -> &'static str {
        match self {
            Stage::Outline => "Creating blog outline...",
            Stage::Writer => "Writing first draft...",
            Stage::Style => "Refining draft towards the author's style...",
            Stage::Editor => "Polishing the final post...",
        }
    }
}

/// One recorded stage entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTransition {
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
}

/// Stage bookkeeping for a single request.
#[derive(Debug, Default)]
pub struct PipelineState {
    current_stage: Option<Stage>,
    history: Vec<StageTransition>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entry into `stage`. Stages only move forward.
    pub fn enter(&mut self, stage: Stage) -> anyhow::Result<()> {
        if let Some(current) = self.current_stage
            && position(stage) <= position(current)
        {
            anyhow::bail!("cannot move from stage {current} back to {stage}");
        }
        self.current_stage = Some(stage);
        self.history.push(StageTransition {
            stage,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    pub fn current_stage(&self) -> Option<Stage> {
        self.current_stage
    }

    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }
}

fn position(stage: Stage) -> usize {
    Stage::ORDER
        .iter()
        .position(|s| *s == stage)
        .unwrap_or(usize::MAX)
}
