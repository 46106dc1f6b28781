//! Structured stage logging.
//!
//! Provides consistent, structured logging for pipeline stages with
//! tracing spans and the video/analysis context attached.

use tracing::{error, info, warn, Span};

/// Stage logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct StageLogger {
    stage: &'static str,
    subject: String,
}

impl StageLogger {
    /// Create a logger for a stage.
    ///
    /// # Arguments
    /// * `stage` - The stage name (e.g. "video_analysis", "critical_analysis")
    /// * `subject` - The video ID or analysis ID being processed
    pub fn new(stage: &'static str, subject: &str) -> Self {
        Self {
            stage,
            subject: subject.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(stage = self.stage, subject = %self.subject, "Stage started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(stage = self.stage, subject = %self.subject, "Stage progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(stage = self.stage, subject = %self.subject, "Stage warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(stage = self.stage, subject = %self.subject, "Stage error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(stage = self.stage, subject = %self.subject, "Stage completed: {}", message);
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Create a tracing span for this stage.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("analysis_stage", stage = self.stage, subject = %self.subject)
    }
}
