//! Request handlers.

pub mod analysis;
pub mod cache;
pub mod health;
pub mod history;

pub use analysis::*;
pub use cache::*;
pub use health::*;
pub use history::*;

use serde::Serialize;

/// Body for operations that return no data.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
