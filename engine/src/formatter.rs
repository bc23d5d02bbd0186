//! Response Formatter

/// Fixed introduction placed before every task result
pub const RESPONSE_PREFIX: &str = "Here's what I found:\n\n";

/// Wraps task output for presentation
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Prefix `task_output` with [`RESPONSE_PREFIX`]; nothing else changes.
    pub fn format(&self, task_output: &str) -> String {
        format!("{}{}", RESPONSE_PREFIX, task_output)
    }
}
