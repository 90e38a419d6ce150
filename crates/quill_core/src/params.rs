//! Sampling parameters for a generation call.

use serde::{Deserialize, Serialize};

/// Per-call generation parameters.
///
/// # Examples
///
/// ```
/// use quill_core::GenerateParams;
///
/// let params = GenerateParams::new(0.5, 2000).with_json_mode();
/// assert!(params.json_mode);
/// assert_eq!(params.top_p, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Ask the backend for a JSON object
    pub json_mode: bool,
}

impl GenerateParams {
    /// Create parameters with the given temperature and output ceiling.
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            top_p: None,
            json_mode: false,
        }
    }

    /// Request JSON-formatted output.
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Set the nucleus sampling cutoff.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self::new(0.7, 1024)
    }
}
