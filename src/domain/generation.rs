/// Sampling knobs passed through to whichever backend ends up generating.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub top_p: f64,
    pub temperature: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            do_sample: true,
            top_p: 0.95,
            temperature: 0.7,
        }
    }
}

/// Result of a generation call. Generation is best-effort: instead of an
/// error, callers get a `Degraded` outcome carrying the reason and the
/// placeholder text that stood in for real output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(String),
    Degraded { reason: String, text: String },
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::Degraded { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationOutcome::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Map the generated text, leaving degradation status untouched.
    pub fn map_text(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            GenerationOutcome::Generated(text) => GenerationOutcome::Generated(f(text)),
            GenerationOutcome::Degraded { reason, text } => GenerationOutcome::Degraded {
                reason,
                text: f(text),
            },
        }
    }
}
