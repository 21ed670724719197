//! Language detection for summary instructions.

/// Detects the natural language of a request.
pub trait LanguageDetector: Send + Sync {
    /// English name of the language (`"Spanish"`), or `None` when unsure.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Trigram detection via `whatlang`; low-confidence guesses are discarded.
#[derive(Debug, Clone, Copy)]
pub struct WhatlangDetector {
    min_confidence: f64,
}

impl WhatlangDetector {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        (info.confidence() >= self.min_confidence).then(|| info.lang().eng_name().to_string())
    }
}

/// Never detects anything; summaries follow the request's language.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLanguageDetection;

impl LanguageDetector for NoLanguageDetection {
    fn detect(&self, _text: &str) -> Option<String> {
        None
    }
}
