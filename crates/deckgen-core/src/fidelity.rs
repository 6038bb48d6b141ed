//! Fidelity tracking - know what was repaired, defaulted or degraded.

/// Result of a pipeline stage, including fidelity warnings.
#[derive(Debug)]
pub struct ConversionResult<T> {
    /// The stage output.
    pub value: T,
    /// Warnings about information that was lost, defaulted or transformed.
    pub warnings: Vec<FidelityWarning>,
}

impl<T> ConversionResult<T> {
    /// Create a successful result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<FidelityWarning>) -> Self {
        Self { value, warnings }
    }

    /// Add a warning.
    pub fn warn(mut self, warning: FidelityWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any major or error-level warnings.
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w.severity, Severity::Major | Severity::Error))
    }

    /// Transform the value, keeping warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConversionResult<U> {
        ConversionResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// A warning about fidelity loss during a stage.
#[derive(Debug, Clone)]
pub struct FidelityWarning {
    /// How severe is this warning?
    pub severity: Severity,
    /// What kind of issue?
    pub kind: WarningKind,
    /// Human-readable message.
    pub message: String,
    /// 1-based slide index this concerns, if any.
    pub slide: Option<usize>,
}

impl FidelityWarning {
    /// Create a new warning.
    pub fn new(severity: Severity, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            slide: None,
        }
    }

    /// Attach the slide this warning is about.
    pub fn on_slide(mut self, index: usize) -> Self {
        self.slide = Some(index);
        self
    }
}

impl std::fmt::Display for FidelityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slide {
            Some(index) => write!(f, "slide {index}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Severity of a fidelity warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Information only, no data lost.
    Info,
    /// A default was substituted.
    Minor,
    /// Significant information lost.
    Major,
    /// Output is degraded.
    Error,
}

/// Kind of fidelity issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A missing or ill-typed field was replaced by its default.
    DefaultedField(String),
    /// A field or entry was ignored.
    DroppedField(String),
    /// Structure simplified (e.g. both bullets and paragraph supplied).
    Simplified(String),
    /// The raw content was unusable and placeholder content was substituted.
    PlaceholderContent,
    /// No provider found an image; a neutral placeholder was used.
    PlaceholderImage,
    /// The body left no room for the image; the default region was used.
    ImageRegion,
    /// The primary backend failed and a degraded format was produced.
    DegradedArtifact(String),
}
