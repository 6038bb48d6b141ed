//! Artifacts - the bytes handed to delivery.

use crate::AssemblyFailure;

/// Output format of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFormat {
    /// Office Open XML presentation package.
    Pptx,
    /// Standalone styled HTML document (degraded output).
    Html,
}

/// A produced document, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Output format.
    pub format: ArtifactFormat,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl ArtifactFormat {
    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            ArtifactFormat::Html => "text/html",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Pptx => "pptx",
            ArtifactFormat::Html => "html",
        }
    }

    /// Whether this is the degraded format.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ArtifactFormat::Html)
    }
}

impl Artifact {
    /// Create a new artifact.
    pub fn new(format: ArtifactFormat, data: Vec<u8>) -> Self {
        Self { format, data }
    }

    /// Create a presentation package artifact.
    pub fn pptx(data: Vec<u8>) -> Self {
        Self::new(ArtifactFormat::Pptx, data)
    }

    /// Create an HTML artifact.
    pub fn html(data: Vec<u8>) -> Self {
        Self::new(ArtifactFormat::Html, data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reject artifacts too small to be a complete package.
    pub fn ensure_plausible(&self, minimum: usize) -> Result<(), AssemblyFailure> {
        if self.data.len() < minimum {
            return Err(AssemblyFailure::ImplausibleSize {
                size: self.data.len(),
                minimum,
            });
        }
        Ok(())
    }

    /// Suggested file name for a deck titled `title`.
    ///
    /// Degraded artifacts get a `_PowerPoint_Ready` suffix so users can tell
    /// them apart from real packages.
    pub fn suggested_file_name(&self, title: &str) -> String {
        let stem = file_stem(title);
        match self.format {
            ArtifactFormat::Pptx => format!("{stem}.pptx"),
            ArtifactFormat::Html => format!("{stem}_PowerPoint_Ready.html"),
        }
    }
}

/// Reduce a title to a portable file stem.
pub fn file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut last_was_sep = true;
    for c in title.trim().chars() {
        if c.is_alphanumeric() || c == '-' {
            stem.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            stem.push('_');
            last_was_sep = true;
        }
    }
    while stem.ends_with('_') {
        stem.pop();
    }
    if stem.is_empty() {
        "presentation".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Q3 Review: Results!"), "Q3_Review_Results");
        assert_eq!(file_stem("  ../etc/passwd "), "etc_passwd");
        assert_eq!(file_stem("???"), "presentation");
    }

    #[test]
    fn test_suggested_names() {
        let pptx = Artifact::pptx(vec![1]);
        let html = Artifact::html(vec![1]);
        assert_eq!(pptx.suggested_file_name("Deck"), "Deck.pptx");
        assert_eq!(html.suggested_file_name("Deck"), "Deck_PowerPoint_Ready.html");
    }

    #[test]
    fn test_ensure_plausible() {
        let small = Artifact::pptx(vec![0; 400]);
        assert!(matches!(
            small.ensure_plausible(2048),
            Err(AssemblyFailure::ImplausibleSize { size: 400, minimum: 2048 })
        ));
        assert!(Artifact::pptx(vec![0; 4096]).ensure_plausible(2048).is_ok());
    }
}
