/// Whether forwarded input is lowercased.
///
/// Lowercasing everything breaks case-sensitive paths and arguments, so it
/// can be switched off. Built-in names match case-insensitively either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMode {
    #[default]
    Lower,
    Preserve,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: CaseMode,
}

/// One input line split into words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedInput {
    tokens: Vec<String>,
}

impl Normalizer {
    pub fn new(mode: CaseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CaseMode {
        self.mode
    }

    pub fn normalize(&self, raw: &str) -> NormalizedInput {
        let tokens = match self.mode {
            CaseMode::Lower => raw.to_lowercase().split_whitespace().map(String::from).collect(),
            CaseMode::Preserve => raw.split_whitespace().map(String::from).collect(),
        };
        NormalizedInput { tokens }
    }
}

impl NormalizedInput {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Dispatch key: the first word, lowercased.
    pub fn command(&self) -> Option<String> {
        self.tokens.first().map(|t| t.to_lowercase())
    }

    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Words re-joined with single spaces, as forwarded to the backing shell.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        let input = Normalizer::default().normalize("  ECHO   Hello\tWorld  ");
        assert_eq!(input.tokens(), ["echo", "hello", "world"]);
        assert_eq!(input.command().as_deref(), Some("echo"));
        assert_eq!(input.args(), ["hello", "world"]);
        assert_eq!(input.joined(), "echo hello world");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let normalizer = Normalizer::default();
        for raw in ["", "   ", "\t \t", "\n"] {
            let input = normalizer.normalize(raw);
            assert!(input.is_empty());
            assert_eq!(input.command(), None);
            assert!(input.args().is_empty());
        }
    }

    #[test]
    fn test_preserve_mode_keeps_case() {
        let input = Normalizer::new(CaseMode::Preserve).normalize("CD /Users/Me");
        assert_eq!(input.tokens(), ["CD", "/Users/Me"]);
        assert_eq!(input.command().as_deref(), Some("cd"));
        assert_eq!(input.joined(), "CD /Users/Me");
    }

    #[test]
    fn test_unicode_case_folding() {
        let input = Normalizer::default().normalize("ÉCHO ÄÖÜ");
        assert_eq!(input.joined(), "écho äöü");
    }
}
