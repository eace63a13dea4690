use uuid::Uuid;

/// In-band end-of-output marker for one session.
///
/// Every forwarded command is followed by an `echo` of the marker; the
/// session reads stdout until the marker comes back. The marker is random
/// per session so command output cannot collide with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    marker: String,
}

/// What a single stdout line means for the current command cycle.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    Output,
    /// The marker, with any output that preceded it on the same line
    /// (a command whose last line had no trailing newline).
    End(&'a [u8]),
}

impl Sentinel {
    pub fn random() -> Self {
        Self {
            marker: format!("__DONE_{}__", Uuid::new_v4().simple()),
        }
    }

    pub fn fixed(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Command line written to the backing shell's stdin, newline included.
    pub fn compose(&self, command: &str) -> String {
        let body = command.trim_end();
        let ends_with_separator =
            body.ends_with(';') || (body.ends_with('&') && !body.ends_with("&&"));

        if body.is_empty() {
            format!("echo {}\n", self.marker)
        } else if ends_with_separator {
            format!("{} echo {}\n", body, self.marker)
        } else {
            format!("{}; echo {}\n", body, self.marker)
        }
    }

    pub fn classify<'a>(&self, line: &'a [u8]) -> LineKind<'a> {
        let trimmed = line.trim_ascii();
        if trimmed == self.marker.as_bytes() {
            return LineKind::End(&[]);
        }

        let trimmed_end = line.trim_ascii_end();
        match trimmed_end.strip_suffix(self.marker.as_bytes()) {
            Some(prefix) => LineKind::End(prefix),
            None => LineKind::Output,
        }
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_markers_differ() {
        let a = Sentinel::random();
        let b = Sentinel::random();
        assert_ne!(a, b);
        assert!(a.marker().starts_with("__DONE_"));
        assert!(a.marker().ends_with("__"));
    }

    #[test]
    fn test_compose_appends_echo() {
        let sentinel = Sentinel::fixed("__DONE__");
        assert_eq!(sentinel.compose("echo hello"), "echo hello; echo __DONE__\n");
        assert_eq!(sentinel.compose("ls -la   "), "ls -la; echo __DONE__\n");
    }

    #[test]
    fn test_compose_after_separator() {
        let sentinel = Sentinel::fixed("__DONE__");
        assert_eq!(sentinel.compose("sleep 1 &"), "sleep 1 & echo __DONE__\n");
        assert_eq!(sentinel.compose("true;"), "true; echo __DONE__\n");
        assert_eq!(sentinel.compose("true &&"), "true &&; echo __DONE__\n");
        assert_eq!(sentinel.compose(""), "echo __DONE__\n");
    }

    #[test]
    fn test_classify_marker_line() {
        let sentinel = Sentinel::fixed("__DONE__");
        assert_eq!(sentinel.classify(b"__DONE__\n"), LineKind::End(b""));
        assert_eq!(sentinel.classify(b"  __DONE__  \r\n"), LineKind::End(b""));
    }

    #[test]
    fn test_classify_output_lines() {
        let sentinel = Sentinel::fixed("__DONE__");
        assert_eq!(sentinel.classify(b"hello\n"), LineKind::Output);
        assert_eq!(sentinel.classify(b"__DONE__ and more\n"), LineKind::Output);
        assert_eq!(sentinel.classify(b"\n"), LineKind::Output);
    }

    #[test]
    fn test_classify_unterminated_output() {
        let sentinel = Sentinel::fixed("__DONE__");
        assert_eq!(sentinel.classify(b"no newline__DONE__\n"), LineKind::End(b"no newline"));
    }
}
