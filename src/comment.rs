use serde::Deserialize;

/// Leading documentation attached to a schema element, as extracted by the
/// descriptor compiler (comment markers already stripped, one entry per line).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Render the comment as Go line comments, one `//` line per source line.
    ///
    /// The text is reproduced verbatim; only a single trailing newline is dropped.
    pub fn go_lines(&self) -> impl Iterator<Item = String> + '_ {
        let text = self.text.strip_suffix('\n').unwrap_or(&self.text);
        text.split('\n').map(|line| format!("//{}", line))
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_lines() {
        let comment = Comment::new(" Say echoes the request.\n Second line.\n");
        assert_eq!(
            comment.go_lines().collect::<Vec<_>>(),
            vec!["// Say echoes the request.", "// Second line."]
        );
    }

    #[test]
    fn test_go_lines_verbatim() {
        let comment = Comment::new("no space\n\n  indented */");
        assert_eq!(
            comment.go_lines().collect::<Vec<_>>(),
            vec!["//no space", "//", "//  indented */"]
        );
    }
}
