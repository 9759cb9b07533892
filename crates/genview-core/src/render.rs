//! Minimal render tree produced by components.
//!
//! The engine turns these nodes into its own widgets; the core only needs
//! enough structure to express "loading", "fallback" and plain content.

/// A node of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// Render nothing.
    Empty,
    /// A line of text.
    Text(String),
    /// Neutral placeholder shown while data is not available.
    Placeholder(String),
    /// Error indicator shown instead of content.
    Fallback(String),
    /// A titled group of children.
    Section {
        title: Option<String>,
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn section(title: impl Into<String>, children: Vec<RenderNode>) -> Self {
        Self::Section {
            title: Some(title.into()),
            children,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Flatten to text, one node per line.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        lines.join("\n")
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.to_plain_text().contains(needle)
    }

    fn collect_lines(&self, lines: &mut Vec<String>) {
        match self {
            Self::Empty => {}
            Self::Text(s) | Self::Placeholder(s) | Self::Fallback(s) => lines.push(s.clone()),
            Self::Section { title, children } => {
                if let Some(title) = title {
                    lines.push(title.clone());
                }
                for child in children {
                    child.collect_lines(lines);
                }
            }
        }
    }
}
