//! Inline emphasis markup for terminal messages.
//!
//! Messages carry lightweight markers that are rendered as ANSI styles when
//! writing to a terminal and removed otherwise:
//!
//! | Marker | Style |
//! |---|---|
//! | `^^text^^` | green |
//! | `!!text!!` | red |
//! | `***text***`, `**text**` | bold |
//! | `###text###` | dim |
//! | `~~text~~` | cyan |

use crossterm::style::Stylize;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy)]
enum Emphasis {
    Success,
    Danger,
    Strong,
    Muted,
    Accent,
}

impl Emphasis {
    fn apply(self, text: &str) -> String {
        match self {
            Self::Success => text.green().to_string(),
            Self::Danger => text.red().to_string(),
            Self::Strong => text.bold().to_string(),
            Self::Muted => text.dim().to_string(),
            Self::Accent => text.cyan().to_string(),
        }
    }
}

/// Marker patterns, longest delimiters first so `***` wins over `**`.
static MARKERS: Lazy<Vec<(Regex, Emphasis)>> = Lazy::new(|| {
    [
        (r"(?s)\^\^(.+?)\^\^", Emphasis::Success),
        (r"(?s)!!(.+?)!!", Emphasis::Danger),
        (r"(?s)\*\*\*(.+?)\*\*\*", Emphasis::Strong),
        (r"(?s)\*\*(.+?)\*\*", Emphasis::Strong),
        (r"(?s)###(.+?)###", Emphasis::Muted),
        (r"(?s)~~(.+?)~~", Emphasis::Accent),
    ]
    .into_iter()
    .map(|(pattern, emphasis)| (Regex::new(pattern).expect("markup regex should compile"), emphasis))
    .collect()
});

/// Render markup, styling marked spans when `styled` is true and dropping the
/// markers either way.
pub fn render(text: &str, styled: bool) -> String {
    MARKERS.iter().fold(text.to_string(), |current, (pattern, emphasis)| {
        pattern
            .replace_all(&current, |captures: &regex::Captures| {
                let inner = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                if styled { emphasis.apply(inner) } else { inner.to_string() }
            })
            .into_owned()
    })
}

/// Remove every marker, keeping the marked text.
pub fn strip(text: &str) -> String {
    render(text, false)
}
