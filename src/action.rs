//! Actions that can be applied to matched text

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The operation selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Highlight matches
    Highlight,
    /// Black out matches and remove the text under them
    Redact,
    /// Underline matches
    Underline,
    /// Strike matches through
    Strikeout,
    /// Squiggly underline under matches
    Squiggly,
    /// Draw a red frame around every match
    Frame,
    /// Collect the lines around each match into a CSV report
    ExtractContext,
    /// Delete existing annotations
    Remove,
}

impl Action {
    /// Every action, in menu order
    pub const ALL: [Action; 8] = [
        Action::Highlight,
        Action::Redact,
        Action::Underline,
        Action::Strikeout,
        Action::Squiggly,
        Action::Frame,
        Action::ExtractContext,
        Action::Remove,
    ];

    /// Human-readable name, as shown in menus and logs
    pub fn label(self) -> &'static str {
        match self {
            Action::Highlight => "Highlight",
            Action::Redact => "Redact",
            Action::Underline => "Underline",
            Action::Strikeout => "Strikeout",
            Action::Squiggly => "Squiggly",
            Action::Frame => "Frame",
            Action::ExtractContext => "Extract Context",
            Action::Remove => "Remove",
        }
    }

    /// Whether the action needs a search term
    pub fn needs_search_term(self) -> bool {
        self != Action::Remove
    }

    /// Whether the action draws something and therefore needs a color
    pub fn needs_color(self) -> bool {
        !matches!(self, Action::Remove | Action::ExtractContext)
    }

    /// Whether the action writes the document back to disk
    pub fn modifies_document(self) -> bool {
        self != Action::ExtractContext
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Accepts labels ("Extract Context"), kebab-case and snake_case, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Action::ALL
            .into_iter()
            .find(|action| {
                action
                    .label()
                    .chars()
                    .filter(|c| *c != ' ')
                    .flat_map(char::to_lowercase)
                    .eq(normalized.chars())
            })
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Highlight", Action::Highlight)]
    #[case("redact", Action::Redact)]
    #[case("UNDERLINE", Action::Underline)]
    #[case("Strikeout", Action::Strikeout)]
    #[case("squiggly", Action::Squiggly)]
    #[case("Frame", Action::Frame)]
    #[case("Extract Context", Action::ExtractContext)]
    #[case("extract-context", Action::ExtractContext)]
    #[case("extract_context", Action::ExtractContext)]
    #[case(" Remove ", Action::Remove)]
    fn test_parse_action(#[case] input: &str, #[case] expected: Action) {
        assert_eq!(input.parse::<Action>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_action() {
        assert!("FreeText".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_label_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_requirements() {
        assert!(!Action::Remove.needs_search_term());
        assert!(Action::ExtractContext.needs_search_term());
        assert!(!Action::ExtractContext.needs_color());
        assert!(Action::Redact.needs_color());
        assert!(!Action::ExtractContext.modifies_document());
        assert!(Action::Remove.modifies_document());
    }
}
