//! Line-by-line regex matching over extracted page text

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};

/// A compiled search term.
///
/// The term is used as a raw regular expression: characters such as `(` or
/// `.` keep their regex meaning. Matching ignores case.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
}

impl TermMatcher {
    /// Compile `pattern` as a case-insensitive regex
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { regex })
    }

    /// Yield every non-overlapping match in every line, in reading order.
    ///
    /// Only the matched text is returned, not its position: callers re-locate
    /// it on the page themselves.
    pub fn find_in_lines<'t, I>(&'t self, lines: I) -> impl Iterator<Item = &'t str> + 't
    where
        I: IntoIterator<Item = &'t str>,
        I::IntoIter: 't,
    {
        lines
            .into_iter()
            .flat_map(move |line| self.regex.find_iter(line).map(|m| m.as_str()))
            .filter(|m| !m.is_empty())
    }

    /// Matches in a whole page of text, split on line breaks
    pub fn find_in_page(&self, page_text: &str) -> Vec<String> {
        self.find_in_lines(page_text.lines())
            .map(str::to_string)
            .collect()
    }
}
