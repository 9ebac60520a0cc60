//! Context extraction: the lines surrounding each hit

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Smallest accepted context window
pub const MIN_CONTEXT_SIZE: usize = 1;
/// Largest accepted context window
pub const MAX_CONTEXT_SIZE: usize = 20;
/// Window used when none is given
pub const DEFAULT_CONTEXT_SIZE: usize = 5;

/// One excerpt around a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextHit {
    /// Page number (1-indexed)
    pub page: u32,
    /// Surrounding text with line breaks flattened to spaces
    pub excerpt: String,
}

/// Check a user-supplied window size
pub fn validate_context_size(size: usize) -> Result<usize> {
    if (MIN_CONTEXT_SIZE..=MAX_CONTEXT_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(Error::InvalidContextSize {
            size,
            min: MIN_CONTEXT_SIZE,
            max: MAX_CONTEXT_SIZE,
        })
    }
}

/// Regex that captures a hit together with up to `window` lines on either side
#[derive(Debug, Clone)]
pub struct ContextExtractor {
    regex: Regex,
}

impl ContextExtractor {
    /// Wrap `pattern` in a window of `window` lines before and after
    pub fn new(pattern: &str, window: usize) -> Result<Self> {
        // Up to `window` whole lines, the hit line, then up to `window` whole lines
        let source = format!(
            r"(?:[^\n]*\n){{0,{window}}}[^\n]*(?:{pattern})[^\n]*(?:\n[^\n]*){{0,{window}}}",
            window = window,
            pattern = pattern
        );

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { regex })
    }

    /// Raw (uncleaned) excerpts found in one page of text
    pub fn raw_excerpts<'t>(&self, page_text: &'t str) -> Vec<&'t str> {
        self.regex
            .find_iter(page_text)
            .map(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .collect()
    }

    /// Cleaned excerpts for one page of text
    pub fn excerpts(&self, page_text: &str) -> Vec<String> {
        let text = normalize_newlines(page_text);
        self.raw_excerpts(&text)
            .into_iter()
            .map(clean_excerpt)
            .collect()
    }

    /// Excerpts for one page, tagged with its 1-indexed page number
    pub fn hits_for_page(&self, page: u32, page_text: &str) -> Vec<ContextHit> {
        self.excerpts(page_text)
            .into_iter()
            .map(|excerpt| ContextHit { page, excerpt })
            .collect()
    }
}

/// Turn `\r\n` and lone `\r` into `\n`
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Join hyphenated line wraps, then flatten the remaining line breaks
pub fn clean_excerpt(raw: &str) -> String {
    raw.replace("-\n", "")
        .replace('\n', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_lines(count: usize, hit_at: usize) -> String {
        (0..count)
            .map(|i| {
                if i == hit_at {
                    format!("line {} NEEDLE here", i)
                } else {
                    format!("line {}", i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
            + "\n"
    }

    #[test]
    fn test_window_limits_lines() {
        let text = numbered_lines(20, 10);
        let extractor = ContextExtractor::new("needle", 2).unwrap();
        let excerpts = extractor.excerpts(&text);

        assert_eq!(
            excerpts,
            vec!["line 8 line 9 line 10 NEEDLE here line 11 line 12".to_string()]
        );
    }

    #[test]
    fn test_window_larger_than_page() {
        let text = "alpha\nNEEDLE\nomega\n";
        let extractor = ContextExtractor::new("needle", 10).unwrap();
        let excerpts = extractor.excerpts(text);
        assert_eq!(excerpts, vec!["alpha NEEDLE omega".to_string()]);
    }

    #[test]
    fn test_hyphenated_wraps_are_joined() {
        let text = "the trans-\nformation of NEEDLE in-\nto text\n";
        let extractor = ContextExtractor::new("needle", 3).unwrap();
        let excerpts = extractor.excerpts(text);
        assert_eq!(
            excerpts,
            vec!["the transformation of NEEDLE into text".to_string()]
        );
    }

    #[test]
    fn test_crlf_text() {
        let text = "first\r\nsecond NEEDLE\r\nthird\r\n";
        let extractor = ContextExtractor::new("needle", 1).unwrap();
        let excerpts = extractor.excerpts(text);
        assert_eq!(excerpts, vec!["first second NEEDLE third".to_string()]);
    }

    #[test]
    fn test_multiple_hits() {
        let text = numbered_lines(30, 3) + &numbered_lines(30, 25);
        let extractor = ContextExtractor::new("needle", 1).unwrap();
        assert_eq!(extractor.excerpts(&text).len(), 2);
    }

    #[test]
    fn test_no_hits() {
        let extractor = ContextExtractor::new("needle", 5).unwrap();
        assert!(extractor.excerpts("nothing to see\nhere\n").is_empty());
    }

    #[test]
    fn test_hits_for_page() {
        let extractor = ContextExtractor::new("needle", 1).unwrap();
        let hits = extractor.hits_for_page(3, "a\nneedle\nb\n");
        assert_eq!(
            hits,
            vec![ContextHit {
                page: 3,
                excerpt: "a needle b".to_string()
            }]
        );
    }

    #[test]
    fn test_alternation_stays_inside_window() {
        let text = "x\nfoo\ny\n";
        let extractor = ContextExtractor::new("foo|bar", 1).unwrap();
        assert_eq!(extractor.excerpts(text), vec!["x foo y".to_string()]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            ContextExtractor::new("[", 5),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_validate_context_size() {
        assert_eq!(validate_context_size(5).unwrap(), 5);
        assert!(validate_context_size(0).is_err());
        assert!(validate_context_size(21).is_err());
    }

    #[test]
    fn test_clean_excerpt() {
        assert_eq!(clean_excerpt("\nfoo-\nbar\nbaz\n"), "foobar baz");
    }
}
