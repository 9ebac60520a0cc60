//! Command-line arguments and their validation

use clap::{Parser, ValueEnum};
use pdf_annotator::context::{validate_context_size, ContextExtractor, DEFAULT_CONTEXT_SIZE};
use pdf_annotator::{
    Action, ColorChoice, EditRequest, EditorConfig, Error, PageSelection, Result, TermMatcher,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-annotator",
    version,
    about = "Search PDFs for a pattern and highlight, redact, or extract what it finds"
)]
pub struct Cli {
    /// File or folder to process
    #[arg(short, long = "input_path", visible_alias = "input-path", value_name = "PATH")]
    pub input_path: PathBuf,

    /// Redact, Frame, Highlight, Squiggly, Underline, Strikeout, Extract Context or Remove
    #[arg(short, long, default_value = "highlight", value_parser = parse_action)]
    pub action: Action,

    /// Pages to consider, 1-based (e.g. "1-3,5")
    #[arg(short, long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// Search pattern (regular expression, case-insensitive); repeat for several terms
    #[arg(short, long = "search_str", visible_alias = "search-str", value_name = "PATTERN")]
    pub search_str: Vec<String>,

    /// File with one search term per line
    #[arg(long = "terms-file", value_name = "FILE")]
    pub terms_file: Option<PathBuf>,

    /// Color name per term, cycled; "auto" uses the built-in palette
    #[arg(short, long, value_name = "COLOR")]
    pub color: Vec<String>,

    /// Output file (single-file input only); the input is overwritten when omitted
    #[arg(short, long = "output_file", visible_alias = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Process subfolders too (folder input only)
    #[arg(
        short,
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_flag
    )]
    pub recursive: Option<bool>,

    /// Lines of context around each hit, for Extract Context
    #[arg(
        long = "context_size",
        visible_alias = "context-size",
        default_value_t = DEFAULT_CONTEXT_SIZE,
        value_name = "N"
    )]
    pub context_size: usize,

    /// Annotate every distinct match on a page, not only the first
    #[arg(long = "all-matches")]
    pub all_matches: bool,

    /// File-name glob in folder mode (e.g. "report*.pdf")
    #[arg(long = "pattern", value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Folder for context reports
    #[arg(long = "report-dir", value_name = "DIR", default_value = ".")]
    pub report_dir: PathBuf,

    /// Folder containing the PDFium shared library
    #[arg(long = "pdfium-lib", env = "PDFIUM_LIB_DIR", value_name = "DIR")]
    pub pdfium_lib: Option<PathBuf>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything needed to run, checked and resolved
#[derive(Debug)]
pub struct Plan {
    pub config: EditorConfig,
    pub request: EditRequest,
    pub terms: Vec<String>,
    pub colors: ColorChoice,
    pub format: OutputFormat,
}

fn parse_action(value: &str) -> std::result::Result<Action, String> {
    value.parse()
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected true/false, got '{}'", other)),
    }
}

impl Cli {
    /// Validate the arguments and turn them into a runnable plan.
    ///
    /// Every search pattern is compiled here, so a bad one fails before any
    /// document is opened.
    pub fn into_plan(self) -> Result<Plan> {
        let input = &self.input_path;
        if !input.is_file() && !input.is_dir() {
            return Err(Error::InvalidPath {
                path: input.display().to_string(),
            });
        }

        if self.output_file.is_some() && !input.is_file() {
            return Err(Error::InvalidArgument {
                reason: "--output_file is only valid for a single input file".to_string(),
            });
        }
        if self.recursive.is_some() && !input.is_dir() {
            return Err(Error::InvalidArgument {
                reason: "--recursive is only valid for a folder input".to_string(),
            });
        }
        if self.file_pattern.is_some() && !input.is_dir() {
            return Err(Error::InvalidArgument {
                reason: "--pattern is only valid for a folder input".to_string(),
            });
        }

        let action = self.action;
        let terms = self.collect_terms()?;

        if action.needs_search_term() {
            if terms.iter().all(String::is_empty) {
                return Err(Error::InvalidArgument {
                    reason: format!("{} needs at least one non-empty search string", action),
                });
            }
            if action == Action::ExtractContext {
                validate_context_size(self.context_size)?;
            }
            for term in terms.iter().filter(|t| !t.is_empty()) {
                match action {
                    Action::ExtractContext => {
                        ContextExtractor::new(term, self.context_size)?;
                    }
                    _ => {
                        TermMatcher::new(term)?;
                    }
                }
            }
        }

        if action.needs_color() && self.color.is_empty() {
            return Err(Error::InvalidArgument {
                reason: format!("{} needs --color (a color name or \"auto\")", action),
            });
        }
        let colors = ColorChoice::from_names(&self.color)?;

        let pages = match &self.pages {
            Some(range) => PageSelection::parse(range)?,
            None => PageSelection::all(),
        };

        let mut request = EditRequest::new(self.input_path.clone(), action)
            .pages(pages)
            .recursive(self.recursive.unwrap_or(false))
            .context_size(self.context_size)
            .annotate_all(self.all_matches)
            .color(colors.color_for(0));
        request.output_file = self.output_file.clone();
        request.file_pattern = self.file_pattern.clone();

        let mut config = EditorConfig::default().with_report_dir(self.report_dir.clone());
        if let Some(dir) = &self.pdfium_lib {
            config = config.with_pdfium_library_dir(dir);
        }

        Ok(Plan {
            config,
            request,
            terms,
            colors,
            format: self.format,
        })
    }

    /// Terms from `-s` followed by the lines of `--terms-file`
    fn collect_terms(&self) -> Result<Vec<String>> {
        let mut terms = self.search_str.clone();

        if let Some(path) = &self.terms_file {
            let contents =
                std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
            terms.extend(contents.lines().map(str::to_string));
        }

        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::Path;

    fn fake_pdf(dir: &Path) -> PathBuf {
        let path = dir.join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["pdf-annotator"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let cli = parse(&["-i", file.to_str().unwrap(), "-s", "x", "-c", "yellow"]);

        assert_eq!(cli.action, Action::Highlight);
        assert_eq!(cli.context_size, 5);
        assert_eq!(cli.recursive, None);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.all_matches);
    }

    #[rstest]
    #[case("Extract Context", Action::ExtractContext)]
    #[case("extract-context", Action::ExtractContext)]
    #[case("Redact", Action::Redact)]
    #[case("squiggly", Action::Squiggly)]
    fn test_action_spellings(#[case] value: &str, #[case] expected: Action) {
        let cli = parse(&["-i", "x.pdf", "-a", value]);
        assert_eq!(cli.action, expected);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = Cli::try_parse_from(["pdf-annotator", "-i", "x.pdf", "-a", "FreeText"]);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(&["-r"], Some(true))]
    #[case(&["-r", "yes"], Some(true))]
    #[case(&["--recursive", "0"], Some(false))]
    #[case(&[], None)]
    fn test_recursive_values(#[case] extra: &[&str], #[case] expected: Option<bool>) {
        let mut args = vec!["-i", "docs", "-a", "remove"];
        args.extend_from_slice(extra);
        assert_eq!(parse(&args).recursive, expected);
    }

    #[test]
    fn test_plan_merges_terms_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let terms = dir.path().join("terms.txt");
        std::fs::write(&terms, "alpha\r\n\r\nbeta\n").unwrap();

        let plan = parse(&[
            "-i",
            file.to_str().unwrap(),
            "-s",
            "first",
            "--terms-file",
            terms.to_str().unwrap(),
            "-c",
            "auto",
        ])
        .into_plan()
        .unwrap();

        assert_eq!(plan.terms, vec!["first", "alpha", "", "beta"]);
        assert_eq!(plan.colors, ColorChoice::Palette);
    }

    #[test]
    fn test_color_required_for_markup() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let err = parse(&["-i", file.to_str().unwrap(), "-s", "x"])
            .into_plan()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_remove_needs_no_term_or_color() {
        let dir = tempfile::tempdir().unwrap();
        let plan = parse(&["-i", dir.path().to_str().unwrap(), "-a", "Remove", "-r"])
            .into_plan()
            .unwrap();
        assert!(plan.request.recursive);
        assert!(plan.terms.is_empty());
    }

    #[test]
    fn test_output_file_rejected_for_folder() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse(&[
            "-i",
            dir.path().to_str().unwrap(),
            "-a",
            "remove",
            "-o",
            "out.pdf",
        ])
        .into_plan()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_recursive_rejected_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let err = parse(&["-i", file.to_str().unwrap(), "-a", "remove", "-r"])
            .into_plan()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_bad_pattern_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let err = parse(&["-i", file.to_str().unwrap(), "-s", "(oops", "-c", "red"])
            .into_plan()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_context_size_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let err = parse(&[
            "-i",
            file.to_str().unwrap(),
            "-a",
            "Extract Context",
            "-s",
            "x",
            "--context_size",
            "21",
        ])
        .into_plan()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidContextSize { .. }));
    }

    #[test]
    fn test_missing_input() {
        let err = parse(&["-i", "/nonexistent/doc.pdf", "-a", "remove"])
            .into_plan()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_page_filter() {
        let dir = tempfile::tempdir().unwrap();
        let file = fake_pdf(dir.path());
        let plan = parse(&["-i", file.to_str().unwrap(), "-a", "remove", "-p", "2-3"])
            .into_plan()
            .unwrap();
        assert_eq!(plan.request.pages.indices(5), vec![1, 2]);
    }
}
