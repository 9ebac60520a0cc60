//! File and folder orchestration
//!
//! An [`Editor`] owns one PDFium binding and applies an [`EditRequest`] to a
//! single file or to every PDF under a folder.

use crate::action::Action;
use crate::config::EditorConfig;
use crate::context::{validate_context_size, ContextExtractor, ContextHit, DEFAULT_CONTEXT_SIZE};
use crate::error::{Error, Result};
use crate::matcher::TermMatcher;
use crate::palette::{palette_color, ColorChoice, NamedColor};
use crate::pdf::markup::{apply_markup, frame_matches, redact_matches, remove_annotations};
use crate::pdf::{
    bind_pdfium, load_document, page_text, read_pdf_bytes, save_document, DocumentInfo,
    MarkupStyle, PageSelection,
};
use crate::report::{write_report, FileHits};
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Parameters of one run (one search term)
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// File or folder to process
    pub input_path: PathBuf,
    pub action: Action,
    /// Regex to search for; unused by [`Action::Remove`]
    pub search_str: Option<String>,
    pub color: NamedColor,
    pub pages: PageSelection,
    /// Where to save a single-file result; the input is overwritten when unset
    pub output_file: Option<PathBuf>,
    /// Descend into subfolders in folder mode
    pub recursive: bool,
    /// Lines of context on each side of a hit
    pub context_size: usize,
    /// Annotate every distinct match instead of stopping after the first
    pub annotate_all: bool,
    /// Glob on file names in folder mode (e.g. `report*.pdf`)
    pub file_pattern: Option<String>,
}

impl EditRequest {
    pub fn new(input_path: impl Into<PathBuf>, action: Action) -> Self {
        Self {
            input_path: input_path.into(),
            action,
            search_str: None,
            color: palette_color(0),
            pages: PageSelection::all(),
            output_file: None,
            recursive: false,
            context_size: DEFAULT_CONTEXT_SIZE,
            annotate_all: false,
            file_pattern: None,
        }
    }

    pub fn search_str(mut self, term: impl Into<String>) -> Self {
        self.search_str = Some(term.into());
        self
    }

    pub fn color(mut self, color: NamedColor) -> Self {
        self.color = color;
        self
    }

    pub fn pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    pub fn output_file(mut self, output: impl Into<PathBuf>) -> Self {
        self.output_file = Some(output.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn context_size(mut self, size: usize) -> Self {
        self.context_size = size;
        self
    }

    pub fn annotate_all(mut self, annotate_all: bool) -> Self {
        self.annotate_all = annotate_all;
        self
    }

    pub fn file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    /// Check the request without touching any document
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Error::InvalidPath {
                path: self.input_path.display().to_string(),
            });
        }

        if self.output_file.is_some() && !self.input_path.is_file() {
            return Err(Error::InvalidArgument {
                reason: "an output file can only be given for a single input file".to_string(),
            });
        }

        if self.action.needs_search_term()
            && self.search_str.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::InvalidArgument {
                reason: format!("{} needs a search string", self.action),
            });
        }

        if self.action == Action::ExtractContext {
            validate_context_size(self.context_size)?;
        }

        if let Some(pattern) = &self.file_pattern {
            glob::Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Result of processing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    /// Where the modified document was saved, if it was
    pub output: Option<String>,
    /// Matches found, or annotations removed for [`Action::Remove`]
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<ContextHit>,
}

/// Result of one run over a file or folder
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub action: Action,
    pub search_str: Option<String>,
    pub color: Option<&'static str>,
    pub files: Vec<FileOutcome>,
    pub total: usize,
    /// Context report path for [`Action::ExtractContext`]
    pub report: Option<String>,
}

/// What a run does to each page, compiled once up front
enum Operation {
    Markup(TermMatcher),
    Context(ContextExtractor),
    Remove,
}

/// Applies edit requests to PDFs through a single PDFium binding
pub struct Editor {
    config: EditorConfig,
    pdfium: Pdfium,
}

impl Editor {
    /// Bind PDFium according to `config`
    pub fn new(config: EditorConfig) -> Result<Self> {
        let pdfium = bind_pdfium(config.pdfium_library_dir.as_deref())?;
        Ok(Self { config, pdfium })
    }

    /// The underlying PDFium binding
    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }

    /// Run one request against its file or folder
    pub fn edit_pdfs(&self, request: &EditRequest) -> Result<RunOutcome> {
        request.validate()?;
        let operation = compile(request)?;

        let files = if request.input_path.is_dir() {
            self.process_folder(request, &operation)?
        } else {
            let output = request
                .output_file
                .clone()
                .unwrap_or_else(|| request.input_path.clone());
            vec![self.process_file(&request.input_path, &output, request, &operation)?]
        };

        let total = files.iter().map(|f| f.count).sum();

        let report = if request.action == Action::ExtractContext {
            let results: Vec<FileHits> = files
                .iter()
                .map(|f| FileHits {
                    filename: f.file.clone(),
                    hits: f.hits.clone(),
                })
                .collect();
            let path = write_report(
                &self.config.report_dir,
                request.search_str.as_deref().unwrap_or_default(),
                &request.input_path,
                &results,
            )?;
            Some(path.display().to_string())
        } else {
            None
        };

        Ok(RunOutcome {
            action: request.action,
            search_str: request.search_str.clone(),
            color: request.action.needs_color().then_some(request.color.name),
            files,
            total,
            report,
        })
    }

    /// Run `base` once per search term.
    ///
    /// Empty terms are skipped. The term at position `i` gets color `i` of
    /// `colors`. When a single-file run writes to an output file, later terms
    /// build on that output rather than on the original input.
    pub fn edit_terms(
        &self,
        base: &EditRequest,
        terms: &[String],
        colors: &ColorChoice,
    ) -> Result<Vec<RunOutcome>> {
        if !base.action.needs_search_term() {
            let request = EditRequest {
                search_str: None,
                ..base.clone()
            };
            return Ok(vec![self.edit_pdfs(&request)?]);
        }

        let mut request = base.clone();
        let mut outcomes = Vec::new();

        for (index, term) in terms.iter().enumerate() {
            if term.is_empty() {
                tracing::debug!(index, "Skipping empty search term");
                continue;
            }

            request.search_str = Some(term.clone());
            request.color = colors.color_for(index);
            outcomes.push(self.edit_pdfs(&request)?);

            if request.action.modifies_document() {
                if let Some(output) = request.output_file.take() {
                    request.input_path = output;
                }
            }
        }

        Ok(outcomes)
    }

    fn process_folder(&self, request: &EditRequest, operation: &Operation) -> Result<Vec<FileOutcome>> {
        let pattern = request
            .file_pattern
            .as_deref()
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| Error::InvalidPattern {
                pattern: request.file_pattern.clone().unwrap_or_default(),
                reason: e.to_string(),
            })?;

        let files = collect_pdfs(&request.input_path, request.recursive, pattern.as_ref())?;
        tracing::info!(
            folder = %request.input_path.display(),
            files = files.len(),
            recursive = request.recursive,
            "Processing folder"
        );

        files
            .iter()
            .map(|file| self.process_file(file, file, request, operation))
            .collect()
    }

    /// Apply the request to one file and save the result to `output`
    fn process_file(
        &self,
        input: &Path,
        output: &Path,
        request: &EditRequest,
        operation: &Operation,
    ) -> Result<FileOutcome> {
        let data = read_pdf_bytes(input)?;
        let document = load_document(&self.pdfium, &data)?;
        DocumentInfo::collect(input, &document).log();

        let pages = document.pages();
        let mut count = 0;
        let mut hits = Vec::new();

        for index in request.pages.indices(pages.len()) {
            let page_number = index as u32 + 1;
            let mut page = pages.get(index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", page_number, e),
            })?;

            match operation {
                Operation::Remove => {
                    count += remove_annotations(&mut page)?;
                }
                Operation::Context(extractor) => {
                    let page_hits = extractor.hits_for_page(page_number, &page_text(&page));
                    if !page_hits.is_empty() {
                        tracing::info!(page = page_number, hits = page_hits.len(), "Context found");
                    }
                    count += page_hits.len();
                    hits.extend(page_hits);
                }
                Operation::Markup(matcher) => {
                    let matches = matcher.find_in_page(&page_text(&page));
                    if matches.is_empty() {
                        continue;
                    }

                    count += match request.action {
                        Action::Redact => redact_matches(&mut page, &matches)?,
                        Action::Frame => frame_matches(&mut page, &matches)?,
                        action => apply_markup(
                            &mut page,
                            &matches,
                            MarkupStyle::from(action),
                            request.color.to_pdf_color(),
                            request.annotate_all,
                        )?,
                    };
                }
            }
        }

        match request.action {
            Action::Remove => {
                tracing::info!(file = %input.display(), removed = count, "Annotation(s) removed")
            }
            _ => tracing::info!(
                file = %input.display(),
                search_str = request.search_str.as_deref().unwrap_or_default(),
                matches = count,
                "Match(es) found"
            ),
        }

        let saved = if request.action.modifies_document() {
            save_document(&document, output)?;
            Some(output.display().to_string())
        } else {
            None
        };

        Ok(FileOutcome {
            file: input.display().to_string(),
            output: saved,
            count,
            hits,
        })
    }
}

fn compile(request: &EditRequest) -> Result<Operation> {
    let term = request.search_str.as_deref().unwrap_or_default();
    Ok(match request.action {
        Action::Remove => Operation::Remove,
        Action::ExtractContext => {
            Operation::Context(ContextExtractor::new(term, request.context_size)?)
        }
        _ => Operation::Markup(TermMatcher::new(term)?),
    })
}

/// PDF files under `dir`, sorted by path.
///
/// The extension check ignores case; `pattern` is matched against the file
/// name only. Unreadable subfolders are skipped.
pub fn collect_pdfs(
    dir: &Path,
    recursive: bool,
    pattern: Option<&glob::Pattern>,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, recursive, pattern, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(
    dir: &Path,
    recursive: bool,
    pattern: Option<&glob::Pattern>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::from_io(dir, e))?;

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        // Symlinked folders are not followed; symlinked files are kept
        if file_type.is_dir() {
            if recursive {
                if let Err(e) = walk(&path, recursive, pattern, files) {
                    tracing::warn!(dir = %path.display(), "Skipping folder: {}", e);
                }
            }
        } else if path.is_file() {
            let is_pdf = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }

            if let Some(pat) = pattern {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !pat.matches(&name) {
                    continue;
                }
            }

            files.push(path);
        }
    }

    Ok(())
}
