//! Opening, inspecting and saving documents through PDFium

use crate::error::{Error, Result};
use pdfium_render::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Bind to the PDFium library.
///
/// Looks in `library_dir` first when given, then the working directory,
/// `/opt/pdfium/lib`, and finally the system library path.
pub fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .or_else(|e| {
                tracing::warn!(dir = %dir.display(), "PDFium not found in configured directory: {}", e);
                default_bindings()
            }),
        None => default_bindings(),
    }
    .map_err(|e| Error::Pdfium {
        reason: format!("Failed to initialize PDFium: {}", e),
    })?;

    Ok(Pdfium::new(bindings))
}

fn default_bindings() -> std::result::Result<Box<dyn PdfiumLibraryBindings>, PdfiumError> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
}

/// Read a PDF file into memory, checking the header.
///
/// The bytes are owned by the caller so the file itself is closed before
/// any output is written over it.
pub fn read_pdf_bytes(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;

    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: format!("{} is not a valid PDF file", path.display()),
        });
    }

    Ok(data)
}

/// Load a document from bytes previously read with [`read_pdf_bytes`]
pub fn load_document<'a>(pdfium: &'a Pdfium, data: &'a [u8]) -> Result<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(map_pdfium_error)
}

/// Serialize `document` and write it to `output`, replacing any existing file
pub fn save_document(document: &PdfDocument, output: &Path) -> Result<()> {
    let bytes = document.save_to_bytes().map_err(|e| Error::Pdfium {
        reason: format!("Failed to save {}: {}", output.display(), e),
    })?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
        }
    }

    std::fs::write(output, bytes).map_err(|e| Error::from_io(output, e))
}

/// Map PDFium errors to our error type
pub fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// PDF metadata
#[derive(Debug, Clone, Default)]
pub struct PdfMetadataInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// What gets logged about a file before it is processed
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub file: String,
    pub encrypted: bool,
    pub page_count: u32,
    /// Absent for encrypted documents
    pub metadata: Option<PdfMetadataInfo>,
}

impl DocumentInfo {
    /// Collect file information; metadata is skipped for encrypted documents
    pub fn collect(path: &Path, document: &PdfDocument) -> Self {
        let encrypted = is_encrypted(document);
        let metadata = if encrypted {
            None
        } else {
            Some(extract_metadata(document))
        };

        Self {
            file: path.display().to_string(),
            encrypted,
            page_count: document.pages().len() as u32,
            metadata,
        }
    }

    /// Write the information to the log
    pub fn log(&self) {
        tracing::info!(
            file = %self.file,
            encrypted = self.encrypted,
            pages = self.page_count,
            "File information"
        );
        if let Some(meta) = &self.metadata {
            let fields = [
                ("title", &meta.title),
                ("author", &meta.author),
                ("subject", &meta.subject),
                ("keywords", &meta.keywords),
                ("creator", &meta.creator),
                ("producer", &meta.producer),
                ("creation_date", &meta.creation_date),
                ("modification_date", &meta.modification_date),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    tracing::info!(file = %self.file, "{}: {}", key, value);
                }
            }
        }
    }
}

fn is_encrypted(document: &PdfDocument) -> bool {
    !matches!(
        document.permissions().security_handler_revision(),
        Ok(PdfSecurityHandlerRevision::Unprotected)
    )
}

fn extract_metadata(document: &PdfDocument) -> PdfMetadataInfo {
    let meta = document.metadata();
    let tag = |kind| {
        meta.get(kind)
            .map(|t| t.value().to_string())
            .filter(|v| !v.is_empty())
    };

    PdfMetadataInfo {
        title: tag(PdfDocumentMetadataTagType::Title),
        author: tag(PdfDocumentMetadataTagType::Author),
        subject: tag(PdfDocumentMetadataTagType::Subject),
        keywords: tag(PdfDocumentMetadataTagType::Keywords),
        creator: tag(PdfDocumentMetadataTagType::Creator),
        producer: tag(PdfDocumentMetadataTagType::Producer),
        creation_date: tag(PdfDocumentMetadataTagType::CreationDate),
        modification_date: tag(PdfDocumentMetadataTagType::ModificationDate),
    }
}

/// Plain text of a page, or an empty string when the page has no text layer
pub fn page_text(page: &PdfPage) -> String {
    match page.text() {
        Ok(text) => text.all(),
        Err(_) => String::new(),
    }
}

/// Which pages of a document to process.
///
/// Parsed from 1-indexed ranges such as `"1-5,10"`; stored as 0-indexed
/// page indices. Pages past the end of a given document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    /// `None` selects every page
    indices: Option<BTreeSet<u16>>,
}

impl PageSelection {
    /// Every page
    pub fn all() -> Self {
        Self { indices: None }
    }

    /// Parse page range string (e.g., "1-5,10,15-20")
    pub fn parse(range: &str) -> Result<Self> {
        let invalid = || Error::InvalidPageRange {
            range: range.to_string(),
        };

        let mut indices = BTreeSet::new();

        for part in range.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                let start: u16 = start.trim().parse().map_err(|_| invalid())?;
                let end: u16 = end.trim().parse().map_err(|_| invalid())?;

                if start < 1 || start > end {
                    return Err(invalid());
                }

                indices.extend((start - 1)..end);
            } else {
                let page: u16 = part.parse().map_err(|_| invalid())?;

                if page < 1 {
                    return Err(invalid());
                }

                indices.insert(page - 1);
            }
        }

        if indices.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            indices: Some(indices),
        })
    }

    /// Whether the 0-indexed page is selected
    pub fn contains(&self, index: u16) -> bool {
        self.indices
            .as_ref()
            .map_or(true, |set| set.contains(&index))
    }

    /// Selected 0-indexed pages of a document with `page_count` pages
    pub fn indices(&self, page_count: u16) -> Vec<u16> {
        (0..page_count).filter(|&i| self.contains(i)).collect()
    }
}
