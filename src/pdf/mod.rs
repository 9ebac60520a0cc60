//! PDF processing layer
//!
//! All document access goes through PDFium: loading and saving, page text,
//! and the markup and redaction drawn on matched text.

mod document;
pub mod markup;

pub use document::{
    bind_pdfium, load_document, map_pdfium_error, page_text, read_pdf_bytes, save_document,
    DocumentInfo, PageSelection, PdfMetadataInfo,
};
pub use markup::{remove_annotations, MarkupStyle};
