//! PDF Annotator Library
//!
//! Searches PDF documents for a regular expression and acts on what it finds:
//! - highlight, underline, strike out, squiggle or frame the matches
//! - redact them (the text is removed from the page, not just covered)
//! - strip existing annotations
//! - extract the lines around each match into a CSV report
//!
//! Work is driven through an [`Editor`], which applies an [`EditRequest`] to
//! a single file or to every PDF in a folder.

pub mod action;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod matcher;
pub mod palette;
pub mod pdf;
pub mod report;

pub use action::Action;
pub use config::EditorConfig;
pub use editor::{collect_pdfs, EditRequest, Editor, FileOutcome, RunOutcome};
pub use error::{Error, ErrorKind, Result};
pub use matcher::TermMatcher;
pub use palette::{ColorChoice, NamedColor, PALETTE};
pub use pdf::PageSelection;
