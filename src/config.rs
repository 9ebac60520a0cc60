//! Editor configuration

use std::path::PathBuf;

/// Settings that stay fixed across the runs of one [`Editor`](crate::Editor)
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Directory holding the PDFium shared library; the usual locations are
    /// tried when unset
    pub pdfium_library_dir: Option<PathBuf>,
    /// Where context reports are written
    pub report_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pdfium_library_dir: std::env::var_os("PDFIUM_LIB_DIR").map(PathBuf::from),
            report_dir: PathBuf::from("."),
        }
    }
}

impl EditorConfig {
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_pdfium_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pdfium_library_dir = Some(dir.into());
        self
    }
}
