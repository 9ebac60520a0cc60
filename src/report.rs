//! CSV reports for context extraction

use crate::context::ContextHit;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One line of a context report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub filename: String,
    pub search_str: String,
    pub page: u32,
    pub excerpt: String,
}

/// Hits found in one file
#[derive(Debug, Clone, Serialize)]
pub struct FileHits {
    pub filename: String,
    pub hits: Vec<ContextHit>,
}

/// Flatten per-file hits into rows, tagging each with the search term
pub fn flatten(search_str: &str, results: &[FileHits]) -> Vec<ReportRow> {
    results
        .iter()
        .flat_map(|file| {
            file.hits.iter().map(move |hit| ReportRow {
                filename: file.filename.clone(),
                search_str: search_str.to_string(),
                page: hit.page,
                excerpt: hit.excerpt.clone(),
            })
        })
        .collect()
}

/// `search_context_<term>_<last path component>.csv`, with path separators
/// replaced by `_`
pub fn report_file_name(search_str: &str, input_path: &Path) -> String {
    let base = input_path
        .components()
        .last()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default();

    format!(
        "search_context_{}_{}.csv",
        sanitize(search_str),
        sanitize(&base)
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// Write the report for one term into `report_dir`, replacing any existing
/// file. The header is written even when there are no rows.
pub fn write_report(
    report_dir: &Path,
    search_str: &str,
    input_path: &Path,
    results: &[FileHits],
) -> Result<PathBuf> {
    let path = report_dir.join(report_file_name(search_str, input_path));
    let rows = flatten(search_str, results);

    let file = File::create(&path).map_err(|e| Error::from_io(&path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(["filename", "search_str", "page", "excerpt"])?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| Error::from_io(&path, e))?;

    tracing::info!(
        report = %path.display(),
        rows = rows.len(),
        "Context report written"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<FileHits> {
        vec![
            FileHits {
                filename: "a.pdf".to_string(),
                hits: vec![
                    ContextHit {
                        page: 1,
                        excerpt: "first hit".to_string(),
                    },
                    ContextHit {
                        page: 3,
                        excerpt: "second, with comma".to_string(),
                    },
                ],
            },
            FileHits {
                filename: "b.pdf".to_string(),
                hits: vec![],
            },
        ]
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("invoice", Path::new("/data/docs/report.pdf")),
            "search_context_invoice_report.pdf.csv"
        );
        assert_eq!(
            report_file_name("a/b", Path::new("/data/folder")),
            "search_context_a_b_folder.csv"
        );
    }

    #[test]
    fn test_report_file_name_uses_last_component() {
        assert_eq!(
            report_file_name("x", Path::new(".")),
            "search_context_x_..csv"
        );
        assert_eq!(
            report_file_name("x", Path::new("docs/")),
            "search_context_x_docs.csv"
        );
        assert_eq!(
            report_file_name("x", Path::new("../reports")),
            "search_context_x_reports.csv"
        );
    }

    #[test]
    fn test_flatten_injects_term() {
        let rows = flatten("hit", &sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            ReportRow {
                filename: "a.pdf".to_string(),
                search_str: "hit".to_string(),
                page: 3,
                excerpt: "second, with comma".to_string(),
            }
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "hit", Path::new("docs"), &sample()).unwrap();
        assert_eq!(path, dir.path().join("search_context_hit_docs.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(headers, vec!["filename", "search_str", "page", "excerpt"]);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][3], "second, with comma");
    }

    #[test]
    fn test_write_empty_report_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "none", Path::new("x.pdf"), &[]).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "filename,search_str,page,excerpt\n");
    }

    #[test]
    fn test_write_report_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(report_file_name("hit", Path::new("docs")));
        std::fs::write(&target, "stale").unwrap();

        write_report(dir.path(), "hit", Path::new("docs"), &sample()).unwrap();
        let contents = std::fs::read_to_string(target).unwrap();
        assert!(contents.starts_with("filename,"));
    }
}
