//! Drawing on pages: text markup, frames, redaction and annotation removal

use crate::action::Action;
use crate::error::{Error, Result};
use pdfium_render::prelude::*;
use std::collections::HashSet;

/// Kind of text-markup annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupStyle {
    Highlight,
    Underline,
    Strikeout,
    Squiggly,
}

impl From<Action> for MarkupStyle {
    /// Anything that is not an underline-like action falls back to highlighting
    fn from(action: Action) -> Self {
        match action {
            Action::Underline => MarkupStyle::Underline,
            Action::Strikeout => MarkupStyle::Strikeout,
            Action::Squiggly => MarkupStyle::Squiggly,
            _ => MarkupStyle::Highlight,
        }
    }
}

fn pdfium_err(context: &str, err: PdfiumError) -> Error {
    Error::Pdfium {
        reason: format!("{}: {}", context, err),
    }
}

/// Bounding boxes of every occurrence of `needle` on the page.
///
/// Searches with PDFium's own (case-insensitive) text search, so it may find
/// occurrences the line matcher never reported.
pub fn locate(page: &PdfPage, needle: &str) -> Result<Vec<PdfRect>> {
    let text = match page.text() {
        Ok(text) => text,
        Err(_) => return Ok(Vec::new()),
    };

    let search = text
        .search(needle, &PdfSearchOptions::new())
        .map_err(|e| pdfium_err("Text search failed", e))?;

    let mut boxes = Vec::new();
    for segments in search.iter(PdfSearchDirection::SearchForward) {
        for segment in segments.iter() {
            boxes.push(segment.bounds());
        }
    }

    Ok(boxes)
}

/// Add one text-markup annotation covering every box of a matched string.
///
/// By default only the first matched string is annotated and the rest are
/// ignored; with `annotate_all` every distinct string gets its own
/// annotation. Returns the number of matches walked through.
pub fn apply_markup(
    page: &mut PdfPage,
    matches: &[String],
    style: MarkupStyle,
    color: PdfColor,
    annotate_all: bool,
) -> Result<usize> {
    let mut encountered = 0;
    let mut seen = HashSet::new();

    for needle in matches {
        encountered += 1;

        if seen.insert(needle.to_lowercase()) {
            let boxes = locate(page, needle)?;
            if !boxes.is_empty() {
                add_markup_annotation(page, &boxes, style, color)?;
            }
        }

        if !annotate_all {
            break;
        }
    }

    Ok(encountered)
}

fn add_markup_annotation(
    page: &mut PdfPage,
    boxes: &[PdfRect],
    style: MarkupStyle,
    color: PdfColor,
) -> Result<()> {
    let annotations = page.annotations_mut();
    let bounds = union(boxes);

    // Each markup type is its own struct; they share the same setup
    macro_rules! markup {
        ($create:ident) => {{
            let mut annotation = annotations
                .$create()
                .map_err(|e| pdfium_err("Failed to create annotation", e))?;
            for rect in boxes {
                annotation
                    .attachment_points_mut()
                    .create_attachment_point_at_end(PdfQuadPoints::from_rect(rect))
                    .map_err(|e| pdfium_err("Failed to add attachment point", e))?;
            }
            annotation
                .set_bounds(bounds)
                .map_err(|e| pdfium_err("Failed to set annotation bounds", e))?;
            annotation
                .set_stroke_color(color)
                .map_err(|e| pdfium_err("Failed to set annotation color", e))?;
        }};
    }

    match style {
        MarkupStyle::Highlight => markup!(create_highlight_annotation),
        MarkupStyle::Underline => markup!(create_underline_annotation),
        MarkupStyle::Strikeout => markup!(create_strikeout_annotation),
        MarkupStyle::Squiggly => markup!(create_squiggly_annotation),
    }

    Ok(())
}

/// Draw a red square annotation around every box of every matched string.
///
/// Returns the number of matches walked through.
pub fn frame_matches(page: &mut PdfPage, matches: &[String]) -> Result<usize> {
    let mut seen = HashSet::new();

    for needle in matches {
        if !seen.insert(needle.to_lowercase()) {
            continue;
        }

        for rect in locate(page, needle)? {
            let mut square = page
                .annotations_mut()
                .create_square_annotation()
                .map_err(|e| pdfium_err("Failed to create frame", e))?;
            square
                .set_bounds(rect)
                .map_err(|e| pdfium_err("Failed to set frame bounds", e))?;
            square
                .set_stroke_color(PdfColor::new(255, 0, 0, 255))
                .map_err(|e| pdfium_err("Failed to set frame color", e))?;
        }
    }

    Ok(matches.len())
}

/// Burn out every occurrence of the matched strings.
///
/// Characters whose centre falls inside a match box are removed from the
/// page content: each affected text object is replaced by new objects
/// holding only its surviving runs, placed at their original origins with
/// the same font, size and fill. A black rectangle is then painted over each
/// box. Text drawn inside form XObjects is not rewritten; it stays under the
/// black box and a warning is logged.
/// Returns the number of matches walked through.
pub fn redact_matches(page: &mut PdfPage, matches: &[String]) -> Result<usize> {
    let mut seen = HashSet::new();
    let mut boxes = Vec::new();

    for needle in matches {
        if seen.insert(needle.to_lowercase()) {
            boxes.extend(locate(page, needle)?);
        }
    }

    if boxes.is_empty() {
        return Ok(matches.len());
    }

    let rewrites = plan_rewrites(page, &boxes)?;

    let objects = page.objects_mut();
    for (index, runs) in rewrites.into_iter().rev() {
        {
            let object = objects
                .get(index)
                .map_err(|e| pdfium_err("Failed to read text object", e))?;

            if let Some(text_object) = object.as_text_object() {
                let font = text_object.font();
                let size = text_object.scaled_font_size();
                let fill = text_object.fill_color().ok();

                for run in &runs {
                    let mut replacement = objects
                        .create_text_object(
                            PdfPoints::new(run.x),
                            PdfPoints::new(run.y),
                            &run.text,
                            &font,
                            size,
                        )
                        .map_err(|e| pdfium_err("Failed to rewrite text object", e))?;
                    if let Some(fill) = fill {
                        replacement
                            .set_fill_color(fill)
                            .map_err(|e| pdfium_err("Failed to set text color", e))?;
                    }
                }
            }
        }

        objects
            .remove_object_at_index(index)
            .map_err(|e| pdfium_err("Failed to remove text object", e))?;
    }

    for rect in &boxes {
        objects
            .create_path_object_rect(*rect, None, None, Some(PdfColor::new(0, 0, 0, 255)))
            .map_err(|e| pdfium_err("Failed to draw redaction box", e))?;
    }

    tracing::debug!(boxes = boxes.len(), "Redacted regions on page");

    Ok(matches.len())
}

/// Text objects touched by `boxes`, each with the runs that survive it
fn plan_rewrites(
    page: &PdfPage,
    boxes: &[PdfRect],
) -> Result<Vec<(PdfPageObjectIndex, Vec<Run>)>> {
    let text = page
        .text()
        .map_err(|e| pdfium_err("Failed to read page text", e))?;

    let mut rewrites = Vec::new();
    let mut forms = Vec::new();

    for (index, object) in page.objects().iter().enumerate() {
        if object.object_type() == PdfPageObjectType::XObjectForm {
            if let Ok(bounds) = object.bounds() {
                forms.push(bounds.to_rect());
            }
            continue;
        }

        let Some(text_object) = object.as_text_object() else {
            continue;
        };
        let Ok(chars) = text.chars_for_object(text_object) else {
            continue;
        };

        let glyphs: Vec<Glyph> = chars
            .iter()
            .filter_map(|c| {
                let ch = c.unicode_char()?;
                let placement = match (c.loose_bounds(), c.origin()) {
                    (Ok(bounds), Ok((x, y))) => Some((bounds, x.value, y.value)),
                    _ => None,
                };
                Some(Glyph { ch, placement })
            })
            .collect();

        if let Some(runs) = surviving_runs(&glyphs, boxes) {
            rewrites.push((index, runs));
        }
    }

    let shielded = forms_overlapping(&forms, boxes);
    if shielded > 0 {
        tracing::warn!(
            forms = shielded,
            "Text inside form XObjects is covered but not removed"
        );
    }

    Ok(rewrites)
}

/// One character of a text object
#[derive(Debug, Clone, Copy)]
struct Glyph {
    ch: char,
    /// Loose bounds and baseline origin; absent for generated characters
    placement: Option<(PdfRect, f32, f32)>,
}

/// Consecutive characters left standing after redaction
#[derive(Debug, Clone, PartialEq)]
struct Run {
    x: f32,
    y: f32,
    text: String,
}

/// Split `glyphs` around the ones hit by `boxes`.
///
/// `None` when nothing is hit. Blank runs are dropped, so a fully redacted
/// object yields an empty list.
fn surviving_runs(glyphs: &[Glyph], boxes: &[PdfRect]) -> Option<Vec<Run>> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;
    let mut hit_any = false;

    for glyph in glyphs {
        let hit = glyph
            .placement
            .map_or(false, |(bounds, _, _)| centre_inside(&bounds, boxes));

        if hit {
            hit_any = true;
            runs.extend(current.take());
            continue;
        }

        match current.as_mut() {
            Some(run) => run.text.push(glyph.ch),
            None => {
                if let Some((_, x, y)) = glyph.placement {
                    current = Some(Run {
                        x,
                        y,
                        text: glyph.ch.to_string(),
                    });
                }
            }
        }
    }

    if !hit_any {
        return None;
    }

    runs.extend(current);
    runs.retain(|run| !run.text.trim().is_empty());
    Some(runs)
}

fn centre_inside(bounds: &PdfRect, boxes: &[PdfRect]) -> bool {
    let x = (bounds.left().value + bounds.right().value) / 2.0;
    let y = (bounds.bottom().value + bounds.top().value) / 2.0;

    boxes.iter().any(|rect| {
        rect.left().value <= x
            && x <= rect.right().value
            && rect.bottom().value <= y
            && y <= rect.top().value
    })
}

fn forms_overlapping(forms: &[PdfRect], boxes: &[PdfRect]) -> usize {
    forms
        .iter()
        .filter(|form| boxes.iter().any(|rect| overlaps(form, rect)))
        .count()
}

/// Delete the page's markup annotations, last to first.
///
/// Links and form widgets are left alone. Returns the number deleted.
pub fn remove_annotations(page: &mut PdfPage) -> Result<usize> {
    let annotations = page.annotations_mut();

    let handles: Vec<PdfPageAnnotationIndex> = annotations
        .iter()
        .enumerate()
        .filter(|(_, annotation)| is_markup(annotation.annotation_type()))
        .map(|(index, _)| index)
        .collect();

    let mut removed = 0;
    for index in handles.into_iter().rev() {
        let annotation = annotations
            .get(index)
            .map_err(|e| pdfium_err("Failed to read annotation", e))?;
        annotations
            .delete_annotation(annotation)
            .map_err(|e| pdfium_err("Failed to delete annotation", e))?;
        removed += 1;
    }

    Ok(removed)
}

/// Number of annotations that [`remove_annotations`] would delete
pub fn count_annotations(page: &PdfPage) -> usize {
    page.annotations()
        .iter()
        .filter(|annotation| is_markup(annotation.annotation_type()))
        .count()
}

fn is_markup(kind: PdfPageAnnotationType) -> bool {
    !matches!(
        kind,
        PdfPageAnnotationType::Link | PdfPageAnnotationType::Widget
    )
}

fn overlaps(a: &PdfRect, b: &PdfRect) -> bool {
    a.left().value < b.right().value
        && b.left().value < a.right().value
        && a.bottom().value < b.top().value
        && b.bottom().value < a.top().value
}

fn union(boxes: &[PdfRect]) -> PdfRect {
    let mut iter = boxes.iter();
    let Some(first) = iter.next() else {
        return PdfRect::new_from_values(0.0, 0.0, 0.0, 0.0);
    };

    iter.fold(*first, |acc, rect| {
        PdfRect::new_from_values(
            acc.bottom().value.min(rect.bottom().value),
            acc.left().value.min(rect.left().value),
            acc.top().value.max(rect.top().value),
            acc.right().value.max(rect.right().value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(bottom: f32, left: f32, top: f32, right: f32) -> PdfRect {
        PdfRect::new_from_values(bottom, left, top, right)
    }

    #[test]
    fn test_markup_style_from_action() {
        assert_eq!(MarkupStyle::from(Action::Underline), MarkupStyle::Underline);
        assert_eq!(MarkupStyle::from(Action::Squiggly), MarkupStyle::Squiggly);
        assert_eq!(MarkupStyle::from(Action::Highlight), MarkupStyle::Highlight);
        assert_eq!(MarkupStyle::from(Action::Frame), MarkupStyle::Highlight);
    }

    #[test]
    fn test_overlaps() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &rect(5.0, 5.0, 15.0, 15.0)));
        assert!(!overlaps(&a, &rect(20.0, 20.0, 30.0, 30.0)));
        // Touching edges do not count
        assert!(!overlaps(&a, &rect(0.0, 10.0, 10.0, 20.0)));
    }

    #[test]
    fn test_union() {
        let merged = union(&[rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 5.0, 30.0, 40.0)]);
        assert_eq!(merged.bottom().value, 0.0);
        assert_eq!(merged.left().value, 0.0);
        assert_eq!(merged.top().value, 30.0);
        assert_eq!(merged.right().value, 40.0);
    }

    fn glyphs(text: &str, x: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| {
                let left = x + 6.0 * i as f32;
                Glyph {
                    ch,
                    placement: Some((rect(758.0, left, 770.0, left + 6.0), left, 760.0)),
                }
            })
            .collect()
    }

    #[test]
    fn test_surviving_runs_keeps_neighbours() {
        // "1001" spans characters 15..19
        let line = glyphs("Invoice number 1001", 72.0);
        let hit = rect(757.0, 72.0 + 6.0 * 15.0, 771.0, 72.0 + 6.0 * 19.0);

        let runs = surviving_runs(&line, &[hit]).unwrap();
        assert_eq!(
            runs,
            vec![Run {
                x: 72.0,
                y: 760.0,
                text: "Invoice number ".to_string(),
            }]
        );
    }

    #[test]
    fn test_surviving_runs_splits_around_hit() {
        let line = glyphs("pay 1001 now", 0.0);
        let hit = rect(757.0, 24.0, 771.0, 48.0);

        let runs = surviving_runs(&line, &[hit]).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "pay ");
        assert_eq!(runs[1].text, " now");
        assert_eq!(runs[1].x, 48.0);
    }

    #[test]
    fn test_surviving_runs_untouched_object() {
        let line = glyphs("Receipt attached", 72.0);
        let elsewhere = rect(700.0, 72.0, 712.0, 200.0);
        assert_eq!(surviving_runs(&line, &[elsewhere]), None);
    }

    #[test]
    fn test_surviving_runs_fully_redacted() {
        let line = glyphs("1001", 0.0);
        let all = rect(757.0, 0.0, 771.0, 24.0);
        assert_eq!(surviving_runs(&line, &[all]), Some(vec![]));
    }

    #[test]
    fn test_unplaced_glyphs_are_never_hit() {
        let line = vec![Glyph {
            ch: 'x',
            placement: None,
        }];
        assert_eq!(surviving_runs(&line, &[rect(0.0, 0.0, 1000.0, 1000.0)]), None);
    }

    #[test]
    fn test_forms_overlapping() {
        let forms = [rect(0.0, 0.0, 100.0, 100.0), rect(500.0, 500.0, 600.0, 600.0)];
        assert_eq!(forms_overlapping(&forms, &[rect(50.0, 50.0, 60.0, 60.0)]), 1);
        assert_eq!(forms_overlapping(&forms, &[rect(200.0, 200.0, 210.0, 210.0)]), 0);
    }

    #[test]
    fn test_link_and_widget_are_not_markup() {
        assert!(!is_markup(PdfPageAnnotationType::Link));
        assert!(!is_markup(PdfPageAnnotationType::Widget));
        assert!(is_markup(PdfPageAnnotationType::Highlight));
        assert!(is_markup(PdfPageAnnotationType::Square));
    }
}
