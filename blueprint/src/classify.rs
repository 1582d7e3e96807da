// Distributed under the MIT License

//! Clasificador de páginas: puntuador heurístico sobre densidad de
//! líneas, regiones cerradas, palabras clave, relación de aspecto y
//! proporción de espacio en blanco.

use serde::{Deserialize, Serialize};

use crate::pdf::{PdfDocument, VectorPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    FloorPlan,
    Elevation,
    Section,
    Detail,
    Schedule,
    Title,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageClassification {
    pub kind: PageKind,
    pub confidence: f32,
    pub floor_label: Option<String>,
}

const FLOOR_PLAN_KEYWORDS: &[&str] = &["floor plan", "first floor", "second floor", "ground floor"];
const ELEVATION_KEYWORDS: &[&str] = &["elevation", "north elevation", "south elevation", "east elevation", "west elevation"];
const SECTION_KEYWORDS: &[&str] = &["section", "cross section", "building section"];
const SCHEDULE_KEYWORDS: &[&str] = &["schedule", "window schedule", "door schedule"];

const FLOOR_LABELS: &[(&str, &str)] = &[
    ("basement", "basement"),
    ("first floor", "first"),
    ("1st floor", "first"),
    ("second floor", "second"),
    ("2nd floor", "second"),
    ("third floor", "third"),
    ("3rd floor", "third"),
];

fn page_text_lower(doc: &PdfDocument, page_index: usize) -> String {
    doc.text_runs_for_page(page_index)
        .map(|t| t.text.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn count_keyword_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn line_density(doc: &PdfDocument, page_index: usize) -> (usize, usize) {
    let mut horizontal = 0usize;
    let mut vertical = 0usize;
    for entry in doc.vectors_for_page(page_index) {
        if let VectorPath::Line { p0, p1 } = entry.path {
            let dx = (p1.0 - p0.0).abs();
            let dy = (p1.1 - p0.1).abs();
            if dy <= dx * 0.15 {
                horizontal += 1;
            } else if dx <= dy * 0.15 {
                vertical += 1;
            }
        }
    }
    (horizontal, vertical)
}

fn closed_region_count(doc: &PdfDocument, page_index: usize) -> usize {
    doc.vectors_for_page(page_index)
        .filter(|e| matches!(e.path, VectorPath::Rectangle { .. }))
        .count()
}

fn white_space_ratio(doc: &PdfDocument, page_index: usize) -> f32 {
    let page = doc.pages().get(page_index);
    let area = page.map(|p| p.rect.width() * p.rect.height()).unwrap_or(1.0).max(1.0);
    let covered: f32 = doc
        .vectors_for_page(page_index)
        .filter_map(|e| match &e.path {
            VectorPath::Rectangle { rect } => Some(rect.width() * rect.height()),
            _ => None,
        })
        .sum();
    (1.0 - (covered / area).min(1.0)).max(0.0)
}

/// Clasifica una página: la probabilidad de
/// `floor-plan` debe alcanzar >= 0.6 para que gane esa etiqueta; las
/// palabras clave de elevación tienen prioridad salvo que las de planta sean
/// también fuertes, y sean más fuertes.
pub fn classify(doc: &PdfDocument, page_index: usize) -> PageClassification {
    let text = page_text_lower(doc, page_index);
    let (h_lines, v_lines) = line_density(doc, page_index);
    let regions = closed_region_count(doc, page_index);
    let ws_ratio = white_space_ratio(doc, page_index);

    let floor_kw = count_keyword_hits(&text, FLOOR_PLAN_KEYWORDS);
    let elevation_kw = count_keyword_hits(&text, ELEVATION_KEYWORDS);
    let section_kw = count_keyword_hits(&text, SECTION_KEYWORDS);
    let schedule_kw = count_keyword_hits(&text, SCHEDULE_KEYWORDS);

    // Componentes de la puntuación de "floor-plan": densidad de líneas
    // balanceada (ambas direcciones presentes), regiones cerradas (salas) y
    // palabras clave, penalizado por espacio en blanco excesivo (detalle) o
    // escaso (cartela/tabla).
    let line_balance = if h_lines > 0 && v_lines > 0 {
        (h_lines.min(v_lines) as f32 / h_lines.max(v_lines).max(1) as f32).min(1.0)
    } else {
        0.0
    };
    let region_score = (regions as f32 / 6.0).min(1.0);
    let keyword_score = if floor_kw > 0 { 1.0 } else { 0.0 };
    let ws_score = if (0.2..=0.8).contains(&ws_ratio) { 1.0 } else { 0.3 };

    let floor_plan_score =
        0.30 * line_balance + 0.30 * region_score + 0.30 * keyword_score + 0.10 * ws_score;

    let floor_label = FLOOR_LABELS
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, label)| label.to_string());

    let (kind, confidence) = if floor_plan_score >= 0.6 && elevation_kw <= floor_kw {
        (PageKind::FloorPlan, floor_plan_score.min(0.98))
    } else if elevation_kw > 0 {
        (PageKind::Elevation, (0.55 + 0.1 * elevation_kw as f32).min(0.95))
    } else if section_kw > 0 {
        (PageKind::Section, (0.55 + 0.1 * section_kw as f32).min(0.95))
    } else if schedule_kw > 0 {
        (PageKind::Schedule, (0.6 + 0.1 * schedule_kw as f32).min(0.95))
    } else if regions == 0 && h_lines + v_lines < 4 && text.len() < 40 {
        (PageKind::Title, 0.5)
    } else if floor_plan_score >= 0.4 {
        (PageKind::FloorPlan, floor_plan_score)
    } else {
        (PageKind::Other, 0.4)
    };

    PageClassification {
        kind,
        confidence,
        floor_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{PageImage, PageRect, TextRun, VectorEntry};

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> PageRect {
        PageRect { x0, y0, x1, y1 }
    }

    fn doc_with_floor_plan() -> PdfDocument {
        let page_rect = rect(0.0, 0.0, 1000.0, 800.0);
        let page = PageImage {
            page_index: 0,
            bytes: vec![],
            dpi: 150,
            long_side_px: 1600,
            rect: page_rect,
        };
        let text_runs = vec![TextRun {
            page_index: 0,
            text: "FIRST FLOOR PLAN".to_string(),
            rect: rect(10.0, 10.0, 150.0, 30.0),
        }];
        let mut vectors = vec![];
        for i in 0..10 {
            vectors.push(VectorEntry {
                page_index: 0,
                path: VectorPath::Line {
                    p0: (0.0, i as f32 * 50.0),
                    p1: (500.0, i as f32 * 50.0),
                },
            });
            vectors.push(VectorEntry {
                page_index: 0,
                path: VectorPath::Line {
                    p0: (i as f32 * 50.0, 0.0),
                    p1: (i as f32 * 50.0, 500.0),
                },
            });
        }
        for i in 0..8 {
            vectors.push(VectorEntry {
                page_index: 0,
                path: VectorPath::Rectangle {
                    rect: rect(i as f32 * 60.0, 0.0, i as f32 * 60.0 + 50.0, 100.0),
                },
            });
        }
        PdfDocument::from_parts(1024, vec![page], text_runs, vectors).unwrap()
    }

    #[test]
    fn classifies_floor_plan_with_high_confidence() {
        let doc = doc_with_floor_plan();
        let result = classify(&doc, 0);
        assert_eq!(result.kind, PageKind::FloorPlan);
        assert!(result.confidence >= 0.6);
        assert_eq!(result.floor_label.as_deref(), Some("first"));
    }

    #[test]
    fn classifies_elevation_from_keywords() {
        let page = PageImage {
            page_index: 0,
            bytes: vec![],
            dpi: 150,
            long_side_px: 1600,
            rect: rect(0.0, 0.0, 1000.0, 800.0),
        };
        let text_runs = vec![TextRun {
            page_index: 0,
            text: "NORTH ELEVATION".to_string(),
            rect: rect(10.0, 10.0, 150.0, 30.0),
        }];
        let doc = PdfDocument::from_parts(1024, vec![page], text_runs, vec![]).unwrap();
        let result = classify(&doc, 0);
        assert_eq!(result.kind, PageKind::Elevation);
    }
}
