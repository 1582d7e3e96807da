// Distributed under the MIT License

//! Extractor de envolvente: patrones de texto
//! para `R-<n>`, `U-<n.nn>`, ACH50 y menciones de SIP/ICF/aislamiento
//! continuo.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pdf::PdfDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeHitKind {
    WallR,
    RoofR,
    FloorR,
    WindowU,
    Ach50,
    ContinuousInsulation,
    SipOrIcf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeHit {
    pub kind: EnvelopeHitKind,
    pub value: f32,
    pub page_index: usize,
    pub confidence: f32,
    pub raw_text: String,
}

static R_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)R-?\s*(\d{1,3}(?:\.\d+)?)").unwrap());
static U_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)U-?\s*(0?\.\d{1,3})").unwrap());
static ACH50_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}(?:\.\d+)?)\s*ACH\s*(?:@|at)?\s*50").unwrap());
static SIP_ICF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(SIP|ICF)\b").unwrap());
static CONTINUOUS_INSULATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)continuous insulation|\bci\b|R-?\d+\s*\+\s*\d+\s*ci").unwrap());

/// Contexto textual usado para decidir si un acierto de `R-<n>` se refiere a
/// muro, cubierta o suelo.
fn guess_wall_roof_floor(context: &str) -> Option<EnvelopeHitKind> {
    let lower = context.to_ascii_lowercase();
    if lower.contains("roof") || lower.contains("ceiling") || lower.contains("attic") {
        Some(EnvelopeHitKind::RoofR)
    } else if lower.contains("floor") || lower.contains("crawl") || lower.contains("slab") {
        Some(EnvelopeHitKind::FloorR)
    } else if lower.contains("wall") {
        Some(EnvelopeHitKind::WallR)
    } else {
        None
    }
}

/// Recorre el texto de todas las páginas buscando menciones de R-value,
/// U-value, ACH50 y construcción SIP/ICF/aislamiento continuo, con una
/// confianza en [0.7, 0.9] según la claridad del contexto.
pub fn extract_envelope_hits(doc: &PdfDocument) -> Vec<EnvelopeHit> {
    let mut hits = Vec::new();

    for page_index in 0..doc.page_count {
        for run in doc.text_runs_for_page(page_index) {
            let text = &run.text;

            if let Some(caps) = R_VALUE_RE.captures(text) {
                if let Ok(value) = caps[1].parse::<f32>() {
                    let kind = guess_wall_roof_floor(text).unwrap_or(EnvelopeHitKind::WallR);
                    let confidence = if guess_wall_roof_floor(text).is_some() { 0.9 } else { 0.7 };
                    hits.push(EnvelopeHit {
                        kind,
                        value,
                        page_index,
                        confidence,
                        raw_text: text.clone(),
                    });
                }
            }

            if let Some(caps) = U_VALUE_RE.captures(text) {
                if let Ok(value) = caps[1].parse::<f32>() {
                    hits.push(EnvelopeHit {
                        kind: EnvelopeHitKind::WindowU,
                        value,
                        page_index,
                        confidence: 0.8,
                        raw_text: text.clone(),
                    });
                }
            }

            if let Some(caps) = ACH50_RE.captures(text) {
                if let Ok(value) = caps[1].parse::<f32>() {
                    hits.push(EnvelopeHit {
                        kind: EnvelopeHitKind::Ach50,
                        value,
                        page_index,
                        confidence: 0.85,
                        raw_text: text.clone(),
                    });
                }
            }

            if SIP_ICF_RE.is_match(text) {
                hits.push(EnvelopeHit {
                    kind: EnvelopeHitKind::SipOrIcf,
                    value: 0.0,
                    page_index,
                    confidence: 0.75,
                    raw_text: text.clone(),
                });
            }

            if CONTINUOUS_INSULATION_RE.is_match(text) {
                hits.push(EnvelopeHit {
                    kind: EnvelopeHitKind::ContinuousInsulation,
                    value: 0.0,
                    page_index,
                    confidence: 0.7,
                    raw_text: text.clone(),
                });
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{PageImage, PageRect, PdfDocument, TextRun};

    fn doc_with_text(texts: &[&str]) -> PdfDocument {
        let page = PageImage {
            page_index: 0,
            bytes: vec![],
            dpi: 150,
            long_side_px: 1600,
            rect: PageRect { x0: 0.0, y0: 0.0, x1: 1000.0, y1: 800.0 },
        };
        let runs = texts
            .iter()
            .map(|t| TextRun {
                page_index: 0,
                text: t.to_string(),
                rect: PageRect { x0: 0.0, y0: 0.0, x1: 10.0, y1: 10.0 },
            })
            .collect();
        PdfDocument::from_parts(1024, vec![page], runs, vec![]).unwrap()
    }

    #[test]
    fn finds_wall_r_value() {
        let doc = doc_with_text(&["Exterior wall: R-21 batt insulation"]);
        let hits = extract_envelope_hits(&doc);
        assert!(hits.iter().any(|h| h.kind == EnvelopeHitKind::WallR && h.value == 21.0));
    }

    #[test]
    fn finds_ach50() {
        let doc = doc_with_text(&["Blower door test result: 3.5 ACH @ 50"]);
        let hits = extract_envelope_hits(&doc);
        assert!(hits.iter().any(|h| h.kind == EnvelopeHitKind::Ach50 && (h.value - 3.5).abs() < 0.01));
    }

    #[test]
    fn finds_window_u_value() {
        let doc = doc_with_text(&["Windows: U-0.30 Low-E"]);
        let hits = extract_envelope_hits(&doc);
        assert!(hits.iter().any(|h| h.kind == EnvelopeHitKind::WindowU));
    }
}
