// Distributed under the MIT License

//! Estimador de escala: tres métodos independientes, cada uno con su
//! propia confianza, y una selección que falla alto (`NeedsInput`) cuando
//! ninguno es suficientemente fiable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pdf::{PageRect, PdfDocument, VectorPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMethod {
    Text,
    DimensionFit,
    RoomValidation,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub pixels_per_foot: f32,
    pub notation: Option<String>,
    pub confidence: f32,
    pub method: ScaleMethod,
    pub variance_percent: f32,
}

/// Una alternativa de escala descartada, conservada para que `NeedsInput`
/// pueda ofrecer una recomendación accionable al usuario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleAlternative {
    pub pixels_per_foot: f32,
    pub confidence: f32,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScaleOutcome {
    Selected(Scale),
    NeedsInput { alternatives: Vec<ScaleAlternative> },
}

/// Error fatal de varianza: el ajuste de dimensiones por mínimos cuadrados
/// supera el 5% permitido y no hay una alternativa fiable.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("varianza del ajuste de escala {0:.2}% supera el límite de 5%")]
pub struct ScaleVarianceTooHigh(pub f32);

static SCALE_NOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\d+)\s*/\s*(\d+)\s*"\s*=\s*1\s*'\s*-?\s*0?\s*"?|1\s*:\s*(\d+(?:\.\d+)?)"#)
        .expect("scale notation regex")
});

static DIMENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\d+)\s*'\s*-?\s*(\d+(?:\.\d+)?)?\s*"?|(\d+(?:\.\d+)?)\s*[xX]\s*(\d+(?:\.\d+)?)|(\d+\.\d+)\s*ft"#)
        .expect("dimension regex")
});

/// Analiza una cadena de notación de escala arquitectónica tipo
/// `1/4"=1'-0"` o métrica `1:N` y devuelve píxeles por pie asumiendo 1
/// unidad de página == 1 pulgada física (coherente con el DPI del raster).
fn notation_to_px_per_ft(captures: &regex::Captures, dpi: f32) -> Option<(f32, String)> {
    if let (Some(num), Some(den)) = (captures.get(1), captures.get(2)) {
        let num: f32 = num.as_str().parse().ok()?;
        let den: f32 = den.as_str().parse().ok()?;
        let inches_per_foot = num / den;
        let px_per_inch = dpi;
        let px_per_ft = inches_per_foot * px_per_inch;
        return Some((px_per_ft, format!("{}/{}\"=1'-0\"", num as i32, den as i32)));
    }
    if let Some(ratio) = captures.get(3) {
        let n: f32 = ratio.as_str().parse().ok()?;
        // 1:N, N en las mismas unidades de plano (metros); 1 pie = 0.3048 m.
        let px_per_meter = dpi / 0.0254;
        let px_per_ft = px_per_meter * 0.3048 / n;
        return Some((px_per_ft, format!("1:{}", n as i32)));
    }
    None
}

/// Método 1: notación de escala en texto. Prioriza coincidencias cerca de
/// la cartela (inferior-derecha) y sube la confianza si va acompañada de la
/// palabra "SCALE".
pub fn estimate_from_text(doc: &PdfDocument, page_index: usize) -> Option<(Scale, String)> {
    let page = doc.pages().get(page_index)?;
    let mut best: Option<(Scale, String, bool)> = None;

    for run in doc.text_runs_for_page(page_index) {
        if let Some(caps) = SCALE_NOTATION_RE.captures(&run.text) {
            if let Some((px_per_ft, notation)) = notation_to_px_per_ft(&caps, page.dpi as f32) {
                let in_title_block = page.rect.is_in_title_block(run.rect.x0, run.rect.y0);
                let has_keyword = run.text.to_ascii_uppercase().contains("SCALE");
                let confidence = if has_keyword { 0.9 } else { 0.8 };
                let is_better = match &best {
                    None => true,
                    Some((_, _, prev_title)) => in_title_block && !prev_title,
                };
                if is_better {
                    best = Some((
                        Scale {
                            pixels_per_foot: px_per_ft,
                            notation: Some(notation.clone()),
                            confidence,
                            method: ScaleMethod::Text,
                            variance_percent: 0.0,
                        },
                        notation,
                        in_title_block,
                    ));
                }
            }
        }
    }
    best.map(|(scale, notation, _)| (scale, notation))
}

struct DimensionSample {
    length_ft: f32,
    edge_px: f32,
}

/// Método 2: ajuste de dimensiones. Empareja etiquetas de cota con bordes
/// vectoriales cercanos (centro a menos de 50 px) y ajusta
/// `edge_px = k . length_ft` por mínimos cuadrados sin término
/// independiente.
pub fn estimate_from_dimension_fit(
    doc: &PdfDocument,
    page_index: usize,
) -> Result<Option<Scale>, ScaleVarianceTooHigh> {
    let mut samples = Vec::new();

    for run in doc.text_runs_for_page(page_index) {
        let Some(length_ft) = parse_dimension_string(&run.text) else {
            continue;
        };
        let label_center = (
            (run.rect.x0 + run.rect.x1) / 2.0,
            (run.rect.y0 + run.rect.y1) / 2.0,
        );
        if let Some(edge_px) = nearest_edge_length(doc, page_index, label_center, 50.0) {
            samples.push(DimensionSample { length_ft, edge_px });
        }
    }

    if samples.len() < 2 {
        return Ok(None);
    }

    // Mínimos cuadrados sin término independiente: k = sum(x*y) / sum(x*x)
    let sum_xy: f32 = samples.iter().map(|s| s.length_ft * s.edge_px).sum();
    let sum_xx: f32 = samples.iter().map(|s| s.length_ft * s.length_ft).sum();
    if sum_xx <= 0.0 {
        return Ok(None);
    }
    let k = sum_xy / sum_xx;

    let residuals_sq: f32 = samples
        .iter()
        .map(|s| {
            let predicted = k * s.length_ft;
            (s.edge_px - predicted).powi(2)
        })
        .sum();
    let rmse = (residuals_sq / samples.len() as f32).sqrt();
    let mean_edge: f32 = samples.iter().map(|s| s.edge_px).sum::<f32>() / samples.len() as f32;
    let variance_percent = if mean_edge > 0.0 {
        (rmse / mean_edge) * 100.0
    } else {
        100.0
    };

    if variance_percent > 5.0 {
        return Err(ScaleVarianceTooHigh(variance_percent));
    }

    let confidence = (1.0 - variance_percent / 100.0).max(0.5);

    Ok(Some(Scale {
        pixels_per_foot: k,
        notation: None,
        confidence,
        method: ScaleMethod::DimensionFit,
        variance_percent,
    }))
}

fn parse_dimension_string(text: &str) -> Option<f32> {
    let caps = DIMENSION_RE.captures(text)?;
    if let Some(feet) = caps.get(1) {
        let feet: f32 = feet.as_str().parse().ok()?;
        let inches: f32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);
        return Some(feet + inches / 12.0);
    }
    if let (Some(w), Some(h)) = (caps.get(3), caps.get(4)) {
        let w: f32 = w.as_str().parse().ok()?;
        let h: f32 = h.as_str().parse().ok()?;
        return Some((w + h) / 2.0);
    }
    if let Some(ft) = caps.get(5) {
        return ft.as_str().parse().ok();
    }
    None
}

fn nearest_edge_length(
    doc: &PdfDocument,
    page_index: usize,
    point: (f32, f32),
    max_dist: f32,
) -> Option<f32> {
    let mut best: Option<f32> = None;
    let mut best_dist = max_dist;
    for entry in doc.vectors_for_page(page_index) {
        if let VectorPath::Line { p0, p1 } = entry.path {
            let center = ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0);
            let dist = ((center.0 - point.0).powi(2) + (center.1 - point.1).powi(2)).sqrt();
            if dist <= best_dist {
                best_dist = dist;
                let length = ((p1.0 - p0.0).powi(2) + (p1.1 - p0.1).powi(2)).sqrt();
                best = Some(length);
            }
        }
    }
    best
}

/// Candidatos fijos de escala en px/ft probados por el método 3.
pub const CANDIDATE_SCALES: &[f32] = &[12.0, 24.0, 36.0, 48.0, 64.0, 96.0];

/// Método 3: validación por tamaño de sala. Puntúa cada escala candidata
/// por cuántos rectángulos resultantes caen en [20, 500] ft² con un total
/// plausible en [500, 10000] ft².
pub fn estimate_from_room_validation(
    doc: &PdfDocument,
    page_index: usize,
) -> Vec<(f32, f32, String)> {
    let rects: Vec<PageRect> = doc
        .vectors_for_page(page_index)
        .filter_map(|e| match &e.path {
            VectorPath::Rectangle { rect } => Some(*rect),
            _ => None,
        })
        .collect();

    let mut scored = Vec::new();
    for &candidate in CANDIDATE_SCALES {
        if rects.is_empty() {
            continue;
        }
        let mut in_range = 0usize;
        let mut total_area = 0.0f32;
        for rect in &rects {
            let area_ft2 = (rect.width() / candidate) * (rect.height() / candidate);
            total_area += area_ft2;
            if (20.0..=500.0).contains(&area_ft2) {
                in_range += 1;
            }
        }
        let plausible_total = (500.0..=10_000.0).contains(&total_area);
        let in_range_fraction = in_range as f32 / rects.len() as f32;
        let mut confidence = 0.7 * in_range_fraction;
        if !plausible_total {
            confidence *= 0.5;
        }
        let confidence = confidence.min(0.7);
        scored.push((
            candidate,
            confidence,
            format!(
                "{}/{} salas en rango a {} px/ft, área total {:.0} ft²",
                in_range,
                rects.len(),
                candidate,
                total_area
            ),
        ));
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    scored
}

/// Umbral mínimo de confianza para seleccionar una escala sin pedir
/// intervención del usuario.
pub const MIN_SELECTION_CONFIDENCE: f32 = 0.5;

/// Selecciona la mejor escala disponible entre los tres métodos. Prefiere
/// la de mayor confianza; en caso de empate, prefiere notación de texto. Si
/// la mejor confianza queda por debajo de [`MIN_SELECTION_CONFIDENCE`],
/// devuelve `NeedsInput` con todas las alternativas.
pub fn select_scale(
    text_result: Option<Scale>,
    dimension_result: Option<Scale>,
    room_validation_results: Vec<(f32, f32, String)>,
) -> ScaleOutcome {
    let mut candidates: Vec<Scale> = Vec::new();
    if let Some(s) = text_result {
        candidates.push(s);
    }
    if let Some(s) = dimension_result {
        candidates.push(s);
    }
    for (px_per_ft, confidence, _) in &room_validation_results {
        candidates.push(Scale {
            pixels_per_foot: *px_per_ft,
            notation: None,
            confidence: *confidence,
            method: ScaleMethod::RoomValidation,
            variance_percent: 0.0,
        });
    }

    fn method_rank(m: ScaleMethod) -> i32 {
        match m {
            ScaleMethod::Text => 2,
            ScaleMethod::DimensionFit => 1,
            ScaleMethod::RoomValidation => 0,
            ScaleMethod::Fallback => -1,
        }
    }

    let mut best: Option<&Scale> = None;
    for candidate in &candidates {
        best = match best {
            None => Some(candidate),
            Some(current) => {
                if candidate.confidence > current.confidence
                    || (candidate.confidence == current.confidence
                        && method_rank(candidate.method) > method_rank(current.method))
                {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    match best {
        Some(scale) if scale.confidence >= MIN_SELECTION_CONFIDENCE => {
            ScaleOutcome::Selected(scale.clone())
        }
        _ => {
            let alternatives = room_validation_results
                .into_iter()
                .map(|(px, confidence, evidence)| ScaleAlternative {
                    pixels_per_foot: px,
                    confidence,
                    evidence,
                })
                .chain(candidates.iter().filter(|c| c.method != ScaleMethod::RoomValidation).map(|c| {
                    ScaleAlternative {
                        pixels_per_foot: c.pixels_per_foot,
                        confidence: c.confidence,
                        evidence: format!("{:?} con confianza {:.2}", c.method, c.confidence),
                    }
                }))
                .collect();
            ScaleOutcome::NeedsInput { alternatives }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quarter_inch_notation() {
        let caps = SCALE_NOTATION_RE.captures("SCALE: 1/4\"=1'-0\"").unwrap();
        let (px, notation) = notation_to_px_per_ft(&caps, 96.0).unwrap();
        assert!((px - 24.0).abs() < 0.01);
        assert_eq!(notation, "1/4\"=1'-0\"");
    }

    #[test]
    fn dimension_string_parses_feet_inches() {
        assert!((parse_dimension_string("21'-6\"").unwrap() - 21.5).abs() < 0.01);
    }

    #[test]
    fn dimension_string_parses_by_pair() {
        assert!((parse_dimension_string("12x10").unwrap() - 11.0).abs() < 0.01);
    }

    #[test]
    fn selection_prefers_highest_confidence() {
        let text = Scale {
            pixels_per_foot: 48.0,
            notation: Some("1/4\"=1'-0\"".into()),
            confidence: 0.9,
            method: ScaleMethod::Text,
            variance_percent: 0.0,
        };
        let outcome = select_scale(Some(text.clone()), None, vec![]);
        assert_eq!(outcome, ScaleOutcome::Selected(text));
    }

    #[test]
    fn low_confidence_requests_input() {
        let room_validation = vec![
            (48.0, 0.45, "tied".to_string()),
            (96.0, 0.45, "tied".to_string()),
        ];
        let outcome = select_scale(None, None, room_validation);
        match outcome {
            ScaleOutcome::NeedsInput { alternatives } => assert_eq!(alternatives.len(), 2),
            _ => panic!("expected NeedsInput"),
        }
    }

    #[test]
    fn variance_above_five_percent_is_rejected() {
        // longitudes consistentes con k=48 salvo un outlier que empuja la varianza > 5%
        let page = crate::pdf::PageImage {
            page_index: 0,
            bytes: vec![],
            dpi: 150,
            long_side_px: 1600,
            rect: PageRect { x0: 0.0, y0: 0.0, x1: 1000.0, y1: 800.0 },
        };
        let text_runs = vec![
            crate::pdf::TextRun { page_index: 0, text: "10'-0\"".into(), rect: PageRect { x0: 10.0, y0: 10.0, x1: 40.0, y1: 20.0 } },
            crate::pdf::TextRun { page_index: 0, text: "20'-0\"".into(), rect: PageRect { x0: 10.0, y0: 100.0, x1: 40.0, y1: 110.0 } },
            crate::pdf::TextRun { page_index: 0, text: "5'-0\"".into(), rect: PageRect { x0: 10.0, y0: 200.0, x1: 40.0, y1: 210.0 } },
        ];
        let vectors = vec![
            crate::pdf::VectorEntry { page_index: 0, path: VectorPath::Line { p0: (12.0, 15.0), p1: (492.0, 15.0) } },
            crate::pdf::VectorEntry { page_index: 0, path: VectorPath::Line { p0: (12.0, 105.0), p1: (972.0, 105.0) } },
            crate::pdf::VectorEntry { page_index: 0, path: VectorPath::Line { p0: (12.0, 205.0), p1: (600.0, 205.0) } },
        ];
        let doc = PdfDocument::from_parts(1024, vec![page], text_runs, vectors).unwrap();
        let result = estimate_from_dimension_fit(&doc, 0);
        assert!(result.is_err());
    }
}
