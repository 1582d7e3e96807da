// Distributed under the MIT License

//! Puntuador de calidad: diez señales ponderadas sobre la calidad del
//! plano, que determinan tanto la vía de enrutamiento (qué tan a fondo se
//! confía en el candidato asistido por IA) como los pesos dinámicos del
//! motor de fiabilidad.

use blueprint::{EnvelopeHit, EnvelopeHitKind, PageClassification, PageKind};

use crate::model::{QualityRouting, QualityScore};

struct Feature {
    name: &'static str,
    weight: f32,
    score: f32,
}

/// Entradas consumidas por el puntuador; todas derivadas de la tubería de
/// ingestión, nunca del resultado del cálculo.
pub struct QualityInputs<'a> {
    pub pages_analyzed: usize,
    pub text_run_count: usize,
    pub page_classifications: &'a [PageClassification],
    pub schedules_present: bool,
    pub envelope_hits: &'a [EnvelopeHit],
    pub north_arrow_present: bool,
    pub duct_location_found: bool,
    pub rooms_detected: usize,
    pub rooms_attempted: usize,
    pub wwr_reconciled_with_elevations: bool,
    pub vector_area_ft2: f32,
    pub table_area_ft2: Option<f32>,
    pub foundation_resolved: bool,
}

fn annotation_density_score(text_run_count: usize, pages_analyzed: usize) -> f32 {
    if pages_analyzed == 0 {
        return 0.0;
    }
    let per_page = text_run_count as f32 / pages_analyzed as f32;
    (per_page / 40.0).min(1.0)
}

fn sections_elevations_score(classifications: &[PageClassification]) -> f32 {
    let has_section = classifications.iter().any(|c| c.kind == PageKind::Section);
    let has_elevation = classifications.iter().any(|c| c.kind == PageKind::Elevation);
    match (has_section, has_elevation) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    }
}

fn ach50_found_score(hits: &[EnvelopeHit]) -> f32 {
    if hits.iter().any(|h| h.kind == EnvelopeHitKind::Ach50) {
        1.0
    } else {
        0.0
    }
}

fn polygonization_rate(rooms_detected: usize, rooms_attempted: usize) -> f32 {
    if rooms_attempted == 0 {
        0.0
    } else {
        (rooms_detected as f32 / rooms_attempted as f32).min(1.0)
    }
}

fn area_delta_score(vector_area_ft2: f32, table_area_ft2: Option<f32>) -> f32 {
    match table_area_ft2 {
        None => 0.5,
        Some(table) if table > 0.0 => {
            let delta_fraction = ((vector_area_ft2 - table).abs() / table).min(1.0);
            (1.0 - delta_fraction).max(0.0)
        }
        Some(_) => 0.5,
    }
}

/// Calcula la puntuación de calidad 0..1 y decide la vía de enrutamiento.
pub fn score_quality(inputs: &QualityInputs) -> QualityScore {
    let features = vec![
        Feature {
            name: "annotation density per page",
            weight: 0.15,
            score: annotation_density_score(inputs.text_run_count, inputs.pages_analyzed),
        },
        Feature {
            name: "schedules present",
            weight: 0.10,
            score: if inputs.schedules_present { 1.0 } else { 0.0 },
        },
        Feature {
            name: "sections & elevations present",
            weight: 0.10,
            score: sections_elevations_score(inputs.page_classifications),
        },
        Feature {
            name: "north arrow present",
            weight: 0.05,
            score: if inputs.north_arrow_present { 1.0 } else { 0.0 },
        },
        Feature {
            name: "ACH50 found",
            weight: 0.10,
            score: ach50_found_score(inputs.envelope_hits),
        },
        Feature {
            name: "duct location found",
            weight: 0.10,
            score: if inputs.duct_location_found { 1.0 } else { 0.0 },
        },
        Feature {
            name: "room-polygonization success rate",
            weight: 0.15,
            score: polygonization_rate(inputs.rooms_detected, inputs.rooms_attempted),
        },
        Feature {
            name: "facade WWR reconciled with elevations",
            weight: 0.10,
            score: if inputs.wwr_reconciled_with_elevations { 1.0 } else { 0.0 },
        },
        Feature {
            name: "area (vector) vs area (table) delta",
            weight: 0.10,
            score: area_delta_score(inputs.vector_area_ft2, inputs.table_area_ft2),
        },
        Feature {
            name: "foundation resolved",
            weight: 0.05,
            score: if inputs.foundation_resolved { 1.0 } else { 0.0 },
        },
    ];

    let total_weight: f32 = features.iter().map(|f| f.weight).sum();
    debug_assert!((total_weight - 1.0).abs() < 1e-6, "quality weights must sum to 1");

    let value: f32 = features.iter().map(|f| f.weight * f.score).sum::<f32>().clamp(0.0, 1.0);

    let routing = if value >= 0.8 {
        QualityRouting::AiHeavy
    } else if value >= 0.5 {
        QualityRouting::Hybrid
    } else {
        QualityRouting::Conservative
    };

    let factors = features
        .iter()
        .filter(|f| f.score < 0.5)
        .map(|f| format!("{} por debajo de 0.5 (puntuación {:.2})", f.name, f.score))
        .collect();

    QualityScore {
        value,
        feature_scores: features.into_iter().map(|f| (f.name.to_string(), f.score)).collect(),
        routing,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_inputs() -> QualityInputs<'static> {
        QualityInputs {
            pages_analyzed: 1,
            text_run_count: 0,
            page_classifications: &[],
            schedules_present: false,
            envelope_hits: &[],
            north_arrow_present: false,
            duct_location_found: false,
            rooms_detected: 0,
            rooms_attempted: 0,
            wwr_reconciled_with_elevations: false,
            vector_area_ft2: 0.0,
            table_area_ft2: None,
            foundation_resolved: false,
        }
    }

    #[test]
    fn empty_inputs_route_to_conservative() {
        let score = score_quality(&baseline_inputs());
        assert!(score.value < 0.5);
        assert_eq!(score.routing, QualityRouting::Conservative);
    }

    #[test]
    fn rich_inputs_route_to_ai_heavy() {
        let mut inputs = baseline_inputs();
        inputs.text_run_count = 400;
        inputs.schedules_present = true;
        inputs.north_arrow_present = true;
        inputs.duct_location_found = true;
        inputs.rooms_detected = 10;
        inputs.rooms_attempted = 10;
        inputs.wwr_reconciled_with_elevations = true;
        inputs.vector_area_ft2 = 1500.0;
        inputs.table_area_ft2 = Some(1500.0);
        inputs.foundation_resolved = true;
        inputs.envelope_hits = &[EnvelopeHit {
            kind: EnvelopeHitKind::Ach50,
            value: 5.0,
            page_index: 0,
            confidence: 0.8,
            raw_text: "5 ACH @ 50".to_string(),
        }];
        let score = score_quality(&inputs);
        assert!(score.value >= 0.8, "expected >= 0.8, got {}", score.value);
        assert_eq!(score.routing, QualityRouting::AiHeavy);
    }
}
