// Distributed under the MIT License

//! Motor de fiabilidad: combina los cuatro candidatos (primario más
//! tres líneas base) en un único resultado, ponderado por la calidad del
//! plano y por la dispersión entre candidatos, con barreras de seguridad y
//! una puntuación de confianza final.

use crate::conservative::clamp_heating_intensity;
use crate::model::{
    Candidate, CandidateName, ClampRecord, DuctLocation, HeatingFuel, OrientationBand, QualityScore, ReliabilityResult,
    Weights,
};

const BASE_WEIGHTS: Weights = Weights { primary: 0.75, code_min: 0.10, ua_oa: 0.10, regional: 0.05 };

/// Banda de incertidumbre de orientación: +-5% sobre la mediana de los
/// cuatro candidatos, emitida solo cuando la orientación
/// norte del edificio es desconocida.
const ORIENTATION_BAND_FRACTION: f32 = 0.05;

fn find<'a>(candidates: &'a [Candidate], name: CandidateName) -> Option<&'a Candidate> {
    candidates.iter().find(|c| c.name == name)
}

/// `(max - min) / median` sobre los valores de calefacción de los
/// candidatos completados. Con un único candidato completado la
/// dispersión es cero: no hay desacuerdo que medir.
fn spread_of(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let median = if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    };
    if median.abs() < 1e-6 {
        0.0
    } else {
        (max - min) / median
    }
}

/// Calcula los pesos dinámicos de la mezcla a partir de la calidad y la
/// dispersión, comenzando en los pesos base y ajustando.
/// Siempre renormaliza a suma 1 al final, incluso cuando algún candidato
/// no completó (su peso pasa a 0 antes de renormalizar).
fn dynamic_weights(quality: f32, spread: f32, primary_completed: bool) -> Weights {
    let mut w = BASE_WEIGHTS;

    if quality < 0.4 {
        w.primary -= 0.05;
        w.ua_oa += 0.04;
        w.code_min += 0.01;
    }
    if quality < 0.2 {
        if w.primary > 0.45 {
            let excess = w.primary - 0.45;
            w.primary = 0.45;
            w.code_min += excess / 2.0;
            w.ua_oa += excess / 2.0;
        }
    }
    if spread > 0.60 {
        w.primary -= 0.02;
        w.ua_oa += 0.02;
    }

    if !primary_completed {
        let freed = w.primary;
        w.primary = 0.0;
        let remainder = w.code_min + w.ua_oa + w.regional;
        if remainder > 1e-6 {
            w.code_min += freed * w.code_min / remainder;
            w.ua_oa += freed * w.ua_oa / remainder;
            w.regional += freed * w.regional / remainder;
        }
    }

    let sum = w.sum();
    if sum > 1e-6 {
        w.primary /= sum;
        w.code_min /= sum;
        w.ua_oa /= sum;
        w.regional /= sum;
    }
    w
}

fn weight_for(weights: &Weights, name: CandidateName) -> f32 {
    match name {
        CandidateName::Primary => weights.primary,
        CandidateName::CodeMin => weights.code_min,
        CandidateName::UaOa => weights.ua_oa,
        CandidateName::Regional => weights.regional,
    }
}

fn blend(candidates: &[Candidate], weights: &Weights, pick: impl Fn(&Candidate) -> f32) -> f32 {
    let total_weight: f32 = candidates.iter().map(|c| weight_for(weights, c.name)).sum();
    if total_weight < 1e-6 {
        return 0.0;
    }
    candidates.iter().map(|c| weight_for(weights, c.name) * pick(c)).sum::<f32>() / total_weight
}

fn agreement(primary: f32, ua_oa: f32) -> f32 {
    if ua_oa.abs() < 1e-6 {
        return 0.0;
    }
    (1.0 - (primary - ua_oa).abs() / ua_oa).clamp(0.0, 1.0)
}

/// Ejecuta el motor de fiabilidad completo sobre el conjunto de candidatos
/// que terminaron dentro del plazo de la ejecución. `candidates` puede contener menos de cuatro elementos si
/// alguno excedió su plazo; siempre se asume que al menos una línea base
/// terminó de forma síncrona.
#[allow(clippy::too_many_arguments)]
pub fn blend_candidates(
    candidates: Vec<Candidate>,
    quality: QualityScore,
    north_orientation_known: bool,
    heating_fuel: HeatingFuel,
    timed_out: bool,
    floor_area_ft2: f32,
    stories: u8,
    duct_location: DuctLocation,
) -> ReliabilityResult {
    let primary_completed = find(&candidates, CandidateName::Primary).is_some();
    let heating_values: Vec<f32> = candidates.iter().map(|c| c.heating_btuh).collect();
    let spread = spread_of(&heating_values);

    let weights = dynamic_weights(quality.value, spread, primary_completed);

    let mut heating_btuh = blend(&candidates, &weights, |c| c.heating_btuh);
    let cooling_btuh = blend(&candidates, &weights, |c| c.cooling_btuh);

    let mut clamps_applied: Vec<ClampRecord> = Vec::new();
    if let Some(code_min) = find(&candidates, CandidateName::CodeMin) {
        if heating_btuh < code_min.heating_btuh {
            clamps_applied.push(ClampRecord {
                name: "heating_floor_code_min".to_string(),
                rule: "calefaccion nunca por debajo del candidato de codigo minimo".to_string(),
                original_value: heating_btuh,
                clamped_value: code_min.heating_btuh,
            });
            heating_btuh = code_min.heating_btuh;
        }
    }

    let (heating_btuh, intensity_clamp) = clamp_heating_intensity(heating_btuh, floor_area_ft2, stories, duct_location);
    if let Some(clamp) = intensity_clamp {
        clamps_applied.push(clamp);
    }

    let orientation_band = if north_orientation_known {
        None
    } else {
        let mut sorted_heating = heating_values.clone();
        sorted_heating.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut sorted_cooling: Vec<f32> = candidates.iter().map(|c| c.cooling_btuh).collect();
        sorted_cooling.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let heating_median = median_of(&sorted_heating);
        let cooling_median = median_of(&sorted_cooling);
        Some(OrientationBand {
            heating_min_btuh: heating_median * (1.0 - ORIENTATION_BAND_FRACTION),
            heating_median_btuh: heating_median,
            heating_max_btuh: heating_median * (1.0 + ORIENTATION_BAND_FRACTION),
            cooling_min_btuh: cooling_median * (1.0 - ORIENTATION_BAND_FRACTION),
            cooling_median_btuh: cooling_median,
            cooling_max_btuh: cooling_median * (1.0 + ORIENTATION_BAND_FRACTION),
        })
    };

    let primary_heating = find(&candidates, CandidateName::Primary).map(|c| c.heating_btuh).unwrap_or(heating_btuh);
    let ua_oa_heating = find(&candidates, CandidateName::UaOa).map(|c| c.heating_btuh).unwrap_or(heating_btuh);
    let confidence = (0.4 * quality.value + 0.3 * (1.0 - spread).max(0.0) + 0.3 * agreement(primary_heating, ua_oa_heating))
        .clamp(0.0, 1.0);

    let recommended_sizing_btuh = if heating_fuel == HeatingFuel::HeatPump {
        heating_btuh.max(cooling_btuh)
    } else {
        cooling_btuh
    };

    let mut notes = Vec::new();
    if !primary_completed {
        notes.push("el candidato primario no completo dentro del plazo; su peso se redujo a 0".to_string());
    }
    if timed_out {
        notes.push("la ejecucion alcanzo el plazo limite; resultado parcial".to_string());
    }

    ReliabilityResult {
        heating_btuh,
        cooling_btuh,
        confidence,
        quality_score: quality,
        weights,
        candidates,
        spread,
        orientation_band,
        clamps_applied,
        conservative_policies: Vec::new(),
        notes,
        partial: timed_out || !primary_completed,
        recommended_sizing_btuh,
    }
}

fn median_of(sorted: &[f32]) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QualityRouting;

    fn candidate(name: CandidateName, heating: f32, cooling: f32) -> Candidate {
        Candidate { name, heating_btuh: heating, cooling_btuh: cooling, details: String::new(), zone_loads: vec![] }
    }

    fn quality(value: f32) -> QualityScore {
        QualityScore { value, feature_scores: vec![], routing: QualityRouting::Hybrid, factors: vec![] }
    }

    #[test]
    fn weights_always_sum_to_one() {
        for q in [0.9, 0.5, 0.35, 0.15] {
            for s in [0.1, 0.7] {
                let w = dynamic_weights(q, s, true);
                assert!((w.sum() - 1.0).abs() < 1e-5, "quality={q} spread={s} sum={}", w.sum());
            }
        }
    }

    #[test]
    fn heating_never_drops_below_code_min() {
        let candidates = vec![
            candidate(CandidateName::Primary, 20_000.0, 15_000.0),
            candidate(CandidateName::CodeMin, 30_000.0, 18_000.0),
            candidate(CandidateName::UaOa, 25_000.0, 16_000.0),
            candidate(CandidateName::Regional, 28_000.0, 17_000.0),
        ];
        let result = blend_candidates(candidates, quality(0.9), true, HeatingFuel::Gas, false, 1_500.0, 2, DuctLocation::Conditioned);
        assert!(result.heating_btuh >= 30_000.0 - 1e-3);
        assert!(!result.clamps_applied.is_empty());
    }

    #[test]
    fn missing_primary_zeroes_its_weight() {
        let candidates = vec![
            candidate(CandidateName::CodeMin, 30_000.0, 18_000.0),
            candidate(CandidateName::UaOa, 25_000.0, 16_000.0),
            candidate(CandidateName::Regional, 28_000.0, 17_000.0),
        ];
        let result = blend_candidates(candidates, quality(0.9), true, HeatingFuel::Gas, true, 1_500.0, 2, DuctLocation::Conditioned);
        assert_eq!(result.weights.primary, 0.0);
        assert!(result.partial);
    }

    #[test]
    fn heat_pump_sizing_uses_the_larger_of_heating_and_cooling() {
        let candidates = vec![
            candidate(CandidateName::Primary, 20_000.0, 30_000.0),
            candidate(CandidateName::CodeMin, 20_000.0, 28_000.0),
            candidate(CandidateName::UaOa, 20_000.0, 29_000.0),
            candidate(CandidateName::Regional, 20_000.0, 29_500.0),
        ];
        let result = blend_candidates(candidates, quality(0.9), true, HeatingFuel::HeatPump, false, 1_500.0, 2, DuctLocation::Conditioned);
        assert!((result.recommended_sizing_btuh - result.cooling_btuh).abs() < 1e-3);
    }

    #[test]
    fn orientation_band_only_emitted_when_north_unknown() {
        let candidates = vec![
            candidate(CandidateName::Primary, 20_000.0, 15_000.0),
            candidate(CandidateName::CodeMin, 20_000.0, 15_000.0),
            candidate(CandidateName::UaOa, 20_000.0, 15_000.0),
            candidate(CandidateName::Regional, 20_000.0, 15_000.0),
        ];
        let known = blend_candidates(candidates.clone(), quality(0.9), true, HeatingFuel::Gas, false, 1_500.0, 2, DuctLocation::Conditioned);
        assert!(known.orientation_band.is_none());
        let unknown = blend_candidates(candidates, quality(0.9), false, HeatingFuel::Gas, false, 1_500.0, 2, DuctLocation::Conditioned);
        assert!(unknown.orientation_band.is_some());
    }

    #[test]
    fn heating_intensity_floor_applies_to_the_blended_result() {
        let candidates = vec![
            candidate(CandidateName::Primary, 5_000.0, 10_000.0),
            candidate(CandidateName::CodeMin, 4_000.0, 9_000.0),
            candidate(CandidateName::UaOa, 4_500.0, 9_500.0),
            candidate(CandidateName::Regional, 4_800.0, 9_800.0),
        ];
        let result = blend_candidates(candidates, quality(0.9), true, HeatingFuel::Gas, false, 1_000.0, 1, DuctLocation::VentedAttic);
        assert!((result.heating_btuh - 18_000.0).abs() < 1e-3);
        assert!(result.clamps_applied.iter().any(|c| c.name == "heating_intensity_floor"));
    }
}
