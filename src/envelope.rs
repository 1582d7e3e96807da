// Distributed under the MIT License

//! Ensamblador de envolvente: resolución por capas de cada campo
//! (anulación de usuario, luego detección de plano si confianza >= 0.6 y
//! dentro de los límites de validación, luego valor por defecto de época
//! o, en su ausencia, de zona) y finalmente los valores conservadores
//! para los campos que ninguna de las capas anteriores resolvió.

use blueprint::{EnvelopeHit, EnvelopeHitKind, FieldSource, Sourced};
use climate::ClimateDesign;

use crate::conservative::conservative_defaults;
use crate::defaults::{era_default, zone_default};
use crate::model::{ConstructionEra, Envelope, EnvelopeOverrides, FoundationKind};

/// Confianza mínima de un acierto de plano para que gane sobre el valor
/// por defecto de época/zona.
const MIN_DETECTED_CONFIDENCE: f32 = 0.6;

struct Bounds {
    min: f32,
    max: f32,
}

fn wall_r_bounds(zone_wall_r: f32) -> Bounds {
    Bounds { min: (0.5 * zone_wall_r).max(8.0), max: 2.0 * zone_wall_r }
}

fn roof_r_bounds(zone_roof_r: f32) -> Bounds {
    Bounds { min: (0.6 * zone_roof_r).max(15.0), max: 2.5 * zone_roof_r }
}

fn window_u_bounds() -> Bounds {
    Bounds { min: 0.15, max: 1.2 }
}

fn ach50_bounds() -> Bounds {
    Bounds { min: 0.8, max: 14.0 }
}

fn in_bounds(value: f32, bounds: &Bounds) -> bool {
    value >= bounds.min && value <= bounds.max
}

/// El valor resuelto de un campo numérico junto con un aviso opcional
/// cuando una detección de plano quedó fuera de límites y fue sustituida.
struct Resolution {
    sourced: Sourced<f32>,
    warning: Option<String>,
}

#[allow(clippy::too_many_arguments)]
fn resolve_numeric(
    field_name: &str,
    user_value: Option<f32>,
    detected: Option<&EnvelopeHit>,
    bounds: Bounds,
    era_value: Option<f32>,
    zone_value: f32,
) -> Resolution {
    if let Some(v) = user_value {
        return Resolution {
            sourced: Sourced::new(v, FieldSource::UserOverride, 1.0),
            warning: None,
        };
    }

    if let Some(hit) = detected {
        if hit.confidence >= MIN_DETECTED_CONFIDENCE {
            if in_bounds(hit.value, &bounds) {
                return Resolution {
                    sourced: Sourced::new(hit.value, FieldSource::RuleExtractor, hit.confidence),
                    warning: None,
                };
            }
            let fallback = era_value.unwrap_or(zone_value);
            return Resolution {
                sourced: Sourced::new(
                    fallback,
                    if era_value.is_some() { FieldSource::EraDefault } else { FieldSource::ZoneDefault },
                    0.5,
                ),
                warning: Some(format!(
                    "{field_name}: valor detectado {:.2} fuera de [{:.2}, {:.2}], sustituido por el valor por defecto {:.2}",
                    hit.value, bounds.min, bounds.max, fallback
                )),
            };
        }
    }

    match era_value {
        Some(v) => Resolution { sourced: Sourced::new(v, FieldSource::EraDefault, 0.6), warning: None },
        None => Resolution { sourced: Sourced::new(zone_value, FieldSource::ZoneDefault, 0.5), warning: None },
    }
}

fn best_hit(hits: &[EnvelopeHit], kind: EnvelopeHitKind) -> Option<&EnvelopeHit> {
    hits.iter()
        .filter(|h| h.kind == kind)
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
}

/// Ensambla la envolvente completa para un edificio. `stories` y
/// `total_area_ft2` informan los valores conservadores de los campos que
/// ninguna capa anterior resuelve (cimentación, conductos, WWR, ACH50
/// cuando no hay detección ni anulación).
pub fn assemble_envelope(
    climate: &ClimateDesign,
    era: Option<ConstructionEra>,
    overrides: Option<&EnvelopeOverrides>,
    envelope_hits: &[EnvelopeHit],
    has_elevation_evidence: bool,
    stories: u8,
) -> (Envelope, Vec<String>) {
    let mut warnings = Vec::new();
    let zone = zone_default(&climate.zone);
    let era_vals = era.map(era_default);
    let is_new_construction = matches!(era, Some(ConstructionEra::New)) || era.is_none();
    let conservative = conservative_defaults(is_new_construction, stories, zone.window_u);

    let user_wall_r = overrides.and_then(|o| o.wall_r);
    let wall_hit = best_hit(envelope_hits, EnvelopeHitKind::WallR);
    let wall_res = resolve_numeric(
        "wall_r",
        user_wall_r,
        wall_hit,
        wall_r_bounds(zone.wall_r),
        era_vals.map(|e| e.wall_r),
        zone.wall_r,
    );
    if let Some(w) = &wall_res.warning {
        warnings.push(w.clone());
    }

    let user_roof_r = overrides.and_then(|o| o.ceiling_r);
    let roof_hit = best_hit(envelope_hits, EnvelopeHitKind::RoofR);
    let roof_res = resolve_numeric(
        "ceiling_r",
        user_roof_r,
        roof_hit,
        roof_r_bounds(zone.roof_r),
        era_vals.map(|e| e.roof_r),
        zone.roof_r,
    );
    if let Some(w) = &roof_res.warning {
        warnings.push(w.clone());
    }

    let user_floor_r = overrides.and_then(|o| o.floor_r);
    let floor_r = match user_floor_r {
        Some(v) => Sourced::new(v, FieldSource::UserOverride, 1.0),
        None => match era_vals {
            Some(e) if e.floor_r > 0.0 => Sourced::new(e.floor_r, FieldSource::EraDefault, 0.6),
            _ => Sourced::new(conservative.floor_r_over_crawl, FieldSource::ConservativeDefault, 0.3),
        },
    };

    let user_window_u = overrides.and_then(|o| o.window_u);
    let window_hit = best_hit(envelope_hits, EnvelopeHitKind::WindowU);
    let window_u_res = resolve_numeric(
        "window_u",
        user_window_u,
        window_hit,
        window_u_bounds(),
        None,
        zone.window_u,
    );
    if let Some(w) = &window_u_res.warning {
        warnings.push(w.clone());
    }
    let window_u = if user_window_u.is_none() && window_hit.is_none() {
        Sourced::new(conservative.window_u, FieldSource::ConservativeDefault, 0.3)
    } else {
        window_u_res.sourced
    };

    let window_shgc = match overrides.and_then(|o| o.window_shgc) {
        Some(v) => Sourced::new(v, FieldSource::UserOverride, 1.0),
        None => Sourced::new(conservative.window_shgc, FieldSource::ConservativeDefault, 0.4)
            .with_blend(zone.window_shgc),
    };

    let door_u = match overrides.and_then(|o| o.door_u) {
        Some(v) => Sourced::new(v, FieldSource::UserOverride, 1.0),
        None => Sourced::new(zone.door_u, FieldSource::ZoneDefault, 0.5),
    };

    let user_ach50 = overrides.and_then(|o| o.ach50);
    let ach50_hit = best_hit(envelope_hits, EnvelopeHitKind::Ach50);
    let ach50_res = resolve_numeric(
        "ach50",
        user_ach50,
        ach50_hit,
        ach50_bounds(),
        None,
        conservative.ach50,
    );
    if let Some(w) = &ach50_res.warning {
        warnings.push(w.clone());
    }
    let ach50 = if user_ach50.is_none() && ach50_hit.is_none() {
        Sourced::new(conservative.ach50, FieldSource::ConservativeDefault, 0.3)
    } else {
        ach50_res.sourced
    };

    let foundation_kind = match overrides.and_then(|o| o.foundation_kind) {
        Some(v) => Sourced::new(v, FieldSource::UserOverride, 1.0),
        None => Sourced::new(conservative.foundation_kind, FieldSource::ConservativeDefault, 0.3),
    };

    let duct_location = match overrides.and_then(|o| o.duct_location) {
        Some(v) => Sourced::new(v, FieldSource::UserOverride, 1.0),
        None => Sourced::new(conservative.duct_location, FieldSource::ConservativeDefault, 0.3),
    };

    let raw_wwr = conservative.wwr_per_facade;
    let (wwr_clamped, wwr_clamp) = crate::conservative::clamp_wwr(raw_wwr, has_elevation_evidence);
    if let Some(rec) = wwr_clamp {
        warnings.push(format!("clamp '{}': {:.3} -> {:.3}", rec.name, rec.original_value, rec.clamped_value));
    }
    let per_facade_wwr = Sourced::new(wwr_clamped, FieldSource::ConservativeDefault, 0.3);

    let envelope = Envelope {
        wall_r: wall_res.sourced,
        ceiling_r: roof_res.sourced,
        floor_r,
        window_u,
        window_shgc,
        door_u,
        ach50,
        foundation_kind,
        duct_location,
        ceiling_height_default: Sourced::new(zone.ceiling_height_ft, FieldSource::ZoneDefault, 0.7),
        per_facade_wwr,
    };

    (envelope, warnings)
}

/// Atajo de fusión simple: si ambos valores son iguales, conserva la
/// confianza; si no, promedia y marca la procedencia como `ZoneDefault`
/// (usado solo para SHGC, que no tiene detección de plano dedicada).
trait SourcedExt {
    fn with_blend(self, zone_value: f32) -> Self;
}

impl SourcedExt for Sourced<f32> {
    fn with_blend(self, zone_value: f32) -> Self {
        if (self.value - zone_value).abs() < 1e-6 {
            self
        } else {
            Sourced::new((self.value + zone_value) / 2.0, FieldSource::ZoneDefault, 0.4)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate::ClimateSource;

    fn test_climate() -> ClimateDesign {
        ClimateDesign {
            zip: "63101".to_string(),
            zone: "4A".to_string(),
            winter_99: 10.0,
            summer_1: 89.0,
            summer_wb: 74.0,
            daily_range: 21.0,
            humidity_ratio_summer: 0.013,
            humidity_ratio_winter: 0.0024,
            source: ClimateSource::Matched,
        }
    }

    #[test]
    fn user_override_wins_over_everything() {
        let overrides = EnvelopeOverrides { wall_r: Some(25.0), ..Default::default() };
        let (env, _) = assemble_envelope(&test_climate(), None, Some(&overrides), &[], false, 1);
        assert_eq!(env.wall_r.value, 25.0);
        assert_eq!(env.wall_r.source, FieldSource::UserOverride);
    }

    #[test]
    fn out_of_bounds_detection_is_replaced_with_default() {
        let hit = EnvelopeHit {
            kind: EnvelopeHitKind::WallR,
            value: 2.0,
            page_index: 0,
            confidence: 0.9,
            raw_text: "R-2".to_string(),
        };
        let (env, warnings) = assemble_envelope(&test_climate(), None, None, &[hit], false, 1);
        assert_ne!(env.wall_r.value, 2.0);
        assert!(!warnings.is_empty());
    }

    #[test]
    fn unset_foundation_falls_back_to_conservative_default() {
        let (env, _) = assemble_envelope(&test_climate(), None, None, &[], false, 1);
        assert_eq!(env.foundation_kind.value, FoundationKind::CrawlVented);
        assert_eq!(env.foundation_kind.source, FieldSource::ConservativeDefault);
    }

    #[test]
    fn wwr_is_capped_without_elevation_evidence() {
        let (env, _) = assemble_envelope(&test_climate(), None, None, &[], false, 1);
        assert!(env.per_facade_wwr.value <= 0.35);
    }
}
