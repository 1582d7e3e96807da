// Distributed under the MIT License

//! Política de valores conservadores para campos no resueltos antes del
//! cálculo y clamps de saneamiento de ingeniería tras el cálculo. Todo
//! valor por defecto aquí penaliza calefacción (nunca
//! infraestima una carga de calefacción por falta de datos) y todo clamp
//! aplicado se registra con su valor original.

use crate::model::{ClampRecord, DuctLocation, FoundationKind};

/// Grado de exposición al viento usado por el cálculo de infiltración
/// AIM-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindShielding {
    Exposed,
    Normal,
    Shielded,
}

#[derive(Debug, Clone, Copy)]
pub struct ConservativeDefaults {
    pub foundation_kind: FoundationKind,
    pub crawl_wall_r: f32,
    pub floor_r_over_crawl: f32,
    pub basement_interior_r: f32,
    pub ach50: f32,
    pub wind_shielding: WindShielding,
    pub window_u: f32,
    pub window_shgc: f32,
    pub wwr_per_facade: f32,
    pub duct_location: DuctLocation,
    /// Los junquillos/zunchos de borde (rim joists) siempre se incluyen en
    /// el balance de muro, con independencia del resto de la envolvente.
    pub rim_joists_included: bool,
}

/// Resuelve la tabla de valores conservadores "antes del cálculo" para los campos que ni el
/// usuario ni el plano resolvieron. `zone_window_u_max` es el máximo de
/// código para la zona, usado como valor conservador de U de ventana.
/// Exposición al viento por defecto según el recuento de plantas:
/// expuesta para una sola planta, normal para dos o más. Compartida entre
/// la tabla de valores conservadores y el cálculo de infiltración AIM-2,
/// que necesita el mismo criterio sin volver a resolver la envolvente.
pub fn wind_shielding_for_stories(stories: u8) -> WindShielding {
    if stories <= 1 {
        WindShielding::Exposed
    } else {
        WindShielding::Normal
    }
}

pub fn conservative_defaults(
    is_new_construction: bool,
    stories: u8,
    zone_window_u_max: f32,
) -> ConservativeDefaults {
    let ach50 = if is_new_construction { 5.0 } else { 7.0 };
    let wind_shielding = wind_shielding_for_stories(stories);
    let duct_location = if stories <= 1 {
        DuctLocation::VentedAttic
    } else {
        DuctLocation::Crawl
    };
    ConservativeDefaults {
        foundation_kind: FoundationKind::CrawlVented,
        crawl_wall_r: 0.0,
        floor_r_over_crawl: 19.0,
        basement_interior_r: 0.0,
        ach50,
        wind_shielding,
        window_u: zone_window_u_max,
        window_shgc: 0.30,
        wwr_per_facade: crate::config::DEFAULT_CONSERVATIVE_WWR,
        duct_location,
        rim_joists_included: true,
    }
}

fn record(name: &str, rule: &str, original: f32, clamped: f32) -> Option<ClampRecord> {
    if (original - clamped).abs() < 1e-6 {
        None
    } else {
        Some(ClampRecord {
            name: name.to_string(),
            rule: rule.to_string(),
            original_value: original,
            clamped_value: clamped,
        })
    }
}

/// ACH natural mínimo: 0.25 en construcción nueva, 0.35 en existente.
pub fn clamp_ach_natural(ach_nat: f32, is_new_construction: bool) -> (f32, Option<ClampRecord>) {
    let floor = if is_new_construction { 0.25 } else { 0.35 };
    let clamped = ach_nat.max(floor);
    (
        clamped,
        record("ach_nat_floor", "ACH_nat >= floor por época constructiva", ach_nat, clamped),
    )
}

/// WWR por fachada: tope de 0.35 salvo que haya evidencia de elevación (en
/// cuyo caso el valor detectado/declarado se respeta sin tope).
pub fn clamp_wwr(wwr: f32, has_elevation_evidence: bool) -> (f32, Option<ClampRecord>) {
    if has_elevation_evidence {
        return (wwr, None);
    }
    let clamped = wwr.min(0.35);
    (
        clamped,
        record("wwr_ceiling", "WWR <= 0.35 sin evidencia de elevaciones", wwr, clamped),
    )
}

/// R efectivo de muro: tope de 18 incluso para construcciones R-20+5ci.
pub fn clamp_wall_effective_r(r_effective: f32) -> (f32, Option<ClampRecord>) {
    let clamped = r_effective.min(18.0);
    (
        clamped,
        record("wall_effective_r_ceiling", "R efectivo de muro <= 18", r_effective, clamped),
    )
}

/// Intensidad de calefacción mínima para edificios de una planta con
/// conductos en ático ventilado: 18 BTU/h·ft².
pub fn clamp_heating_intensity(
    heating_btuh: f32,
    floor_area_ft2: f32,
    stories: u8,
    duct_location: DuctLocation,
) -> (f32, Option<ClampRecord>) {
    if stories > 1 || duct_location != DuctLocation::VentedAttic || floor_area_ft2 <= 0.0 {
        return (heating_btuh, None);
    }
    let intensity = heating_btuh / floor_area_ft2;
    if intensity >= 18.0 {
        return (heating_btuh, None);
    }
    let clamped = 18.0 * floor_area_ft2;
    (
        clamped,
        record(
            "heating_intensity_floor",
            "calefacción >= 18 BTU/h·ft2 para una planta con conductos en ático",
            heating_btuh,
            clamped,
        ),
    )
}

/// Caudal de infiltración: tope de 0.5 CFM/ft² de área de planta.
pub fn clamp_infiltration_cfm(cfm: f32, floor_area_ft2: f32) -> (f32, Option<ClampRecord>) {
    if floor_area_ft2 <= 0.0 {
        return (cfm, None);
    }
    let cap = 0.5 * floor_area_ft2;
    let clamped = cfm.min(cap);
    (
        clamped,
        record("infiltration_cfm_ceiling", "infiltración <= 0.5 CFM/ft2", cfm, clamped),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ach_natural_floor_applies_only_below_threshold() {
        let (v, rec) = clamp_ach_natural(0.10, true);
        assert_eq!(v, 0.25);
        assert!(rec.is_some());
        let (v2, rec2) = clamp_ach_natural(0.40, true);
        assert_eq!(v2, 0.40);
        assert!(rec2.is_none());
    }

    #[test]
    fn wwr_ceiling_skipped_with_elevation_evidence() {
        let (v, rec) = clamp_wwr(0.50, true);
        assert_eq!(v, 0.50);
        assert!(rec.is_none());
    }

    #[test]
    fn heating_intensity_floor_only_for_single_story_attic_ducts() {
        let (v, rec) = clamp_heating_intensity(5_000.0, 1_500.0, 1, DuctLocation::VentedAttic);
        assert_eq!(v, 27_000.0);
        assert!(rec.is_some());

        let (v2, rec2) = clamp_heating_intensity(5_000.0, 1_500.0, 2, DuctLocation::VentedAttic);
        assert_eq!(v2, 5_000.0);
        assert!(rec2.is_none());
    }

    #[test]
    fn conservative_defaults_penalize_heating() {
        let d = conservative_defaults(true, 1, 0.40);
        assert_eq!(d.foundation_kind, FoundationKind::CrawlVented);
        assert_eq!(d.ach50, 5.0);
        assert_eq!(d.duct_location, DuctLocation::VentedAttic);
    }
}
