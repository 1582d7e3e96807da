// Distributed under the MIT License

//! Calculadores de línea base: tres métodos deterministas e independientes,
//! ninguno consulta la salida de visión. Cada uno produce un [`Candidate`]
//! a nivel de edificio completo (sin desglose por sala: el desglose por
//! sala es propio del cálculo Manual J) que sirve de referencia al motor
//! de fiabilidad.

use blueprint::{Orientation, RoomKind};
use climate::ClimateDesign;

use crate::conservative::wind_shielding_for_stories;
use crate::defaults::zone_default;
use crate::geometry::BuildingGeometry;
use crate::manualj::{ducts, foundation, infiltration, internal_gains, roof, solar, ventilation, walls, windows};
use crate::model::{Candidate, CandidateName, ComponentKind, ComponentLoad, DuctLocation, Envelope, ZoneLoads};

/// WWR conservador de la línea base de código mínimo (distinto del 0.20
/// usado como valor conservador cuando el plano no aporta evidencia de
/// fachada).
const CODE_MIN_WWR: f32 = 0.18;

fn worst_duct_location_for_stories(stories: u8) -> DuctLocation {
    if stories <= 1 {
        DuctLocation::VentedAttic
    } else {
        DuctLocation::Crawl
    }
}

fn whole_building_zone(name: &str, heating: f32, cooling: f32, components: Vec<ComponentLoad>) -> ZoneLoads {
    ZoneLoads {
        room_id: 0,
        room_name: name.to_string(),
        heating_sensible_btuh: heating,
        heating_latent_btuh: 0.0,
        cooling_sensible_btuh: cooling,
        cooling_latent_btuh: 0.0,
        components,
    }
}

/// Línea base de código mínimo: mínimos IECC de la zona, ACH50 de código
/// máximo, ubicación de conductos peor plausible para el número de
/// plantas, WWR conservador del 18%.
pub fn code_minimum(
    climate: &ClimateDesign,
    geometry: &BuildingGeometry,
    bedroom_count: u32,
    is_new_construction: bool,
    heating_delta_t: f32,
    cooling_delta_t: f32,
) -> Candidate {
    let zone = zone_default(&climate.zone);
    let duct_location = worst_duct_location_for_stories(geometry.stories);
    let shielding = wind_shielding_for_stories(geometry.stories);
    let volume_ft3 = geometry.total_area_ft2 * zone.ceiling_height_ft;
    let ground_floor_area_ft2 = geometry.total_area_ft2 / geometry.stories.max(1) as f32;

    let window_area_ft2 = CODE_MIN_WWR * geometry.gross_wall_area_ft2;
    let net_wall_area_ft2 = (geometry.gross_wall_area_ft2 - window_area_ft2).max(0.0);

    let (u_wall, wall_heating) = walls::conduction_btuh(zone.wall_r, net_wall_area_ft2, heating_delta_t);
    let (_, wall_cooling) = walls::conduction_btuh(zone.wall_r, net_wall_area_ft2, cooling_delta_t);

    let window = windows::calculate(
        zone.window_u,
        zone.window_shgc,
        window_area_ft2,
        Orientation::Unknown,
        climate.zone_number(),
        heating_delta_t,
        cooling_delta_t,
    );

    let (u_roof, roof_heating, roof_cooling) =
        roof::conduction_btuh(zone.roof_r, geometry.top_floor_area_ft2, heating_delta_t, cooling_delta_t);

    let foundation_result = foundation::calculate(
        crate::model::FoundationKind::CrawlVented,
        geometry.perimeter_ft,
        ground_floor_area_ft2,
        zone.floor_r,
        heating_delta_t,
        cooling_delta_t,
    );

    let infiltration_result = infiltration::calculate(
        zone.ach50_code_max,
        geometry.stories,
        shielding,
        is_new_construction,
        volume_ft3,
        geometry.total_area_ft2,
        heating_delta_t,
        cooling_delta_t,
        climate.humidity_ratio_summer,
    );

    let ventilation_result = ventilation::calculate(
        geometry.total_area_ft2,
        bedroom_count,
        0.0,
        heating_delta_t,
        cooling_delta_t,
        climate.humidity_ratio_summer,
    );

    let internal = internal_gains::for_room(
        geometry.total_area_ft2,
        RoomKind::Other,
        geometry.total_area_ft2,
        internal_gains::total_occupants(geometry.total_area_ft2),
    );

    let heating_raw = wall_heating
        + window.conduction_heating_btuh
        + roof_heating
        + foundation_result.heating_btuh
        + infiltration_result.heating_sensible_btuh
        + ventilation_result.heating_sensible_btuh;
    let cooling_raw = wall_cooling
        + window.conduction_cooling_btuh
        + window.solar_cooling_btuh
        + roof_cooling
        + foundation_result.cooling_btuh
        + infiltration_result.cooling_sensible_btuh
        + infiltration_result.cooling_latent_btuh
        + ventilation_result.cooling_sensible_btuh
        + ventilation_result.cooling_latent_btuh
        + internal.sensible_btuh
        + internal.latent_btuh;

    let (duct_heating_factor, duct_cooling_factor) = ducts::factors(duct_location);
    let heating_btuh = heating_raw * duct_heating_factor;
    let cooling_btuh = cooling_raw * duct_cooling_factor;

    let components = vec![
        ComponentLoad::new(ComponentKind::Wall, wall_heating).with_area_u_dt(net_wall_area_ft2, u_wall, heating_delta_t),
        ComponentLoad::new(ComponentKind::WindowCond, window.conduction_heating_btuh),
        ComponentLoad::new(ComponentKind::WindowSolar, window.solar_cooling_btuh),
        ComponentLoad::new(ComponentKind::Roof, roof_heating).with_area_u_dt(geometry.top_floor_area_ft2, u_roof, heating_delta_t),
        ComponentLoad::new(ComponentKind::Foundation, foundation_result.heating_btuh),
        ComponentLoad::new(ComponentKind::InfiltrationSensible, infiltration_result.heating_sensible_btuh),
        ComponentLoad::new(ComponentKind::VentilationSensible, ventilation_result.heating_sensible_btuh),
        ComponentLoad::new(ComponentKind::Duct, heating_btuh - heating_raw),
    ];

    Candidate {
        name: CandidateName::CodeMin,
        heating_btuh: heating_btuh.max(0.0),
        cooling_btuh: cooling_btuh.max(0.0),
        details: format!(
            "Código mínimo IECC zona {}: WWR {:.0}%, ACH50 {:.1}, conductos en {:?} (peor plausible para {} planta(s))",
            climate.zone, CODE_MIN_WWR * 100.0, zone.ach50_code_max, duct_location, geometry.stories
        ),
        zone_loads: vec![whole_building_zone("Edificio completo (código mínimo)", heating_btuh, cooling_btuh, components)],
    }
}

/// Línea base UA+OA: `UA = Sigma(U.A)` sobre muros/ventanas/cubierta/piso
/// con U efectivos de puente térmico, más aire exterior de ventilación.
/// No aplica factor de conductos ni de diversidad: es una comprobación de
/// orden de magnitud, no un candidato dimensionado.
pub fn ua_oa(
    envelope: &Envelope,
    climate: &ClimateDesign,
    geometry: &BuildingGeometry,
    bedroom_count: u32,
    heating_delta_t: f32,
    cooling_delta_t: f32,
) -> Candidate {
    const FLOOR_R_FILMS: f32 = 1.35;

    let window_area_ft2 = geometry.window_area_ft2;
    let net_wall_area_ft2 = geometry.net_wall_area_ft2;

    let u_wall = walls::effective_u(envelope.wall_r.value);
    let u_roof = roof::effective_u(envelope.ceiling_r.value);
    let u_window = envelope.window_u.value;
    let u_floor = 1.0 / (envelope.floor_r.value + FLOOR_R_FILMS);

    let ua = u_wall * net_wall_area_ft2 + u_window * window_area_ft2 + u_roof * geometry.top_floor_area_ft2
        + u_floor * (geometry.total_area_ft2 / geometry.stories.max(1) as f32);

    let ventilation_result = ventilation::calculate(
        geometry.total_area_ft2,
        bedroom_count,
        0.0,
        heating_delta_t,
        cooling_delta_t,
        climate.humidity_ratio_summer,
    );
    let cfm_oa = ventilation_result.cfm;

    let heating_btuh = ua * heating_delta_t + 1.08 * cfm_oa * heating_delta_t;

    let solar_cooling_btuh =
        window_area_ft2 * envelope.window_shgc.value * solar::solar_factor(Orientation::Unknown, climate.zone_number()) * 0.85;
    let internal = internal_gains::for_room(
        geometry.total_area_ft2,
        RoomKind::Other,
        geometry.total_area_ft2,
        internal_gains::total_occupants(geometry.total_area_ft2),
    );
    let oa_cooling_btuh = 1.08 * cfm_oa * cooling_delta_t;
    let cooling_btuh = ua * cooling_delta_t * 0.7 + solar_cooling_btuh + internal.sensible_btuh + oa_cooling_btuh;

    let components = vec![
        ComponentLoad::new(ComponentKind::Wall, u_wall * net_wall_area_ft2 * heating_delta_t)
            .with_area_u_dt(net_wall_area_ft2, u_wall, heating_delta_t),
        ComponentLoad::new(ComponentKind::WindowCond, u_window * window_area_ft2 * heating_delta_t),
        ComponentLoad::new(ComponentKind::WindowSolar, solar_cooling_btuh),
        ComponentLoad::new(ComponentKind::Roof, u_roof * geometry.top_floor_area_ft2 * heating_delta_t)
            .with_area_u_dt(geometry.top_floor_area_ft2, u_roof, heating_delta_t),
        ComponentLoad::new(ComponentKind::VentilationSensible, 1.08 * cfm_oa * heating_delta_t),
        ComponentLoad::new(ComponentKind::InternalSensible, internal.sensible_btuh),
    ];

    Candidate {
        name: CandidateName::UaOa,
        heating_btuh: heating_btuh.max(0.0),
        cooling_btuh: cooling_btuh.max(0.0),
        details: format!("UA+OA: UA = {:.1} BTU/h.F, CFM_OA = {:.0}, sin factor de conductos ni diversidad", ua, cfm_oa),
        zone_loads: vec![whole_building_zone("Edificio completo (UA+OA)", heating_btuh, cooling_btuh, components)],
    }
}

struct RegionalIntensity {
    heating_mid: f32,
    cooling_mid: f32,
}

/// Punto medio de un intervalo BTU/h.ft2 por dígito de zona IECC y banda
/// de plantas (1 frente a 2+), reducido de la tabla cerrada de intensidad
/// regional. Construcciones de varias plantas tienen una razón
/// superficie/volumen menor y por tanto intensidades algo inferiores.
fn regional_table(zone_number: u8, stories: u8) -> RegionalIntensity {
    let (heating_mid, cooling_mid) = match zone_number.clamp(1, 8) {
        1 => (10.0, 35.0),
        2 => (14.0, 30.0),
        3 => (18.0, 26.0),
        4 => (23.0, 22.0),
        5 => (27.0, 19.0),
        6 => (32.0, 17.0),
        7 => (39.0, 15.0),
        _ => (46.0, 13.0),
    };
    if stories > 1 {
        RegionalIntensity { heating_mid: heating_mid * 0.90, cooling_mid: cooling_mid * 0.90 }
    } else {
        RegionalIntensity { heating_mid, cooling_mid }
    }
}

/// Línea base de intensidad regional: tabla cerrada BTU/h.ft2 por zona y
/// número de plantas, con el factor de conductos aplicado al punto medio
/// para reflejar la ubicación de conductos declarada.
pub fn regional_intensity(climate: &ClimateDesign, geometry: &BuildingGeometry, duct_location: DuctLocation) -> Candidate {
    let table = regional_table(climate.zone_number(), geometry.stories);
    let (duct_heating_factor, duct_cooling_factor) = ducts::factors(duct_location);

    let heating_btuh = table.heating_mid * geometry.total_area_ft2 * duct_heating_factor;
    let cooling_btuh = table.cooling_mid * geometry.total_area_ft2 * duct_cooling_factor;

    Candidate {
        name: CandidateName::Regional,
        heating_btuh,
        cooling_btuh,
        details: format!(
            "Intensidad regional zona {} ({} planta(s)): {:.1}/{:.1} BTU/h.ft2 (calefaccion/refrigeracion), conductos en {:?}",
            climate.zone, geometry.stories, table.heating_mid, table.cooling_mid, duct_location
        ),
        zone_loads: vec![whole_building_zone(
            "Edificio completo (intensidad regional)",
            heating_btuh,
            cooling_btuh,
            vec![],
        )],
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

    fn test_geometry() -> BuildingGeometry {
        BuildingGeometry {
            total_area_ft2: 1_500.0,
            stories: 1,
            room_count: 12,
            perimeter_ft: 160.0,
            gross_wall_area_ft2: 1_280.0,
            window_area_ft2: 180.0,
            door_area_ft2: 40.0,
            net_wall_area_ft2: 1_060.0,
            top_floor_area_ft2: 1_500.0,
            ceiling_height_ft: 8.0,
        }
    }

    #[test]
    fn code_minimum_never_returns_negative_loads() {
        let candidate = code_minimum(&test_climate(), &test_geometry(), 3, false, 60.0, 20.0);
        assert!(candidate.heating_btuh >= 0.0);
        assert!(candidate.cooling_btuh >= 0.0);
        assert_eq!(candidate.name, CandidateName::CodeMin);
    }

    #[test]
    fn regional_intensity_scales_with_area() {
        let small = regional_intensity(&test_climate(), &test_geometry(), DuctLocation::Conditioned);
        let mut bigger_geometry = test_geometry();
        bigger_geometry.total_area_ft2 = 3_000.0;
        let big = regional_intensity(&test_climate(), &bigger_geometry, DuctLocation::Conditioned);
        assert!(big.heating_btuh > small.heating_btuh);
    }

    #[test]
    fn vented_attic_ducts_inflate_regional_intensity_estimate() {
        let conditioned = regional_intensity(&test_climate(), &test_geometry(), DuctLocation::Conditioned);
        let attic = regional_intensity(&test_climate(), &test_geometry(), DuctLocation::VentedAttic);
        assert!(attic.heating_btuh > conditioned.heating_btuh);
    }
}
