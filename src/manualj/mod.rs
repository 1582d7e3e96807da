// Distributed under the MIT License

//! Calculador Manual J: el candidato "primary" del conjunto de
//! fiabilidad. Combina los sub-módulos de componente (muros, ventanas,
//! cubierta, cimentación, infiltración, ventilación, ganancias internas,
//! conductos) en cargas por sala y totales de edificio, aplicando
//! diversidad y factores de seguridad al final.

pub mod ducts;
pub mod foundation;
pub mod infiltration;
pub mod internal_gains;
pub mod roof;
pub mod solar;
pub mod ventilation;
pub mod walls;
pub mod windows;

use blueprint::{Room, RoomKind};
use climate::ClimateDesign;

use crate::conservative::wind_shielding_for_stories;
use crate::geometry::BuildingGeometry;
use crate::model::{
    Candidate, CandidateName, ClampRecord, ComponentKind, ComponentLoad, Envelope, ZoneLoads,
};

/// Temperatura interior de diseño de calefacción (°F), estándar Manual J.
pub const INDOOR_HEATING_F: f32 = 70.0;
/// Temperatura interior de diseño de refrigeración (°F), estándar Manual J.
pub const INDOOR_COOLING_F: f32 = 75.0;

/// Sala sintinela para los componentes de sistema (infiltración,
/// ventilación, conductos) que no pertenecen a una sala concreta.
pub const SYSTEM_ROOM_ID: u32 = u32::MAX;

pub struct ManualJOutcome {
    pub candidate: Candidate,
    pub clamps: Vec<ClampRecord>,
    pub bedroom_count: u32,
}

/// Ejecuta el cálculo Manual J completo sobre el grafo de salas fusionado.
/// Nunca suspende: toma sus entradas ya resueltas y es una función pura
/// de ellas, igual que las demás líneas base que corren junto al primario.
#[allow(clippy::too_many_arguments)]
pub fn calculate_primary(
    rooms: &[Room],
    envelope: &Envelope,
    climate: &ClimateDesign,
    geometry: &BuildingGeometry,
    heat_recovery_efficiency: f32,
    is_new_construction: bool,
) -> ManualJOutcome {
    let heating_delta_t = (INDOOR_HEATING_F - climate.winter_99).max(0.0);
    let cooling_delta_t = (climate.summer_1 - INDOOR_COOLING_F).max(0.0);
    let zone_number = climate.zone_number();
    let top_floor_index = geometry.stories as i32 - 1;

    let mut zone_loads = Vec::with_capacity(rooms.len());
    let mut heating_subtotal = 0.0f32;
    let mut cooling_sensible_subtotal = 0.0f32;
    let mut cooling_latent_subtotal = 0.0f32;

    let total_occupants = internal_gains::total_occupants(geometry.total_area_ft2);
    let ground_floor_area: f32 = rooms.iter().filter(|r| r.floor_index == 0).map(|r| r.area_ft2).sum();

    // El R efectivo de muro es un único valor por edificio (un
    // `(source, confidence)` por campo de envolvente), así que el clamp de
    // techo se evalúa una sola vez y se reutiliza para todas las salas.
    let (wall_u, wall_effective_r_clamp) = walls::effective_u_clamped(envelope.wall_r.value);
    let mut clamps: Vec<ClampRecord> = wall_effective_r_clamp.into_iter().collect();

    for room in rooms {
        let mut components: Vec<ComponentLoad> = Vec::new();
        let mut heating = 0.0f32;
        let mut cooling_sensible = 0.0f32;
        let mut cooling_latent = 0.0f32;

        let window_area: f32 = room.windows.iter().map(|w| w.width_ft * w.height_ft).sum();
        let door_area: f32 = room.doors.iter().map(|d| d.width_ft * d.height_ft).sum();
        let gross_wall_area: f32 = room
            .exterior_wall_segments
            .iter()
            .map(|seg| {
                let dx = seg.p1.0 - seg.p0.0;
                let dy = seg.p1.1 - seg.p0.1;
                (dx * dx + dy * dy).sqrt() * room.ceiling_height_ft
            })
            .sum();
        let net_wall_area = (gross_wall_area - window_area - door_area).max(0.0);

        if net_wall_area > 0.0 {
            let wall_heating = wall_u * net_wall_area * heating_delta_t;
            let wall_cooling = wall_u * net_wall_area * cooling_delta_t;
            heating += wall_heating;
            cooling_sensible += wall_cooling;
            components.push(
                ComponentLoad::new(ComponentKind::Wall, wall_heating).with_area_u_dt(net_wall_area, wall_u, heating_delta_t),
            );
        }

        for opening in &room.windows {
            let result = windows::calculate(
                envelope.window_u.value,
                envelope.window_shgc.value,
                opening.width_ft * opening.height_ft,
                opening.orientation,
                zone_number,
                heating_delta_t,
                cooling_delta_t,
            );
            heating += result.conduction_heating_btuh;
            cooling_sensible += result.conduction_cooling_btuh + result.solar_cooling_btuh;
            components.push(ComponentLoad::new(ComponentKind::WindowCond, result.conduction_heating_btuh).with_area_u_dt(
                opening.width_ft * opening.height_ft,
                result.u_value,
                heating_delta_t,
            ));
            components.push(ComponentLoad::new(ComponentKind::WindowSolar, result.solar_cooling_btuh));
        }

        for opening in &room.doors {
            let (door_heating, door_cooling) = windows::door_conduction_btuh(
                envelope.door_u.value,
                opening.width_ft * opening.height_ft,
                heating_delta_t,
                cooling_delta_t,
            );
            heating += door_heating;
            cooling_sensible += door_cooling;
            components.push(ComponentLoad::new(ComponentKind::Door, door_heating));
        }

        if room.floor_index == top_floor_index {
            let (u_roof, roof_heating, roof_cooling) =
                roof::conduction_btuh(envelope.ceiling_r.value, room.area_ft2, heating_delta_t, cooling_delta_t);
            heating += roof_heating;
            cooling_sensible += roof_cooling;
            components.push(
                ComponentLoad::new(ComponentKind::Roof, roof_heating).with_area_u_dt(room.area_ft2, u_roof, heating_delta_t),
            );
        }

        if room.floor_index == 0 && ground_floor_area > 0.0 {
            let share = room.area_ft2 / ground_floor_area;
            let result = foundation::calculate(
                envelope.foundation_kind.value,
                geometry.perimeter_ft * share,
                room.area_ft2,
                envelope.floor_r.value,
                heating_delta_t,
                cooling_delta_t,
            );
            heating += result.heating_btuh;
            cooling_sensible += result.cooling_btuh;
            components.push(ComponentLoad::new(ComponentKind::Foundation, result.heating_btuh));
        }

        let internal = internal_gains::for_room(room.area_ft2, room.kind.value, geometry.total_area_ft2, total_occupants);
        cooling_sensible += internal.sensible_btuh;
        cooling_latent += internal.latent_btuh;
        components.push(ComponentLoad::new(ComponentKind::InternalSensible, internal.sensible_btuh));
        components.push(ComponentLoad::new(ComponentKind::InternalLatent, internal.latent_btuh));

        heating_subtotal += heating;
        cooling_sensible_subtotal += cooling_sensible;
        cooling_latent_subtotal += cooling_latent;

        zone_loads.push(ZoneLoads {
            room_id: room.id,
            room_name: room.name.clone(),
            heating_sensible_btuh: heating,
            heating_latent_btuh: 0.0,
            cooling_sensible_btuh: cooling_sensible,
            cooling_latent_btuh: cooling_latent,
            components,
        });
    }

    let bedroom_count = rooms.iter().filter(|r| r.kind.value == RoomKind::Bedroom).count().max(1) as u32;
    let shielding = wind_shielding_for_stories(geometry.stories);
    let volume_ft3 = geometry.total_area_ft2 * geometry.ceiling_height_ft;

    let infiltration = infiltration::calculate(
        envelope.ach50.value,
        geometry.stories,
        shielding,
        is_new_construction,
        volume_ft3,
        geometry.total_area_ft2,
        heating_delta_t,
        cooling_delta_t,
        climate.humidity_ratio_summer,
    );

    let ventilation = ventilation::calculate(
        geometry.total_area_ft2,
        bedroom_count,
        heat_recovery_efficiency,
        heating_delta_t,
        cooling_delta_t,
        climate.humidity_ratio_summer,
    );

    clamps.extend(infiltration.clamps.clone());

    heating_subtotal += infiltration.heating_sensible_btuh + ventilation.heating_sensible_btuh;
    cooling_sensible_subtotal += infiltration.cooling_sensible_btuh + ventilation.cooling_sensible_btuh;
    cooling_latent_subtotal += infiltration.cooling_latent_btuh + ventilation.cooling_latent_btuh;

    let (duct_heating_factor, duct_cooling_factor) = ducts::factors(envelope.duct_location.value);
    let heating_with_ducts = heating_subtotal * duct_heating_factor;
    let cooling_sensible_with_ducts = cooling_sensible_subtotal * duct_cooling_factor;
    let cooling_latent_with_ducts = cooling_latent_subtotal * duct_cooling_factor;

    let system_components = vec![
        ComponentLoad::new(ComponentKind::InfiltrationSensible, infiltration.heating_sensible_btuh),
        ComponentLoad::new(ComponentKind::InfiltrationLatent, infiltration.cooling_latent_btuh),
        ComponentLoad::new(ComponentKind::VentilationSensible, ventilation.heating_sensible_btuh),
        ComponentLoad::new(ComponentKind::VentilationLatent, ventilation.cooling_latent_btuh),
        ComponentLoad::new(
            ComponentKind::Duct,
            (heating_with_ducts - heating_subtotal) + (cooling_sensible_with_ducts - cooling_sensible_subtotal),
        ),
    ];
    zone_loads.push(ZoneLoads {
        room_id: SYSTEM_ROOM_ID,
        room_name: "Sistema (infiltración, ventilación, conductos)".to_string(),
        heating_sensible_btuh: infiltration.heating_sensible_btuh + ventilation.heating_sensible_btuh,
        heating_latent_btuh: 0.0,
        cooling_sensible_btuh: infiltration.cooling_sensible_btuh + ventilation.cooling_sensible_btuh,
        cooling_latent_btuh: infiltration.cooling_latent_btuh + ventilation.cooling_latent_btuh,
        components: system_components,
    });

    let room_count = rooms.len();
    let diversity_factor = if room_count > 10 {
        0.90
    } else if room_count > 5 {
        0.95
    } else {
        1.0
    };
    const HEATING_SAFETY_FACTOR: f32 = 1.10;
    const COOLING_SAFETY_FACTOR: f32 = 1.00;

    let heating_btuh = (heating_with_ducts * HEATING_SAFETY_FACTOR).max(0.0);
    let cooling_btuh =
        ((cooling_sensible_with_ducts + cooling_latent_with_ducts) * diversity_factor * COOLING_SAFETY_FACTOR).max(0.0);

    let details = format!(
        "Manual J: calefacción base {:.0} BTU/h, factor conductos {:.2}, factor seguridad {:.2}; refrigeración base {:.0} BTU/h, factor conductos {:.2}, diversidad {:.2}",
        heating_subtotal, duct_heating_factor, HEATING_SAFETY_FACTOR,
        cooling_sensible_subtotal + cooling_latent_subtotal, duct_cooling_factor, diversity_factor
    );

    let candidate = Candidate {
        name: CandidateName::Primary,
        heating_btuh,
        cooling_btuh,
        details,
        zone_loads,
    };

    ManualJOutcome {
        candidate,
        clamps,
        bedroom_count,
    }
}
