// Distributed under the MIT License

//! Tablas estáticas de valores por defecto: por época constructiva y por zona
//! climática IECC, reducida a los campos que el motor consume. Usadas por el
//! ensamblador de envolvente como repliegue tras usuario y plano, y por el
//! calculador de línea base de código mínimo.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::model::ConstructionEra;

#[derive(Debug, Clone, Copy)]
pub struct EraDefault {
    pub wall_r: f32,
    pub roof_r: f32,
    pub floor_r: f32,
    pub window_u: f32,
}

/// Ocho bandas constructivas; `new` es la banda de código mínimo usada
/// cuando `construction_era == New` con independencia del año declarado.
static ERA_DEFAULTS: Lazy<HashMap<&'static str, EraDefault>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("1960s", EraDefault { wall_r: 7.0, roof_r: 11.0, floor_r: 0.0, window_u: 1.10 });
    m.insert("1970s", EraDefault { wall_r: 9.0, roof_r: 19.0, floor_r: 0.0, window_u: 1.00 });
    m.insert("1980s", EraDefault { wall_r: 11.0, roof_r: 26.0, floor_r: 11.0, window_u: 0.85 });
    m.insert("1990s", EraDefault { wall_r: 13.0, roof_r: 30.0, floor_r: 13.0, window_u: 0.65 });
    m.insert("2000s", EraDefault { wall_r: 13.0, roof_r: 38.0, floor_r: 19.0, window_u: 0.50 });
    m.insert("2010s", EraDefault { wall_r: 15.0, roof_r: 38.0, floor_r: 19.0, window_u: 0.35 });
    m.insert("2020s", EraDefault { wall_r: 20.0, roof_r: 49.0, floor_r: 19.0, window_u: 0.30 });
    m.insert("new", EraDefault { wall_r: 20.0, roof_r: 49.0, floor_r: 19.0, window_u: 0.27 });
    m
});

pub fn era_default(era: ConstructionEra) -> EraDefault {
    *ERA_DEFAULTS
        .get(era.as_str())
        .expect("every ConstructionEra variant has a table entry")
}

/// Una época desconocida (sin declarar) o `New` se trata como construcción
/// nueva a efectos de ACH50/viento conservadores; cualquier otra
/// banda declarada es construcción existente.
pub fn is_new_construction(era: Option<ConstructionEra>) -> bool {
    matches!(era, None | Some(ConstructionEra::New))
}

#[derive(Debug, Clone, Copy)]
pub struct ZoneEnvelopeDefault {
    pub wall_r: f32,
    pub roof_r: f32,
    pub floor_r: f32,
    pub window_u: f32,
    pub window_shgc: f32,
    pub door_u: f32,
    pub ach50_code_max: f32,
    pub ceiling_height_ft: f32,
}

/// Mínimos/valores típicos IECC por zona, reducidos a los campos que el
/// motor consume (`ClimateDesign` ya aporta las temperaturas de diseño).
static ZONE_DEFAULTS: Lazy<HashMap<&'static str, ZoneEnvelopeDefault>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let z = |wall_r, roof_r, floor_r, window_u, window_shgc, door_u, ach50| ZoneEnvelopeDefault {
        wall_r,
        roof_r,
        floor_r,
        window_u,
        window_shgc,
        door_u,
        ach50_code_max: ach50,
        ceiling_height_ft: 8.0,
    };
    m.insert("1A", z(13.0, 30.0, 13.0, 1.20, 0.25, 0.50, 7.0));
    m.insert("2A", z(13.0, 30.0, 13.0, 0.65, 0.25, 0.50, 5.0));
    m.insert("2B", z(13.0, 30.0, 13.0, 0.50, 0.25, 0.40, 5.0));
    m.insert("3A", z(13.0, 38.0, 19.0, 0.50, 0.25, 0.40, 5.0));
    m.insert("3B", z(13.0, 38.0, 19.0, 0.50, 0.25, 0.40, 5.0));
    m.insert("3C", z(13.0, 38.0, 19.0, 0.50, 0.25, 0.40, 5.0));
    m.insert("4A", z(13.0, 38.0, 19.0, 0.40, 0.40, 0.35, 3.0));
    m.insert("4B", z(13.0, 38.0, 19.0, 0.40, 0.40, 0.35, 3.0));
    m.insert("4C", z(13.0, 38.0, 19.0, 0.40, 0.40, 0.35, 3.0));
    m.insert("5A", z(20.0, 49.0, 30.0, 0.32, 0.40, 0.35, 3.0));
    m.insert("5B", z(20.0, 49.0, 30.0, 0.32, 0.40, 0.35, 3.0));
    m.insert("6A", z(20.0, 49.0, 30.0, 0.32, 0.40, 0.30, 3.0));
    m.insert("6B", z(20.0, 49.0, 30.0, 0.32, 0.40, 0.30, 3.0));
    m.insert("7", z(21.0, 49.0, 38.0, 0.32, 0.40, 0.30, 3.0));
    m.insert("8", z(21.0, 49.0, 38.0, 0.32, 0.40, 0.30, 3.0));
    m
});

pub fn zone_default(zone: &str) -> ZoneEnvelopeDefault {
    ZONE_DEFAULTS
        .get(zone)
        .copied()
        .unwrap_or_else(|| *ZONE_DEFAULTS.get("4A").expect("4A is the documented fallback zone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_era_has_a_table_entry() {
        for era in [
            ConstructionEra::E1960s,
            ConstructionEra::E1970s,
            ConstructionEra::E1980s,
            ConstructionEra::E1990s,
            ConstructionEra::E2000s,
            ConstructionEra::E2010s,
            ConstructionEra::E2020s,
            ConstructionEra::New,
        ] {
            assert!(era_default(era).wall_r > 0.0);
        }
    }

    #[test]
    fn unknown_zone_falls_back_to_4a() {
        let fallback = zone_default("4A");
        let unknown = zone_default("9Z");
        assert_eq!(fallback.wall_r, unknown.wall_r);
    }
}
