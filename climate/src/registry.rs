// Distributed under the MIT License

use std::collections::HashMap;

use std::fmt;

use log::warn;
use once_cell::sync::Lazy;

use crate::zone::{ClimateDesign, ClimateSource};
use crate::FALLBACK_ZONE;

static ZIP_PREFIX_TO_ZONE: &str = include_str!("../data/zip_prefix_to_zone.csv");
static ZONE_TO_DESIGN: &str = include_str!("../data/zone_to_design.csv");

struct ZoneDesignRow {
    winter_99: f32,
    summer_1: f32,
    summer_wb: f32,
    daily_range: f32,
    hr_summer: f32,
    hr_winter: f32,
}

static PREFIX_TABLE: Lazy<HashMap<String, String>> = Lazy::new(|| parse_prefix_table(ZIP_PREFIX_TO_ZONE));
static ZONE_TABLE: Lazy<HashMap<String, ZoneDesignRow>> = Lazy::new(|| parse_zone_table(ZONE_TO_DESIGN));

fn parse_prefix_table(csv: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in csv.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ',');
        if let (Some(prefix), Some(zone)) = (parts.next(), parts.next()) {
            map.insert(prefix.trim().to_string(), zone.trim().to_string());
        }
    }
    map
}

fn parse_zone_table(csv: &str) -> HashMap<String, ZoneDesignRow> {
    let mut map = HashMap::new();
    for line in csv.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() != 7 {
            continue;
        }
        let zone = cols[0].trim().to_string();
        let row = ZoneDesignRow {
            winter_99: cols[1].trim().parse().unwrap_or(10.0),
            summer_1: cols[2].trim().parse().unwrap_or(89.0),
            summer_wb: cols[3].trim().parse().unwrap_or(74.0),
            daily_range: cols[4].trim().parse().unwrap_or(21.0),
            hr_summer: cols[5].trim().parse().unwrap_or(0.013),
            hr_winter: cols[6].trim().parse().unwrap_or(0.0024),
        };
        map.insert(zone, row);
    }
    map
}

/// Errores de validación de entrada para la consulta climática.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClimateRegistryError {
    /// El ZIP no tiene el formato de 5 dígitos exigido por el contrato.
    InvalidZip(String),
}

impl fmt::Display for ClimateRegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClimateRegistryError::InvalidZip(z) => {
                write!(f, "ZIP inválido, se esperaban 5 dígitos: {:?}", z)
            }
        }
    }
}

impl std::error::Error for ClimateRegistryError {}

/// Resuelve un ZIP de 5 dígitos a sus condiciones de diseño climático.
///
/// Un ZIP desconocido no es un error: recae en la zona `4A` documentada en
/// `FALLBACK_ZONE` con `source = ClimateSource::Fallback`, lo que reduce la
/// confianza aguas abajo pero no interrumpe la ejecución.
pub fn climate_for_zip(zip: &str) -> Result<ClimateDesign, ClimateRegistryError> {
    if zip.len() != 5 || !zip.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClimateRegistryError::InvalidZip(zip.to_string()));
    }

    let prefix3 = &zip[0..3];
    let (zone, source) = match PREFIX_TABLE.get(prefix3) {
        Some(z) => (z.clone(), ClimateSource::Matched),
        None => {
            warn!(
                "ZIP {} no reconocido en la tabla de zonas climáticas; usando zona de repliegue {}",
                zip, FALLBACK_ZONE
            );
            (FALLBACK_ZONE.to_string(), ClimateSource::Fallback)
        }
    };

    let row = ZONE_TABLE
        .get(&zone)
        .or_else(|| ZONE_TABLE.get(FALLBACK_ZONE))
        .expect("zone_to_design.csv debe incluir la zona de repliegue");

    Ok(ClimateDesign {
        zip: zip.to_string(),
        zone,
        winter_99: row.winter_99,
        summer_1: row.summer_1,
        summer_wb: row.summer_wb,
        daily_range: row.daily_range,
        humidity_ratio_summer: row.hr_summer,
        humidity_ratio_winter: row.hr_winter,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn known_zip_resolves_to_matched_zone() {
        init();
        let design = climate_for_zip("63101").unwrap();
        assert_eq!(design.zone, "4A");
        assert_eq!(design.source, ClimateSource::Matched);
    }

    #[test]
    fn houston_is_zone_2a() {
        init();
        let design = climate_for_zip("77001").unwrap();
        assert_eq!(design.zone, "2A");
    }

    #[test]
    fn minneapolis_is_zone_6a() {
        init();
        let design = climate_for_zip("55401").unwrap();
        assert_eq!(design.zone, "6A");
    }

    #[test]
    fn unknown_zip_falls_back() {
        init();
        let design = climate_for_zip("00001").unwrap();
        assert_eq!(design.zone, FALLBACK_ZONE);
        assert_eq!(design.source, ClimateSource::Fallback);
    }

    #[test]
    fn invalid_zip_is_rejected() {
        init();
        assert!(climate_for_zip("abc12").is_err());
        assert!(climate_for_zip("1234").is_err());
        assert!(climate_for_zip("123456").is_err());
    }

    #[test]
    fn climate_for_zip_is_idempotent() {
        init();
        let a = climate_for_zip("10001").unwrap();
        let b = climate_for_zip("10001").unwrap();
        assert_eq!(a.zone, b.zone);
    }

    #[test]
    fn sampled_zips_are_accepted_or_fallback() {
        init();
        for n in (10000u32..100000).step_by(97) {
            let zip = format!("{:05}", n);
            let result = climate_for_zip(&zip);
            assert!(result.is_ok(), "zip {} should resolve", zip);
        }
    }
}
