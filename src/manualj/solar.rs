// Distributed under the MIT License

//! Ganancia solar por ventana: factor
//! solar por orientación, ajustado por banda de latitud derivada de la
//! zona climática IECC.

use blueprint::Orientation;

/// Factor solar de pico (BTU/h·ft² a SHGC = 1.0) por orientación de
/// fachada, banda de latitud media (zona 3-4). Valores relativos entre
/// orientaciones, no una medición de irradiancia real.
fn base_factor(orientation: Orientation) -> f32 {
    match orientation {
        Orientation::N => 30.0,
        Orientation::NE => 80.0,
        Orientation::E => 150.0,
        Orientation::SE => 120.0,
        Orientation::S => 100.0,
        Orientation::SW => 120.0,
        Orientation::W => 150.0,
        Orientation::NW => 80.0,
        Orientation::Unknown => 100.0,
    }
}

fn latitude_band(zone_number: u8) -> u8 {
    match zone_number {
        1 | 2 => 1,
        3 | 4 => 2,
        5 | 6 => 3,
        _ => 4,
    }
}

fn latitude_multiplier(band: u8) -> f32 {
    match band {
        1 => 1.05,
        2 => 1.00,
        3 => 0.95,
        _ => 0.90,
    }
}

/// Factor solar aplicado a `area_ft2 * shgc` para obtener la ganancia de
/// refrigeración de una ventana.
pub fn solar_factor(orientation: Orientation, zone_number: u8) -> f32 {
    base_factor(orientation) * latitude_multiplier(latitude_band(zone_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn south_facing_gains_more_than_north_facing() {
        assert!(solar_factor(Orientation::S, 4) > solar_factor(Orientation::N, 4));
    }

    #[test]
    fn higher_latitude_band_reduces_the_factor() {
        assert!(solar_factor(Orientation::S, 7) < solar_factor(Orientation::S, 2));
    }
}
