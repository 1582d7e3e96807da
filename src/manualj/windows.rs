// Distributed under the MIT License

//! Ventanas: conducción
//! directa `U . A . delta_t` más ganancia solar de refrigeración
//! `A . SHGC . SolarFactor(orientacion, banda_latitud) . 0.85`.

use blueprint::Orientation;

use super::solar::solar_factor;

/// Factor de sombreado interior/exterior típico aplicado a la ganancia
/// solar bruta (persianas, aleros, suciedad del vidrio).
const SHADING_FACTOR: f32 = 0.85;

pub struct WindowResult {
    pub u_value: f32,
    pub conduction_heating_btuh: f32,
    pub conduction_cooling_btuh: f32,
    pub solar_cooling_btuh: f32,
}

pub fn calculate(
    u_value: f32,
    shgc: f32,
    area_ft2: f32,
    orientation: Orientation,
    zone_number: u8,
    heating_delta_t: f32,
    cooling_delta_t: f32,
) -> WindowResult {
    let conduction_heating_btuh = u_value * area_ft2 * heating_delta_t;
    let conduction_cooling_btuh = u_value * area_ft2 * cooling_delta_t;
    let solar_cooling_btuh = area_ft2 * shgc * solar_factor(orientation, zone_number) * SHADING_FACTOR;

    WindowResult {
        u_value,
        conduction_heating_btuh,
        conduction_cooling_btuh,
        solar_cooling_btuh,
    }
}

/// Conducción de puerta, sin componente solar.
pub fn door_conduction_btuh(u_door: f32, area_ft2: f32, heating_delta_t: f32, cooling_delta_t: f32) -> (f32, f32) {
    (u_door * area_ft2 * heating_delta_t, u_door * area_ft2 * cooling_delta_t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn south_window_gains_more_than_north_for_equal_area() {
        let south = calculate(0.35, 0.30, 20.0, Orientation::S, 4, 60.0, 20.0);
        let north = calculate(0.35, 0.30, 20.0, Orientation::N, 4, 60.0, 20.0);
        assert!(south.solar_cooling_btuh > north.solar_cooling_btuh);
    }

    #[test]
    fn conduction_scales_with_area() {
        let small = calculate(0.35, 0.30, 10.0, Orientation::S, 4, 60.0, 20.0);
        let big = calculate(0.35, 0.30, 20.0, Orientation::S, 4, 60.0, 20.0);
        assert!((big.conduction_heating_btuh - 2.0 * small.conduction_heating_btuh).abs() < 1e-3);
    }
}
