// Distributed under the MIT License

//! Ventilación mecánica de línea base ASHRAE 62.2. Igual que la infiltración, la carga
//! latente solo se calcula para refrigeración.

const INDOOR_HR_SUMMER: f32 = 0.0112;

pub struct VentilationResult {
    pub cfm: f32,
    pub heating_sensible_btuh: f32,
    pub cooling_sensible_btuh: f32,
    pub cooling_latent_btuh: f32,
}

/// `bedroom_count` ya incluye el mínimo implícito de una habitación para
/// viviendas sin dormitorios detectados (estudios/lofts).
pub fn calculate(
    floor_area_ft2: f32,
    bedroom_count: u32,
    heat_recovery_efficiency: f32,
    heating_delta_t: f32,
    cooling_delta_t: f32,
    outdoor_hr_summer: f32,
) -> VentilationResult {
    let bedrooms = bedroom_count.max(1) as f32;
    let cfm = 0.03 * floor_area_ft2 + 7.5 * bedrooms;
    let recovery = heat_recovery_efficiency.clamp(0.0, 1.0);

    let heating_sensible_btuh = 1.08 * cfm * heating_delta_t * (1.0 - recovery);
    let cooling_sensible_btuh = 1.08 * cfm * cooling_delta_t * (1.0 - recovery);
    let delta_w = (outdoor_hr_summer - INDOOR_HR_SUMMER).max(0.0);
    let cooling_latent_btuh = 4840.0 * cfm * delta_w * (1.0 - recovery);

    VentilationResult {
        cfm,
        heating_sensible_btuh,
        cooling_sensible_btuh,
        cooling_latent_btuh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_recovery_reduces_the_sensible_load() {
        let without = calculate(1_500.0, 3, 0.0, 60.0, 20.0, 0.013);
        let with = calculate(1_500.0, 3, 0.7, 60.0, 20.0, 0.013);
        assert!(with.heating_sensible_btuh < without.heating_sensible_btuh);
    }

    #[test]
    fn cfm_follows_ashrae_622_baseline_formula() {
        let result = calculate(1_500.0, 3, 0.0, 60.0, 20.0, 0.013);
        assert!((result.cfm - (0.03 * 1_500.0 + 7.5 * 3.0)).abs() < 1e-4);
    }
}
