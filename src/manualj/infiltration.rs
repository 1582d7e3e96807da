// Distributed under the MIT License

//! Infiltración AIM-2 simplificado: convierte ACH50 en ACH natural vía un factor de
//! división dependiente de plantas y exposición al viento, separado por
//! estación porque el viento y el efecto chimenea de diseño difieren entre
//! calefacción (15 mph) y refrigeración (10 mph). La carga latente solo se
//! calcula para refrigeración: Manual J no atribuye una carga de
//! deshumidificación a la calefacción de combustión.

use crate::conservative::{clamp_ach_natural, clamp_infiltration_cfm, WindShielding};
use crate::model::ClampRecord;

const INDOOR_HR_SUMMER: f32 = 0.0112;

fn n_factor(stories: u8, shielding: WindShielding, heating_season: bool) -> f32 {
    let base = match (stories <= 1, shielding) {
        (true, WindShielding::Exposed) => 15.0,
        (true, WindShielding::Normal) => 17.0,
        (true, WindShielding::Shielded) => 19.0,
        (false, WindShielding::Exposed) => 13.0,
        (false, WindShielding::Normal) => 15.0,
        (false, WindShielding::Shielded) => 17.0,
    };
    // El viento de diseño y el efecto chimenea son mayores en temporada de
    // calefacción (15 mph) que en refrigeración (10 mph): un divisor menor
    // produce más infiltración natural para la misma ACH50.
    if heating_season {
        base * 0.92
    } else {
        base
    }
}

pub struct InfiltrationResult {
    pub heating_sensible_btuh: f32,
    pub cooling_sensible_btuh: f32,
    pub cooling_latent_btuh: f32,
    pub clamps: Vec<ClampRecord>,
}

#[allow(clippy::too_many_arguments)]
pub fn calculate(
    ach50: f32,
    stories: u8,
    shielding: WindShielding,
    is_new_construction: bool,
    volume_ft3: f32,
    floor_area_ft2: f32,
    heating_delta_t: f32,
    cooling_delta_t: f32,
    indoor_hr_outdoor_summer: f32,
) -> InfiltrationResult {
    let mut clamps = Vec::new();

    let ach_nat_heating_raw = ach50 / n_factor(stories, shielding, true);
    let (ach_nat_heating, clamp_h) = clamp_ach_natural(ach_nat_heating_raw, is_new_construction);
    if let Some(c) = clamp_h {
        clamps.push(c);
    }

    let ach_nat_cooling_raw = ach50 / n_factor(stories, shielding, false);
    let (ach_nat_cooling, clamp_c) = clamp_ach_natural(ach_nat_cooling_raw, is_new_construction);
    if let Some(c) = clamp_c {
        clamps.push(c);
    }

    let cfm_heating_raw = ach_nat_heating * volume_ft3 / 60.0;
    let (cfm_heating, clamp_cfm_h) = clamp_infiltration_cfm(cfm_heating_raw, floor_area_ft2);
    if let Some(c) = clamp_cfm_h {
        clamps.push(c);
    }

    let cfm_cooling_raw = ach_nat_cooling * volume_ft3 / 60.0;
    let (cfm_cooling, clamp_cfm_c) = clamp_infiltration_cfm(cfm_cooling_raw, floor_area_ft2);
    if let Some(c) = clamp_cfm_c {
        clamps.push(c);
    }

    let heating_sensible_btuh = 1.08 * cfm_heating * heating_delta_t;
    let cooling_sensible_btuh = 1.08 * cfm_cooling * cooling_delta_t;

    let delta_w = (indoor_hr_outdoor_summer - INDOOR_HR_SUMMER).max(0.0);
    let cooling_latent_btuh = 4840.0 * cfm_cooling * delta_w;

    InfiltrationResult {
        heating_sensible_btuh,
        cooling_sensible_btuh,
        cooling_latent_btuh,
        clamps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tighter_ach50_yields_less_infiltration() {
        let tight = calculate(2.0, 1, WindShielding::Normal, true, 12_000.0, 1_500.0, 60.0, 20.0, 0.013);
        let loose = calculate(10.0, 1, WindShielding::Normal, true, 12_000.0, 1_500.0, 60.0, 20.0, 0.013);
        assert!(tight.heating_sensible_btuh < loose.heating_sensible_btuh);
    }

    #[test]
    fn cfm_ceiling_clamps_very_leaky_homes() {
        let result = calculate(40.0, 1, WindShielding::Exposed, false, 12_000.0, 1_500.0, 60.0, 20.0, 0.013);
        assert!(!result.clamps.is_empty());
    }
}
