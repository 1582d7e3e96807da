// Distributed under the MIT License

//! Cubierta/techo, solo para la planta superior:
//! U efectivo por vía paralela con cabios 2x10 a 24" entre ejes por
//! defecto, y CLTD (`delta_t + 25 °F`) para la ganancia solar de
//! refrigeración en lugar de la diferencia de temperatura directa.

const R_FILMS: f32 = 1.10;
const R_SHEATHING: f32 = 0.70;
const WOOD_R_PER_INCH: f32 = 1.25;
const RAFTER_DEPTH_IN: f32 = 9.25;
/// Fracción de área del entramado a 24" entre ejes, menor que a 16" por
/// tener menos montantes por pie lineal de muro/cubierta.
const RAFTER_FRAMING_FRACTION: f32 = 0.11;

/// Incremento de CLTD sobre la diferencia de temperatura de diseño para la
/// ganancia solar en cubierta.
pub const ROOF_CLTD_OFFSET_F: f32 = 25.0;

pub fn effective_u(ceiling_r_nominal: f32) -> f32 {
    let r_cavity_path = ceiling_r_nominal + R_SHEATHING + R_FILMS;
    let r_framing_path = RAFTER_DEPTH_IN * WOOD_R_PER_INCH + R_SHEATHING + R_FILMS;

    let u_cavity = 1.0 / r_cavity_path;
    let u_framing = 1.0 / r_framing_path;

    RAFTER_FRAMING_FRACTION * u_framing + (1.0 - RAFTER_FRAMING_FRACTION) * u_cavity
}

/// `(u_effective, heating_btuh, cooling_btuh)`. La refrigeración usa CLTD
/// (`cooling_delta_t + 25 °F`) en vez de la diferencia directa.
pub fn conduction_btuh(
    ceiling_r_nominal: f32,
    top_floor_area_ft2: f32,
    heating_delta_t: f32,
    cooling_delta_t: f32,
) -> (f32, f32, f32) {
    let u = effective_u(ceiling_r_nominal);
    let heating_btuh = u * top_floor_area_ft2 * heating_delta_t;
    let cltd = cooling_delta_t + ROOF_CLTD_OFFSET_F;
    let cooling_btuh = u * top_floor_area_ft2 * cltd;
    (u, heating_btuh, cooling_btuh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cltd_inflates_cooling_above_plain_delta_t() {
        let (u, _, cooling) = conduction_btuh(38.0, 1_500.0, 60.0, 20.0);
        let plain = u * 1_500.0 * 20.0;
        assert!(cooling > plain);
    }

    #[test]
    fn higher_insulation_lowers_both_loads() {
        let (_, h_low, c_low) = conduction_btuh(19.0, 1_500.0, 60.0, 20.0);
        let (_, h_high, c_high) = conduction_btuh(49.0, 1_500.0, 60.0, 20.0);
        assert!(h_high < h_low);
        assert!(c_high < c_low);
    }
}
