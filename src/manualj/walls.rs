// Distributed under the MIT License

//! Conducción de muro: U efectivo por la vía
//! paralela — la cavidad aislada en serie con revestimiento y películas de
//! superficie, combinada en paralelo con la vía de entramado de madera —
//! con el tipo de entramado inferido del R nominal declarado.

use crate::conservative::clamp_wall_effective_r;
use crate::model::ClampRecord;

const R_FILMS: f32 = 0.85;
const R_SHEATHING: f32 = 0.60;
/// Resistencia térmica de la madera de entramado por pulgada de espesor.
const WOOD_R_PER_INCH: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingType {
    /// 2x4 a 16" entre ejes: entramado mayoritario para muros R < 19.
    Stud2x4At16,
    /// 2x6 a 16" entre ejes: usado cuando el R nominal de cavidad alcanza 19+.
    Stud2x6At16,
}

impl FramingType {
    /// Profundidad nominal del entramado en pulgadas.
    fn depth_in(self) -> f32 {
        match self {
            FramingType::Stud2x4At16 => 3.5,
            FramingType::Stud2x6At16 => 5.5,
        }
    }

    /// Fracción de área ocupada por el entramado (montantes, soleras,
    /// dinteles, jambas) frente a la cavidad aislada, a 16" entre ejes.
    fn framing_fraction(self) -> f32 {
        match self {
            FramingType::Stud2x4At16 => 0.23,
            FramingType::Stud2x6At16 => 0.25,
        }
    }
}

/// Infiere el tipo de entramado del R nominal de cavidad: R>=19 implica
/// montantes de 2x6 a 16" entre ejes, en caso contrario 2x4.
pub fn infer_framing(cavity_r_nominal: f32) -> FramingType {
    if cavity_r_nominal >= 19.0 {
        FramingType::Stud2x6At16
    } else {
        FramingType::Stud2x4At16
    }
}

/// U efectivo de muro por la vía paralela: la vía de cavidad (R de
/// aislamiento + revestimiento + películas) en paralelo con la vía de
/// entramado (R de la madera en la misma profundidad + revestimiento +
/// películas), ponderadas por sus fracciones de área respectivas.
pub fn effective_u(cavity_r_nominal: f32) -> f32 {
    let framing = infer_framing(cavity_r_nominal);
    let r_cavity_path = cavity_r_nominal + R_SHEATHING + R_FILMS;
    let r_framing_path = framing.depth_in() * WOOD_R_PER_INCH + R_SHEATHING + R_FILMS;

    let u_cavity = 1.0 / r_cavity_path;
    let u_framing = 1.0 / r_framing_path;

    let ff = framing.framing_fraction();
    ff * u_framing + (1.0 - ff) * u_cavity
}

/// Carga de muro: `U_effective . A_net . delta_t`, con `A_net` ya excluyendo
/// el área de ventanas y puertas (calculada aguas arriba en `geometry`).
pub fn conduction_btuh(cavity_r_nominal: f32, net_area_ft2: f32, delta_t: f32) -> (f32, f32) {
    let u = effective_u(cavity_r_nominal);
    (u, u * net_area_ft2 * delta_t)
}

/// U efectivo de muro con el clamp de saneamiento aplicado: el R
/// efectivo (`1/U`) nunca supera 18, ni siquiera para un muro R-20+5ci.
/// El envolvente expone un único `wall_r` por edificio, así que este clamp
/// se evalúa una vez y se reutiliza para todas las salas.
pub fn effective_u_clamped(cavity_r_nominal: f32) -> (f32, Option<ClampRecord>) {
    let u = effective_u(cavity_r_nominal);
    let r_effective = 1.0 / u;
    let (r_clamped, clamp) = clamp_wall_effective_r(r_effective);
    (1.0 / r_clamped, clamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r19_and_above_use_2x6_framing() {
        assert_eq!(infer_framing(19.0), FramingType::Stud2x6At16);
        assert_eq!(infer_framing(13.0), FramingType::Stud2x4At16);
    }

    #[test]
    fn higher_cavity_r_lowers_effective_u() {
        let (u_low, _) = conduction_btuh(13.0, 100.0, 60.0);
        let (u_high, _) = conduction_btuh(21.0, 100.0, 60.0);
        assert!(u_high < u_low);
    }

    #[test]
    fn parallel_path_u_is_between_cavity_and_framing_only() {
        let u = effective_u(13.0);
        let u_cavity_only = 1.0 / (13.0 + R_SHEATHING + R_FILMS);
        let u_framing_only = 1.0 / (3.5 * WOOD_R_PER_INCH + R_SHEATHING + R_FILMS);
        assert!(u > u_cavity_only);
        assert!(u < u_framing_only);
    }

    #[test]
    fn very_high_cavity_r_triggers_the_effective_r_ceiling() {
        let (u_clamped, clamp) = effective_u_clamped(38.0);
        assert!(clamp.is_some());
        assert!((1.0 / u_clamped - 18.0).abs() < 1e-3);
    }

    #[test]
    fn ordinary_cavity_r_never_clamps() {
        let (u_clamped, clamp) = effective_u_clamped(13.0);
        assert!(clamp.is_none());
        assert!((u_clamped - effective_u(13.0)).abs() < 1e-6);
    }
}
