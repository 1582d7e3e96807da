// Distributed under the MIT License

//! Carga de cimentación: un único
//! componente de edificio completo, no por sala, calculado según el tipo
//! de cimentación resuelto en la envolvente. Usa el factor F de perímetro
//! para losa,
//! U de piso para cámara sanitaria (crawlspace) y U bajo rasante atenuado
//! para sótano.

use crate::model::FoundationKind;

const R_FILMS: f32 = 1.35;
const BASEMENT_WALL_HEIGHT_FT: f32 = 7.0;

pub struct FoundationResult {
    pub heating_btuh: f32,
    pub cooling_btuh: f32,
}

/// `floor_r` es la resistencia resuelta en la envolvente para el elemento en
/// contacto con el terreno: aislamiento bajo losa, piso sobre cámara
/// sanitaria o muro de sótano, según `kind`.
pub fn calculate(
    kind: FoundationKind,
    perimeter_ft: f32,
    floor_area_ft2: f32,
    floor_r: f32,
    heating_delta_t: f32,
    cooling_delta_t: f32,
) -> FoundationResult {
    match kind {
        FoundationKind::Slab => {
            let f_factor = (0.54 / (1.0 + floor_r / 10.0)).max(0.20);
            let heating_btuh = f_factor * perimeter_ft * heating_delta_t;
            let cooling_btuh = f_factor * perimeter_ft * cooling_delta_t;
            FoundationResult { heating_btuh, cooling_btuh }
        }
        FoundationKind::CrawlVented | FoundationKind::CrawlConditioned => {
            let u_floor = 1.0 / (floor_r + R_FILMS);
            let vented_factor = if kind == FoundationKind::CrawlVented { 1.0 } else { 0.5 };
            let heating_btuh = u_floor * floor_area_ft2 * heating_delta_t * vented_factor;
            let cooling_btuh = u_floor * floor_area_ft2 * cooling_delta_t * vented_factor;
            FoundationResult { heating_btuh, cooling_btuh }
        }
        FoundationKind::BasementUnheated | FoundationKind::BasementConditioned => {
            let wall_area_ft2 = perimeter_ft * BASEMENT_WALL_HEIGHT_FT;
            let u_below_grade = 1.0 / (10.0 + floor_r);
            let exposure_factor = if kind == FoundationKind::BasementConditioned { 0.4 } else { 0.7 };
            let heating_btuh = u_below_grade * wall_area_ft2 * heating_delta_t * exposure_factor;
            let cooling_btuh = u_below_grade * wall_area_ft2 * cooling_delta_t * exposure_factor;
            FoundationResult { heating_btuh, cooling_btuh }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insulated_slab_loses_less_than_uninsulated() {
        let insulated = calculate(FoundationKind::Slab, 160.0, 1_500.0, 10.0, 60.0, 0.0);
        let bare = calculate(FoundationKind::Slab, 160.0, 1_500.0, 0.0, 60.0, 0.0);
        assert!(insulated.heating_btuh < bare.heating_btuh);
    }

    #[test]
    fn conditioned_basement_loses_less_than_unheated() {
        let conditioned = calculate(FoundationKind::BasementConditioned, 160.0, 1_500.0, 10.0, 60.0, 0.0);
        let unheated = calculate(FoundationKind::BasementUnheated, 160.0, 1_500.0, 10.0, 60.0, 0.0);
        assert!(conditioned.heating_btuh < unheated.heating_btuh);
    }
}
