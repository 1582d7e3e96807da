// Distributed under the MIT License

//! Factor de pérdida en conductos: multiplicador
//! aplicado a la carga sensible de calefacción/refrigeración en función de
//! dónde discurren los conductos de distribución de aire.

use crate::model::DuctLocation;

/// `(factor_calefaccion, factor_refrigeracion)`.
pub fn factors(location: DuctLocation) -> (f32, f32) {
    match location {
        DuctLocation::Conditioned => (1.00, 1.00),
        DuctLocation::Basement => (1.10, 1.04),
        DuctLocation::Crawl => (1.15, 1.10),
        DuctLocation::VentedAttic => (1.25, 1.25),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vented_attic_is_the_worst_case() {
        let (h_attic, c_attic) = factors(DuctLocation::VentedAttic);
        let (h_cond, c_cond) = factors(DuctLocation::Conditioned);
        assert!(h_attic > h_cond);
        assert!(c_attic > c_cond);
    }
}
