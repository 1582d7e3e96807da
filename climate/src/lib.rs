// Distributed under the MIT License

//! Zona climática IECC y condiciones de diseño ASHRAE a partir de un código postal.
//!
//! Expone la tabla estática `zip_prefix_to_zone.csv` -> `zone_to_design.csv`
//! como el registro climático del motor de cálculo de cargas: toma un
//! ZIP de 5 dígitos y devuelve las temperaturas y humedades de diseño de la
//! zona climática IECC correspondiente, con una zona de repliegue documentada
//! para códigos postales no reconocidos.

mod registry;
mod zone;

pub use registry::{climate_for_zip, ClimateRegistryError};
pub use zone::{ClimateDesign, ClimateSource};

/// Zona IECC usada cuando un ZIP no aparece en la tabla de prefijos.
pub const FALLBACK_ZONE: &str = "4A";
