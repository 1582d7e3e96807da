// Distributed under the MIT License

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Procedencia de una `ClimateDesign` resuelta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateSource {
    /// El ZIP apareció en la tabla de prefijos.
    Matched,
    /// El ZIP no apareció en la tabla; se usó la zona de repliegue documentada.
    Fallback,
}

impl Display for ClimateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let printable = match *self {
            ClimateSource::Matched => "matched",
            ClimateSource::Fallback => "fallback",
        };
        write!(f, "{}", printable)
    }
}

/// Condiciones de diseño ASHRAE para una zona climática IECC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateDesign {
    /// ZIP de 5 dígitos que originó la consulta.
    pub zip: String,
    /// Zona climática IECC, p.ej. "4A", "5B", "7".
    pub zone: String,
    /// Temperatura de diseño de calefacción 99% (°F).
    pub winter_99: f32,
    /// Temperatura de diseño de refrigeración 1% (°F, bulbo seco).
    pub summer_1: f32,
    /// Temperatura de bulbo húmedo coincidente de refrigeración (°F).
    pub summer_wb: f32,
    /// Oscilación térmica diaria (°F).
    pub daily_range: f32,
    /// Relación de humedad exterior de verano (lb agua / lb aire seco).
    pub humidity_ratio_summer: f32,
    /// Relación de humedad exterior de invierno (lb agua / lb aire seco).
    pub humidity_ratio_winter: f32,
    /// Procedencia de la resolución (`matched` o `fallback`).
    pub source: ClimateSource,
}

impl ClimateDesign {
    /// Número de zona IECC (dígito inicial, p.ej. "4A" -> 4), usado para
    /// derivar la banda de latitud del factor solar en el cálculo Manual J.
    pub fn zone_number(&self) -> u8 {
        self.zone
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(4)
    }
}
