// Distributed under the MIT License

use serde::{Deserialize, Serialize};

/// Pista de sala propuesta por el proveedor de visión.
///
/// Los campos numéricos se dan en pies (ft); el analizador de visión nunca
/// conoce la escala de píxeles, solo interpreta el plano junto al prompt
/// estructurado que se le envía.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoomHint {
    /// Nombre o etiqueta tal como aparece en el plano.
    pub name: String,
    /// Tipo de sala en texto libre; el fusionador lo normaliza.
    pub kind_hint: String,
    pub area_ft2: Option<f32>,
    pub width_ft: Option<f32>,
    pub height_ft: Option<f32>,
    pub floor_index: Option<i32>,
    pub confidence: f32,
}

/// Pistas de envolvente térmica detectadas por el proveedor de visión.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvelopeHints {
    pub wall_r: Option<f32>,
    pub ceiling_r: Option<f32>,
    pub floor_r: Option<f32>,
    pub window_u: Option<f32>,
    pub ach50: Option<f32>,
    pub foundation_kind: Option<String>,
    pub duct_location: Option<String>,
    pub confidence: f32,
}

/// Pista de escala propuesta por el proveedor de visión (orientativa, nunca
/// sustituye al estimador determinista; solo se usa como señal adicional
/// de calidad).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScaleHint {
    pub pixels_per_foot: Option<f32>,
    pub notation: Option<String>,
    pub confidence: f32,
}

/// Documento de salida validado del proveedor de visión.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TakeoffDocument {
    /// Resumen textual libre del análisis de planta (para auditoría).
    pub floor_analysis: String,
    pub rooms: Vec<RoomHint>,
    pub envelope_hints: EnvelopeHints,
    pub scale_hint: ScaleHint,
    pub confidence: f32,
    pub model_id: String,
}

impl TakeoffDocument {
    /// Un documento es válido si no contiene una frase de rechazo tipo y su
    /// confianza global está en `[0,1]`. Las salas pueden ser una lista vacía
    /// (`rooms: []`) sin que eso invalide el documento: el contrato exige
    /// "produce una lista de salas incluso si está vacía".
    pub fn is_structurally_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence) && !self.model_id.is_empty()
    }
}
