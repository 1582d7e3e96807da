// Distributed under the MIT License

use serde::{Deserialize, Serialize};

/// Procedencia de un valor resuelto en cualquier punto de la tubería de
/// ingestión: de dónde vino y con qué confianza.
///
/// Usado para que la capa de auditoría nunca tenga que rellenar a
/// posteriori: cada campo de `Room`/`Envelope` se etiqueta en el momento en
/// que se resuelve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSource {
    /// Anulación explícita del usuario.
    UserOverride,
    /// Tomado de una cartela/horario (schedule) rotulada en el plano.
    LabeledSchedule,
    /// Extraído por el analizador de visión con confianza alta (>= 0.8).
    VisionHighConfidence,
    /// Extraído por un extractor determinista de texto/vectores.
    RuleExtractor,
    /// Extraído por el analizador de visión con confianza baja (< 0.8).
    VisionLowConfidence,
    /// Sala u opening estimado por ampliación (augmentation) cuando el área
    /// total plausible no se alcanza.
    Augmented,
    /// Valor por defecto de zona climática.
    ZoneDefault,
    /// Valor por defecto de época constructiva.
    EraDefault,
    /// Valor de repliegue conservador ante un campo no resuelto.
    ConservativeDefault,
}

impl FieldSource {
    /// Orden de precedencia para resolución de conflictos en la fusión,
    /// de mayor a menor prioridad. Un número menor gana.
    pub fn precedence(self) -> u8 {
        match self {
            FieldSource::UserOverride => 0,
            FieldSource::LabeledSchedule => 1,
            FieldSource::VisionHighConfidence => 2,
            FieldSource::RuleExtractor => 3,
            FieldSource::VisionLowConfidence => 4,
            FieldSource::Augmented => 5,
            FieldSource::ZoneDefault => 6,
            FieldSource::EraDefault => 6,
            FieldSource::ConservativeDefault => 7,
        }
    }
}

/// Un valor junto con su procedencia y confianza, el bloque elemental del
/// registro de auditoría.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: FieldSource,
    pub confidence: f32,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: FieldSource, confidence: f32) -> Self {
        Sourced {
            value,
            source,
            confidence,
        }
    }
}
