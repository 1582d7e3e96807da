// Distributed under the MIT License

//! Taxonomía pública de errores: variantes etiquetadas, nunca
//! excepciones para control de flujo. `NeedsInput` es una variante de
//! [`Outcome`], no de [`Failure`]: el contrato distingue explícitamente
//! "necesita más información" de "ha fallado".

use thiserror::Error;

/// Alternativa de escala ofrecida al usuario cuando ningún método alcanza
/// la confianza mínima de selección.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScaleAlternative {
    pub pixels_per_foot: f32,
    pub confidence: f32,
    pub evidence: String,
}

/// Qué aspecto de la entrada requiere intervención humana.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum NeedsInputKind {
    Scale,
    PlanQuality,
}

/// Detalle adjunto a un retorno `NeedsInput`: qué se pidió y, cuando
/// aplica, las alternativas entre las que elegir.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NeedsInputDetails {
    pub kind: NeedsInputKind,
    pub message: String,
    pub alternatives: Vec<ScaleAlternative>,
}

/// Retorno de `estimate()`: éxito (con o sin necesidad de más datos) o
/// fallo tipado. `NeedsInput` nunca es un `Err`.
pub enum Outcome<T> {
    Complete(T),
    NeedsInput(NeedsInputDetails),
}

/// Fallos críticos (abortan la ejecución) y de validación (entrada
/// rechazada antes de empezar). Los recuperables (`VisionUnavailable`,
/// `ScaleVarianceTooHigh`, `RoomsBelowMinimum`, `ClimateFallback`,
/// `ClampApplied`) no aparecen aquí: se registran como advertencias en el
/// `AuditReport` y la ejecución continúa.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("el documento fuente no se pudo leer: {0}")]
    SourceUnreadable(String),

    #[error("intento de modificar la escala ya fijada para esta ejecución")]
    ScaleConflict,

    #[error("invariante interno violado: {0}")]
    InternalInvariant(String),

    #[error("ZIP inválido, se esperaban 5 dígitos: {0}")]
    InvalidZip(String),

    #[error("suposición de usuario inválida: {0}")]
    InvalidAssumption(String),

    #[error("la ejecución superó el plazo de {0:?}")]
    TimedOut(std::time::Duration),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error elevado cuando, tras filtrar salas fuera de rango, el área total
/// del edificio queda fuera de `[min_total, max_total]`.
/// No es parte de `Failure`: se traduce a `Outcome::NeedsInput` por el
/// llamador, nunca se propaga como fallo duro.
#[derive(Debug, Clone)]
pub struct TotalAreaOutOfBounds {
    pub total_area_ft2: f32,
    pub min_total_sqft: f32,
    pub max_total_sqft: f32,
}

/// Warnings recuperables acumulados durante una ejecución; cada uno se
/// adjunta al `AuditReport` en vez de interrumpir el cálculo.
#[derive(Debug, Clone)]
pub enum Recoverable {
    VisionUnavailable(String),
    ScaleVarianceTooHigh(f32),
    RoomsBelowMinimum { found: usize, minimum: usize },
    ClimateFallback { zip: String, zone: String },
    ClampApplied { name: String, original: f32, clamped: f32 },
    Augmented { rooms_added: usize },
    Other(String),
}

impl Recoverable {
    pub fn message(&self) -> String {
        match self {
            Recoverable::VisionUnavailable(detail) => {
                format!("analizador de visión no disponible: {detail}")
            }
            Recoverable::ScaleVarianceTooHigh(pct) => {
                format!("varianza de escala {pct:.2}% supera el 5%, se recurre a validación por tamaño de sala")
            }
            Recoverable::RoomsBelowMinimum { found, minimum } => format!(
                "se detectaron {found} salas, por debajo del mínimo plausible {minimum}; se amplió con salas típicas"
            ),
            Recoverable::ClimateFallback { zip, zone } => format!(
                "ZIP {zip} no reconocido; se usó la zona de repliegue {zone}"
            ),
            Recoverable::ClampApplied { name, original, clamped } => format!(
                "clamp '{name}' aplicado: {original:.3} -> {clamped:.3}"
            ),
            Recoverable::Augmented { rooms_added } => {
                format!("se añadieron {rooms_added} salas estimadas para alcanzar un área plausible")
            }
            Recoverable::Other(msg) => msg.clone(),
        }
    }
}

/// Construye el mensaje recomendado para un `NeedsInput` de escala, en el
/// formato "Establezca la escala a ..." con la mejor alternativa disponible.
pub fn scale_recommendation(alternatives: &[ScaleAlternative]) -> String {
    let Some(best) = alternatives
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
    else {
        return "No se pudo determinar una escala fiable; indique la escala manualmente".to_string();
    };
    format!(
        "Establezca la escala a {:.0} px/ft ({})",
        best.pixels_per_foot, best.evidence
    )
}

/// Comprueba que el área total fusionada cae dentro de los límites
/// plausibles configurados; usado por `run.rs` tras la fusión del
/// levantamiento para decidir si procede pedir más datos al usuario.
pub fn check_total_area_bounds(
    total_area_ft2: f32,
    min_total_sqft: f32,
    max_total_sqft: f32,
) -> Result<(), TotalAreaOutOfBounds> {
    if (min_total_sqft..=max_total_sqft).contains(&total_area_ft2) {
        Ok(())
    } else {
        Err(TotalAreaOutOfBounds {
            total_area_ft2,
            min_total_sqft,
            max_total_sqft,
        })
    }
}
