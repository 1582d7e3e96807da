// Distributed under the MIT License

//! `loadcalc`: motor de fiabilidad de cargas de diseño residenciales de
//! calefacción y refrigeración (ACCA Manual J, 8ª edición) a partir de un
//! plano arquitectónico (PDF), un código postal y un puñado de suposiciones
//! de usuario.
//!
//! El único punto de entrada público es [`estimate`]; todo lo demás en este
//! paquete es el modelo de datos y los colaboradores que `estimate`
//! orquesta. El núcleo no rasteriza PDFs, no invoca el analizador de visión
//! por sí mismo, y no persiste nada: recibe sus colaboradores inyectados
//! (`PdfSource`, `vision::VisionProvider`) y devuelve un resultado en
//! memoria.

pub mod audit;
pub mod baselines;
pub mod config;
pub mod conservative;
pub mod defaults;
pub mod envelope;
pub mod errors;
pub mod geometry;
pub mod manualj;
pub mod model;
pub mod quality;
pub mod reliability;
pub mod run;

pub use config::RunConfig;
pub use errors::{Failure, NeedsInputDetails, NeedsInputKind, Outcome, Recoverable, ScaleAlternative};
pub use model::{
    AuditReport, Candidate, CandidateName, ClampRecord, ComponentKind, ComponentLoad, ConstructionEra, DuctConfig,
    DuctLocation, Envelope, EnvelopeOverrides, EstimateRequest, FoundationKind, HeatingFuel, OrientationBand,
    ProvenanceEntry, QualityRouting, QualityScore, ReliabilityResult, UserAssumptions, Weights, WindowSpec,
};
pub use run::{estimate, PdfSource, VisionSemaphore};
