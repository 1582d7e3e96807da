// Distributed under the MIT License

//! Límite con el analizador de visión externo.
//!
//! El proveedor de visión se modela como una *capacidad* (un objeto que
//! implementa [`VisionProvider`]), nunca como una jerarquía de herencia: el
//! núcleo compone una lista ordenada de proveedores y se queda con el
//! primero que produzca un `TakeoffDocument` válido. Si todos fallan, el
//! resultado es [`VisionFailure::Unavailable`], que es recuperable: la
//! tubería continúa solo con los extractores deterministas.

mod compress;
mod mock;
mod parse;
mod provider;
mod takeoff;

pub use compress::{compress_for_upload, CompressionOutcome, CompressionTarget};
pub use mock::MockProvider;
pub use provider::{fallback_chain, VisionFailure, VisionProvider, VisionRequest};
pub use takeoff::{EnvelopeHints, RoomHint, ScaleHint, TakeoffDocument};
