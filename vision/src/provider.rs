// Distributed under the MIT License

use std::time::Duration;

use log::{info, warn};

use crate::parse::parse_takeoff_response;
use crate::takeoff::TakeoffDocument;

/// Petición al proveedor de visión: imágenes de página ya comprimidas, el
/// esquema de prompt estructurado (incluye el ZIP y los campos pedidos) y un
/// timeout duro por intento.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub images: Vec<Vec<u8>>,
    pub prompt_schema: String,
    pub timeout: Duration,
}

/// Fallos tipados del límite de visión. Ninguno de ellos es crítico para la
/// ejecución: el núcleo siempre puede continuar solo con los extractores de
/// reglas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisionFailure {
    #[error("el proveedor de visión superó el timeout de {0:?}")]
    Timeout(Duration),
    #[error("el proveedor de visión devolvió una respuesta no interpretable: {0}")]
    UnparsableResponse(String),
    #[error("el proveedor de visión rechazó la solicitud: {0}")]
    Refused(String),
    #[error("no hay proveedores de visión configurados")]
    Unavailable,
}

/// Capacidad de extracción estructurada: cualquier tipo que sepa responder a
/// una `VisionRequest` con el texto crudo devuelto por el modelo (que luego
/// se interpreta con `parse_takeoff_response`) o un fallo tipado. Se compone
/// por lista ordenada, nunca por herencia.
pub trait VisionProvider {
    /// Identificador estable del modelo/proveedor (para el `model_id` del
    /// resultado y para la auditoría).
    fn model_id(&self) -> &str;

    /// Intenta obtener una respuesta cruda (JSON, posiblemente envuelto en
    /// Markdown) a partir de la petición.
    fn analyze(&self, request: &VisionRequest) -> Result<String, VisionFailure>;
}

/// Prueba cada proveedor en orden hasta que uno produzca un documento
/// estructuralmente válido. Ninguno se reintenta: un proveedor que falla se
/// descarta y se pasa al siguiente ("model fallback", no "retry").
///
/// El presupuesto temporal total del encadenado se limita a `total_budget`
/// (por defecto 240 s en el núcleo); si se agota antes de agotar la lista de
/// proveedores, el resto se descarta y se devuelve `Unavailable`.
pub fn fallback_chain(
    providers: &[Box<dyn VisionProvider>],
    request: &VisionRequest,
    total_budget: Duration,
) -> Result<TakeoffDocument, VisionFailure> {
    if providers.is_empty() {
        return Err(VisionFailure::Unavailable);
    }

    let started = std::time::Instant::now();
    for provider in providers {
        if started.elapsed() >= total_budget {
            warn!(
                "presupuesto de visión ({:?}) agotado antes de probar {}",
                total_budget,
                provider.model_id()
            );
            break;
        }
        match provider.analyze(request) {
            Ok(raw_text) => match parse_takeoff_response(&raw_text, provider.model_id()) {
                Ok(doc) => {
                    info!(
                        "proveedor de visión {} produjo un takeoff válido",
                        provider.model_id()
                    );
                    return Ok(doc);
                }
                Err(e) => {
                    warn!(
                        "proveedor de visión {} devolvió un documento inválido ({}), probando el siguiente",
                        provider.model_id(),
                        e
                    );
                    continue;
                }
            },
            Err(e) => {
                warn!("proveedor de visión {} falló: {}", provider.model_id(), e);
                continue;
            }
        }
    }
    Err(VisionFailure::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysRefuses;
    impl VisionProvider for AlwaysRefuses {
        fn model_id(&self) -> &str {
            "always-refuses"
        }
        fn analyze(&self, _request: &VisionRequest) -> Result<String, VisionFailure> {
            Ok("I'm sorry, I can't help with that.".to_string())
        }
    }

    struct AlwaysSucceeds;
    impl VisionProvider for AlwaysSucceeds {
        fn model_id(&self) -> &str {
            "always-succeeds"
        }
        fn analyze(&self, _request: &VisionRequest) -> Result<String, VisionFailure> {
            Ok(r#"{"floor_analysis":"ok","rooms":[],"envelope_hints":{"confidence":0.6},"scale_hint":{"confidence":0.6},"confidence":0.7,"model_id":"always-succeeds"}"#.to_string())
        }
    }

    fn req() -> VisionRequest {
        VisionRequest {
            images: vec![],
            prompt_schema: "schema".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn falls_through_to_next_provider() {
        let providers: Vec<Box<dyn VisionProvider>> =
            vec![Box::new(AlwaysRefuses), Box::new(AlwaysSucceeds)];
        let doc = fallback_chain(&providers, &req(), Duration::from_secs(10)).unwrap();
        assert_eq!(doc.model_id, "always-succeeds");
    }

    #[test]
    fn all_providers_failing_is_unavailable() {
        let providers: Vec<Box<dyn VisionProvider>> = vec![Box::new(AlwaysRefuses)];
        let err = fallback_chain(&providers, &req(), Duration::from_secs(10)).unwrap_err();
        assert_eq!(err, VisionFailure::Unavailable);
    }

    #[test]
    fn no_providers_is_unavailable() {
        let providers: Vec<Box<dyn VisionProvider>> = vec![];
        let err = fallback_chain(&providers, &req(), Duration::from_secs(10)).unwrap_err();
        assert_eq!(err, VisionFailure::Unavailable);
    }
}
