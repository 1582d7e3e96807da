// Distributed under the MIT License

use crate::provider::{VisionFailure, VisionProvider, VisionRequest};
use crate::takeoff::TakeoffDocument;

/// Proveedor de visión determinista para pruebas y para ejecuciones sin
/// acceso a un modelo externo real. Devuelve siempre el mismo documento (o
/// siempre falla), según se configure.
pub struct MockProvider {
    id: String,
    response: MockResponse,
}

enum MockResponse {
    Document(TakeoffDocument),
    Refuse,
    Unparsable,
}

impl MockProvider {
    pub fn always_returns(id: impl Into<String>, doc: TakeoffDocument) -> Self {
        Self {
            id: id.into(),
            response: MockResponse::Document(doc),
        }
    }

    pub fn always_refuses(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: MockResponse::Refuse,
        }
    }

    pub fn always_unparsable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: MockResponse::Unparsable,
        }
    }
}

impl VisionProvider for MockProvider {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn analyze(&self, _request: &VisionRequest) -> Result<String, VisionFailure> {
        match &self.response {
            MockResponse::Document(doc) => {
                let mut doc = doc.clone();
                if doc.model_id.is_empty() {
                    doc.model_id = self.id.clone();
                }
                Ok(serde_json::to_string(&doc).expect("TakeoffDocument siempre serializable"))
            }
            MockResponse::Refuse => Ok("I'm sorry, I can't assist with that request.".to_string()),
            MockResponse::Unparsable => Ok("<<garbled response>>".to_string()),
        }
    }
}
