// Distributed under the MIT License

use crate::provider::VisionFailure;
use crate::takeoff::TakeoffDocument;

/// Frases de rechazo estándar que algunos modelos devuelven en lugar de un
/// JSON válido cuando se niegan a procesar la imagen. Cualquier coincidencia
/// (sin distinguir mayúsculas) hace que la respuesta se trate como un fallo,
/// nunca como un takeoff vacío pero "válido".
const REFUSAL_PHRASES: &[&str] = &[
    "i'm sorry, i can't",
    "i cannot assist",
    "as an ai language model",
    "i'm not able to view images",
    "i can't help with that",
];

/// Extractor estricto de la respuesta JSON del proveedor de visión.
///
/// Tolera el envoltorio en bloques de código Markdown (```json ... ```),
/// rechaza las respuestas con frases de negativa conocidas, y exige que el
/// documento resultante contenga al menos una lista de salas (posiblemente
/// vacía) y un `model_id`.
pub fn parse_takeoff_response(
    raw_text: &str,
    model_id_hint: &str,
) -> Result<TakeoffDocument, VisionFailure> {
    let lower = raw_text.to_ascii_lowercase();
    for phrase in REFUSAL_PHRASES {
        if lower.contains(phrase) {
            return Err(VisionFailure::Refused(raw_text.to_string()));
        }
    }

    let stripped = strip_markdown_fence(raw_text);

    let mut doc: TakeoffDocument = serde_json::from_str(stripped.trim())
        .map_err(|e| VisionFailure::UnparsableResponse(e.to_string()))?;

    if doc.model_id.is_empty() {
        doc.model_id = model_id_hint.to_string();
    }

    if !doc.is_structurally_valid() {
        return Err(VisionFailure::UnparsableResponse(
            "confianza fuera de [0,1] o model_id vacío".to_string(),
        ));
    }

    Ok(doc)
}

fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let json = r#"{"floor_analysis":"ok","rooms":[],"envelope_hints":{"confidence":0.5},"scale_hint":{"confidence":0.5},"confidence":0.8,"model_id":"m1"}"#;
        let doc = parse_takeoff_response(json, "fallback").unwrap();
        assert_eq!(doc.model_id, "m1");
        assert!(doc.rooms.is_empty());
    }

    #[test]
    fn strips_markdown_fence() {
        let json = "```json\n{\"floor_analysis\":\"ok\",\"rooms\":[],\"envelope_hints\":{\"confidence\":0.5},\"scale_hint\":{\"confidence\":0.5},\"confidence\":0.9,\"model_id\":\"m2\"}\n```";
        let doc = parse_takeoff_response(json, "fallback").unwrap();
        assert_eq!(doc.model_id, "m2");
    }

    #[test]
    fn rejects_refusal_phrase() {
        let text = "I'm sorry, I can't analyze this image.";
        let err = parse_takeoff_response(text, "fallback").unwrap_err();
        assert!(matches!(err, VisionFailure::Refused(_)));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_takeoff_response("not json at all", "fallback").unwrap_err();
        assert!(matches!(err, VisionFailure::UnparsableResponse(_)));
    }

    #[test]
    fn empty_room_list_is_still_valid() {
        let json = r#"{"floor_analysis":"nothing found","rooms":[],"envelope_hints":{"confidence":0.1},"scale_hint":{"confidence":0.1},"confidence":0.3,"model_id":"m3"}"#;
        let doc = parse_takeoff_response(json, "fallback").unwrap();
        assert_eq!(doc.rooms.len(), 0);
    }
}
