// Distributed under the MIT License

//! Telemetría y auditoría: convierte un [`ReliabilityResult`] ya
//! sellado en el documento [`AuditReport`] autodescriptivo que se persiste
//! por ejecución, más la tabla de banda de precisión predicha.

use crate::errors::Recoverable;
use crate::model::{AccuracyBand, AuditReport, Envelope, ReliabilityResult, RiskLevel, SCHEMA_VERSION};

/// Banda de precisión categórica a partir de confianza y dispersión,
/// evaluada de más a menos estricta; la primera fila que coincide gana.
pub fn accuracy_band(confidence: f32, spread: f32) -> AccuracyBand {
    if confidence >= 0.9 && spread <= 0.05 {
        AccuracyBand { band_percent: 5.0, risk: RiskLevel::VeryLow }
    } else if confidence >= 0.8 && spread <= 0.10 {
        AccuracyBand { band_percent: 8.0, risk: RiskLevel::Low }
    } else if confidence >= 0.6 && spread <= 0.15 {
        AccuracyBand { band_percent: 12.0, risk: RiskLevel::Medium }
    } else {
        AccuracyBand { band_percent: 15.0, risk: RiskLevel::High }
    }
}

/// Confianza agregada por sala (supplemented feature): reusa la
/// confianza de calidad global como aproximación salvo que la sala tenga
/// su propia confianza de detección, en cuyo caso promedia ambas.
fn room_confidence(envelope_confidence: f32, room_id: u32, room_own_confidence: f32) -> (u32, f32) {
    (room_id, ((envelope_confidence + room_own_confidence) / 2.0).clamp(0.0, 1.0))
}

#[allow(clippy::too_many_arguments)]
pub fn build_report(
    run_id: String,
    request_digest: String,
    scale_method: Option<String>,
    scale_px_per_ft: Option<f32>,
    envelope: &Envelope,
    result: ReliabilityResult,
    recoverables: &[Recoverable],
    room_own_confidences: &[(u32, f32)],
) -> AuditReport {
    let warnings: Vec<String> = recoverables.iter().map(|r| r.message()).collect();
    let provenance = envelope.provenance_entries();
    let band = accuracy_band(result.confidence, result.spread);

    let envelope_confidence = result.quality_score.value;
    let room_confidence = room_own_confidences
        .iter()
        .map(|(id, conf)| room_confidence(envelope_confidence, *id, *conf))
        .collect();

    AuditReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        request_digest,
        scale_method,
        scale_px_per_ft,
        quality: result.quality_score,
        candidates: result.candidates,
        weights: result.weights,
        heating_btuh: result.heating_btuh,
        cooling_btuh: result.cooling_btuh,
        recommended_sizing_btuh: result.recommended_sizing_btuh,
        confidence: result.confidence,
        spread: result.spread,
        clamps: result.clamps_applied,
        warnings,
        provenance,
        room_confidence,
        accuracy_band: band,
        partial: result.partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_confidence_low_spread_is_very_low_risk() {
        let band = accuracy_band(0.95, 0.02);
        assert_eq!(band.band_percent, 5.0);
        assert_eq!(band.risk, RiskLevel::VeryLow);
    }

    #[test]
    fn low_confidence_falls_through_to_high_risk() {
        let band = accuracy_band(0.3, 0.5);
        assert_eq!(band.band_percent, 15.0);
        assert_eq!(band.risk, RiskLevel::High);
    }

    #[test]
    fn mid_band_requires_both_thresholds() {
        let band = accuracy_band(0.85, 0.20);
        assert_eq!(band.band_percent, 15.0, "spread too wide for the low band despite high confidence");
    }
}
