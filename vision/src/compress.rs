// Distributed under the MIT License

//! Compresión de imágenes de página antes de enviarlas al proveedor de
//! visión. El núcleo no decodifica ni recodifica imágenes reales (serían
//! responsabilidad del adaptador de PDF / de la orquestación); este módulo
//! modela el presupuesto de tamaño con la misma estrategia en dos pasos que
//! describe el contrato: primero se reduce la calidad JPEG en una escalera,
//! y solo si eso no basta se reduce la resolución.

/// Escalera de calidades JPEG probadas en orden, de mejor a peor.
const QUALITY_LADDER: &[u8] = &[90, 80, 70, 60, 50, 40];

/// Factores de reducción de resolución probados tras agotar la escalera de
/// calidad, en orden creciente de agresividad.
const RESOLUTION_STEPS: &[f32] = &[1.0, 0.85, 0.7, 0.55, 0.4];

#[derive(Debug, Clone, Copy)]
pub struct CompressionTarget {
    /// Tamaño objetivo en bytes (por defecto 2 MB).
    pub target_bytes: usize,
    /// Techo duro en bytes (por defecto 5 MB); si ni la calidad mínima ni la
    /// resolución mínima lo alcanzan, se entrega igualmente el mejor intento
    /// pero marcado como `over_ceiling`.
    pub hard_ceiling_bytes: usize,
}

impl Default for CompressionTarget {
    fn default() -> Self {
        CompressionTarget {
            target_bytes: 2 * 1024 * 1024,
            hard_ceiling_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOutcome {
    pub estimated_bytes: usize,
    pub jpeg_quality: u8,
    pub resolution_factor: f32,
    pub over_ceiling: bool,
}

/// Estima el resultado de comprimir `original_bytes` de una imagen para
/// cumplir `target`. El modelo de tamaño es un estimador simple (tamaño
/// proporcional a `quality * resolution_factor^2`), suficiente para decidir
/// qué paso de la escalera usar sin acoplar el núcleo a un códec concreto.
pub fn compress_for_upload(original_bytes: usize, target: CompressionTarget) -> CompressionOutcome {
    let baseline_quality = 95u8;
    let size_at = |quality: u8, resolution_factor: f32| -> usize {
        let quality_fraction = quality as f64 / baseline_quality as f64;
        (original_bytes as f64 * quality_fraction * (resolution_factor as f64).powi(2)) as usize
    };

    for &quality in QUALITY_LADDER {
        let estimated = size_at(quality, 1.0);
        if estimated <= target.target_bytes {
            return CompressionOutcome {
                estimated_bytes: estimated,
                jpeg_quality: quality,
                resolution_factor: 1.0,
                over_ceiling: false,
            };
        }
    }

    let lowest_quality = *QUALITY_LADDER.last().unwrap();
    for &factor in RESOLUTION_STEPS {
        let estimated = size_at(lowest_quality, factor);
        if estimated <= target.target_bytes {
            return CompressionOutcome {
                estimated_bytes: estimated,
                jpeg_quality: lowest_quality,
                resolution_factor: factor,
                over_ceiling: false,
            };
        }
    }

    let smallest_factor = *RESOLUTION_STEPS.last().unwrap();
    let estimated = size_at(lowest_quality, smallest_factor);
    CompressionOutcome {
        estimated_bytes: estimated,
        jpeg_quality: lowest_quality,
        resolution_factor: smallest_factor,
        over_ceiling: estimated > target.hard_ceiling_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_image_needs_no_reduction() {
        let outcome = compress_for_upload(500_000, CompressionTarget::default());
        assert_eq!(outcome.jpeg_quality, 90);
        assert_eq!(outcome.resolution_factor, 1.0);
        assert!(!outcome.over_ceiling);
    }

    #[test]
    fn huge_image_falls_through_to_resolution_reduction() {
        let outcome = compress_for_upload(200_000_000, CompressionTarget::default());
        assert!(outcome.resolution_factor < 1.0);
        assert!(outcome.estimated_bytes <= CompressionTarget::default().target_bytes || outcome.over_ceiling);
    }

    #[test]
    fn extreme_image_may_exceed_hard_ceiling() {
        let outcome = compress_for_upload(5_000_000_000, CompressionTarget::default());
        assert_eq!(outcome.jpeg_quality, *QUALITY_LADDER.last().unwrap());
        assert_eq!(outcome.resolution_factor, *RESOLUTION_STEPS.last().unwrap());
    }
}
