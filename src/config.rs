// Distributed under the MIT License

//! Configuración de ejecución: anulaciones por variable de entorno,
//! leídas una sola vez en un `RunConfig` inmutable, al estilo en que los
//! binarios de la cartera parsean `clap::ArgMatches` una única vez al
//! arrancar.

use std::time::Duration;

/// WWR conservador por defecto cuando no hay evidencia de elevaciones;
/// distinto del 0.18 que usa la línea base de código mínimo, que
/// representa el mínimo exigido por el código en sí, no un repliegue por
/// falta de evidencia.
pub const DEFAULT_CONSERVATIVE_WWR: f32 = 0.20;

fn env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuración inmutable resuelta una vez al inicio de la ejecución.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// `SCALE_OVERRIDE`: si se fija, se usa directamente y se salta la
    /// estimación de escala a partir del plano.
    pub scale_override_px_per_ft: Option<f32>,
    pub min_room_sqft: f32,
    pub max_room_sqft: f32,
    pub min_total_sqft: f32,
    pub max_total_sqft: f32,
    pub max_room_count: u32,
    pub vision_timeout_s: u32,
    pub vision_fallback_budget_s: u32,
    pub run_deadline_s: u32,
    pub pdf_page_render_timeout_s: u32,
    pub blob_fetch_timeout_s: u32,
    /// Gobierna la política de ampliación de salas; por defecto activada.
    pub augmentation_enabled: bool,
    pub augmentation_area_threshold_ft2: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            scale_override_px_per_ft: None,
            min_room_sqft: 40.0,
            max_room_sqft: 1000.0,
            min_total_sqft: 500.0,
            max_total_sqft: 10_000.0,
            max_room_count: 40,
            vision_timeout_s: 120,
            vision_fallback_budget_s: 240,
            run_deadline_s: 300,
            pdf_page_render_timeout_s: 5,
            blob_fetch_timeout_s: 30,
            augmentation_enabled: true,
            augmentation_area_threshold_ft2: 2000.0,
        }
    }
}

impl RunConfig {
    /// Lee las anulaciones por variable de entorno desde el entorno de
    /// proceso, con los valores por defecto de `Default` para cualquier
    /// variable no fijada.
    pub fn from_env() -> Self {
        let defaults = RunConfig::default();
        RunConfig {
            scale_override_px_per_ft: std::env::var("SCALE_OVERRIDE")
                .ok()
                .and_then(|v| v.parse().ok()),
            min_room_sqft: env_f32("MIN_ROOM_SQFT", defaults.min_room_sqft),
            max_room_sqft: env_f32("MAX_ROOM_SQFT", defaults.max_room_sqft),
            min_total_sqft: env_f32("MIN_TOTAL_SQFT", defaults.min_total_sqft),
            max_total_sqft: env_f32("MAX_TOTAL_SQFT", defaults.max_total_sqft),
            max_room_count: env_u32("MAX_ROOM_COUNT", defaults.max_room_count),
            vision_timeout_s: env_u32("VISION_TIMEOUT_S", defaults.vision_timeout_s),
            vision_fallback_budget_s: defaults.vision_fallback_budget_s,
            run_deadline_s: env_u32("RUN_DEADLINE_S", defaults.run_deadline_s),
            pdf_page_render_timeout_s: defaults.pdf_page_render_timeout_s,
            blob_fetch_timeout_s: defaults.blob_fetch_timeout_s,
            augmentation_enabled: std::env::var("AUGMENTATION_ENABLED")
                .ok()
                .map(|v| v != "0" && v.to_ascii_lowercase() != "false")
                .unwrap_or(defaults.augmentation_enabled),
            augmentation_area_threshold_ft2: defaults.augmentation_area_threshold_ft2,
        }
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_s as u64)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_s as u64)
    }

    pub fn vision_fallback_budget(&self) -> Duration {
        Duration::from_secs(self.vision_fallback_budget_s as u64)
    }

    pub fn pdf_page_render_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_page_render_timeout_s as u64)
    }

    pub fn blob_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.blob_fetch_timeout_s as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.min_room_sqft, 40.0);
        assert_eq!(cfg.max_room_sqft, 1000.0);
        assert_eq!(cfg.min_total_sqft, 500.0);
        assert_eq!(cfg.max_total_sqft, 10_000.0);
        assert_eq!(cfg.max_room_count, 40);
        assert_eq!(cfg.run_deadline_s, 300);
        assert!(cfg.augmentation_enabled);
    }
}
