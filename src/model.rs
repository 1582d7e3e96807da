// Distributed under the MIT License

//! Modelo de datos compartido desde la envolvente resuelta hasta el
//! resultado final: las cargas por zona, los candidatos del conjunto
//! (ensemble) y el resultado de fiabilidad con su auditoría.
//!
//! La procedencia de cada campo se modela con [`blueprint::FieldSource`] y
//! [`blueprint::Sourced`], el mismo par de tipos que usa la tubería de
//! ingestión: así la capa de auditoría nunca tiene que rellenar a
//! posteriori de dónde vino un valor.

use blueprint::{FieldSource, Sourced};
use serde::{Deserialize, Serialize};

/// Configuración de conductos declarada por el usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuctConfig {
    Conditioned,
    Basement,
    Crawl,
    VentedAttic,
    Ductless,
}

impl DuctConfig {
    pub fn as_str(self) -> &'static str {
        match self {
            DuctConfig::Conditioned => "conditioned",
            DuctConfig::Basement => "basement",
            DuctConfig::Crawl => "crawl",
            DuctConfig::VentedAttic => "vented_attic",
            DuctConfig::Ductless => "ductless",
        }
    }

    /// Traduce la suposición de usuario a la ubicación de conductos que
    /// consumen el calculador Manual J y los valores conservadores. Un
    /// sistema `Ductless` (minisplit) no tiene red de distribución de aire,
    /// así que no incurre en pérdida alguna: se modela como `Conditioned`.
    pub fn to_duct_location(self) -> DuctLocation {
        match self {
            DuctConfig::Conditioned => DuctLocation::Conditioned,
            DuctConfig::Basement => DuctLocation::Basement,
            DuctConfig::Crawl => DuctLocation::Crawl,
            DuctConfig::VentedAttic => DuctLocation::VentedAttic,
            DuctConfig::Ductless => DuctLocation::Conditioned,
        }
    }
}

/// Combustible de calefacción declarado por el usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatingFuel {
    Gas,
    Electric,
    HeatPump,
}

/// Época constructiva, usada para resolver los valores por defecto de
/// envolvente cuando el plano no los documenta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionEra {
    E1960s,
    E1970s,
    E1980s,
    E1990s,
    E2000s,
    E2010s,
    E2020s,
    New,
}

impl ConstructionEra {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionEra::E1960s => "1960s",
            ConstructionEra::E1970s => "1970s",
            ConstructionEra::E1980s => "1980s",
            ConstructionEra::E1990s => "1990s",
            ConstructionEra::E2000s => "2000s",
            ConstructionEra::E2010s => "2010s",
            ConstructionEra::E2020s => "2020s",
            ConstructionEra::New => "new",
        }
    }
}

/// Tipo de cimentación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoundationKind {
    Slab,
    CrawlVented,
    CrawlConditioned,
    BasementUnheated,
    BasementConditioned,
}

/// Especificación de ventana provista por el usuario, cuando se conoce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowSpec {
    pub u_value: f32,
    pub shgc: f32,
}

/// Anulaciones de envolvente provistas explícitamente por el usuario; cada
/// campo presente gana sobre cualquier otra fuente (precedencia
/// `UserOverride`, la más alta).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvelopeOverrides {
    pub wall_r: Option<f32>,
    pub ceiling_r: Option<f32>,
    pub floor_r: Option<f32>,
    pub window_u: Option<f32>,
    pub window_shgc: Option<f32>,
    pub door_u: Option<f32>,
    pub ach50: Option<f32>,
    pub foundation_kind: Option<FoundationKind>,
    pub duct_location: Option<DuctLocation>,
}

/// Suposiciones de usuario que acompañan la subida del plano.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAssumptions {
    pub duct_config: DuctConfig,
    pub heating_fuel: HeatingFuel,
    pub construction_era: Option<ConstructionEra>,
    pub foundation_type: Option<FoundationKind>,
    pub window_spec: Option<WindowSpec>,
    pub envelope_overrides: Option<EnvelopeOverrides>,
}

/// Petición de estimación, el punto de entrada público del núcleo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub pdf_blob_ref: String,
    pub zip: String,
    pub user_assumptions: UserAssumptions,
}

/// Ubicación de los conductos de distribución de aire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuctLocation {
    Conditioned,
    VentedAttic,
    Crawl,
    Basement,
}

impl DuctLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            DuctLocation::Conditioned => "conditioned",
            DuctLocation::VentedAttic => "vented_attic",
            DuctLocation::Crawl => "crawl",
            DuctLocation::Basement => "basement",
        }
    }
}

/// Envolvente térmica plenamente resuelta, cada campo con su procedencia
/// y confianza.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub wall_r: Sourced<f32>,
    pub ceiling_r: Sourced<f32>,
    pub floor_r: Sourced<f32>,
    pub window_u: Sourced<f32>,
    pub window_shgc: Sourced<f32>,
    pub door_u: Sourced<f32>,
    pub ach50: Sourced<f32>,
    pub foundation_kind: Sourced<FoundationKind>,
    pub duct_location: Sourced<DuctLocation>,
    pub ceiling_height_default: Sourced<f32>,
    pub per_facade_wwr: Sourced<f32>,
}

impl Envelope {
    /// Recorre todos los campos con procedencia, para que la capa de
    /// auditoría pueda serializar la lista de provenance sin conocer los
    /// nombres por adelantado.
    pub fn provenance_entries(&self) -> Vec<ProvenanceEntry> {
        vec![
            ProvenanceEntry::new("wall_r", format!("{:.2}", self.wall_r.value), self.wall_r.source, self.wall_r.confidence),
            ProvenanceEntry::new("ceiling_r", format!("{:.2}", self.ceiling_r.value), self.ceiling_r.source, self.ceiling_r.confidence),
            ProvenanceEntry::new("floor_r", format!("{:.2}", self.floor_r.value), self.floor_r.source, self.floor_r.confidence),
            ProvenanceEntry::new("window_u", format!("{:.3}", self.window_u.value), self.window_u.source, self.window_u.confidence),
            ProvenanceEntry::new("window_shgc", format!("{:.2}", self.window_shgc.value), self.window_shgc.source, self.window_shgc.confidence),
            ProvenanceEntry::new("door_u", format!("{:.2}", self.door_u.value), self.door_u.source, self.door_u.confidence),
            ProvenanceEntry::new("ach50", format!("{:.2}", self.ach50.value), self.ach50.source, self.ach50.confidence),
            ProvenanceEntry::new("foundation_kind", format!("{:?}", self.foundation_kind.value), self.foundation_kind.source, self.foundation_kind.confidence),
            ProvenanceEntry::new("duct_location", self.duct_location.value.as_str().to_string(), self.duct_location.source, self.duct_location.confidence),
            ProvenanceEntry::new("ceiling_height_default", format!("{:.2}", self.ceiling_height_default.value), self.ceiling_height_default.source, self.ceiling_height_default.confidence),
            ProvenanceEntry::new("per_facade_wwr", format!("{:.2}", self.per_facade_wwr.value), self.per_facade_wwr.source, self.per_facade_wwr.confidence),
        ]
    }
}

/// Entrada de procedencia serializable para el informe de auditoría.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub field: String,
    pub value: String,
    pub source: FieldSource,
    pub confidence: f32,
}

impl ProvenanceEntry {
    pub fn new(field: &str, value: String, source: FieldSource, confidence: f32) -> Self {
        ProvenanceEntry {
            field: field.to_string(),
            value,
            source,
            confidence,
        }
    }
}

/// Componente individual de carga térmica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Wall,
    WindowCond,
    WindowSolar,
    Door,
    Roof,
    Floor,
    Foundation,
    InfiltrationSensible,
    InfiltrationLatent,
    VentilationSensible,
    VentilationLatent,
    InternalSensible,
    InternalLatent,
    Duct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentLoad {
    pub component: ComponentKind,
    pub btu_per_hr: f32,
    pub area_ft2: Option<f32>,
    pub u_value: Option<f32>,
    pub delta_t: Option<f32>,
}

impl ComponentLoad {
    pub fn new(component: ComponentKind, btu_per_hr: f32) -> Self {
        ComponentLoad {
            component,
            btu_per_hr,
            area_ft2: None,
            u_value: None,
            delta_t: None,
        }
    }

    pub fn with_area_u_dt(mut self, area_ft2: f32, u_value: f32, delta_t: f32) -> Self {
        self.area_ft2 = Some(area_ft2);
        self.u_value = Some(u_value);
        self.delta_t = Some(delta_t);
        self
    }
}

/// Totales de una sala para un régimen (calefacción o refrigeración) más el
/// desglose de componentes que los produjo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneLoads {
    pub room_id: u32,
    pub room_name: String,
    pub heating_sensible_btuh: f32,
    pub heating_latent_btuh: f32,
    pub cooling_sensible_btuh: f32,
    pub cooling_latent_btuh: f32,
    pub components: Vec<ComponentLoad>,
}

impl ZoneLoads {
    pub fn heating_total_btuh(&self) -> f32 {
        self.heating_sensible_btuh + self.heating_latent_btuh
    }

    pub fn cooling_total_btuh(&self) -> f32 {
        self.cooling_sensible_btuh + self.cooling_latent_btuh
    }
}

/// Nombre de uno de los cuatro candidatos del conjunto de fiabilidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateName {
    Primary,
    CodeMin,
    UaOa,
    Regional,
}

/// Un método independiente de estimación de carga con su resultado total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: CandidateName,
    pub heating_btuh: f32,
    pub cooling_btuh: f32,
    pub details: String,
    pub zone_loads: Vec<ZoneLoads>,
}

/// Vía de enrutamiento decidida por el puntuador de calidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityRouting {
    AiHeavy,
    Hybrid,
    Conservative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScore {
    pub value: f32,
    pub feature_scores: Vec<(String, f32)>,
    pub routing: QualityRouting,
    pub factors: Vec<String>,
}

/// Pesos de la mezcla del conjunto, siempre sumando 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    pub primary: f32,
    pub code_min: f32,
    pub ua_oa: f32,
    pub regional: f32,
}

impl Weights {
    pub fn sum(&self) -> f32 {
        self.primary + self.code_min + self.ua_oa + self.regional
    }
}

/// Banda de incertidumbre de orientación, emitida solo
/// cuando la orientación norte del edificio es desconocida.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrientationBand {
    pub heating_min_btuh: f32,
    pub heating_median_btuh: f32,
    pub heating_max_btuh: f32,
    pub cooling_min_btuh: f32,
    pub cooling_median_btuh: f32,
    pub cooling_max_btuh: f32,
}

/// Registro de un clamp de saneamiento aplicado, con el valor original y
/// el valor tras el clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClampRecord {
    pub name: String,
    pub rule: String,
    pub original_value: f32,
    pub clamped_value: f32,
}

/// Resultado final del motor de fiabilidad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityResult {
    pub heating_btuh: f32,
    pub cooling_btuh: f32,
    pub confidence: f32,
    pub quality_score: QualityScore,
    pub weights: Weights,
    pub candidates: Vec<Candidate>,
    pub spread: f32,
    pub orientation_band: Option<OrientationBand>,
    pub clamps_applied: Vec<ClampRecord>,
    pub conservative_policies: Vec<String>,
    pub notes: Vec<String>,
    pub partial: bool,
    /// Dimensionado recomendado para selección de equipo: `max(heating,
    /// cooling)` con bomba de calor, `cooling` en cualquier otro caso.
    pub recommended_sizing_btuh: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccuracyBand {
    pub band_percent: f32,
    pub risk: RiskLevel,
}

/// Documento de auditoría completo de una ejecución, autodescriptivo y
/// estable bajo versionado (`schema_version`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub schema_version: u32,
    pub run_id: String,
    pub request_digest: String,
    pub scale_method: Option<String>,
    pub scale_px_per_ft: Option<f32>,
    pub quality: QualityScore,
    pub candidates: Vec<Candidate>,
    pub weights: Weights,
    pub heating_btuh: f32,
    pub cooling_btuh: f32,
    pub recommended_sizing_btuh: f32,
    pub confidence: f32,
    pub spread: f32,
    pub clamps: Vec<ClampRecord>,
    pub warnings: Vec<String>,
    pub provenance: Vec<ProvenanceEntry>,
    /// Confianza agregada por sala, complementando la confianza de edificio
    /// completo (supplemented feature, grounded on `telemetry.py`).
    pub room_confidence: Vec<(u32, f32)>,
    pub accuracy_band: AccuracyBand,
    pub partial: bool,
}

pub const SCHEMA_VERSION: u32 = 1;
