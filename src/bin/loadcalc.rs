// Distributed under the MIT License

//! CLI de referencia para el motor de fiabilidad de cargas Manual J.
//!
//! El núcleo (`loadcalc`) nunca rasteriza PDFs ni invoca un analizador de
//! visión real: ambos son colaboradores inyectados. Este binario es un
//! ejemplo de orquestación mínima, no la integración de producción: lee un
//! documento ya decodificado desde un *fixture* JSON (el formato que
//! produciría un adaptador de PDF real) en vez de un PDF crudo, y corre sin
//! proveedor de visión por defecto, es decir, solo con los extractores
//! deterministas de `blueprint`.

use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use blueprint::{PageImage, PageRect, PdfAdapterError, PdfDocument, TextRun, VectorEntry, VectorPath};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use vision::VisionProvider;

use loadcalc::{
    estimate, ConstructionEra, DuctConfig, EnvelopeOverrides, EstimateRequest, Failure, FoundationKind, HeatingFuel,
    Outcome, PdfSource, RunConfig, UserAssumptions, VisionSemaphore, WindowSpec,
};

const PROGNAME: &str = "loadcalc";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DuctConfigArg {
    Conditioned,
    Basement,
    Crawl,
    VentedAttic,
    Ductless,
}

impl From<DuctConfigArg> for DuctConfig {
    fn from(arg: DuctConfigArg) -> Self {
        match arg {
            DuctConfigArg::Conditioned => DuctConfig::Conditioned,
            DuctConfigArg::Basement => DuctConfig::Basement,
            DuctConfigArg::Crawl => DuctConfig::Crawl,
            DuctConfigArg::VentedAttic => DuctConfig::VentedAttic,
            DuctConfigArg::Ductless => DuctConfig::Ductless,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeatingFuelArg {
    Gas,
    Electric,
    HeatPump,
}

impl From<HeatingFuelArg> for HeatingFuel {
    fn from(arg: HeatingFuelArg) -> Self {
        match arg {
            HeatingFuelArg::Gas => HeatingFuel::Gas,
            HeatingFuelArg::Electric => HeatingFuel::Electric,
            HeatingFuelArg::HeatPump => HeatingFuel::HeatPump,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConstructionEraArg {
    E1960s,
    E1970s,
    E1980s,
    E1990s,
    E2000s,
    E2010s,
    E2020s,
    New,
}

impl From<ConstructionEraArg> for ConstructionEra {
    fn from(arg: ConstructionEraArg) -> Self {
        match arg {
            ConstructionEraArg::E1960s => ConstructionEra::E1960s,
            ConstructionEraArg::E1970s => ConstructionEra::E1970s,
            ConstructionEraArg::E1980s => ConstructionEra::E1980s,
            ConstructionEraArg::E1990s => ConstructionEra::E1990s,
            ConstructionEraArg::E2000s => ConstructionEra::E2000s,
            ConstructionEraArg::E2010s => ConstructionEra::E2010s,
            ConstructionEraArg::E2020s => ConstructionEra::E2020s,
            ConstructionEraArg::New => ConstructionEra::New,
        }
    }
}

/// Estima cargas de diseño Manual J a partir de un levantamiento de plano ya
/// decodificado (fixture JSON de adaptador de PDF) y un código postal.
#[derive(Debug, Parser)]
#[command(name = PROGNAME, version, about)]
struct Cli {
    /// Ruta al fixture JSON que describe el documento ya decodificado por
    /// un adaptador de PDF real (páginas, texto con bbox, primitivas
    /// vectoriales). El núcleo nunca decodifica el PDF por sí mismo.
    blueprint_fixture: PathBuf,

    /// Código postal de 5 dígitos.
    #[arg(long)]
    zip: String,

    /// Configuración de conductos declarada por el usuario (único campo
    /// obligatorio de las suposiciones de usuario).
    #[arg(long, value_enum)]
    duct_config: DuctConfigArg,

    /// Combustible de calefacción.
    #[arg(long, value_enum, default_value = "gas")]
    heating_fuel: HeatingFuelArg,

    /// Época constructiva, si se conoce; gobierna los valores por defecto de
    /// envolvente cuando el plano no los documenta.
    #[arg(long, value_enum)]
    construction_era: Option<ConstructionEraArg>,

    /// Tipo de cimentación, si se conoce.
    #[arg(long, value_enum)]
    foundation_type: Option<FoundationKindArg>,

    /// U-value de ventana declarado por el usuario (requiere --window-shgc).
    #[arg(long, requires = "window_shgc")]
    window_u: Option<f32>,

    /// SHGC de ventana declarado por el usuario (requiere --window-u).
    #[arg(long, requires = "window_u")]
    window_shgc: Option<f32>,

    /// Ruta de salida para el informe de auditoría en JSON; por defecto, la
    /// salida estándar.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FoundationKindArg {
    Slab,
    CrawlVented,
    CrawlConditioned,
    BasementUnheated,
    BasementConditioned,
}

impl From<FoundationKindArg> for FoundationKind {
    fn from(arg: FoundationKindArg) -> Self {
        match arg {
            FoundationKindArg::Slab => FoundationKind::Slab,
            FoundationKindArg::CrawlVented => FoundationKind::CrawlVented,
            FoundationKindArg::CrawlConditioned => FoundationKind::CrawlConditioned,
            FoundationKindArg::BasementUnheated => FoundationKind::BasementUnheated,
            FoundationKindArg::BasementConditioned => FoundationKind::BasementConditioned,
        }
    }
}

/// Formas auxiliares de deserialización para los tipos de `blueprint::pdf`,
/// que no llevan `serde::Deserialize` porque el adaptador real nunca los
/// construye desde JSON: solo este fixture de referencia lo necesita.
#[derive(Debug, Deserialize)]
struct FixturePage {
    #[serde(default)]
    bytes_len: usize,
    dpi: u32,
    long_side_px: u32,
    rect: PageRect,
}

#[derive(Debug, Deserialize)]
struct FixtureTextRun {
    page_index: usize,
    text: String,
    rect: PageRect,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
enum FixtureVectorPath {
    Line { p0: (f32, f32), p1: (f32, f32) },
    Polyline { points: Vec<(f32, f32)> },
    Rectangle { rect: PageRect },
    Arc { center: (f32, f32), radius: f32, start_deg: f32, end_deg: f32 },
}

#[derive(Debug, Deserialize)]
struct FixtureVector {
    page_index: usize,
    #[serde(flatten)]
    path: FixtureVectorPath,
}

#[derive(Debug, Deserialize)]
struct BlueprintFixture {
    size_bytes: usize,
    pages: Vec<FixturePage>,
    text_runs: Vec<FixtureTextRun>,
    vectors: Vec<FixtureVector>,
}

/// `PdfSource` de referencia: lee un fixture JSON del disco en vez de
/// resolver un `pdf_blob_ref` contra un almacén de blobs real.
struct FixturePdfSource;

impl PdfSource for FixturePdfSource {
    fn fetch(&self, blob_ref: &str, _timeout: Duration) -> Result<PdfDocument, Failure> {
        let bytes = fs::read(blob_ref)
            .map_err(|e| Failure::SourceUnreadable(format!("no se pudo leer '{blob_ref}': {e}")))?;
        let fixture: BlueprintFixture = serde_json::from_slice(&bytes)
            .map_err(|e| Failure::SourceUnreadable(format!("fixture '{blob_ref}' no es un levantamiento válido: {e}")))?;

        let pages: Vec<PageImage> = fixture
            .pages
            .into_iter()
            .enumerate()
            .map(|(page_index, p)| PageImage {
                page_index,
                bytes: vec![0u8; p.bytes_len],
                dpi: p.dpi,
                long_side_px: p.long_side_px,
                rect: p.rect,
            })
            .collect();

        let text_runs: Vec<TextRun> = fixture
            .text_runs
            .into_iter()
            .map(|t| TextRun { page_index: t.page_index, text: t.text, rect: t.rect })
            .collect();

        let vectors: Vec<VectorEntry> = fixture
            .vectors
            .into_iter()
            .map(|v| {
                let path = match v.path {
                    FixtureVectorPath::Line { p0, p1 } => VectorPath::Line { p0, p1 },
                    FixtureVectorPath::Polyline { points } => VectorPath::Polyline { points },
                    FixtureVectorPath::Rectangle { rect } => VectorPath::Rectangle { rect },
                    FixtureVectorPath::Arc { center, radius, start_deg, end_deg } => {
                        VectorPath::Arc { center, radius, start_deg, end_deg }
                    }
                };
                VectorEntry { page_index: v.page_index, path }
            })
            .collect();

        PdfDocument::from_parts(fixture.size_bytes, pages, text_runs, vectors).map_err(|e| match e {
            PdfAdapterError::Encrypted | PdfAdapterError::InvalidHeader | PdfAdapterError::ZeroPages | PdfAdapterError::TooManyPages(_) => {
                Failure::SourceUnreadable(e.to_string())
            }
            PdfAdapterError::PageRenderTimeout(_) => Failure::SourceUnreadable(e.to_string()),
        })
    }
}

fn build_overrides(cli: &Cli) -> EnvelopeOverrides {
    let mut overrides = EnvelopeOverrides::default();
    overrides.foundation_kind = cli.foundation_type.map(FoundationKind::from);
    overrides
}

fn main() {
    let cli = Cli::parse();

    env_logger::init();

    let window_spec = match (cli.window_u, cli.window_shgc) {
        (Some(u_value), Some(shgc)) => Some(WindowSpec { u_value, shgc }),
        _ => None,
    };

    let request = EstimateRequest {
        pdf_blob_ref: cli.blueprint_fixture.to_string_lossy().into_owned(),
        zip: cli.zip.clone(),
        user_assumptions: UserAssumptions {
            duct_config: cli.duct_config.into(),
            heating_fuel: cli.heating_fuel.into(),
            construction_era: cli.construction_era.map(ConstructionEra::from),
            foundation_type: cli.foundation_type.map(FoundationKind::from),
            window_spec,
            envelope_overrides: Some(build_overrides(&cli)),
        },
    };

    let pdf_source = FixturePdfSource;
    let vision_providers: Vec<Box<dyn VisionProvider>> = Vec::new();
    let vision_semaphore = VisionSemaphore::default();
    let config = RunConfig::from_env();

    match estimate(&request, &pdf_source, &vision_providers, &vision_semaphore, &config) {
        Ok(Outcome::Complete(report)) => {
            let json = serde_json::to_string_pretty(&report).expect("AuditReport siempre serializable");
            match &cli.output {
                Some(path) => {
                    if let Err(e) = fs::write(path, &json) {
                        eprintln!("error al escribir '{}': {e}", path.display());
                        exit(5);
                    }
                }
                None => println!("{json}"),
            }
            eprintln!(
                "calefacción {:.0} BTU/h, refrigeración {:.0} BTU/h, confianza {:.2}",
                report.heating_btuh, report.cooling_btuh, report.confidence
            );
            exit(0);
        }
        Ok(Outcome::NeedsInput(details)) => {
            eprintln!("se requiere más información ({:?}): {}", details.kind, details.message);
            for alt in &details.alternatives {
                eprintln!("  alternativa: {:.0} px/ft, confianza {:.2} ({})", alt.pixels_per_foot, alt.confidence, alt.evidence);
            }
            exit(2);
        }
        Err(Failure::SourceUnreadable(detail)) => {
            eprintln!("documento fuente ilegible: {detail}");
            exit(3);
        }
        Err(Failure::TimedOut(d)) => {
            eprintln!("la ejecución superó el plazo de {d:?}");
            exit(4);
        }
        Err(other) => {
            eprintln!("error interno: {other}");
            exit(5);
        }
    }
}
