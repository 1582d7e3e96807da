// Distributed under the MIT License

use std::time::Duration;

use blueprint::{PageImage, PageRect, PdfDocument, TextRun, VectorEntry, VectorPath};
use loadcalc::{
    estimate, DuctConfig, EstimateRequest, Failure, HeatingFuel, Outcome, PdfSource, RunConfig, UserAssumptions,
    VisionSemaphore,
};
use vision::VisionProvider;

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> PageRect {
    PageRect { x0, y0, x1, y1 }
}

/// Construye un plano sintético de una sola página con cinco salas
/// rectangulares a escala 50 px/ft, suficientes líneas balanceadas y la
/// palabra clave "FLOOR PLAN" para que el clasificador de páginas la
/// reconozca como página de planta con confianza alta.
fn synthetic_floor_plan_doc() -> PdfDocument {
    let page_rect = rect(0.0, 0.0, 2400.0, 1500.0);
    let page = PageImage { page_index: 0, bytes: vec![], dpi: 150, long_side_px: 2400, rect: page_rect };

    let text_runs = vec![TextRun { page_index: 0, text: "FIRST FLOOR PLAN".to_string(), rect: rect(10.0, 10.0, 180.0, 30.0) }];

    let mut vectors = Vec::new();
    for i in 0..10 {
        vectors.push(VectorEntry {
            page_index: 0,
            path: VectorPath::Line { p0: (0.0, i as f32 * 50.0), p1: (500.0, i as f32 * 50.0) },
        });
        vectors.push(VectorEntry {
            page_index: 0,
            path: VectorPath::Line { p0: (i as f32 * 50.0, 0.0), p1: (i as f32 * 50.0, 500.0) },
        });
    }

    // Cinco salas reales, a 50 px/ft: living 20x15ft, cocina 12x12ft,
    // dos dormitorios 12x12ft y 11x11ft, baño 8x6ft.
    let room_rects_px = [
        rect(700.0, 0.0, 1700.0, 750.0),
        rect(1750.0, 0.0, 2350.0, 600.0),
        rect(700.0, 800.0, 1300.0, 1400.0),
        rect(1350.0, 800.0, 1900.0, 1350.0),
        rect(1950.0, 800.0, 2350.0, 1100.0),
    ];
    for r in room_rects_px {
        vectors.push(VectorEntry { page_index: 0, path: VectorPath::Rectangle { rect: r } });
    }

    PdfDocument::from_parts(1_500_000, vec![page], text_runs, vectors).expect("documento sintetico valido")
}

struct StaticPdfSource(PdfDocument);

impl PdfSource for StaticPdfSource {
    fn fetch(&self, _blob_ref: &str, _timeout: Duration) -> Result<PdfDocument, Failure> {
        Ok(PdfDocument::from_parts(
            1_500_000,
            self.0.pages().to_vec(),
            self.0.text_runs_for_page(0).cloned().collect(),
            self.0.vectors_for_page(0).cloned().collect(),
        )
        .expect("documento sintetico valido"))
    }
}

fn base_request() -> EstimateRequest {
    EstimateRequest {
        pdf_blob_ref: "synthetic.json".to_string(),
        zip: "60601".to_string(),
        user_assumptions: UserAssumptions {
            duct_config: DuctConfig::VentedAttic,
            heating_fuel: HeatingFuel::Gas,
            construction_era: None,
            foundation_type: None,
            window_spec: None,
            envelope_overrides: None,
        },
    }
}

#[test]
fn estimate_completes_for_a_well_formed_floor_plan() {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf_source = StaticPdfSource(synthetic_floor_plan_doc());
    let mut config = RunConfig::default();
    config.scale_override_px_per_ft = Some(50.0);
    let vision_providers: Vec<Box<dyn VisionProvider>> = Vec::new();
    let semaphore = VisionSemaphore::default();

    let outcome = estimate(&base_request(), &pdf_source, &vision_providers, &semaphore, &config)
        .expect("una planta bien formada no debe devolver un error");

    let report = match outcome {
        Outcome::Complete(report) => report,
        Outcome::NeedsInput(details) => panic!("no se esperaba NeedsInput: {}", details.message),
    };

    assert!(report.heating_btuh > 0.0);
    assert!(report.cooling_btuh > 0.0);
    assert!(report.recommended_sizing_btuh > 0.0);
    assert_eq!(report.candidates.len(), 4, "deberian completar los cuatro candidatos del conjunto");
    assert!((0.0..=1.0).contains(&report.confidence));
    assert!(!report.provenance.is_empty());
    assert_eq!(report.room_confidence.len(), 5);
}

#[test]
fn estimate_rejects_invalid_zip() {
    let pdf_source = StaticPdfSource(synthetic_floor_plan_doc());
    let config = RunConfig::default();
    let vision_providers: Vec<Box<dyn VisionProvider>> = Vec::new();
    let semaphore = VisionSemaphore::default();

    let mut request = base_request();
    request.zip = "abc".to_string();

    let err = estimate(&request, &pdf_source, &vision_providers, &semaphore, &config).unwrap_err();
    assert!(matches!(err, Failure::InvalidZip(_)));
}

#[test]
fn estimate_needs_input_when_no_floor_page_is_recognized() {
    let page_rect = rect(0.0, 0.0, 400.0, 300.0);
    let page = PageImage { page_index: 0, bytes: vec![], dpi: 150, long_side_px: 400, rect: page_rect };
    let text_runs = vec![TextRun { page_index: 0, text: "COVER SHEET".to_string(), rect: rect(10.0, 10.0, 100.0, 20.0) }];
    let doc = PdfDocument::from_parts(1024, vec![page], text_runs, vec![]).unwrap();

    let pdf_source = StaticPdfSource(doc);
    let config = RunConfig::default();
    let vision_providers: Vec<Box<dyn VisionProvider>> = Vec::new();
    let semaphore = VisionSemaphore::default();

    let outcome = estimate(&base_request(), &pdf_source, &vision_providers, &semaphore, &config).unwrap();
    match outcome {
        Outcome::NeedsInput(details) => assert!(!details.message.is_empty()),
        Outcome::Complete(_) => panic!("se esperaba NeedsInput sin pagina de planta reconocible"),
    }
}
