// Distributed under the MIT License

//! `blueprint`: tubería de ingestión de planos PDF a un levantamiento de
//! salas con procedencia. No rasteriza PDFs ni invoca el analizador
//! de visión por sí mismo: consume un [`pdf::PdfDocument`] ya abierto y,
//! opcionalmente, un [`vision::TakeoffDocument`] ya resuelto, y produce un
//! [`merge::MergedTakeoff`] listo para que el ensamblador de envolvente del
//! paquete raíz lo consuma.

pub mod classify;
pub mod envelope_extract;
pub mod merge;
pub mod openings;
pub mod pdf;
pub mod rooms;
pub mod scale;
pub mod types;

pub use classify::{classify, PageClassification, PageKind};
pub use envelope_extract::{extract_envelope_hits, EnvelopeHit, EnvelopeHitKind};
pub use merge::{merge_takeoff, summarize_exterior, ExteriorSummary, MergeWarning, MergedTakeoff};
pub use openings::{extract_doors, extract_windows, parse_mark_code};
pub use pdf::{PageImage, PageRect, PdfAdapterError, PdfDocument, TextRun, VectorEntry, VectorPath};
pub use rooms::{
    assign_openings_to_rooms, classify_wall_segments, compute_adjacencies,
    detect_rectangular_rooms, polygon_area_ft2, polygon_perimeter_ft, Opening, OpeningKind,
    Orientation, Polygon, Room, RoomKind, WallSegment,
};
pub use scale::{
    estimate_from_dimension_fit, estimate_from_room_validation, estimate_from_text, select_scale,
    Scale, ScaleAlternative, ScaleMethod, ScaleOutcome, ScaleVarianceTooHigh, CANDIDATE_SCALES,
    MIN_SELECTION_CONFIDENCE,
};
pub use types::{FieldSource, Sourced};

/// Distancia máxima (ft) entre el punto medio de un hueco y el muro
/// exterior más cercano para que se asigne a esa sala; por encima se
/// descarta como ruido de la detección vectorial.
const OPENING_ASSIGNMENT_MAX_DIST_FT: f32 = 5.0;

/// Resultado de procesar un documento PDF de extremo a extremo dentro de
/// este paquete: clasificación de páginas, desenlace de escala, salas
/// fusionadas, pistas de envolvente detectadas.
pub struct BlueprintIngest {
    pub page_classifications: Vec<PageClassification>,
    pub scale_outcome: ScaleOutcome,
    pub takeoff: Option<MergedTakeoff>,
    pub envelope_hits: Vec<EnvelopeHit>,
    pub exterior: Option<ExteriorSummary>,
}

/// Orquesta la tubería determinista sobre la página de planta
/// elegida, fusionando después con los `RoomHint` del proveedor de visión si
/// se proporcionan. No decide qué página usar como "floor page": eso lo
/// resuelve el llamador a partir de `page_classifications`.
///
/// Si ningún método de escala alcanza [`MIN_SELECTION_CONFIDENCE`], la
/// detección de salas se omite y `takeoff`/`exterior` quedan en `None`: el
/// llamador debe tratar `ScaleOutcome::NeedsInput` como una suspensión, no
/// como un error.
///
/// `scale_override_px_per_ft`, cuando se proporciona, salta los tres
/// métodos de estimación por completo: se usa
/// directamente con confianza 1.0 y método `Fallback`.
#[allow(clippy::too_many_arguments)]
pub fn ingest_floor_page(
    doc: &PdfDocument,
    floor_page_index: usize,
    vision_rooms: Vec<vision::RoomHint>,
    min_room_sqft: f32,
    max_room_sqft: f32,
    second_floor_suspected: bool,
    augmentation_area_threshold_ft2: f32,
    augmentation_enabled: bool,
    scale_override_px_per_ft: Option<f32>,
) -> Result<BlueprintIngest, ScaleVarianceTooHigh> {
    let page_classifications: Vec<PageClassification> = doc
        .pages()
        .iter()
        .map(|p| classify(doc, p.page_index))
        .collect();

    let envelope_hits = extract_envelope_hits(doc);

    let scale_outcome = if let Some(px_per_ft) = scale_override_px_per_ft {
        ScaleOutcome::Selected(Scale {
            pixels_per_foot: px_per_ft,
            notation: None,
            confidence: 1.0,
            method: ScaleMethod::Fallback,
            variance_percent: 0.0,
        })
    } else {
        let text_result = estimate_from_text(doc, floor_page_index).map(|(scale, _)| scale);
        let dimension_result = estimate_from_dimension_fit(doc, floor_page_index)?;
        let room_validation_results = estimate_from_room_validation(doc, floor_page_index);
        select_scale(text_result, dimension_result, room_validation_results)
    };

    let Some(scale) = (match &scale_outcome {
        ScaleOutcome::Selected(scale) => Some(scale.clone()),
        ScaleOutcome::NeedsInput { .. } => None,
    }) else {
        return Ok(BlueprintIngest {
            page_classifications,
            scale_outcome,
            takeoff: None,
            envelope_hits,
            exterior: None,
        });
    };

    let mut rule_rooms = detect_rectangular_rooms(
        doc,
        floor_page_index,
        scale.pixels_per_foot,
        min_room_sqft,
        max_room_sqft,
    );

    // `classify_wall_segments` compara contra `polygon_ft`, ya en pies: el
    // bounding box del edificio debe pasarse en las mismas unidades, no en
    // los píxeles crudos de página.
    let page_rect = doc.pages()[floor_page_index].rect;
    let building_bbox = (
        page_rect.x0 / scale.pixels_per_foot,
        page_rect.y0 / scale.pixels_per_foot,
        page_rect.x1 / scale.pixels_per_foot,
        page_rect.y1 / scale.pixels_per_foot,
    );
    classify_wall_segments(&mut rule_rooms, building_bbox);
    compute_adjacencies(&mut rule_rooms);

    // Los huecos se detectan una vez para toda la página y se reparten por
    // proximidad: cada ventana/puerta pertenece a la sala cuyo muro exterior
    // tiene más cerca, no a todas las salas de la planta.
    let mut openings_px = Vec::new();
    openings_px.extend(extract_windows(doc, floor_page_index, scale.pixels_per_foot));
    openings_px.extend(extract_doors(doc, floor_page_index, scale.pixels_per_foot));
    assign_openings_to_rooms(&mut rule_rooms, openings_px, scale.pixels_per_foot, OPENING_ASSIGNMENT_MAX_DIST_FT);

    let takeoff = merge_takeoff(
        vision_rooms,
        rule_rooms,
        second_floor_suspected,
        augmentation_area_threshold_ft2,
        augmentation_enabled,
    );

    let exterior = summarize_exterior(&takeoff.rooms);

    Ok(BlueprintIngest {
        page_classifications,
        scale_outcome,
        takeoff: Some(takeoff),
        envelope_hits,
        exterior: Some(exterior),
    })
}
