// Distributed under the MIT License

use blueprint::{
    ExteriorSummary, FieldSource, Opening, OpeningKind, Orientation, Room, RoomKind, Sourced, WallSegment,
};
use climate::climate_for_zip;
use criterion::{criterion_group, criterion_main, Criterion};
use loadcalc::geometry::compute_geometry;
use loadcalc::model::{DuctLocation, Envelope, FoundationKind};
use loadcalc::reliability::blend_candidates;
use loadcalc::{baselines, manualj};
use nalgebra::Point2;

fn rect_polygon(w: f32, h: f32) -> Vec<Point2<f32>> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

fn make_room(id: u32, name: &str, kind: RoomKind, w: f32, h: f32, floor_index: i32) -> Room {
    let exterior_wall_segments = vec![
        WallSegment { p0: (0.0, 0.0), p1: (w, 0.0), exterior: true },
        WallSegment { p0: (w, 0.0), p1: (w, h), exterior: true },
    ];
    let windows = vec![Opening {
        kind: OpeningKind::Window,
        width_ft: 3.0,
        height_ft: 4.0,
        orientation: Orientation::S,
        u_value: None,
        shgc: None,
    }];
    let doors = if id == 0 {
        vec![Opening {
            kind: OpeningKind::Door,
            width_ft: 3.0,
            height_ft: 6.67,
            orientation: Orientation::N,
            u_value: None,
            shgc: None,
        }]
    } else {
        Vec::new()
    };

    Room {
        id,
        name: name.to_string(),
        kind: Sourced::new(kind, FieldSource::RuleExtractor, 0.9),
        floor_index,
        polygon_ft: rect_polygon(w, h),
        area_ft2: w * h,
        perimeter_ft: 2.0 * (w + h),
        ceiling_height_ft: 8.0,
        exterior_wall_segments,
        interior_wall_segments: Vec::new(),
        windows,
        doors,
        adjacent_room_ids: Vec::new(),
        confidence: 0.9,
        source: FieldSource::RuleExtractor,
    }
}

fn synthetic_rooms() -> Vec<Room> {
    vec![
        make_room(0, "living", RoomKind::Living, 20.0, 15.0, 0),
        make_room(1, "kitchen", RoomKind::Kitchen, 12.0, 12.0, 0),
        make_room(2, "bedroom_1", RoomKind::Bedroom, 12.0, 12.0, 0),
        make_room(3, "bedroom_2", RoomKind::Bedroom, 11.0, 11.0, 0),
        make_room(4, "bathroom", RoomKind::Bathroom, 8.0, 6.0, 0),
    ]
}

fn synthetic_envelope() -> Envelope {
    Envelope {
        wall_r: Sourced::new(13.0, FieldSource::EraDefault, 0.7),
        ceiling_r: Sourced::new(38.0, FieldSource::EraDefault, 0.7),
        floor_r: Sourced::new(19.0, FieldSource::EraDefault, 0.7),
        window_u: Sourced::new(0.35, FieldSource::EraDefault, 0.7),
        window_shgc: Sourced::new(0.30, FieldSource::EraDefault, 0.7),
        door_u: Sourced::new(0.40, FieldSource::EraDefault, 0.7),
        ach50: Sourced::new(7.0, FieldSource::ZoneDefault, 0.6),
        foundation_kind: Sourced::new(FoundationKind::CrawlVented, FieldSource::RuleExtractor, 0.8),
        duct_location: Sourced::new(DuctLocation::VentedAttic, FieldSource::RuleExtractor, 0.8),
        ceiling_height_default: Sourced::new(8.0, FieldSource::ZoneDefault, 0.9),
        per_facade_wwr: Sourced::new(0.20, FieldSource::ConservativeDefault, 0.5),
    }
}

fn synthetic_exterior() -> ExteriorSummary {
    let rooms = synthetic_rooms();
    blueprint::summarize_exterior(&rooms)
}

fn run_primary() -> manualj::ManualJOutcome {
    let rooms = synthetic_rooms();
    let envelope = synthetic_envelope();
    let climate = climate_for_zip("60601").expect("zip de referencia valido");
    let exterior = synthetic_exterior();
    let geometry = compute_geometry(&rooms, &exterior, 8.0);
    manualj::calculate_primary(&rooms, &envelope, &climate, &geometry, 0.0, false)
}

fn run_baselines() -> (
    loadcalc::model::Candidate,
    loadcalc::model::Candidate,
    loadcalc::model::Candidate,
) {
    let rooms = synthetic_rooms();
    let climate = climate_for_zip("60601").expect("zip de referencia valido");
    let exterior = synthetic_exterior();
    let geometry = compute_geometry(&rooms, &exterior, 8.0);

    let code_min = baselines::code_minimum(&climate, &geometry, 3, false, 65.0, 15.0);
    let ua_oa = baselines::ua_oa(&synthetic_envelope(), &climate, &geometry, 3, 65.0, 15.0);
    let regional = baselines::regional_intensity(&climate, &geometry, DuctLocation::VentedAttic);
    (code_min, ua_oa, regional)
}

fn run_blend() -> loadcalc::model::ReliabilityResult {
    let primary = run_primary();
    let (code_min, ua_oa, regional) = run_baselines();
    let quality = loadcalc::model::QualityScore {
        value: 0.7,
        feature_scores: vec![("spec_density".to_string(), 0.6)],
        routing: loadcalc::model::QualityRouting::Hybrid,
        factors: Vec::new(),
    };
    blend_candidates(
        vec![primary.candidate, code_min, ua_oa, regional],
        quality,
        true,
        loadcalc::model::HeatingFuel::Gas,
        false,
        1200.0,
        1,
        DuctLocation::VentedAttic,
    )
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("manualj_calculate_primary", |b| b.iter(run_primary));
    c.bench_function("baselines_all_three", |b| b.iter(run_baselines));
    c.bench_function("reliability_blend_candidates", |b| b.iter(run_blend));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
