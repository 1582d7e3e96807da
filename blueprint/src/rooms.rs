// Distributed under the MIT License

//! Tipos de sala/hueco y detector determinista de salas a partir de
//! primitivas vectoriales: detección de salas, clasificación de muros y
//! extracción de huecos.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::pdf::{PdfDocument, VectorPath};
use crate::types::{FieldSource, Sourced};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum RoomKind {
    Bedroom,
    Bathroom,
    Kitchen,
    Living,
    Dining,
    Hall,
    Closet,
    Garage,
    Office,
    Laundry,
    Mechanical,
    Bonus,
    Other,
}

impl RoomKind {
    pub fn from_label(label: &str) -> RoomKind {
        let l = label.to_ascii_lowercase();
        const TABLE: &[(&str, RoomKind)] = &[
            ("bed", RoomKind::Bedroom),
            ("bdrm", RoomKind::Bedroom),
            ("bath", RoomKind::Bathroom),
            ("wc", RoomKind::Bathroom),
            ("kitchen", RoomKind::Kitchen),
            ("living", RoomKind::Living),
            ("great room", RoomKind::Living),
            ("family", RoomKind::Living),
            ("dining", RoomKind::Dining),
            ("hall", RoomKind::Hall),
            ("foyer", RoomKind::Hall),
            ("entry", RoomKind::Hall),
            ("closet", RoomKind::Closet),
            ("garage", RoomKind::Garage),
            ("office", RoomKind::Office),
            ("study", RoomKind::Office),
            ("laundry", RoomKind::Laundry),
            ("utility", RoomKind::Laundry),
            ("mechanical", RoomKind::Mechanical),
            ("furnace", RoomKind::Mechanical),
            ("bonus", RoomKind::Bonus),
        ];
        TABLE
            .iter()
            .find(|(needle, _)| l.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(RoomKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpeningKind {
    Window,
    Door,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Orientation {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    pub kind: OpeningKind,
    pub width_ft: f32,
    pub height_ft: f32,
    pub orientation: Orientation,
    pub u_value: Option<f32>,
    pub shgc: Option<f32>,
}

/// Polígono ordenado en pies, en el plano (x, y).
pub type Polygon = Vec<Point2<f32>>;

pub fn polygon_area_ft2(poly: &Polygon) -> f32 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for i in 0..poly.len() {
        let p0 = poly[i];
        let p1 = poly[(i + 1) % poly.len()];
        sum += p0.x * p1.y - p1.x * p0.y;
    }
    (sum / 2.0).abs()
}

pub fn polygon_perimeter_ft(poly: &Polygon) -> f32 {
    if poly.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0f32;
    for i in 0..poly.len() {
        let p0 = poly[i];
        let p1 = poly[(i + 1) % poly.len()];
        total += ((p1.x - p0.x).powi(2) + (p1.y - p0.y).powi(2)).sqrt();
    }
    total
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSegment {
    pub p0: (f32, f32),
    pub p1: (f32, f32),
    pub exterior: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub kind: Sourced<RoomKind>,
    pub floor_index: i32,
    pub polygon_ft: Polygon,
    pub area_ft2: f32,
    pub perimeter_ft: f32,
    pub ceiling_height_ft: f32,
    pub exterior_wall_segments: Vec<WallSegment>,
    pub interior_wall_segments: Vec<WallSegment>,
    pub windows: Vec<Opening>,
    pub doors: Vec<Opening>,
    pub adjacent_room_ids: Vec<u32>,
    pub confidence: f32,
    pub source: FieldSource,
}

/// Detecta rectángulos explícitos en área [25, 1000] ft² tras aplicar
/// escala, y deduplica por centroide + área (+-10 ft²).
pub fn detect_rectangular_rooms(
    doc: &PdfDocument,
    page_index: usize,
    px_per_ft: f32,
    min_room_sqft: f32,
    max_room_sqft: f32,
) -> Vec<Room> {
    let mut rooms = Vec::new();
    let mut next_id = 0u32;

    for entry in doc.vectors_for_page(page_index) {
        let VectorPath::Rectangle { rect } = &entry.path else {
            continue;
        };
        let width_ft = rect.width() / px_per_ft;
        let height_ft = rect.height() / px_per_ft;
        let area_ft2 = width_ft * height_ft;
        if !(min_room_sqft.max(25.0)..=max_room_sqft.min(1000.0)).contains(&area_ft2) {
            continue;
        }

        let poly: Polygon = vec![
            Point2::new(rect.x0 / px_per_ft, rect.y0 / px_per_ft),
            Point2::new(rect.x1 / px_per_ft, rect.y0 / px_per_ft),
            Point2::new(rect.x1 / px_per_ft, rect.y1 / px_per_ft),
            Point2::new(rect.x0 / px_per_ft, rect.y1 / px_per_ft),
        ];
        let centroid = (
            (rect.x0 + rect.x1) / 2.0 / px_per_ft,
            (rect.y0 + rect.y1) / 2.0 / px_per_ft,
        );

        let is_duplicate = rooms.iter().any(|r: &Room| {
            let rc = room_centroid(r);
            let dist = ((rc.0 - centroid.0).powi(2) + (rc.1 - centroid.1).powi(2)).sqrt();
            dist < 3.0 && (r.area_ft2 - area_ft2).abs() <= 10.0
        });
        if is_duplicate {
            continue;
        }

        let label = nearest_label(doc, page_index, (rect.x0, rect.y0), rect.width().min(rect.height()), 50.0);
        let kind = RoomKind::from_label(label.as_deref().unwrap_or(""));

        let room = Room {
            id: next_id,
            name: label.clone().unwrap_or_else(|| format!("Room {}", next_id)),
            kind: Sourced::new(kind, FieldSource::RuleExtractor, 0.75),
            floor_index: 0,
            polygon_ft: poly,
            area_ft2,
            perimeter_ft: 2.0 * (width_ft + height_ft),
            ceiling_height_ft: 8.0,
            exterior_wall_segments: vec![],
            interior_wall_segments: vec![],
            windows: vec![],
            doors: vec![],
            adjacent_room_ids: vec![],
            confidence: 0.75,
            source: FieldSource::RuleExtractor,
        };
        rooms.push(room);
        next_id += 1;
    }

    rooms
}

fn room_centroid(r: &Room) -> (f32, f32) {
    let n = r.polygon_ft.len().max(1) as f32;
    let sx: f32 = r.polygon_ft.iter().map(|p| p.x).sum();
    let sy: f32 = r.polygon_ft.iter().map(|p| p.y).sum();
    (sx / n, sy / n)
}

fn nearest_label(
    doc: &PdfDocument,
    page_index: usize,
    point_px: (f32, f32),
    _scale_hint: f32,
    max_dist_px: f32,
) -> Option<String> {
    doc.text_runs_for_page(page_index)
        .filter(|t| !t.text.trim().is_empty())
        .min_by(|a, b| {
            let da = dist_to_rect(point_px, &a.rect);
            let db = dist_to_rect(point_px, &b.rect);
            da.partial_cmp(&db).unwrap()
        })
        .filter(|t| dist_to_rect(point_px, &t.rect) <= max_dist_px)
        .map(|t| t.text.clone())
}

fn dist_to_rect(point: (f32, f32), rect: &crate::pdf::PageRect) -> f32 {
    let cx = (rect.x0 + rect.x1) / 2.0;
    let cy = (rect.y0 + rect.y1) / 2.0;
    ((cx - point.0).powi(2) + (cy - point.1).powi(2)).sqrt()
}

/// Clasifica segmentos de muro como exteriores si caen a <= 5 ft del
/// contorno del bounding box general del edificio.
pub fn classify_wall_segments(rooms: &mut [Room], building_bbox: (f32, f32, f32, f32)) {
    let (min_x, min_y, max_x, max_y) = building_bbox;
    for room in rooms.iter_mut() {
        let mut exterior = Vec::new();
        let mut interior = Vec::new();
        for i in 0..room.polygon_ft.len() {
            let p0 = room.polygon_ft[i];
            let p1 = room.polygon_ft[(i + 1) % room.polygon_ft.len()];
            let near_boundary = (p0.x - min_x).abs() <= 5.0
                || (p0.y - min_y).abs() <= 5.0
                || (max_x - p0.x).abs() <= 5.0
                || (max_y - p0.y).abs() <= 5.0;
            let seg = WallSegment {
                p0: (p0.x, p0.y),
                p1: (p1.x, p1.y),
                exterior: near_boundary,
            };
            if near_boundary {
                exterior.push(seg);
            } else {
                interior.push(seg);
            }
        }
        room.exterior_wall_segments = exterior;
        room.interior_wall_segments = interior;
    }
}

fn dist_point_to_segment(p: (f32, f32), seg: &WallSegment) -> f32 {
    let (x, y) = p;
    let (x0, y0) = seg.p0;
    let (x1, y1) = seg.p1;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-9 {
        return ((x - x0).powi(2) + (y - y0).powi(2)).sqrt();
    }
    let t = (((x - x0) * dx + (y - y0) * dy) / len_sq).clamp(0.0, 1.0);
    let px = x0 + t * dx;
    let py = y0 + t * dy;
    ((x - px).powi(2) + (y - py).powi(2)).sqrt()
}

/// Asigna cada hueco (ventana o puerta) detectado en la página a la sala
/// cuyo muro exterior queda más cerca de su punto medio, en vez de
/// replicar el listado completo de la página en todas las salas. Un hueco
/// que no cae a menos de `max_dist_ft` de ningún muro exterior se descarta
/// (probablemente ruido de la detección vectorial, no un hueco real).
pub fn assign_openings_to_rooms(
    rooms: &mut [Room],
    openings_px: Vec<(Opening, (f32, f32))>,
    px_per_ft: f32,
    max_dist_ft: f32,
) {
    for (opening, midpoint_px) in openings_px {
        let midpoint_ft = (midpoint_px.0 / px_per_ft, midpoint_px.1 / px_per_ft);
        let nearest = rooms
            .iter_mut()
            .filter(|r| !r.exterior_wall_segments.is_empty())
            .min_by(|a, b| {
                let da = a
                    .exterior_wall_segments
                    .iter()
                    .map(|seg| dist_point_to_segment(midpoint_ft, seg))
                    .fold(f32::INFINITY, f32::min);
                let db = b
                    .exterior_wall_segments
                    .iter()
                    .map(|seg| dist_point_to_segment(midpoint_ft, seg))
                    .fold(f32::INFINITY, f32::min);
                da.partial_cmp(&db).unwrap()
            });
        let Some(room) = nearest else { continue };
        let min_dist = room
            .exterior_wall_segments
            .iter()
            .map(|seg| dist_point_to_segment(midpoint_ft, seg))
            .fold(f32::INFINITY, f32::min);
        if min_dist > max_dist_ft {
            continue;
        }
        match opening.kind {
            OpeningKind::Window => room.windows.push(opening),
            OpeningKind::Door => room.doors.push(opening),
        }
    }
}

/// Adyacencias: dos salas comparten pared si algún punto de sus polígonos
/// cae a menos de 3 ft de distancia.
pub fn compute_adjacencies(rooms: &mut [Room]) {
    let n = rooms.len();
    let mut adjacency: Vec<Vec<u32>> = vec![vec![]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let touching = rooms[i].polygon_ft.iter().any(|pi| {
                rooms[j]
                    .polygon_ft
                    .iter()
                    .any(|pj| (pi - pj).norm() < 3.0)
            });
            if touching {
                adjacency[i].push(rooms[j].id);
                adjacency[j].push(rooms[i].id);
            }
        }
    }
    for (room, adj) in rooms.iter_mut().zip(adjacency.into_iter()) {
        room.adjacent_room_ids = adj;
    }
}
