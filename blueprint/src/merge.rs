// Distributed under the MIT License

//! Fusionador de levantamiento: concilia las salas del analizador de
//! visión con las de los extractores deterministas en un grafo de salas
//! canónico, con procedencia por campo, y amplía con salas típicas cuando
//! el área total es implausiblemente pequeña para un segundo piso
//! sospechado.

use serde::{Deserialize, Serialize};
use vision::RoomHint;

use crate::rooms::{Room, RoomKind, WallSegment};
use crate::types::FieldSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeWarning {
    pub message: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedTakeoff {
    pub rooms: Vec<Room>,
    pub total_area_ft2: f32,
    pub warnings: Vec<MergeWarning>,
}

/// Distancia de centroides por debajo de la cual dos salas (una de visión,
/// una de reglas) se consideran la misma, expresada como fracción del ancho
/// de la sala más pequeña.
const MATCH_DISTANCE_FRACTION: f32 = 0.20;

fn vision_confidence_source(confidence: f32) -> FieldSource {
    if confidence >= 0.8 {
        FieldSource::VisionHighConfidence
    } else {
        FieldSource::VisionLowConfidence
    }
}

/// Construye una sala "vision-only" cuando no hay correspondencia en los
/// extractores de reglas.
fn room_from_hint(hint: &RoomHint, id: u32) -> Room {
    let area = hint.area_ft2.unwrap_or_else(|| {
        match (hint.width_ft, hint.height_ft) {
            (Some(w), Some(h)) => w * h,
            _ => 120.0,
        }
    });
    let side = area.sqrt().max(1.0);
    let source = vision_confidence_source(hint.confidence);
    Room {
        id,
        name: hint.name.clone(),
        kind: crate::types::Sourced::new(RoomKind::from_label(&hint.kind_hint), source, hint.confidence),
        floor_index: hint.floor_index.unwrap_or(0),
        polygon_ft: vec![
            nalgebra::Point2::new(0.0, 0.0),
            nalgebra::Point2::new(side, 0.0),
            nalgebra::Point2::new(side, side),
            nalgebra::Point2::new(0.0, side),
        ],
        area_ft2: area,
        perimeter_ft: 4.0 * side,
        ceiling_height_ft: 8.0,
        exterior_wall_segments: vec![],
        interior_wall_segments: vec![],
        windows: vec![],
        doors: vec![],
        adjacent_room_ids: vec![],
        confidence: hint.confidence,
        source,
    }
}

fn centroid(room: &Room) -> (f32, f32) {
    let n = room.polygon_ft.len().max(1) as f32;
    let sx: f32 = room.polygon_ft.iter().map(|p| p.x).sum();
    let sy: f32 = room.polygon_ft.iter().map(|p| p.y).sum();
    (sx / n, sy / n)
}

fn room_width(room: &Room) -> f32 {
    room.area_ft2.sqrt().max(1.0)
}

/// Tipos de sala típicos usados para ampliar un levantamiento cuya área
/// total queda por debajo del umbral plausible cuando se sospecha una
/// segunda planta (vigas de escalera detectadas o clasificación de página
/// lo indica).
fn augmentation_plan() -> Vec<(RoomKind, &'static str, f32)> {
    vec![
        (RoomKind::Kitchen, "Kitchen (estimada)", 150.0),
        (RoomKind::Bedroom, "Bedroom 2 (estimada)", 120.0),
        (RoomKind::Bedroom, "Bedroom 3 (estimada)", 120.0),
        (RoomKind::Bedroom, "Bedroom 4 (estimada)", 110.0),
        (RoomKind::Bathroom, "Bath 1 (estimada)", 50.0),
        (RoomKind::Bathroom, "Bath 2 (estimada)", 45.0),
    ]
}

/// Fusiona salas de visión y de reglas. `min_total_sqft` y
/// `second_floor_suspected` gobiernan la política de ampliación:
/// cuando el área total fusionada queda por debajo de 2000 ft² y se
/// sospecha una segunda planta, se añaden salas típicas marcadas
/// `source=Augmented`, `confidence=0.3`, con un aviso registrado.
pub fn merge_takeoff(
    vision_rooms: Vec<RoomHint>,
    rule_rooms: Vec<Room>,
    second_floor_suspected: bool,
    augmentation_area_threshold_ft2: f32,
    augmentation_enabled: bool,
) -> MergedTakeoff {
    let mut merged: Vec<Room> = rule_rooms;
    let mut next_id = merged.iter().map(|r| r.id).max().map(|m| m + 1).unwrap_or(0);
    let mut warnings = Vec::new();

    for hint in &vision_rooms {
        let hint_room = room_from_hint(hint, next_id);
        let hint_centroid = centroid(&hint_room);
        let hint_kind = RoomKind::from_label(&hint.kind_hint);

        let best_match = merged.iter_mut().min_by(|a, b| {
            let da = dist(centroid(a), hint_centroid);
            let db = dist(centroid(b), hint_centroid);
            da.partial_cmp(&db).unwrap()
        });

        let matched = best_match.is_some_and(|m| {
            let d = dist(centroid(m), hint_centroid);
            let threshold = room_width(m).min(room_width(&hint_room)) * MATCH_DISTANCE_FRACTION;
            d <= threshold && (m.kind.value == hint_kind || hint_kind == RoomKind::Other)
        });

        if matched {
            // La sala de reglas gana por precedencia salvo que la visión
            // tenga alta confianza y la de reglas no sea de un horario
            // rotulado (no modelado aquí; los extractores de reglas no
            // producen LabeledSchedule por sí mismos en esta fase).
            if let Some(existing) = merged.iter_mut().min_by(|a, b| {
                dist(centroid(a), hint_centroid)
                    .partial_cmp(&dist(centroid(b), hint_centroid))
                    .unwrap()
            }) {
                if hint.confidence >= 0.8 && existing.source.precedence() > FieldSource::VisionHighConfidence.precedence()
                {
                    existing.kind = crate::types::Sourced::new(
                        hint_kind,
                        FieldSource::VisionHighConfidence,
                        hint.confidence,
                    );
                    existing.source = FieldSource::VisionHighConfidence;
                    existing.confidence = hint.confidence;
                }
            }
        } else {
            merged.push(hint_room);
            next_id += 1;
        }
    }

    let total_area_ft2: f32 = merged.iter().map(|r| r.area_ft2).sum();

    if augmentation_enabled && total_area_ft2 < augmentation_area_threshold_ft2 && second_floor_suspected {
        for (kind, name, area) in augmentation_plan() {
            let side = area.sqrt();
            merged.push(Room {
                id: next_id,
                name: name.to_string(),
                kind: crate::types::Sourced::new(kind, FieldSource::Augmented, 0.3),
                floor_index: 1,
                polygon_ft: vec![
                    nalgebra::Point2::new(0.0, 0.0),
                    nalgebra::Point2::new(side, 0.0),
                    nalgebra::Point2::new(side, side),
                    nalgebra::Point2::new(0.0, side),
                ],
                area_ft2: area,
                perimeter_ft: 4.0 * side,
                ceiling_height_ft: 8.0,
                exterior_wall_segments: vec![],
                interior_wall_segments: vec![],
                windows: vec![],
                doors: vec![],
                adjacent_room_ids: vec![],
                confidence: 0.3,
                source: FieldSource::Augmented,
            });
            next_id += 1;
        }
        warnings.push(MergeWarning {
            message: format!(
                "área total fusionada ({:.0} ft²) por debajo del umbral plausible ({:.0} ft²) con segunda planta sospechada; se añadieron salas estimadas",
                total_area_ft2, augmentation_area_threshold_ft2
            ),
            confidence: 0.3,
        });
    }

    let total_area_ft2: f32 = merged.iter().map(|r| r.area_ft2).sum();

    MergedTakeoff {
        rooms: merged,
        total_area_ft2,
        warnings,
    }
}

fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Resumen exterior de envolvente: perímetro total y área bruta de muro.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ExteriorSummary {
    pub perimeter_ft: f32,
    pub gross_wall_area_ft2: f32,
}

pub fn summarize_exterior(rooms: &[Room]) -> ExteriorSummary {
    let mut perimeter_ft = 0.0;
    let mut gross_wall_area_ft2 = 0.0;
    for room in rooms {
        let ext: Vec<&WallSegment> = room.exterior_wall_segments.iter().collect();
        for seg in ext {
            let len = ((seg.p1.0 - seg.p0.0).powi(2) + (seg.p1.1 - seg.p0.1).powi(2)).sqrt();
            perimeter_ft += len;
            gross_wall_area_ft2 += len * room.ceiling_height_ft;
        }
    }
    ExteriorSummary {
        perimeter_ft,
        gross_wall_area_ft2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augmentation_triggers_below_threshold_with_second_floor() {
        let result = merge_takeoff(vec![], vec![], true, 2000.0, true);
        assert!(result.total_area_ft2 > 0.0);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn no_augmentation_without_second_floor_suspicion() {
        let result = merge_takeoff(vec![], vec![], false, 2000.0, true);
        assert_eq!(result.total_area_ft2, 0.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn augmentation_can_be_disabled() {
        let result = merge_takeoff(vec![], vec![], true, 2000.0, false);
        assert!(result.warnings.is_empty());
    }
}
