// Distributed under the MIT License

//! Agregados geométricos derivados del grafo de salas fusionado, consumidos
//! tanto por los calculadores de línea base como por el calculador Manual J.
//! Ninguno de los dos vuelve a recorrer las salas por separado para estas
//! cantidades agregadas.

use blueprint::{ExteriorSummary, Room};

#[derive(Debug, Clone, Copy)]
pub struct BuildingGeometry {
    pub total_area_ft2: f32,
    pub stories: u8,
    pub room_count: usize,
    pub perimeter_ft: f32,
    pub gross_wall_area_ft2: f32,
    pub window_area_ft2: f32,
    pub door_area_ft2: f32,
    pub net_wall_area_ft2: f32,
    pub top_floor_area_ft2: f32,
    pub ceiling_height_ft: f32,
}

pub fn compute_geometry(rooms: &[Room], exterior: &ExteriorSummary, ceiling_height_ft: f32) -> BuildingGeometry {
    let total_area_ft2: f32 = rooms.iter().map(|r| r.area_ft2).sum();
    let stories = rooms.iter().map(|r| r.floor_index).max().unwrap_or(0).max(0) as u8 + 1;
    let top_floor_index = stories as i32 - 1;
    let top_floor_area_ft2: f32 = rooms
        .iter()
        .filter(|r| r.floor_index == top_floor_index)
        .map(|r| r.area_ft2)
        .sum();

    let mut window_area_ft2 = 0.0;
    let mut door_area_ft2 = 0.0;
    for room in rooms {
        for w in &room.windows {
            window_area_ft2 += w.width_ft * w.height_ft;
        }
        for d in &room.doors {
            door_area_ft2 += d.width_ft * d.height_ft;
        }
    }

    let net_wall_area_ft2 = (exterior.gross_wall_area_ft2 - window_area_ft2 - door_area_ft2).max(0.0);

    BuildingGeometry {
        total_area_ft2,
        stories,
        room_count: rooms.len(),
        perimeter_ft: exterior.perimeter_ft,
        gross_wall_area_ft2: exterior.gross_wall_area_ft2,
        window_area_ft2,
        door_area_ft2,
        net_wall_area_ft2,
        top_floor_area_ft2,
        ceiling_height_ft,
    }
}
