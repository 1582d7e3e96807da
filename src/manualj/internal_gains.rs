// Distributed under the MIT License

//! Ganancias internas de refrigeración: solo se calculan para refrigeración, nunca se restan de
//! la calefacción, siguiendo la práctica habitual de Manual J de dimensionar
//! calefacción sin crédito por ganancias internas.

use blueprint::RoomKind;

pub struct InternalGainsResult {
    pub sensible_btuh: f32,
    pub latent_btuh: f32,
}

const OCCUPANT_SENSIBLE_BTUH: f32 = 230.0;
const OCCUPANT_LATENT_BTUH: f32 = 200.0;
const EQUIPMENT_LIGHTING_BTUH_PER_FT2: f32 = 2.56;

pub fn total_occupants(total_area_ft2: f32) -> f32 {
    (total_area_ft2 / 300.0).max(1.0)
}

/// Ganancias de una sala, incluyendo su prorrateo de los ocupantes del
/// edificio por fracción de área.
pub fn for_room(room_area_ft2: f32, room_kind: RoomKind, total_area_ft2: f32, total_occupants: f32) -> InternalGainsResult {
    let equipment_multiplier = if room_kind == RoomKind::Kitchen { 2.0 } else { 1.0 };
    let latent_multiplier = if room_kind == RoomKind::Bathroom { 1.5 } else { 1.0 };

    let equipment = EQUIPMENT_LIGHTING_BTUH_PER_FT2 * room_area_ft2 * equipment_multiplier;
    let lighting = EQUIPMENT_LIGHTING_BTUH_PER_FT2 * room_area_ft2;

    let area_fraction = if total_area_ft2 > 0.0 { room_area_ft2 / total_area_ft2 } else { 0.0 };
    let occupant_sensible = OCCUPANT_SENSIBLE_BTUH * total_occupants * area_fraction;
    let occupant_latent = OCCUPANT_LATENT_BTUH * total_occupants * area_fraction * latent_multiplier;

    InternalGainsResult {
        sensible_btuh: equipment + lighting + occupant_sensible,
        latent_btuh: occupant_latent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_doubles_the_equipment_gain() {
        let occupants = total_occupants(1_500.0);
        let kitchen = for_room(150.0, RoomKind::Kitchen, 1_500.0, occupants);
        let living = for_room(150.0, RoomKind::Living, 1_500.0, occupants);
        assert!(kitchen.sensible_btuh > living.sensible_btuh);
    }

    #[test]
    fn bathroom_inflates_latent_gain() {
        let occupants = total_occupants(1_500.0);
        let bathroom = for_room(50.0, RoomKind::Bathroom, 1_500.0, occupants);
        let hall = for_room(50.0, RoomKind::Hall, 1_500.0, occupants);
        assert!(bathroom.latent_btuh > hall.latent_btuh);
    }

    #[test]
    fn occupants_never_go_below_one() {
        assert_eq!(total_occupants(100.0), 1.0);
    }
}
