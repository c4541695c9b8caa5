//! Best-room choice under guest preferences

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{RoomOption, RoomPreferences};
use crate::{Result, ToolkitError};

/// Picks one room out of the bookable options for a stay
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomSelector;

impl RoomSelector {
    pub fn new() -> Self {
        Self
    }

    /// Cheapest room meeting every preference.
    ///
    /// Ties on total price go to the larger room, then to the lower id.
    pub fn select_best(
        &self,
        rooms: &[RoomOption],
        preferences: &RoomPreferences,
    ) -> Result<RoomOption> {
        let best = rooms
            .iter()
            .filter(|room| preferences.accepts(room))
            .min_by(|a, b| compare(a, b))
            .cloned();

        match best {
            Some(room) => {
                debug!(
                    "Selected room {} ({} total) out of {} options",
                    room.id,
                    room.total_price,
                    rooms.len()
                );
                Ok(room)
            }
            None => Err(ToolkitError::no_room_available(describe_miss(
                rooms.len(),
                preferences,
            ))),
        }
    }
}

fn compare(a: &RoomOption, b: &RoomOption) -> Ordering {
    a.total_price
        .cmp(&b.total_price)
        .then_with(|| b.floor_area_sqm.total_cmp(&a.floor_area_sqm))
        .then_with(|| a.id.cmp(&b.id))
}

fn describe_miss(offered: usize, preferences: &RoomPreferences) -> String {
    if offered == 0 {
        return "no rooms are bookable for the requested dates".to_string();
    }

    let mut wanted = Vec::new();
    if !preferences.required_amenities.is_empty() {
        let amenities: Vec<&str> = preferences
            .required_amenities
            .iter()
            .map(|a| a.as_str())
            .collect();
        wanted.push(format!("amenities {}", amenities.join(", ")));
    }
    if let Some(bed) = preferences.bed {
        wanted.push(format!("{bed} bed"));
    }
    if let Some(area) = preferences.min_floor_area_sqm {
        wanted.push(format!("at least {area} sqm"));
    }
    if let Some(price) = preferences.max_total_price {
        wanted.push(format!("total price up to {price}"));
    }
    if let Some(guests) = preferences.guests {
        wanted.push(format!("room for {guests} guests"));
    }

    if wanted.is_empty() {
        format!("none of {offered} rooms matched")
    } else {
        format!("none of {offered} rooms offers {}", wanted.join("; "))
    }
}
