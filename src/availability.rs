//! Room availability over a stay
//!
//! A room is offered only when it has inventory for every night of the
//! stay. Partial coverage never counts.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::Result;
use crate::models::{DateRange, RoomInventory, RoomOption};
use crate::repository::HotelRepository;

/// Resolves bookable room options for a hotel and stay
pub struct AvailabilityResolver {
    repository: Arc<dyn HotelRepository>,
}

impl AvailabilityResolver {
    pub fn new(repository: Arc<dyn HotelRepository>) -> Self {
        Self { repository }
    }

    /// Rooms of `hotel_id` bookable for every night of `dates`, ordered by id.
    ///
    /// Fails with `InvalidDateRange` before any data source call, and with
    /// `HotelNotFound` for unknown hotels. No matching inventory is an empty
    /// vector.
    #[instrument(name = "list_rooms", level = "debug", skip(self))]
    pub async fn list_rooms(&self, hotel_id: &str, dates: &DateRange) -> Result<Vec<RoomOption>> {
        dates.validate()?;

        let inventory = self.repository.room_inventory(hotel_id, dates).await?;
        let total = inventory.len();

        let mut rooms: Vec<RoomOption> = inventory
            .into_iter()
            .filter(|entry| entry.room.hotel_id == hotel_id)
            .filter_map(|entry| room_option(entry, dates))
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            "{} of {} room types bookable for {} nights",
            rooms.len(),
            total,
            dates.nights()
        );
        Ok(rooms)
    }
}

/// Price a room for the stay, or `None` if any night lacks inventory
fn room_option(entry: RoomInventory, dates: &DateRange) -> Option<RoomOption> {
    let rates = entry.rates_for(dates.night_dates())?;
    let total_price: Decimal = rates.iter().copied().sum();
    let nightly_rate = (total_price / Decimal::from(dates.nights())).round_dp(2);

    let room = entry.room;
    Some(RoomOption {
        id: room.id,
        hotel_id: room.hotel_id,
        name: room.name,
        bed: room.bed,
        floor_area_sqm: room.floor_area_sqm,
        max_occupancy: room.max_occupancy,
        nightly_rate,
        total_price,
        amenities: room.amenities,
    })
}
