//! Room types, per-night inventory and selection preferences

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Amenity;

/// Bed configuration of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedType {
    Single,
    Double,
    Queen,
    King,
    Twin,
    Bunk,
}

impl fmt::Display for BedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BedType::Single => "single",
            BedType::Double => "double",
            BedType::Queen => "queen",
            BedType::King => "king",
            BedType::Twin => "twin",
            BedType::Bunk => "bunk",
        };
        f.write_str(name)
    }
}

/// A room type as stored by the data source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomType {
    pub id: String,
    pub hotel_id: String,
    pub name: String,
    pub bed: BedType,
    pub floor_area_sqm: f32,
    pub max_occupancy: u8,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
}

/// Inventory count and price for one night
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct NightlyRate {
    /// Rooms of this type still bookable that night
    pub available: u32,
    pub price: Decimal,
}

/// A room type together with its per-night inventory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomInventory {
    pub room: RoomType,
    #[serde(default)]
    pub nights: BTreeMap<NaiveDate, NightlyRate>,
}

impl RoomInventory {
    /// Rates for every night in `nights`, or `None` if any night has no inventory
    pub fn rates_for<I>(&self, nights: I) -> Option<Vec<Decimal>>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        nights
            .into_iter()
            .map(|night| {
                self.nights
                    .get(&night)
                    .filter(|rate| rate.available > 0)
                    .map(|rate| rate.price)
            })
            .collect()
    }
}

/// A bookable room for a specific stay
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomOption {
    pub id: String,
    pub hotel_id: String,
    pub name: String,
    pub bed: BedType,
    pub floor_area_sqm: f32,
    pub max_occupancy: u8,
    /// Average price per night over the stay
    pub nightly_rate: Decimal,
    /// Price for the whole stay
    pub total_price: Decimal,
    pub amenities: BTreeSet<Amenity>,
}

impl RoomOption {
    #[must_use]
    pub fn has_amenities(&self, required: &BTreeSet<Amenity>) -> bool {
        required.is_subset(&self.amenities)
    }

    #[must_use]
    pub fn includes_breakfast(&self) -> bool {
        self.amenities.contains(&Amenity::Breakfast)
    }
}

/// Hard constraints a selected room must satisfy
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RoomPreferences {
    #[serde(default)]
    pub required_amenities: BTreeSet<Amenity>,
    pub bed: Option<BedType>,
    pub min_floor_area_sqm: Option<f32>,
    pub max_total_price: Option<Decimal>,
    pub guests: Option<u8>,
}

impl RoomPreferences {
    #[must_use]
    pub fn breakfast_required(mut self) -> Self {
        self.required_amenities.insert(Amenity::Breakfast);
        self
    }

    #[must_use]
    pub fn with_amenity(mut self, amenity: Amenity) -> Self {
        self.required_amenities.insert(amenity);
        self
    }

    #[must_use]
    pub fn with_bed(mut self, bed: BedType) -> Self {
        self.bed = Some(bed);
        self
    }

    #[must_use]
    pub fn with_guests(mut self, guests: u8) -> Self {
        self.guests = Some(guests);
        self
    }

    #[must_use]
    pub fn with_max_total_price(mut self, price: Decimal) -> Self {
        self.max_total_price = Some(price);
        self
    }

    /// Whether `room` meets every constraint
    #[must_use]
    pub fn accepts(&self, room: &RoomOption) -> bool {
        room.has_amenities(&self.required_amenities)
            && self.bed.is_none_or(|bed| room.bed == bed)
            && self
                .min_floor_area_sqm
                .is_none_or(|area| room.floor_area_sqm >= area)
            && self
                .max_total_price
                .is_none_or(|price| room.total_price <= price)
            && self.guests.is_none_or(|guests| guests <= room.max_occupancy)
    }
}
