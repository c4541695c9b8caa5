//! Hotel records and search queries

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DateRange, GeoPoint};
use crate::{Result, ToolkitError};

/// Amenity tags shared by hotels and rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Breakfast,
    FreeWifi,
    Parking,
    Pool,
    Gym,
    Spa,
    AirportShuttle,
    PetFriendly,
    Restaurant,
    AirConditioning,
}

impl Amenity {
    pub const ALL: [Amenity; 10] = [
        Amenity::Breakfast,
        Amenity::FreeWifi,
        Amenity::Parking,
        Amenity::Pool,
        Amenity::Gym,
        Amenity::Spa,
        Amenity::AirportShuttle,
        Amenity::PetFriendly,
        Amenity::Restaurant,
        Amenity::AirConditioning,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Amenity::Breakfast => "breakfast",
            Amenity::FreeWifi => "free_wifi",
            Amenity::Parking => "parking",
            Amenity::Pool => "pool",
            Amenity::Gym => "gym",
            Amenity::Spa => "spa",
            Amenity::AirportShuttle => "airport_shuttle",
            Amenity::PetFriendly => "pet_friendly",
            Amenity::Restaurant => "restaurant",
            Amenity::AirConditioning => "air_conditioning",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Amenity {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "breakfast" | "breakfast_included" => Ok(Amenity::Breakfast),
            "free_wifi" | "wifi" => Ok(Amenity::FreeWifi),
            "parking" => Ok(Amenity::Parking),
            "pool" => Ok(Amenity::Pool),
            "gym" => Ok(Amenity::Gym),
            "spa" => Ok(Amenity::Spa),
            "airport_shuttle" => Ok(Amenity::AirportShuttle),
            "pet_friendly" => Ok(Amenity::PetFriendly),
            "restaurant" => Ok(Amenity::Restaurant),
            "air_conditioning" => Ok(Amenity::AirConditioning),
            _ => Err(ToolkitError::validation(format!("unknown amenity '{s}'"))),
        }
    }
}

/// A hotel as returned to callers of the toolkit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    /// City or district the hotel belongs to
    pub region: Option<String>,
    pub location: GeoPoint,
    /// 1 to 5 stars
    pub star_rating: u8,
    /// 0.0 to 5.0
    pub guest_rating: f32,
    /// Lowest nightly rate for the queried stay; `None` when no room has inventory
    pub starting_price: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    /// Distance to the query point, filled in by ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl HotelSummary {
    #[must_use]
    pub fn has_amenities(&self, required: &BTreeSet<Amenity>) -> bool {
        required.is_subset(&self.amenities)
    }

    #[must_use]
    pub fn in_region(&self, region: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(region.trim()))
    }
}

/// Structured hotel search request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelQuery {
    pub region: Option<String>,
    pub location: Option<GeoPoint>,
    pub dates: DateRange,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    pub min_nightly_price: Option<Decimal>,
    pub max_nightly_price: Option<Decimal>,
    pub min_guest_rating: Option<f32>,
}

impl HotelQuery {
    /// Query around a point
    #[must_use]
    pub fn near(location: GeoPoint, dates: DateRange) -> Self {
        Self {
            region: None,
            location: Some(location),
            dates,
            amenities: BTreeSet::new(),
            min_nightly_price: None,
            max_nightly_price: None,
            min_guest_rating: None,
        }
    }

    /// Query for a named region
    #[must_use]
    pub fn in_region<S: Into<String>>(region: S, dates: DateRange) -> Self {
        Self {
            region: Some(region.into()),
            location: None,
            dates,
            amenities: BTreeSet::new(),
            min_nightly_price: None,
            max_nightly_price: None,
            min_guest_rating: None,
        }
    }

    #[must_use]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_amenity(mut self, amenity: Amenity) -> Self {
        self.amenities.insert(amenity);
        self
    }

    #[must_use]
    pub fn with_min_nightly_price(mut self, price: Decimal) -> Self {
        self.min_nightly_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_max_nightly_price(mut self, price: Decimal) -> Self {
        self.max_nightly_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_min_guest_rating(mut self, rating: f32) -> Self {
        self.min_guest_rating = Some(rating);
        self
    }

    /// Check the query is well formed and only uses amenities from `vocabulary`
    pub fn validate(&self, vocabulary: &[Amenity]) -> Result<()> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        self.dates.validate()?;

        let has_region = self
            .region
            .as_deref()
            .is_some_and(|region| !region.trim().is_empty());
        if !has_region && self.location.is_none() {
            return Err(ToolkitError::validation(
                "a region or coordinates must be supplied",
            ));
        }

        if let Some(unsupported) = self.amenities.iter().find(|a| !vocabulary.contains(a)) {
            return Err(ToolkitError::validation(format!(
                "amenity '{unsupported}' is not supported"
            )));
        }

        for price in [self.min_nightly_price, self.max_nightly_price].into_iter().flatten() {
            if price.is_sign_negative() {
                return Err(ToolkitError::validation("prices cannot be negative"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_nightly_price, self.max_nightly_price) {
            if min > max {
                return Err(ToolkitError::validation(format!(
                    "min price {min} is above max price {max}"
                )));
            }
        }

        if let Some(rating) = self.min_guest_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ToolkitError::validation(
                    "minimum guest rating must be between 0 and 5",
                ));
            }
        }

        Ok(())
    }
}
