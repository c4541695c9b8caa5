//! Static hotel dataset held in memory
//!
//! Datasets are JSON documents listing hotels with their room types. Each
//! room carries an optional season (a default rate over a date span) plus
//! per-night overrides, which is enough to describe sold-out nights and
//! price peaks without listing every date.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{HotelRepository, dedup_and_cap};
use crate::config::SearchConfig;
use crate::models::{
    Amenity, BedType, DateRange, GeoPoint, HotelQuery, HotelSummary, NightlyRate, RoomInventory,
    RoomType,
};
use crate::{Result, ToolkitError};

/// A whole dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelDataset {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub hotels: Vec<HotelRecord>,
}

fn default_currency() -> String {
    "CNY".to_string()
}

/// A hotel with its rooms as stored in a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub region: Option<String>,
    pub location: GeoPoint,
    pub star_rating: u8,
    pub guest_rating: f32,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
}

/// A room type with its rate calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: String,
    pub name: String,
    pub bed: BedType,
    pub floor_area_sqm: f32,
    pub max_occupancy: u8,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    pub season: Option<Season>,
    /// Per-night entries taking precedence over the season
    #[serde(default)]
    pub nights: BTreeMap<NaiveDate, NightlyRate>,
}

/// Default inventory and price for nights in `[from, until)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub available: u32,
    pub price: Decimal,
}

impl RoomRecord {
    fn rate_on(&self, night: NaiveDate) -> Option<NightlyRate> {
        if let Some(rate) = self.nights.get(&night) {
            return Some(*rate);
        }
        self.season
            .as_ref()
            .filter(|season| season.from <= night && night < season.until)
            .map(|season| NightlyRate {
                available: season.available,
                price: season.price,
            })
    }

    fn inventory(&self, hotel_id: &str, dates: &DateRange) -> RoomInventory {
        RoomInventory {
            room: RoomType {
                id: self.id.clone(),
                hotel_id: hotel_id.to_string(),
                name: self.name.clone(),
                bed: self.bed,
                floor_area_sqm: self.floor_area_sqm,
                max_occupancy: self.max_occupancy,
                amenities: self.amenities.clone(),
            },
            nights: dates
                .night_dates()
                .filter_map(|night| self.rate_on(night).map(|rate| (night, rate)))
                .collect(),
        }
    }

    /// Lowest price of any bookable night
    fn lowest_price(&self) -> Option<Decimal> {
        let season = self
            .season
            .as_ref()
            .filter(|season| season.available > 0)
            .map(|season| season.price);
        self.nights
            .values()
            .filter(|rate| rate.available > 0)
            .map(|rate| rate.price)
            .chain(season)
            .min()
    }
}

impl HotelRecord {
    fn summary(&self, currency: &str, starting_price: Option<Decimal>) -> HotelSummary {
        HotelSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            region: self.region.clone(),
            location: self.location,
            star_rating: self.star_rating,
            guest_rating: self.guest_rating,
            starting_price,
            currency: currency.to_string(),
            amenities: self.amenities.clone(),
            distance_meters: None,
        }
    }

    /// Cheapest average nightly rate among rooms bookable for the whole stay
    fn starting_price_for(&self, dates: &DateRange) -> Option<Decimal> {
        let nights = Decimal::from(dates.nights());
        self.rooms
            .iter()
            .filter_map(|room| room.inventory(&self.id, dates).rates_for(dates.night_dates()))
            .map(|rates| (rates.into_iter().sum::<Decimal>() / nights).round_dp(2))
            .min()
    }

    fn validate(&self) -> Result<()> {
        self.location.validate()?;
        if !(1..=5).contains(&self.star_rating) {
            return Err(ToolkitError::validation(format!(
                "star rating {} out of range",
                self.star_rating
            )));
        }
        if !(0.0..=5.0).contains(&self.guest_rating) {
            return Err(ToolkitError::validation(format!(
                "guest rating {} out of range",
                self.guest_rating
            )));
        }
        Ok(())
    }
}

/// Hotel repository backed by a dataset held in memory
pub struct InMemoryHotelRepository {
    dataset: HotelDataset,
    candidate_cap: usize,
    search_radius_km: f64,
}

impl InMemoryHotelRepository {
    /// Create a repository over a dataset, dropping invalid hotel records
    #[must_use]
    pub fn new(mut dataset: HotelDataset) -> Self {
        let before = dataset.hotels.len();
        dataset.hotels.retain(|hotel| match hotel.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping hotel {}: {}", hotel.id, e);
                false
            }
        });
        info!(
            "Loaded {} hotels ({} rejected)",
            dataset.hotels.len(),
            before - dataset.hotels.len()
        );

        let defaults = SearchConfig::default();
        Self {
            dataset,
            candidate_cap: defaults.candidate_cap,
            search_radius_km: defaults.search_radius_km,
        }
    }

    /// Parse a dataset from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: HotelDataset = serde_json::from_str(json)
            .map_err(|e| ToolkitError::config(format!("Failed to parse hotel dataset: {e}")))?;
        Ok(Self::new(dataset))
    }

    /// Load a dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading hotel dataset from: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| {
            ToolkitError::config(format!(
                "Failed to read hotel dataset {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    #[must_use]
    pub fn with_search_settings(mut self, search: &SearchConfig) -> Self {
        self.candidate_cap = search.candidate_cap;
        self.search_radius_km = search.search_radius_km;
        self
    }

    fn find(&self, hotel_id: &str) -> Result<&HotelRecord> {
        self.dataset
            .hotels
            .iter()
            .find(|hotel| hotel.id == hotel_id)
            .ok_or_else(|| ToolkitError::hotel_not_found(hotel_id))
    }

    /// Distance to the query point for hotels inside the search area.
    ///
    /// A region, when given, must match; coordinates additionally bound the
    /// area by the search radius. Region-only matches are at distance 0.
    fn area_distance(&self, hotel: &HotelRecord, query: &HotelQuery) -> Option<f64> {
        let region = query
            .region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty());

        if let Some(region) = region {
            let own = hotel.region.as_deref().map(str::trim);
            if !own.is_some_and(|own| own.eq_ignore_ascii_case(region)) {
                return None;
            }
        }

        match &query.location {
            Some(center) => center
                .distance_to(&hotel.location)
                .ok()
                .filter(|meters| *meters <= self.search_radius_km * 1_000.0),
            None => region.map(|_| 0.0),
        }
    }
}

#[async_trait]
impl HotelRepository for InMemoryHotelRepository {
    #[instrument(name = "memory_search", level = "debug", skip(self, query), fields(region = ?query.region))]
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelSummary>> {
        let mut in_area: Vec<(f64, HotelSummary)> = self
            .dataset
            .hotels
            .iter()
            .filter_map(|hotel| {
                let meters = self.area_distance(hotel, query)?;
                let price = hotel.starting_price_for(&query.dates)?;
                Some((meters, hotel.summary(&self.dataset.currency, Some(price))))
            })
            .collect();

        // Nearest first, so the cap only ever drops the farthest candidates
        in_area.sort_by(|(a_meters, a), (b_meters, b)| {
            a_meters.total_cmp(b_meters).then_with(|| a.id.cmp(&b.id))
        });

        debug!("{} hotels in area with rooms for the stay", in_area.len());
        let candidates = in_area.into_iter().map(|(_, hotel)| hotel).collect();
        Ok(dedup_and_cap(candidates, self.candidate_cap))
    }

    async fn get_hotel(&self, hotel_id: &str) -> Result<HotelSummary> {
        let hotel = self.find(hotel_id)?;
        let starting_price = hotel
            .rooms
            .iter()
            .filter_map(RoomRecord::lowest_price)
            .min();
        Ok(hotel.summary(&self.dataset.currency, starting_price))
    }

    async fn room_inventory(
        &self,
        hotel_id: &str,
        dates: &DateRange,
    ) -> Result<Vec<RoomInventory>> {
        let hotel = self.find(hotel_id)?;
        Ok(hotel
            .rooms
            .iter()
            .map(|room| room.inventory(&hotel.id, dates))
            .collect())
    }
}
