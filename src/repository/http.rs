//! REST hotel data source
//!
//! Talks to a JSON hotel API:
//! - `GET {base}/hotels?check_in&check_out&limit[&lat&lon&radius_m][&region]`
//! - `GET {base}/hotels/{id}`
//! - `GET {base}/hotels/{id}/rooms?check_in&check_out`
//!
//! Transient failures (connection errors, 5xx, 429) are retried with
//! exponential backoff before surfacing as `DataSourceUnavailable`. Each
//! attempt gets a share of the overall data source timeout. Records that do
//! not parse are skipped one by one; the rest of the response is kept.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{HotelRepository, dedup_and_cap};
use crate::config::{DataSourceConfig, SearchConfig};
use crate::models::{
    Amenity, BedType, DateRange, GeoPoint, HotelQuery, HotelSummary, NightlyRate, RoomInventory,
    RoomType,
};
use crate::{Result, ToolkitError};

/// Hotel API client
pub struct HttpHotelRepository {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    candidate_cap: usize,
    search_radius_km: f64,
}

/// Hotel as returned by the API
#[derive(Debug, Deserialize)]
pub struct WireHotel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub star_rating: u8,
    pub guest_rating: f32,
    pub starting_price: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Search response from the API, records kept raw until converted one by one
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hotels: Vec<Value>,
}

/// Room with its nightly inventory as returned by the API
#[derive(Debug, Deserialize)]
pub struct WireRoom {
    pub id: String,
    pub name: String,
    pub bed: BedType,
    pub floor_area_sqm: f32,
    pub max_occupancy: u8,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub nights: Vec<WireNight>,
}

#[derive(Debug, Deserialize)]
pub struct WireNight {
    pub date: NaiveDate,
    pub available: u32,
    pub price: Decimal,
}

/// Rooms response from the API
#[derive(Debug, Deserialize)]
pub struct RoomsResponse {
    pub rooms: Vec<Value>,
}

impl HttpHotelRepository {
    /// Create a new client
    pub fn new(data_source: &DataSourceConfig, search: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(data_source.attempt_timeout())
            .user_agent(data_source.user_agent.as_str())
            .build()
            .map_err(|e| ToolkitError::config(format!("Failed to create HTTP client: {e}")))?;

        let min_backoff = data_source.retry_backoff();
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(min_backoff, min_backoff * 2u32.pow(data_source.max_retries))
            .build_with_max_retries(data_source.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: data_source.base_url.trim_end_matches('/').to_string(),
            api_key: data_source.api_key.clone(),
            candidate_cap: search.candidate_cap,
            search_radius_km: search.search_radius_km,
        })
    }

    fn search_url(&self, query: &HotelQuery) -> String {
        let mut url = format!(
            "{}/hotels?check_in={}&check_out={}&limit={}",
            self.base_url, query.dates.check_in, query.dates.check_out, self.candidate_cap
        );
        if let Some(center) = &query.location {
            let radius_m = (self.search_radius_km * 1_000.0).round();
            url.push_str(&format!(
                "&lat={}&lon={}&radius_m={radius_m}",
                center.latitude, center.longitude
            ));
        }
        if let Some(region) = query.region.as_deref() {
            url.push_str(&format!("&region={}", urlencoding::encode(region.trim())));
        }
        if let Some(min) = query.min_nightly_price {
            url.push_str(&format!("&min_price={min}"));
        }
        if let Some(max) = query.max_nightly_price {
            url.push_str(&format!("&max_price={max}"));
        }
        url
    }

    fn hotel_url(&self, hotel_id: &str) -> String {
        format!("{}/hotels/{}", self.base_url, urlencoding::encode(hotel_id))
    }

    fn rooms_url(&self, hotel_id: &str, dates: &DateRange) -> String {
        format!(
            "{}/rooms?check_in={}&check_out={}",
            self.hotel_url(hotel_id),
            dates.check_in,
            dates.check_out
        )
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, hotel_id: Option<&str>) -> Result<T> {
        debug!("Hotel API request URL: {}", url);

        let mut request = self.client.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let response = check_status(response, hotel_id).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map HTTP status codes onto the error taxonomy
async fn check_status(response: Response, hotel_id: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(status_error(status, hotel_id, &error_text))
}

fn status_error(status: StatusCode, hotel_id: Option<&str>, body: &str) -> ToolkitError {
    match (status.as_u16(), hotel_id) {
        (404, Some(id)) => ToolkitError::hotel_not_found(id),
        (401 | 403, _) => {
            ToolkitError::unavailable(format!("hotel API rejected credentials ({status})"))
        }
        (429, _) => ToolkitError::unavailable("hotel API rate limit exceeded"),
        _ => ToolkitError::unavailable(format!("hotel API error {status}: {body}")),
    }
}

fn record_id(record: &Value) -> &str {
    record.get("id").and_then(Value::as_str).unwrap_or("<unknown>")
}

/// Convert raw hotel records, skipping the ones that fail to parse or validate
fn parse_hotels(records: Vec<Value>) -> Vec<HotelSummary> {
    let total = records.len();
    let hotels: Vec<HotelSummary> = records
        .into_iter()
        .filter_map(|record| {
            let id = record_id(&record).to_string();
            let parsed = serde_json::from_value::<WireHotel>(record)
                .map_err(|e| ToolkitError::unavailable(format!("malformed record: {e}")))
                .and_then(WireHotel::into_summary);
            match parsed {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Skipping hotel {} from API: {}", id, e);
                    None
                }
            }
        })
        .collect();

    info!(
        "Found {} hotels from hotel API ({} rejected)",
        hotels.len(),
        total - hotels.len()
    );
    hotels
}

fn parse_rooms(records: Vec<Value>, hotel_id: &str) -> Vec<RoomInventory> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record_id(&record).to_string();
            match serde_json::from_value::<WireRoom>(record) {
                Ok(room) => Some(room.into_inventory(hotel_id)),
                Err(e) => {
                    warn!("Skipping room {} of hotel {} from API: {}", id, hotel_id, e);
                    None
                }
            }
        })
        .collect()
}

fn parse_amenities(raw: &[String]) -> BTreeSet<Amenity> {
    raw.iter()
        .filter_map(|tag| match tag.parse::<Amenity>() {
            Ok(amenity) => Some(amenity),
            Err(_) => {
                debug!("Ignoring unknown amenity tag '{}'", tag);
                None
            }
        })
        .collect()
}

impl WireHotel {
    /// Convert to a validated `HotelSummary`
    pub fn into_summary(self) -> Result<HotelSummary> {
        let location = GeoPoint::new(self.latitude, self.longitude)?;
        if !(1..=5).contains(&self.star_rating) || !(0.0..=5.0).contains(&self.guest_rating) {
            return Err(ToolkitError::unavailable(format!(
                "hotel {} has out-of-range ratings",
                self.id
            )));
        }

        Ok(HotelSummary {
            amenities: parse_amenities(&self.amenities),
            id: self.id,
            name: self.name,
            address: self.address,
            region: self.region,
            location,
            star_rating: self.star_rating,
            guest_rating: self.guest_rating,
            starting_price: self.starting_price,
            currency: self.currency.unwrap_or_else(|| "CNY".to_string()),
            distance_meters: None,
        })
    }
}

impl WireRoom {
    /// Convert to a `RoomInventory` belonging to `hotel_id`
    pub fn into_inventory(self, hotel_id: &str) -> RoomInventory {
        RoomInventory {
            room: RoomType {
                amenities: parse_amenities(&self.amenities),
                id: self.id,
                hotel_id: hotel_id.to_string(),
                name: self.name,
                bed: self.bed,
                floor_area_sqm: self.floor_area_sqm,
                max_occupancy: self.max_occupancy,
            },
            nights: self
                .nights
                .into_iter()
                .map(|night| {
                    (
                        night.date,
                        NightlyRate {
                            available: night.available,
                            price: night.price,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl HotelRepository for HttpHotelRepository {
    #[instrument(name = "http_search", skip(self, query), fields(region = ?query.region))]
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelSummary>> {
        let response: SearchResponse = self.fetch(&self.search_url(query), None).await?;
        Ok(dedup_and_cap(parse_hotels(response.hotels), self.candidate_cap))
    }

    #[instrument(name = "http_get_hotel", skip(self))]
    async fn get_hotel(&self, hotel_id: &str) -> Result<HotelSummary> {
        let hotel: WireHotel = self.fetch(&self.hotel_url(hotel_id), Some(hotel_id)).await?;
        hotel.into_summary()
    }

    #[instrument(name = "http_room_inventory", skip(self))]
    async fn room_inventory(
        &self,
        hotel_id: &str,
        dates: &DateRange,
    ) -> Result<Vec<RoomInventory>> {
        let response: RoomsResponse = self
            .fetch(&self.rooms_url(hotel_id, dates), Some(hotel_id))
            .await?;
        Ok(parse_rooms(response.rooms, hotel_id))
    }
}
