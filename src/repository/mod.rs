//! Hotel data source abstraction
//!
//! This module defines the contract the toolkit needs from a hotel data source
//! and provides its adapters:
//! - In-memory dataset (static JSON fixtures, tests)
//! - REST API client with retry on transient failures
//! - Timeout decorator bounding every call with a deadline

pub mod http;
pub mod memory;
pub mod timeout;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::Result;
use crate::config::HotelKitConfig;
use crate::models::{DateRange, HotelQuery, HotelSummary, RoomInventory};

pub use http::HttpHotelRepository;
pub use memory::{HotelDataset, HotelRecord, InMemoryHotelRepository};
pub use timeout::TimeoutRepository;

/// Read access to canonical hotel and room records
#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Unranked candidates for a query, deduplicated by id and capped.
    /// An empty vector means nothing matched and is not an error.
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelSummary>>;

    /// A single hotel, or `HotelNotFound`
    async fn get_hotel(&self, hotel_id: &str) -> Result<HotelSummary>;

    /// Per-night inventory of every room type of a hotel for the stay
    async fn room_inventory(&self, hotel_id: &str, dates: &DateRange)
    -> Result<Vec<RoomInventory>>;
}

/// Drop repeated hotel ids, keeping the first occurrence, and cap the result
pub fn dedup_and_cap(candidates: Vec<HotelSummary>, cap: usize) -> Vec<HotelSummary> {
    let total = candidates.len();
    let mut seen = HashSet::new();
    let result: Vec<HotelSummary> = candidates
        .into_iter()
        .filter(|hotel| seen.insert(hotel.id.clone()))
        .take(cap)
        .collect();

    if result.len() < total {
        debug!(
            "Reduced {} candidates to {} (dedup, cap {})",
            total,
            result.len(),
            cap
        );
    }
    result
}

/// Build the repository described by the configuration, wrapped in the timeout decorator
pub fn from_config(config: &HotelKitConfig) -> Result<Arc<dyn HotelRepository>> {
    let timeout = config.data_source.timeout();

    match &config.data_source.dataset_path {
        Some(path) => {
            debug!("Using static hotel dataset at {}", path.display());
            let repository =
                InMemoryHotelRepository::load(path)?.with_search_settings(&config.search);
            Ok(Arc::new(TimeoutRepository::new(repository, timeout)))
        }
        None => {
            if config.data_source.api_key.is_none() {
                warn!(
                    "No API key configured for hotel data source at {}",
                    config.data_source.base_url
                );
            }
            let repository = HttpHotelRepository::new(&config.data_source, &config.search)?;
            Ok(Arc::new(TimeoutRepository::new(repository, timeout)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;

    fn hotel(id: &str) -> HotelSummary {
        HotelSummary {
            id: id.to_string(),
            name: format!("Hotel {id}"),
            address: "Somewhere".to_string(),
            region: None,
            location: GeoPoint::new(30.0, 120.0).unwrap(),
            star_rating: 3,
            guest_rating: 4.0,
            starting_price: Some(Decimal::new(300, 0)),
            currency: "CNY".to_string(),
            amenities: BTreeSet::new(),
            distance_meters: None,
        }
    }

    #[test]
    fn test_dedup_keeps_first_and_caps() {
        let candidates = vec![hotel("a"), hotel("b"), hotel("a"), hotel("c"), hotel("d")];
        let result = dedup_and_cap(candidates, 3);
        let ids: Vec<_> = result.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_config_missing_dataset_fails() {
        let mut config = HotelKitConfig::default();
        config.data_source.dataset_path = Some("does/not/exist.json".into());
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_http() {
        let config = HotelKitConfig::default();
        assert!(from_config(&config).is_ok());
    }
}
