//! Hotel Toolkit Facade
//!
//! Entry point for the agent: validates requests, queries the data source,
//! ranks candidates and picks rooms. Every operation is a stateless read, so
//! repeated calls with the same input give the same answer as long as the
//! data source does not change.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::availability::AvailabilityResolver;
use crate::config::HotelKitConfig;
use crate::models::{
    Amenity, DateRange, HotelQuery, HotelSummary, Recommendation, RoomOption, RoomPreferences,
};
use crate::ranking::HotelRanker;
use crate::repository::{self, HotelRepository};
use crate::selection::RoomSelector;
use crate::{Result, ToolkitError};

/// Search, detail, room selection and recommendation over one data source
pub struct HotelToolkit {
    repository: Arc<dyn HotelRepository>,
    availability: AvailabilityResolver,
    ranker: HotelRanker,
    selector: RoomSelector,
    max_results: usize,
    amenity_vocabulary: Vec<Amenity>,
}

impl HotelToolkit {
    pub fn new(repository: Arc<dyn HotelRepository>, config: &HotelKitConfig) -> Self {
        Self {
            availability: AvailabilityResolver::new(Arc::clone(&repository)),
            repository,
            ranker: HotelRanker::new(config.ranking.clone()),
            selector: RoomSelector::new(),
            max_results: config.search.max_results,
            amenity_vocabulary: config.search.amenity_vocabulary.clone(),
        }
    }

    /// Build the toolkit and its data source adapter from configuration
    pub fn from_config(config: &HotelKitConfig) -> Result<Self> {
        let repository = repository::from_config(config)?;
        Ok(Self::new(repository, config))
    }

    /// Ranked hotels for a query, at most `search.max_results` of them.
    ///
    /// The query is validated before the data source is contacted. Nothing
    /// matching is an empty vector.
    #[instrument(skip(self, query), fields(region = ?query.region, dates = ?query.dates))]
    pub async fn search_hotels(&self, query: &HotelQuery) -> Result<Vec<HotelSummary>> {
        query.validate(&self.amenity_vocabulary)?;

        let candidates = self.repository.search(query).await?;
        let candidate_count = candidates.len();

        let mut ranked = self.ranker.rank(candidates, query);
        ranked.truncate(self.max_results);

        info!(
            "Search returned {} hotels ({} candidates)",
            ranked.len(),
            candidate_count
        );
        Ok(ranked)
    }

    #[instrument(skip(self))]
    pub async fn get_hotel_detail(&self, hotel_id: &str) -> Result<HotelSummary> {
        if hotel_id.trim().is_empty() {
            return Err(ToolkitError::validation("hotel id cannot be empty"));
        }
        self.repository.get_hotel(hotel_id).await
    }

    /// Best room of one hotel for the stay, or `NoRoomAvailable`
    #[instrument(skip(self, preferences))]
    pub async fn select_room(
        &self,
        hotel_id: &str,
        dates: &DateRange,
        preferences: &RoomPreferences,
    ) -> Result<RoomOption> {
        if hotel_id.trim().is_empty() {
            return Err(ToolkitError::validation("hotel id cannot be empty"));
        }
        dates.validate()?;
        self.validate_preferences(preferences)?;

        let rooms = self.availability.list_rooms(hotel_id, dates).await?;
        let room = self.selector.select_best(&rooms, preferences)?;

        info!("Selected room {} at hotel {}", room.id, hotel_id);
        Ok(room)
    }

    /// Search, then walk the ranking until a hotel has a room meeting the preferences
    #[instrument(skip(self, query, preferences), fields(region = ?query.region, dates = ?query.dates))]
    pub async fn recommend(
        &self,
        query: &HotelQuery,
        preferences: &RoomPreferences,
    ) -> Result<Recommendation> {
        self.validate_preferences(preferences)?;
        let hotels = self.search_hotels(query).await?;
        let considered = hotels.len();

        for hotel in hotels {
            let rooms = match self.availability.list_rooms(&hotel.id, &query.dates).await {
                Ok(rooms) => rooms,
                Err(ToolkitError::HotelNotFound { hotel_id }) => {
                    warn!("Hotel {} disappeared between search and lookup", hotel_id);
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.selector.select_best(&rooms, preferences) {
                Ok(room) => {
                    let recommendation = Recommendation {
                        hotel,
                        room,
                        dates: query.dates,
                        location: query.location,
                        region: query.region.clone(),
                    };
                    info!("Recommending {}", recommendation.headline());
                    return Ok(recommendation);
                }
                Err(ToolkitError::NoRoomAvailable { message }) => {
                    debug!("Skipping hotel {}: {}", hotel.id, message);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ToolkitError::no_room_available(if considered == 0 {
            "no hotels match the search".to_string()
        } else {
            format!("none of {considered} matching hotels has a suitable room")
        }))
    }

    fn validate_preferences(&self, preferences: &RoomPreferences) -> Result<()> {
        if let Some(unsupported) = preferences
            .required_amenities
            .iter()
            .find(|a| !self.amenity_vocabulary.contains(a))
        {
            return Err(ToolkitError::validation(format!(
                "amenity '{unsupported}' is not supported"
            )));
        }
        if preferences.guests == Some(0) {
            return Err(ToolkitError::validation("guests must be at least 1"));
        }
        if let Some(area) = preferences.min_floor_area_sqm {
            if !area.is_finite() || area < 0.0 {
                return Err(ToolkitError::validation(
                    "minimum floor area must be a non-negative number",
                ));
            }
        }
        if let Some(price) = preferences.max_total_price {
            if price.is_sign_negative() {
                return Err(ToolkitError::validation("max price cannot be negative"));
            }
        }
        Ok(())
    }
}
