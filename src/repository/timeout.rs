use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::HotelRepository;
use crate::models::{DateRange, HotelQuery, HotelSummary, RoomInventory};
use crate::{Result, ToolkitError};

/// Bounds every call of the wrapped repository with a deadline.
///
/// An elapsed deadline drops the inner future, which releases any connection
/// it holds, and surfaces as `DataSourceUnavailable`.
pub struct TimeoutRepository<R> {
    inner: R,
    timeout: Duration,
}

impl<R: HotelRepository> TimeoutRepository<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Hotel data source call '{}' timed out after {:?}",
                    operation, self.timeout
                );
                Err(ToolkitError::unavailable(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<R: HotelRepository> HotelRepository for TimeoutRepository<R> {
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelSummary>> {
        self.bounded("search", self.inner.search(query)).await
    }

    async fn get_hotel(&self, hotel_id: &str) -> Result<HotelSummary> {
        self.bounded("get_hotel", self.inner.get_hotel(hotel_id)).await
    }

    async fn room_inventory(
        &self,
        hotel_id: &str,
        dates: &DateRange,
    ) -> Result<Vec<RoomInventory>> {
        self.bounded("room_inventory", self.inner.room_inventory(hotel_id, dates))
            .await
    }
}
