//! Data models for the hotel toolkit
//!
//! This module contains the core domain models organized by concern:
//! - Geo: WGS84 points and great-circle distance
//! - Dates: stay date ranges
//! - Hotel: hotel summaries, amenities and search queries
//! - Room: room types, nightly inventory, room options and preferences
//! - Recommendation: the final hotel and room choice

pub mod dates;
pub mod geo;
pub mod hotel;
pub mod recommendation;
pub mod room;

// Re-export all public types for convenient access
pub use dates::DateRange;
pub use geo::{EARTH_RADIUS_METERS, GeoPoint, distance};
pub use hotel::{Amenity, HotelQuery, HotelSummary};
pub use recommendation::Recommendation;
pub use room::{BedType, NightlyRate, RoomInventory, RoomOption, RoomPreferences, RoomType};
