//! `HotelKit` - Hotel search and recommendation toolkit for LLM agents
//!
//! This library turns structured travel requests (where, when, which
//! amenities) into ranked hotel lists and concrete room choices, and exposes
//! those operations as JSON tools an agent can call.

pub mod availability;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod repository;
pub mod selection;
pub mod toolkit;
pub mod tools;

// Re-export core types for public API
pub use availability::AvailabilityResolver;
pub use config::HotelKitConfig;
pub use error::{ErrorCategory, ToolkitError};
pub use models::{
    Amenity, BedType, DateRange, GeoPoint, HotelQuery, HotelSummary, Recommendation, RoomOption,
    RoomPreferences, distance,
};
pub use ranking::HotelRanker;
pub use repository::{HotelRepository, HttpHotelRepository, InMemoryHotelRepository};
pub use selection::RoomSelector;
pub use toolkit::HotelToolkit;
pub use tools::{ToolCall, ToolDefinition, ToolOutcome, dispatch, tool_definitions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ToolkitError>;
