//! Error types and handling for the hotel toolkit

use thiserror::Error;

/// Main error type for the hotel toolkit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolkitError {
    /// A latitude/longitude pair outside WGS84 bounds
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// Check-out not strictly after check-in
    #[error("Invalid date range: {message}")]
    InvalidDateRange { message: String },

    /// Any other malformed input (unknown amenity, bad tool arguments, ...)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The referenced hotel does not exist in the data source
    #[error("Hotel not found: {hotel_id}")]
    HotelNotFound { hotel_id: String },

    /// No room satisfies the requested preferences
    #[error("No room available: {message}")]
    NoRoomAvailable { message: String },

    /// Transport failure, timeout or unusable response from the data source
    #[error("Data source unavailable: {message}")]
    DataSourceUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// How the orchestrator should treat an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed request, never retried
    InvalidInput,
    /// Valid request with nothing to return
    NoMatch,
    /// The system could not complete the request
    Unavailable,
    /// The toolkit itself is misconfigured
    Configuration,
}

impl ToolkitError {
    /// Create a new invalid coordinate error
    pub fn invalid_coordinate<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinate {
            message: message.into(),
        }
    }

    /// Create a new invalid date range error
    pub fn invalid_date_range<S: Into<String>>(message: S) -> Self {
        Self::InvalidDateRange {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new hotel not found error
    pub fn hotel_not_found<S: Into<String>>(hotel_id: S) -> Self {
        Self::HotelNotFound {
            hotel_id: hotel_id.into(),
        }
    }

    /// Create a new no room available error
    pub fn no_room_available<S: Into<String>>(message: S) -> Self {
        Self::NoRoomAvailable {
            message: message.into(),
        }
    }

    /// Create a new data source error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::DataSourceUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCoordinate { .. }
            | Self::InvalidDateRange { .. }
            | Self::Validation { .. } => ErrorCategory::InvalidInput,
            Self::HotelNotFound { .. } | Self::NoRoomAvailable { .. } => ErrorCategory::NoMatch,
            Self::DataSourceUnavailable { .. } => ErrorCategory::Unavailable,
            Self::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// Only transient infrastructure failures are worth another attempt
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataSourceUnavailable { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ToolkitError::InvalidCoordinate { message }
            | ToolkitError::InvalidDateRange { message }
            | ToolkitError::Validation { message } => format!("Invalid input: {message}"),
            ToolkitError::HotelNotFound { hotel_id } => {
                format!("No hotel with id '{hotel_id}' could be found.")
            }
            ToolkitError::NoRoomAvailable { .. } => {
                "No room matches your preferences. Relaxing some of them may help.".to_string()
            }
            ToolkitError::DataSourceUnavailable { .. } => {
                "The hotel service is currently unavailable. Please try again later.".to_string()
            }
            ToolkitError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

impl From<reqwest_middleware::Error> for ToolkitError {
    fn from(err: reqwest_middleware::Error) -> Self {
        ToolkitError::unavailable(format!("request failed: {err}"))
    }
}

impl From<reqwest::Error> for ToolkitError {
    fn from(err: reqwest::Error) -> Self {
        ToolkitError::unavailable(format!("invalid response: {err}"))
    }
}
