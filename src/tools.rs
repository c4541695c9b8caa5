//! JSON tool surface for LLM agents
//!
//! Exposes the toolkit operations as named tools with JSON-schema parameters
//! and turns every call into a [`ToolOutcome`] whose `status` tells the
//! orchestrator whether nothing matched, the input was wrong, or the call
//! could not be completed.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::error::ErrorCategory;
use crate::models::{Amenity, BedType, DateRange, GeoPoint, HotelQuery, RoomPreferences};
use crate::toolkit::HotelToolkit;
use crate::{Result, ToolkitError};

pub const SEARCH_HOTELS: &str = "search_hotels";
pub const GET_HOTEL_DETAIL: &str = "get_hotel_detail";
pub const SELECT_ROOM: &str = "select_room";
pub const RECOMMEND_STAY: &str = "recommend_stay";

/// A tool as advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Result of a tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok { data: Value },
    NoMatch { message: String },
    InvalidInput { message: String },
    Unavailable { message: String },
}

impl ToolOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolOutcome::Ok { .. })
    }
}

impl From<ToolkitError> for ToolOutcome {
    fn from(err: ToolkitError) -> Self {
        match err.category() {
            ErrorCategory::InvalidInput => ToolOutcome::InvalidInput {
                message: err.to_string(),
            },
            ErrorCategory::NoMatch => ToolOutcome::NoMatch {
                message: err.to_string(),
            },
            ErrorCategory::Unavailable | ErrorCategory::Configuration => {
                ToolOutcome::Unavailable {
                    message: err.user_message(),
                }
            }
        }
    }
}

fn date_properties() -> Value {
    json!({
        "check_in": {"type": "string", "format": "date", "description": "Check-in date, YYYY-MM-DD"},
        "check_out": {"type": "string", "format": "date", "description": "Check-out date, YYYY-MM-DD, after check-in"}
    })
}

fn amenity_schema() -> Value {
    let names: Vec<&str> = Amenity::ALL.iter().map(|a| a.as_str()).collect();
    json!({"type": "array", "items": {"type": "string", "enum": names}})
}

fn search_properties() -> serde_json::Map<String, Value> {
    let mut properties = serde_json::Map::new();
    if let Value::Object(dates) = date_properties() {
        properties.extend(dates);
    }
    properties.insert(
        "latitude".to_string(),
        json!({"type": "number", "minimum": -90, "maximum": 90}),
    );
    properties.insert(
        "longitude".to_string(),
        json!({"type": "number", "minimum": -180, "maximum": 180}),
    );
    properties.insert(
        "region".to_string(),
        json!({"type": "string", "description": "City or district name, used when no coordinates are given"}),
    );
    properties.insert("amenities".to_string(), amenity_schema());
    properties.insert(
        "min_price".to_string(),
        json!({"type": "number", "minimum": 0, "description": "Minimum nightly price"}),
    );
    properties.insert(
        "max_price".to_string(),
        json!({"type": "number", "minimum": 0, "description": "Maximum nightly price"}),
    );
    properties.insert(
        "min_rating".to_string(),
        json!({"type": "number", "minimum": 0, "maximum": 5}),
    );
    properties
}

fn preference_properties() -> serde_json::Map<String, Value> {
    let beds: Vec<String> = [
        BedType::Single,
        BedType::Double,
        BedType::Queen,
        BedType::King,
        BedType::Twin,
        BedType::Bunk,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    let mut properties = serde_json::Map::new();
    properties.insert("room_amenities".to_string(), amenity_schema());
    properties.insert(
        "breakfast".to_string(),
        json!({"type": "boolean", "description": "Require breakfast to be included"}),
    );
    properties.insert("bed".to_string(), json!({"type": "string", "enum": beds}));
    properties.insert(
        "min_floor_area_sqm".to_string(),
        json!({"type": "number", "minimum": 0}),
    );
    properties.insert(
        "max_total_price".to_string(),
        json!({"type": "number", "minimum": 0, "description": "Maximum price for the whole stay"}),
    );
    properties.insert("guests".to_string(), json!({"type": "integer", "minimum": 1}));
    properties
}

/// Definitions of every tool, in a stable order
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let mut recommend = search_properties();
    recommend.extend(preference_properties());

    let mut select = preference_properties();
    select.insert("hotel_id".to_string(), json!({"type": "string"}));
    if let Value::Object(dates) = date_properties() {
        select.extend(dates);
    }

    vec![
        ToolDefinition {
            name: SEARCH_HOTELS.to_string(),
            description: "Search hotels near coordinates or in a region for a stay, ranked by \
                          distance, guest rating and price."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": search_properties(),
                "required": ["check_in", "check_out"]
            }),
        },
        ToolDefinition {
            name: GET_HOTEL_DETAIL.to_string(),
            description: "Get details of a hotel by id.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"hotel_id": {"type": "string"}},
                "required": ["hotel_id"]
            }),
        },
        ToolDefinition {
            name: SELECT_ROOM.to_string(),
            description: "Pick the cheapest room of a hotel that is bookable for every night \
                          of the stay and meets the preferences."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": select,
                "required": ["hotel_id", "check_in", "check_out"]
            }),
        },
        ToolDefinition {
            name: RECOMMEND_STAY.to_string(),
            description: "Search hotels and return the best ranked hotel with a room meeting \
                          the preferences."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": recommend,
                "required": ["check_in", "check_out"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct StayArgs {
    check_in: String,
    check_out: String,
}

impl StayArgs {
    fn dates(&self) -> Result<DateRange> {
        DateRange::parse(&self.check_in, &self.check_out)
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(flatten)]
    stay: StayArgs,
    latitude: Option<f64>,
    longitude: Option<f64>,
    region: Option<String>,
    #[serde(default)]
    amenities: Vec<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    min_rating: Option<f32>,
}

impl SearchArgs {
    fn into_query(self) -> Result<HotelQuery> {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)?),
            (None, None) => None,
            _ => {
                return Err(ToolkitError::invalid_coordinate(
                    "latitude and longitude must be given together",
                ));
            }
        };

        Ok(HotelQuery {
            region: self.region.filter(|region| !region.trim().is_empty()),
            location,
            dates: self.stay.dates()?,
            amenities: parse_amenities(&self.amenities)?.into_iter().collect(),
            min_nightly_price: self.min_price,
            max_nightly_price: self.max_price,
            min_guest_rating: self.min_rating,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PreferenceArgs {
    #[serde(default)]
    room_amenities: Vec<String>,
    #[serde(default)]
    breakfast: bool,
    bed: Option<BedType>,
    min_floor_area_sqm: Option<f32>,
    max_total_price: Option<Decimal>,
    guests: Option<u8>,
}

impl PreferenceArgs {
    fn into_preferences(self) -> Result<RoomPreferences> {
        let mut preferences = RoomPreferences {
            required_amenities: parse_amenities(&self.room_amenities)?.into_iter().collect(),
            bed: self.bed,
            min_floor_area_sqm: self.min_floor_area_sqm,
            max_total_price: self.max_total_price,
            guests: self.guests,
        };
        if self.breakfast {
            preferences = preferences.breakfast_required();
        }
        Ok(preferences)
    }
}

#[derive(Debug, Deserialize)]
struct DetailArgs {
    hotel_id: String,
}

#[derive(Debug, Deserialize)]
struct SelectRoomArgs {
    hotel_id: String,
    #[serde(flatten)]
    stay: StayArgs,
    #[serde(flatten)]
    preferences: PreferenceArgs,
}

#[derive(Debug, Deserialize)]
struct RecommendArgs {
    #[serde(flatten)]
    search: SearchArgs,
    #[serde(flatten)]
    preferences: PreferenceArgs,
}

fn parse_amenities(names: &[String]) -> Result<Vec<Amenity>> {
    names.iter().map(|name| name.parse()).collect()
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolkitError::validation(format!("bad arguments for {tool}: {e}")))
}

fn to_data<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| ToolkitError::unavailable(format!("failed to encode tool result: {e}")))
}

/// Run a tool call against the toolkit
#[instrument(skip(toolkit, call), fields(tool = %call.name))]
pub async fn dispatch(toolkit: &HotelToolkit, call: ToolCall) -> ToolOutcome {
    let result = match call.name.as_str() {
        SEARCH_HOTELS => search_hotels(toolkit, call.arguments).await,
        GET_HOTEL_DETAIL => get_hotel_detail(toolkit, call.arguments).await,
        SELECT_ROOM => select_room(toolkit, call.arguments).await,
        RECOMMEND_STAY => recommend_stay(toolkit, call.arguments).await,
        unknown => {
            warn!("Unknown tool requested: {}", unknown);
            Err(ToolkitError::validation(format!("unknown tool '{unknown}'")))
        }
    };

    let outcome = result.unwrap_or_else(ToolOutcome::from);
    match &outcome {
        ToolOutcome::Ok { .. } => info!("Tool {} succeeded", call.name),
        other => debug!("Tool {} finished with {:?}", call.name, other),
    }
    outcome
}

async fn search_hotels(toolkit: &HotelToolkit, arguments: Value) -> Result<ToolOutcome> {
    let query = parse_args::<SearchArgs>(SEARCH_HOTELS, arguments)?.into_query()?;
    let hotels = toolkit.search_hotels(&query).await?;
    if hotels.is_empty() {
        return Ok(ToolOutcome::NoMatch {
            message: "No hotels match the search criteria.".to_string(),
        });
    }
    Ok(ToolOutcome::Ok {
        data: to_data(&hotels)?,
    })
}

async fn get_hotel_detail(toolkit: &HotelToolkit, arguments: Value) -> Result<ToolOutcome> {
    let args: DetailArgs = parse_args(GET_HOTEL_DETAIL, arguments)?;
    let hotel = toolkit.get_hotel_detail(&args.hotel_id).await?;
    Ok(ToolOutcome::Ok {
        data: to_data(&hotel)?,
    })
}

async fn select_room(toolkit: &HotelToolkit, arguments: Value) -> Result<ToolOutcome> {
    let args: SelectRoomArgs = parse_args(SELECT_ROOM, arguments)?;
    let dates = args.stay.dates()?;
    let preferences = args.preferences.into_preferences()?;
    let room = toolkit
        .select_room(&args.hotel_id, &dates, &preferences)
        .await?;
    Ok(ToolOutcome::Ok {
        data: to_data(&room)?,
    })
}

async fn recommend_stay(toolkit: &HotelToolkit, arguments: Value) -> Result<ToolOutcome> {
    let args: RecommendArgs = parse_args(RECOMMEND_STAY, arguments)?;
    let query = args.search.into_query()?;
    let preferences = args.preferences.into_preferences()?;
    let recommendation = toolkit.recommend(&query, &preferences).await?;
    Ok(ToolOutcome::Ok {
        data: to_data(&recommendation)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HotelKitConfig;
    use crate::repository::InMemoryHotelRepository;
    use rstest::rstest;
    use std::sync::Arc;

    const DATASET: &str = r#"{
        "hotels": [
            {
                "id": "h1",
                "name": "West Lake Inn",
                "address": "3 Lakeside",
                "region": "Hangzhou",
                "location": {"latitude": 30.2800, "longitude": 120.0270},
                "star_rating": 4,
                "guest_rating": 4.4,
                "amenities": ["breakfast"],
                "rooms": [
                    {
                        "id": "h1-dbl",
                        "name": "Double",
                        "bed": "double",
                        "floor_area_sqm": 22.0,
                        "max_occupancy": 2,
                        "amenities": ["breakfast"],
                        "season": {"from": "2025-03-01", "until": "2025-04-01", "available": 2, "price": "450"}
                    }
                ]
            }
        ]
    }"#;

    fn toolkit() -> HotelToolkit {
        let repository = InMemoryHotelRepository::from_json_str(DATASET).unwrap();
        HotelToolkit::new(Arc::new(repository), &HotelKitConfig::default())
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_tool_definitions() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![SEARCH_HOTELS, GET_HOTEL_DETAIL, SELECT_ROOM, RECOMMEND_STAY]
        );
        for tool in &tools {
            assert_eq!(tool.parameters["type"], "object");
            assert!(tool.parameters["required"].is_array());
        }
        assert!(tools[0].parameters["properties"]["latitude"].is_object());
        assert!(tools[3].parameters["properties"]["breakfast"].is_object());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ToolOutcome::NoMatch {
            message: "nothing".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, json!({"status": "no_match", "message": "nothing"}));

        let ok = ToolOutcome::Ok { data: json!([1]) };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "ok", "data": [1]})
        );
    }

    #[rstest]
    #[case(ToolkitError::validation("x"), "invalid_input")]
    #[case(ToolkitError::invalid_date_range("x"), "invalid_input")]
    #[case(ToolkitError::hotel_not_found("x"), "no_match")]
    #[case(ToolkitError::no_room_available("x"), "no_match")]
    #[case(ToolkitError::unavailable("x"), "unavailable")]
    #[case(ToolkitError::config("x"), "unavailable")]
    fn test_error_to_outcome(#[case] err: ToolkitError, #[case] status: &str) {
        let value = serde_json::to_value(ToolOutcome::from(err)).unwrap();
        assert_eq!(value["status"], status);
    }

    #[tokio::test]
    async fn test_search_tool() {
        let outcome = dispatch(
            &toolkit(),
            call(
                SEARCH_HOTELS,
                json!({
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-10",
                    "latitude": 30.279212,
                    "longitude": 120.026208,
                    "amenities": ["breakfast"]
                }),
            ),
        )
        .await;
        match outcome {
            ToolOutcome::Ok { data } => {
                assert_eq!(data[0]["id"], "h1");
                let price: Decimal = data[0]["starting_price"].as_str().unwrap().parse().unwrap();
                assert_eq!(price, Decimal::new(450, 0));
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_tool_nothing_matched() {
        let outcome = dispatch(
            &toolkit(),
            call(
                SEARCH_HOTELS,
                json!({
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-10",
                    "region": "Hangzhou",
                    "max_price": 10
                }),
            ),
        )
        .await;
        assert!(matches!(outcome, ToolOutcome::NoMatch { .. }));
    }

    #[rstest]
    #[case(json!({"check_in": "2025-03-09", "check_out": "2025-03-10", "latitude": 30.0}))]
    #[case(json!({"check_in": "09/03/2025", "check_out": "2025-03-10", "region": "Hangzhou"}))]
    #[case(json!({"check_in": "2025-03-10", "check_out": "2025-03-09", "region": "Hangzhou"}))]
    #[case(json!({"check_in": "2025-03-09", "check_out": "2025-03-10", "region": "Hangzhou", "amenities": ["jacuzzi"]}))]
    #[case(json!({"region": "Hangzhou"}))]
    #[case(json!("not an object"))]
    #[tokio::test]
    async fn test_search_tool_invalid_input(#[case] arguments: Value) {
        let outcome = dispatch(&toolkit(), call(SEARCH_HOTELS, arguments)).await;
        assert!(
            matches!(outcome, ToolOutcome::InvalidInput { .. }),
            "got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_search_tool_price_band() {
        let toolkit = toolkit();
        let search = |min: u32, max: u32| {
            call(
                SEARCH_HOTELS,
                json!({
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-10",
                    "region": "Hangzhou",
                    "min_price": min,
                    "max_price": max
                }),
            )
        };

        assert!(dispatch(&toolkit, search(400, 500)).await.is_ok());
        assert!(matches!(
            dispatch(&toolkit, search(460, 900)).await,
            ToolOutcome::NoMatch { .. }
        ));
        assert!(matches!(
            dispatch(&toolkit, search(500, 400)).await,
            ToolOutcome::InvalidInput { .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_input() {
        let outcome = dispatch(&toolkit(), call("book_flight", Value::Null)).await;
        assert!(matches!(outcome, ToolOutcome::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_detail_and_select_tools() {
        let toolkit = toolkit();

        let detail = dispatch(&toolkit, call(GET_HOTEL_DETAIL, json!({"hotel_id": "h1"}))).await;
        assert!(detail.is_ok());

        let missing = dispatch(&toolkit, call(GET_HOTEL_DETAIL, json!({"hotel_id": "zz"}))).await;
        assert!(matches!(missing, ToolOutcome::NoMatch { .. }));

        let room = dispatch(
            &toolkit,
            call(
                SELECT_ROOM,
                json!({
                    "hotel_id": "h1",
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-11",
                    "breakfast": true
                }),
            ),
        )
        .await;
        match room {
            ToolOutcome::Ok { data } => {
                assert_eq!(data["id"], "h1-dbl");
                let total: Decimal = data["total_price"].as_str().unwrap().parse().unwrap();
                assert_eq!(total, Decimal::new(900, 0));
            }
            other => panic!("expected ok, got {other:?}"),
        }

        let king = dispatch(
            &toolkit,
            call(
                SELECT_ROOM,
                json!({
                    "hotel_id": "h1",
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-10",
                    "bed": "king"
                }),
            ),
        )
        .await;
        assert!(matches!(king, ToolOutcome::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_recommend_tool() {
        let outcome = dispatch(
            &toolkit(),
            call(
                RECOMMEND_STAY,
                json!({
                    "check_in": "2025-03-09",
                    "check_out": "2025-03-10",
                    "region": "Hangzhou",
                    "breakfast": true,
                    "guests": 2
                }),
            ),
        )
        .await;
        match outcome {
            ToolOutcome::Ok { data } => {
                assert_eq!(data["hotel"]["id"], "h1");
                assert_eq!(data["room"]["id"], "h1-dbl");
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }
}
