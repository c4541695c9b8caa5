//! Final hotel and room choice handed back to the narrator

use serde::{Deserialize, Serialize};

use super::{DateRange, GeoPoint, HotelSummary, RoomOption};

/// A chosen hotel and room for a stay
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recommendation {
    pub hotel: HotelSummary,
    pub room: RoomOption,
    pub dates: DateRange,
    /// Reference point of the search, when coordinates were given
    pub location: Option<GeoPoint>,
    pub region: Option<String>,
}

impl Recommendation {
    /// One-line summary suitable for logs
    #[must_use]
    pub fn headline(&self) -> String {
        let mut line = format!(
            "{} / {} ({} to {}, {} {})",
            self.hotel.name,
            self.room.name,
            self.dates.check_in,
            self.dates.check_out,
            self.room.total_price,
            self.hotel.currency
        );
        match (&self.location, self.region.as_deref()) {
            (Some(center), _) => line.push_str(&format!(" near {}", center.format_coordinates())),
            (None, Some(region)) => line.push_str(&format!(" in {region}")),
            (None, None) => {}
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BedType;
    use rust_decimal::Decimal;

    fn recommendation(location: Option<GeoPoint>, region: Option<&str>) -> Recommendation {
        Recommendation {
            hotel: HotelSummary {
                id: "hz-1".to_string(),
                name: "Lakeside".to_string(),
                address: "2 Lake Rd".to_string(),
                region: Some("Hangzhou".to_string()),
                location: GeoPoint::new(30.25, 120.15).unwrap(),
                star_rating: 4,
                guest_rating: 4.4,
                starting_price: Some(Decimal::new(480, 0)),
                currency: "CNY".to_string(),
                amenities: Default::default(),
                distance_meters: None,
            },
            room: RoomOption {
                id: "hz-1-twin".to_string(),
                hotel_id: "hz-1".to_string(),
                name: "Twin".to_string(),
                bed: BedType::Twin,
                floor_area_sqm: 24.0,
                max_occupancy: 2,
                nightly_rate: Decimal::new(480, 0),
                total_price: Decimal::new(480, 0),
                amenities: Default::default(),
            },
            dates: DateRange::parse("2025-03-09", "2025-03-10").unwrap(),
            location,
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn test_headline_names_search_point() {
        let center = GeoPoint::from_lon_lat(120.026_208, 30.279_212).unwrap();
        assert_eq!(
            recommendation(Some(center), Some("Hangzhou")).headline(),
            "Lakeside / Twin (2025-03-09 to 2025-03-10, 480 CNY) near 30.279212, 120.026208"
        );
        assert_eq!(
            recommendation(None, Some("Hangzhou")).headline(),
            "Lakeside / Twin (2025-03-09 to 2025-03-10, 480 CNY) in Hangzhou"
        );
        assert!(recommendation(None, None).headline().ends_with("480 CNY)"));
    }
}
