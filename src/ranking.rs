//! Hotel candidate filtering and ordering

use std::cmp::Ordering;

use tracing::{debug, warn};

use rust_decimal::Decimal;

use crate::config::RankingConfig;
use crate::models::{HotelQuery, HotelSummary, distance};

/// Orders hotel candidates for a query.
///
/// Required amenities, the nightly price ceiling and the minimum guest rating
/// are hard filters. Survivors are ordered by distance to the query point
/// (ascending), guest rating (descending), starting price (ascending) and
/// finally id, so the order is total and reproducible.
#[derive(Debug, Clone, Default)]
pub struct HotelRanker {
    config: RankingConfig,
}

impl HotelRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn rank(&self, candidates: Vec<HotelSummary>, query: &HotelQuery) -> Vec<HotelSummary> {
        let total = candidates.len();

        let mut ranked: Vec<HotelSummary> = candidates
            .into_iter()
            .filter(|hotel| passes_filters(hotel, query))
            .filter_map(|mut hotel| match &query.location {
                Some(center) => match distance(center, &hotel.location) {
                    Ok(meters) => {
                        hotel.distance_meters = Some(meters);
                        Some(hotel)
                    }
                    Err(e) => {
                        warn!("Dropping hotel {} from ranking: {}", hotel.id, e);
                        None
                    }
                },
                None => {
                    hotel.distance_meters = None;
                    Some(hotel)
                }
            })
            .collect();

        ranked.sort_by(|a, b| self.compare(a, b));

        debug!("Ranked {} of {} candidates", ranked.len(), total);
        ranked
    }

    fn compare(&self, a: &HotelSummary, b: &HotelSummary) -> Ordering {
        self.distance_key(a)
            .cmp(&self.distance_key(b))
            .then_with(|| b.guest_rating.total_cmp(&a.guest_rating))
            .then_with(|| compare_prices(a.starting_price, b.starting_price))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Distance quantised to the configured granularity; 0 when no reference point
    fn distance_key(&self, hotel: &HotelSummary) -> u64 {
        let meters = hotel.distance_meters.unwrap_or(0.0);
        if !meters.is_finite() {
            return u64::MAX;
        }
        let granularity = self.config.distance_granularity_meters;
        let steps = if granularity > 0.0 {
            (meters / granularity).round()
        } else {
            meters
        };
        // Non-negative and bounded by half the Earth's circumference
        steps.max(0.0) as u64
    }
}

/// Unpriced hotels order after priced ones
fn compare_prices(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn passes_filters(hotel: &HotelSummary, query: &HotelQuery) -> bool {
    hotel.has_amenities(&query.amenities)
        && query
            .max_nightly_price
            .is_none_or(|max| hotel.starting_price.is_some_and(|price| price <= max))
        && query
            .min_nightly_price
            .is_none_or(|min| hotel.starting_price.is_some_and(|price| price >= min))
        && query
            .min_guest_rating
            .is_none_or(|min| hotel.guest_rating >= min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amenity, DateRange, GeoPoint};
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn hotel(id: &str, lat: f64, lon: f64, rating: f32, price: i64, amenities: &[Amenity]) -> HotelSummary {
        HotelSummary {
            id: id.to_string(),
            name: format!("Hotel {id}"),
            address: "Somewhere".to_string(),
            region: Some("Hangzhou".to_string()),
            location: GeoPoint::new(lat, lon).unwrap(),
            star_rating: 4,
            guest_rating: rating,
            starting_price: Some(Decimal::new(price, 0)),
            currency: "CNY".to_string(),
            amenities: amenities.iter().copied().collect::<BTreeSet<_>>(),
            distance_meters: None,
        }
    }

    fn stay() -> DateRange {
        DateRange::parse("2025-03-09", "2025-03-10").unwrap()
    }

    fn center() -> GeoPoint {
        GeoPoint::from_lon_lat(120.026_208, 30.279_212).unwrap()
    }

    fn candidates() -> Vec<HotelSummary> {
        vec![
            hotel("far", 30.30, 120.10, 4.9, 300, &[Amenity::Breakfast]),
            hotel("near-b", 30.2800, 120.0270, 4.2, 500, &[Amenity::FreeWifi]),
            hotel("near-a", 30.2800, 120.0270, 4.2, 450, &[Amenity::Breakfast, Amenity::FreeWifi]),
            hotel("near-top", 30.2800, 120.0270, 4.8, 700, &[Amenity::Breakfast]),
            hotel("mid", 30.29, 120.04, 3.5, 200, &[]),
        ]
    }

    fn ids(hotels: &[HotelSummary]) -> Vec<&str> {
        hotels.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_rank_by_distance_then_rating_then_price() {
        let ranker = HotelRanker::default();
        let ranked = ranker.rank(candidates(), &HotelQuery::near(center(), stay()));
        assert_eq!(ids(&ranked), vec!["near-top", "near-a", "near-b", "mid", "far"]);
        assert!(ranked.iter().all(|h| h.distance_meters.is_some()));
    }

    #[test]
    fn test_region_only_treats_all_as_equidistant() {
        let ranker = HotelRanker::default();
        let ranked = ranker.rank(candidates(), &HotelQuery::in_region("Hangzhou", stay()));
        assert_eq!(ids(&ranked), vec!["far", "near-top", "near-a", "near-b", "mid"]);
        assert!(ranked.iter().all(|h| h.distance_meters.is_none()));
    }

    #[rstest]
    #[case(Amenity::Breakfast, vec!["near-top", "near-a", "far"])]
    #[case(Amenity::FreeWifi, vec!["near-a", "near-b"])]
    #[case(Amenity::Spa, vec![])]
    fn test_required_amenity_filter(#[case] amenity: Amenity, #[case] expected: Vec<&str>) {
        let ranker = HotelRanker::default();
        let query = HotelQuery::near(center(), stay()).with_amenity(amenity);
        let ranked = ranker.rank(candidates(), &query);
        assert!(ranked.iter().all(|h| h.amenities.contains(&amenity)));
        assert_eq!(ids(&ranked), expected);
    }

    #[test]
    fn test_price_and_rating_filters() {
        let ranker = HotelRanker::default();
        let query = HotelQuery::near(center(), stay())
            .with_max_nightly_price(Decimal::new(450, 0))
            .with_min_guest_rating(4.0);
        let ranked = ranker.rank(candidates(), &query);
        assert_eq!(ids(&ranked), vec!["near-a", "far"]);

        let impossible = HotelQuery::near(center(), stay()).with_max_nightly_price(Decimal::new(50, 0));
        assert!(ranker.rank(candidates(), &impossible).is_empty());
    }

    #[test]
    fn test_min_price_filter() {
        let ranker = HotelRanker::default();
        let query = HotelQuery::near(center(), stay())
            .with_min_nightly_price(Decimal::new(450, 0))
            .with_max_nightly_price(Decimal::new(600, 0));
        let ranked = ranker.rank(candidates(), &query);
        assert_eq!(ids(&ranked), vec!["near-a", "near-b"]);
    }

    #[test]
    fn test_unpriced_hotel_fails_price_filters_and_sorts_after_priced() {
        let ranker = HotelRanker::default();
        let mut unpriced = hotel("unpriced", 30.2800, 120.0270, 4.2, 0, &[]);
        unpriced.starting_price = None;
        let priced = hotel("priced", 30.2800, 120.0270, 4.2, 999, &[]);

        let ranked = ranker.rank(
            vec![unpriced.clone(), priced.clone()],
            &HotelQuery::near(center(), stay()),
        );
        assert_eq!(ids(&ranked), vec!["priced", "unpriced"]);

        let capped = HotelQuery::near(center(), stay()).with_max_nightly_price(Decimal::new(1000, 0));
        assert_eq!(ids(&ranker.rank(vec![unpriced, priced], &capped)), vec!["priced"]);
    }

    #[test]
    fn test_coarse_granularity_lets_rating_decide() {
        let ranker = HotelRanker::new(RankingConfig {
            distance_granularity_meters: 50_000.0,
        });
        let ranked = ranker.rank(candidates(), &HotelQuery::near(center(), stay()));
        assert_eq!(ids(&ranked), vec!["far", "near-top", "near-a", "near-b", "mid"]);
    }

    #[test]
    fn test_rank_is_sorted_and_deterministic() {
        let ranker = HotelRanker::default();
        let query = HotelQuery::near(center(), stay());

        let mut reversed = candidates();
        reversed.reverse();

        let first = ranker.rank(candidates(), &query);
        let second = ranker.rank(reversed, &query);
        assert_eq!(first, second);

        for pair in first.windows(2) {
            assert_ne!(ranker.compare(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_antipodal_candidate_sorts_last() {
        let ranker = HotelRanker::default();
        let origin = GeoPoint::new(-82.0, -179.0).unwrap();
        let candidates = vec![
            hotel("antipode", 82.0, 1.0, 4.9, 100, &[]),
            hotel("next-door", -81.999, -179.0, 3.0, 900, &[]),
        ];

        let ranked = ranker.rank(candidates, &HotelQuery::near(origin, stay()));
        assert_eq!(ids(&ranked), vec!["next-door", "antipode"]);
        assert!(ranked.iter().all(|h| h.distance_meters.is_some_and(f64::is_finite)));
    }

    #[test]
    fn test_non_finite_distance_key_is_farthest() {
        let ranker = HotelRanker::default();
        let mut lost = hotel("lost", 0.0, 0.0, 5.0, 1, &[]);
        lost.distance_meters = Some(f64::NAN);
        assert_eq!(ranker.distance_key(&lost), u64::MAX);
    }

    #[test]
    fn test_empty_candidates() {
        let ranker = HotelRanker::default();
        assert!(ranker.rank(Vec::new(), &HotelQuery::near(center(), stay())).is_empty());
    }
}
