//! Deterministic result ordering.
//!
//! Both orderings use a stable sort, so rows that tie on every key keep
//! their join order.

use std::cmp::Ordering;

use medfind_core::RankedResult;

/// Order by distance ascending, then price ascending, then rating
/// descending. Rows without a distance rank as if they were at distance zero.
pub fn rank(rows: &mut [RankedResult]) {
    rows.sort_by(|a, b| {
        a.ranking_distance()
            .total_cmp(&b.ranking_distance())
            .then_with(|| by_price_then_rating(a, b))
    });
}

/// Order by price ascending, then rating descending. Used for comparisons
/// where there is no reference point.
pub fn rank_without_distance(rows: &mut [RankedResult]) {
    rows.sort_by(by_price_then_rating);
}

fn by_price_then_rating(a: &RankedResult, b: &RankedResult) -> Ordering {
    a.price
        .cmp(&b.price)
        .then_with(|| b.average_rating.total_cmp(&a.average_rating))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn row(id: i64, distance_km: Option<f64>, price: i64, rating: f64) -> RankedResult {
        RankedResult {
            hospital_id: id,
            name: format!("H{id}"),
            address: String::new(),
            city: "Pune".to_string(),
            coordinate: None,
            phone: None,
            distance_km,
            price: Decimal::new(price, 0),
            available: true,
            waiting_time_minutes: None,
            average_rating: rating,
            review_count: 0,
        }
    }

    fn ids(rows: &[RankedResult]) -> Vec<i64> {
        rows.iter().map(|r| r.hospital_id).collect()
    }

    #[test]
    fn nearer_beats_cheaper() {
        let mut rows = vec![row(1, Some(3.0), 100, 4.0), row(2, Some(1.0), 900, 1.0)];
        rank(&mut rows);
        assert_eq!(ids(&rows), vec![2, 1]);
    }

    #[test]
    fn equal_distance_breaks_on_price_then_rating() {
        let mut rows = vec![
            row(1, Some(2.0), 500, 4.0),
            row(2, Some(2.0), 300, 3.0),
            row(3, Some(2.0), 300, 4.5),
        ];
        rank(&mut rows);
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let mut rows = vec![
            row(7, Some(1.0), 100, 4.0),
            row(3, Some(1.0), 100, 4.0),
            row(5, Some(1.0), 100, 4.0),
        ];
        rank(&mut rows);
        assert_eq!(ids(&rows), vec![7, 3, 5]);
    }

    #[test]
    fn missing_distance_ranks_as_zero() {
        let mut rows = vec![row(1, Some(0.5), 100, 4.0), row(2, None, 100, 4.0)];
        rank(&mut rows);
        assert_eq!(ids(&rows), vec![2, 1]);
    }

    #[test]
    fn without_distance_orders_by_price_then_rating() {
        let mut rows = vec![
            row(1, Some(0.1), 800, 5.0),
            row(2, Some(9.0), 200, 2.0),
            row(3, Some(5.0), 200, 4.0),
        ];
        rank_without_distance(&mut rows);
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }
}
