//! Catalog join: attach the requested service's offering and the review
//! aggregate to each candidate hospital.

use std::collections::HashMap;

use medfind_core::{HospitalStore, RankedResult, RatingAggregate, ServiceOffering, StoreError};

use crate::resolver::Candidate;

/// Review average when it is positive, else the hospital's static rating,
/// else zero.
#[must_use]
pub fn effective_rating(aggregate: &RatingAggregate, static_rating: Option<f64>) -> f64 {
    aggregate
        .average_rating
        .filter(|avg| avg.is_finite() && *avg > 0.0)
        .or(static_rating.filter(|r| r.is_finite()))
        .unwrap_or(0.0)
}

/// Keep only candidates offering `service_id`, in their input order.
///
/// # Errors
///
/// Returns [`StoreError`] if reading offerings or review aggregates fails.
pub async fn join_offerings<S: HospitalStore>(
    store: &S,
    service_id: i64,
    candidates: Vec<Candidate>,
) -> Result<Vec<RankedResult>, StoreError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = candidates.iter().map(|c| c.hospital.id).collect();
    let mut offerings: HashMap<i64, ServiceOffering> = HashMap::new();
    for offering in store.offerings(service_id, &ids).await? {
        if offering.service_id == service_id {
            offerings.entry(offering.hospital_id).or_insert(offering);
        }
    }

    let mut rows = Vec::with_capacity(offerings.len());
    for candidate in candidates {
        let Some(offering) = offerings.get(&candidate.hospital.id) else {
            continue;
        };
        let aggregate = store.rating_aggregate(candidate.hospital.id).await?;
        rows.push(to_row(candidate, offering, &aggregate));
    }

    tracing::debug!(
        service_id,
        candidates = ids.len(),
        offered = rows.len(),
        "joined service offerings"
    );
    Ok(rows)
}

fn to_row(
    candidate: Candidate,
    offering: &ServiceOffering,
    aggregate: &RatingAggregate,
) -> RankedResult {
    let hospital = candidate.hospital;
    RankedResult {
        hospital_id: hospital.id,
        average_rating: effective_rating(aggregate, hospital.static_rating),
        review_count: aggregate.review_count.max(0),
        name: hospital.name,
        address: hospital.address,
        city: hospital.city,
        coordinate: hospital.coordinate,
        phone: hospital.phone,
        distance_km: candidate.distance_km,
        price: offering.price,
        available: offering.available,
        waiting_time_minutes: offering.waiting_time_minutes,
    }
}
