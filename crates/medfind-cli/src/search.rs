//! `search` and `compare` command handlers.

use std::sync::Arc;

use medfind_core::{AppConfig, Gazetteer, RankedResult, ResolvedLocation};
use medfind_search::{SearchRequest, SearchService};

use crate::backend::{AppGeocoder, Storage};

pub(crate) type Service = SearchService<Storage, AppGeocoder>;

pub(crate) fn build_service(
    storage: Storage,
    geocoder: AppGeocoder,
    gazetteer: Gazetteer,
    config: &AppConfig,
) -> Service {
    SearchService::from_config(storage, geocoder, Arc::new(gazetteer), config)
}

/// Run a search and print the ranked rows.
///
/// # Errors
///
/// Returns an error if the request is invalid or storage fails.
pub(crate) async fn run_search(
    service: &Service,
    request: &SearchRequest,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = service.search(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", describe_location(&outcome.location));
    if outcome.results.is_empty() {
        println!("no hospitals offer service {} here", request.service_id);
        return Ok(());
    }
    print_table(&outcome.results);
    Ok(())
}

/// Compare one service across hospitals and print the rows, cheapest first.
///
/// # Errors
///
/// Returns an error if no ids are given or storage fails.
pub(crate) async fn run_compare(
    service: &Service,
    service_id: i64,
    hospital_ids: &[i64],
    json: bool,
) -> anyhow::Result<()> {
    let results = service.compare_hospitals(service_id, hospital_ids).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("none of the given hospitals offer service {service_id}");
        return Ok(());
    }
    print_table(&results);
    Ok(())
}

fn describe_location(location: &ResolvedLocation) -> String {
    match location.reference_point {
        Some(point) => format!("location: {} via {}", point, location.tier),
        None => format!("location: whole city via {}", location.tier),
    }
}

/// Distance column text; `-` when there was no reference point.
pub(crate) fn fmt_distance(distance_km: Option<f64>) -> String {
    distance_km.map_or_else(|| "-".to_string(), |d| format!("{d:.2}"))
}

fn fmt_name(name: &str) -> String {
    if name.chars().count() > 32 {
        format!("{}...", name.chars().take(32).collect::<String>())
    } else {
        name.to_string()
    }
}

fn print_table(rows: &[RankedResult]) {
    println!(
        "{:<8}{:<36}{:>10}{:>12}{:>8}{:>9}  AVAILABLE",
        "ID", "NAME", "KM", "PRICE", "RATING", "REVIEWS"
    );
    for row in rows {
        println!(
            "{:<8}{:<36}{:>10}{:>12}{:>8.1}{:>9}  {}",
            row.hospital_id,
            fmt_name(&row.name),
            fmt_distance(row.distance_km),
            row.price.round_dp(2).to_string(),
            row.average_rating,
            row.review_count,
            if row.available { "yes" } else { "no" }
        );
    }
}
