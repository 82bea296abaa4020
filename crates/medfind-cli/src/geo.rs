//! `geocode`, `reverse`, and `gazetteer` command handlers. None of these
//! touch storage.

use medfind_core::{AppConfig, Coordinate, Gazetteer};

use crate::backend::build_client;

/// # Errors
///
/// Returns an error if the provider request fails.
pub(crate) async fn run_geocode(
    config: &AppConfig,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let coordinate = client.search(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&coordinate)?);
    } else {
        match coordinate {
            Some(point) => println!("{point}"),
            None => println!("no match for '{query}'"),
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the coordinate is out of range or the provider
/// request fails.
pub(crate) async fn run_reverse(
    config: &AppConfig,
    latitude: f64,
    longitude: f64,
    json: bool,
) -> anyhow::Result<()> {
    let coordinate = Coordinate::validated(latitude, longitude)?;
    let client = build_client(config)?;
    let locality = client.reverse(coordinate).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locality)?);
        return Ok(());
    }
    match locality {
        Some(l) => println!(
            "city: {}\narea: {}",
            if l.city.is_empty() { "-" } else { l.city.as_str() },
            if l.area.is_empty() { "-" } else { l.area.as_str() }
        ),
        None => println!("no address for {coordinate}"),
    }
    Ok(())
}

/// Load the configured gazetteer and warn about ignored duplicates.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub(crate) fn load_gazetteer(config: &AppConfig) -> anyhow::Result<Gazetteer> {
    let gazetteer = Gazetteer::load(config.gazetteer_path.as_deref())?;
    for dup in gazetteer.duplicates() {
        tracing::warn!(
            city = %dup.city,
            area = %dup.area,
            kept = %dup.kept,
            ignored = %dup.ignored,
            "duplicate gazetteer area; first entry kept"
        );
    }
    tracing::debug!(entries = gazetteer.len(), "gazetteer loaded");
    Ok(gazetteer)
}

pub(crate) fn run_gazetteer_areas(gazetteer: &Gazetteer, city: &str) {
    let areas = gazetteer.areas(city);
    if areas.is_empty() {
        println!("no known areas for '{city}'");
        return;
    }
    for area in areas {
        println!("{area}");
    }
}

/// # Errors
///
/// Returns an error if the area is not in the gazetteer.
pub(crate) fn run_gazetteer_lookup(
    gazetteer: &Gazetteer,
    city: &str,
    area: &str,
) -> anyhow::Result<()> {
    let point = gazetteer
        .lookup(city, area)
        .ok_or_else(|| anyhow::anyhow!("area '{area}' in city '{city}' is not in the gazetteer"))?;
    println!("{point}");
    Ok(())
}
