//! `services` and `stats` command handlers.

use medfind_core::{RatingAggregate, ServiceRecord};

use crate::search::Service;

/// # Errors
///
/// Returns an error if storage fails.
pub(crate) async fn run_services_list(
    service: &Service,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let services = service.list_services(category).await?;
    print_services(&services, json)
}

/// # Errors
///
/// Returns an error if the id is unknown or storage fails.
pub(crate) async fn run_services_show(
    service: &Service,
    service_id: i64,
    json: bool,
) -> anyhow::Result<()> {
    let record = service.service(service_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    println!("id:          {}", record.id);
    println!("name:        {}", record.name);
    println!("category:    {}", record.category.as_deref().unwrap_or("-"));
    println!("description: {}", record.description.as_deref().unwrap_or("-"));
    Ok(())
}

/// # Errors
///
/// Returns an error if storage fails.
pub(crate) async fn run_services_search(
    service: &Service,
    keyword: &str,
    json: bool,
) -> anyhow::Result<()> {
    let services = service.search_services(keyword).await?;
    print_services(&services, json)
}

/// # Errors
///
/// Returns an error if the hospital is unknown or storage fails.
pub(crate) async fn run_stats(
    service: &Service,
    hospital_id: i64,
    json: bool,
) -> anyhow::Result<()> {
    let stats = service.rating_stats(hospital_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", fmt_stats(&stats));
    }
    Ok(())
}

/// One-line rating summary; a hospital without reviews has no average.
pub(crate) fn fmt_stats(stats: &RatingAggregate) -> String {
    let average = stats
        .average_rating
        .map_or_else(|| "-".to_string(), |a| format!("{a:.2}"));
    format!(
        "hospital {}: average {} from {} review(s)",
        stats.hospital_id, average, stats.review_count
    )
}

fn print_services(services: &[ServiceRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(services)?);
        return Ok(());
    }
    if services.is_empty() {
        println!("no matching services");
        return Ok(());
    }
    println!("{:<8}{:<36}CATEGORY", "ID", "NAME");
    for s in services {
        println!(
            "{:<8}{:<36}{}",
            s.id,
            s.name,
            s.category.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
