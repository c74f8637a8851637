//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use marquee_api_models::Marquee;
use marquee_client::Editable;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_marquee_list(marquees: &[Marquee], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(marquees)?,
        OutputFormat::Table => {
            println!(
                "{:<24} {:<10} {:>8} {:>10} NAME",
                "ID", "STATUS", "CAPACITY", "PER DAY"
            );
            for marquee in marquees {
                println!(
                    "{:<24} {:<10} {:>8} {:>10} {}",
                    marquee.id,
                    status_label(marquee),
                    marquee.capacity,
                    format_price(marquee.pricing.per_day),
                    marquee.name
                );
            }
            if marquees.is_empty() {
                println!("(no marquees)");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_marquee_detail(marquee: &Marquee, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(marquee)?,
        OutputFormat::Table => {
            println!("id: {}", marquee.id);
            println!("name: {}", marquee.name);
            if !marquee.description.is_empty() {
                println!("description: {}", marquee.description);
            }
            println!("status: {}", status_label(marquee));
            println!("capacity: {}", marquee.capacity);
            println!("location: {}", format_location(marquee));
            println!(
                "pricing: {} / hour, {} / day",
                format_price(marquee.pricing.per_hour),
                format_price(marquee.pricing.per_day)
            );
            for fee in &marquee.pricing.additional_fees {
                println!("  fee: {} {}", fee.name, format_price(fee.amount));
            }
            if !marquee.amenities.is_empty() {
                println!("amenities: {}", marquee.amenities.join(", "));
            }
            for deal in &marquee.deals {
                match deal.discount_price {
                    Some(price) => println!("deal: {} ({})", deal.title, format_price(price)),
                    None => println!("deal: {}", deal.title),
                }
            }
            if let Some(provider) = marquee.provider.as_ref().and_then(|p| p.name()) {
                println!("provider: {provider}");
            }
        }
    }
    Ok(())
}

/// Render an editable entity as its form fields, or as raw JSON.
pub(crate) fn render_entity<T>(entity: &T, format: OutputFormat) -> CliResult<()>
where
    T: Editable + Serialize,
{
    match format {
        OutputFormat::Json => render_json(entity)?,
        OutputFormat::Table => {
            let form = entity.update_form();
            for field in form.fields() {
                let marker = if field.required { "*" } else { "" };
                let value = if field.value.is_empty() {
                    "-"
                } else {
                    field.value.as_str()
                };
                println!("{}{marker}: {value}", field.name);
            }
        }
    }
    Ok(())
}

#[must_use]
pub(crate) fn status_label(marquee: &Marquee) -> &'static str {
    marquee
        .effective_status()
        .map_or("-", marquee_api_models::BookingStatus::as_str)
}

#[must_use]
pub(crate) fn format_price(amount: f64) -> String {
    format!("{amount:.2}")
}

fn format_location(marquee: &Marquee) -> String {
    let location = &marquee.location;
    let parts: Vec<&str> = [
        location.address.as_str(),
        location.city.as_str(),
        location.state.as_str(),
        location.country.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.trim().is_empty())
    .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}
