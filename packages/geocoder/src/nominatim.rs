//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows **1 request per second** at most and
//! requires an identifying `User-Agent`.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use safety_map_geography_models::Coordinate;

use crate::service_registry::NominatimConfig;
use crate::{GeocodeError, GeocodeMatch};

/// Geocodes a free-form query, returning the best match.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    config: &NominatimConfig,
    query: &str,
) -> Result<Option<GeocodeMatch>, GeocodeError> {
    let body = search(client, config, query, 1, false).await?;
    parse_response(&body)
}

/// Returns up to `limit` display names matching `query`.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn suggest(
    client: &reqwest::Client,
    config: &NominatimConfig,
    query: &str,
    limit: u32,
) -> Result<Vec<String>, GeocodeError> {
    let body = search(client, config, query, limit, true).await?;
    parse_suggestions(&body)
}

async fn search(
    client: &reqwest::Client,
    config: &NominatimConfig,
    query: &str,
    limit: u32,
    address_details: bool,
) -> Result<serde_json::Value, GeocodeError> {
    let limit = limit.to_string();
    let mut params = vec![
        ("format", "json"),
        ("q", query),
        ("limit", limit.as_str()),
        ("countrycodes", config.country_codes.as_str()),
    ];
    if address_details {
        params.push(("addressdetails", "1"));
    }

    let resp = client.get(&config.base_url).query(&params).send().await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    Ok(resp.error_for_status()?.json().await?)
}

/// Parses the first result of a Nominatim search response.
pub(crate) fn parse_response(
    body: &serde_json::Value,
) -> Result<Option<GeocodeMatch>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = parse_degrees(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lng = parse_degrees(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    let coordinate = Coordinate::new(lat, lng);
    if !coordinate.is_valid() {
        return Err(GeocodeError::Parse {
            message: format!("Nominatim returned out-of-range coordinate {lat},{lng}"),
        });
    }

    Ok(Some(GeocodeMatch {
        coordinate,
        display_name: first["display_name"].as_str().map(String::from),
    }))
}

/// Extracts every `display_name` from a Nominatim search response.
pub(crate) fn parse_suggestions(body: &serde_json::Value) -> Result<Vec<String>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results
        .iter()
        .filter_map(|r| r["display_name"].as_str().map(String::from))
        .collect())
}

/// Nominatim encodes degrees as strings; accept numbers too.
fn parse_degrees(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
}
