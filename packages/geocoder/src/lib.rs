#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address geocoding for report submission and the location field.
//!
//! Turns the free-text location a reporter typed into coordinates, and
//! offers address suggestions while they type. Backed by Nominatim /
//! `OpenStreetMap`, configured by the TOML files in `services/` (see
//! [`service_registry`]).
//!
//! Geocoding is best effort. Callers store a report without coordinates
//! when no match is found or the lookup fails.

pub mod debounce;
pub mod nominatim;
pub mod service_registry;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use safety_map_geography_models::Coordinate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

pub use debounce::{SessionDebouncers, SuggestionDebouncer};
use service_registry::NominatimConfig;

/// A geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeMatch {
    /// Matched position.
    pub coordinate: Coordinate,
    /// The canonical address returned by the geocoder.
    pub display_name: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves free-text locations.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Geocodes `text`, returning `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup fails.
    async fn geocode(&self, text: &str) -> Result<Option<GeocodeMatch>, GeocodeError>;

    /// Returns address suggestions for a partially typed location.
    ///
    /// Short inputs return an empty list without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup fails.
    async fn suggest(&self, prefix: &str) -> Result<Vec<String>, GeocodeError>;
}

/// Nominatim-backed [`AddressLookup`] with request pacing.
#[derive(Debug)]
pub struct Geocoder {
    client: reqwest::Client,
    config: NominatimConfig,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Geocoder {
    /// Builds a geocoder for the given Nominatim settings.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            min_interval: Duration::from_millis(config.rate_limit_ms),
            last_request: Mutex::new(None),
            config,
        })
    }

    /// Builds a geocoder from the highest-priority enabled service in the
    /// embedded registry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if no Nominatim service is enabled or the
    /// HTTP client cannot be built.
    pub fn from_registry() -> Result<Self, GeocodeError> {
        let config = service_registry::nominatim().ok_or_else(|| GeocodeError::Parse {
            message: "No enabled Nominatim service configured".to_string(),
        })?;
        log::debug!("Using geocoder at {}", config.base_url);
        Self::new(config)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// Quiet period to wait before sending a suggestion query.
    #[must_use]
    pub const fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.config.debounce_ms)
    }

    /// Returns `true` if `prefix` is long enough to query suggestions for.
    #[must_use]
    pub fn accepts_prefix(&self, prefix: &str) -> bool {
        prefix.trim().chars().count() >= self.config.min_query_length
    }

    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl AddressLookup for Geocoder {
    async fn geocode(&self, text: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.pace().await;
        let result = nominatim::geocode_freeform(&self.client, &self.config, text).await?;

        match &result {
            Some(m) => log::debug!(
                "Geocoded {text:?} to {},{}",
                m.coordinate.lat,
                m.coordinate.lng
            ),
            None => log::debug!("No geocoding match for {text:?}"),
        }

        Ok(result)
    }

    async fn suggest(&self, prefix: &str) -> Result<Vec<String>, GeocodeError> {
        if !self.accepts_prefix(prefix) {
            return Ok(Vec::new());
        }

        self.pace().await;
        nominatim::suggest(
            &self.client,
            &self.config,
            prefix.trim(),
            self.config.suggestion_limit,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_geocoder() -> Geocoder {
        let mut config = service_registry::nominatim().unwrap();
        config.base_url = "http://127.0.0.1:9/search".to_string();
        Geocoder::new(config).unwrap()
    }

    #[tokio::test]
    async fn short_prefixes_skip_the_network() {
        let geocoder = offline_geocoder();
        assert!(geocoder.suggest("").await.unwrap().is_empty());
        assert!(geocoder.suggest("ab").await.unwrap().is_empty());
        assert!(geocoder.suggest("  ab  ").await.unwrap().is_empty());
        assert!(geocoder.accepts_prefix("abc"));
        assert_eq!(geocoder.debounce_delay(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn blank_text_has_no_match() {
        let geocoder = offline_geocoder();
        assert!(geocoder.geocode("   ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_http_error() {
        let geocoder = offline_geocoder();
        assert!(matches!(
            geocoder.geocode("5th and Main").await,
            Err(GeocodeError::Http(_))
        ));
    }
}
