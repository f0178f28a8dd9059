//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preference order, lower values first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim(NominatimConfig),
}

/// Settings for a Nominatim search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NominatimConfig {
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Comma-separated ISO country codes results are restricted to.
    pub country_codes: String,
    /// `User-Agent` sent with every request, as the public instance's
    /// usage policy requires.
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Maximum number of address suggestions.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: u32,
    /// Queries shorter than this (after trimming) get no suggestions.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
    /// Quiet period before a suggestion query is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_suggestion_limit() -> u32 {
    5
}

const fn default_min_query_length() -> usize {
    3
}

const fn default_debounce_ms() -> u64 {
    300
}

impl GeocodingService {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim(config) => &config.base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[(
    "nominatim",
    include_str!("../services/nominatim.toml"),
)];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 1;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Returns the highest-priority enabled Nominatim configuration.
#[must_use]
pub fn nominatim() -> Option<NominatimConfig> {
    enabled_services()
        .into_iter()
        .map(|s| match s.provider {
            ProviderConfig::Nominatim(config) => config,
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.id.is_empty(), "Service has empty id");
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(
                !svc.base_url().is_empty(),
                "Service {} has empty base_url",
                svc.id
            );
        }
    }

    #[test]
    fn nominatim_defaults_match_form_behavior() {
        let config = nominatim().unwrap();
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.min_query_length, 3);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.country_codes, "us");
        assert!(!config.user_agent.is_empty());
    }
}
