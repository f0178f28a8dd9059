//! HTTP handler functions for the safety map API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use safety_map_alert::{AlertRequest, EmergencyContact, dispatch_alert, normalize_contacts};
use safety_map_database::settings::{self, EMERGENCY_CONTACTS_KEY};
use safety_map_feed::{FeedView, proximity::sort_by_distance};
use safety_map_geography_models::Coordinate;
use safety_map_markers::{fit_bounds, to_cards, to_markers, user_marker};
use safety_map_server_models::{
    AlertBody, ApiHealth, CreateReportRequest, FeedQueryParams, LiveFeedParams, MarkerResponse,
    ReportListResponse, SuggestParams, SuggestResponse,
};

use crate::AppState;
use crate::error::ServerError;
use crate::live;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Refreshes the shared snapshot and returns a view configured for this
/// request.
///
/// A failed load never fails the request. The view keeps the previous
/// snapshot, or stays empty if there never was one, and carries a generic
/// error message.
async fn load_view(state: &AppState, params: &FeedQueryParams) -> FeedView {
    let result = state.reports.load_all().await;

    let mut view = {
        let mut shared = state.lock_feed();
        shared.apply_fetch(result);
        shared.clone()
    };

    view.set_filter(params.filter_state());
    view.set_user_coordinate(params.user_coordinate());

    view
}

/// `GET /api/reports`
///
/// Returns report cards filtered by type and recency, annotated with
/// distance when the caller passes its position.
pub async fn list_reports(
    state: web::Data<AppState>,
    params: web::Query<FeedQueryParams>,
) -> Result<HttpResponse, ServerError> {
    let view = load_view(&state, &params).await;
    let now = Utc::now();
    let mut snapshot = view.render(now);

    if params.nearest {
        sort_by_distance(&mut snapshot.entries);
    }

    Ok(HttpResponse::Ok().json(ReportListResponse {
        reports: to_cards(&snapshot.entries, now),
        total: snapshot.total,
        filtered: snapshot.entries.len(),
        available_types: snapshot.available_types,
        showing_distances: snapshot.showing_distances,
        empty_message: snapshot.empty_message,
        error: snapshot.error,
    }))
}

/// `GET /api/markers`
///
/// Returns map markers for mapped reports passing the filters, the
/// viewport fitting them, and the user marker.
pub async fn markers(
    state: web::Data<AppState>,
    params: web::Query<FeedQueryParams>,
) -> Result<HttpResponse, ServerError> {
    let view = load_view(&state, &params).await;
    let now = Utc::now();
    let snapshot = view.render(now);

    let markers = to_markers(&snapshot.entries, now);
    let bounds = fit_bounds(&markers);

    Ok(HttpResponse::Ok().json(MarkerResponse {
        markers,
        bounds,
        user: view.user_coordinate().map(user_marker),
    }))
}

/// `POST /api/reports`
///
/// Stores a new report. The location is geocoded unless the client sent
/// coordinates. A geocoding miss or failure stores the report unmapped.
pub async fn create_report(
    state: web::Data<AppState>,
    body: web::Json<CreateReportRequest>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    let explicit = body.coordinates();
    let report = body.report.normalized();

    let coordinates = match explicit {
        Some(c) => Some(c),
        None => geocode_location(&state, report.location_text.as_deref()).await,
    };

    let stored = state.reports.insert(report, coordinates).await?;

    Ok(HttpResponse::Created().json(stored))
}

async fn geocode_location(state: &AppState, location: Option<&str>) -> Option<Coordinate> {
    let location = location?;

    match state.geocoder.geocode(location).await {
        Ok(Some(found)) => Some(found.coordinate),
        Ok(None) => {
            log::warn!("No geocoding match for {location:?}; storing report without coordinates");
            None
        }
        Err(e) => {
            log::warn!("Geocoding {location:?} failed, storing report without coordinates: {e}");
            None
        }
    }
}

/// `GET /api/reports/live`
///
/// Server-sent events: one event per snapshot of the most recent reports.
pub async fn live_feed(
    state: web::Data<AppState>,
    params: web::Query<LiveFeedParams>,
) -> Result<HttpResponse, ServerError> {
    let limit = state.config.live_limit(params.limit);
    live::stream_reports(state.reports.as_ref(), limit).await
}

/// `GET /api/geocode/suggest`
///
/// Address suggestions for a partially typed location. Queries from one
/// session are debounced, so only the last of a burst reaches the
/// geocoder and the rest come back marked `superseded`. Lookup failures
/// yield an empty list.
pub async fn suggest(
    state: web::Data<AppState>,
    params: web::Query<SuggestParams>,
) -> HttpResponse {
    let outcome = state
        .suggestions
        .run(&params.session, || state.geocoder.suggest(&params.q))
        .await;

    let Some(result) = outcome else {
        return HttpResponse::Ok().json(SuggestResponse {
            suggestions: Vec::new(),
            superseded: true,
        });
    };

    let suggestions = result.unwrap_or_else(|e| {
        log::warn!("Address suggestions for {:?} failed: {e}", params.q);
        Vec::new()
    });

    HttpResponse::Ok().json(SuggestResponse {
        suggestions,
        superseded: false,
    })
}

/// `GET /api/contacts`
pub async fn get_contacts(state: web::Data<AppState>) -> Result<HttpResponse, ServerError> {
    let contacts: Vec<EmergencyContact> =
        settings::get_json(state.settings.as_ref(), EMERGENCY_CONTACTS_KEY)
            .await?
            .unwrap_or_default();

    Ok(HttpResponse::Ok().json(contacts))
}

/// `PUT /api/contacts`
///
/// Replaces the emergency contacts. Unusable entries are dropped and at
/// most three are kept. Returns what was stored.
pub async fn put_contacts(
    state: web::Data<AppState>,
    body: web::Json<Vec<EmergencyContact>>,
) -> Result<HttpResponse, ServerError> {
    let contacts = normalize_contacts(body.into_inner());

    settings::set_json(state.settings.as_ref(), EMERGENCY_CONTACTS_KEY, &contacts).await?;
    log::info!("Saved {} emergency contacts", contacts.len());

    Ok(HttpResponse::Ok().json(contacts))
}

/// `GET /api/settings/{key}`
pub async fn get_setting(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    let key = key.into_inner();
    let value: Option<serde_json::Value> = settings::get_json(state.settings.as_ref(), &key).await?;

    match value {
        Some(value) => Ok(HttpResponse::Ok().json(value)),
        None => Err(ServerError::NotFound(format!("No setting named {key:?}"))),
    }
}

/// `PUT /api/settings/{key}`
pub async fn put_setting(
    state: web::Data<AppState>,
    key: web::Path<String>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ServerError> {
    let value = body.into_inner();

    settings::set_json(state.settings.as_ref(), &key, &value).await?;

    Ok(HttpResponse::Ok().json(value))
}

/// `POST /api/alert`
///
/// Sends an emergency alert to the stored contacts. The sender's location
/// is only included when location sharing is enabled.
pub async fn send_alert(
    state: web::Data<AppState>,
    body: web::Json<AlertBody>,
) -> Result<HttpResponse, ServerError> {
    let contacts: Vec<EmergencyContact> =
        settings::get_json(state.settings.as_ref(), EMERGENCY_CONTACTS_KEY)
            .await?
            .unwrap_or_default();

    let app_settings = settings::app_settings(state.settings.as_ref()).await?;
    let location = body.location().filter(|_| app_settings.location_sharing);
    if body.location().is_some() && location.is_none() {
        log::debug!("Location sharing disabled; alert sent without location");
    }

    let sender = body.sender_name.trim();
    let sender = if sender.is_empty() { "Unknown" } else { sender };
    let request = AlertRequest::new(sender, location);

    let summary = dispatch_alert(contacts, &request, &state.alert_channels).await?;

    Ok(HttpResponse::Ok().json(summary))
}
