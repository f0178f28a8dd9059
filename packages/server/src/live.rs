//! Server-sent events for the live report feed.

use std::sync::Arc;

use actix_web::web::Bytes;
use actix_web::{HttpResponse, http::header};
use safety_map_database::{ReportStore, UpdateCallback};
use safety_map_report_models::Report;
use tokio::sync::mpsc;

use crate::error::ServerError;

/// Encodes one snapshot as an SSE `data:` frame.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the reports cannot be serialized.
pub fn sse_frame(reports: &[Report]) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(reports)?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

/// Subscribes to `store` and streams every snapshot to the client.
///
/// The subscription lives inside the response stream, so it is dropped
/// (and unsubscribed) when the client disconnects.
///
/// # Errors
///
/// Returns [`ServerError`] if the initial snapshot cannot be loaded.
pub async fn stream_reports(
    store: &dyn ReportStore,
    limit: u32,
) -> Result<HttpResponse, ServerError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Report>>();

    let on_update: UpdateCallback = Arc::new(move |reports: Vec<Report>| {
        if tx.send(reports).is_err() {
            log::trace!("Live feed client already gone");
        }
    });

    let subscription = store.subscribe(limit, on_update).await?;
    log::debug!("Live feed client connected ({subscription:?})");

    let stream = async_stream::stream! {
        let _subscription = subscription;
        while let Some(reports) = rx.recv().await {
            match sse_frame(&reports) {
                Ok(frame) => yield Ok::<_, actix_web::Error>(frame),
                Err(e) => log::error!("Failed to encode live feed update: {e}"),
            }
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream))
}
