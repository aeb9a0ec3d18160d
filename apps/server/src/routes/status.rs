use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;
use webmon_service::SnapshotReader;

macros_utils::routes! {
    route status_route,
}

/// Latest snapshot as JSON, `503` until the first cycle has completed
#[get("/api/status")]
pub async fn status_route(reader: web::Data<SnapshotReader>) -> impl Responder {
    match reader.latest() {
        Some(snapshot) => HttpResponse::Ok().json(snapshot.as_ref()),
        None => HttpResponse::ServiceUnavailable().json(json!({ "error": "no data yet" })),
    }
}
