use actix_web::{HttpResponse, Responder, get, http::header::ContentType, web};
use webmon_service::SnapshotReader;

use crate::render::dashboard_page;

macros_utils::routes! {
    route dashboard_route,
}

#[get("/")]
pub async fn dashboard_route(reader: web::Data<SnapshotReader>) -> impl Responder {
    // Render from our own copy; the store is never touched while rendering
    let snapshot = reader.read();

    HttpResponse::Ok().content_type(ContentType::html()).body(dashboard_page(snapshot.as_ref()))
}
