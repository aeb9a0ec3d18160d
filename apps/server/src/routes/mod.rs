use actix_web::web::ServiceConfig;

mod dashboard;
mod health;
mod status;

/// Mount every dashboard route
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.configure(health::routes).configure(status::routes).configure(dashboard::routes);
}
