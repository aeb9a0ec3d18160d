//! Small declarative helpers shared by the webmon binaries.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;

/// Generates a `pub fn routes(cfg: &mut ServiceConfig)` registering every
/// listed handler, so a route module can be mounted with
/// `App::configure(module::routes)`.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     route status_route,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $( cfg.service($handler); )*
        }
    };
}
