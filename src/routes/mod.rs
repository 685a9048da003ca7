pub mod health;
pub mod tags;

use actix_web::web;

/// Registers every route. `/health` goes first so an empty API prefix cannot shadow it.
pub fn create_routes(prefix: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route("/health", web::get().to(health::health_check));
        tags::create_routes(cfg, &prefix);
    }
}
