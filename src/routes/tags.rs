use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::error::AppResult;
use crate::models::{Limit, TagKey, TagRecordResponse};
use crate::services::TagRecordStore;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// `/{prefix}/{key}`, or `/{key}` when the prefix is empty.
pub fn resource_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "/{key}".to_string()
    } else {
        format!("/{}/{{key}}", prefix)
    }
}

pub fn create_routes(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.service(
        web::resource(resource_path(prefix))
            .route(web::get().to(list_tags))
            .route(web::post().to(upsert_tag))
            .route(web::put().to(upsert_tag))
            .default_service(web::to(method_not_allowed)),
    );
}

// GET /{key} - List records for a name, newest first
async fn list_tags(
    store: web::Data<dyn TagRecordStore>,
    key: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let name = TagKey::read_name(&key)?;
    let limit = Limit::parse_query(query.limit.as_deref())?;
    info!("get key: {} value list ({:?})", name, limit);

    let records = store.list_by_name(name, limit).await?;
    let responses: Vec<TagRecordResponse> = records.into_iter().map(|r| r.into()).collect();
    let body = serde_json::to_vec(&responses)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

// POST|PUT /{name}:{tag} - Upsert a record
async fn upsert_tag(
    store: web::Data<dyn TagRecordStore>,
    key: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = TagKey::parse(&key)?;

    let record = store.upsert(&key.name, &key.tag).await?;
    info!(
        "successfully upserted key: {} (updated_at {})",
        key, record.updated_at
    );

    Ok(HttpResponse::Ok().finish())
}

async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    info!("method not supported: {}", req.method());
    HttpResponse::MethodNotAllowed().finish()
}
