//! Record CRUD handlers for the phone, account and bill collections.
//!
//! ```text
//! GET    /api/{collection}
//! POST   /api/{collection}
//! PUT    /api/{collection}/{id}
//! DELETE /api/{collection}/{id}
//! DELETE /api/{collection}/clear
//! ```
//!
//! `clear` must be registered before `/{collection}/{id}` so the literal
//! segment wins.

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{AuthGate, CollectionKind, Error, Record};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ErrorSchema, RecordSchema};
use crate::inbound::http::state::HttpState;

/// Body of a successful `POST /api/{collection}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RecordCreated {
    /// Identifier assigned to the new record.
    #[schema(example = "phone_1_20240305143000")]
    pub id: String,
    /// Confirmation message.
    #[schema(example = "record added")]
    pub message: String,
}

/// Body carrying only a confirmation message.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: String,
}

/// Body of a successful `DELETE /api/{collection}/clear`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCleared {
    /// Confirmation naming the collection.
    #[schema(example = "phones cleared")]
    pub message: String,
    /// Number of records removed.
    pub deleted_count: usize,
}

fn parse_collection(name: &str) -> Result<CollectionKind, Error> {
    CollectionKind::from_str(name).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "collection",
            "value": name,
            "allowed": CollectionKind::ALL.iter().map(|kind| kind.name()).collect::<Vec<_>>(),
        }))
    })
}

fn into_attributes(body: Value) -> Result<Map<String, Value>, Error> {
    match body {
        Value::Object(attributes) => Ok(attributes),
        _ => Err(Error::invalid_request("record must be a JSON object")),
    }
}

/// Every record in the collection, in insertion order.
#[utoipa::path(
    get,
    path = "/api/{collection}",
    params(("collection" = String, Path, description = "phones, accounts or bills")),
    responses(
        (status = 200, description = "Records", body = [RecordSchema]),
        (status = 400, description = "Unknown collection", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "listRecords"
)]
#[get("/{collection}")]
pub async fn list_records(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Record>>> {
    let kind = parse_collection(&path)?;
    Ok(web::Json(state.collections.list(kind).await))
}

/// Append a record. A missing or blank `id` is generated.
#[utoipa::path(
    post,
    path = "/api/{collection}",
    params(("collection" = String, Path, description = "phones, accounts or bills")),
    request_body = RecordSchema,
    responses(
        (status = 201, description = "Record added", body = RecordCreated),
        (status = 400, description = "Invalid body or duplicate id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Failed to save", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "addRecord"
)]
#[post("/{collection}")]
pub async fn add_record(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let kind = parse_collection(&path)?;
    let attributes = into_attributes(body.into_inner())?;
    let id = state
        .collections
        .add(kind, attributes, caller.identity())
        .await?;
    Ok(HttpResponse::Created().json(RecordCreated {
        id,
        message: "record added".to_owned(),
    }))
}

/// Admin only: remove every record in the collection.
#[utoipa::path(
    delete,
    path = "/api/{collection}/clear",
    params(("collection" = String, Path, description = "phones, accounts or bills")),
    responses(
        (status = 200, description = "Collection emptied", body = CollectionCleared),
        (status = 400, description = "Unknown collection", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 500, description = "Failed to save", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "clearCollection"
)]
#[delete("/{collection}/clear")]
pub async fn clear_collection(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<CollectionCleared>> {
    AuthGate::require_admin(caller.identity())?;
    let kind = parse_collection(&path)?;
    let deleted_count = state.collections.clear(kind, caller.identity()).await?;
    Ok(web::Json(CollectionCleared {
        message: format!("{kind} cleared"),
        deleted_count,
    }))
}

/// Replace a record wholesale; `id`, `updatedAt` and `updatedBy` are forced.
#[utoipa::path(
    put,
    path = "/api/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "phones, accounts or bills"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = RecordSchema,
    responses(
        (status = 200, description = "Record updated", body = MessageResponse),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 500, description = "Failed to save", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "updateRecord"
)]
#[put("/{collection}/{id}")]
pub async fn update_record(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> ApiResult<web::Json<MessageResponse>> {
    let (collection, id) = path.into_inner();
    let kind = parse_collection(&collection)?;
    let attributes = into_attributes(body.into_inner())?;
    state
        .collections
        .update(kind, &id, attributes, caller.identity())
        .await?;
    Ok(web::Json(MessageResponse {
        message: "record updated".to_owned(),
    }))
}

/// Remove a record.
#[utoipa::path(
    delete,
    path = "/api/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "phones, accounts or bills"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 500, description = "Failed to save", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "deleteRecord"
)]
#[delete("/{collection}/{id}")]
pub async fn delete_record(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (collection, id) = path.into_inner();
    let kind = parse_collection(&collection)?;
    state.collections.delete(kind, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
