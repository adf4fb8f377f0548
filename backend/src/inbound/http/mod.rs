//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod records;
pub mod schemas;
pub mod settings;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod token_config;
pub mod users;

pub use error::ApiResult;

use actix_web::{Scope, web};

/// Every `/api` route with JSON body errors mapped onto the error envelope.
///
/// Literal routes are registered ahead of `/{collection}` patterns.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(health::health)
        .service(users::login)
        .service(users::list_users)
        .service(settings::get_settings)
        .service(records::list_records)
        .service(records::add_record)
        .service(records::clear_collection)
        .service(records::update_record)
        .service(records::delete_record)
}
