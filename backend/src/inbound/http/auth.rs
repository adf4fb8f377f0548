//! Bearer-token extractor for protected handlers.
//!
//! Keep the handlers focused on request/response mapping: adding an
//! [`Authenticated`] argument runs the auth gate before the handler body.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Identity};

use super::state::HttpState;

/// The caller resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl Authenticated {
    /// Borrow the resolved identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));

        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("http state not configured"))?;
            let authorization = match authorization {
                None => None,
                Some(Ok(value)) => Some(value),
                Some(Err(_)) => return Err(Error::unauthorized("invalid token").into()),
            };
            let identity = state.auth.authenticate(authorization.as_deref()).await?;
            Ok(Self(identity))
        })
    }
}
