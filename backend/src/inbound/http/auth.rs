//! Request authentication.
//!
//! A caller is identified either by `Authorization: Bearer <token>` or by the
//! session cookie set at login. The bearer header wins when both are present.

use actix_session::Session;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AccessToken, Error, Principal};

use super::session::SessionContext;
use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Extract the bearer token from the request, if one was sent.
///
/// A present but malformed `Authorization` header is rejected rather than
/// silently ignored.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<Option<AccessToken>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(Error::unauthorized("unsupported authorization scheme"));
    }
    AccessToken::from_presented(token.trim())
        .map(Some)
        .ok_or_else(|| Error::unauthorized("malformed bearer token"))
}

/// Principal of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(Principal);

impl AuthenticatedUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let bearer = bearer_token(req);
        let session = Session::from_request(req, payload);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let principal = if let Some(token) = bearer? {
                state.login.resolve_token(&token).await?
            } else {
                let session = session
                    .await
                    .map_err(|error| Error::internal(format!("failed to load session: {error}")))?;
                match SessionContext::new(session).user_id()? {
                    Some(user_id) => state.login.resolve_user(&user_id).await?,
                    None => None,
                }
            };
            principal
                .map(AuthenticatedUser)
                .ok_or_else(|| Error::unauthorized("login required"))
        })
    }
}
