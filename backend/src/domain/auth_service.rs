//! Sign-in service issuing opaque access tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, LoginSuccess, PasswordHasher, TokenRepository, TokenRepositoryError,
    UserRepository,
};
use crate::domain::user_service::map_user_repository_error;
use crate::domain::{AccessToken, Error, LoginCredentials, Principal, User, UserId, UserToken};

/// Default lifetime of an access token, in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

fn map_token_error(error: TokenRepositoryError) -> Error {
    match error {
        TokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        TokenRepositoryError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn principal_of(user: &User) -> Principal {
    Principal::new(user.id(), user.roles().to_vec())
}

/// Authentication service implementing [`LoginService`].
#[derive(Clone)]
pub struct AuthService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    token_ttl: Duration,
}

impl<U, T, H> AuthService<U, T, H> {
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            tokens,
            hasher,
            clock,
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    #[must_use]
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

#[async_trait]
impl<U, T, H> LoginService for AuthService<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginSuccess, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
        else {
            debug!("login for unknown email");
            return Err(invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        if !verified {
            debug!(user_id = %user.id(), "login with wrong password");
            return Err(invalid_credentials());
        }

        let access_token = AccessToken::generate();
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| Error::internal("token expiry out of range"))?;
        self.tokens
            .store(&UserToken::access(user.id(), access_token.digest(), expires_at))
            .await
            .map_err(map_token_error)?;

        info!(user_id = %user.id(), %expires_at, "issued access token");
        Ok(LoginSuccess {
            user_id: user.id(),
            access_token,
            expires_at,
        })
    }

    async fn resolve_token(&self, token: &AccessToken) -> Result<Option<Principal>, Error> {
        let Some(stored) = self
            .tokens
            .find_active(&token.digest(), self.clock.utc())
            .await
            .map_err(map_token_error)?
        else {
            return Ok(None);
        };
        self.resolve_user(&stored.user_id).await
    }

    async fn resolve_user(&self, user_id: &UserId) -> Result<Option<Principal>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?;
        Ok(user.as_ref().map(principal_of))
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), Error> {
        self.tokens
            .revoke(&token.digest())
            .await
            .map_err(map_token_error)
    }
}
