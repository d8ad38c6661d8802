//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users/register {"email":"ada@example.org",...}
//! POST /api/v1/users/login {"email":"ada@example.org","password":"Secr3t!"}
//! GET  /api/v1/users/{id}
//! ```

use std::fmt;
use std::pin::pin;

use actix_multipart::Multipart;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{RegisterUserRequest, UpdateProfileRequest};
use crate::domain::{
    AVATAR_MAX_BYTES, AvatarImage, ConcurrencyStamp, Email, Error, FirstName, LastName,
    LoginCredentials, LoginValidationError, Password, User, UserId, UserName, UserProfile,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, bearer_token};
use crate::inbound::http::posts::{OffsetQuery, PostPageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id, parse_offset};

const ID: FieldName = FieldName::new("id");
const EMAIL: FieldName = FieldName::new("email");
const FIRST_NAME: FieldName = FieldName::new("firstName");
const LAST_NAME: FieldName = FieldName::new("lastName");
const USER_NAME: FieldName = FieldName::new("userName");
const PASSWORD: FieldName = FieldName::new("password");
const CONCURRENCY_STAMP: FieldName = FieldName::new("concurrencyStamp");
const AVATAR: FieldName = FieldName::new("avatar");

fn user_field_error(field: FieldName, err: &UserValidationError) -> Error {
    field_error(field, err.code(), err)
}

/// Login request body for `POST /api/v1/users/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::Email(inner) => user_field_error(EMAIL, inner),
        LoginValidationError::EmptyPassword => field_error(PASSWORD, "empty", err),
    }
}

/// Issued credentials returned by a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    /// Opaque bearer token; only its digest is stored server side.
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration body for `POST /api/v1/users/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
}

fn parse_profile(first: &str, last: &str, user_name: &str) -> Result<UserProfile, Error> {
    Ok(UserProfile {
        first_name: FirstName::new(first).map_err(|err| user_field_error(FIRST_NAME, &err))?,
        last_name: LastName::new(last).map_err(|err| user_field_error(LAST_NAME, &err))?,
        user_name: UserName::new(user_name).map_err(|err| user_field_error(USER_NAME, &err))?,
    })
}

impl TryFrom<RegisterRequest> for RegisterUserRequest {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let email = Email::new(value.email).map_err(|err| user_field_error(EMAIL, &err))?;
        let profile = parse_profile(&value.first_name, &value.last_name, &value.user_name)?;
        let password =
            Password::new(&value.password).map_err(|err| field_error(PASSWORD, err.code(), err))?;
        Ok(Self {
            email,
            profile,
            password,
        })
    }
}

/// Profile update body for `PUT /api/v1/users/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    /// Stamp read with the user; a stale value is rejected with `409`.
    #[serde(default)]
    pub concurrency_stamp: Option<String>,
}

fn parse_stamp(raw: Option<String>) -> Result<Option<ConcurrencyStamp>, Error> {
    raw.map(|value| {
        Uuid::parse_str(&value)
            .map(ConcurrencyStamp::from_uuid)
            .map_err(|_| field_error(CONCURRENCY_STAMP, "invalid_uuid", "concurrencyStamp must be a valid UUID"))
    })
    .transpose()
}

/// Public view of a user. The email and password hash never leave the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub avatar_url: Option<String>,
    #[schema(example = json!(["author"]))]
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub concurrency_stamp: Uuid,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            user_name: user.user_name().to_string(),
            avatar_url: user.avatar_url().map(str::to_owned),
            roles: user.roles().iter().map(|role| role.as_str().to_owned()).collect(),
            created_at: user.created_at(),
            concurrency_stamp: *user.concurrency_stamp().as_uuid(),
        }
    }
}

/// A user together with one page of their posts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPostResponse {
    pub user: UserResponse,
    pub posts: PostPageResponse,
}

/// Authenticate with email and password.
///
/// Returns a bearer token and also establishes a cookie session so browser
/// clients can skip the header.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())
        .map_err(|err| map_login_validation_error(&err))?;
    let success = state.login.login(&credentials).await?;
    session.persist_user(&success.user_id)?;
    Ok(web::Json(LoginResponse {
        user_id: *success.user_id.as_uuid(),
        access_token: success.access_token.expose().to_owned(),
        expires_at: success.expires_at,
    }))
}

/// Revoke the presented bearer token and end the cookie session.
///
/// Idempotent: a caller without a live token or session still gets 204, and
/// an unreadable `Authorization` header is ignored.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Token store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/users/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Ok(Some(token)) = bearer_token(&req) {
        state.login.logout(&token).await?;
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Create an account with the `author` role.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = String,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "User name or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegisterUserRequest::try_from(payload.into_inner())?;
    let id = state.user_commands.register(request).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/api/v1/users/{id}")))
        .json(id.as_uuid()))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_id(&path.into_inner(), ID)?;
    let user = state.users.get_user(&id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Report whether a user name is still free.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/available",
    params(("username" = String, Path, description = "Candidate user name")),
    responses(
        (status = 200, description = "Availability", body = bool),
        (status = 400, description = "Invalid user name", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "isUserNameAvailable",
    security([])
)]
#[get("/users/{username}/available")]
pub async fn user_name_available(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<bool>> {
    let user_name =
        UserName::new(path.into_inner()).map_err(|err| user_field_error(USER_NAME, &err))?;
    let available = state.users.is_user_name_available(&user_name).await?;
    Ok(web::Json(available))
}

/// Update the caller's own profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "User name taken or stale stamp", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = parse_id(&path.into_inner(), ID)?;
    let UpdateUserRequest {
        first_name,
        last_name,
        user_name,
        concurrency_stamp,
    } = payload.into_inner();
    let request = UpdateProfileRequest {
        user_id,
        profile: parse_profile(&first_name, &last_name, &user_name)?,
        expected_stamp: parse_stamp(concurrency_stamp)?,
    };
    state
        .user_commands
        .update_profile(user.principal(), request)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Multipart form accepted by the avatar upload.
#[derive(Debug, ToSchema)]
pub struct AvatarUpload {
    /// Image bytes; the part's own `Content-Type` selects the format.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

const FILE_PART: &str = "file";

fn is_multipart(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
}

async fn read_capped<S, E>(stream: S) -> Result<Vec<u8>, Error>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut stream = pin!(stream);
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| Error::invalid_request(format!("failed to read body: {err}")))?;
        if bytes.len() + chunk.len() > AVATAR_MAX_BYTES {
            return Err(field_error(
                AVATAR,
                "too_large",
                format!("avatar must be at most {AVATAR_MAX_BYTES} bytes"),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Read the `file` part of a multipart form, returning its content type and
/// bytes. Other parts are skipped.
async fn read_file_part(mut form: Multipart) -> Result<(String, Vec<u8>), Error> {
    while let Some(field) = form.next().await {
        let field = field
            .map_err(|err| Error::invalid_request(format!("malformed multipart body: {err}")))?;
        let content_type = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_default();
        let is_file = field.name() == Some(FILE_PART);
        let bytes = read_capped(field).await?;
        if is_file {
            return Ok((content_type, bytes));
        }
    }
    Err(field_error(
        AVATAR,
        "missing_file",
        format!("multipart body must contain a `{FILE_PART}` part"),
    ))
}

/// Upload a new avatar for the caller.
///
/// Accepts a `multipart/form-data` body with a `file` part, or the raw image
/// with its own `Content-Type`.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/avatar",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body(content(
        (AvatarUpload = "multipart/form-data"),
        (Vec<u8> = "image/png")
    )),
    responses(
        (status = 204, description = "Avatar stored"),
        (status = 400, description = "Unsupported or oversized image", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "uploadAvatar"
)]
#[post("/users/{id}/avatar")]
pub async fn upload_avatar(
    req: HttpRequest,
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = parse_id(&path.into_inner(), ID)?;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let (content_type, bytes) = if is_multipart(&content_type) {
        read_file_part(Multipart::new(req.headers(), payload)).await?
    } else {
        (content_type, read_capped(payload).await?)
    };
    let image = AvatarImage::new(&content_type, bytes)
        .map_err(|err| field_error(AVATAR, err.code(), err))?;
    state
        .user_commands
        .upload_avatar(user.principal(), &user_id, image)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Serve a user's avatar image.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/avatar",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Avatar image", content_type = "image/*", body = Vec<u8>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No avatar", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getAvatar",
    security([])
)]
#[get("/users/{id}/avatar")]
pub async fn get_avatar(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = parse_id(&path.into_inner(), ID)?;
    let avatar = state.users.avatar(&user_id).await?;
    Ok(HttpResponse::Ok()
        .content_type(avatar.format.content_type())
        .body(avatar.bytes))
}

/// A user with a page of their posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/posts",
    params(
        ("id" = Uuid, Path, description = "User identifier"),
        OffsetQuery
    ),
    responses(
        (status = 200, description = "User posts", body = UserPostResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserPosts",
    security([])
)]
#[get("/users/{id}/posts")]
pub async fn user_posts(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<OffsetQuery>,
) -> ApiResult<web::Json<UserPostResponse>> {
    let user_id: UserId = parse_id(&path.into_inner(), ID)?;
    let offset = parse_offset(query.into_inner().offset)?;
    let result = state.users.posts_by_user(&user_id, offset).await?;
    Ok(web::Json(UserPostResponse {
        user: UserResponse::from(&result.user),
        posts: PostPageResponse::from(result.posts),
    }))
}
