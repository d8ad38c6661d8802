//! Author API handlers.
//!
//! Authors are credited on posts. Their web URL is a slug derived from the
//! name and follows it on rename.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Author, AuthorId, AuthorName, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AuthorRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

impl TryFrom<AuthorRequest> for AuthorName {
    type Error = Error;

    fn try_from(value: AuthorRequest) -> Result<Self, Self::Error> {
        Self::new(value.name).map_err(|err| field_error(NAME, err.code(), err))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "ada-lovelace")]
    pub web_url: String,
}

impl From<&Author> for AuthorResponse {
    fn from(author: &Author) -> Self {
        Self {
            id: *author.id().as_uuid(),
            name: author.name().as_ref().to_owned(),
            web_url: author.web_url().as_ref().to_owned(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/authors",
    responses(
        (status = 200, description = "Authors", body = [AuthorResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authors"],
    operation_id = "listAuthors",
    security([])
)]
#[get("/authors")]
pub async fn list_authors(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<AuthorResponse>>> {
    let authors = state.authors.list().await?;
    Ok(web::Json(authors.iter().map(AuthorResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/authors/{id}",
    params(("id" = Uuid, Path, description = "Author identifier")),
    responses(
        (status = 200, description = "Author", body = AuthorResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authors"],
    operation_id = "getAuthor",
    security([])
)]
#[get("/authors/{id}")]
pub async fn get_author(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AuthorResponse>> {
    let id: AuthorId = parse_id(&path.into_inner(), ID)?;
    let author = state.authors.get(&id).await?;
    Ok(web::Json(AuthorResponse::from(&author)))
}

#[utoipa::path(
    post,
    path = "/api/v1/authors",
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Created", body = AuthorResponse,
            headers(("Location" = String, description = "URL of the new author"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authors"],
    operation_id = "createAuthor"
)]
#[post("/authors")]
pub async fn create_author(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<HttpResponse> {
    let name = AuthorName::try_from(payload.into_inner())?;
    let author = state.author_commands.create(name).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/api/v1/authors/{}", author.id())))
        .json(AuthorResponse::from(&author)))
}

/// Rename an author; the web URL is re-derived.
#[utoipa::path(
    put,
    path = "/api/v1/authors/{id}",
    params(("id" = Uuid, Path, description = "Author identifier")),
    request_body = AuthorRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authors"],
    operation_id = "updateAuthor"
)]
#[put("/authors/{id}")]
pub async fn update_author(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<HttpResponse> {
    let id: AuthorId = parse_id(&path.into_inner(), ID)?;
    let name = AuthorName::try_from(payload.into_inner())?;
    state.author_commands.update(&id, name).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an author. Posts crediting them keep their content.
#[utoipa::path(
    delete,
    path = "/api/v1/authors/{id}",
    params(("id" = Uuid, Path, description = "Author identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authors"],
    operation_id = "deleteAuthor"
)]
#[delete("/authors/{id}")]
pub async fn delete_author(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: AuthorId = parse_id(&path.into_inner(), ID)?;
    state.author_commands.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
