//! Posts API handlers.
//!
//! ```text
//! GET  /api/v1/posts?offset=0
//! POST /api/v1/posts {"title":"Hello","summary":"First post","body":"..."}
//! ```

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    AuthorId, Error, Page, Post, PostBody, PostContent, PostId, PostValidationError, Summary,
    Title,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id, parse_offset};

const ID: FieldName = FieldName::new("id");
const AUTHOR_ID: FieldName = FieldName::new("authorId");

/// Paging parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OffsetQuery {
    /// Number of items to skip; defaults to zero.
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

/// Post payload for create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[schema(example = "Hello, world")]
    pub title: String,
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub author_id: Option<String>,
}

fn post_field_error(err: &PostValidationError) -> Error {
    field_error(FieldName::new(err.field()), err.code(), err)
}

impl TryFrom<PostRequest> for PostContent {
    type Error = Error;

    fn try_from(value: PostRequest) -> Result<Self, Self::Error> {
        let author_id = value
            .author_id
            .map(|raw| parse_id::<AuthorId>(&raw, AUTHOR_ID))
            .transpose()?;
        Ok(Self {
            title: Title::new(value.title).map_err(|err| post_field_error(&err))?,
            summary: Summary::new(value.summary).map_err(|err| post_field_error(&err))?,
            body: PostBody::new(value.body).map_err(|err| post_field_error(&err))?,
            author_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: *post.id().as_uuid(),
            user_id: *post.user_id().as_uuid(),
            author_id: post.author_id().map(|id| *id.as_uuid()),
            title: post.title().as_ref().to_owned(),
            summary: post.summary().as_ref().to_owned(),
            body: post.body().as_ref().to_owned(),
            created_at: post.created_at(),
            updated_at: post.updated_at(),
        }
    }
}

/// One page of posts, newest first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub items: Vec<PostResponse>,
    pub offset: i64,
    pub page_size: i64,
    pub total: i64,
    pub has_more: bool,
}

impl From<Page<Post>> for PostPageResponse {
    fn from(page: Page<Post>) -> Self {
        let has_more = page.has_more();
        Self {
            items: page.items.iter().map(PostResponse::from).collect(),
            offset: page.offset.get(),
            page_size: page.page_size,
            total: page.total,
            has_more,
        }
    }
}

/// List posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(OffsetQuery),
    responses(
        (status = 200, description = "Posts", body = PostPageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    query: web::Query<OffsetQuery>,
) -> ApiResult<web::Json<PostPageResponse>> {
    let offset = parse_offset(query.into_inner().offset)?;
    let page = state.posts.list(offset).await?;
    Ok(web::Json(PostPageResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let id: PostId = parse_id(&path.into_inner(), ID)?;
    let post = state.posts.get(&id).await?;
    Ok(web::Json(PostResponse::from(&post)))
}

/// Publish a post as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Created", body = PostResponse,
            headers(("Location" = String, description = "URL of the new post"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Author not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let content = PostContent::try_from(payload.into_inner())?;
    let post = state.post_commands.create(user.principal(), content).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/api/v1/posts/{}", post.id())))
        .json(PostResponse::from(&post)))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = PostRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let id: PostId = parse_id(&path.into_inner(), ID)?;
    let content = PostContent::try_from(payload.into_inner())?;
    state
        .post_commands
        .update(user.principal(), &id, content)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a post and its comments.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: PostId = parse_id(&path.into_inner(), ID)?;
    state.post_commands.delete(user.principal(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
