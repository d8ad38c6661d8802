//! Comment API handlers.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Comment, CommentBody, CommentId, Error, PostId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id};

const ID: FieldName = FieldName::new("id");
const BODY: FieldName = FieldName::new("body");

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    #[schema(example = "Great read!")]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: *comment.id().as_uuid(),
            post_id: *comment.post_id().as_uuid(),
            user_id: *comment.user_id().as_uuid(),
            body: comment.body().as_ref().to_owned(),
            created_at: comment.created_at(),
        }
    }
}

/// Comments on a post, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Comments", body = [CommentResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Post not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/posts/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CommentResponse>>> {
    let post_id: PostId = parse_id(&path.into_inner(), ID)?;
    let comments = state.comments.list_for_post(&post_id).await?;
    Ok(web::Json(comments.iter().map(CommentResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Created", body = CommentResponse,
            headers(("Location" = String, description = "URL of the new comment"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Post not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/posts/{id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let post_id: PostId = parse_id(&path.into_inner(), ID)?;
    let body = CommentBody::new(payload.into_inner().body)
        .map_err(|err| field_error(BODY, err.code(), err))?;
    let comment = state
        .comment_commands
        .create(user.principal(), &post_id, body)
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/api/v1/comments/{}", comment.id())))
        .json(CommentResponse::from(&comment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment identifier")),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CommentResponse>> {
    let id: CommentId = parse_id(&path.into_inner(), ID)?;
    let comment = state.comments.get(&id).await?;
    Ok(web::Json(CommentResponse::from(&comment)))
}

/// Remove a comment. Allowed for its writer, the post owner and admins.
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CommentId = parse_id(&path.into_inner(), ID)?;
    state.comment_commands.delete(user.principal(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
