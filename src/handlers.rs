use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        AuthorComment, Comment, CommentWithPost, CreateCommentRequest, CreatePostRequest,
        DashboardStats, ModerateCommentRequest, MyPostsResponse, Pagination, Post, PostDetail,
        PostListResponse, PostStatus, UpdateCommentRequest, UpdatePostRequest,
    },
    query::{ListingOptions, PostFilter, SortOrder, split_tags},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

// --- Query Parameter Structs ---

/// ListPostsQuery
///
/// The accepted query parameters for the public post listing endpoint (GET /posts).
/// Used by Axum's Query extractor to safely bind HTTP query parameters for filtering,
/// searching, paging, and sorting. Every field is optional; the normalizer and filter
/// builder in `query` supply the defaults.
#[derive(Debug, Deserialize, utoipa::IntoParams, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    /// Case-insensitive search over title and content, or an exact tag match.
    pub search: Option<String>,
    /// Comma-separated tag list; a post must carry every one of them.
    pub tags: Option<String>,
    pub is_featured: Option<bool>,
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// One of createdAt | updatedAt | title | views; anything else falls back to createdAt.
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

// --- Post Handlers ---

/// health_check
///
/// [Public Route] Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// create_post
///
/// [Authenticated Route] Creates a new post owned by the requesting user.
/// The author is always the caller resolved by the `AuthUser` extractor; a client
/// can never create a post on someone else's behalf.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses((status = 201, description = "Post Created", body = Post))
)]
pub async fn create_post(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.repo.create_post(payload, id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// list_posts
///
/// [Public Route] Filtered, paged post listing. All filters combine conjunctively;
/// absent parameters impose no restriction. The pagination envelope reports the
/// total count over the full filtered set, not just the returned page.
#[utoipa::path(
    get,
    path = "/posts",
    params(ListPostsQuery),
    responses((status = 200, description = "Posts", body = PostListResponse))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let filters = PostFilter::from_parts(
        params.author_id,
        params.status,
        params.is_featured,
        split_tags(params.tags.as_deref()),
        params.search,
    );
    let options = ListingOptions::from_query(
        params.page,
        params.limit,
        params.sort_by.as_deref(),
        params.sort_order,
    );

    let (data, total) = state.repo.list_posts(&filters, &options).await?;

    let pagination = Pagination {
        total,
        limit: options.take,
        page: options.page(),
        total_pages: (total + options.take - 1) / options.take,
    };

    Ok(Json(PostListResponse { data, pagination }))
}

/// get_post
///
/// [Public Route] Fetches a single post together with its approved comment tree.
/// Every successful read increments the post's view counter; increment and read
/// happen atomically in the repository, and a missing id increments nothing.
#[utoipa::path(
    get,
    path = "/posts/{post_id}",
    responses(
        (status = 200, description = "Post Detail", body = PostDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostDetail>, ApiError> {
    let detail = state
        .repo
        .get_post_detail(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    Ok(Json(detail))
}

/// get_my_posts
///
/// [Authenticated Route] Lists all posts owned by the requesting user (drafts
/// included) plus the author aggregate (post count, average views). A deactivated
/// account is treated as missing.
#[utoipa::path(
    get,
    path = "/posts/my-posts",
    responses(
        (status = 200, description = "My Posts", body = MyPostsResponse),
        (status = 404, description = "User Not Found")
    )
)]
pub async fn get_my_posts(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MyPostsResponse>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .filter(|u| u.status)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let data = state.repo.get_posts_by_author(user.id).await?;
    let total = state.repo.get_author_totals(user.id).await?;

    Ok(Json(MyPostsResponse { data, total }))
}

/// update_post
///
/// [Authenticated Route] Partial update of a post.
///
/// *Authorization*: The caller must be the post's author or an admin. Only admins
/// may change the featured flag; for everyone else `isFeatured` is stripped from
/// the payload before the update is applied, so the rest of the update still succeeds.
#[utoipa::path(
    patch,
    path = "/posts/{post_id}",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post Updated", body = Post),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(mut payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let author_id = state
        .repo
        .get_post_author(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if author_id != auth_user.id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(
            "You are not authorized to update this post".to_string(),
        ));
    }

    if !auth_user.is_admin() {
        payload.is_featured = None;
    }

    let post = state
        .repo
        .update_post(post_id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Deletes a post. Same authorization rule as update:
/// author or admin. The store cascades the deletion to the post's comments.
#[utoipa::path(
    delete,
    path = "/posts/{post_id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = state
        .repo
        .get_post_author(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if author_id != auth_user.id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this post".to_string(),
        ));
    }

    if !state.repo.delete_post(post_id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully"
    })))
}

// --- Comment Handlers ---

/// create_comment
///
/// [Authenticated Route] Posts a new comment (or a reply, when `parentId` is given).
/// Both the target post and the parent comment must exist. The new comment always
/// starts in PENDING, regardless of any status the client supplies.
#[utoipa::path(
    post,
    path = "/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Created", body = Comment),
        (status = 404, description = "Post or Parent Not Found")
    )
)]
pub async fn create_comment(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.repo.post_exists(payload.post_id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    if let Some(parent_id) = payload.parent_id {
        state
            .repo
            .get_comment(parent_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Parent comment not found".to_string()))?;
    }

    let comment = state.repo.create_comment(payload, id).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// get_comment
///
/// [Public Route] Fetches a single comment together with its parent post's
/// `{id, title, views}` projection.
#[utoipa::path(
    get,
    path = "/comments/{comment_id}",
    responses(
        (status = 200, description = "Comment", body = CommentWithPost),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<CommentWithPost>, ApiError> {
    let comment = state
        .repo
        .get_comment_with_post(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    Ok(Json(comment))
}

/// get_comments_by_author
///
/// [Public Route] All comments written by one author, newest first, each carrying
/// its parent post's `{id, title}` projection.
#[utoipa::path(
    get,
    path = "/comments/author/{author_id}",
    responses((status = 200, description = "Author Comments", body = [AuthorComment]))
)]
pub async fn get_comments_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<AuthorComment>>, ApiError> {
    let comments = state.repo.get_comments_by_author(author_id).await?;
    Ok(Json(comments))
}

/// update_comment
///
/// [Authenticated Route] Owner-scoped partial update of a comment.
///
/// *Authorization*: The lookup is scoped by both comment id and the caller's id,
/// so a comment that exists but belongs to someone else is indistinguishable from
/// one that does not exist. Both cases answer 404 "Comment not found".
#[utoipa::path(
    patch,
    path = "/comments/{comment_id}",
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment Updated", body = Comment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    state
        .repo
        .get_comment_scoped(comment_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let comment = state
        .repo
        .update_comment(comment_id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

/// delete_comment
///
/// [Authenticated Route] Owner-scoped deletion. Same non-revealing 404 as update.
/// Returns the deleted comment entity.
#[utoipa::path(
    delete,
    path = "/comments/{comment_id}",
    responses(
        (status = 200, description = "Comment Deleted", body = Comment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Comment>, ApiError> {
    state
        .repo
        .get_comment_scoped(comment_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let comment = state
        .repo
        .delete_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

/// moderate_comment
///
/// [Authenticated Route, Admin-Only] Sets a comment's moderation status.
/// A transition to the status the comment already has is rejected as a
/// business-rule violation rather than silently accepted.
#[utoipa::path(
    patch,
    path = "/comments/{comment_id}/moderate",
    request_body = ModerateCommentRequest,
    responses(
        (status = 200, description = "Comment Moderated", body = Comment),
        (status = 400, description = "Redundant Transition"),
        (status = 403, description = "Admin Only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn moderate_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<ModerateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    if !auth_user.is_admin() {
        return Err(ApiError::Forbidden("Forbidden access".to_string()));
    }

    let current = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if current.status == payload.status {
        return Err(ApiError::DomainRule(format!(
            "Comment is already set to {}",
            payload.status
        )));
    }

    let comment = state
        .repo
        .set_comment_status(comment_id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

// --- Admin Handlers ---

/// get_stats
///
/// [Admin Route] The dashboard statistics snapshot: post counts by status, comment
/// and user counts, and view totals, all computed against one consistent snapshot.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Dashboard Stats", body = DashboardStats),
        (status = 403, description = "Admin Only")
    )
)]
pub async fn get_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    if !auth_user.is_admin() {
        return Err(ApiError::Forbidden("Forbidden access".to_string()));
    }

    let stats = state.repo.get_stats().await?;
    Ok(Json(stats))
}
