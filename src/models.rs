use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Domain Enums (Mapped to Postgres enum types) ---

/// PostStatus
///
/// Publication lifecycle of a post. Stored as the Postgres enum `post_status`
/// and serialized in SCREAMING case on the wire (DRAFT | PUBLISHED | ARCHIVE).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "post_status", rename_all = "UPPERCASE")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archive,
}

/// CommentStatus
///
/// Moderation state of a comment. New comments default to PENDING at the store
/// level; only APPROVED comments are surfaced by public reads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "comment_status", rename_all = "UPPERCASE")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UserRole
///
/// The RBAC field carried by the external auth subsystem's user record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The user's canonical identity record, owned by the external auth subsystem.
/// This core only reads it: for session resolution, the email-verification gate,
/// and ownership comparisons. Never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    // Gate: unverified users are rejected with 403 before reaching any handler.
    pub email_verified: bool,
    // Active flag. Disabled users (false) are treated as missing by getMyPosts.
    pub status: bool,
}

/// Post
///
/// A blog post row from the `posts` table. `author_id` is immutable after
/// creation and `views` only ever increases.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    // Postgres TEXT[] column.
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub is_featured: bool,
    pub views: i32,
    pub author_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PostSummary
///
/// Listing row: all post columns plus the per-post comment count computed by the
/// listing query. Kept flat so sqlx `FromRow` can map the joined projection directly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub is_featured: bool,
    pub views: i32,
    pub author_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub comment_count: i64,
}

/// Comment
///
/// A comment row from the `comments` table. `parent_id`, when present, must
/// reference an existing comment; deleting a post cascades to its comments
/// at the store level.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CommentNode
///
/// A comment with its nested (approved-only) replies, assembled by the repository
/// up to three levels deep for the post detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[schema(no_recursion)]
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn from_comment(comment: Comment, replies: Vec<CommentNode>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            status: comment.status,
            author_id: comment.author_id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies,
        }
    }
}

/// PostDetail
///
/// The post detail view: the post itself, its approved comment tree (<= 3 levels,
/// top-level newest first, replies oldest first) and the approved comment count,
/// all read from a single transactional snapshot after the view increment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub is_featured: bool,
    pub views: i32,
    pub author_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentNode>,
    pub comment_count: i64,
}

// --- Parent-Post Projections ---

/// Minimal parent-post projection returned with a single comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PostRef {
    pub id: Uuid,
    pub title: String,
    pub views: i32,
}

/// Even smaller projection used by the per-author comment listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPostRef {
    pub id: Uuid,
    pub title: String,
}

/// CommentWithPost
///
/// A comment enriched with its parent post's `{id, title, views}` projection
/// (a join operation in the repository).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithPost {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub post: PostRef,
}

/// AuthorComment
///
/// A comment in the per-author listing, carrying the `{id, title}` parent-post projection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthorComment {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub post: AuthorPostRef,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for submitting a new post (POST /posts). The author is always the
/// authenticated caller; `status` and `is_featured` are accepted as supplied here —
/// the admin-only featuring restriction is enforced on update, not create.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub is_featured: bool,
}

/// UpdatePostRequest
///
/// Partial update payload for PATCH /posts/{id}.
///
/// *Optimization*: Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included in the JSON payload.
/// For non-admin callers, `is_featured` is stripped before the update is applied.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment. `post_id` must reference an existing
/// post and `parent_id`, when given, an existing comment; the new comment's
/// moderation status is the store default (PENDING).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub post_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

/// UpdateCommentRequest
///
/// Partial update payload for PATCH /comments/{id} (owner-scoped).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentStatus>,
}

/// ModerateCommentRequest
///
/// Admin-only status transition payload for PATCH /comments/{id}/moderate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ModerateCommentRequest {
    pub status: CommentStatus,
}

// --- Response Envelopes (Output Schemas) ---

/// Pagination
///
/// The listing envelope. `page` is reconstructed from skip/take rather than carried
/// from the input, and `total_pages = ceil(total / limit)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Page of posts plus the pagination envelope (GET /posts).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostListResponse {
    pub data: Vec<PostSummary>,
    pub pagination: Pagination,
}

/// Aggregate over an author's posts: post count and average view count.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MyPostsTotal {
    pub count: i64,
    pub average_views: f64,
}

/// Response for GET /posts/my-posts: the author's posts plus the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MyPostsResponse {
    pub data: Vec<PostSummary>,
    pub total: MyPostsTotal,
}

/// DashboardStats
///
/// Output schema for the administrative statistics endpoint (GET /admin/stats).
/// Every counter is computed against the same transactional snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub archived_posts: i64,
    pub total_comments: i64,
    pub approved_comments: i64,
    pub total_users: i64,
    pub admin_count: i64,
    pub user_count: i64,
    pub total_views: i64,
    pub average_views: f64,
}
