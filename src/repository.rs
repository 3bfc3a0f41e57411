use crate::error::ApiError;
use crate::models::{
    AuthorComment, AuthorPostRef, Comment, CommentNode, CommentStatus, CommentWithPost,
    CreateCommentRequest, CreatePostRequest, DashboardStats, MyPostsTotal, Post, PostDetail,
    PostRef, PostSummary, UpdateCommentRequest, UpdatePostRequest, User,
};
use crate::query::{ListingOptions, PostFilter};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
///
/// Authorization decisions (ownership, roles) live in the handlers; the repository
/// only offers the primitives they need, such as the ownership-scoped comment lookup.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users (read-only; the record is owned by the auth subsystem) ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    // --- Posts ---
    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid)
    -> Result<Post, ApiError>;
    /// Filtered, paged listing. Returns the page of rows plus the total count of
    /// rows matching the same predicate set.
    async fn list_posts(
        &self,
        filters: &[PostFilter],
        options: &ListingOptions,
    ) -> Result<(Vec<PostSummary>, i64), ApiError>;
    /// Atomically increments the view counter and reads the post with its approved
    /// comment tree in a single transaction. Returns None (and increments nothing)
    /// when the post does not exist.
    async fn get_post_detail(&self, id: Uuid) -> Result<Option<PostDetail>, ApiError>;
    async fn get_posts_by_author(&self, author_id: Uuid) -> Result<Vec<PostSummary>, ApiError>;
    async fn get_author_totals(&self, author_id: Uuid) -> Result<MyPostsTotal, ApiError>;
    /// Minimal projection used for the ownership check before update/delete.
    async fn get_post_author(&self, id: Uuid) -> Result<Option<Uuid>, ApiError>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest)
    -> Result<Option<Post>, ApiError>;
    /// Deletes a post; the store cascades the deletion to its comments.
    async fn delete_post(&self, id: Uuid) -> Result<bool, ApiError>;
    async fn post_exists(&self, id: Uuid) -> Result<bool, ApiError>;
    /// Statistics snapshot: all counters computed inside one transaction.
    async fn get_stats(&self) -> Result<DashboardStats, ApiError>;

    // --- Comments ---
    async fn create_comment(
        &self,
        req: CreateCommentRequest,
        author_id: Uuid,
    ) -> Result<Comment, ApiError>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, ApiError>;
    async fn get_comment_with_post(&self, id: Uuid) -> Result<Option<CommentWithPost>, ApiError>;
    async fn get_comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<AuthorComment>, ApiError>;
    /// Ownership-scoped lookup: filters by both comment id and expected author id
    /// in one step, so "missing" and "not yours" are indistinguishable to callers.
    async fn get_comment_scoped(
        &self,
        id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Comment>, ApiError>;
    async fn update_comment(
        &self,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, ApiError>;
    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, ApiError>;
    async fn set_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<Option<Comment>, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// assemble_comment_tree
///
/// Builds the nested reply tree from a flat result set of approved comments
/// belonging to one post. Top-level comments (parent_id IS NULL) are ordered
/// newest first, replies oldest first, and the tree is cut off below three
/// levels. A reply whose parent is not in the set (e.g. the parent is not
/// approved) never surfaces, matching the read-side APPROVED-only policy.
pub fn assemble_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    use std::collections::HashMap;

    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots: Vec<Comment> = Vec::new();

    for comment in comments {
        match comment.parent_id {
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    for replies in children.values_mut() {
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
    roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    fn attach(
        comment: Comment,
        children: &std::collections::HashMap<Uuid, Vec<Comment>>,
        depth: usize,
    ) -> CommentNode {
        let replies = if depth < 3 {
            children
                .get(&comment.id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|reply| attach(reply, children, depth + 1))
                .collect()
        } else {
            Vec::new()
        };
        CommentNode::from_comment(comment, replies)
    }

    roots
        .into_iter()
        .map(|root| attach(root, &children, 1))
        .collect()
}

// Column list shared by every post query.
const POST_COLUMNS: &str =
    "id, title, content, tags, status, is_featured, views, author_id, created_at, updated_at";

const COMMENT_COLUMNS: &str =
    "id, content, status, author_id, post_id, parent_id, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
/// Uses the runtime sqlx query API and `QueryBuilder` for safe parameterization of the
/// dynamic listing predicates.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards in a search needle so it only ever matches literally,
/// keeping the SQL rendering in agreement with `PostFilter::matches`.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Renders one typed predicate into the WHERE clause. Every user-supplied value
/// goes through `push_bind`, never string interpolation.
fn push_filter(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &PostFilter) {
    match filter {
        PostFilter::AuthorIs(author_id) => {
            builder.push("p.author_id = ");
            builder.push_bind(*author_id);
        }
        PostFilter::StatusIs(status) => {
            builder.push("p.status = ");
            builder.push_bind(*status);
        }
        PostFilter::FeaturedIs(flag) => {
            builder.push("p.is_featured = ");
            builder.push_bind(*flag);
        }
        PostFilter::HasAllTags(tags) => {
            // Array containment: the post's tags must be a superset of the supplied tags.
            builder.push("p.tags @> ");
            builder.push_bind(tags.clone());
        }
        PostFilter::TextSearch(needle) => {
            let pattern = format!("%{}%", escape_like(needle));
            builder.push("(p.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.content ILIKE ");
            builder.push_bind(pattern);
            builder.push(" OR ");
            builder.push_bind(needle.clone());
            builder.push(" = ANY(p.tags))");
        }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filters: &[PostFilter]) {
    for filter in filters {
        builder.push(" AND ");
        push_filter(builder, filter);
    }
}

// Joined row shape for the comment projections. Mapped manually into the
// response models, the same way a comment is enriched with its post join.
#[derive(FromRow)]
struct CommentPostRow {
    id: Uuid,
    content: String,
    status: CommentStatus,
    author_id: Uuid,
    post_id: Uuid,
    parent_id: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    post_title: String,
    post_views: i32,
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, role, email_verified, status FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_post(
        &self,
        req: CreatePostRequest,
        author_id: Uuid,
    ) -> Result<Post, ApiError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, tags, status, is_featured, views, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, $7, NOW(), NOW()) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.content)
        .bind(req.tags)
        .bind(req.status)
        .bind(req.is_featured)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    /// list_posts
    ///
    /// Implements the conjunctive predicate set with QueryBuilder for safe
    /// parameterization. The ORDER BY column comes from the `SortField` whitelist,
    /// so no client-supplied string is ever spliced into SQL.
    async fn list_posts(
        &self,
        filters: &[PostFilter],
        options: &ListingOptions,
    ) -> Result<(Vec<PostSummary>, i64), ApiError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT p.id, p.title, p.content, p.tags, p.status, p.is_featured, p.views, \
                    p.author_id, p.created_at, p.updated_at, \
                    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
             FROM posts p WHERE TRUE",
        );
        push_filters(&mut builder, filters);
        builder.push(format!(
            " ORDER BY p.{} {}",
            options.sort_by.column(),
            options.sort_order.keyword()
        ));
        builder.push(" LIMIT ");
        builder.push_bind(options.take);
        builder.push(" OFFSET ");
        builder.push_bind(options.skip);

        let rows = builder
            .build_query_as::<PostSummary>()
            .fetch_all(&self.pool)
            .await?;

        // Total count over the same predicate set, without paging.
        let mut count_builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE TRUE");
        push_filters(&mut count_builder, filters);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// get_post_detail
    ///
    /// The view increment and the read happen inside one transaction so no reader
    /// observes a torn view count relative to the returned snapshot. When the id
    /// does not exist the transaction is rolled back and nothing is incremented.
    async fn get_post_detail(&self, id: Uuid) -> Result<Option<PostDetail>, ApiError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE posts SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let post =
            sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        // One flat fetch of every approved comment on the post; the reply tree
        // (top-level desc, replies asc, depth <= 3) is assembled in memory.
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = $1 AND status = 'APPROVED'"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let comment_count = comments.len() as i64;
        let tree = assemble_comment_tree(comments);

        Ok(Some(PostDetail {
            id: post.id,
            title: post.title,
            content: post.content,
            tags: post.tags,
            status: post.status,
            is_featured: post.is_featured,
            views: post.views,
            author_id: post.author_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            comments: tree,
            comment_count,
        }))
    }

    async fn get_posts_by_author(&self, author_id: Uuid) -> Result<Vec<PostSummary>, ApiError> {
        let rows = sqlx::query_as::<_, PostSummary>(
            "SELECT p.id, p.title, p.content, p.tags, p.status, p.is_featured, p.views, \
                    p.author_id, p.created_at, p.updated_at, \
                    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
             FROM posts p WHERE p.author_id = $1 ORDER BY p.created_at DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_author_totals(&self, author_id: Uuid) -> Result<MyPostsTotal, ApiError> {
        let (count, average_views): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(id), COALESCE(AVG(views), 0)::float8 FROM posts WHERE author_id = $1",
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(MyPostsTotal {
            count,
            average_views,
        })
    }

    async fn get_post_author(&self, id: Uuid) -> Result<Option<Uuid>, ApiError> {
        let author = sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    /// update_post
    ///
    /// Partial update via COALESCE: a column is only touched when the corresponding
    /// field in `req` is `Some`. Ownership/role checks happen in the handler before
    /// this is called.
    async fn update_post(
        &self,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts \
             SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 tags = COALESCE($4, tags), \
                 status = COALESCE($5, status), \
                 is_featured = COALESCE($6, is_featured), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.tags)
        .bind(req.status)
        .bind(req.is_featured)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, ApiError> {
        // Comment cleanup is the store's job (ON DELETE CASCADE on comments.post_id).
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn post_exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// get_stats
    ///
    /// Compiles all dashboard counters against a single transactional snapshot so
    /// the sub-counts cannot drift apart under concurrent writers.
    async fn get_stats(&self) -> Result<DashboardStats, ApiError> {
        let mut tx = self.pool.begin().await?;

        let total_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&mut *tx)
            .await?;
        let published_posts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = 'PUBLISHED'")
                .fetch_one(&mut *tx)
                .await?;
        let draft_posts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = 'DRAFT'")
                .fetch_one(&mut *tx)
                .await?;
        let archived_posts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = 'ARCHIVE'")
                .fetch_one(&mut *tx)
                .await?;
        let total_comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&mut *tx)
            .await?;
        let approved_comments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE status = 'APPROVED'")
                .fetch_one(&mut *tx)
                .await?;
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let admin_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'ADMIN'")
                .fetch_one(&mut *tx)
                .await?;
        let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'USER'")
            .fetch_one(&mut *tx)
            .await?;
        let total_views: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(views), 0)::bigint FROM posts")
                .fetch_one(&mut *tx)
                .await?;
        let average_views: f64 =
            sqlx::query_scalar("SELECT COALESCE(AVG(views), 0)::float8 FROM posts")
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            total_posts,
            published_posts,
            draft_posts,
            archived_posts,
            total_comments,
            approved_comments,
            total_users,
            admin_count,
            user_count,
            total_views,
            average_views,
        })
    }

    async fn create_comment(
        &self,
        req: CreateCommentRequest,
        author_id: Uuid,
    ) -> Result<Comment, ApiError> {
        // Status column omitted: the store default (PENDING) applies.
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (id, content, author_id, post_id, parent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.content)
        .bind(author_id)
        .bind(req.post_id)
        .bind(req.parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comment_with_post(&self, id: Uuid) -> Result<Option<CommentWithPost>, ApiError> {
        let row = sqlx::query_as::<_, CommentPostRow>(
            "SELECT c.id, c.content, c.status, c.author_id, c.post_id, c.parent_id, \
                    c.created_at, c.updated_at, p.title AS post_title, p.views AS post_views \
             FROM comments c JOIN posts p ON c.post_id = p.id WHERE c.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CommentWithPost {
            id: r.id,
            content: r.content,
            status: r.status,
            author_id: r.author_id,
            post_id: r.post_id,
            parent_id: r.parent_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            post: PostRef {
                id: r.post_id,
                title: r.post_title,
                views: r.post_views,
            },
        }))
    }

    async fn get_comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<AuthorComment>, ApiError> {
        let rows = sqlx::query_as::<_, CommentPostRow>(
            "SELECT c.id, c.content, c.status, c.author_id, c.post_id, c.parent_id, \
                    c.created_at, c.updated_at, p.title AS post_title, p.views AS post_views \
             FROM comments c JOIN posts p ON c.post_id = p.id \
             WHERE c.author_id = $1 ORDER BY c.created_at DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AuthorComment {
                id: r.id,
                content: r.content,
                status: r.status,
                author_id: r.author_id,
                post_id: r.post_id,
                parent_id: r.parent_id,
                created_at: r.created_at,
                updated_at: r.updated_at,
                post: AuthorPostRef {
                    id: r.post_id,
                    title: r.post_title,
                },
            })
            .collect())
    }

    async fn get_comment_scoped(
        &self,
        id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND author_id = $2"
        ))
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments \
             SET content = COALESCE($2, content), \
                 status = COALESCE($3, status), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(req.content)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn set_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(id: u128, parent: Option<u128>, offset_secs: i64) -> Comment {
        Comment {
            id: Uuid::from_u128(id),
            content: format!("comment {id}"),
            status: CommentStatus::Approved,
            author_id: Uuid::from_u128(99),
            post_id: Uuid::from_u128(1),
            parent_id: parent.map(Uuid::from_u128),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            updated_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn tree_orders_top_level_desc_and_replies_asc() {
        let flat = vec![
            comment(1, None, 0),
            comment(2, None, 10),
            comment(3, Some(2), 20),
            comment(4, Some(2), 15),
        ];
        let tree = assemble_comment_tree(flat);

        // Newest top-level comment first.
        assert_eq!(tree[0].id, Uuid::from_u128(2));
        assert_eq!(tree[1].id, Uuid::from_u128(1));
        // Replies oldest first.
        assert_eq!(tree[0].replies[0].id, Uuid::from_u128(4));
        assert_eq!(tree[0].replies[1].id, Uuid::from_u128(3));
    }

    #[test]
    fn tree_is_cut_off_below_three_levels() {
        let flat = vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(2), 2),
            comment(4, Some(3), 3), // fourth level, must be dropped
        ];
        let tree = assemble_comment_tree(flat);

        let level2 = &tree[0].replies[0];
        let level3 = &level2.replies[0];
        assert_eq!(level3.id, Uuid::from_u128(3));
        assert!(level3.replies.is_empty());
    }

    #[test]
    fn like_wildcards_are_escaped_literally() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn orphaned_replies_never_surface() {
        // Parent 7 is not in the approved set, so its reply is unreachable.
        let flat = vec![comment(1, None, 0), comment(2, Some(7), 1)];
        let tree = assemble_comment_tree(flat);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].replies.is_empty());
    }
}
