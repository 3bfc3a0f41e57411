use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Post, PostStatus};

// --- Pagination / Sort Normalizer ---

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// SortField
///
/// The closed whitelist of sortable columns. Client-supplied `sortBy` strings are
/// matched against this enum; anything unrecognized falls back to `CreatedAt`, so
/// normalization stays a total function and no raw field name ever reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
}

impl SortField {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("createdAt") => Self::CreatedAt,
            Some("updatedAt") => Self::UpdatedAt,
            Some("title") => Self::Title,
            Some("views") => Self::Views,
            _ => Self::CreatedAt,
        }
    }

    /// The actual column name, safe to splice into ORDER BY.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Views => "views",
        }
    }
}

/// Sort direction, deserialized from the `sortOrder` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// ListingOptions
///
/// Bounded, typed paging/sorting directives produced from raw query parameters.
/// Defaults: page 1, limit 10, createdAt desc. Non-positive page/limit values are
/// clamped back to the defaults. Pure computation, never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub skip: i64,
    pub take: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ListingOptions {
    pub fn from_query(
        page: Option<i64>,
        limit: Option<i64>,
        sort_by: Option<&str>,
        sort_order: Option<SortOrder>,
    ) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);

        Self {
            skip: (page - 1) * limit,
            take: limit,
            sort_by: SortField::parse(sort_by),
            sort_order: sort_order.unwrap_or_default(),
        }
    }

    /// The page number reconstructed from skip/take. The pagination envelope carries
    /// this value rather than the raw input so the two can never disagree.
    pub fn page(&self) -> i64 {
        self.skip / self.take + 1
    }
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self::from_query(None, None, None, None)
    }
}

// --- Filter Builder ---

/// PostFilter
///
/// The closed set of listing predicates. Filters of different kinds are always
/// combined conjunctively (an AND-list); the only disjunction lives inside
/// `TextSearch`, which matches title-contains OR content-contains (both
/// case-insensitive) OR an exact tag.
///
/// An empty filter list is valid and means "no restriction".
#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    AuthorIs(Uuid),
    StatusIs(PostStatus),
    FeaturedIs(bool),
    /// Every supplied tag must be present on the post.
    HasAllTags(Vec<String>),
    TextSearch(String),
}

impl PostFilter {
    /// Assembles the conjunctive predicate list from the optional raw inputs.
    /// Absent inputs are omitted entirely rather than defaulted to match-all
    /// predicates. `FeaturedIs` is only emitted for an explicit boolean.
    pub fn from_parts(
        author_id: Option<Uuid>,
        status: Option<PostStatus>,
        is_featured: Option<bool>,
        tags: Vec<String>,
        search: Option<String>,
    ) -> Vec<PostFilter> {
        let mut filters = Vec::new();

        if let Some(author_id) = author_id {
            filters.push(PostFilter::AuthorIs(author_id));
        }
        if let Some(status) = status {
            filters.push(PostFilter::StatusIs(status));
        }
        if let Some(flag) = is_featured {
            filters.push(PostFilter::FeaturedIs(flag));
        }
        if !tags.is_empty() {
            filters.push(PostFilter::HasAllTags(tags));
        }
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            filters.push(PostFilter::TextSearch(search));
        }

        filters
    }

    /// The canonical matching semantics for a single predicate. The Postgres
    /// repository renders the same semantics as SQL; this form is what listing
    /// behavior is specified and tested against.
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::AuthorIs(author_id) => post.author_id == *author_id,
            Self::StatusIs(status) => post.status == *status,
            Self::FeaturedIs(flag) => post.is_featured == *flag,
            Self::HasAllTags(tags) => tags.iter().all(|t| post.tags.contains(t)),
            Self::TextSearch(needle) => {
                let needle_lower = needle.to_lowercase();
                post.title.to_lowercase().contains(&needle_lower)
                    || post.content.to_lowercase().contains(&needle_lower)
                    || post.tags.iter().any(|t| t == needle)
            }
        }
    }
}

/// Splits the raw comma-separated `tags` query parameter into trimmed,
/// non-empty tag strings.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
