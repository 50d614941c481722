//! Blog query model: filter, sort and pagination
//!
//! Services describe what they want with a [`BlogQuery`]; each store adapter
//! translates it into its own query language.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::models::{Blog, BlogState};
use crate::{QuillError, Result};

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: u64 = 20;

/// Fields a blog listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ReadCount,
    ReadingTime,
    UpdatedAt,
    CreatedAt,
}

impl SortField {
    /// Case-insensitive match against `read_count`, `reading_time`,
    /// `updatedat` and `createdat`
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "read_count" => Some(Self::ReadCount),
            "reading_time" => Some(Self::ReadingTime),
            "updatedat" => Some(Self::UpdatedAt),
            "createdat" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    /// Column name in the relational schema
    pub fn column(&self) -> &'static str {
        match self {
            Self::ReadCount => "read_count",
            Self::ReadingTime => "reading_time",
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
        }
    }

    fn compare(&self, a: &Blog, b: &Blog) -> Ordering {
        match self {
            Self::ReadCount => a.read_count.cmp(&b.read_count),
            Self::ReadingTime => a.reading_time.cmp(&b.reading_time),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Ascending only for the exact string `asc`; anything else descends
    pub fn from_param(value: Option<&str>) -> Self {
        if value == Some("asc") {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn compare(&self, a: &Blog, b: &Blog) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// 1-indexed page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 1,
        }
    }
}

impl Pagination {
    /// Parse raw `limit`/`page` query values; empty or missing use defaults
    pub fn from_params(limit: Option<&str>, page: Option<&str>) -> Result<Self> {
        Ok(Self {
            limit: parse_positive("limit", limit)?.unwrap_or(DEFAULT_LIMIT),
            page: parse_positive("page", page)?.unwrap_or(1),
        })
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_positive(name: &str, value: Option<&str>) -> Result<Option<u64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(QuillError::invalid_input(format!(
                "{name} must be a positive integer"
            ))),
        },
    }
}

/// Predicates a blog must satisfy to be listed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub author: Option<Uuid>,
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Matches when any of these tags is present; empty means no tag filter
    pub tags_any: Vec<String>,
    pub state: Option<BlogState>,
}

impl BlogFilter {
    pub fn matches(&self, blog: &Blog) -> bool {
        if self.author.is_some_and(|author| author != blog.author) {
            return false;
        }
        if self.state.is_some_and(|state| state != blog.state) {
            return false;
        }
        if let Some(needle) = &self.title_contains {
            if !blog.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if !self.tags_any.is_empty() && !self.tags_any.iter().any(|tag| blog.tags.contains(tag)) {
            return false;
        }
        true
    }
}

/// Immutable description of a blog listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogQuery {
    pub filter: BlogFilter,
    /// `None` keeps creation order
    pub sort: Option<Sort>,
    pub limit: u64,
    pub offset: u64,
}

impl BlogQuery {
    pub fn new(filter: BlogFilter, sort: Option<Sort>, pagination: Pagination) -> Self {
        Self {
            filter,
            sort,
            limit: pagination.limit,
            offset: pagination.offset(),
        }
    }

    /// Evaluate the query against an in-memory collection kept in creation order
    pub fn apply<'a>(&self, blogs: impl IntoIterator<Item = &'a Blog>) -> Vec<Blog> {
        let mut matched: Vec<&Blog> = blogs
            .into_iter()
            .filter(|blog| self.filter.matches(blog))
            .collect();

        if let Some(sort) = &self.sort {
            // Stable sort keeps creation order among equal keys
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        matched
            .into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBlog;

    fn blog(title: &str, tags: &[&str], author: Uuid, state: BlogState, read_count: u64) -> Blog {
        let mut blog = NewBlog {
            title: title.to_string(),
            description: "d".to_string(),
            body: "b".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author,
        }
        .into_blog();
        blog.state = state;
        blog.read_count = read_count;
        blog
    }

    #[test]
    fn test_sort_field_parse_whitelist() {
        assert_eq!(SortField::parse("read_count"), Some(SortField::ReadCount));
        assert_eq!(SortField::parse("Reading_Time"), Some(SortField::ReadingTime));
        assert_eq!(SortField::parse("updatedAt"), Some(SortField::UpdatedAt));
        assert_eq!(SortField::parse("CREATEDAT"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("created_at"), None);
        assert_eq!(SortField::parse("title"), None);
    }

    #[test]
    fn test_sort_direction_only_exact_asc_ascends() {
        assert_eq!(SortDirection::from_param(Some("asc")), SortDirection::Ascending);
        assert_eq!(SortDirection::from_param(Some("ASC")), SortDirection::Descending);
        assert_eq!(SortDirection::from_param(Some("desc")), SortDirection::Descending);
        assert_eq!(SortDirection::from_param(None), SortDirection::Descending);
    }

    #[test]
    fn test_pagination_defaults_and_offset() {
        let default = Pagination::from_params(None, None).unwrap();
        assert_eq!(default, Pagination { limit: 20, page: 1 });
        assert_eq!(default.offset(), 0);

        let third = Pagination::from_params(Some("5"), Some("3")).unwrap();
        assert_eq!(third.offset(), 10);

        let blank = Pagination::from_params(Some(""), Some("")).unwrap();
        assert_eq!(blank, Pagination::default());

        let zero_page = Pagination { limit: 5, page: 0 };
        assert_eq!(zero_page.offset(), 0);
    }

    #[test]
    fn test_pagination_rejects_non_positive() {
        assert!(Pagination::from_params(Some("0"), None).is_err());
        assert!(Pagination::from_params(None, Some("-1")).is_err());
        let err = Pagination::from_params(Some("ten"), None).unwrap_err();
        assert_eq!(err.to_string(), "limit must be a positive integer");
    }

    #[test]
    fn test_filter_matches() {
        let author = Uuid::new_v4();
        let published = blog("Rust Async Basics", &["rust", "async"], author, BlogState::Published, 0);

        let by_title = BlogFilter {
            title_contains: Some("async".to_string()),
            ..Default::default()
        };
        assert!(by_title.matches(&published));

        let by_tags = BlogFilter {
            tags_any: vec!["go".to_string(), "async".to_string()],
            ..Default::default()
        };
        assert!(by_tags.matches(&published));

        let wrong_tags = BlogFilter {
            tags_any: vec!["go".to_string()],
            ..Default::default()
        };
        assert!(!wrong_tags.matches(&published));

        let drafts = BlogFilter {
            state: Some(BlogState::Draft),
            ..Default::default()
        };
        assert!(!drafts.matches(&published));

        let other_author = BlogFilter {
            author: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!other_author.matches(&published));
    }

    #[test]
    fn test_apply_sorts_and_paginates() {
        let author = Uuid::new_v4();
        let blogs = vec![
            blog("a", &[], author, BlogState::Published, 5),
            blog("b", &[], author, BlogState::Published, 1),
            blog("c", &[], author, BlogState::Draft, 9),
            blog("d", &[], author, BlogState::Published, 3),
        ];
        let filter = BlogFilter {
            state: Some(BlogState::Published),
            ..Default::default()
        };

        let ascending = BlogQuery::new(
            filter.clone(),
            Some(Sort {
                field: SortField::ReadCount,
                direction: SortDirection::Ascending,
            }),
            Pagination::default(),
        );
        let counts: Vec<u64> = ascending.apply(&blogs).iter().map(|b| b.read_count).collect();
        assert_eq!(counts, vec![1, 3, 5]);

        let descending_page = BlogQuery::new(
            filter.clone(),
            Some(Sort {
                field: SortField::ReadCount,
                direction: SortDirection::Descending,
            }),
            Pagination { limit: 2, page: 2 },
        );
        let counts: Vec<u64> = descending_page.apply(&blogs).iter().map(|b| b.read_count).collect();
        assert_eq!(counts, vec![1]);

        let natural = BlogQuery::new(filter, None, Pagination::default());
        let titles: Vec<String> = natural.apply(&blogs).into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["a", "b", "d"]);
    }
}
