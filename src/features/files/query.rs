//! Filter/sort builder for file-catalog queries.
//!
//! A thin translation from (current user, collection scope, search term,
//! sort selection) into document-store clauses. Pure: no I/O, no side
//! effects, deterministic for identical inputs.

use crate::features::files::models::FileCategory;
use crate::features::users::models::CatalogUser;
use crate::modules::backend::query::QueryClause;

/// Ordered clause list handed to the document store
pub type QuerySpec = Vec<QueryClause>;

/// Which catalog view is being queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionScope {
    /// Catalog-wide dashboard view, no category filter
    Dashboard,
    /// A single category view
    Category(FileCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort selection: a field name and a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }

    /// Parse a dropdown token of the form `"name-asc"` / `"size-desc"`.
    /// The direction is the part after the last hyphen.
    pub fn parse(token: &str) -> Option<Self> {
        let (field, direction) = token.rsplit_once('-')?;
        if field.is_empty() {
            return None;
        }
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return None,
        };
        Some(Self::new(field, direction))
    }

    fn to_clause(&self) -> QueryClause {
        match self.direction {
            SortDirection::Asc => QueryClause::OrderAsc(self.field.clone()),
            SortDirection::Desc => QueryClause::OrderDesc(self.field.clone()),
        }
    }
}

/// Build the clause list for the files visible to `user` in `scope`.
///
/// Base clause: visible if owned or explicitly shared. The category
/// filter is ANDed in for non-dashboard scopes; a non-empty search term
/// adds a substring match on `name` (case semantics are backend-defined,
/// not normalized here); absence of a sort leaves backend-default order.
pub fn build_query(
    user: &CatalogUser,
    scope: CollectionScope,
    search: Option<&str>,
    sort: Option<&Sort>,
) -> QuerySpec {
    let visibility = QueryClause::Or(vec![
        QueryClause::equal("owner", &[&user.id]),
        QueryClause::contains("users", &[&user.email]),
    ]);

    let mut queries = match scope {
        CollectionScope::Dashboard => vec![visibility],
        CollectionScope::Category(category) => vec![QueryClause::And(vec![
            visibility,
            QueryClause::equal("type", &[category.as_str()]),
        ])],
    };

    if let Some(term) = search {
        if !term.is_empty() {
            queries.push(QueryClause::contains("name", &[term]));
        }
    }

    if let Some(sort) = sort {
        queries.push(sort.to_clause());
    }

    queries
}
