//! Static allow-list of the columns an entity exposes to list queries.

use crate::pagination::ListParams;

/// What a list query may do with a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub searchable: bool,
    pub sortable: bool,
}

impl FieldSpec {
    pub const fn searchable(column: &'static str) -> Self {
        Self {
            column,
            searchable: true,
            sortable: true,
        }
    }

    pub const fn sortable(column: &'static str) -> Self {
        Self {
            column,
            searchable: false,
            sortable: true,
        }
    }
}

/// Entities that can be listed with search and ordering.
pub trait Listable {
    const TABLE: &'static str;
    const FIELDS: &'static [FieldSpec];
    /// Column used when the request does not ask for an order.
    const DEFAULT_ORDER: &'static str;

    fn searchable_columns() -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .filter(|f| f.searchable)
            .map(|f| f.column)
            .collect()
    }

    fn sortable_column(name: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|f| f.sortable && f.column == name)
            .map(|f| f.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub descending: bool,
}

/// Search term and resolved ordering for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub order: SortOrder,
}

impl ListFilter {
    /// Resolve `orderBy` against the entity's allow-list.
    ///
    /// A leading `-` requests descending order. Unknown columns are ignored
    /// and the entity's default order applies.
    pub fn for_entity<E: Listable>(params: &ListParams) -> Self {
        let requested = params.order_by.as_deref().and_then(|raw| {
            let (name, descending) = match raw.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (raw, false),
            };
            E::sortable_column(name).map(|column| SortOrder { column, descending })
        });

        Self {
            search: params.search.clone(),
            order: requested.unwrap_or(SortOrder {
                column: E::DEFAULT_ORDER,
                descending: false,
            }),
        }
    }

    /// The search term as an `ILIKE` pattern with `%`, `_` and `\` escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('%');
            escaped
        })
    }
}
