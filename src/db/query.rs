//! SQL for list endpoints, driven by an entity's static column allow-list.
//!
//! Column and table names only ever come from [`Listable`] constants; user
//! input (the search pattern, offset and limit) is always bound.

use sqlx::{Postgres, QueryBuilder};

use crate::models::listable::{ListFilter, Listable};

/// `SELECT COUNT(*)` over the filtered table.
pub fn count_query<E: Listable>(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
    push_search::<E>(&mut qb, filter);
    qb
}

/// One ordered window of the filtered table.
pub fn page_query<E: Listable>(
    filter: &ListFilter,
    offset: i64,
    limit: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));
    push_search::<E>(&mut qb, filter);

    let direction = if filter.order.descending { "DESC" } else { "ASC" };
    qb.push(format!(" ORDER BY {} {direction}", filter.order.column));
    if filter.order.column != E::DEFAULT_ORDER {
        qb.push(format!(", {} ASC", E::DEFAULT_ORDER));
    }

    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
    qb
}

/// `WHERE (a ILIKE $1 OR b ILIKE $2 ...)` across every searchable column.
fn push_search<E: Listable>(qb: &mut QueryBuilder<'static, Postgres>, filter: &ListFilter) {
    let Some(pattern) = filter.like_pattern() else {
        return;
    };
    let columns = E::searchable_columns();
    if columns.is_empty() {
        return;
    }

    qb.push(" WHERE (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{column} ILIKE ")).push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::Customer;
    use crate::models::listable::SortOrder;

    fn filter(search: Option<&str>, column: &'static str, descending: bool) -> ListFilter {
        ListFilter {
            search: search.map(String::from),
            order: SortOrder { column, descending },
        }
    }

    #[test]
    fn count_without_search() {
        let qb = count_query::<Customer>(&filter(None, "id", false));
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM customers");
    }

    #[test]
    fn count_with_search_binds_each_column() {
        let qb = count_query::<Customer>(&filter(Some("foo"), "id", false));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM customers WHERE (name ILIKE $1 OR email ILIKE $2 OR mobile_phone ILIKE $3)"
        );
    }

    #[test]
    fn page_query_default_order() {
        let qb = page_query::<Customer>(&filter(None, "id", false), 20, 10);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM customers ORDER BY id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn page_query_with_search_and_descending_order() {
        let qb = page_query::<Customer>(&filter(Some("ali"), "name", true), 0, 5);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM customers WHERE (name ILIKE $1 OR email ILIKE $2 OR mobile_phone ILIKE $3) \
             ORDER BY name DESC, id ASC LIMIT $4 OFFSET $5"
        );
    }
}
