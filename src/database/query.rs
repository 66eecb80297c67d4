//! Runtime WHERE-clause construction for the listing endpoints.
//!
//! Column and type names only ever come from `&'static str` constants in the
//! services; user input is always carried as a bound [`SqlArg`].

use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, PgPool};

use crate::dto::pagination::{PageRequest, Paged};
use crate::error::Result;

/// A Postgres enum type mirrored by a Rust enum.
pub trait PgEnum {
    const PG_TYPE: &'static str;

    fn as_str(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i32),
    Bool(bool),
    Date(NaiveDate),
}

#[derive(Debug, Default, Clone)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    args: Vec<SqlArg>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_arg(&mut self, arg: SqlArg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    pub fn eq(&mut self, column: &'static str, arg: SqlArg) -> &mut Self {
        let n = self.push_arg(arg);
        self.conditions.push(format!("{} = ${}", column, n));
        self
    }

    pub fn eq_enum<E: PgEnum>(&mut self, column: &'static str, value: &E) -> &mut Self {
        let n = self.push_arg(SqlArg::Text(value.as_str().to_string()));
        self.conditions
            .push(format!("{} = ${}::{}", column, n, E::PG_TYPE));
        self
    }

    /// Restricts a timestamp column to a single calendar day.
    pub fn on_date(&mut self, column: &'static str, date: NaiveDate) -> &mut Self {
        let n = self.push_arg(SqlArg::Date(date));
        self.conditions.push(format!("{}::date = ${}", column, n));
        self
    }

    /// Case-insensitive substring match of `term` against any of `columns`.
    /// A blank term adds nothing.
    pub fn search(&mut self, columns: &[&'static str], term: &str) -> &mut Self {
        let term = term.trim();
        if term.is_empty() || columns.is_empty() {
            return self;
        }
        let n = self.push_arg(SqlArg::Text(format!("%{}%", escape_like(term))));
        let any = columns
            .iter()
            .map(|c| format!("{} ILIKE ${}", c, n))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({})", any));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Placeholder index for the first parameter appended after the filter
    /// arguments (LIMIT / OFFSET).
    pub fn next_placeholder(&self) -> usize {
        self.args.len() + 1
    }

    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }
}

/// Escapes LIKE metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    args: &[SqlArg],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v.clone()),
            SqlArg::Int(v) => query.bind(*v),
            SqlArg::Bool(v) => query.bind(*v),
            SqlArg::Date(v) => query.bind(*v),
        };
    }
    query
}

pub fn bind_query_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    args: &[SqlArg],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v.clone()),
            SqlArg::Int(v) => query.bind(*v),
            SqlArg::Bool(v) => query.bind(*v),
            SqlArg::Date(v) => query.bind(*v),
        };
    }
    query
}

/// Source of a paginated listing: `SELECT {columns} FROM {from}`.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub columns: &'static str,
    pub from: &'static str,
    pub order_by: &'static str,
}

impl Listing {
    pub fn items_sql(&self, filter: &WhereBuilder) -> String {
        let n = filter.next_placeholder();
        format!(
            "SELECT {} FROM {} {} ORDER BY {} LIMIT ${} OFFSET ${}",
            self.columns,
            self.from,
            filter.where_clause(),
            self.order_by,
            n,
            n + 1
        )
    }

    pub fn count_sql(&self, filter: &WhereBuilder) -> String {
        format!("SELECT COUNT(*) FROM {} {}", self.from, filter.where_clause())
    }
}

/// Runs the page query and the filtered count concurrently.
pub async fn fetch_page<T>(
    pool: &PgPool,
    listing: Listing,
    filter: &WhereBuilder,
    page: PageRequest,
) -> Result<Paged<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let items_sql = listing.items_sql(filter);
    let count_sql = listing.count_sql(filter);

    let items = bind_query_as(sqlx::query_as::<_, T>(&items_sql), filter.args())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool);
    let total = bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql), filter.args())
        .fetch_one(pool);

    let (items, total) = tokio::try_join!(items, total)?;
    Ok(Paged { items, total, page })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Colour;

    impl PgEnum for Colour {
        const PG_TYPE: &'static str = "colour";

        fn as_str(&self) -> &'static str {
            "RED"
        }
    }

    #[test]
    fn empty_builder_has_no_where_clause() {
        let builder = WhereBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.where_clause(), "");
        assert_eq!(builder.next_placeholder(), 1);
    }

    #[test]
    fn conditions_are_and_combined_in_order() {
        let mut builder = WhereBuilder::new();
        builder
            .search(&["first_name", "email"], "  ann ")
            .eq_enum("colour", &Colour)
            .eq("assigned_to", SqlArg::Int(7));

        assert_eq!(
            builder.where_clause(),
            "WHERE (first_name ILIKE $1 OR email ILIKE $1) AND colour = $2::colour AND assigned_to = $3"
        );
        assert_eq!(
            builder.args(),
            &[
                SqlArg::Text("%ann%".into()),
                SqlArg::Text("RED".into()),
                SqlArg::Int(7)
            ]
        );
        assert_eq!(builder.next_placeholder(), 4);
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut builder = WhereBuilder::new();
        builder.search(&["name"], "   ");
        assert!(builder.is_empty());
        assert!(builder.args().is_empty());
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        let mut builder = WhereBuilder::new();
        builder.search(&["name"], "a_b");
        assert_eq!(builder.args(), &[SqlArg::Text("%a\\_b%".into())]);
    }

    #[test]
    fn listing_sql_shares_the_where_clause() {
        let listing = Listing {
            columns: "id, name",
            from: "courses",
            order_by: "created_at DESC, id DESC",
        };
        let mut builder = WhereBuilder::new();
        builder.eq("is_active", SqlArg::Bool(true));
        assert_eq!(
            listing.items_sql(&builder),
            "SELECT id, name FROM courses WHERE is_active = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        assert_eq!(
            listing.count_sql(&builder),
            "SELECT COUNT(*) FROM courses WHERE is_active = $1"
        );
        assert_eq!(
            listing.items_sql(&WhereBuilder::new()),
            "SELECT id, name FROM courses  ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn date_filter_casts_the_column() {
        let mut builder = WhereBuilder::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        builder.on_date("follow_up_date", day);
        assert_eq!(builder.where_clause(), "WHERE follow_up_date::date = $1");
        assert_eq!(builder.args(), &[SqlArg::Date(day)]);
    }
}
