//! Query builder for the hosted data API's filter dialect.
//!
//! Renders to the query-string pairs the REST endpoint expects:
//! `select=`, `col=op.value`, `order=col.asc,...` and `limit=`.

use std::fmt::Display;

/// Comparison operators used by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gte,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Gte => "gte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Filter {
    column: String,
    op: Op,
    value: String,
}

/// A row selection against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: String,
    filters: Vec<Filter>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    /// Select every column of `table`.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Replace the column list. Accepts nested join syntax such as
    /// `*,client:client_id(id,name)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("");
        self
    }

    fn filter(mut self, column: &str, op: Op, value: impl Display) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, Op::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, Op::Gte, value)
    }

    /// Append an ordering clause; earlier clauses take precedence.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Render the selection as query-string pairs (unencoded).
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filter_params());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, asc)| format!("{col}.{}", if *asc { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Only the filter pairs, used by update and delete which take no `select`.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), format!("{}.{}", f.op.as_str(), f.value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn default_selects_all_columns() {
        let q = Query::table("clients");
        assert_eq!(q.table_name(), "clients");
        assert_eq!(q.params(), vec![pair("select", "*")]);
    }

    #[test]
    fn filters_render_in_insertion_order() {
        let q = Query::table("appointments")
            .eq("business_id", "b1")
            .eq("status", "completed")
            .gte("date", "2025-06-01");
        assert_eq!(
            q.params(),
            vec![
                pair("select", "*"),
                pair("business_id", "eq.b1"),
                pair("status", "eq.completed"),
                pair("date", "gte.2025-06-01"),
            ]
        );
    }

    #[test]
    fn multiple_orders_join_with_commas() {
        let q = Query::table("appointments")
            .order("date", true)
            .order("time", true)
            .limit(3);
        let params = q.params();
        assert!(params.contains(&pair("order", "date.asc,time.asc")));
        assert!(params.contains(&pair("limit", "3")));
    }

    #[test]
    fn descending_order() {
        let q = Query::table("clients").order("created_at", false);
        assert!(q.params().contains(&pair("order", "created_at.desc")));
    }

    #[test]
    fn nested_select_strips_whitespace() {
        let q = Query::table("appointments").select(
            "*,
             client:client_id(id, name)",
        );
        assert_eq!(q.params()[0], pair("select", "*,client:client_id(id,name)"));
    }

    #[test]
    fn filter_params_omit_select() {
        let q = Query::table("clients")
            .select("id")
            .eq("id", 7)
            .gte("visits", 2)
            .limit(1);
        assert_eq!(
            q.filter_params(),
            vec![pair("id", "eq.7"), pair("visits", "gte.2")]
        );
    }
}
