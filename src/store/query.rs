use serde_json::Value;
use std::fmt;

/// Equality predicate on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: String,
    value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether a JSON row satisfies the predicate. Values are compared in
    /// their textual form, the way they appear in a REST query string.
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Null) | None => self.value == "null",
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Read query against one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    filters: Vec<Filter>,
    range: Option<(u64, u64)>,
}

impl Query {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            range: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Restrict the result to the inclusive zero-based index range `[start, end]`.
    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filter_list(&self) -> &[Filter] {
        &self.filters
    }

    pub fn index_range(&self) -> Option<(u64, u64)> {
        self.range
    }
}
