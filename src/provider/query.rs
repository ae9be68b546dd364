//! Builder for the store's query-string dialect: filter predicates,
//! ordering, limits and relational embeds, rendered as URL parameters.

/// Comparison operators the repositories actually use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Is,
}

impl FilterOp {
    fn prefix(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_param(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One table-scoped read/write predicate set. Also used to scope `update`
/// and `delete` calls, where only the filters apply.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    select: Option<String>,
    filters: Vec<(String, FilterOp, String)>,
    order: Option<(String, SortDirection)>,
    limit: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection, including relational embeds in the provider's
    /// `alias:fk_column(columns)` notation.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), FilterOp::Eq, value.to_string()));
        self
    }

    pub fn neq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), FilterOp::Neq, value.to_string()));
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters
            .push((column.into(), FilterOp::Is, "null".to_string()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as query-string pairs in the provider's dialect.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for (column, op, value) in &self.filters {
            params.push((column.clone(), format!("{}.{}", op.prefix(), value)));
        }
        if let Some((column, direction)) = &self.order {
            params.push((
                "order".to_string(),
                format!("{}.{}", column, direction.as_param()),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}
