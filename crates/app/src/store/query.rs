//! Row selection for table requests.

use std::fmt::Display;

use smallvec::SmallVec;

/// Sort direction for `order=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Column projection, equality filters and ordering for a table request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Option<String>,
    filters: SmallVec<[(String, String); 4]>,
    order: Option<String>,
    limit: Option<u32>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return, including embedded relations such as
    /// `*, products(*)`.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.split_whitespace().collect());
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(format!("{column}.{}", direction.as_str()));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether no filter has been added. Deletes and updates refuse to run
    /// unfiltered.
    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);

        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), select.clone()));
        }

        pairs.extend(self.filters.iter().cloned());

        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}
