//! Full-text search over ArangoSearch views

use super::common::{ColumnSelector, FromClause, IntoColumnSelectors, Operand, SearchClause};
use super::Builder;
use crate::bindings::BindingCategory;
use crate::{Error, Value};

/// Analyzer used when none is given
pub const DEFAULT_ANALYZER: &str = "text_en";

impl Builder {
    /// Match `text` against the given attributes of the view
    ///
    /// The query must iterate over a view (see [`from_view`](Builder::from_view)).
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::{Builder, QueryBuilder};
    ///
    /// let query = Builder::new()
    ///     .from_view("character_view as v")
    ///     .search(("name", "surname"), "stark", None);
    /// assert!(query.to_aql().unwrap().contains("SEARCH ANALYZER("));
    /// ```
    pub fn search<C>(mut self, fields: C, text: impl Into<Value>, analyzer: Option<&str>) -> Self
    where
        C: IntoColumnSelectors,
    {
        if self.error.is_some() {
            return self;
        }
        if !matches!(self.from, Some(FromClause::View { .. })) {
            return self.fail(Error::unsupported(
                "search: full-text search requires a view, call from_view() first",
            ));
        }

        let fields: Vec<String> = fields
            .into_column_selectors()
            .into_iter()
            .filter_map(|selector| match selector {
                ColumnSelector::Column(column) | ColumnSelector::Aliased { column, .. } => {
                    Some(column)
                }
                _ => None,
            })
            .collect();
        if fields.is_empty() {
            return self.fail(Error::invalid_argument(
                "Search requires at least one attribute.",
            ));
        }

        let text = self.bind(Operand::Value(text.into()), BindingCategory::Search);
        let analyzer = self.bind(
            Operand::Value(Value::from(analyzer.unwrap_or(DEFAULT_ANALYZER))),
            BindingCategory::Search,
        );
        self.search = Some(SearchClause {
            fields,
            text,
            analyzer,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, Builder, Error, QueryBuilder, Value};

    #[test]
    fn test_search_on_view() {
        let query = Builder::new()
            .from_view("character_view as v")
            .search(("name", "surname"), "stark", None)
            .order_by_best_matching()
            .limit(5);
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR v IN character_view SEARCH ANALYZER(v.`name` IN TOKENS(@{id}_search_1, @{id}_search_2) OR v.`surname` IN TOKENS(@{id}_search_1, @{id}_search_2), @{id}_search_2) SORT BM25(v) DESC LIMIT 5 RETURN v"
            )
        );

        let bindings = query.get_bindings().unwrap();
        assert_eq!(bindings[&format!("{id}_search_1")], Value::from("stark"));
        assert_eq!(bindings[&format!("{id}_search_2")], Value::from("text_en"));
    }

    #[test]
    fn test_search_with_custom_analyzer() {
        let query = Builder::new()
            .from_view("character_view as v")
            .search("bio", "warg", Some("text_nl"));
        let id = query.query_id();
        assert_eq!(
            query.get_bindings().unwrap()[&format!("{id}_search_2")],
            Value::from("text_nl")
        );
    }

    #[test]
    fn test_search_requires_view() {
        let query = table("characters").search("name", "stark", None);
        assert!(matches!(query.error(), Some(Error::Unsupported { .. })));
    }
}
