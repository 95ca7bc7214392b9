//! Ordering (`SORT`) and paging (`LIMIT`)
//!
//! Once a union has been added, ordering and paging apply to the combined
//! result instead of the first operand.

use super::common::{IntoSortDirection, OrderClause, SortDirection};
use super::Builder;
use crate::value::Expression;

impl Builder {
    fn push_order(mut self, order: OrderClause) -> Self {
        if self.unions.is_empty() {
            self.orders.push(order);
        } else {
            self.union_orders.push(order);
        }
        self
    }

    /// Order by a column; the direction is `"asc"`/`"desc"` in any case or a [`SortDirection`]
    pub fn order_by<D>(self, column: &str, direction: D) -> Self
    where
        D: IntoSortDirection,
    {
        if self.error.is_some() {
            return self;
        }
        match direction.into_sort_direction() {
            Ok(direction) => self.push_order(OrderClause::Column {
                column: column.to_string(),
                direction,
            }),
            Err(err) => self.fail(err),
        }
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Newest first, by `created_at` unless another column is given
    pub fn latest(self, column: Option<&str>) -> Self {
        self.order_by(column.unwrap_or("created_at"), SortDirection::Desc)
    }

    pub fn oldest(self, column: Option<&str>) -> Self {
        self.order_by(column.unwrap_or("created_at"), SortDirection::Asc)
    }

    /// Add a trusted AQL sort expression verbatim
    pub fn order_by_raw(self, aql: impl Into<String>) -> Self {
        self.push_order(OrderClause::Raw(Expression::new(aql)))
    }

    /// Shuffle the results
    ///
    /// AQL's `RAND()` cannot be seeded, so the seed is accepted and ignored.
    pub fn in_random_order(self, _seed: Option<u64>) -> Self {
        self.push_order(OrderClause::Random)
    }

    /// Order search results by BM25 relevance, best match first
    pub fn order_by_best_matching(self) -> Self {
        self.push_order(OrderClause::BestMatching {
            direction: SortDirection::Desc,
        })
    }

    /// Drop all orderings
    pub fn reorder(mut self) -> Self {
        self.orders.clear();
        self.union_orders.clear();
        self
    }

    /// Drop all orderings and order by a single column
    pub fn reorder_by<D>(self, column: &str, direction: D) -> Self
    where
        D: IntoSortDirection,
    {
        self.reorder().order_by(column, direction)
    }

    /// Set the LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        if self.unions.is_empty() {
            self.limit = Some(count);
        } else {
            self.union_limit = Some(count);
        }
        self
    }

    /// Same as [`limit`](Builder::limit)
    pub fn take(self, count: u64) -> Self {
        self.limit(count)
    }

    /// Skip rows; only emitted together with a limit
    pub fn offset(mut self, offset: u64) -> Self {
        if self.unions.is_empty() {
            self.offset = Some(offset);
        } else {
            self.union_offset = Some(offset);
        }
        self
    }

    /// Same as [`offset`](Builder::offset)
    pub fn skip(self, offset: u64) -> Self {
        self.offset(offset)
    }

    /// Page through results, pages are 1-based
    pub fn for_page(self, page: u64, per_page: u64) -> Self {
        self.offset(page.saturating_sub(1) * per_page).limit(per_page)
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, Error, QueryBuilder, SortDirection};

    #[test]
    fn test_order_by_with_direction() {
        let query = table("characters")
            .order_by("surname", "ASC")
            .order_by("name", SortDirection::Desc);
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters SORT characterDoc.`surname` ASC, characterDoc.`name` DESC RETURN characterDoc"
        );
    }

    #[test]
    fn test_invalid_direction_is_rejected_before_compilation() {
        let query = table("characters").order_by("name", "upwards");
        assert!(matches!(query.error(), Some(Error::InvalidArgument { .. })));
        assert!(matches!(query.to_aql(), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_latest_and_oldest() {
        let query = table("characters").latest(None).oldest(Some("born_at"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters SORT characterDoc.`created_at` DESC, characterDoc.`born_at` ASC RETURN characterDoc"
        );
    }

    #[test]
    fn test_random_order_ignores_seed() {
        let query = table("characters").in_random_order(Some(42)).limit(1);
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters SORT RAND() LIMIT 1 RETURN characterDoc"
        );
    }

    #[test]
    fn test_reorder() {
        let query = table("characters")
            .order_by("name", "asc")
            .reorder_by("age", "desc");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters SORT characterDoc.`age` DESC RETURN characterDoc"
        );
    }

    #[test]
    fn test_limit_and_offset() {
        let query = table("characters").limit(10).offset(20);
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters LIMIT 20, 10 RETURN characterDoc"
        );
    }

    #[test]
    fn test_offset_without_limit_is_dropped() {
        let query = table("characters").skip(5);
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN characterDoc"
        );
    }

    #[test]
    fn test_for_page() {
        let query = table("characters").for_page(3, 15);
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters LIMIT 30, 15 RETURN characterDoc"
        );
    }

    #[test]
    fn test_order_by_projection_alias() {
        let query = table("characters")
            .select("name as characterName")
            .order_by("characterName", "asc");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters SORT characterDoc.`name` ASC RETURN {characterName: characterDoc.`name`}"
        );
    }
}
