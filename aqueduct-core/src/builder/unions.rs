//! Unions of several queries

use super::common::{IntoSubQuery, UnionClause};
use super::Builder;
use crate::bindings::BindingCategory;

impl Builder {
    /// Combine with another query, dropping duplicate rows
    ///
    /// Ordering and paging called after the first union apply to the
    /// combined result.
    pub fn union<Q>(self, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_union(sub, false)
    }

    /// Combine with another query, keeping duplicate rows
    pub fn union_all<Q>(self, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_union(sub, true)
    }

    fn add_union<Q>(mut self, sub: Q, all: bool) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let mut query = self.adopt(sub, BindingCategory::Union);
        self.aliases.exchange_table_aliases(&mut query.aliases);
        self.unions.push(UnionClause {
            query: Box::new(query),
            all,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, Builder, QueryBuilder};

    #[test]
    fn test_union_wraps_both_queries() {
        let starks = table("characters").where_(("surname", "Stark"));
        let targaryens = table("characters").where_(("surname", "Targaryen"));
        let (id, second) = (starks.query_id(), targaryens.query_id());

        let query = starks.union(targaryens);
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR unionResultDoc IN UNION_DISTINCT((FOR characterDoc IN characters FILTER characterDoc.`surname` == @{id}_where_1 RETURN characterDoc), (FOR characterDoc IN characters FILTER characterDoc.`surname` == @{second}_where_1 RETURN characterDoc)) RETURN unionResultDoc"
            )
        );

        let bindings = query.get_bindings().unwrap();
        assert_eq!(bindings.len(), 2);
        assert!(bindings.contains_key(&format!("{second}_where_1")));
    }

    #[test]
    fn test_union_all_with_order_and_limit() {
        let query = table("characters")
            .select("name")
            .where_(("alive", true))
            .union_all(|q: Builder| q.from("characters").select("name").where_(("alive", false)))
            .order_by("name", "asc")
            .limit(10);
        let aql = query.to_aql().unwrap();
        assert!(aql.starts_with("FOR unionResultDoc IN UNION((FOR characterDoc IN characters FILTER"));
        assert!(aql.ends_with(
            "SORT unionResultDoc.`name` ASC LIMIT 10 RETURN unionResultDoc"
        ));
        assert!(!aql.contains("RETURN characterDoc)) SORT characterDoc"));
        assert_eq!(query.get_bindings().unwrap().len(), 2);
    }

    #[test]
    fn test_three_way_union_nests() {
        let query = table("characters")
            .where_(("surname", "Stark"))
            .union(table("characters").where_(("surname", "Snow")))
            .union_all(table("characters").where_(("surname", "Targaryen")));
        let aql = query.to_aql().unwrap();
        assert!(aql.starts_with("FOR unionResultDoc IN UNION(UNION_DISTINCT((FOR"));
        assert_eq!(query.get_bindings().unwrap().len(), 3);
    }

    #[test]
    fn test_order_before_union_stays_on_first_query() {
        let query = table("characters")
            .order_by("age", "desc")
            .limit(3)
            .union(table("characters").where_(("alive", true)));
        let aql = query.to_aql().unwrap();
        assert!(aql.starts_with(
            "FOR unionResultDoc IN UNION_DISTINCT((FOR characterDoc IN characters SORT characterDoc.`age` DESC LIMIT 3 RETURN characterDoc), "
        ));
        assert!(aql.ends_with(") RETURN unionResultDoc"));
    }
}
