//! Unions
//!
//! AQL has no UNION statement, only array functions. Every operand is
//! compiled as a sub-query, the arrays are combined with `UNION` or
//! `UNION_DISTINCT`, and the combined array is iterated once more so it can
//! be sorted and limited.

use super::{compile_components, compile_limit, compile_sub_query};
use crate::alias::{qualify_column, qualify_projected};
use crate::builder::{Builder, OrderClause};
use crate::Result;

/// Document variable of the combined iteration
pub const UNION_ALIAS: &str = "unionResultDoc";

pub(crate) fn compile_unions(query: &mut Builder) -> Result<String> {
    let documents =
        query.columns.is_empty() && query.groups.is_empty() && query.aggregate.is_none();
    let unions = std::mem::take(&mut query.unions);
    let orders = std::mem::take(&mut query.union_orders);
    let (limit, offset) = (query.union_limit.take(), query.union_offset.take());

    let mut combined = format!("({})", compile_components(query)?);
    for union in &unions {
        let function = if union.all { "UNION" } else { "UNION_DISTINCT" };
        combined = format!("{}({}, {})", function, combined, compile_sub_query(&union.query)?);
    }

    let mut parts = vec![format!("FOR {} IN {}", UNION_ALIAS, combined)];
    if !orders.is_empty() {
        let criteria = orders
            .iter()
            .map(|order| match order {
                OrderClause::Column { column, direction } if documents => {
                    format!("{} {}", qualify_column(UNION_ALIAS, column), direction)
                }
                OrderClause::Column { column, direction } => {
                    format!("{} {}", qualify_projected(UNION_ALIAS, column), direction)
                }
                OrderClause::Raw(expression) => expression.to_string(),
                OrderClause::Random => "RAND()".to_string(),
                OrderClause::BestMatching { direction } => {
                    format!("BM25({}) {}", UNION_ALIAS, direction)
                }
            })
            .collect::<Vec<_>>();
        parts.push(format!("SORT {}", criteria.join(", ")));
    }
    if let Some(limit) = compile_limit(limit, offset) {
        parts.push(limit);
    }
    parts.push(format!("RETURN {}", UNION_ALIAS));

    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use crate::{table, QueryBuilder};

    #[test]
    fn test_union_orders_use_projected_names() {
        let query = table("characters")
            .select("name as characterName")
            .union(table("characters").select("name as characterName"))
            .order_by("characterName", "asc")
            .for_page(2, 10);
        assert!(query.to_aql().unwrap().ends_with(
            "SORT unionResultDoc.`characterName` ASC LIMIT 10, 10 RETURN unionResultDoc"
        ));
    }

    #[test]
    fn test_union_of_projections_sorts_by_projected_id() {
        let query = table("characters")
            .select(("id", "name"))
            .union(table("characters").select(("id", "name")))
            .order_by("id", "asc");
        let aql = query.to_aql().unwrap();
        assert!(aql.contains("RETURN {id: characterDoc.`_key`, name: characterDoc.`name`}"));
        assert!(aql.ends_with("SORT unionResultDoc.`id` ASC RETURN unionResultDoc"));
    }

    #[test]
    fn test_union_of_documents_sorts_by_key() {
        let query = table("characters")
            .union(table("characters"))
            .order_by("id", "desc");
        assert!(query
            .to_aql()
            .unwrap()
            .ends_with("SORT unionResultDoc.`_key` DESC RETURN unionResultDoc"));
    }
}
