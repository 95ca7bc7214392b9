//! Joins as nested FOR loops
//!
//! A left join keeps the outer document when nothing matches by iterating
//! over a single empty document instead of the (empty) match list.

use super::filters::compile_conditions;
use super::{collection_name, compile_sub_query};
use crate::builder::{Builder, FromClause, JoinClause, JoinType};
use crate::{Error, Result};

pub(crate) fn compile_joins(query: &Builder) -> Result<Vec<String>> {
    query.joins.iter().map(compile_join).collect()
}

fn compile_join(join: &JoinClause) -> Result<String> {
    let inner = &join.query;
    let (alias, source) = match &inner.from {
        Some(FromClause::Collection { name, alias }) | Some(FromClause::View { name, alias }) => {
            (alias.as_str(), collection_name(&inner.table_prefix, name))
        }
        Some(FromClause::Sub { query, alias }) => (alias.as_str(), compile_sub_query(query)?),
        None => return Err(Error::compilation("Join without a source collection.")),
    };
    let filter = compile_conditions(inner, &inner.wheres)?
        .map(|conditions| format!(" FILTER {}", conditions))
        .unwrap_or_default();

    let aql = match join.join_type {
        JoinType::Inner | JoinType::Cross => format!("FOR {} IN {}{}", alias, source, filter),
        JoinType::Left => {
            let matches = format!("{}List", alias);
            format!(
                "LET {matches} = (FOR {alias} IN {source}{filter} RETURN {alias}) FOR {alias} IN (LENGTH({matches}) > 0) ? {matches} : [{{}}]"
            )
        }
    };
    Ok(aql)
}

#[cfg(test)]
mod tests {
    use crate::{table, QueryBuilder};

    #[test]
    fn test_left_join_sub() {
        let rulers = table("characters").where_not_null("rules");
        let query = table("locations").left_join_sub(
            rulers,
            "rulers",
            "rulers.residence_id",
            "==",
            "locations.id",
        );
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR locationDoc IN locations LET rulersList = (FOR rulers IN (FOR characterDoc IN characters FILTER characterDoc.`rules` != null RETURN characterDoc) FILTER rulers.`residence_id` == locationDoc.`_key` RETURN rulers) FOR rulers IN (LENGTH(rulersList) > 0) ? rulersList : [{}] RETURN MERGE(locationDoc, rulers)"
        );
    }

    #[test]
    fn test_join_then_where_on_joined_collection() {
        let query = table("characters")
            .join("locations", "characters.residence_id", "==", "locations.id")
            .where_(("locations.name", "Winterfell"));
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` FILTER locationDoc.`name` == @{id}_where_1 RETURN MERGE(characterDoc, locationDoc)"
            )
        );
    }
}
