//! FILTER conditions

use super::{compile_sub_query, compile_sub_query_value, render_bound};
use crate::alias::normalize_column;
use crate::builder::{Builder, DatePart, Where, WhereKind};
use crate::{Error, Operator, Result};

pub(crate) fn compile_wheres(query: &Builder) -> Result<Option<String>> {
    Ok(compile_conditions(query, &query.wheres)?.map(|conditions| format!("FILTER {}", conditions)))
}

pub(crate) fn compile_havings(query: &Builder) -> Result<Option<String>> {
    Ok(compile_conditions(query, &query.havings)?.map(|conditions| format!("FILTER {}", conditions)))
}

/// Join conditions with their connectives; the first connective is dropped
pub(crate) fn compile_conditions(query: &Builder, wheres: &[Where]) -> Result<Option<String>> {
    if wheres.is_empty() {
        return Ok(None);
    }
    let mut conditions = String::new();
    for (position, clause) in wheres.iter().enumerate() {
        if position > 0 {
            conditions.push(' ');
            conditions.push_str(clause.connector.as_str());
            conditions.push(' ');
        }
        conditions.push_str(&compile_condition(query, &clause.kind)?);
    }
    Ok(Some(conditions))
}

fn compile_condition(query: &Builder, kind: &WhereKind) -> Result<String> {
    let column = |name: &str| normalize_column(query, name);

    let condition = match kind {
        WhereKind::Basic {
            column: name,
            operator,
            value,
        } => {
            let value = render_bound(query, value);
            if *operator == Operator::ILIKE {
                format!("LIKE({}, {}, true)", column(name), value)
            } else {
                format!("{} {} {}", column(name), operator, value)
            }
        }
        WhereKind::Between {
            column: name,
            low,
            high,
            not,
        } => {
            let target = column(name);
            let (low, high) = (render_bound(query, low), render_bound(query, high));
            if *not {
                format!("({target} < {low} OR {target} > {high})")
            } else {
                format!("({target} >= {low} AND {target} <= {high})")
            }
        }
        WhereKind::In {
            column: name,
            values,
            not,
        } => format!(
            "{} {} {}",
            column(name),
            membership(*not),
            render_bound(query, values)
        ),
        WhereKind::InRaw {
            column: name,
            values,
            not,
        } => {
            let values = values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} {} [{}]", column(name), membership(*not), values)
        }
        WhereKind::InSub {
            column: name,
            query: sub,
            not,
        } => format!(
            "{} {} {}",
            column(name),
            membership(*not),
            compile_sub_query(sub)?
        ),
        WhereKind::Null { column: name, not } => {
            let operator = if *not { "!=" } else { "==" };
            format!("{} {} null", column(name), operator)
        }
        WhereKind::Column {
            first,
            operator,
            second,
        } => format!("{} {} {}", column(first), operator, column(second)),
        WhereKind::Sub {
            column: name,
            operator,
            query: sub,
        } => format!(
            "{} {} {}",
            column(name),
            operator,
            compile_sub_query_value(sub)?
        ),
        WhereKind::Exists { query: sub, not } => {
            let aql = compile_sub_query(sub)?;
            match (sub.limit == Some(1), *not) {
                (true, false) => format!("FIRST({}) != null", aql),
                (true, true) => format!("FIRST({}) == null", aql),
                (false, false) => format!("LENGTH({}) > 0", aql),
                (false, true) => format!("LENGTH({}) == 0", aql),
            }
        }
        WhereKind::Nested { query: nested } => {
            match compile_conditions(nested, &nested.wheres)? {
                Some(conditions) => format!("({})", conditions),
                None => "true".to_string(),
            }
        }
        WhereKind::Expression { aql } => aql.to_string(),
        WhereKind::JsonContains {
            column: name,
            value,
            all,
            not,
        } => {
            let operator = match (*all, *not) {
                (false, false) => "IN",
                (false, true) => "NOT IN",
                (true, false) => "ALL IN",
                (true, true) => "NONE IN",
            };
            format!("{} {} {}", render_bound(query, value), operator, column(name))
        }
        WhereKind::JsonLength {
            column: name,
            operator,
            value,
        } => format!(
            "LENGTH({}) {} {}",
            column(name),
            operator,
            render_bound(query, value)
        ),
        WhereKind::Date {
            part,
            column: name,
            operator,
            value,
        } => format!(
            "{} {} {}",
            date_part(*part, &column(name)),
            operator,
            render_bound(query, value)
        ),
        WhereKind::Bitwise {
            column: name,
            operator,
            value,
        } => {
            let function = operator.bit_function().ok_or_else(|| {
                Error::compilation(format!("'{}' is not a bitwise operator.", operator))
            })?;
            let value = render_bound(query, value);
            if *operator == Operator::SHIFT_LEFT || *operator == Operator::SHIFT_RIGHT {
                format!("{}({}, {}, 32) != 0", function, column(name), value)
            } else {
                format!("{}({}, {}) != 0", function, column(name), value)
            }
        }
    };
    Ok(condition)
}

fn membership(not: bool) -> &'static str {
    if not {
        "NOT IN"
    } else {
        "IN"
    }
}

fn date_part(part: DatePart, column: &str) -> String {
    match part {
        DatePart::Date => format!("DATE_FORMAT({}, \"%yyyy-%mm-%dd\")", column),
        DatePart::Time => format!("DATE_FORMAT({}, \"%hh:%ii:%ss\")", column),
        DatePart::Year => format!("DATE_YEAR({})", column),
        DatePart::Month => format!("DATE_MONTH({})", column),
        DatePart::Day => format!("DATE_DAY({})", column),
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, QueryBuilder};

    #[test]
    fn test_shift_operators_take_bit_width() {
        let query = table("characters").where_(("flags", "<<", 2));
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters FILTER BIT_SHIFT_LEFT(characterDoc.`flags`, @{id}_where_1, 32) != 0 RETURN characterDoc"
            )
        );
    }

    #[test]
    fn test_json_doesnt_contain() {
        let query = table("characters")
            .where_json_doesnt_contain("tags", "bastard")
            .where_json_doesnt_contain("titles", vec!["king", "hand"]);
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters FILTER @{id}_where_1 NOT IN characterDoc.`tags` AND @{id}_where_2 NONE IN characterDoc.`titles` RETURN characterDoc"
            )
        );
    }

    #[test]
    fn test_month_and_day() {
        let query = table("characters")
            .where_month("born_at", "=", 4)
            .where_day("born_at", "=", 1);
        let aql = query.to_aql().unwrap();
        assert!(aql.contains("DATE_MONTH(characterDoc.`born_at`) == @"));
        assert!(aql.contains("DATE_DAY(characterDoc.`born_at`) == @"));
    }

    #[test]
    fn test_or_where_not_null() {
        let query = table("characters")
            .where_null("killed_by")
            .or_where_not_null("dead_at");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters FILTER characterDoc.`killed_by` == null OR characterDoc.`dead_at` != null RETURN characterDoc"
        );
    }

    #[test]
    fn test_no_leading_connective() {
        let query = table("characters").or_where(("alive", true));
        let aql = query.to_aql().unwrap();
        assert!(aql.contains("FILTER characterDoc.`alive`"));
        assert!(!aql.contains("FILTER OR"));
    }
}
