use aqueduct_core::value::{convert_id_to_key, convert_key_to_id};
use aqueduct_core::{table, Builder, CompiledQuery, Error, QueryBuilder, Value};
use serde_json::json;

/// Placeholder names referenced in AQL text, excluding `@@` collection parameters
fn placeholders(aql: &str) -> Vec<String> {
    let bytes = aql.as_bytes();
    let mut names = Vec::new();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'@' {
            if bytes.get(idx + 1) == Some(&b'@') {
                idx += 2;
                continue;
            }
            let start = idx + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start {
                names.push(aql[start..end].to_string());
            }
            idx = end;
        } else {
            idx += 1;
        }
    }
    names
}

fn assert_bindings_match(compiled: &CompiledQuery) {
    let referenced = placeholders(&compiled.aql);
    for name in &referenced {
        assert!(
            compiled.bindings.contains_key(name),
            "@{name} has no binding in {}",
            compiled.aql
        );
    }
    for name in compiled.bindings.keys() {
        assert!(
            referenced.contains(name),
            "binding {name} is not referenced in {}",
            compiled.aql
        );
    }
}

#[test]
fn test_where_id_targets_key() {
    let query = table("characters").where_(("id", "=", "NedStark"));
    let id = query.query_id();
    assert_eq!(
        query.to_aql().unwrap(),
        format!("FOR characterDoc IN characters FILTER characterDoc.`_key` == @{id}_where_1 RETURN characterDoc")
    );
    assert_eq!(query.to_sql().unwrap(), query.to_aql().unwrap());
}

#[test]
fn test_left_join_keeps_unmatched_documents() {
    let query = table("characters").left_join(
        "locations",
        "characters.residence_id",
        "==",
        "locations.id",
    );
    assert_eq!(
        query.to_aql().unwrap(),
        "FOR characterDoc IN characters LET locationDocList = (FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` RETURN locationDoc) FOR locationDoc IN (LENGTH(locationDocList) > 0) ? locationDocList : [{}] RETURN MERGE(characterDoc, locationDoc)"
    );
}

#[test]
fn test_invalid_order_direction_is_rejected_before_compilation() {
    let query = table("characters").order_by("name", "upwards");
    assert!(matches!(query.error(), Some(Error::InvalidArgument { .. })));
    assert!(matches!(query.to_aql(), Err(Error::InvalidArgument { .. })));
    assert!(query.get_bindings().is_err());
    assert!(query.update_query(json!({"alive": true})).is_err());
}

#[test]
fn test_right_join_is_unsupported() {
    let query = table("characters").right_join("locations", "characters.residence_id", "==", "locations.id");
    assert!(matches!(query.to_aql(), Err(Error::Unsupported { .. })));
}

#[test]
fn test_union_is_one_statement_with_merged_bindings() {
    let query = table("characters")
        .where_(("surname", "Stark"))
        .union(table("characters").where_(("surname", "Snow")));
    let compiled = query.to_compiled().unwrap();

    assert_eq!(compiled.aql.matches("FOR unionResultDoc IN").count(), 1);
    assert_eq!(compiled.bindings.len(), 2);
    assert_bindings_match(&compiled);
}

#[test]
fn test_bindings_round_trip_across_clauses() {
    let query = table("characters")
        .set("house", "Stark")
        .join_with("locations", |join| {
            join.on("characters.residence_id", "==", "locations.id")
                .where_(("locations.region", "North"))
        })
        .where_(("alive", true))
        .where_in("titles", vec!["Lord", "Warden"])
        .where_between("age", vec![14, 40])
        .where_nested(|q| q.where_(("surname", "Stark")).or_where(("surname", "Snow")))
        .where_exists(|q: Builder| q.from("children").where_(("parent", "Ned")))
        .group_by("surname")
        .having(("surname", "!=", "Lannister"))
        .order_by("surname", "desc")
        .limit(5);

    assert_bindings_match(&query.to_compiled().unwrap());
    assert_bindings_match(&query.exists_query().unwrap());

    let writes = table("characters")
        .where_(("surname", "Stark"))
        .where_in("titles", vec!["Lord", "Warden"])
        .order_by("age", "desc")
        .limit(2);
    assert_bindings_match(&writes.update_query(json!({"alive": false})).unwrap());
    assert_bindings_match(&writes.delete_query(None).unwrap());
}

#[test]
fn test_no_dangling_connectives() {
    let queries = [
        table("characters").or_where(("alive", true)),
        table("characters").where_nested(|q| q.or_where(("alive", true))),
        table("characters")
            .group_by("surname")
            .or_having(("surname", "Stark")),
    ];
    for query in queries {
        let aql = query.to_aql().unwrap();
        assert!(!aql.contains("FILTER AND") && !aql.contains("FILTER OR"), "{aql}");
        assert!(!aql.contains("(AND") && !aql.contains("(OR"), "{aql}");
    }
}

#[test]
fn test_recompilation_is_idempotent() {
    let query = table("characters")
        .left_join("locations", "characters.residence_id", "==", "locations.id")
        .select(("surname", "name"))
        .group_by("surname")
        .union(table("characters").select(("surname", "name")).group_by("surname"))
        .order_by("surname", "asc");

    let first = query.to_compiled().unwrap();
    let second = query.to_compiled().unwrap();
    assert_eq!(first, second);
    assert_eq!(query.exists_query().unwrap(), query.exists_query().unwrap());
}

#[test]
fn test_writes_reject_views() {
    let query = Builder::new().from_view("character_view");
    assert!(matches!(
        query.insert_query([json!({"name": "Ned"})]),
        Err(Error::Compilation { .. })
    ));
}

#[test]
fn test_search_requires_view() {
    let query = table("characters").search("name", "Ned", None);
    assert!(matches!(query.to_aql(), Err(Error::Unsupported { .. })));
}

#[test]
fn test_id_and_key_round_trip() {
    let rows = [
        json!({"id": "NedStark", "name": "Ned", "age": 41}),
        json!({"id": 7, "house": "Stark"}),
        json!({"name": "Hodor"}),
        json!({"id": "NedStark", "house": {"id": "Stark", "seat": {"id": "Winterfell"}}}),
        json!({"id": "JonSnow", "allies": [{"id": "SamwellTarly"}, {"name": "Ghost"}]}),
    ];
    for row in rows {
        let stored = convert_id_to_key(Value::from(row.clone())).to_json();
        assert!(stored.get("id").is_none());
        assert_eq!(convert_key_to_id(stored), row);
    }
}

#[test]
fn test_union_of_projections_sorts_by_projected_id() {
    let query = table("characters")
        .select(("id", "name"))
        .where_(("surname", "Stark"))
        .union(table("characters").select(("id", "name")).where_(("surname", "Snow")))
        .order_by("id", "asc");
    let aql = query.to_aql().unwrap();

    assert!(aql.contains("SORT unionResultDoc.`id` ASC"), "{aql}");
    assert!(!aql.contains("unionResultDoc.`_key`"), "{aql}");
}

#[test]
fn test_sub_query_over_outer_collection_declares_its_own_variable() {
    let oldest = table("characters").select("age").order_by("age", "desc").limit(1);
    let sub_id = oldest.query_id();
    let query = table("characters").where_(("age", "==", oldest));
    let aql = query.to_aql().unwrap();

    assert_eq!(aql.matches("FOR characterDoc IN characters").count(), 1, "{aql}");
    assert!(aql.contains(&format!("FOR characterDoc{sub_id} IN characters")), "{aql}");
    assert_bindings_match(&query.to_compiled().unwrap());
}

#[test]
fn test_non_ascii_aliases() {
    let query = table("İ as é").select("name as ß");
    assert_eq!(query.to_aql().unwrap(), "FOR é IN `İ` RETURN {\"ß\": é.`name`}");
}
