use aqueduct_core::{op, raw, table, Builder, QueryBuilder};
use serde_json::json;

fn main() {
    // FOR ... FILTER ... RETURN with clean where syntax
    let living_starks = table("characters")
        .select(("id", "name", "surname"))
        .where_(("surname", "Stark")) // Defaults to ==
        .where_(("age", op::GT, 12)) // Using op constants
        .where_(("name", "LIKE", "%a%")) // Using string operators
        .where_not_null("alive")
        .order_by("name", "asc")
        .limit(10)
        .offset(5);

    println!("AQL: {}", living_starks.to_aql().unwrap());
    println!("Bindings: {:?}\n", living_starks.get_bindings().unwrap());

    // Left joins compile to a LET + conditional FOR
    let with_residence = table("characters")
        .left_join("locations", "characters.residence_id", "==", "locations.id")
        .select(("characters.*", "locations.name as residence"));
    println!("LEFT JOIN: {}\n", with_residence.to_aql().unwrap());

    // Grouping collects the columns that are not grouped
    let families = table("characters")
        .group_by("surname")
        .select(("surname", "name"))
        .having(("surname", "!=", aqueduct_core::Value::Null));
    println!("GROUP BY: {}\n", families.to_aql().unwrap());

    // Nested conditions and trusted expressions
    let nested = table("characters")
        .where_(("alive", true))
        .where_nested(|q| q.where_(("surname", "Stark")).or_where(("surname", "Snow")))
        .where_(("age", ">", raw("characterDoc.`min_age`")));
    println!("NESTED: {}\n", nested.to_aql().unwrap());

    // Sub-queries as projections
    let with_children = table("characters").select_sub(
        |q: Builder| {
            q.from("children")
                .where_column("children.parent_id", "==", "characters.id")
                .select("name")
        },
        "childNames",
    );
    println!("SUB-SELECT: {}\n", with_children.to_aql().unwrap());

    // Unions iterate the combined result once more
    let everyone = table("characters")
        .select("name")
        .union_all(table("dragons").select("name"))
        .order_by("name", "asc");
    println!("UNION: {}\n", everyone.to_aql().unwrap());

    // Writes compile to complete statements with their own bindings
    let insert = table("characters")
        .insert_query([json!({"id": "NedStark", "name": "Ned", "surname": "Stark"})])
        .unwrap();
    println!("INSERT: {}", insert.aql);

    let update = table("characters")
        .where_(("id", "NedStark"))
        .update_query(json!({"alive": false}))
        .unwrap();
    println!("UPDATE: {}", update.aql);

    let delete = table("characters")
        .delete_query(Some("NedStark".into()))
        .unwrap();
    println!("DELETE: {}", delete.aql);

    // Validation errors surface at compile time
    let invalid = table("characters").order_by("name", "sideways");
    match invalid.to_aql() {
        Ok(aql) => println!("Unexpected: {}", aql),
        Err(err) => println!("\nRejected: {}", err),
    }
}
