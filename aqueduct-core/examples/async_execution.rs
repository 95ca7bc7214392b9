use aqueduct_core::executor::ClientResult;
use aqueduct_core::{
    table, Bindings, Connection, ConnectionConfig, Cursor, DatabaseClient, ExecutableModification,
    ExecutableQuery, Statement, TransactionOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Character {
    id: String,
    name: String,
    surname: String,
}

// Mock client for demonstration; a real client would speak HTTP to ArangoDB
struct MockClient;

struct MockStatement {
    aql: String,
}

impl Statement for MockStatement {
    async fn execute(self) -> ClientResult<Cursor> {
        println!("EXECUTE: {}", self.aql);
        if self.aql.contains("aggregateResult") {
            return Ok(Cursor::new(vec![json!({"aggregate": 3})], 0));
        }
        if self.aql.starts_with("FOR characterDoc") && !self.aql.contains("UPDATE") {
            return Ok(Cursor::new(
                vec![
                    json!({"_key": "NedStark", "name": "Ned", "surname": "Stark"}),
                    json!({"_key": "AryaStark", "name": "Arya", "surname": "Stark"}),
                    json!({"_key": "SansaStark", "name": "Sansa", "surname": "Stark"}),
                ],
                0,
            ));
        }
        Ok(Cursor::new(vec![json!("JonSnow")], 1))
    }

    async fn explain(self) -> ClientResult<serde_json::Value> {
        Ok(json!({"plan": {"nodes": [], "estimatedCost": 3}}))
    }
}

impl DatabaseClient for MockClient {
    type Statement = MockStatement;

    fn prepare(&self, aql: &str, _bindings: &Bindings) -> ClientResult<MockStatement> {
        Ok(MockStatement {
            aql: aql.to_string(),
        })
    }

    async fn execute_transaction(
        &self,
        options: &TransactionOptions,
    ) -> ClientResult<serde_json::Value> {
        println!("TRANSACTION: {}", options.action);
        Ok(serde_json::Value::Null)
    }

    async fn reconnect(&mut self) -> ClientResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> aqueduct_core::Result<()> {
    let mut connection = Connection::new(MockClient, ConnectionConfig::new().name("got"));
    connection.listen(|event| println!("  took {:?}", event.time));

    let starks: Vec<Character> = connection
        .table("characters")
        .where_(("surname", "Stark"))
        .get_as(&mut connection)
        .await?;
    println!("Found {} Starks, first is {:?}\n", starks.len(), starks[0]);

    let count = connection
        .table("characters")
        .where_(("surname", "Stark"))
        .count(&mut connection)
        .await?;
    println!("Count: {}\n", count);

    let id = connection
        .table("characters")
        .insert_get_id(&mut connection, json!({"id": "JonSnow", "name": "Jon", "surname": "Snow"}))
        .await?;
    println!("Inserted: {:?}\n", id);

    let updated = connection
        .table("characters")
        .where_(("id", "JonSnow"))
        .update(&mut connection, vec![("alive", true)])
        .await?;
    println!("Updated {} document(s)\n", updated);

    let plan = connection
        .table("characters")
        .explain(&mut connection)
        .await?;
    println!("Plan: {}", plan);

    Ok(())
}
