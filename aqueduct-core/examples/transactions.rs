use aqueduct_core::executor::ClientResult;
use aqueduct_core::{
    table, Bindings, ClientError, Connection, ConnectionConfig, Cursor, DatabaseClient,
    ExecutableModification, Statement, TransactionCollections, TransactionOptions,
};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};

// Mock client whose first transaction attempt hits a write-write conflict
struct MockClient {
    attempts: AtomicU32,
}

struct MockStatement;

impl Statement for MockStatement {
    async fn execute(self) -> ClientResult<Cursor> {
        Ok(Cursor::default())
    }

    async fn explain(self) -> ClientResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}

impl DatabaseClient for MockClient {
    type Statement = MockStatement;

    fn prepare(&self, _aql: &str, _bindings: &Bindings) -> ClientResult<MockStatement> {
        Ok(MockStatement)
    }

    async fn execute_transaction(
        &self,
        options: &TransactionOptions,
    ) -> ClientResult<serde_json::Value> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        println!("   attempt {}: {}", attempt, options.action);
        if attempt == 1 {
            return Err(ClientError::new(409, 1200, "write-write conflict"));
        }
        Ok(json!({"committed": true}))
    }

    async fn reconnect(&mut self) -> ClientResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> aqueduct_core::Result<()> {
    let client = MockClient {
        attempts: AtomicU32::new(0),
    };
    let mut connection = Connection::new(
        client,
        ConnectionConfig::new().transaction_attempts(3),
    );

    println!("1. Queued writes inside begin/commit:");
    connection.begin_transaction(TransactionCollections::new().write(["characters"]));
    connection
        .table("characters")
        .where_(("id", "NedStark"))
        .update(&mut connection, vec![("alive", false)])
        .await?;
    connection
        .table("characters")
        .where_(("id", "RobbStark"))
        .update(&mut connection, vec![("alive", false)])
        .await?;
    println!("   level before commit: {}", connection.transaction_level());
    let result = connection.commit().await?;
    println!("   result: {:?}\n", result);

    println!("2. Closure-based transaction:");
    let moved = connection
        .transaction(
            TransactionCollections::new().write(["characters", "locations"]),
            3,
            |conn| {
                let leave = conn
                    .table("characters")
                    .where_(("id", "AryaStark"))
                    .update_query(json!({"residence_id": "Braavos"}))?;
                conn.add_transaction_query(&leave, None)?;

                let visit = conn
                    .table("locations")
                    .where_(("id", "Braavos"))
                    .increment_query("visitors", 1)?;
                conn.add_transaction_query(&visit, None)?;
                Ok("AryaStark")
            },
        )
        .await?;
    println!("   moved {}\n", moved);

    println!("3. Rolled back nested level:");
    connection.begin_transaction(TransactionCollections::new());
    connection.add_transaction_query(
        &table("characters").delete_query(Some("JoffreyBaratheon".into()))?,
        None,
    )?;
    connection.begin_transaction(TransactionCollections::new());
    connection.add_transaction_query(&table("characters").truncate_query()?, None)?;
    connection.rollback()?;
    connection.commit().await?;
    println!("   only the delete was committed");

    Ok(())
}
