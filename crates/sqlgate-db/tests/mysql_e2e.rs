//! End-to-end tests against a Docker MySQL container.
//!
//! Run with:
//!   cargo test -p sqlgate-db --test mysql_e2e -- --nocapture
//!
//! Requirements:
//!   - Docker must be running
//!   - Port 3307 must be available (non-standard port to avoid conflicts)
//!
//! Without Docker the test reports the setup failure and returns.

use serde_json::json;
use sqlgate_core::DatabaseCredentials;
use sqlgate_db::{DatabaseError, MySqlExecutor, QueryResult, SqlExecutor};
use std::process::Command;
use std::time::Duration;

const CONTAINER_NAME: &str = "sqlgate_test_mysql";
const MYSQL_PORT: u16 = 3307;
const MYSQL_PASSWORD: &str = "sqlgate_test_password";
const DATABASE_NAME: &str = "sqlgate_test";

const SCHEMA_SQL: &str = "CREATE TABLE inventory (
    id INT PRIMARY KEY AUTO_INCREMENT,
    name VARCHAR(64) NOT NULL,
    qty INT NULL,
    price DECIMAL(10, 2) NOT NULL
)";

const SEED_SQL: &str = "INSERT INTO inventory (name, qty, price) VALUES
    ('widget', 3, 2.50),
    ('gadget', NULL, 10.00)";

struct TestContext {
    executor: MySqlExecutor,
}

impl TestContext {
    async fn setup() -> Result<Self, String> {
        start_mysql_container()?;

        let credentials = DatabaseCredentials::new("root", MYSQL_PASSWORD, DATABASE_NAME);
        let executor = MySqlExecutor::new(MYSQL_PORT, &credentials, Duration::from_secs(5));
        wait_for_mysql(&executor).await?;

        executor
            .execute(SCHEMA_SQL)
            .await
            .map_err(|e| format!("Failed to create schema: {}", e))?;
        executor
            .execute(SEED_SQL)
            .await
            .map_err(|e| format!("Failed to seed data: {}", e))?;

        Ok(Self { executor })
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_mysql_container();
    }
}

fn start_mysql_container() -> Result<(), String> {
    stop_mysql_container();

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("MYSQL_ROOT_PASSWORD={}", MYSQL_PASSWORD),
            "-e",
            &format!("MYSQL_DATABASE={}", DATABASE_NAME),
            "-p",
            &format!("{}:3306", MYSQL_PORT),
            "mysql:8.0",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start MySQL container".to_string());
    }
    Ok(())
}

fn stop_mysql_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

/// MySQL restarts once while initializing; wait for the final server.
async fn wait_for_mysql(executor: &MySqlExecutor) -> Result<(), String> {
    for attempt in 1..=90 {
        if executor.execute("SELECT 1").await.is_ok() {
            println!("MySQL ready after {} attempts", attempt);
            return Ok(());
        }
        if attempt % 10 == 0 {
            println!("Waiting for MySQL... (attempt {})", attempt);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err("MySQL did not become ready in time".to_string())
}

#[tokio::test]
async fn e2e_mysql_executor() {
    let ctx = match TestContext::setup().await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Failed to set up MySQL: {}", e);
            eprintln!("   Make sure Docker is running and port 3307 is available");
            return;
        }
    };

    select_returns_table(&ctx).await;
    show_and_describe_return_tables(&ctx).await;
    mutation_is_committed(&ctx).await;
    comment_prefixed_select_is_a_mutation(&ctx).await;
    errors_are_reported(&ctx).await;
}

async fn select_returns_table(ctx: &TestContext) {
    let result = ctx
        .executor
        .execute("SELECT name, qty, price FROM inventory ORDER BY id")
        .await
        .unwrap();

    let table = result.into_table().expect("SELECT returns a table");
    assert_eq!(table.columns, vec!["name", "qty", "price"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0][..2], [json!("widget"), json!(3)]);
    assert_eq!(table.rows[1][..2], [json!("gadget"), json!(null)]);
    assert!(!table.rows[0][2].is_null());
    assert!(table.render().contains("widget"));
}

async fn show_and_describe_return_tables(ctx: &TestContext) {
    let tables = ctx.executor.execute("SHOW TABLES").await.unwrap();
    let tables = tables.into_table().unwrap();
    assert_eq!(tables.rows, vec![vec![json!("inventory")]]);

    let schema = ctx.executor.execute("describe inventory").await.unwrap();
    let schema = schema.into_table().unwrap();
    assert_eq!(schema.columns[0], "Field");
    assert_eq!(schema.row_count(), 4);
}

async fn mutation_is_committed(ctx: &TestContext) {
    let result = ctx
        .executor
        .execute("UPDATE inventory SET qty = 0 WHERE name = 'widget'")
        .await
        .unwrap();
    assert_eq!(result, QueryResult::Affected { rows_affected: 1 });

    // Every call opens its own connection, so this read sees only committed data.
    let check = ctx
        .executor
        .execute("SELECT qty FROM inventory WHERE name = 'widget'")
        .await
        .unwrap();
    assert_eq!(check.into_table().unwrap().rows, vec![vec![json!(0)]]);
}

async fn comment_prefixed_select_is_a_mutation(ctx: &TestContext) {
    let result = ctx.executor.execute("  -- c\nSELECT 1").await.unwrap();
    assert_eq!(result, QueryResult::Affected { rows_affected: 0 });
}

async fn errors_are_reported(ctx: &TestContext) {
    let err = ctx
        .executor
        .execute("SELECT * FROM missing_table")
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Query(_)));
    assert!(err.to_string().contains("missing_table"));
}
