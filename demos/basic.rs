use rqlite_http::{Params, RqliteClient, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut db = RqliteClient::from_env()?;

    db.execute_single(
        "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
        (),
    )
    .await?;

    db.execute_single("INSERT INTO users (name) VALUES (?)", [Value::text("Kit")])
        .await?;

    let response = db
        .query_single(
            "SELECT id, name FROM users WHERE name = :name",
            Params::named([("name", Value::text("Kit"))]),
        )
        .await?;

    if let Some(rows) = response.results[0].as_query() {
        for row in &rows.values {
            println!("{row:?}");
        }
    }

    Ok(())
}
