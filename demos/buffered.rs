use rqlite_http::{RqliteClient, Statement, StatementOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut db = RqliteClient::from_env()?;

    db.execute_single(
        "CREATE TABLE IF NOT EXISTS buffered_users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
        (),
    )
    .await?;

    db.start_buffer();
    for name in ["Alice", "Bob", "Charlie"] {
        db.execute(
            false,
            [Statement::positional(
                "INSERT INTO buffered_users (name) VALUES (?)",
                [name],
            )],
        )
        .await?;
    }
    println!("{} statement(s) buffered", db.buffered_len());

    let Some(response) = db.stop_buffer(true).await? else {
        return Ok(());
    };

    for outcome in response.results() {
        match outcome {
            StatementOutcome::Exec(exec) => println!(
                "exec: affected={}, last_insert_id={:?}",
                exec.rows_affected, exec.last_insert_id
            ),
            StatementOutcome::Query(query) => {
                println!("query: {} row(s)", query.values.len());
            }
            StatementOutcome::SqlError { index, message } => {
                eprintln!("sql error at index {index}: {message}");
            }
        }
    }

    Ok(())
}
