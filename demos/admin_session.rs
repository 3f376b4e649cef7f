//! Walk through an admin session: sign in, load users and tasks, switch the
//! current user and watch the derived task list follow.
//!
//! Run with `RUST_LOG=admin_store=trace` to see every notification.

use admin_store::{AppStore, Record};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Admin Session Example ===\n");

    let store = AppStore::new();

    println!("1. Setting up subscribers");
    let _auth = store.is_authenticated.subscribe(|signed_in| {
        println!("   [Session] signed in: {}", signed_in);
    });
    let _mine = store.user_tasks.subscribe(|tasks| {
        let titles: Vec<_> = tasks
            .iter()
            .filter_map(|task| task.get("title").and_then(|t| t.as_str()))
            .collect();
        println!("   [My tasks] {:?}", titles);
    });
    let _error = store.error.subscribe(|error| {
        if let Some(error) = error {
            println!("   [Error] {}", error);
        }
    });

    println!("\n2. Loading users and tasks");
    store.users.set(vec![
        Record::new().with("email", "ada@example.com").with("name", "Ada"),
        Record::new().with("email", "lin@example.com").with("name", "Lin"),
    ]);
    store.tasks.set(vec![
        Record::new()
            .with("user", "ada@example.com")
            .with("title", "Review access requests"),
        Record::new()
            .with("user", "lin@example.com")
            .with("title", "Rotate API keys"),
        Record::new()
            .with("user", "ada@example.com")
            .with("title", "Archive stale groups"),
    ]);

    println!("\n3. Signing in as Ada");
    store
        .user
        .set(Some(Record::new().with("email", "ada@example.com")));
    store.is_authenticated.set(true);

    println!("\n4. Switching to Lin");
    store
        .user
        .set(Some(Record::new().with("email", "lin@example.com")));

    println!("\n5. Adding a task for Lin");
    store.tasks.update(|tasks| {
        tasks.push(
            Record::new()
                .with("user", "lin@example.com")
                .with("title", "Audit group membership"),
        );
    });

    println!("\n6. Reporting an error");
    store
        .error
        .set(Some(json!({"status": 403, "message": "forbidden"})));

    println!("\n7. Snapshot:");
    match store.snapshot().to_json() {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("   could not serialize snapshot: {}", err),
    }

    println!("\n8. Resetting the store");
    store.reset();

    println!("\n✓ Example complete!");
}
