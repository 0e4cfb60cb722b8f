//! End-to-end demo against a configured server.
//!
//! Expects a `conf.json` in the working directory (or a path as the first
//! argument) listing at least a server named `gmsv`:
//!
//! ```json
//! [{"name": "gmsv", "host": "127.0.0.1", "port": 9000}]
//! ```

use muxwire::prelude::*;
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let conf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./conf.json".to_string());

    let registry = ConnectionRegistry::new();
    let loaded = registry.load_server_info(&conf)?;
    println!("loaded {loaded} server record(s) from {conf}");

    if !registry.create_connection("gmsv").await? {
        eprintln!("no server named \"gmsv\" in {conf}");
        return Ok(());
    }

    registry.set_receive_listener(
        "gmsv",
        "test",
        FnListener::new(|contents: &serde_json::Value| {
            println!("received on \"test\": {contents}");
        }),
    )?;
    registry.set_error_listener(
        "gmsv",
        FnErrorListener::new(|error: &ClientError| {
            eprintln!("receive error: {error}");
        }),
    )?;

    registry.add_send_data("gmsv", "test11", json!("tst"))?;
    registry.add_send_data("gmsv", "test12", json!("tst"))?;
    registry.add_send_data("gmsv", "test13", json!("tst"))?;
    registry.send("gmsv", "test").await?;

    // Give the server a moment to respond before hanging up.
    tokio::time::sleep(Duration::from_millis(500)).await;

    registry.close("gmsv")?;
    Ok(())
}
