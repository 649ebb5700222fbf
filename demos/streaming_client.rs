//! Streaming client — sends one task over `tasks/sendSubscribe` and prints
//! every update as it arrives.
//!
//! Start the `streaming_agent` demo first, then:
//! ```sh
//! cargo run --example streaming_client -- "What is Rust?"
//! ```
//!
//! Set `A2A_URL` to target another endpoint.

use a2a_min::builders::ClientBuilder;
use a2a_min::types::{Part, TaskUpdateEvent};
use a2a_min::utils::get_message_text;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let url = std::env::var("A2A_URL").unwrap_or_else(|_| "http://localhost:8000/".to_string());
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is Rust?".to_string());

    let client = ClientBuilder::new(url)
        .with_timeout(Duration::from_secs(300))
        .build();

    let mut stream = client.send_streaming(&query).await?;
    let mut task_id = None;
    while let Some(update) = stream.next().await {
        let update = update?;
        task_id.get_or_insert_with(|| update.task_id().to_string());
        match update {
            TaskUpdateEvent::Status(event) => {
                let text = event
                    .status
                    .message
                    .as_ref()
                    .map(|m| get_message_text(m, ""))
                    .unwrap_or_default();
                let marker = if event.r#final { ", final" } else { "" };
                println!("[{}{}] {}", event.status.state, marker, text);
            }
            TaskUpdateEvent::Artifact(event) => {
                for part in &event.artifact.parts {
                    if let Part::Text { text, .. } = part {
                        println!("[artifact {}] {}", event.artifact.index, text);
                    }
                }
            }
        }
    }

    if let Some(task_id) = task_id {
        let task = client.get_task_by_id(&task_id, None).await?;
        println!("Task {} ended as {}", task.id, task.status.state);
    }

    client.close().await?;
    Ok(())
}
