//! Send one message to the configured assistant and print the reply.
//!
//! Usage:
//!   OPENAI_API_KEY=... ASSISTANT_ID=... cargo run -p openai-assistant --example test_chat -- "What does the premium plan cost?"

use std::time::{Duration, Instant};

use openai_assistant::{AssistantApi, MessageRole, OpenAiAssistant};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hi! What can you help me with?".to_string());

    let assistant = OpenAiAssistant::from_env()?;
    let thread = assistant.create_thread().await?;
    println!("Thread: {}", thread);

    assistant.add_user_message(&thread, &text).await?;
    let run = assistant.create_run(&thread).await?;

    let started = Instant::now();
    let mut status = run.status;
    while !status.is_terminal() {
        if started.elapsed() > Duration::from_secs(60) {
            println!("Gave up after 60s (last status: {})", status);
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        status = assistant.retrieve_run(&thread, &run.id).await?.status;
    }

    println!("Run finished: {} ({:.1}s)", status, started.elapsed().as_secs_f32());

    for message in assistant.list_messages(&thread, 10).await?.iter().rev() {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
        };
        println!("[{}] {}", who, message.text);
    }

    Ok(())
}
