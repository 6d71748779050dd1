//! Terminal front-end: reads one query per line and prints what the
//! coordinator settles on. Expects `intent-api` to be running.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use intent_api::intent::remote::DEFAULT_TIMEOUT;
use intent_api::intent::{HttpIntentClient, Outcome, RequestCoordinator, RequestState};

const NO_INTENT_MESSAGE: &str = "未识别到明确的购物意图，请尝试输入商品链接或描述。";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intent_api=warn")),
        )
        .init();

    let base_url =
        std::env::var("INTENT_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let timeout = std::env::var("INTENT_API_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let coordinator =
        RequestCoordinator::new(Arc::new(HttpIntentClient::new(&base_url, timeout)?));
    let mut updates = coordinator.subscribe();

    println!("Paste a product link or describe what you want (Ctrl-D to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        coordinator.set_user_input(line.as_str());
        if coordinator.submit(&line).is_none() {
            continue;
        }
        println!("Analyzing...");

        let settled = updates.wait_for(|s| !s.is_loading).await?.clone();
        render(&settled);
    }

    Ok(())
}

fn render(state: &RequestState) {
    match state.outcome() {
        Outcome::Found(_) => {
            for product in &state.products {
                println!("[{}] {}  价格：¥{}", product.id, product.title, product.price);
                println!("    {}", product.url);
                println!("    {}", product.image);
            }
        }
        Outcome::NoIntent => println!("{NO_INTENT_MESSAGE}"),
        Outcome::Failed => {
            eprintln!("Error: {}", state.error.as_deref().unwrap_or_default())
        }
        Outcome::Idle | Outcome::Loading => {}
    }
}
