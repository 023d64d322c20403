use admin_http::{init_default_client, HttpConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = HttpConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = init_default_client(&config)?;

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let data: serde_json::Value = client.get_json(&path).await?;

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
