use polar_flow_client::{FlowClient, config::Config};

fn init_tracing() {
    let log_env = std::env::var("POLAR_FLOW_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cfg = Config::from_env()?;
    let client = FlowClient::from_config(&cfg)?;
    client.login_with_config(&cfg).await?;

    let activities = client
        .activities(None, None)
        .await
        .map_err(|e| format!("failed to fetch activities: {}", e))?;

    if activities.is_empty() {
        println!("No activities in the last 30 days");
        return Ok(());
    }

    for a in &activities {
        let url = a.url().unwrap_or("(no url)");
        println!("- {} {}", a, url);
    }
    Ok(())
}
