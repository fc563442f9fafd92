use polar_flow_client::{FlowClient, config::Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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

    let cfg = Config::from_env()?;
    let client = FlowClient::from_config(&cfg)?;
    client.login_with_config(&cfg).await?;

    let wanted = std::env::args().nth(1);
    let list = client.iter_activities(None, None).await?;
    for activity in list.iter() {
        let activity = activity?;
        if wanted
            .as_deref()
            .is_some_and(|id| id != activity.list_item_id())
        {
            continue;
        }
        let export = activity.fetch_table().await?;
        println!("{activity}");
        for (k, v) in &export.header {
            println!("  {k}: {v}");
        }
        println!(
            "  {} samples, columns: {}",
            export.table.len(),
            export.table.columns.join(" | ")
        );
        return Ok(());
    }

    eprintln!("no matching activity in the last 30 days");
    Ok(())
}
