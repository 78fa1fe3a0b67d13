use codeduel::{BattleServer, ServerConfig};
use codeduel_judge::SandboxJudge;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let judge = SandboxJudge::new(
        config.judge_program.clone(),
        config.judge_args.clone(),
        config.judge_timeout,
    );

    let server = BattleServer::<SandboxJudge>::builder().config(config).build(judge).await?;
    tracing::info!(addr = %server.local_addr()?, "codeduel listening");

    server.run().await?;
    Ok(())
}
