//! Card-battle RL agent harness.
//!
//! Connects N independent agents to the game server, each with its own
//! WebSocket connection, state mirror, and policy, and runs training
//! episodes until the configured count is reached. The policy shipped here
//! is a uniform random stand-in; a trained network plugs in behind the
//! `Policy` trait.
//!
//! Configuration comes from the environment (see `AgentConfig::from_env`);
//! `RUST_LOG` controls log filtering.
mod config;
mod policy;
mod runner;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use rl_env::{RewardConfig, RewardShaper};
use transport::{Transport, TransportConfig};

use crate::config::AgentConfig;
use crate::policy::RandomPolicy;
use crate::runner::EpisodeRunner;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AgentConfig::from_env();
    tracing::info!(?config, "starting harness");

    let mut agents = tokio::task::JoinSet::new();
    for index in 0..config.agent_count {
        let config = config.clone();
        agents.spawn(async move { run_agent(index, config).await });
    }

    let mut failed = 0usize;
    while let Some(joined) = agents.join_next().await {
        if let Err(error) = joined? {
            tracing::error!(%error, "agent failed");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} agent(s) failed");
    }
    Ok(())
}

/// One agent: own connection, own session, no shared mutable state.
async fn run_agent(index: usize, config: AgentConfig) -> Result<()> {
    let transport_config = TransportConfig {
        request_timeout: config.request_timeout,
        ..TransportConfig::default()
    };
    let handle = Transport::connect(&config.server_url, transport_config).await?;

    let shaper = RewardShaper::new(RewardConfig {
        efficiency_bonus: config.efficiency_bonus,
        end_turn_penalty: config.end_turn_penalty,
    });
    let mut runner = EpisodeRunner::new(
        format!("agent-{index}"),
        handle,
        shaper,
        Box::new(RandomPolicy::new()),
    )
    .await;

    runner.run(config.episodes).await
}
