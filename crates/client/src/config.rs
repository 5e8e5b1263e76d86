//! Harness configuration loaded from the process environment.
use std::env;
use std::time::Duration;

/// Configuration for one harness run.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// WebSocket URL of the game server.
    pub server_url: String,
    /// Number of independent agents to run in parallel, each with its own
    /// connection and session.
    pub agent_count: usize,
    /// Episodes (fights) per agent before exiting.
    pub episodes: u32,
    /// Timeout for correlated request/response waits.
    pub request_timeout: Duration,
    /// Reward toggles, see `rl_env::RewardConfig`.
    pub efficiency_bonus: bool,
    pub end_turn_penalty: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080/ws".to_string(),
            agent_count: 1,
            episodes: 10,
            request_timeout: Duration::from_secs(5),
            efficiency_bonus: false,
            end_turn_penalty: true,
        }
    }
}

impl AgentConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SERVER_URL` - Game server WebSocket URL (default: ws://127.0.0.1:8080/ws)
    /// - `AGENT_COUNT` - Parallel agents (default: 1)
    /// - `EPISODES` - Episodes per agent (default: 10)
    /// - `REQUEST_TIMEOUT_SECS` - Request/response wait in seconds (default: 5)
    /// - `EFFICIENCY_BONUS` - Enable the damage-per-cost reward term (default: false)
    /// - `END_TURN_PENALTY` - Penalize ending the turn without playing (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("SERVER_URL") {
            config.server_url = url;
        }
        if let Some(count) = read_env::<usize>("AGENT_COUNT") {
            config.agent_count = count.max(1);
        }
        if let Some(episodes) = read_env::<u32>("EPISODES") {
            config.episodes = episodes.max(1);
        }
        if let Some(secs) = read_env::<u64>("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(enable) = read_env::<bool>("EFFICIENCY_BONUS") {
            config.efficiency_bonus = enable;
        }
        if let Some(enable) = read_env::<bool>("END_TURN_PENALTY") {
            config.end_turn_penalty = enable;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
