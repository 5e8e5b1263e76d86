//! Episode loop: one agent, one session, one connection.
//!
//! The runner is the session's single writer. It alternates between
//! applying inbound messages (in arrival order) and acting through the
//! action mask; rewards are settled against the previous snapshot each time
//! the state moves, so every hit-point delta is counted exactly once.
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use protocol::{ClientMessage, ServerMessage};
use rl_env::{ActionMask, Observation, RewardShaper, decode_action};
use session::PlayerSession;
use transport::TransportHandle;

use crate::policy::Policy;

/// Idle wait before re-evaluating the world when no message arrives.
const IDLE_POLL: Duration = Duration::from_secs(1);
/// Cap on outbound actions per episode, against runaway fights.
const MAX_STEPS: u32 = 500;
/// Consecutive idle polls tolerated before declaring the episode stalled.
const MAX_IDLE_ROUNDS: u32 = 120;

/// Outcome of one finished episode.
#[derive(Clone, Copy, Debug)]
pub struct EpisodeStats {
    pub steps: u32,
    pub reward: f32,
    pub won: Option<bool>,
}

pub struct EpisodeRunner {
    label: String,
    handle: TransportHandle,
    inbound: broadcast::Receiver<ServerMessage>,
    session: PlayerSession,
    shaper: RewardShaper,
    policy: Box<dyn Policy>,
}

impl EpisodeRunner {
    pub async fn new(
        label: String,
        handle: TransportHandle,
        shaper: RewardShaper,
        policy: Box<dyn Policy>,
    ) -> Self {
        let inbound = handle.subscribe().await;
        Self {
            label,
            handle,
            inbound,
            session: PlayerSession::new(),
            shaper,
            policy,
        }
    }

    /// Runs the configured number of episodes, resetting the session
    /// between them.
    pub async fn run(&mut self, episodes: u32) -> Result<()> {
        self.handshake().await?;
        for episode in 1..=episodes {
            self.join_first_map().await?;
            let stats = self.run_episode().await?;
            info!(
                agent = %self.label,
                episode,
                steps = stats.steps,
                reward = stats.reward,
                won = ?stats.won,
                "episode finished"
            );
            self.leave_map().await;
            self.session.reset();
        }
        Ok(())
    }

    /// Requests a player id and waits for the assignment.
    async fn handshake(&mut self) -> Result<()> {
        self.handle
            .send_and_wait(&ClientMessage::PlayerIdRequest, None, None)
            .await
            .context("player id handshake failed")?;
        // The response reached the reducer through the generic stream; the
        // correlated copy above is control flow only.
        self.drain_pending().await?;
        if self.session.player_id.is_none() {
            bail!("no player id assigned after handshake");
        }
        debug!(agent = %self.label, player_id = ?self.session.player_id, "registered");
        Ok(())
    }

    /// Queries the map list and joins the first offered map.
    async fn join_first_map(&mut self) -> Result<()> {
        if self.session.current_map_id.is_some() {
            return Ok(());
        }
        let response = self
            .handle
            .send_and_wait(&ClientMessage::MapListRequest, None, None)
            .await
            .context("map list query failed")?;
        let ServerMessage::MapListResponse { maps } = response else {
            bail!("unexpected response to map list query");
        };
        let map = maps.first().context("server offered no maps")?;

        self.handle
            .send_and_wait(
                &ClientMessage::JoinMapRequest {
                    map_id: map.id.clone(),
                },
                None,
                None,
            )
            .await
            .with_context(|| format!("failed to join map {}", map.id))?;
        self.drain_pending().await?;
        Ok(())
    }

    /// Leaves the current map between episodes; failure is logged, not
    /// fatal, since the reset still produces a clean slate locally.
    async fn leave_map(&mut self) {
        if let Err(error) = self
            .handle
            .send_and_wait(&ClientMessage::LeaveMapRequest, None, None)
            .await
        {
            warn!(agent = %self.label, %error, "leave map failed");
        }
        let _ = self.drain_pending().await;
    }

    /// Plays until the fight this agent gets into ends.
    async fn run_episode(&mut self) -> Result<EpisodeStats> {
        let mut prev: Option<Observation> = None;
        let mut reward = 0.0f32;
        let mut steps = 0u32;
        let mut idle_rounds = 0u32;

        loop {
            if self.pump().await? {
                idle_rounds = 0;
            } else {
                idle_rounds += 1;
                if idle_rounds >= MAX_IDLE_ROUNDS {
                    bail!("episode stalled: no server traffic");
                }
            }

            let current = Observation::project(&self.session);

            // Settle the previous step's reward now that state has moved.
            if let Some(snapshot) = prev.take() {
                reward += self.shaper.shape(&snapshot, &self.session);
                if snapshot.is_in_fight() && !current.is_in_fight() {
                    return Ok(EpisodeStats {
                        steps,
                        reward,
                        won: self.session.won_last_fight(),
                    });
                }
            }
            prev = Some(current.clone());

            let mask = ActionMask::compute(&self.session);
            if mask.must_wait() {
                // Opponent's turn: nothing is legal, waiting is not an
                // error.
                continue;
            }
            let Some(index) = self.policy.select(&current, &mask) else {
                continue;
            };
            // Anything illegal stops here; the server never sees it.
            let Some(action) = decode_action(&self.session, index) else {
                continue;
            };
            reward += self.shaper.action_penalty(&action);

            if let Some(message) = action.to_message() {
                debug!(agent = %self.label, ?action, "acting");
                self.handle.send(&message).await?;
                steps += 1;
                if steps >= MAX_STEPS {
                    bail!("episode exceeded step budget");
                }
            }
        }
    }

    /// Waits up to [`IDLE_POLL`] for one message, then drains whatever else
    /// is queued. Returns false when the poll went idle.
    async fn pump(&mut self) -> Result<bool> {
        match tokio::time::timeout(IDLE_POLL, self.inbound.recv()).await {
            Ok(Ok(message)) => {
                self.handle_message(message).await?;
                self.drain_pending().await?;
                Ok(true)
            }
            Ok(Err(broadcast::error::RecvError::Lagged(missed))) => {
                warn!(agent = %self.label, missed, "inbound stream lagged");
                Ok(true)
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => {
                bail!("connection lost");
            }
            Err(_) => Ok(false),
        }
    }

    /// Applies all messages already queued, without waiting.
    async fn drain_pending(&mut self) -> Result<()> {
        loop {
            match self.inbound.try_recv() {
                Ok(message) => self.handle_message(message).await?,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(()),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(agent = %self.label, missed, "inbound stream lagged");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    bail!("connection lost");
                }
            }
        }
    }

    /// Runner-level message policy, then the reducer.
    async fn handle_message(&mut self, message: ServerMessage) -> Result<()> {
        // Challenges are accepted automatically; the reducer itself takes
        // no stance on them.
        if let ServerMessage::FightChallengeReceived { challenger_id } = &message {
            debug!(agent = %self.label, challenger = %challenger_id, "accepting challenge");
            self.handle
                .send(&ClientMessage::FightChallengeAccepted {
                    target_id: challenger_id.clone(),
                })
                .await?;
        }
        self.session.apply(&message);
        Ok(())
    }
}
