//! Autopilot director for headless runs.
//!
//! The autopilot plays both sides of the switchboard: it opens calls of a
//! random kind at random positions on a fixed cadence, and sends idle
//! pooled agents to unanswered calls first-fit, up to each call's
//! recommended team size.

use dispatch_core::config::SpawningConfig;
use dispatch_core::director::{DirectorError, DispatchDirector, DispatchOrder, DispatchSnapshot};
use dispatch_types::{AgentId, Position};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Spawns calls and dispatches agents on its own.
#[derive(Debug)]
pub struct AutoDispatcher {
    spawning: SpawningConfig,
    rng: SmallRng,
    next_call_at: f64,
}

impl AutoDispatcher {
    /// Create an autopilot. The first call opens on the first tick.
    pub fn new(spawning: SpawningConfig, seed: u64) -> Self {
        Self {
            spawning,
            rng: SmallRng::seed_from_u64(seed),
            next_call_at: 0.0,
        }
    }

    fn random_position(&mut self) -> Position {
        let min = self.spawning.area_min;
        let max = self.spawning.area_max;
        Position::new(
            self.span(min.x, max.x),
            self.span(min.y, max.y),
            self.span(min.z, max.z),
        )
    }

    fn span(&mut self, a: f64, b: f64) -> f64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if hi - lo <= f64::EPSILON {
            lo
        } else {
            self.rng.random_range(lo..hi)
        }
    }

    fn spawn_order(&mut self, snapshot: &DispatchSnapshot) -> Option<DispatchOrder> {
        if snapshot.now < self.next_call_at || snapshot.call_types.is_empty() {
            return None;
        }
        let open = u32::try_from(snapshot.open_calls.len()).unwrap_or(u32::MAX);
        if open >= self.spawning.max_open_calls {
            return None;
        }
        self.next_call_at = snapshot.now + self.spawning.call_interval_seconds.max(0.0);
        let index = self.rng.random_range(0..snapshot.call_types.len());
        let call = snapshot.call_types.get(index)?.clone();
        let position = self.random_position();
        debug!(call = %call, x = position.x, y = position.y, "Autopilot opening call");
        Some(DispatchOrder::CreateCall { call, position })
    }
}

impl DispatchDirector for AutoDispatcher {
    fn plan(&mut self, snapshot: &DispatchSnapshot) -> Result<Vec<DispatchOrder>, DirectorError> {
        let mut orders = Vec::new();

        let mut idle: Vec<AgentId> = snapshot
            .available
            .iter()
            .filter(|agent| agent.idle)
            .map(|agent| agent.agent_id)
            .collect();
        for call in snapshot.unanswered() {
            if idle.is_empty() {
                break;
            }
            let wanted = usize::try_from(call.recommended_agents.max(1)).unwrap_or(1);
            let take = wanted.min(idle.len());
            let agents: Vec<AgentId> = idle.drain(..take).collect();
            orders.push(DispatchOrder::Dispatch {
                mission_id: call.mission_id,
                agents,
            });
        }

        if let Some(order) = self.spawn_order(snapshot) {
            orders.push(order);
        }
        Ok(orders)
    }
}
