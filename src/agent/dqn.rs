use std::path::Path;

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::{DqnConfig, TargetSync};
use crate::error::{DqnetError, Result};
use crate::network::{argmax, max_value, Network};
use crate::replay_buffer::{Experience, ReplayBuffer};
use crate::snapshot::{self, Format};

/// Temporal-difference target for one transition.
///
/// Terminal transitions take the reward alone; otherwise the discounted best
/// next-state value is added.
pub fn td_target(reward: f32, done: bool, gamma: f32, max_next_q: f32) -> f32 {
    if done {
        reward
    } else {
        reward + gamma * max_next_q
    }
}

/// Deep Q-Network agent with experience replay and a target network.
///
/// The agent owns its random generator so exploration, replay sampling and
/// weight initialization are reproducible from a single seed.
///
/// # Example
///
/// ```rust
/// use dqnet::agent::DqnAgent;
/// use dqnet::config::DqnConfig;
/// use ndarray::array;
///
/// let mut config = DqnConfig::new(4, 2);
/// config.hidden_layers = vec![16];
/// config.batch_size = 2;
/// let mut agent = DqnAgent::with_seed(config, 7).unwrap();
///
/// let state = array![0.1, -0.2, 0.3, -0.1];
/// let action = agent.select_action(state.view()).unwrap();
/// let next_state = array![0.15, -0.25, 0.35, -0.05];
/// agent.remember(state.clone(), action, 1.0, next_state.clone(), false).unwrap();
/// agent.remember(next_state, action, 0.0, state, true).unwrap();
///
/// let loss = agent.train().unwrap();
/// assert!(loss.is_finite());
/// ```
#[derive(Clone, Debug)]
pub struct DqnAgent<R: Rng = StdRng> {
    config: DqnConfig,
    q_network: Network,
    target_network: Network,
    replay: ReplayBuffer,
    epsilon: f32,
    step_count: usize,
    rng: R,
}

impl DqnAgent<StdRng> {
    /// Agent driven by a `StdRng` seeded with `seed`.
    pub fn with_seed(config: DqnConfig, seed: u64) -> Result<Self> {
        DqnAgent::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DqnAgent<R> {
    /// Validate `config`, build the Q-network and clone it into the target network.
    pub fn new(config: DqnConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let q_network = Network::new(&config.network_config(), &mut rng)?;
        let target_network = q_network.clone();
        let replay = ReplayBuffer::new(config.buffer_capacity)?;

        debug!(
            state_size = config.state_size,
            action_size = config.action_size,
            parameters = q_network.parameter_count(),
            target_sync = ?config.target_sync,
            "created dqn agent"
        );

        Ok(DqnAgent {
            epsilon: config.epsilon_initial,
            config,
            q_network,
            target_network,
            replay,
            step_count: 0,
            rng,
        })
    }

    /// Epsilon-greedy choice: uniformly random with probability `epsilon`, greedy otherwise.
    pub fn select_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        self.check_state(state)?;
        if self.rng.gen::<f32>() < self.epsilon {
            return Ok(self.rng.gen_range(0..self.config.action_size));
        }
        self.best_action(state)
    }

    /// Greedy action; the first maximal Q-value wins ties.
    pub fn best_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        let q_values = self.q_values(state)?;
        argmax(q_values.view())
            .ok_or_else(|| DqnetError::width("q-value vector", self.config.action_size, 0))
    }

    pub fn q_values(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_state(state)?;
        self.q_network.predict(state)
    }

    /// Store a transition in the replay buffer.
    pub fn remember(
        &mut self,
        state: Array1<f32>,
        action: usize,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) -> Result<()> {
        self.check_state(state.view())?;
        self.check_state(next_state.view())?;
        if action >= self.config.action_size {
            return Err(DqnetError::InvalidAction {
                action,
                action_count: self.config.action_size,
            });
        }
        self.replay.add(Experience::new(state, action, reward, next_state, done));
        Ok(())
    }

    /// TD target of `experience`, bootstrapped from the target network.
    pub fn td_target_for(&mut self, experience: &Experience) -> Result<f32> {
        if experience.done {
            return Ok(experience.reward);
        }
        let next_q = self.target_network.predict(experience.next_state.view())?;
        let max_next = max_value(next_q.view()).unwrap_or(0.0);
        Ok(td_target(experience.reward, false, self.config.gamma, max_next))
    }

    /// One DQN training step over a sampled batch; returns the mean loss.
    ///
    /// Returns `0.0` without touching anything while the buffer holds fewer than
    /// `batch_size` transitions.
    pub fn train(&mut self) -> Result<f32> {
        if !self.replay.can_sample(self.config.batch_size) {
            return Ok(0.0);
        }

        let gamma = self.config.gamma;
        let batch = self.replay.sample(self.config.batch_size, &mut self.rng);
        let batch_len = batch.len();
        let mut total_loss = 0.0;

        for exp in batch {
            let target_q = if exp.done {
                exp.reward
            } else {
                let next_q = self.target_network.predict(exp.next_state.view())?;
                td_target(exp.reward, false, gamma, max_value(next_q.view()).unwrap_or(0.0))
            };

            let mut targets = self.q_network.predict(exp.state.view())?;
            targets[exp.action] = target_q;
            total_loss += self.q_network.train(exp.state.view(), targets.view())?;
        }

        self.step_count += 1;
        self.sync_target_network()?;
        self.decay_epsilon();

        let loss = total_loss / batch_len as f32;
        trace!(step = self.step_count, loss, epsilon = self.epsilon, batch = batch_len, "dqn train step");
        Ok(loss)
    }

    /// Up to `steps` training steps; steps the buffer cannot serve are skipped.
    ///
    /// Returns the mean loss over the steps that actually ran.
    pub fn train_steps(&mut self, steps: usize) -> Result<f32> {
        let mut total = 0.0;
        let mut trained = 0usize;
        for _ in 0..steps {
            if self.replay.can_sample(self.config.batch_size) {
                total += self.train()?;
                trained += 1;
            }
        }
        Ok(if trained > 0 { total / trained as f32 } else { 0.0 })
    }

    fn sync_target_network(&mut self) -> Result<()> {
        match self.config.target_sync {
            TargetSync::Soft { tau } => self.target_network.soft_update(&self.q_network, tau),
            TargetSync::Hard { every } => {
                if self.step_count % every == 0 {
                    debug!(step = self.step_count, "hard target network sync");
                    self.target_network.copy_weights_from(&self.q_network)?;
                }
                Ok(())
            }
        }
    }

    /// Force a full copy of the Q-network into the target network.
    pub fn sync_target(&mut self) -> Result<()> {
        debug!(step = self.step_count, "forced target network sync");
        self.target_network.copy_weights_from(&self.q_network)
    }

    /// Multiply epsilon by the decay factor, never dropping below `epsilon_min`.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Clamped into `[epsilon_min, epsilon_initial]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(self.config.epsilon_min, self.config.epsilon_initial);
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    pub fn replay_len(&self) -> usize {
        self.replay.len()
    }

    pub fn clear_replay(&mut self) {
        self.replay.clear();
    }

    pub fn q_network(&self) -> &Network {
        &self.q_network
    }

    pub fn target_network(&self) -> &Network {
        &self.target_network
    }

    #[cfg(test)]
    pub(crate) fn target_network_mut(&mut self) -> &mut Network {
        &mut self.target_network
    }

    #[cfg(test)]
    pub(crate) fn q_network_mut(&mut self) -> &mut Network {
        &mut self.q_network
    }

    /// Weight snapshot of the Q-network, usable for inference on its own.
    pub fn get_policy(&self) -> Network {
        self.q_network.clone()
    }

    /// Overwrite both the Q-network and the target network with `policy`.
    pub fn load_policy(&mut self, policy: &Network) -> Result<()> {
        self.q_network.check_same_topology(policy)?;
        self.q_network.copy_weights_from(policy)?;
        self.target_network.copy_weights_from(policy)
    }

    pub fn save_policy<P: AsRef<Path>>(&self, path: P, format: Format) -> Result<()> {
        snapshot::save(&self.q_network, path, format)
    }

    pub fn load_policy_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let policy = snapshot::load(path)?;
        self.load_policy(&policy)
    }

    fn check_state(&self, state: ArrayView1<f32>) -> Result<()> {
        if state.len() != self.config.state_size {
            return Err(DqnetError::width("state", self.config.state_size, state.len()));
        }
        Ok(())
    }
}
