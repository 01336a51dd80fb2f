//! # Reinforcement Learning Agents Module
//!
//! A [`DqnAgent`] couples an online Q-network, a structurally identical target
//! network, a [`ReplayBuffer`](crate::replay_buffer::ReplayBuffer) and an
//! epsilon-greedy exploration schedule.
//!
//! ## Training step
//!
//! 1. Sample `batch_size` distinct transitions (no-op while the buffer is short).
//! 2. For each one, the TD target is `reward` when `done`, otherwise
//!    `reward + gamma * max(target_network(next_state))`.
//! 3. The Q-network is trained toward its own prediction with only the taken
//!    action's entry replaced by the TD target.
//! 4. The target network follows: a hard copy every `every` steps, or a Polyak
//!    update with `tau` after every step.
//! 5. Epsilon decays multiplicatively and is floored at `epsilon_min`.

mod dqn;
pub use dqn::{td_target, DqnAgent};
