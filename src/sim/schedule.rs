//! Delayed, cancellable simulation tasks
//!
//! Respawns and level-ups happen after a pause. Each task is stamped with the
//! session epoch it was scheduled in; starting, restarting or leaving to the
//! menu bumps the epoch so nothing from an earlier session can fire into the
//! new one.

use serde::{Deserialize, Serialize};

/// Work the progression controller defers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Put a replacement orb on the field
    SpawnOrb,
    /// Advance to the next level, pay the bonus, then spawn
    LevelUp,
}

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    id: u64,
    epoch: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingTask {
    handle: TaskHandle,
    action: ScheduledAction,
    remaining_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    epoch: u64,
    next_id: u64,
    pending: Vec<PendingTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Run `action` once `delay_ms` of simulated time has passed
    pub fn schedule(&mut self, action: ScheduledAction, delay_ms: f64) -> TaskHandle {
        let handle = TaskHandle {
            id: self.next_id,
            epoch: self.epoch,
        };
        self.next_id += 1;
        self.pending.push(PendingTask {
            handle,
            action,
            remaining_ms: delay_ms.max(0.0),
        });
        handle
    }

    /// Cancel a task. Returns false if it already fired or was invalidated.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.handle != handle);
        self.pending.len() != before
    }

    /// Drop every pending task and start a new epoch
    pub fn invalidate(&mut self) {
        if !self.pending.is_empty() {
            log::debug!(
                "Invalidating {} pending task(s) from epoch {}",
                self.pending.len(),
                self.epoch
            );
        }
        self.pending.clear();
        self.epoch += 1;
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|task| task.action == action)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Count down by `dt_ms` and return the actions now due, in the order
    /// they were scheduled
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ScheduledAction> {
        let epoch = self.epoch;
        let mut due = Vec::new();
        self.pending.retain_mut(|task| {
            if task.handle.epoch != epoch {
                log::warn!("Dropping stale task {:?} from epoch {}", task.action, task.handle.epoch);
                return false;
            }
            task.remaining_ms -= dt_ms;
            if task.remaining_ms <= 0.0 {
                due.push(task.action);
                false
            } else {
                true
            }
        });
        due
    }
}
