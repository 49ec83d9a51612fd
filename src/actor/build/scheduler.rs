//! Rebuild admission control.
//!
//! At most one cycle runs at a time. Changes that arrive while a cycle is
//! running are merged into a single pending trigger, which starts as soon
//! as the running cycle finishes.

use crate::actor::messages::Change;

/// Stage of the rebuild pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildState {
    #[default]
    Idle,
    /// Build-start hooks (the native build) are running
    Building,
    /// Emitting the bundle
    Bundling,
}

/// Changes that caused a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    pub changes: Vec<Change>,
}

impl Trigger {
    pub fn new(changes: Vec<Change>) -> Self {
        let mut trigger = Self::default();
        trigger.merge(changes);
        trigger
    }

    /// Merge changes; the latest kind per path wins.
    fn merge(&mut self, changes: Vec<Change>) {
        for (path, kind) in changes {
            match self.changes.iter_mut().find(|(p, _)| *p == path) {
                Some(existing) => existing.1 = kind,
                None => self.changes.push((path, kind)),
            }
        }
    }

    /// Initial build, not caused by a file change.
    pub fn is_initial(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// Run this trigger now
    Start(Trigger),
    /// A cycle is running; the changes were merged into the pending trigger
    Queued,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    state: RebuildState,
    pending: Option<Trigger>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, changes: Vec<Change>) -> Admission {
        if self.state == RebuildState::Idle {
            self.state = RebuildState::Building;
            return Admission::Start(Trigger::new(changes));
        }
        self.pending
            .get_or_insert_with(Trigger::default)
            .merge(changes);
        Admission::Queued
    }

    pub fn enter(&mut self, stage: RebuildState) {
        self.state = stage;
    }

    /// End the running cycle, handing back the pending trigger if any.
    pub fn finish(&mut self) -> Option<Trigger> {
        match self.pending.take() {
            Some(next) => {
                self.state = RebuildState::Building;
                Some(next)
            }
            None => {
                self.state = RebuildState::Idle;
                None
            }
        }
    }
}
