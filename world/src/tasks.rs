//! Per-mob cancellable timers driven by the world clock.

use std::{collections::BTreeMap, time::Duration};

use typer_drive_core::MobId;

/// Kinds of deferred work a mob may own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Restore one consumed letter of a regenerator.
    Regenerate,
    /// Flip a stealth mob's visibility.
    ToggleVisibility,
}

/// Snapshot of a pending task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Mob that owns the task.
    pub owner: MobId,
    /// Work performed when the task fires.
    pub kind: TaskKind,
    /// Absolute world time at which the task fires.
    pub due: Duration,
    /// Repeat period for periodic tasks.
    pub period: Option<Duration>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: Duration,
    period: Option<Duration>,
}

/// Timers keyed by `(owner, kind)`; scheduling an existing key re-arms it.
#[derive(Debug, Default)]
pub(crate) struct TaskTable {
    entries: BTreeMap<(MobId, TaskKind), Entry>,
}

impl TaskTable {
    pub(crate) fn schedule(
        &mut self,
        owner: MobId,
        kind: TaskKind,
        due: Duration,
        period: Option<Duration>,
    ) {
        let period = period.filter(|period| !period.is_zero());
        let _ = self.entries.insert((owner, kind), Entry { due, period });
    }

    /// Drops every task owned by `owner`.
    pub(crate) fn sweep(&mut self, owner: MobId) {
        self.entries.retain(|(task_owner, _), _| *task_owner != owner);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes and returns the earliest task due at or before `now`.
    ///
    /// Periodic tasks are re-armed one period after their previous due time,
    /// so a long tick fires them once per elapsed period. Ties resolve by
    /// owner then kind.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<ScheduledTask> {
        let (&(owner, kind), &entry) = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|((owner, kind), entry)| (entry.due, *owner, *kind))?;

        match entry.period {
            Some(period) => {
                let _ = self.entries.insert(
                    (owner, kind),
                    Entry {
                        due: entry.due.saturating_add(period),
                        period: Some(period),
                    },
                );
            }
            None => {
                let _ = self.entries.remove(&(owner, kind));
            }
        }

        Some(ScheduledTask {
            owner,
            kind,
            due: entry.due,
            period: entry.period,
        })
    }

    pub(crate) fn owned_by(&self, owner: MobId) -> Vec<ScheduledTask> {
        self.entries
            .iter()
            .filter(|((task_owner, _), _)| *task_owner == owner)
            .map(|(&(owner, kind), entry)| ScheduledTask {
                owner,
                kind,
                due: entry.due,
                period: entry.period,
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_existing_timer() {
        let mut table = TaskTable::default();
        let owner = MobId::new(1);
        table.schedule(owner, TaskKind::Regenerate, Duration::from_millis(100), None);
        table.schedule(owner, TaskKind::Regenerate, Duration::from_millis(900), None);

        assert_eq!(table.len(), 1);
        assert!(table.pop_due(Duration::from_millis(500)).is_none());
        let fired = table.pop_due(Duration::from_millis(900)).expect("due");
        assert_eq!(fired.kind, TaskKind::Regenerate);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn periodic_task_fires_once_per_elapsed_period() {
        let mut table = TaskTable::default();
        let owner = MobId::new(3);
        let period = Duration::from_millis(500);
        table.schedule(owner, TaskKind::ToggleVisibility, period, Some(period));

        let mut fired = 0;
        while table.pop_due(Duration::from_millis(1_600)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(table.owned_by(owner)[0].due, Duration::from_millis(2_000));
    }

    #[test]
    fn zero_period_is_treated_as_one_shot() {
        let mut table = TaskTable::default();
        let owner = MobId::new(4);
        table.schedule(owner, TaskKind::ToggleVisibility, Duration::ZERO, Some(Duration::ZERO));
        assert!(table.pop_due(Duration::ZERO).is_some());
        assert!(table.pop_due(Duration::ZERO).is_none());
    }

    #[test]
    fn earliest_task_fires_first() {
        let mut table = TaskTable::default();
        table.schedule(MobId::new(9), TaskKind::Regenerate, Duration::from_millis(10), None);
        table.schedule(MobId::new(2), TaskKind::Regenerate, Duration::from_millis(20), None);

        let first = table.pop_due(Duration::from_millis(50)).expect("due");
        assert_eq!(first.owner, MobId::new(9));
    }

    #[test]
    fn sweep_cancels_all_tasks_of_owner() {
        let mut table = TaskTable::default();
        let owner = MobId::new(5);
        table.schedule(owner, TaskKind::Regenerate, Duration::from_millis(1), None);
        table.schedule(owner, TaskKind::ToggleVisibility, Duration::from_millis(1), None);
        table.schedule(MobId::new(6), TaskKind::Regenerate, Duration::from_millis(1), None);

        table.sweep(owner);
        assert!(table.owned_by(owner).is_empty());
        assert_eq!(table.len(), 1);
    }
}
