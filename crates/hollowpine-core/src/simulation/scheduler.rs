//! Virtual wall clock with cancellable timers
//!
//! Everything the game does "every N milliseconds" (battery drain, flicker
//! steps, light transitions, ghost spawn rolls) is a timer here instead of a
//! free-running interval. Timers fire in due-time order, ties broken by the
//! order they were armed, which keeps replays deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use ahash::AHashMap;

/// Cancellation token for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Battery drain tick
    BatteryDrain,
    /// One randomized intensity change in a low-battery flicker episode
    FlickerStep,
    /// End of a low-battery flicker episode
    FlickerEnd,
    /// Ghost-triggered lantern toggle
    LanternToggle,
    /// One interpolation step of a day/night transition
    DayNightStep,
    /// Automatic day/night toggle
    DayNightAuto,
    /// Roll for a ghost spawn
    PursuerSpawnCheck,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    due: Duration,
    period: Option<Duration>,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub at: Duration,
}

/// Single-threaded timer queue over a virtual clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    /// (due, arm order, id); cancelled entries are skipped lazily
    queue: BinaryHeap<Reverse<(Duration, u64, TimerId)>>,
    timers: AHashMap<TimerId, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since session start
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire once after `delay`
    pub fn schedule_once(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        self.arm(delay, None, kind)
    }

    /// Fire every `period`, first after one period
    pub fn schedule_interval(&mut self, period: Duration, kind: TimerKind) -> TimerId {
        // A zero period would never let the clock advance
        let period = period.max(Duration::from_millis(1));
        self.arm(period, Some(period), kind)
    }

    fn arm(&mut self, delay: Duration, period: Option<Duration>, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay;
        self.timers.insert(id, Timer { kind, due, period });
        self.push(due, id);
        id
    }

    fn push(&mut self, due: Duration, id: TimerId) {
        self.queue.push(Reverse((due, self.next_seq, id)));
        self.next_seq += 1;
    }

    /// Cancel a timer; cancelling an already fired or cancelled timer is a no-op
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancel `slot`'s timer if any and clear the slot
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    /// Cancel every outstanding timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Pop the next live timer due at or before `until`, moving the clock to its due time
    ///
    /// Interval timers are re-armed before returning, so cancelling them from
    /// the dispatch code works as expected.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        while let Some(&Reverse((due, _, id))) = self.queue.peek() {
            if due > until {
                return None;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get(&id).copied() else {
                continue; // cancelled
            };
            if timer.due != due {
                continue; // stale entry from an earlier arming
            }

            self.now = self.now.max(due);
            match timer.period {
                Some(period) => {
                    let next = due + period;
                    if let Some(live) = self.timers.get_mut(&id) {
                        live.due = next;
                    }
                    self.push(next, id);
                }
                None => {
                    self.timers.remove(&id);
                }
            }

            return Some(Fired {
                id,
                kind: timer.kind,
                at: due,
            });
        }
        None
    }

    /// Move the clock forward after all due timers were popped
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(scheduler: &mut Scheduler, until: Duration) -> Vec<(TimerKind, Duration)> {
        let mut fired = Vec::new();
        while let Some(f) = scheduler.pop_due(until) {
            fired.push((f.kind, f.at));
        }
        scheduler.advance_to(until);
        fired
    }

    #[test]
    fn test_once_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(ms(100), TimerKind::FlickerEnd);

        assert!(drain(&mut scheduler, ms(99)).is_empty());
        assert_eq!(drain(&mut scheduler, ms(100)), vec![(TimerKind::FlickerEnd, ms(100))]);
        assert!(drain(&mut scheduler, ms(1000)).is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_interval_fires_repeatedly() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interval(ms(1000), TimerKind::BatteryDrain);

        let fired = drain(&mut scheduler, ms(3500));
        assert_eq!(
            fired,
            vec![
                (TimerKind::BatteryDrain, ms(1000)),
                (TimerKind::BatteryDrain, ms(2000)),
                (TimerKind::BatteryDrain, ms(3000)),
            ]
        );
        assert_eq!(scheduler.now(), ms(3500));
    }

    #[test]
    fn test_fires_in_due_order_across_kinds() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interval(ms(300), TimerKind::BatteryDrain);
        scheduler.schedule_once(ms(200), TimerKind::FlickerEnd);
        scheduler.schedule_interval(ms(250), TimerKind::DayNightStep);

        let kinds: Vec<_> = drain(&mut scheduler, ms(600)).into_iter().collect();
        assert_eq!(
            kinds,
            vec![
                (TimerKind::FlickerEnd, ms(200)),
                (TimerKind::DayNightStep, ms(250)),
                (TimerKind::BatteryDrain, ms(300)),
                (TimerKind::DayNightStep, ms(500)),
                (TimerKind::BatteryDrain, ms(600)),
            ]
        );
    }

    #[test]
    fn test_ties_fire_in_arm_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(ms(50), TimerKind::LanternToggle);
        scheduler.schedule_once(ms(50), TimerKind::FlickerStep);

        let fired = drain(&mut scheduler, ms(50));
        assert_eq!(fired[0].0, TimerKind::LanternToggle);
        assert_eq!(fired[1].0, TimerKind::FlickerStep);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_interval(ms(100), TimerKind::FlickerStep);
        assert!(scheduler.is_scheduled(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(drain(&mut scheduler, ms(1000)).is_empty());
    }

    #[test]
    fn test_cancel_interval_between_pops() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_interval(ms(100), TimerKind::DayNightStep);

        let first = scheduler.pop_due(ms(1000)).unwrap();
        assert_eq!(first.at, ms(100));
        scheduler.cancel(id);
        assert!(scheduler.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn test_cancel_slot_clears_option() {
        let mut scheduler = Scheduler::new();
        let mut slot = Some(scheduler.schedule_once(ms(10), TimerKind::FlickerEnd));
        scheduler.cancel_slot(&mut slot);
        assert!(slot.is_none());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interval(ms(10), TimerKind::BatteryDrain);
        scheduler.schedule_once(ms(20), TimerKind::FlickerEnd);
        scheduler.cancel_all();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(drain(&mut scheduler, ms(100)).is_empty());
    }

    #[test]
    fn test_timer_armed_during_dispatch_fires_in_window() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(ms(100), TimerKind::FlickerStep);

        let first = scheduler.pop_due(ms(500)).unwrap();
        assert_eq!(scheduler.now(), first.at);
        // Armed relative to the firing time, not the window end
        scheduler.schedule_once(ms(50), TimerKind::FlickerEnd);

        let second = scheduler.pop_due(ms(500)).unwrap();
        assert_eq!(second.kind, TimerKind::FlickerEnd);
        assert_eq!(second.at, ms(150));
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interval(Duration::ZERO, TimerKind::FlickerStep);
        assert_eq!(drain(&mut scheduler, ms(3)).len(), 3);
    }
}
