// utils/timeline.rs

/// Handle returned by [`Timeline::schedule`], used to cancel a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<E> {
    id: u64,
    fire_at: f64,
    event: E,
}

/// One-shot timers measured against an absolute clock (seconds).
///
/// Events are returned by [`Timeline::poll`] in order of their fire time, ties
/// broken by scheduling order, no matter how coarse the polling is. A frame that
/// arrives late releases every overdue event at once, still in order.
pub struct Timeline<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Timeline {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules `event` to fire once the clock reaches `fire_at`
    pub fn schedule(&mut self, fire_at: f64, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry { id, fire_at, event });
        TimerHandle(id)
    }

    /// Removes a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != handle.0);
        self.entries.len() != before
    }

    /// Removes and returns all events due at `now`, earliest first
    pub fn poll(&mut self, now: f64) -> Vec<E> {
        if self.entries.iter().all(|entry| entry.fire_at > now) {
            return Vec::new();
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.fire_at <= now);
        self.entries = pending;

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.id.cmp(&b.id)));
        due.into_iter().map(|entry| entry.event).collect()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Timeline::new()
    }
}
