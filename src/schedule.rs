use crate::dom::NodeId;

/// Work a page behavior has parked on the virtual clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerTask {
    RevertSubmitNotice {
        form: NodeId,
        success: Option<NodeId>,
    },
}

/// Snapshot of one queued timer, ordered by due time then insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct QueuedTimer {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) task: TimerTask,
}

/// The virtual clock and the timer queue it drives. Nothing fires on
/// its own; the owning page decides when to advance and what to run.
#[derive(Debug, Clone)]
pub(crate) struct VirtualClock {
    queue: Vec<QueuedTimer>,
    now_ms: i64,
    step_limit: usize,
    id_counter: i64,
    order_counter: i64,
    active: Option<i64>,
}

impl VirtualClock {
    pub(crate) fn new() -> Self {
        VirtualClock {
            queue: Vec::new(),
            now_ms: 0,
            step_limit: 10_000,
            id_counter: 1,
            order_counter: 0,
            active: None,
        }
    }

    pub(crate) fn now(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn set_now(&mut self, ms: i64) {
        self.now_ms = ms;
    }

    pub(crate) fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub(crate) fn set_step_limit(&mut self, limit: usize) {
        self.step_limit = limit;
    }

    /// Queues a task and hands back its timer id.
    pub(crate) fn enqueue(&mut self, task: TimerTask, due_at: i64) -> i64 {
        let id = self.id_counter;
        self.id_counter += 1;
        let order = self.order_counter;
        self.order_counter += 1;
        self.queue.push(QueuedTimer {
            id,
            due_at,
            order,
            task,
        });
        id
    }

    /// Drops every queue entry for `id` and reports how many went.
    pub(crate) fn cancel(&mut self, id: i64) -> usize {
        let before = self.queue.len();
        self.queue.retain(|timer| timer.id != id);
        before - self.queue.len()
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub(crate) fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_queued(&self, id: i64) -> bool {
        self.queue.iter().any(|timer| timer.id == id)
    }

    pub(crate) fn is_running(&self, id: i64) -> bool {
        self.active == Some(id)
    }

    pub(crate) fn begin_run(&mut self, id: i64) {
        self.active = Some(id);
    }

    pub(crate) fn finish_run(&mut self) {
        self.active = None;
    }

    /// Ids of queued timers whose task satisfies `keep`.
    pub(crate) fn ids_where(&self, keep: impl Fn(&TimerTask) -> bool) -> Vec<i64> {
        self.queue
            .iter()
            .filter(|timer| keep(&timer.task))
            .map(|timer| timer.id)
            .collect()
    }

    /// Removes and returns the winner among timers due at or before
    /// `due_limit`, or the earliest overall when no limit is given.
    pub(crate) fn pop_next(&mut self, due_limit: Option<i64>) -> Option<QueuedTimer> {
        let index = self.winning_index(due_limit)?;
        Some(self.queue.remove(index))
    }

    pub(crate) fn peek_next(&self, due_limit: Option<i64>) -> Option<&QueuedTimer> {
        self.queue.get(self.winning_index(due_limit)?)
    }

    /// Queue contents sorted by due time, then scheduling order.
    pub(crate) fn snapshot(&self) -> Vec<PendingTimer> {
        let mut pending = self
            .queue
            .iter()
            .map(|timer| PendingTimer {
                id: timer.id,
                due_at: timer.due_at,
                order: timer.order,
            })
            .collect::<Vec<_>>();
        pending.sort_by_key(|timer| (timer.due_at, timer.order));
        pending
    }

    fn winning_index(&self, due_limit: Option<i64>) -> Option<usize> {
        let mut winner: Option<usize> = None;
        for (index, timer) in self.queue.iter().enumerate() {
            if due_limit.is_some_and(|limit| timer.due_at > limit) {
                continue;
            }
            let better = match winner {
                Some(best) => {
                    let leader = &self.queue[best];
                    (timer.due_at, timer.order) < (leader.due_at, leader.order)
                }
                None => true,
            };
            if better {
                winner = Some(index);
            }
        }
        winner
    }
}
