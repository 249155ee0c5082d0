use super::*;

impl Page {
    /// Current virtual-clock reading in milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now()
    }

    pub(crate) fn schedule_timeout(&mut self, task: TimerTask, delay_ms: i64) -> i64 {
        let delay = delay_ms.max(0);
        let due_at = self.clock.now().saturating_add(delay);
        let id = self.clock.enqueue(task, due_at);
        self.trace_timer(format!(
            "[timer] schedule timeout id={id} due_at={due_at} delay_ms={delay}"
        ));
        id
    }

    pub(crate) fn clear_timeout(&mut self, id: i64) {
        let removed = self.clock.cancel(id);
        self.trace_timer(format!("[timer] clear id={id} removed={removed}"));
    }

    /// Queued timers sorted by due time, then scheduling order.
    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.clock.snapshot()
    }

    /// Moves the clock forward and runs everything that becomes due,
    /// in due order. Tasks scheduled while running also run if their
    /// due time falls inside the window.
    pub fn advance_time(&mut self, delta_ms: i64) -> Result<usize> {
        if delta_ms < 0 {
            return Err(Error::PageRuntime(
                "advance_time requires non-negative milliseconds".to_string(),
            ));
        }
        let from = self.clock.now();
        self.clock.set_now(from.saturating_add(delta_ms));
        let ran = self.drain_due_now()?;
        self.trace_timer(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={} ran_due={ran}",
            self.clock.now()
        ));
        Ok(ran)
    }

    /// Moves the clock to an absolute reading, which must not be in
    /// the past, and runs everything due.
    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<usize> {
        let from = self.clock.now();
        if target_ms < from {
            return Err(Error::PageRuntime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        self.clock.set_now(target_ms);
        let ran = self.drain_due_now()?;
        self.trace_timer(format!(
            "[timer] advance_to from={from} to={target_ms} ran_due={ran}"
        ));
        Ok(ran)
    }

    /// Runs every queued timer, jumping the clock to each due time,
    /// until the queue drains or the step limit trips.
    pub fn flush(&mut self) -> Result<usize> {
        let from = self.clock.now();
        let ran = self.drain_timer_queue(None, true)?;
        self.trace_timer(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.clock.now()
        ));
        Ok(ran)
    }

    /// Runs the single earliest queued timer, jumping the clock to its
    /// due time if that lies ahead. Returns false on an empty queue.
    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(timer) = self.clock.pop_next(None) else {
            self.trace_timer("[timer] run_next none".to_string());
            return Ok(false);
        };
        if timer.due_at > self.clock.now() {
            self.clock.set_now(timer.due_at);
        }
        self.execute_timer_task(timer)?;
        Ok(true)
    }

    /// Runs the earliest timer already due at the current clock,
    /// without moving the clock. Returns false when none is due.
    pub fn run_next_due_timer(&mut self) -> Result<bool> {
        let now = self.clock.now();
        let Some(timer) = self.clock.pop_next(Some(now)) else {
            self.trace_timer("[timer] run_next_due none".to_string());
            return Ok(false);
        };
        self.execute_timer_task(timer)?;
        Ok(true)
    }

    /// Runs every timer due at the current clock without moving it.
    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.drain_due_now()?;
        self.trace_timer(format!(
            "[timer] run_due now_ms={} ran={ran}",
            self.clock.now()
        ));
        Ok(ran)
    }

    fn drain_due_now(&mut self) -> Result<usize> {
        let now = self.clock.now();
        self.drain_timer_queue(Some(now), false)
    }

    fn drain_timer_queue(&mut self, due_limit: Option<i64>, jump_clock: bool) -> Result<usize> {
        let mut steps: usize = 0;
        loop {
            // The limit is checked before the pop so the stalled task
            // still shows up in the error report.
            if self.clock.peek_next(due_limit).is_none() {
                return Ok(steps);
            }
            steps += 1;
            if steps > self.clock.step_limit() {
                return Err(self.timer_step_limit_error(due_limit, steps));
            }
            let Some(timer) = self.clock.pop_next(due_limit) else {
                return Ok(steps);
            };
            if jump_clock && timer.due_at > self.clock.now() {
                self.clock.set_now(timer.due_at);
            }
            self.execute_timer_task(timer)?;
        }
    }

    fn timer_step_limit_error(&self, due_limit: Option<i64>, steps: usize) -> Error {
        let due_limit_desc = match due_limit {
            Some(limit) => limit.to_string(),
            None => "none".to_string(),
        };
        let next_task_desc = match self.clock.peek_next(due_limit) {
            Some(timer) => {
                format!(
                    "id={},due_at={},order={}",
                    timer.id, timer.due_at, timer.order
                )
            }
            None => "none".to_string(),
        };
        Error::PageRuntime(format!(
            "flush exceeded max task steps: limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={next_task_desc}",
            self.clock.step_limit(),
            self.clock.now(),
            self.clock.queued_len()
        ))
    }

    fn execute_timer_task(&mut self, timer: QueuedTimer) -> Result<()> {
        stacker::grow(32 * 1024 * 1024, || self.execute_timer_task_impl(timer))
    }

    fn execute_timer_task_impl(&mut self, timer: QueuedTimer) -> Result<()> {
        self.trace_timer(format!(
            "[timer] run id={} due_at={} now_ms={}",
            timer.id,
            timer.due_at,
            self.clock.now()
        ));
        self.clock.begin_run(timer.id);
        let result = match timer.task {
            TimerTask::RevertSubmitNotice { form, success } => {
                self.revert_submit_notice(form, success)
            }
        };
        self.clock.finish_run();
        result
    }

    /// Cancels a timer by id. Returns whether the id named a queued or
    /// currently running timer.
    pub fn clear_timer(&mut self, id: i64) -> bool {
        let existed = self.clock.is_queued(id) || self.clock.is_running(id);
        self.clear_timeout(id);
        existed
    }

    /// Empties the timer queue without running anything and reports
    /// how many entries were dropped.
    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.clock.cancel_all();
        self.trace_timer(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    /// Caps how many tasks one draining call may run before erroring.
    pub fn set_timer_step_limit(&mut self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(Error::PageRuntime(
                "set_timer_step_limit requires at least 1 step".to_string(),
            ));
        }
        self.clock.set_step_limit(limit);
        Ok(())
    }
}
