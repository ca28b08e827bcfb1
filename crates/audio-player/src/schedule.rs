//! Cancellable periodic redraw tasks.
//!
//! Each redraw loop is an explicit task owned by the view that needs it. A task only asks
//! egui for repaints while armed; cancelling it stops further frames from being scheduled on
//! its behalf.

use std::time::Duration;

use eframe::egui;
use web_time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Every display frame
    EveryFrame,
    /// Fixed interval
    Every(Duration),
}

#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    cadence: Cadence,
    armed: bool,
    last_fired: Option<Instant>,
}

impl PeriodicTask {
    pub fn every_frame(name: &'static str) -> Self {
        Self::new(name, Cadence::EveryFrame)
    }

    pub fn every(name: &'static str, period: Duration) -> Self {
        Self::new(name, Cadence::Every(period))
    }

    fn new(name: &'static str, cadence: Cadence) -> Self {
        Self {
            name,
            cadence,
            armed: false,
            last_fired: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arm the task; the first poll after arming fires immediately.
    pub fn arm(&mut self) {
        if !self.armed {
            log::debug!("task {}: armed", self.name);
            self.armed = true;
            self.last_fired = None;
        }
    }

    pub fn cancel(&mut self) {
        if self.armed {
            log::debug!("task {}: cancelled", self.name);
            self.armed = false;
            self.last_fired = None;
        }
    }

    /// Keep the task armed exactly while `condition` holds
    pub fn arm_while(&mut self, condition: bool) {
        if condition {
            self.arm();
        } else {
            self.cancel();
        }
    }

    /// Returns true when the task is due at `now`, and records the firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.armed {
            return false;
        }
        let due = match (self.cadence, self.last_fired) {
            (_, None) | (Cadence::EveryFrame, _) => true,
            (Cadence::Every(period), Some(last)) => now.duration_since(last) >= period,
        };
        if due {
            self.last_fired = Some(now);
        }
        due
    }

    /// Time until the next firing; `None` while cancelled
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        if !self.armed {
            return None;
        }
        match (self.cadence, self.last_fired) {
            (Cadence::EveryFrame, _) | (_, None) => Some(Duration::ZERO),
            (Cadence::Every(period), Some(last)) => {
                Some(period.saturating_sub(now.duration_since(last)))
            }
        }
    }

    /// Ask egui for the next frame this task needs
    pub fn schedule(&self, ctx: &egui::Context, now: Instant) {
        match self.next_due_in(now) {
            Some(Duration::ZERO) => ctx.request_repaint(),
            Some(wait) => ctx.request_repaint_after(wait),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_task_never_fires() {
        let mut t = PeriodicTask::every_frame("visualizer");
        let now = Instant::now();
        assert!(!t.poll(now));
        assert_eq!(t.next_due_in(now), None);
        t.arm();
        assert!(t.poll(now));
        assert!(t.poll(now));
        t.cancel();
        assert!(!t.poll(now));
    }

    #[test]
    fn interval_task_waits_for_period() {
        let mut t = PeriodicTask::every("waveform", Duration::from_millis(50));
        let start = Instant::now();
        t.arm();
        assert!(t.poll(start));
        assert!(!t.poll(start + Duration::from_millis(20)));
        assert_eq!(
            t.next_due_in(start + Duration::from_millis(20)),
            Some(Duration::from_millis(30))
        );
        assert!(t.poll(start + Duration::from_millis(50)));
    }

    #[test]
    fn arm_while_follows_condition() {
        let mut t = PeriodicTask::every_frame("analyser");
        t.arm_while(true);
        assert!(t.is_armed());
        t.arm_while(false);
        assert!(!t.is_armed());
    }

    #[test]
    fn rearming_fires_immediately() {
        let mut t = PeriodicTask::every("waveform", Duration::from_secs(10));
        let now = Instant::now();
        t.arm();
        assert!(t.poll(now));
        t.cancel();
        t.arm();
        assert!(t.poll(now + Duration::from_millis(1)));
    }
}
