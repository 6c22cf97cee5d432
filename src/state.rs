//! # State Store
//!
//! Mutable safety state of one active ruleset. Receive-side fields (sample
//! window, permission, ignition) are written by the ingress monitor; the
//! command-tracking fields (last command, real-time checkpoint) are written by
//! the torque validator. Nothing outside the module touches either.

use crate::common::counter::Ticks;
use std::collections::VecDeque;

/// Most recent driver-applied torque readings, oldest evicted first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorqueSampleWindow {
    samples: VecDeque<i32>,
    capacity: usize,
}

impl TorqueSampleWindow {
    /// Capacity is clamped to at least one sample
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: i32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Samples in arrival order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().copied()
    }

    /// Smallest absolute reading in the window, zero when empty
    pub fn min_abs(&self) -> i32 {
        self.samples
            .iter()
            .map(|sample| sample.saturating_abs())
            .min()
            .unwrap_or(0)
    }

    /// Direction the driver is consistently pushing in: `1`, `-1`, or `0` when
    /// the window is empty or the samples disagree in sign.
    pub fn direction(&self) -> i32 {
        if self.samples.is_empty() {
            0
        } else if self.samples.iter().all(|&sample| sample > 0) {
            1
        } else if self.samples.iter().all(|&sample| sample < 0) {
            -1
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Permission flag, command tracking and real-time checkpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyState {
    controls_permitted: bool,
    last_commanded_torque: i32,
    rt_checkpoint_torque: i32,
    rt_checkpoint_time: Ticks,
    ignition_on: bool,
}

impl SafetyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every field and revoke permission
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Forget the command history after a violation or while blocked,
    /// restarting the real-time interval at `now`
    pub fn reset_command_tracking(&mut self, now: Ticks) {
        self.last_commanded_torque = 0;
        self.rt_checkpoint_torque = 0;
        self.rt_checkpoint_time = now;
    }

    pub fn set_permitted(&mut self, permitted: bool) {
        self.controls_permitted = permitted;
    }

    pub fn controls_permitted(&self) -> bool {
        self.controls_permitted
    }

    pub fn last_commanded_torque(&self) -> i32 {
        self.last_commanded_torque
    }

    pub(crate) fn set_last_commanded_torque(&mut self, torque: i32) {
        self.last_commanded_torque = torque;
    }

    pub fn rt_checkpoint_torque(&self) -> i32 {
        self.rt_checkpoint_torque
    }

    pub fn rt_checkpoint_time(&self) -> Ticks {
        self.rt_checkpoint_time
    }

    pub(crate) fn latch_rt_checkpoint(&mut self, torque: i32, now: Ticks) {
        self.rt_checkpoint_torque = torque;
        self.rt_checkpoint_time = now;
    }

    pub fn ignition_on(&self) -> bool {
        self.ignition_on
    }

    pub(crate) fn set_ignition_on(&mut self, on: bool) {
        self.ignition_on = on;
    }
}
