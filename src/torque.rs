//! # Torque Command Validator
//!
//! Checks a candidate steering torque against the ruleset limits, in order:
//! 1. global bound on the absolute command
//! 2. per-frame rate of change, relaxed while the driver overrides
//! 3. drift against the real-time checkpoint
//! 4. permission: only zero torque while controls are not permitted
//!
//! Any violation, or running without permission, clears the command history
//! so one bad frame cannot be used as the baseline for the next.

use crate::common::counter::{ticks_elapsed, Ticks};
use crate::common::field_ops::SignedMagnitudeField;
use crate::common::validation;
use crate::state::{SafetyState, TorqueSampleWindow};
use crate::SafetyResult;
use std::fmt;

/// Per-ruleset torque limits, in raw command units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteerLimits {
    /// Absolute torque bound
    pub max_steer: i32,
    /// Allowed step when the magnitude grows
    pub max_rate_up: i32,
    /// Allowed step when the magnitude shrinks
    pub max_rate_down: i32,
    /// Allowed drift from the checkpoint within one interval
    pub max_rt_delta: i32,
    /// Real-time checkpoint period, in timer ticks
    pub rt_interval: Ticks,
    /// Driver torque below which no override is assumed
    pub driver_torque_allowance: i32,
    /// Scale applied to driver torque above the allowance
    pub driver_torque_factor: i32,
}

impl Default for SteerLimits {
    fn default() -> Self {
        Self {
            max_steer: 300, // 3.0 Nm, EPS faults above this
            max_rate_up: 10, // 5.0 Nm/s at the 50 Hz send rate
            max_rate_down: 300,
            max_rt_delta: 188, // 10 * 50 Hz * 0.25 s = 125, padded by 1.5
            rt_interval: 250_000, // 250 ms
            driver_torque_allowance: 80,
            driver_torque_factor: 1,
        }
    }
}

impl SteerLimits {
    pub fn validate(&self) -> SafetyResult<()> {
        validation::validate_positive("max_steer", self.max_steer)?;
        validation::validate_positive("max_rate_up", self.max_rate_up)?;
        validation::validate_at_most("max_rate_up", self.max_rate_up, self.max_steer)?;
        validation::validate_positive("max_rate_down", self.max_rate_down)?;
        validation::validate_positive("max_rt_delta", self.max_rt_delta)?;
        validation::validate_positive("rt_interval", self.rt_interval)?;
        validation::validate_non_negative(
            "driver_torque_allowance",
            self.driver_torque_allowance,
        )?;
        validation::validate_non_negative("driver_torque_factor", self.driver_torque_factor)?;
        Ok(())
    }
}

/// Outgoing steering command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteeringCommandMessage {
    pub id: u32,
    pub torque: SignedMagnitudeField,
}

impl SteeringCommandMessage {
    pub fn validate(&self) -> SafetyResult<()> {
        validation::validate_signed_field("steering command", &self.torque)
    }
}

/// What a violation does to the frame on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// No checks run, every frame is transmitted
    Disabled,
    /// Checks run and reset state, but violating frames are still transmitted
    Monitor,
    /// Violating frames are blocked
    Enforce,
}

/// The first check a candidate command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Command exceeds the absolute bound
    MaxSteer { command: i32, max: i32 },
    /// Step from the last accepted command is too large
    RateLimit { last: i32, command: i32, allowed: i32 },
    /// Drift from the real-time checkpoint is too large
    RealTimeDelta { checkpoint: i32, command: i32, max: i32 },
    /// Nonzero torque while controls are not permitted
    NotPermitted { command: i32 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MaxSteer { command, max } => {
                write!(f, "torque {} exceeds limit {}", command, max)
            }
            Violation::RateLimit {
                last,
                command,
                allowed,
            } => write!(
                f,
                "step {} -> {} exceeds allowed delta {}",
                last, command, allowed
            ),
            Violation::RealTimeDelta {
                checkpoint,
                command,
                max,
            } => write!(
                f,
                "torque {} drifted more than {} from checkpoint {}",
                command, max, checkpoint
            ),
            Violation::NotPermitted { command } => {
                write!(f, "torque {} requested while controls not permitted", command)
            }
        }
    }
}

/// Outcome for one about-to-send frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxDecision {
    /// Frame passes
    Allow,
    /// Frame violates the limits but the ruleset only monitors
    AllowFlagged(Violation),
    /// Frame must not reach the bus
    Block(Violation),
}

impl TxDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, TxDecision::Block(_))
    }

    pub fn violation(&self) -> Option<Violation> {
        match self {
            TxDecision::Allow => None,
            TxDecision::AllowFlagged(violation) | TxDecision::Block(violation) => Some(*violation),
        }
    }
}

/// Stateless checker; all history lives in [`SafetyState`]
#[derive(Debug, Clone)]
pub struct TorqueValidator {
    limits: SteerLimits,
}

impl TorqueValidator {
    /// # Errors
    /// Returns `SafetyError::InvalidConfiguration` if any limit is out of range
    pub fn new(limits: SteerLimits) -> SafetyResult<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> &SteerLimits {
        &self.limits
    }

    /// Run the ordered checks and apply their side effects to `state`.
    ///
    /// Returns the first violation found, if any. The real-time checkpoint is
    /// still advanced when an earlier check fails; the reset that follows a
    /// violation then overrides it.
    pub fn validate(
        &self,
        state: &mut SafetyState,
        driver: &TorqueSampleWindow,
        command: i32,
        now: Ticks,
    ) -> Result<(), Violation> {
        let mut violation = None;

        if state.controls_permitted() {
            violation = violation.or(self.check_max_steer(command));
            violation =
                violation.or(self.check_rate(state.last_commanded_torque(), command, driver));
            violation = violation.or(self.check_real_time(state, command, now));
        } else if command != 0 {
            violation = Some(Violation::NotPermitted { command });
        }

        if violation.is_some() || !state.controls_permitted() {
            state.reset_command_tracking(now);
        } else {
            state.set_last_commanded_torque(command);
        }

        match violation {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    fn check_max_steer(&self, command: i32) -> Option<Violation> {
        let max = self.limits.max_steer;
        if command > max || command < -max {
            return Some(Violation::MaxSteer { command, max });
        }
        None
    }

    fn check_rate(
        &self,
        last: i32,
        command: i32,
        driver: &TorqueSampleWindow,
    ) -> Option<Violation> {
        let widening = self.driver_widening(last, command, driver);
        let rate_up = self.widened(self.limits.max_rate_up, widening);
        let rate_down = self.widened(self.limits.max_rate_down, widening);

        let crosses_zero = (last > 0 && command < 0) || (last < 0 && command > 0);
        let (ok, allowed) = if crosses_zero {
            // Unwind to zero at the down rate, then build up at the up rate
            if last.unsigned_abs() > rate_down.unsigned_abs() {
                (false, rate_down)
            } else {
                (command.unsigned_abs() <= rate_up.unsigned_abs(), rate_up)
            }
        } else {
            let allowed = if command.unsigned_abs() > last.unsigned_abs() {
                rate_up
            } else {
                rate_down
            };
            (command.abs_diff(last) <= allowed.unsigned_abs(), allowed)
        };

        if ok {
            None
        } else {
            Some(Violation::RateLimit {
                last,
                command,
                allowed,
            })
        }
    }

    /// Extra delta granted when the step moves toward a driver who is pushing
    /// against the applied torque harder than the allowance.
    fn driver_widening(&self, last: i32, command: i32, driver: &TorqueSampleWindow) -> i32 {
        let applied = if last != 0 { last.signum() } else { command.signum() };
        let driver_direction = driver.direction();
        let step = command.cmp(&last) as i32;
        if applied == 0 || driver_direction != -applied || step != driver_direction {
            return 0;
        }

        let driver_min_abs = driver.min_abs();
        if driver_min_abs <= self.limits.driver_torque_allowance {
            return 0;
        }
        (driver_min_abs - self.limits.driver_torque_allowance)
            .saturating_mul(self.limits.driver_torque_factor)
    }

    fn widened(&self, base: i32, widening: i32) -> i32 {
        if widening == 0 {
            base
        } else {
            base.saturating_add(widening).min(self.limits.max_steer)
        }
    }

    fn check_real_time(
        &self,
        state: &mut SafetyState,
        command: i32,
        now: Ticks,
    ) -> Option<Violation> {
        if ticks_elapsed(now, state.rt_checkpoint_time()) > self.limits.rt_interval {
            tracing::debug!(torque = command, now, "Real-time checkpoint latched");
            state.latch_rt_checkpoint(command, now);
        }

        let checkpoint = state.rt_checkpoint_torque();
        let max = self.limits.max_rt_delta;
        if command.abs_diff(checkpoint) > max.unsigned_abs() {
            return Some(Violation::RealTimeDelta {
                checkpoint,
                command,
                max,
            });
        }
        None
    }
}
