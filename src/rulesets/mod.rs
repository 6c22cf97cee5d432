//! Vehicle rulesets.
//!
//! A ruleset is pure data: limits, wire layouts, routing, and how strictly
//! violations are enforced. The registration table outside this crate picks
//! one and hands it to [`SafetyModule::new`](crate::SafetyModule::new).

pub mod mqb;
pub mod pq;

use crate::common::validation;
use crate::firewall::RoutingTable;
use crate::ingress::IngressLayout;
use crate::integrity::IntegrityConfig;
use crate::torque::{Enforcement, SteerLimits, SteeringCommandMessage};
use crate::SafetyResult;

/// Upper bound on the driver torque window
pub const MAX_DRIVER_WINDOW: usize = 16;

/// Everything that distinguishes one vehicle variant from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesetConfig {
    /// Short name used in log output
    pub name: &'static str,
    pub limits: SteerLimits,
    pub ingress: IngressLayout,
    pub steering_command: SteeringCommandMessage,
    pub routing: RoutingTable,
    pub enforcement: Enforcement,
    /// Permission state right after `init`
    pub initially_permitted: bool,
    /// Whether the frame-derived ignition status may replace GPIO sensing
    pub ignition_authoritative: bool,
    /// Number of driver torque samples considered for override
    pub driver_window_len: usize,
    /// Checksum and counter verification of received frames
    pub integrity: Option<IntegrityConfig>,
}

impl Default for RulesetConfig {
    fn default() -> Self {
        mqb::mqb()
    }
}

impl RulesetConfig {
    pub fn validate(&self) -> SafetyResult<()> {
        self.limits.validate()?;
        self.ingress.validate()?;
        self.steering_command.validate()?;
        self.routing.validate()?;
        validation::validate_positive("driver_window_len", self.driver_window_len)?;
        validation::validate_at_most(
            "driver_window_len",
            self.driver_window_len,
            MAX_DRIVER_WINDOW,
        )?;
        Ok(())
    }
}
