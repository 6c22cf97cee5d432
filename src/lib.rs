//! # Lateral Control Safety Gate
//!
//! Safety hooks for a CAN interposer that sits between a Volkswagen vehicle
//! gateway and its extended CAN devices while an external driver-assistance
//! computer injects steering commands.
//!
//! ## Overview
//!
//! Every frame passes through one of three hooks:
//! - received frames update the safety state (cruise engagement, driver
//!   steering torque, ignition)
//! - outgoing steering commands are checked against torque limits and
//!   blocked or flagged when they violate them
//! - forwarded frames are routed by a two-segment firewall that drops the
//!   camera messages the assistance computer replaces
//!
//! Vehicle variants are data ([`RulesetConfig`]) rather than code; see
//! [`rulesets`] for the shipped ones.
//!
//! ## Example
//!
//! ```rust
//! use lateral_gate::{CanFrame, Route, SafetyHooks, SafetyModule, SafetyResult};
//! use lateral_gate::rulesets::mqb;
//!
//! # fn main() -> SafetyResult<()> {
//! let mut module = SafetyModule::new(mqb::mqb())?;
//!
//! // Nothing but zero torque is allowed until ACC reports engaged
//! let mut hca = CanFrame::from_bytes(1, mqb::MSG_HCA_01, [0; 8]);
//! mqb::steering_command().torque.write(&mut hca, 8);
//! assert!(!module.on_frame_about_to_send(&hca, 0).is_allowed());
//!
//! let acc = CanFrame::from_bytes(1, mqb::MSG_ACC_06, [0, 0, 0, 0, 0, 0, 0, 0x30]);
//! module.on_frame_received(&acc);
//! assert!(module.on_frame_about_to_send(&hca, 10).is_allowed());
//!
//! // The camera's own HCA_01 never reaches the gateway
//! assert_eq!(module.route_frame(1, &hca), Route::Drop);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod common;
pub mod firewall;
pub mod ingress;
pub mod integrity;
mod module;
pub mod rulesets;
pub mod state;
pub mod torque;

pub use common::counter::Ticks;
pub use common::frame::{BusId, CanFrame};
pub use firewall::{Route, RoutingTable};
pub use module::SafetyModule;
pub use rulesets::RulesetConfig;
pub use torque::{Enforcement, SteerLimits, TxDecision, Violation};

/// Result type for safety gate operations
pub type SafetyResult<T> = Result<T, SafetyError>;

/// Safety gate error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SafetyError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Frame does not fit the CAN format
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Hook interface the interposer firmware calls for the active ruleset
///
/// Hooks never fail at runtime: a rejected steering command is reported
/// through [`TxDecision`], and frames the ruleset does not care about are
/// ignored.
pub trait SafetyHooks {
    /// Configuration type for this implementation
    type Config;

    /// Create a new instance and run [`init`](SafetyHooks::init)
    ///
    /// # Errors
    /// Returns `SafetyError::InvalidConfiguration` if the configuration is invalid
    fn new(config: Self::Config) -> SafetyResult<Self>
    where
        Self: Sized;

    /// Reset all state to the ruleset's initial condition
    ///
    /// `param` is the opaque value passed by the host when selecting the
    /// ruleset; it is recorded but has no effect.
    fn init(&mut self, param: i16);

    /// Observe a frame received on any bus
    fn on_frame_received(&mut self, frame: &CanFrame);

    /// Decide whether a frame from the assistance computer may be transmitted
    ///
    /// `now` is the free-running microsecond timer, which wraps at `u32::MAX`.
    fn on_frame_about_to_send(&mut self, frame: &CanFrame, now: Ticks) -> TxDecision;

    /// Decide where a frame received on `origin` is copied to
    fn route_frame(&self, origin: BusId, frame: &CanFrame) -> Route;

    /// Frame-derived ignition status, `None` to defer to hardware sensing
    fn ignition(&self) -> Option<bool>;
}
