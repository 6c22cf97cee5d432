//! # Safety Module
//!
//! Binds one [`RulesetConfig`] to its own state and wires the hooks: received
//! frames pass the optional integrity check before reaching the ingress
//! monitor, steering commands go through the torque validator, and routing is
//! delegated to the ruleset's table.

use crate::common::counter::Ticks;
use crate::common::frame::{BusId, CanFrame};
use crate::firewall::Route;
use crate::ingress::IngressMonitor;
use crate::integrity::FrameIntegrity;
use crate::rulesets::RulesetConfig;
use crate::state::{SafetyState, TorqueSampleWindow};
use crate::torque::{Enforcement, TorqueValidator, TxDecision};
use crate::{SafetyHooks, SafetyResult};

/// One active ruleset with its own state.
///
/// Instances share nothing, so several rulesets (or tests) can run side by
/// side.
#[derive(Debug, Clone)]
pub struct SafetyModule {
    config: RulesetConfig,
    state: SafetyState,
    driver_torque: TorqueSampleWindow,
    ingress: IngressMonitor,
    validator: TorqueValidator,
    integrity: Option<FrameIntegrity>,
}

impl SafetyModule {
    pub fn config(&self) -> &RulesetConfig {
        &self.config
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }

    pub fn driver_torque(&self) -> &TorqueSampleWindow {
        &self.driver_torque
    }

    fn revoke_on_integrity_failure(&mut self, frame: &CanFrame) -> bool {
        let Some(integrity) = self.integrity.as_mut() else {
            return false;
        };
        let status = integrity.check(frame);
        if status.is_valid() {
            return false;
        }

        tracing::debug!(
            ruleset = self.config.name,
            id = frame.id(),
            status = ?status,
            "Received frame failed integrity check"
        );
        if self.state.controls_permitted() {
            tracing::warn!(
                ruleset = self.config.name,
                id = frame.id(),
                "Lateral control revoked after integrity failure"
            );
            self.state.reset();
        }
        true
    }
}

impl SafetyHooks for SafetyModule {
    type Config = RulesetConfig;

    fn new(config: Self::Config) -> SafetyResult<Self> {
        config.validate()?;
        let integrity = config.integrity.clone().map(FrameIntegrity::new).transpose()?;
        let mut module = Self {
            state: SafetyState::new(),
            driver_torque: TorqueSampleWindow::new(config.driver_window_len),
            ingress: IngressMonitor::new(config.ingress)?,
            validator: TorqueValidator::new(config.limits)?,
            integrity,
            config,
        };
        module.init(0);
        Ok(module)
    }

    fn init(&mut self, param: i16) {
        self.state.reset();
        self.driver_torque.clear();
        if let Some(integrity) = self.integrity.as_mut() {
            integrity.reset();
        }
        self.state.set_permitted(self.config.initially_permitted);
        tracing::info!(
            ruleset = self.config.name,
            param,
            permitted = self.config.initially_permitted,
            enforcement = ?self.config.enforcement,
            "Safety ruleset initialized"
        );
    }

    fn on_frame_received(&mut self, frame: &CanFrame) {
        if self.config.enforcement == Enforcement::Disabled {
            return;
        }
        if self.revoke_on_integrity_failure(frame) {
            return;
        }
        self.ingress
            .observe(&mut self.state, &mut self.driver_torque, frame);
    }

    fn on_frame_about_to_send(&mut self, frame: &CanFrame, now: Ticks) -> TxDecision {
        let steering = &self.config.steering_command;
        if frame.id() != steering.id || self.config.enforcement == Enforcement::Disabled {
            return TxDecision::Allow;
        }

        let command = steering.torque.read(frame);
        let result = self
            .validator
            .validate(&mut self.state, &self.driver_torque, command, now);
        let Err(violation) = result else {
            return TxDecision::Allow;
        };

        tracing::warn!(
            ruleset = self.config.name,
            torque = command,
            permitted = self.state.controls_permitted(),
            violation = %violation,
            "Steering command violation"
        );
        match self.config.enforcement {
            Enforcement::Enforce => TxDecision::Block(violation),
            Enforcement::Monitor | Enforcement::Disabled => TxDecision::AllowFlagged(violation),
        }
    }

    fn route_frame(&self, origin: BusId, frame: &CanFrame) -> Route {
        self.config.routing.route(origin, frame.id())
    }

    fn ignition(&self) -> Option<bool> {
        if self.config.ignition_authoritative {
            Some(self.state.ignition_on())
        } else {
            None
        }
    }
}
