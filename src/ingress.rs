//! # Ingress Monitor
//!
//! Decodes the received frames the safety logic cares about and records what
//! they say. Frames are never rejected here; anything that is not a known
//! message on its expected bus is simply not of interest.

use crate::common::field_ops::{BitField, SignedMagnitudeField};
use crate::common::frame::{BusId, CanFrame};
use crate::common::validation;
use crate::state::{SafetyState, TorqueSampleWindow};
use crate::SafetyResult;

/// Where the driver-applied torque is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverTorqueMessage {
    pub id: u32,
    /// Only accept the message from this bus, any bus when `None`
    pub bus: Option<BusId>,
    pub torque: SignedMagnitudeField,
}

/// Where the vehicle's own cruise engagement status is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CruiseStatusMessage {
    pub id: u32,
    pub bus: Option<BusId>,
    pub status: BitField,
    /// Status code meaning cruise control is engaged
    pub engaged_code: u32,
}

/// Where ignition (terminal 15) status is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnitionMessage {
    pub id: u32,
    pub bus: Option<BusId>,
    pub ignition: BitField,
}

/// Wire layout of the monitored messages for one vehicle variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngressLayout {
    pub driver_torque: DriverTorqueMessage,
    pub cruise_status: CruiseStatusMessage,
    pub ignition: Option<IgnitionMessage>,
}

impl IngressLayout {
    pub fn validate(&self) -> SafetyResult<()> {
        validation::validate_signed_field("driver torque", &self.driver_torque.torque)?;
        validation::validate_field("cruise status", &self.cruise_status.status)?;
        validation::validate_code_fits(
            "cruise engaged",
            self.cruise_status.engaged_code,
            &self.cruise_status.status,
        )?;
        if let Some(ignition) = &self.ignition {
            validation::validate_field("ignition", &ignition.ignition)?;
        }
        Ok(())
    }
}

/// What a received frame told us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    DriverTorque(i32),
    CruiseStatus { code: u32, engaged: bool },
    Ignition(bool),
}

fn bus_matches(expected: Option<BusId>, frame: &CanFrame) -> bool {
    expected.map_or(true, |bus| bus == frame.bus())
}

#[derive(Debug, Clone)]
pub struct IngressMonitor {
    layout: IngressLayout,
}

impl IngressMonitor {
    /// # Errors
    /// Returns `SafetyError::InvalidConfiguration` if a field does not fit its
    /// word or the engaged code does not fit the status field
    pub fn new(layout: IngressLayout) -> SafetyResult<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &IngressLayout {
        &self.layout
    }

    /// Decode `frame` without touching any state
    pub fn decode(&self, frame: &CanFrame) -> Option<Observation> {
        let driver = &self.layout.driver_torque;
        if frame.id() == driver.id && bus_matches(driver.bus, frame) {
            return Some(Observation::DriverTorque(driver.torque.read(frame)));
        }

        let cruise = &self.layout.cruise_status;
        if frame.id() == cruise.id && bus_matches(cruise.bus, frame) {
            let code = cruise.status.read(frame);
            return Some(Observation::CruiseStatus {
                code,
                engaged: code == cruise.engaged_code,
            });
        }

        if let Some(ignition) = &self.layout.ignition {
            if frame.id() == ignition.id && bus_matches(ignition.bus, frame) {
                return Some(Observation::Ignition(ignition.ignition.read_flag(frame)));
            }
        }

        None
    }

    /// Decode `frame` and apply it to the state store.
    ///
    /// Losing cruise engagement resets the whole safety state.
    pub fn observe(
        &self,
        state: &mut SafetyState,
        driver: &mut TorqueSampleWindow,
        frame: &CanFrame,
    ) -> Option<Observation> {
        let observation = self.decode(frame)?;
        match observation {
            Observation::DriverTorque(torque) => driver.push(torque),
            Observation::CruiseStatus { code, engaged } => {
                let was_permitted = state.controls_permitted();
                if was_permitted && !engaged {
                    tracing::info!(code, "Cruise disengaged, lateral control revoked");
                    state.reset();
                } else if !was_permitted && engaged {
                    tracing::info!(code, "Cruise engaged, lateral control permitted");
                    state.set_permitted(true);
                }
            }
            Observation::Ignition(on) => {
                if on != state.ignition_on() {
                    tracing::debug!(ignition = on, "Ignition status changed");
                }
                state.set_ignition_on(on);
            }
        }
        Some(observation)
    }
}
