//! # Volkswagen MQB ruleset
//!
//! Harness at the J533 gateway: bus 0 faces the gateway, bus 1 the extended
//! CAN devices (camera, radar) and the assistance computer. Lateral control is
//! permitted only while the car's own ACC reports engaged.

use super::RulesetConfig;
use crate::common::field_ops::{BitField, SignedMagnitudeField, Word};
use crate::firewall::RoutingTable;
use crate::ingress::{CruiseStatusMessage, DriverTorqueMessage, IgnitionMessage, IngressLayout};
use crate::torque::{Enforcement, SteerLimits, SteeringCommandMessage};

/// EPS_01, driver steering strain
pub const MSG_EPS_01: u32 = 0x09F;
/// ACC_06, adaptive cruise status
pub const MSG_ACC_06: u32 = 0x122;
/// HCA_01, heading control assist torque request
pub const MSG_HCA_01: u32 = 0x126;
/// LDW_02, lane departure warning display
pub const MSG_LDW_02: u32 = 0x397;
/// Klemmen_Status_01, terminal status
pub const MSG_KLEMMEN_STATUS_01: u32 = 0x3C0;

/// ACC_06.ACC_Status_ACC value for "active"
pub const ACC_STATUS_ENGAGED: u32 = 3;

pub const GATEWAY_BUS: u8 = 0;
pub const EXTENDED_BUS: u8 = 1;

pub const DRIVER_WINDOW_LEN: usize = 3;

pub fn ingress_layout() -> IngressLayout {
    IngressLayout {
        // EPS_01.Driver_Strain magnitude, EPS_01.Driver_Strain_VZ direction
        driver_torque: DriverTorqueMessage {
            id: MSG_EPS_01,
            bus: Some(GATEWAY_BUS),
            torque: SignedMagnitudeField::new(
                BitField::new(Word::Low, 8, 5),
                BitField::new(Word::Low, 16, 8),
                BitField::flag(Word::Low, 15),
            ),
        },
        // ACC_06.ACC_Status_ACC
        cruise_status: CruiseStatusMessage {
            id: MSG_ACC_06,
            bus: None,
            status: BitField::in_byte(7, 4, 3),
            engaged_code: ACC_STATUS_ENGAGED,
        },
        // Klemmen_Status_01.ZAS_Kl_15
        ignition: Some(IgnitionMessage {
            id: MSG_KLEMMEN_STATUS_01,
            bus: Some(GATEWAY_BUS),
            ignition: BitField::flag(Word::Low, 9),
        }),
    }
}

/// HCA_01.Assist_Torque magnitude and HCA_01.Assist_VZ direction
pub fn steering_command() -> SteeringCommandMessage {
    SteeringCommandMessage {
        id: MSG_HCA_01,
        torque: SignedMagnitudeField::new(
            BitField::new(Word::High, 0, 6),
            BitField::new(Word::High, 8, 8),
            BitField::flag(Word::High, 7),
        ),
    }
}

pub fn routing() -> RoutingTable {
    RoutingTable {
        gateway_bus: GATEWAY_BUS,
        extended_bus: EXTENDED_BUS,
        suppressed_ids: vec![MSG_HCA_01, MSG_LDW_02],
    }
}

/// Enforcing ruleset, blocked until ACC engages
pub fn mqb() -> RulesetConfig {
    RulesetConfig {
        name: "mqb",
        limits: SteerLimits::default(),
        ingress: ingress_layout(),
        steering_command: steering_command(),
        routing: routing(),
        enforcement: Enforcement::Enforce,
        initially_permitted: false,
        ignition_authoritative: false,
        driver_window_len: DRIVER_WINDOW_LEN,
        integrity: None,
    }
}

/// Early tuning that records violations but still transmits the frame
pub fn mqb_monitor() -> RulesetConfig {
    RulesetConfig {
        name: "mqb-monitor",
        limits: SteerLimits {
            max_steer: 300,
            max_rate_up: 16,
            max_rate_down: 32,
            max_rt_delta: 128,
            rt_interval: 250_000,
            driver_torque_allowance: 100,
            driver_torque_factor: 4,
        },
        enforcement: Enforcement::Monitor,
        ..mqb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::frame::CanFrame;

    #[test]
    fn test_hca_torque_matches_raw_expression() {
        // magnitude = ((high & 0x3F) << 8) | ((high >> 8) & 0xFF), sign at bit 7
        let field = steering_command().torque;
        for data in [
            [0, 0, 0, 0, 0x81, 0x2C, 0xFE, 0x07],
            [0, 0, 0, 0, 0x3F, 0xFF, 0x00, 0x00],
            [0, 0, 0, 0, 0x40, 0x05, 0x00, 0x00],
        ] {
            let frame = CanFrame::from_bytes(0, MSG_HCA_01, data);
            let high = frame.high_word();
            let magnitude = (((high & 0x3F) << 8) | ((high >> 8) & 0xFF)) as i32;
            let expected = if high & 0x80 != 0 { -magnitude } else { magnitude };
            assert_eq!(field.read(&frame), expected);
        }
    }

    #[test]
    fn test_acc_status_matches_raw_expression() {
        let status = ingress_layout().cruise_status.status;
        for byte7 in [0x00u8, 0x30, 0x70, 0x8F, 0xB5] {
            let frame = CanFrame::from_bytes(0, MSG_ACC_06, [0, 0, 0, 0, 0, 0, 0, byte7]);
            assert_eq!(status.read(&frame), u32::from((byte7 & 0x70) >> 4));
        }
    }

    #[test]
    fn test_monitor_variant_keeps_wire_layout() {
        let monitor = mqb_monitor();
        let strict = mqb();
        assert_eq!(monitor.ingress, strict.ingress);
        assert_eq!(monitor.routing, strict.routing);
        assert_eq!(monitor.enforcement, Enforcement::Monitor);
        assert_eq!(monitor.limits.max_rt_delta, 128);
    }
}
