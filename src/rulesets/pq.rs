//! # Volkswagen PQ35/PQ46/NMS ruleset
//!
//! Bring-up placeholder for the older platform: torque checks are switched off
//! and control is permitted from `init`, so only the firewall is active. The
//! extended devices sit on bus 2 and the camera's HCA and LDW_1 frames are
//! replaced by the assistance computer.

use super::{mqb, RulesetConfig};
use crate::firewall::RoutingTable;
use crate::torque::{Enforcement, SteeringCommandMessage};

/// HCA, heading control assist
pub const MSG_PQ_HCA: u32 = 0x0D2;
/// LDW_1, lane departure warning display
pub const MSG_LDW_1: u32 = 0x5BE;

pub const GATEWAY_BUS: u8 = 0;
pub const EXTENDED_BUS: u8 = 2;

pub fn routing() -> RoutingTable {
    RoutingTable {
        gateway_bus: GATEWAY_BUS,
        extended_bus: EXTENDED_BUS,
        suppressed_ids: vec![MSG_PQ_HCA, MSG_LDW_1],
    }
}

/// Firewall-only ruleset.
///
/// PQ signal layouts are not decoded while checks are disabled; the MQB
/// field positions are carried only so the config stays complete.
pub fn pq_passthrough() -> RulesetConfig {
    RulesetConfig {
        name: "pq-passthrough",
        steering_command: SteeringCommandMessage {
            id: MSG_PQ_HCA,
            ..mqb::steering_command()
        },
        routing: routing(),
        enforcement: Enforcement::Disabled,
        initially_permitted: true,
        ..mqb::mqb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firewall::Route;

    #[test]
    fn test_pq_routing() {
        let table = routing();
        assert_eq!(table.route(0, MSG_PQ_HCA), Route::Forward(2));
        assert_eq!(table.route(2, MSG_PQ_HCA), Route::Drop);
        assert_eq!(table.route(2, MSG_LDW_1), Route::Drop);
        assert_eq!(table.route(2, mqb::MSG_HCA_01), Route::Forward(0));
        assert_eq!(table.route(1, 0x100), Route::Drop);
    }

    #[test]
    fn test_pq_is_permissive_placeholder() {
        let config = pq_passthrough();
        assert_eq!(config.enforcement, Enforcement::Disabled);
        assert!(config.initially_permitted);
    }
}
