//! # Forwarding Firewall
//!
//! Decides, per frame, which bus segment a frame is copied to. Everything from
//! the vehicle gateway is mirrored to the extended bus. Traffic coming back
//! from the extended bus reaches the gateway except for the camera's own
//! steering and lane-assist messages, which the assistance computer replaces.
//! Frames from any other bus are dropped.

use crate::common::frame::BusId;
use crate::common::validation;
use crate::SafetyResult;

/// Where a frame goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Forward(BusId),
    Drop,
}

impl Route {
    /// Destination bus, `None` when dropped
    pub fn destination(&self) -> Option<BusId> {
        match self {
            Route::Forward(bus) => Some(*bus),
            Route::Drop => None,
        }
    }
}

/// Two-segment forwarding policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    pub gateway_bus: BusId,
    pub extended_bus: BusId,
    /// Identifiers never forwarded from the extended bus to the gateway
    pub suppressed_ids: Vec<u32>,
}

impl RoutingTable {
    pub fn validate(&self) -> SafetyResult<()> {
        validation::validate_distinct_buses(self.gateway_bus, self.extended_bus)
    }

    pub fn is_suppressed(&self, id: u32) -> bool {
        self.suppressed_ids.contains(&id)
    }

    pub fn route(&self, origin: BusId, id: u32) -> Route {
        if origin == self.gateway_bus {
            Route::Forward(self.extended_bus)
        } else if origin == self.extended_bus {
            if self.is_suppressed(id) {
                tracing::trace!(id, origin, "Dropping vehicle frame replaced upstream");
                Route::Drop
            } else {
                Route::Forward(self.gateway_bus)
            }
        } else {
            Route::Drop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mqb_table() -> RoutingTable {
        RoutingTable {
            gateway_bus: 0,
            extended_bus: 1,
            suppressed_ids: vec![0x126, 0x397],
        }
    }

    #[test]
    fn test_gateway_forwarded_unconditionally() {
        let table = mqb_table();
        assert_eq!(table.route(0, 0x126), Route::Forward(1));
        assert_eq!(table.route(0, 0x397), Route::Forward(1));
        assert_eq!(table.route(0, 0x9F), Route::Forward(1));
    }

    #[test]
    fn test_extended_suppresses_replaced_ids() {
        let table = mqb_table();
        assert_eq!(table.route(1, 0x126), Route::Drop);
        assert_eq!(table.route(1, 0x397), Route::Drop);
        assert_eq!(table.route(1, 0x122), Route::Forward(0));
    }

    #[test]
    fn test_unknown_origin_dropped() {
        let table = mqb_table();
        for bus in [2, 3, 255] {
            assert_eq!(table.route(bus, 0x122), Route::Drop);
            assert_eq!(table.route(bus, 0x126), Route::Drop);
        }
    }

    #[test]
    fn test_route_destination() {
        assert_eq!(Route::Forward(2).destination(), Some(2));
        assert_eq!(Route::Drop.destination(), None);
    }

    #[test]
    fn test_same_bus_rejected() {
        let table = RoutingTable {
            extended_bus: 0,
            ..mqb_table()
        };
        assert!(table.validate().is_err());
    }
}
