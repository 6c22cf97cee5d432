//! Wrapping counters: elapsed time on the free-running hardware timer used
//! for real-time checkpoints, and the 4-bit rolling message counter carried
//! in protected frames.

use crate::integrity::IntegrityStatus;

/// Raw value of the free-running hardware timer, in microsecond ticks
pub type Ticks = u32;

pub trait CounterOps {
    type CounterType;
    const MAX_VALUE: Self::CounterType;
    const MODULO: u64;

    fn increment_counter(current: Self::CounterType) -> Self::CounterType;

    /// Forward distance from `last` to `current`, modulo the counter width
    fn elapsed(current: Self::CounterType, last: Self::CounterType) -> Self::CounterType;
}

/// 4-bit rolling message counter (0-15, modulo 16)
pub struct Counter4;

impl CounterOps for Counter4 {
    type CounterType = u8;
    const MAX_VALUE: u8 = 15;
    const MODULO: u64 = 16;

    fn increment_counter(current: u8) -> u8 {
        current.wrapping_add(1) & Self::MAX_VALUE
    }

    fn elapsed(current: u8, last: u8) -> u8 {
        ((Self::MODULO + (current & Self::MAX_VALUE) as u64 - (last & Self::MAX_VALUE) as u64)
            % Self::MODULO) as u8
    }
}

impl Counter4 {
    pub fn validate_counter(
        last: u8,
        received: u8,
        max_delta: u8,
        initialized: bool,
    ) -> IntegrityStatus {
        let delta = Self::elapsed(received, last);

        if delta == 0 {
            if initialized {
                IntegrityStatus::Repeated
            } else {
                IntegrityStatus::Ok
            }
        } else if delta == 1 || !initialized {
            IntegrityStatus::Ok
        } else if delta <= max_delta {
            IntegrityStatus::OkSomeLost
        } else {
            IntegrityStatus::WrongSequence
        }
    }
}

/// Ticks elapsed since `since`, correct across one wrap of the timer
pub fn ticks_elapsed(now: Ticks, since: Ticks) -> Ticks {
    now.wrapping_sub(since)
}
