use super::field_ops::{BitField, SignedMagnitudeField};
use crate::{SafetyError, SafetyResult};
use std::fmt::Display;

pub fn validate_positive<T>(name: &str, value: T) -> SafetyResult<()>
where
    T: PartialOrd + Display + Default,
{
    if value <= T::default() {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

pub fn validate_non_negative<T>(name: &str, value: T) -> SafetyResult<()>
where
    T: PartialOrd + Display + Default,
{
    if value < T::default() {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

pub fn validate_at_most<T>(name: &str, value: T, max: T) -> SafetyResult<()>
where
    T: PartialOrd + Display,
{
    if value > max {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} must be at most {}, got {}",
            name, max, value
        )));
    }
    Ok(())
}

pub fn validate_field(name: &str, field: &BitField) -> SafetyResult<()> {
    if !field.is_well_formed() {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} field (offset {}, width {}) does not fit in a 32-bit word",
            name, field.offset, field.width
        )));
    }
    Ok(())
}

pub fn validate_signed_field(name: &str, field: &SignedMagnitudeField) -> SafetyResult<()> {
    if !field.is_well_formed() {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} field is malformed: magnitude must fit in 31 bits and sign must be one bit",
            name
        )));
    }
    Ok(())
}

pub fn validate_code_fits(name: &str, code: u32, field: &BitField) -> SafetyResult<()> {
    if code > field.max_value() {
        return Err(SafetyError::InvalidConfiguration(format!(
            "{} code {} does not fit in a {}-bit field",
            name, code, field.width
        )));
    }
    Ok(())
}

pub fn validate_distinct_buses(gateway: u8, extended: u8) -> SafetyResult<()> {
    if gateway == extended {
        return Err(SafetyError::InvalidConfiguration(format!(
            "Gateway and extended bus must differ, both are {}",
            gateway
        )));
    }
    Ok(())
}
