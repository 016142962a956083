use std::time::Duration;

use coopsync_api::models::AgeGroup;

/// Seconds the feeder servo stays open per gram dispensed.
pub const SERVO_SECONDS_PER_GRAM: f64 = 0.02;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Flow rate must be a positive number, got {0}")]
    InvalidFlowRate(f64),

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Run time of {0} seconds is too long")]
    RunTimeTooLong(f64),
}

pub fn servo_open_time(grams: f64) -> f64 {
    grams * SERVO_SECONDS_PER_GRAM
}

/// Pump run time in seconds for `ml` at `flow_rate` ml per second.
pub fn pump_run_time(ml: f64, flow_rate: f64) -> Result<f64, ConversionError> {
    if !flow_rate.is_finite() || flow_rate <= 0.0 {
        return Err(ConversionError::InvalidFlowRate(flow_rate));
    }

    Ok(ml / flow_rate)
}

/// Actuator run time plus the reset buffer as a timer delay.
pub fn reset_delay(seconds: f64, buffer: Duration) -> Result<Duration, ConversionError> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .and_then(|run| run.checked_add(buffer))
        .ok_or(ConversionError::RunTimeTooLong(seconds))
}

/// Checks a dispense amount entered by the operator.
pub fn positive_amount(amount: f64) -> Result<f64, ConversionError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(ConversionError::InvalidAmount(amount))
    }
}

/// Daily feed per bird in grams.
pub fn feed_rate(age_group: AgeGroup) -> f64 {
    match age_group {
        AgeGroup::Chick => 50.0,
        AgeGroup::Grower => 100.0,
        AgeGroup::Adult => 150.0,
    }
}

/// Daily water per bird in ml.
pub fn water_rate(age_group: AgeGroup) -> f64 {
    match age_group {
        AgeGroup::Chick => 80.0,
        AgeGroup::Grower => 150.0,
        AgeGroup::Adult => 200.0,
    }
}

pub fn recommended_feed(age_group: AgeGroup, chicken_count: u32) -> f64 {
    feed_rate(age_group) * chicken_count as f64
}

pub fn recommended_water(age_group: AgeGroup, chicken_count: u32) -> f64 {
    water_rate(age_group) * chicken_count as f64
}
