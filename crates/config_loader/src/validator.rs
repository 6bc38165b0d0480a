//! Session validation
//!
//! Rules:
//! - lap times finite and > 0, titles non-empty
//! - every anchor entry finite, non-negative and within its lap (1 ms slack)
//! - recorded delta samples finite with progress in `[0, 1]`
//! - tuning sections within their ranges (`validator` derive)
//! - seek step not larger than the soft threshold
//! - publish rate not above the timer rate

use contracts::{ContractError, SessionBlueprint};
use ::validator::Validate;

/// Slack allowed when comparing anchor times to lap ends
const LAP_END_SLACK_S: f64 = 1e-3;

/// Validate a session.
///
/// Returns the first error encountered.
pub fn validate(session: &SessionBlueprint) -> Result<(), ContractError> {
    validate_laps(session)?;
    validate_anchors(session)?;
    validate_delta_samples(session)?;
    validate_section("controller", &session.controller)?;
    validate_section("tick", &session.tick)?;
    validate_section("analysis", &session.analysis)?;
    validate_controller(session)?;
    validate_tick(session)?;
    Ok(())
}

fn validate_laps(session: &SessionBlueprint) -> Result<(), ContractError> {
    let laps = &session.laps;
    for (field, value) in [("laps.lap_a", laps.lap_a), ("laps.lap_b", laps.lap_b)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ContractError::config_validation(
                field,
                format!("lap time must be finite and > 0, got {value}"),
            ));
        }
    }
    for (field, value) in [("laps.title_a", &laps.title_a), ("laps.title_b", &laps.title_b)] {
        if value.trim().is_empty() {
            return Err(ContractError::config_validation(field, "title cannot be empty"));
        }
    }
    Ok(())
}

fn validate_anchors(session: &SessionBlueprint) -> Result<(), ContractError> {
    let lap_a = session.laps.lap_a;
    let lap_b = session.laps.lap_b;

    for (idx, pair) in session.anchors.raw_pairs().iter().enumerate() {
        if !pair.is_valid() {
            return Err(ContractError::invalid_anchor(
                pair.time_a,
                pair.time_b,
                format!("anchors[{idx}]: times must be finite and >= 0"),
            ));
        }
        if pair.time_a > lap_a + LAP_END_SLACK_S || pair.time_b > lap_b + LAP_END_SLACK_S {
            return Err(ContractError::invalid_anchor(
                pair.time_a,
                pair.time_b,
                format!("anchors[{idx}]: beyond lap end (lap_a={lap_a}, lap_b={lap_b})"),
            ));
        }
    }
    Ok(())
}

fn validate_delta_samples(session: &SessionBlueprint) -> Result<(), ContractError> {
    for (idx, sample) in session.delta_samples.iter().enumerate() {
        if !sample.p.is_finite() || !(0.0..=1.0).contains(&sample.p) {
            return Err(ContractError::config_validation(
                format!("delta_samples[{idx}].p"),
                format!("progress must be within [0, 1], got {}", sample.p),
            ));
        }
        if !sample.delta.is_finite() {
            return Err(ContractError::config_validation(
                format!("delta_samples[{idx}].delta"),
                "delta must be finite",
            ));
        }
    }
    Ok(())
}

/// Range checks declared on the tuning structs
fn validate_section<T: Validate>(section: &str, value: &T) -> Result<(), ContractError> {
    value.validate().map_err(|errors| {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        match fields.first() {
            Some((field, field_errors)) => ContractError::config_validation(
                format!("{section}.{field}"),
                field_errors
                    .first()
                    .map(|e| format!("out of range ({})", e.code))
                    .unwrap_or_else(|| "invalid value".to_string()),
            ),
            None => ContractError::config_validation(section, errors.to_string()),
        }
    })
}

fn validate_controller(session: &SessionBlueprint) -> Result<(), ContractError> {
    let controller = &session.controller;
    if controller.seek_step_s > controller.soft_threshold_s {
        return Err(ContractError::config_validation(
            "controller.seek_step_s / controller.soft_threshold_s",
            format!(
                "seek_step_s ({}) must be <= soft_threshold_s ({})",
                controller.seek_step_s, controller.soft_threshold_s
            ),
        ));
    }
    Ok(())
}

fn validate_tick(session: &SessionBlueprint) -> Result<(), ContractError> {
    let tick = &session.tick;
    if tick.publish_hz > tick.timer_hz {
        return Err(ContractError::config_validation(
            "tick.publish_hz / tick.timer_hz",
            format!(
                "publish_hz ({}) must be <= timer_hz ({})",
                tick.publish_hz, tick.timer_hz
            ),
        ));
    }
    Ok(())
}
