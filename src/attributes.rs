//! Robot attributes that a `set` command can change.
//!
//! The registry is closed: each wire key maps to one typed setter on
//! [`RobotState`]. Keys are case-sensitive.

use serde_json::Value;
use thiserror::Error;

use crate::environment::RobotState;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AttributeError {
    #[error("unknown attribute `{0}`")]
    Unknown(String),

    #[error("`{attribute}` expects {expected}")]
    TypeMismatch {
        attribute: &'static str,
        expected: &'static str,
    },

    #[error("`{attribute}` expects {expected} values, got {actual}")]
    DofMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{attribute}` value at index {index} must not be negative")]
    Negative { attribute: &'static str, index: usize },

    #[error("lower limit {lower} exceeds upper limit {upper} at index {index}")]
    InvertedLimits { index: usize, lower: f64, upper: f64 },

    #[error("robot name must not be empty")]
    EmptyName,
}

type Setter = fn(&mut RobotState, &Value) -> Result<(), AttributeError>;

/// Every settable attribute, keyed by its wire name.
pub const ATTRIBUTES: &[(&str, Setter)] = &[
    ("Name", set_name),
    ("DOFValues", set_dof_values),
    ("DOFLimits", set_dof_limits),
    ("DOFVelocityLimits", set_velocity_limits),
    ("DOFAccelerationLimits", set_acceleration_limits),
    ("DOFTorqueLimits", set_torque_limits),
    ("DOFWeights", set_weights),
];

/// Apply one attribute to a staged robot state.
pub fn apply_attribute(robot: &mut RobotState, key: &str, value: &Value) -> Result<(), AttributeError> {
    let (_, setter) = ATTRIBUTES
        .iter()
        .find(|(name, _)| *name == key)
        .ok_or_else(|| AttributeError::Unknown(key.to_string()))?;
    setter(robot, value)
}

fn set_name(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let name = value.as_str().ok_or(AttributeError::TypeMismatch {
        attribute: "Name",
        expected: "a string",
    })?;
    if name.trim().is_empty() {
        return Err(AttributeError::EmptyName);
    }
    robot.name = name.to_string();
    Ok(())
}

fn set_dof_values(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let values = dof_vector("DOFValues", value, robot.dof.dof())?;
    robot.dof.values = values;
    robot.dof.clamp_values();
    Ok(())
}

fn set_dof_limits(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    const EXPECTED: &str = "a [lower, upper] pair of number arrays";
    let [lower, upper] = value.as_array().map(Vec::as_slice).unwrap_or_default() else {
        return Err(AttributeError::TypeMismatch {
            attribute: "DOFLimits",
            expected: EXPECTED,
        });
    };
    let dof = robot.dof.dof();
    let lower = dof_vector("DOFLimits", lower, dof)?;
    let upper = dof_vector("DOFLimits", upper, dof)?;
    if let Some(index) = (0..dof).find(|&i| lower[i] > upper[i]) {
        return Err(AttributeError::InvertedLimits {
            index,
            lower: lower[index],
            upper: upper[index],
        });
    }
    robot.dof.lower_limits = lower;
    robot.dof.upper_limits = upper;
    robot.dof.clamp_values();
    Ok(())
}

fn set_velocity_limits(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let dof = robot.dof.dof();
    replace_non_negative("DOFVelocityLimits", value, dof, &mut robot.dof.velocity_limits)
}

fn set_acceleration_limits(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let dof = robot.dof.dof();
    replace_non_negative("DOFAccelerationLimits", value, dof, &mut robot.dof.acceleration_limits)
}

fn set_torque_limits(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let dof = robot.dof.dof();
    replace_non_negative("DOFTorqueLimits", value, dof, &mut robot.dof.torque_limits)
}

fn set_weights(robot: &mut RobotState, value: &Value) -> Result<(), AttributeError> {
    let dof = robot.dof.dof();
    replace_non_negative("DOFWeights", value, dof, &mut robot.dof.weights)
}

fn replace_non_negative(
    attribute: &'static str,
    value: &Value,
    dof: usize,
    target: &mut Vec<f64>,
) -> Result<(), AttributeError> {
    let values = dof_vector(attribute, value, dof)?;
    if let Some(index) = values.iter().position(|v| *v < 0.0) {
        return Err(AttributeError::Negative { attribute, index });
    }
    *target = values;
    Ok(())
}

/// A JSON array of exactly `dof` finite numbers.
fn dof_vector(attribute: &'static str, value: &Value, dof: usize) -> Result<Vec<f64>, AttributeError> {
    let mismatch = AttributeError::TypeMismatch {
        attribute,
        expected: "an array of numbers",
    };
    let items = value.as_array().ok_or_else(|| mismatch.clone())?;
    if items.len() != dof {
        return Err(AttributeError::DofMismatch {
            attribute,
            expected: dof,
            actual: items.len(),
        });
    }
    items
        .iter()
        .map(|v| v.as_f64().filter(|f| f.is_finite()).ok_or_else(|| mismatch.clone()))
        .collect()
}
