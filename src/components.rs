use bevy::prelude::*;

/// Unique robot name, as reported in the roster
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct RobotName(pub String);

/// Position of a robot in the roster. Assigned once when the robot is added.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadOrder(pub u64);

/// Next load order handed out by the environment
#[derive(Resource, Default)]
pub struct NextLoadOrder(pub u64);

impl NextLoadOrder {
    pub fn allocate(&mut self) -> LoadOrder {
        let order = LoadOrder(self.0);
        self.0 += 1;
        order
    }
}

/// Per-degree-of-freedom joint parameters. Every vector has one entry per DOF.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct DofState {
    pub joint_names: Vec<String>,
    pub values: Vec<f64>,
    pub lower_limits: Vec<f64>,
    pub upper_limits: Vec<f64>,
    pub velocity_limits: Vec<f64>,
    pub acceleration_limits: Vec<f64>,
    pub torque_limits: Vec<f64>,
    pub weights: Vec<f64>,
}

impl DofState {
    pub fn dof(&self) -> usize {
        self.values.len()
    }

    /// Clamp every joint value into its `[lower, upper]` range.
    pub fn clamp_values(&mut self) {
        for (i, value) in self.values.iter_mut().enumerate() {
            *value = value.clamp(self.lower_limits[i], self.upper_limits[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_order_is_monotonic() {
        let mut next = NextLoadOrder::default();
        let a = next.allocate();
        let b = next.allocate();
        assert!(a < b);
        assert_eq!(next.0, 2);
    }

    #[test]
    fn clamp_values_respects_limits() {
        let mut dof = DofState {
            joint_names: vec!["a".into(), "b".into()],
            values: vec![5.0, -5.0],
            lower_limits: vec![-1.0, -2.0],
            upper_limits: vec![1.0, 2.0],
            velocity_limits: vec![1.0; 2],
            acceleration_limits: vec![1.0; 2],
            torque_limits: vec![1.0; 2],
            weights: vec![1.0; 2],
        };
        dof.clamp_values();
        assert_eq!(dof.values, vec![1.0, -2.0]);
    }
}
