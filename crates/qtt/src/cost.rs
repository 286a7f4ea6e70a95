//! Cost functions for choosing between transpilation candidates.

use serde::{Deserialize, Serialize};

use qtt_ir::Circuit;

/// Scores a transpiled circuit; lower is better.
pub type TranspileCost = dyn Fn(&Circuit) -> f64 + Send + Sync;

/// Default weight of the circuit depth.
pub const DEFAULT_WEIGHT_DEPTH: f64 = 1.0;

/// Default weight of each CX gate.
pub const DEFAULT_WEIGHT_CNOT: f64 = 20.0;

/// `1.0 * depth + 20.0 * (number of cx gates)`.
///
/// ```rust
/// use qtt::transpile_cost_depth_cnot;
/// use qtt_ir::{Circuit, QubitId};
///
/// let mut circuit = Circuit::with_size("two_cnots", 2, 0);
/// circuit.cx(QubitId(0), QubitId(1)).unwrap();
/// circuit.cx(QubitId(1), QubitId(0)).unwrap();
/// assert_eq!(transpile_cost_depth_cnot(&circuit), 42.0);
/// ```
pub fn transpile_cost_depth_cnot(circuit: &Circuit) -> f64 {
    DepthCnotCost::default().cost(circuit)
}

/// Weighted sum of circuit depth and CX count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthCnotCost {
    /// Weight of the circuit depth.
    pub weight_depth: f64,
    /// Weight of each CX gate.
    pub weight_cnot: f64,
}

impl DepthCnotCost {
    /// Cost with custom weights.
    pub fn new(weight_depth: f64, weight_cnot: f64) -> Self {
        Self {
            weight_depth,
            weight_cnot,
        }
    }

    /// Evaluate the cost of `circuit`.
    #[allow(clippy::cast_precision_loss)]
    pub fn cost(&self, circuit: &Circuit) -> f64 {
        let num_cnots = circuit.count_ops().get("cx").copied().unwrap_or(0);
        self.weight_depth * circuit.depth() as f64 + self.weight_cnot * num_cnots as f64
    }
}

impl Default for DepthCnotCost {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT_DEPTH, DEFAULT_WEIGHT_CNOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_ir::QubitId;

    fn two_cnots() -> Circuit {
        let mut circuit = Circuit::with_size("two_cnots", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        circuit
    }

    #[test]
    fn test_two_cnots_cost_42() {
        assert_eq!(transpile_cost_depth_cnot(&two_cnots()), 42.0);
    }

    #[test]
    fn test_no_cnots() {
        let mut circuit = Circuit::with_size("single", 1, 0);
        circuit.h(QubitId(0)).unwrap().x(QubitId(0)).unwrap();
        assert_eq!(transpile_cost_depth_cnot(&circuit), 2.0);
        assert_eq!(transpile_cost_depth_cnot(&Circuit::new("empty")), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let cost = DepthCnotCost::new(0.5, 1.0);
        assert_eq!(cost.cost(&two_cnots()), 3.0);
    }

    #[test]
    fn test_weights_from_json() {
        let cost: DepthCnotCost = serde_json::from_str(r#"{"weight_cnot": 5.0}"#).unwrap();
        assert_eq!(cost, DepthCnotCost::new(1.0, 5.0));
    }
}
