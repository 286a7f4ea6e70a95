//! Dynamical decoupling plans built from a backend's timing model.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use qtt_compile::{
    ALAPScheduleAnalysis, InstructionDurations, PadDynamicalDecoupling, PassManager, PropertySet,
};
use qtt_hal::Backend;
use qtt_ir::{Circuit, StandardGate};

use crate::error::PipelineResult;

/// The echo inserted into idle windows.
pub const DD_SEQUENCE: [StandardGate; 2] = [StandardGate::X, StandardGate::X];

/// Builds [`DecouplingPlan`]s for a backend.
///
/// Construction never fails; everything the plan needs is read from the
/// backend when [`get_plan`](Self::get_plan) is called.
#[derive(Clone)]
pub struct DecouplingPlanBuilder {
    backend: Arc<dyn Backend>,
}

impl DecouplingPlanBuilder {
    /// Create a builder for `backend`.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The target backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Replace the target backend.
    pub fn set_backend(&mut self, backend: Arc<dyn Backend>) {
        self.backend = backend;
    }

    /// ALAP scheduling followed by X-X padding aligned to the backend's
    /// pulse alignment.
    ///
    /// Fails when the backend has no calibration to take durations from, or
    /// no `pulse_alignment` timing constraint.
    pub fn get_plan(&self) -> PipelineResult<DecouplingPlan> {
        let durations = InstructionDurations::from_backend(self.backend.as_ref())?;
        let pulse_alignment = self.backend.configuration().pulse_alignment()?;

        let mut manager = PassManager::new();
        manager.add_pass(ALAPScheduleAnalysis::new(durations.clone()));
        manager.add_pass(PadDynamicalDecoupling::new(
            durations,
            DD_SEQUENCE.to_vec(),
            pulse_alignment,
        )?);

        debug!(
            "Built decoupling plan for '{}' (pulse alignment {})",
            self.backend.name(),
            pulse_alignment
        );

        Ok(DecouplingPlan {
            manager,
            pulse_alignment,
        })
    }
}

impl fmt::Debug for DecouplingPlanBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecouplingPlanBuilder")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// A ready-to-run scheduling and padding pipeline.
pub struct DecouplingPlan {
    manager: PassManager,
    pulse_alignment: u32,
}

impl DecouplingPlan {
    /// Schedule and pad `circuit`, returning the padded copy.
    ///
    /// The circuit must act on physical qubits and use only operations the
    /// backend has durations for, i.e. it must already be transpiled.
    pub fn run(&self, circuit: &Circuit) -> PipelineResult<Circuit> {
        let mut dag = circuit.dag().clone();
        let mut properties = PropertySet::new();
        self.manager.run(&mut dag, &mut properties)?;
        Ok(Circuit::from_dag(dag).with_name(circuit.name()))
    }

    /// Pass names in execution order.
    pub fn stages(&self) -> Vec<&str> {
        self.manager.pass_names()
    }

    /// Granularity, in `dt`, of every inserted delay.
    pub fn pulse_alignment(&self) -> u32 {
        self.pulse_alignment
    }
}

impl fmt::Debug for DecouplingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecouplingPlan")
            .field("stages", &self.stages())
            .field("pulse_alignment", &self.pulse_alignment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use qtt_compile::{CompileError, TranspileOptions, transpile};
    use qtt_hal::{HalError, fake};
    use qtt_ir::{InstructionKind, QubitId};

    #[test]
    fn test_builder_never_fails() {
        let builder = DecouplingPlanBuilder::new(Arc::new(fake::simulator(2)));
        assert_eq!(builder.backend().name(), "simulator");
    }

    #[test]
    fn test_plan_stages() {
        let plan = DecouplingPlanBuilder::new(Arc::new(fake::fake_lagos()))
            .get_plan()
            .unwrap();
        assert_eq!(
            plan.stages(),
            vec!["ALAPScheduleAnalysis", "PadDynamicalDecoupling"]
        );
        assert_eq!(plan.pulse_alignment(), 16);
    }

    #[test]
    fn test_set_backend() {
        let mut builder = DecouplingPlanBuilder::new(Arc::new(fake::simulator(2)));
        assert!(builder.get_plan().is_err());
        builder.set_backend(Arc::new(fake::fake_manila()));
        assert_eq!(builder.backend().name(), "fake_manila");
        assert!(builder.get_plan().is_ok());
    }

    #[test]
    fn test_missing_calibration_propagates() {
        let err = DecouplingPlanBuilder::new(Arc::new(fake::simulator(2)))
            .get_plan()
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Compile(CompileError::Hal(HalError::MissingProperties(_)))
        ));
    }

    #[test]
    fn test_missing_alignment_propagates() {
        let mut backend = fake::fake_manila();
        backend.configuration.timing_constraints = None;
        let err = DecouplingPlanBuilder::new(Arc::new(backend))
            .get_plan()
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Hal(HalError::MissingTimingConstraint { .. })
        ));
    }

    #[test]
    fn test_plan_pads_idle_qubits() {
        let backend = fake::fake_manila();
        let mut circuit = Circuit::with_size("echo", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        for _ in 0..12 {
            circuit.sx(QubitId(1)).unwrap();
        }
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let options = TranspileOptions {
            initial_layout: Some(vec![0, 1]),
            ..TranspileOptions::default()
        };
        let routed = transpile(&circuit, &backend, &options).unwrap();

        let plan = DecouplingPlanBuilder::new(Arc::new(backend))
            .get_plan()
            .unwrap();
        let padded = plan.run(&routed).unwrap();

        assert_eq!(padded.name(), "echo");
        // Qubit 0 idles between the two CX gates and gets one X-X echo.
        let x_on_0 = padded
            .instructions()
            .filter(|i| i.name() == "x" && i.qubits == vec![QubitId(0)])
            .count();
        assert_eq!(x_on_0, 2);
        for inst in padded.instructions() {
            if let InstructionKind::Delay { duration } = inst.kind {
                assert_eq!(duration % 16, 0);
            }
        }
        // The input is left alone.
        assert!(routed.instructions().all(|i| !i.is_delay()));
    }
}
