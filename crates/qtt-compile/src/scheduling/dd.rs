//! Dynamical decoupling padding.

use rustc_hash::FxHashMap;
use tracing::debug;

use qtt_ir::{CircuitDag, Instruction, NodeIndex, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::scheduling::alap::Schedule;
use crate::scheduling::durations::InstructionDurations;

/// Fills idle windows of a scheduled circuit with a decoupling sequence.
///
/// Every idle window on every qubit is padded. A window becomes
/// `delay(τ0) g0 delay(τ1) g1 ... delay(τn)` where the free time is split by
/// `spacing` and each τ is rounded down to the pulse alignment; whatever
/// rounding leaves over goes to the middle delay. Windows too short for the
/// sequence, and windows right after the circuit start or a reset, get a
/// plain delay.
///
/// Needs a [`Schedule`] in the `PropertySet` and replaces it with the
/// schedule of the padded circuit.
pub struct PadDynamicalDecoupling {
    durations: InstructionDurations,
    sequence: Vec<StandardGate>,
    spacing: Vec<f64>,
    pulse_alignment: u32,
    skip_reset_qubits: bool,
}

impl PadDynamicalDecoupling {
    /// Pad with `sequence`, which must be Pauli gates multiplying to the
    /// identity.
    pub fn new(
        durations: InstructionDurations,
        sequence: Vec<StandardGate>,
        pulse_alignment: u32,
    ) -> CompileResult<Self> {
        if pulse_alignment == 0 {
            return Err(CompileError::InvalidConfiguration(
                "pulse alignment must be positive".into(),
            ));
        }
        if sequence.is_empty() {
            return Err(CompileError::InvalidConfiguration(
                "empty decoupling sequence".into(),
            ));
        }
        if !is_pauli_identity(&sequence) {
            return Err(CompileError::InvalidConfiguration(format!(
                "decoupling sequence {:?} does not compose to the identity",
                sequence.iter().map(StandardGate::name).collect::<Vec<_>>()
            )));
        }

        let spacing = balanced_spacing(sequence.len());
        Ok(Self {
            durations,
            sequence,
            spacing,
            pulse_alignment,
            skip_reset_qubits: true,
        })
    }

    /// The X-X echo.
    pub fn xx(durations: InstructionDurations, pulse_alignment: u32) -> CompileResult<Self> {
        Self::new(
            durations,
            vec![StandardGate::X, StandardGate::X],
            pulse_alignment,
        )
    }

    /// Use custom fractions of the free time between pulses. Needs one more
    /// entry than the sequence, all non-negative, summing to one.
    pub fn with_spacing(mut self, spacing: Vec<f64>) -> CompileResult<Self> {
        let sum: f64 = spacing.iter().sum();
        if spacing.len() != self.sequence.len() + 1
            || spacing.iter().any(|&s| s < 0.0)
            || (sum - 1.0).abs() > 1e-9
        {
            return Err(CompileError::InvalidConfiguration(format!(
                "spacing {spacing:?} does not fit a {}-gate sequence",
                self.sequence.len()
            )));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Whether windows after the circuit start or a reset stay plain delays.
    #[must_use]
    pub fn with_skip_reset_qubits(mut self, skip: bool) -> Self {
        self.skip_reset_qubits = skip;
        self
    }

    fn sequence_lengths(&self, qubit: QubitId) -> CompileResult<Vec<u64>> {
        let alignment = u64::from(self.pulse_alignment);
        self.sequence
            .iter()
            .map(|&gate| {
                let length = self
                    .durations
                    .get(&Instruction::single_qubit_gate(gate, qubit))?;
                if length % alignment != 0 {
                    return Err(CompileError::AlignmentViolation {
                        qubit: qubit.0,
                        length,
                        alignment: self.pulse_alignment,
                    });
                }
                Ok(length)
            })
            .collect()
    }

    /// Free-time split for a window with `slack` dt to spare.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn taus(&self, slack: u64) -> Vec<u64> {
        let alignment = u64::from(self.pulse_alignment);
        let mut taus: Vec<u64> = self
            .spacing
            .iter()
            .map(|s| ((slack as f64 * s) / alignment as f64).floor() as u64 * alignment)
            .collect();

        let extra = slack.saturating_sub(taus.iter().sum());
        let middle = (taus.len() - 1) / 2;
        let to_middle = extra / alignment * alignment;
        taus[middle] += to_middle;
        if let Some(last) = taus.last_mut() {
            *last += extra - to_middle;
        }
        taus
    }

    #[allow(clippy::too_many_arguments)]
    fn pad(
        &self,
        out: &mut CircuitDag,
        schedule: &mut Schedule,
        qubit: QubitId,
        t0: u64,
        t1: u64,
        after_reset: bool,
        lengths: &[u64],
    ) -> CompileResult<()> {
        let interval = t1 - t0;
        if interval % u64::from(self.pulse_alignment) != 0 {
            return Err(CompileError::AlignmentViolation {
                qubit: qubit.0,
                length: interval,
                alignment: self.pulse_alignment,
            });
        }

        let mut emit = |inst: Instruction, start: u64| -> CompileResult<()> {
            let node = out.apply(inst)?;
            schedule.start_times.insert(node, start);
            Ok(())
        };

        let sequence_length: u64 = lengths.iter().sum();
        if (self.skip_reset_qubits && after_reset) || interval <= sequence_length {
            return emit(Instruction::delay(qubit, interval), t0);
        }

        let mut time = t0;
        for (i, tau) in self.taus(interval - sequence_length).into_iter().enumerate() {
            if tau > 0 {
                emit(Instruction::delay(qubit, tau), time)?;
                time += tau;
            }
            if let Some(&gate) = self.sequence.get(i) {
                emit(Instruction::single_qubit_gate(gate, qubit), time)?;
                time += lengths[i];
            }
        }
        Ok(())
    }
}

impl Pass for PadDynamicalDecoupling {
    fn name(&self) -> &'static str {
        "PadDynamicalDecoupling"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let schedule = properties
            .get::<Schedule>()
            .ok_or(CompileError::MissingSchedule)?;

        let qubits = dag.qubits();
        let mut lengths = FxHashMap::default();
        for &q in &qubits {
            lengths.insert(q, self.sequence_lengths(q)?);
        }

        // Time order; ties keep insertion order, which is topological.
        let mut ops: Vec<(u64, NodeIndex)> = dag
            .topological_ops()
            .map(|(node, _)| {
                schedule
                    .start(node)
                    .map(|t| (t, node))
                    .ok_or(CompileError::MissingSchedule)
            })
            .collect::<CompileResult<_>>()?;
        ops.sort_unstable();

        let mut out = dag.copy_empty_like();
        let mut padded = Schedule {
            start_times: FxHashMap::default(),
            duration: schedule.duration,
        };
        // Per qubit: when it becomes free, and whether its last op resets it.
        let mut idle_after: FxHashMap<QubitId, (u64, bool)> =
            qubits.iter().map(|&q| (q, (0, true))).collect();

        for (start, node) in ops {
            let Some(inst) = dag.get_instruction(node) else {
                continue;
            };
            for q in &inst.qubits {
                let (free, after_reset) = idle_after[q];
                if free < start {
                    self.pad(&mut out, &mut padded, *q, free, start, after_reset, &lengths[q])?;
                }
            }

            let new_node = out.apply(inst.clone())?;
            padded.start_times.insert(new_node, start);
            let end = start + self.durations.get(inst)?;
            for q in &inst.qubits {
                idle_after.insert(*q, (end, inst.is_reset()));
            }
        }

        for &q in &qubits {
            let (free, after_reset) = idle_after[&q];
            if free < padded.duration {
                let total = padded.duration;
                self.pad(&mut out, &mut padded, q, free, total, after_reset, &lengths[&q])?;
            }
        }

        debug!(
            "Padded {} idle-time nodes over {} dt",
            out.num_ops() - dag.num_ops(),
            padded.duration
        );
        *dag = out;
        properties.insert(padded);
        Ok(())
    }
}

/// Whether a product of Pauli gates is the identity up to phase.
fn is_pauli_identity(sequence: &[StandardGate]) -> bool {
    let mut x_parity = false;
    let mut z_parity = false;
    for gate in sequence {
        match gate {
            StandardGate::I => {}
            StandardGate::X => x_parity = !x_parity,
            StandardGate::Z => z_parity = !z_parity,
            StandardGate::Y => {
                x_parity = !x_parity;
                z_parity = !z_parity;
            }
            _ => return false,
        }
    }
    !x_parity && !z_parity
}

/// Half a slot at each end and full slots in between.
#[allow(clippy::cast_precision_loss)]
fn balanced_spacing(n: usize) -> Vec<f64> {
    let slot = 1.0 / n as f64;
    let mut spacing = vec![slot / 2.0];
    spacing.extend(std::iter::repeat_n(slot, n - 1));
    spacing.push(slot / 2.0);
    spacing
}
