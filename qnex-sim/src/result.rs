//! Simulation result types

use crate::coordinator::Track;
use crate::statistics::RunStatistics;
use num_complex::Complex64;
use serde::Serialize;
use std::collections::BTreeMap;

/// Amplitudes captured by one shot at one checkpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatevectorSample {
    pub shot: usize,
    pub amplitudes: Vec<Complex64>,
}

/// Per-checkpoint output of one track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerResult {
    /// Checkpoint index, 0 = initial state
    pub index: usize,
    pub label: String,
    /// One sample per shot, in shot order
    pub samples: Vec<StatevectorSample>,
    /// Per-shot basis probabilities in percent
    pub probabilities: Vec<Vec<f64>>,
    /// Sampled outcomes tallied per basis index; sums to the shot count
    pub counts: Vec<usize>,
    /// Mean fidelity against the paired track at this checkpoint
    pub fidelity: f64,
}

impl LayerResult {
    /// Probability vector (percent) of one shot
    pub fn probabilities_for_shot(&self, shot: usize) -> Option<&[f64]> {
        self.probabilities.get(shot).map(Vec::as_slice)
    }

    pub fn total_counts(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Result of a dual ideal/noisy simulation
///
/// Equality compares the simulated data only. `statistics` holds wall-clock
/// timings and is ignored, so two runs with the same seed compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Basis-state labels in index order, qubit 0 rightmost
    pub basis_states: Vec<String>,

    /// Seed actually used, whether supplied or drawn
    pub seed: u64,

    pub shots: usize,

    pub num_qubits: usize,

    pub ideal: Vec<LayerResult>,

    pub noisy: Vec<LayerResult>,

    /// Fidelity per checkpoint
    pub fidelity: Vec<f64>,

    /// Run statistics (if statistics collection was enabled)
    pub statistics: Option<RunStatistics>,
}

impl PartialEq for SimulationResult {
    fn eq(&self, other: &Self) -> bool {
        self.basis_states == other.basis_states
            && self.seed == other.seed
            && self.shots == other.shots
            && self.num_qubits == other.num_qubits
            && self.ideal == other.ideal
            && self.noisy == other.noisy
            && self.fidelity == other.fidelity
    }
}

impl SimulationResult {
    /// Per-checkpoint ideal/noisy fidelity
    pub fn fidelity_trend(&self) -> &[f64] {
        &self.fidelity
    }

    pub fn num_checkpoints(&self) -> usize {
        self.fidelity.len()
    }

    pub fn layers(&self, track: Track) -> &[LayerResult] {
        match track {
            Track::Ideal => &self.ideal,
            Track::Noisy => &self.noisy,
        }
    }

    pub fn layer(&self, track: Track, checkpoint: usize) -> Option<&LayerResult> {
        self.layers(track).get(checkpoint)
    }

    /// Last checkpoint of a track
    pub fn final_layer(&self, track: Track) -> Option<&LayerResult> {
        self.layers(track).last()
    }

    /// Probabilities (percent) of the selected shot at a checkpoint
    pub fn probabilities_for_shot(
        &self,
        track: Track,
        checkpoint: usize,
        shot: usize,
    ) -> Option<&[f64]> {
        self.layer(track, checkpoint)?.probabilities_for_shot(shot)
    }

    /// Counts keyed by basis label, zero entries left out
    pub fn counts_map(&self, track: Track, checkpoint: usize) -> Option<BTreeMap<String, usize>> {
        let layer = self.layer(track, checkpoint)?;
        Some(
            self.basis_states
                .iter()
                .zip(layer.counts.iter())
                .filter(|(_, &count)| count > 0)
                .map(|(label, &count)| (label.clone(), count))
                .collect(),
        )
    }

    /// Probability (percent) of a labelled basis state for a shot
    pub fn probability_of(
        &self,
        track: Track,
        checkpoint: usize,
        shot: usize,
        label: &str,
    ) -> Option<f64> {
        let index = self.basis_states.iter().position(|l| l == label)?;
        self.probabilities_for_shot(track, checkpoint, shot)?
            .get(index)
            .copied()
    }
}
