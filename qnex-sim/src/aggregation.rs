//! Probabilities, counts and fidelity from raw track output
//!
//! Everything here is deterministic: all sampling happened in the coordinator.

use crate::coordinator::TrackOutput;
use crate::error::Result;
use crate::instrumentation::Checkpoint;
use crate::result::{LayerResult, StatevectorSample};
use num_complex::Complex64;

/// |amplitude|² × 100 per basis state
pub fn probabilities_percent(amplitudes: &[Complex64]) -> Vec<f64> {
    amplitudes.iter().map(|a| a.norm_sqr() * 100.0).collect()
}

/// Tally basis indices into a dense count vector of length `dimension`
pub fn tally<I>(outcomes: I, dimension: usize) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut counts = vec![0usize; dimension];
    for outcome in outcomes {
        if let Some(slot) = counts.get_mut(outcome) {
            *slot += 1;
        }
    }
    counts
}

/// Mean over shots of |⟨ideal|noisy⟩|², clamped to [0, 1]
///
/// Shots are paired by index. An empty input gives 1.
pub fn mean_fidelity<'a, I>(pairs: I) -> Result<f64>
where
    I: IntoIterator<Item = (&'a [Complex64], &'a [Complex64])>,
{
    let mut total = 0.0;
    let mut n = 0usize;
    for (ideal, noisy) in pairs {
        total += qnex_state::fidelity(ideal, noisy)?;
        n += 1;
    }
    if n == 0 {
        return Ok(1.0);
    }
    Ok((total / n as f64).clamp(0.0, 1.0))
}

/// Aggregated view of both tracks
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub ideal: Vec<LayerResult>,
    pub noisy: Vec<LayerResult>,
    pub fidelity: Vec<f64>,
}

/// Build per-checkpoint results for both tracks
pub fn aggregate(
    ideal: TrackOutput,
    noisy: TrackOutput,
    checkpoints: &[Checkpoint],
    num_qubits: usize,
) -> Result<Aggregate> {
    let dimension = 1usize << num_qubits;

    let mut fidelity = Vec::with_capacity(checkpoints.len());
    for (position, _) in checkpoints.iter().enumerate() {
        let pairs = ideal.shots.iter().zip(noisy.shots.iter()).filter_map(|(i, n)| {
            Some((i.samples.get(position)?.as_slice(), n.samples.get(position)?.as_slice()))
        });
        fidelity.push(mean_fidelity(pairs)?);
    }

    let ideal = layers_for(ideal, checkpoints, &fidelity, dimension);
    let noisy = layers_for(noisy, checkpoints, &fidelity, dimension);
    Ok(Aggregate {
        ideal,
        noisy,
        fidelity,
    })
}

fn layers_for(
    output: TrackOutput,
    checkpoints: &[Checkpoint],
    fidelity: &[f64],
    dimension: usize,
) -> Vec<LayerResult> {
    let mut layers: Vec<LayerResult> = checkpoints
        .iter()
        .zip(fidelity.iter())
        .enumerate()
        .map(|(position, (checkpoint, &fidelity))| LayerResult {
            index: checkpoint.index,
            label: checkpoint.label.clone(),
            samples: Vec::with_capacity(output.shots.len()),
            probabilities: Vec::with_capacity(output.shots.len()),
            counts: tally(
                output
                    .shots
                    .iter()
                    .filter_map(|record| record.outcomes.get(position).copied()),
                dimension,
            ),
            fidelity,
        })
        .collect();

    for (shot, record) in output.shots.into_iter().enumerate() {
        for (position, amplitudes) in record.samples.into_iter().enumerate() {
            let Some(layer) = layers.get_mut(position) else {
                break;
            };
            layer.probabilities.push(probabilities_percent(&amplitudes));
            layer.samples.push(StatevectorSample { shot, amplitudes });
        }
    }

    debug_assert!(layers.iter().all(|l| l.counts.iter().sum::<usize>() == l.samples.len()));
    layers
}
