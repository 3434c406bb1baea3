//! Builds composite error channels and the readout model from a noise profile

use super::channels::{
    AmplitudeDamping, BitFlip, DepolarizingChannel, PhaseDamping, PhaseFlip, ThermalRelaxation,
};
use super::config::{GateNoiseParams, NoiseConfiguration};
use super::readout::ReadoutError;
use super::types::{ChannelComponent, ChannelScope, ErrorChannel, NoiseChannelKind, NoiseModel};
use crate::gate::Gate;
use crate::registry::GateRegistry;
use crate::{QuantumError, Result};
use tracing::{debug, instrument, warn};

/// Convert a percentage into a probability clamped to [0, 1]
#[inline]
pub fn percent_to_probability(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Gate channel probability: quantized to two decimals, then clamped
///
/// Sub-percent settings round to zero and disable the channel. Readout
/// rates are not quantized.
#[inline]
pub fn channel_probability(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    ((percent / 100.0 * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// Build the single composite channel fired after every application of `gate`
///
/// Only mechanisms applicable to the gate are read from `params`. Enabled
/// components are chained in [`NoiseChannelKind`] declaration order.
/// Returns `Ok(None)` when nothing is enabled.
///
/// # Errors
/// Returns [`QuantumError::InvalidRelaxationParams`] if thermal relaxation is
/// enabled with unphysical T1/T2/gate time
pub fn synthesize(gate: &Gate, params: &GateNoiseParams) -> Result<Option<ErrorChannel>> {
    let Some(width) = gate.arity().qubits() else {
        return Ok(None);
    };

    let mut channel = ErrorChannel::new(width);
    for kind in gate.channels().iter() {
        if let Some(component) = component_for(kind, gate, params, width)? {
            channel = channel.compose(component)?;
        }
    }

    if channel.is_empty() {
        Ok(None)
    } else {
        Ok(Some(channel))
    }
}

fn component_for(
    kind: NoiseChannelKind,
    gate: &Gate,
    params: &GateNoiseParams,
    width: usize,
) -> Result<Option<ChannelComponent>> {
    use ChannelScope::{AllQubits, EachQubit};

    if kind == NoiseChannelKind::ThermalRelaxation {
        if !params.thermal_relaxation {
            return Ok(None);
        }
        let relaxation = ThermalRelaxation::new(params.t1, params.t2, params.gate_time)
            .map_err(|e| match e {
                QuantumError::InvalidRelaxationParams { reason, .. } => {
                    QuantumError::invalid_relaxation(gate.id(), reason)
                }
                other => other,
            })?;
        return Ok(Some(ChannelComponent::from_channel(&relaxation, EachQubit)));
    }

    let p = channel_probability(params.probability(kind));
    if p <= 0.0 {
        return Ok(None);
    }

    let component = match kind {
        NoiseChannelKind::BitFlip => ChannelComponent::from_channel(&BitFlip::new(p)?, EachQubit),
        NoiseChannelKind::PhaseFlip => {
            ChannelComponent::from_channel(&PhaseFlip::new(p)?, EachQubit)
        }
        NoiseChannelKind::AmplitudeDamping => {
            ChannelComponent::from_channel(&AmplitudeDamping::new(p)?, EachQubit)
        }
        NoiseChannelKind::PhaseDamping => {
            ChannelComponent::from_channel(&PhaseDamping::new(p)?, EachQubit)
        }
        NoiseChannelKind::Depolarizing => {
            ChannelComponent::from_channel(&DepolarizingChannel::new(p, width)?, AllQubits)
        }
        NoiseChannelKind::ThermalRelaxation | NoiseChannelKind::ReadoutError => return Ok(None),
    };
    Ok(Some(component))
}

/// Readout model from every gate that supports readout error
///
/// When several entries configure it, the highest rate wins.
pub fn readout_model(
    registry: &GateRegistry,
    config: &NoiseConfiguration,
) -> Result<Option<ReadoutError>> {
    let mut rate = 0.0_f64;
    for (gate_id, params) in config.gates() {
        let supports_readout = registry
            .applicable_channels(gate_id)
            .map(|set| set.contains(NoiseChannelKind::ReadoutError))
            .unwrap_or(false);
        if supports_readout {
            rate = rate.max(percent_to_probability(params.readout_error));
        }
    }

    if rate > 0.0 {
        Ok(Some(ReadoutError::symmetric(rate)?))
    } else {
        Ok(None)
    }
}

/// Build the complete noise model for a run
///
/// Entries naming gates that are not in the registry are skipped with a
/// warning, or rejected when `strict` is set.
///
/// # Errors
/// - [`QuantumError::UnknownGate`] in strict mode
/// - [`QuantumError::InvalidRelaxationParams`] from any gate entry
#[instrument(skip_all, fields(entries = config.gates().count(), strict))]
pub fn build_noise_model(
    registry: &GateRegistry,
    config: &NoiseConfiguration,
    strict: bool,
) -> Result<NoiseModel> {
    let mut model = NoiseModel::new();

    for (gate_id, params) in config.gates() {
        let gate = match registry.lookup(gate_id) {
            Ok(gate) => gate,
            Err(err) if strict => return Err(err),
            Err(_) => {
                warn!(gate = gate_id, "noise entry for unknown gate ignored");
                continue;
            }
        };

        if let Some(channel) = synthesize(gate, params)? {
            debug!(gate = gate_id, kinds = ?channel.kinds(), "composite channel built");
            model.set_gate_channel(gate.id(), channel);
        }
    }

    if let Some(readout) = readout_model(registry, config)? {
        debug!(p = readout.p01(), "readout model built");
        model.set_readout(readout);
    }

    Ok(model)
}
