//! Run statistics tracking

use serde::Serialize;
use std::time::Duration;

/// Counters for one track
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackStatistics {
    /// Wall time of the whole track
    pub wall_time: Duration,

    /// Unitary gate applications, summed over shots
    pub gates_applied: usize,

    /// Kraus branch selections, summed over shots
    pub channel_applications: usize,

    /// Mid-circuit qubit measurements, summed over shots
    pub measurements: usize,
}

impl TrackStatistics {
    /// Add per-shot counters into the track total
    pub fn absorb(&mut self, shot: &TrackStatistics) {
        self.gates_applied += shot.gates_applied;
        self.channel_applications += shot.channel_applications;
        self.measurements += shot.measurements;
    }
}

/// Statistics for a complete dual run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Total time from validation to aggregated result
    pub total_time: Duration,

    /// Time spent building the noise model
    pub noise_model_time: Duration,

    /// Time spent turning samples into probabilities, counts and fidelity
    pub aggregation_time: Duration,

    pub ideal: TrackStatistics,
    pub noisy: TrackStatistics,

    /// Snapshots per shot, including the initial state
    pub checkpoints: usize,

    pub shots: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average number of channel branch selections per noisy shot
    pub fn channel_applications_per_shot(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.noisy.channel_applications as f64 / self.shots as f64
        }
    }

    /// Time share of the noisy track relative to the ideal one
    pub fn noise_overhead(&self) -> f64 {
        let ideal = self.ideal.wall_time.as_secs_f64();
        if ideal == 0.0 {
            0.0
        } else {
            self.noisy.wall_time.as_secs_f64() / ideal
        }
    }
}

impl std::fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Run Statistics:")?;
        writeln!(f, "  Total time: {:?}", self.total_time)?;
        writeln!(f, "    Noise model: {:?}", self.noise_model_time)?;
        writeln!(f, "    Ideal track: {:?}", self.ideal.wall_time)?;
        writeln!(
            f,
            "    Noisy track: {:?} ({:.2}x ideal)",
            self.noisy.wall_time,
            self.noise_overhead()
        )?;
        writeln!(f, "    Aggregation: {:?}", self.aggregation_time)?;

        writeln!(f, "\n  Work:")?;
        writeln!(f, "    Shots: {}", self.shots)?;
        writeln!(f, "    Checkpoints per shot: {}", self.checkpoints)?;
        writeln!(f, "    Gates (ideal/noisy): {}/{}", self.ideal.gates_applied, self.noisy.gates_applied)?;
        writeln!(
            f,
            "    Channel applications: {} ({:.2} per shot)",
            self.noisy.channel_applications,
            self.channel_applications_per_shot()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb() {
        let mut total = TrackStatistics::default();
        let shot = TrackStatistics {
            gates_applied: 3,
            channel_applications: 2,
            measurements: 1,
            ..Default::default()
        };
        total.absorb(&shot);
        total.absorb(&shot);
        assert_eq!(total.gates_applied, 6);
        assert_eq!(total.channel_applications, 4);
        assert_eq!(total.measurements, 2);
    }

    #[test]
    fn test_ratios_handle_zero() {
        let stats = RunStatistics::new();
        assert_eq!(stats.channel_applications_per_shot(), 0.0);
        assert_eq!(stats.noise_overhead(), 0.0);
        assert!(stats.to_string().contains("Run Statistics"));
    }
}
