//! Modal mass participation factors

use serde::{Deserialize, Serialize};

use super::{MassBasis, ReducedSystem};
use crate::math::Vector;
use crate::model::DOF_PER_NODE;

/// Directional participation of one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    /// Percent of the directional mass mobilized, ordered UX UY UZ RX RY RZ
    pub percent: [f64; DOF_PER_NODE],
    /// Lᵈ = Σ (M·φ)ᵢ over rows of direction d
    pub factors: [f64; DOF_PER_NODE],
    /// φᵗ·M·φ
    pub modal_mass: f64,
}

/// Computes participation against the directional totals of a reduced system
pub struct ParticipationCalculator<'a> {
    system: &'a ReducedSystem,
    totals: [f64; DOF_PER_NODE],
}

impl<'a> ParticipationCalculator<'a> {
    pub fn new(system: &'a ReducedSystem, basis: MassBasis) -> Self {
        let n = system.size();
        let m = &system.m;
        let mut totals = [0.0; DOF_PER_NODE];

        match basis {
            MassBasis::Diagonal => {
                for i in 0..n {
                    totals[system.direction(i)] += m[(i, i)];
                }
            }
            // rᵗ·M·r, summing the entries whose row and column share a direction
            MassBasis::Influence => {
                for i in 0..n {
                    let d = system.direction(i);
                    for j in 0..n {
                        if system.direction(j) == d {
                            totals[d] += m[(i, j)];
                        }
                    }
                }
            }
        }

        Self { system, totals }
    }

    /// Directional total mass
    pub fn totals(&self) -> [f64; DOF_PER_NODE] {
        self.totals
    }

    pub fn compute(&self, vector: &Vector) -> Participation {
        let m_phi = &self.system.m * vector;
        let modal_mass = vector.dot(&m_phi);

        let mut factors = [0.0; DOF_PER_NODE];
        for (row, value) in m_phi.iter().enumerate() {
            factors[self.system.direction(row)] += value;
        }

        let mut percent = [0.0; DOF_PER_NODE];
        if modal_mass > 0.0 {
            for d in 0..DOF_PER_NODE {
                if self.totals[d] > 0.0 {
                    percent[d] = factors[d] * factors[d] / (modal_mass * self.totals[d]) * 100.0;
                }
            }
        }

        Participation {
            percent,
            factors,
            modal_mass,
        }
    }
}

/// Running sums of participation percent in mode order
pub fn cumulative(modes: &[Participation]) -> Vec<[f64; DOF_PER_NODE]> {
    let mut running = [0.0; DOF_PER_NODE];
    modes
        .iter()
        .map(|p| {
            for (sum, pct) in running.iter_mut().zip(p.percent) {
                *sum += pct;
            }
            running
        })
        .collect()
}
