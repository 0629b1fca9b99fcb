//! Solver configuration.

/// Configurable parameters used during solving.
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic.
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities.
    pub clause_activity_decay: f32,

    /// Number of conflicts between local clause reductions.
    pub reduce_locals_interval: u64,

    /// Number of conflicts between mid clause reductions.
    pub reduce_mids_interval: u64,

    /// Scaling factor for luby sequence based restarts (number of conflicts).
    pub luby_restart_interval_scale: u64,

    /// Whether to retain enough clause history to reconstruct a proof on UNSAT.
    ///
    /// When false, `History` premises are still recorded but older hypothesis clauses may be
    /// dropped by simplification, so `unsat_core` can come back incomplete.
    pub keep_proof: bool,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            clause_activity_decay: 0.999,
            reduce_locals_interval: 15000,
            reduce_mids_interval: 10000,
            luby_restart_interval_scale: 128,
            keep_proof: true,
        }
    }
}

/// A partial update to a [`SolverConfig`], as accepted by the solver facade.
///
/// Every field is optional so callers can change a single parameter without restating the rest of
/// the configuration.
#[derive(Default)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub reduce_locals_interval: Option<u64>,
    pub reduce_mids_interval: Option<u64>,
    pub luby_restart_interval_scale: Option<u64>,
    pub keep_proof: Option<bool>,
}

impl SolverConfigUpdate {
    /// Apply this update on top of an existing configuration.
    pub fn apply_to(&self, config: &mut SolverConfig) {
        if let Some(value) = self.vsids_decay {
            config.vsids_decay = value;
        }
        if let Some(value) = self.clause_activity_decay {
            config.clause_activity_decay = value;
        }
        if let Some(value) = self.reduce_locals_interval {
            config.reduce_locals_interval = value;
        }
        if let Some(value) = self.reduce_mids_interval {
            config.reduce_mids_interval = value;
        }
        if let Some(value) = self.luby_restart_interval_scale {
            config.luby_restart_interval_scale = value;
        }
        if let Some(value) = self.keep_proof {
            config.keep_proof = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_overrides_only_set_fields() {
        let mut config = SolverConfig::default();
        let update = SolverConfigUpdate {
            reduce_locals_interval: Some(500),
            ..Default::default()
        };
        update.apply_to(&mut config);

        assert_eq!(config.reduce_locals_interval, 500);
        assert_eq!(config.vsids_decay, SolverConfig::default().vsids_decay);
    }
}
