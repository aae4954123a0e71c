//! The run file: one TOML document with a table per stage and `[files]`.
//!
//! ```toml
//! [rollout]
//! period        = 3600
//! earliest_time = 18000
//! latest_time   = 36000
//!
//! [delays]
//! strategy = "uniform_activities"
//! count    = 10
//! seed     = 42
//!
//! [files.periodic]
//! events     = "periodic/Events-periodic.giv"
//! activities = "periodic/Activities-periodic.giv"
//! timetable  = "periodic/Timetable-periodic.tim"
//! ```
//!
//! Relative paths are resolved against the directory of the run file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use ean_core::{DelayConfig, EvaluationConfig, PropagationConfig, RerouteConfig, RolloutConfig};
use ean_io::{DelayFiles, NetworkFiles, PeriodicFiles};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub rollout:     RolloutConfig,
    pub delays:      DelayConfig,
    pub propagation: PropagationConfig,
    pub reroute:     RerouteConfig,
    pub evaluation:  EvaluationConfig,
    pub files:       Files,
}

/// Every table a run reads or writes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Files {
    pub periodic:    PeriodicFiles,
    pub network:     NetworkFiles,
    /// Network with rerouted passenger weights; `network` is overwritten
    /// when unset.
    pub rerouted:    Option<NetworkFiles>,
    pub delays:      DelayFiles,
    pub dispo:       PathBuf,
    pub od:          PathBuf,
    pub paths:       PathBuf,
    pub expanded_od: PathBuf,
    pub statistics:  PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            periodic:    PeriodicFiles::default(),
            network:     NetworkFiles {
                events:     "delay-management/Events-expanded.giv".into(),
                activities: "delay-management/Activities-expanded.giv".into(),
                trip_ends:  Some("delay-management/Events-trip-ends.giv".into()),
            },
            rerouted:    None,
            delays:      DelayFiles {
                events:     "delay-management/Delays-Events.giv".into(),
                activities: "delay-management/Delays-Activities.giv".into(),
            },
            dispo:       "delay-management/Timetable-disposition.tim".into(),
            od:          "demand/OD.giv".into(),
            paths:       "delay-management/Passenger-paths.giv".into(),
            expanded_od: "delay-management/OD-expanded.giv".into(),
            statistics:  "statistic/statistic.sta".into(),
        }
    }
}

impl RunConfig {
    /// Read and validate the run file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read run file {}", path.display()))?;
        let mut config = Self::parse(&text).with_context(|| format!("invalid run file {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.files.resolve(base);
        }
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.rollout.validate()?;
        config.delays.validate()?;
        config.propagation.validate()?;
        config.reroute.validate()?;
        config.evaluation.validate()?;
        Ok(config)
    }
}

impl Files {
    /// Prefix every relative path with `base`.
    fn resolve(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        let fix_network = |n: &mut NetworkFiles| {
            fix(&mut n.events);
            fix(&mut n.activities);
            if let Some(p) = n.trip_ends.as_mut() {
                fix(p);
            }
        };

        fix(&mut self.periodic.events);
        fix(&mut self.periodic.activities);
        fix(&mut self.periodic.timetable);
        for p in [&mut self.periodic.line_pool, &mut self.periodic.edges, &mut self.periodic.headways]
            .into_iter()
            .flatten()
        {
            fix(p);
        }
        fix_network(&mut self.network);
        if let Some(n) = self.rerouted.as_mut() {
            fix_network(n);
        }
        fix(&mut self.delays.events);
        fix(&mut self.delays.activities);
        for p in [&mut self.dispo, &mut self.od, &mut self.paths, &mut self.expanded_od, &mut self.statistics] {
            fix(p);
        }
    }

    /// Where the rerouted network goes.
    pub fn rerouted(&self) -> &NetworkFiles {
        self.rerouted.as_ref().unwrap_or(&self.network)
    }
}
