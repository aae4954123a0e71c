//! One function per subcommand, plus the in-memory pipeline.

use anyhow::{Context, Result};
use tracing::info;

use ean_core::DelayRng;
use ean_delay::{EvaluationReport, derive_flags, evaluate as evaluate_dispo, inject_delays, propagate_delays};
use ean_io::{
    NetworkFiles, load_delays, load_dispo_timetable, load_network, load_od, load_paths,
    load_periodic_network, load_ptn, save_delays, save_dispo_timetable, save_expanded_od, save_network,
    save_paths, save_statistics,
};
use ean_network::{AperiodicNetwork, PathRecord, Ptn};
use ean_reroute::reroute as reroute_passengers;
use ean_rollout::roll_out;

use crate::config::RunConfig;

// ── Subcommands ───────────────────────────────────────────────────────────────

pub fn rollout(config: &RunConfig) -> Result<()> {
    let network = expand(config)?;
    write_network(&network, &config.files.network)
}

pub fn delays(config: &RunConfig) -> Result<()> {
    let mut network = read_network(&config.files.network)?;
    if config.delays.append {
        load_delays(&mut network, &config.files.delays).context("reading delay tables")?;
    }
    inject(config, &mut network)?;
    save_delays(&network, &config.files.delays).context("writing delay tables")?;
    Ok(())
}

pub fn propagate(config: &RunConfig) -> Result<()> {
    let mut network = read_network(&config.files.network)?;
    load_delays(&mut network, &config.files.delays).context("reading delay tables")?;
    propagate_delays(&mut network, &config.propagation)?;
    save_dispo_timetable(&network, &config.files.dispo).context("writing disposition timetable")?;
    Ok(())
}

pub fn reroute(config: &RunConfig) -> Result<()> {
    let mut network = read_disposition(config, &config.files.network)?;
    route(config, &mut network)?;
    Ok(())
}

pub fn evaluate(config: &RunConfig) -> Result<()> {
    let network = read_disposition(config, config.files.rerouted())?;
    let paths = if config.files.paths.exists() {
        Some(load_paths(&config.files.paths).context("reading passenger paths")?)
    } else {
        None
    };
    price(config, &network, paths.as_deref())?;
    Ok(())
}

pub fn pipeline(config: &RunConfig) -> Result<()> {
    let mut network = expand(config)?;
    write_network(&network, &config.files.network)?;

    inject(config, &mut network)?;
    save_delays(&network, &config.files.delays).context("writing delay tables")?;

    propagate_delays(&mut network, &config.propagation)?;
    save_dispo_timetable(&network, &config.files.dispo).context("writing disposition timetable")?;

    let paths = route(config, &mut network)?;
    let report = price(config, &network, Some(paths.as_slice()))?;
    info!(feasible = report.feasible, objective = report.objective, "pipeline finished");
    Ok(())
}

// ── Shared steps ──────────────────────────────────────────────────────────────

fn expand(config: &RunConfig) -> Result<AperiodicNetwork> {
    let periodic = load_periodic_network(&config.files.periodic, config.rollout.period)
        .context("reading periodic network")?;
    let (network, _) = roll_out(&periodic, &config.rollout)?;
    Ok(network)
}

fn ptn(config: &RunConfig) -> Result<Ptn> {
    let files = &config.files.periodic;
    let ptn = load_ptn(files.edges.as_deref(), files.headways.as_deref(), files.line_pool.as_deref())
        .context("reading PTN tables")?;
    Ok(ptn)
}

fn inject(config: &RunConfig, network: &mut AperiodicNetwork) -> Result<()> {
    let ptn = ptn(config)?;
    let mut rng = DelayRng::from_config(config.delays.seed);
    inject_delays(network, &ptn, &config.delays, &mut rng)?;
    Ok(())
}

/// Network with source delays, disposition times and the flags they imply.
fn read_disposition(config: &RunConfig, files: &NetworkFiles) -> Result<AperiodicNetwork> {
    let mut network = read_network(files)?;
    load_delays(&mut network, &config.files.delays).context("reading delay tables")?;
    load_dispo_timetable(&mut network, &config.files.dispo).context("reading disposition timetable")?;
    derive_flags(&mut network);
    Ok(network)
}

fn route(config: &RunConfig, network: &mut AperiodicNetwork) -> Result<Vec<PathRecord>> {
    let demand = load_od(&config.files.od).context("reading OD matrix")?;
    let outcome = reroute_passengers(network, &demand, &config.reroute)?;
    write_network(network, config.files.rerouted())?;
    save_paths(&outcome.paths, &config.files.paths).context("writing passenger paths")?;
    save_expanded_od(&outcome.expanded, &config.files.expanded_od).context("writing expanded OD")?;
    Ok(outcome.paths)
}

fn price(config: &RunConfig, network: &AperiodicNetwork, paths: Option<&[PathRecord]>) -> Result<EvaluationReport> {
    let report = evaluate_dispo(network, config.rollout.period, &config.evaluation, paths)?;
    save_statistics(report.statistics(), &config.files.statistics).context("writing statistics")?;
    Ok(report)
}

fn read_network(files: &NetworkFiles) -> Result<AperiodicNetwork> {
    load_network(files).with_context(|| format!("reading network {}", files.events.display()))
}

fn write_network(network: &AperiodicNetwork, files: &NetworkFiles) -> Result<()> {
    save_network(network, files).with_context(|| format!("writing network {}", files.events.display()))
}
