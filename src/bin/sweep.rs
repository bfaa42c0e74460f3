//! an executable running the architecture x pooling x hidden size sweep
//! example usage:
//! sweep --data "Data/phishing" --epochs 50 --batch 64
//! sweep --synthetic 40 --epochs 10 --arch graphsage,gin --pool mean,sum --hidden 16,32 --out toy_results.json
//! sweep --data "Data/phishing" --resume
//!
//! The dataset directory holds graphs.csv, nodes.csv, edges.csv (and optionally urls.csv), see phishgnn::io::csv.
//! Results are rewritten after each combination in the result file (default sweep_results.json).
//! The device is chosen automatically, cuda if present (crate built with feature cuda), cpu otherwise.

use std::str::FromStr;

use anyhow::{anyhow, Context};
use clap::{Arg, ArgMatches, Command};
use cpu_time::ProcessTime;
use std::time::SystemTime;

use phishgnn::graph::synthetic::toy_dataset;
use phishgnn::prelude::*;

// parse a comma separated list
fn parse_list<T>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<Vec<T>>>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(str) => {
            let mut values = Vec::<T>::new();
            for item in str.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
                let value = item
                    .parse::<T>()
                    .map_err(|e| anyhow!("could not parse {:?} in --{} : {}", item, name, e))?;
                values.push(value);
            }
            Ok(Some(values))
        }
        None => Ok(None),
    }
} // end of parse_list

fn parse_value<T>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(str) => {
            let value = str.parse::<T>().map_err(|e| anyhow!("could not parse --{} {:?} : {}", name, str, e))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn parse_sweep_params(matches: &ArgMatches) -> anyhow::Result<SweepParams> {
    log::debug!("in parse_sweep_params");
    let defaults = SweepParams::default();
    let architectures = parse_list::<ModelKind>(matches, "arch")?.unwrap_or_else(|| defaults.get_architectures().to_vec());
    let poolings = parse_list::<Pooling>(matches, "pool")?.unwrap_or_else(|| defaults.get_poolings().to_vec());
    let hidden_sizes = parse_list::<usize>(matches, "hidden")?.unwrap_or_else(|| defaults.get_hidden_sizes().to_vec());
    let nb_epochs = parse_value::<usize>(matches, "epochs")?.unwrap_or(defaults.get_nb_epochs());
    //
    let mut params = SweepParams::new(architectures, poolings, hidden_sizes, nb_epochs)
        .with_resume(matches.is_present("resume"));
    if let Some(batch_size) = parse_value::<usize>(matches, "batch")? {
        params = params.with_batch_size(batch_size);
    }
    if let Some(seed) = parse_value::<u64>(matches, "seed")? {
        params = params.with_seed(seed);
    }
    if let Some(out) = matches.value_of("out") {
        params = params.with_result_path(out);
    }
    params.check()?;
    Ok(params)
} // end of parse_sweep_params

fn run() -> anyhow::Result<()> {
    let matches = Command::new("sweep")
        .arg_required_else_help(true)
        .arg(
            Arg::new("data")
                .long("data")
                .takes_value(true)
                .conflicts_with("synthetic")
                .required_unless_present("synthetic")
                .help("directory of the csv dataset"),
        )
        .arg(
            Arg::new("synthetic")
                .long("synthetic")
                .takes_value(true)
                .help("number of graphs of a generated toy dataset"),
        )
        .arg(Arg::new("epochs").long("epochs").takes_value(true).help("number of epochs per combination, default 50"))
        .arg(Arg::new("batch").long("batch").takes_value(true).help("number of graphs per batch, default 64"))
        .arg(Arg::new("hidden").long("hidden").takes_value(true).help("comma separated hidden sizes, default 16,32,64"))
        .arg(
            Arg::new("arch")
                .long("arch")
                .takes_value(true)
                .help("comma separated architectures among graphsage, gat, gin, cluster_gcn, gcn, jk_sage, ffn"),
        )
        .arg(Arg::new("pool").long("pool").takes_value(true).help("comma separated poolings among mean, max, sum"))
        .arg(Arg::new("out").long("out").takes_value(true).help("result file, default sweep_results.json"))
        .arg(Arg::new("resume").long("resume").help("skip the combinations already in the result file"))
        .arg(Arg::new("seed").long("seed").takes_value(true).help("seed of the dataset shuffle and batch orders"))
        .get_matches();
    //
    let params = parse_sweep_params(&matches)?;
    let dataset = if let Some(dir) = matches.value_of("data") {
        load_dataset(dir).with_context(|| format!("loading dataset from {}", dir))?
    } else {
        let nb_graphs = parse_value::<usize>(&matches, "synthetic")?.ok_or_else(|| anyhow!("no dataset given"))?;
        toy_dataset(nb_graphs, params.get_seed())?
    };
    log::info!("class counts : {:?}", dataset.class_counts());
    //
    let device = select_device();
    let cpu_start = ProcessTime::now();
    let sys_start = SystemTime::now();
    let outcome = run_sweep(&dataset, &params, &device)?;
    log::info!(
        "sweep done, {} combinations run, {} recorded in {}",
        outcome.runs.len(),
        outcome.record.len(),
        params.get_result_path().display()
    );
    log::info!(
        " sys time(s) {:.2e} cpu time(s) {:.2e}",
        sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.),
        cpu_start.elapsed().as_secs_f64()
    );
    Ok(())
} // end of run

pub fn main() {
    //
    phishgnn::log_init();
    log::info!("logger initialized");
    //
    if let Err(e) = run() {
        log::error!("sweep failed : {:#}", e);
        eprintln!("sweep failed : {:#}", e);
        std::process::exit(1);
    }
} // end of main
