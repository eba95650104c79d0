#![deny(warnings)]

//! Headless CLI: synthesize a sales seed script for the statistics database.

use anyhow::{bail, Context, Result};
use persistence::{sink_for, OutputFormat};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seed_core::Scenario;
use seed_runtime::Synthesizer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sales-seed [--scenario <file.yaml>] [--seed <u64>] [--out <file>] \
[--format sql|jsonl] [--with-deliveries] [--version]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: Option<String>,
    seed: Option<u64>,
    out: Option<String>,
    format: OutputFormat,
    with_deliveries: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => parsed.scenario = Some(value(&mut it, "--scenario")?),
            "--seed" => {
                let raw = value(&mut it, "--seed")?;
                parsed.seed = Some(raw.parse().with_context(|| format!("invalid seed: {raw}"))?);
            }
            "--out" => parsed.out = Some(value(&mut it, "--out")?),
            "--format" => {
                parsed.format = value(&mut it, "--format")?
                    .parse()
                    .map_err(anyhow::Error::msg)?;
            }
            "--with-deliveries" => parsed.with_deliveries = true,
            "--version" | "-V" => parsed.version = true,
            "--help" | "-h" => bail!("{USAGE}"),
            other => bail!("unknown argument: {other}\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn value<I: Iterator<Item = String>>(it: &mut I, flag: &str) -> Result<String> {
    it.next()
        .with_context(|| format!("{flag} expects a value\n{USAGE}"))
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the generated script.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!("sales-seed {} ({})", env!("CARGO_PKG_VERSION"), env!("SALES_SEED_COMMIT"));
        return Ok(());
    }

    let scenario = match &args.scenario {
        Some(path) => {
            Scenario::load(path).with_context(|| format!("loading scenario {path}"))?
        }
        None => Scenario::reference()?,
    };
    let seed = args
        .seed
        .or(scenario.run.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!(
        seed,
        scenario = args.scenario.as_deref().unwrap_or("reference"),
        format = %args.format,
        variants = scenario.catalog.len(),
        "starting synthesis"
    );

    let out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {path}"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = sink_for(args.format, out, args.with_deliveries);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let summary = Synthesizer::new(&scenario.catalog, &scenario.run).run(&mut rng, sink.as_mut())?;
    drop(sink);

    for v in &summary.variants {
        info!(
            variant = %v.variant_id,
            name = %v.name,
            transactions = v.transactions,
            units = v.units_sold,
            revenue = %v.revenue,
            final_stock = v.final_stock,
            "variant totals"
        );
    }
    eprintln!(
        "Seed OK | seed: {} | days: {} | transactions: {} | units: {} | revenue: ${} | margin: ${} | replenishments: {}",
        seed,
        summary.days,
        summary.transactions(),
        summary.units_sold(),
        summary.revenue(),
        summary.margin(),
        summary.replenishments()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_reference_sql() {
        let a = args(&[]).unwrap();
        assert_eq!(a, Args::default());
        assert_eq!(a.format, OutputFormat::Sql);
    }

    #[test]
    fn parses_every_flag() {
        let a = args(&[
            "--scenario",
            "demo.yaml",
            "--seed",
            "42",
            "--out",
            "init.sql",
            "--format",
            "jsonl",
            "--with-deliveries",
        ])
        .unwrap();
        assert_eq!(a.scenario.as_deref(), Some("demo.yaml"));
        assert_eq!(a.seed, Some(42));
        assert_eq!(a.out.as_deref(), Some("init.sql"));
        assert_eq!(a.format, OutputFormat::JsonLines);
        assert!(a.with_deliveries);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&["--seed", "abc"]).is_err());
        assert!(args(&["--seed"]).is_err());
        assert!(args(&["--format", "xml"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
    }
}
