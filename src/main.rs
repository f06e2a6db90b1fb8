use mincomp::{Algorithm, Dataset, Error, Model, PartitionSearch};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mincomp <n> <q> [exhaustive|merge|split|annealing] \
                     [--seed <u64>] [--log <path>] [--assumed <N>] < data";

struct Options {
    n: usize,
    q: u32,
    algorithm: Algorithm,
    seed: Option<u64>,
    log: Option<PathBuf>,
    assumed: Option<u64>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut seed = None;
    let mut log = None;
    let mut assumed = None;

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or(format!("{} needs a value", name));
        match arg.as_str() {
            "--seed" => seed = Some(parse(&value("--seed")?, "seed")?),
            "--log" => log = Some(PathBuf::from(value("--log")?)),
            "--assumed" => assumed = Some(parse(&value("--assumed")?, "assumed sample size")?),
            _ if arg.starts_with("--") => return Err(format!("unknown option {}", arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let n = parse(&positional.next().ok_or("missing <n>")?, "n")?;
    let q = parse(&positional.next().ok_or("missing <q>")?, "q")?;
    let algorithm = match positional.next() {
        Some(name) => name.parse()?,
        None => Algorithm::SimulatedAnnealing,
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument {}", extra));
    }
    Ok(Options {
        n,
        q,
        algorithm,
        seed,
        log,
        assumed,
    })
}

fn parse<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid {}: {:?}", what, s))
}

fn report(data: &Dataset, model: &Model) -> mincomp::Result<()> {
    let partition = model.partition();
    let evidence = model.best_log_evidence_per_component()?;
    println!();
    println!("{}:", partition);
    for (c, evidence) in partition.iter().zip(evidence) {
        println!("  {}", c.to_bit_string(data.n()));
        println!("    variables: {}", c.len());
        println!("    log-evidence: {:.5}", evidence);
        println!("    log-likelihood: {:.5}", data.log_likelihood_icc(c));
    }
    println!("  log-evidence: {:.5}", model.best_log_evidence()?);
    println!("  log-likelihood: {:.5}", data.log_likelihood(partition)?);
    let complexities = [
        ("parametric complexity", data.parametric_complexity(partition)),
        ("geometric complexity", data.geometric_complexity(partition)),
        ("minimum description length", data.mdl(partition)),
    ];
    for (name, value) in complexities {
        match value {
            Ok(value) => println!("  {}: {:.5}", name, value),
            Err(error @ Error::ComplexityOverflow(_)) => println!("  {}: n/a ({})", name, error),
            Err(error) => return Err(error),
        }
    }
    Ok(())
}

fn run(options: Options) -> mincomp::Result<()> {
    let mut data = Dataset::read(io::stdin().lock(), options.n, options.q)?;
    if let Some(assumed) = options.assumed {
        data.set_assumed_sample_size(assumed)?;
    }

    println!("data: {} variables with {} states", data.n(), data.q());
    println!("  sample size: {}", data.sample_size());
    println!("  assumed sample size: {}", data.assumed_sample_size());
    println!("  unique states: {}", data.unique_states());
    println!("  entropy: {:.5} q-its", data.entropy(None)?);

    let mut search = match options.seed {
        Some(seed) => PartitionSearch::with_seed(seed),
        None => PartitionSearch::new(),
    };
    if let Some(path) = &options.log {
        search.log_to(path)?;
    }

    let model = search.run(options.algorithm, &data, None)?;
    println!("  algorithm: {}", options.algorithm);
    println!("  steps: {}", search.trajectory()?.len());
    report(&data, &model)
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mincomp=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            process::exit(2);
        }
    };

    if let Err(error) = run(options) {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
