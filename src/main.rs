use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sxi::index::{IndexConfig, SnapshotIndex};
use sxi::query::{BaselineIndex, StringQuery};
use sxi::utils::progress::step_bar;
use sxi::utils::records::{self, Record};
use tracing::info;

#[derive(Parser)]
#[command(name = "sxi")]
#[command(about = "Immutable suffix array substring index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure index build time over random records
    Bench {
        #[command(flatten)]
        build: BuildArgs,

        /// Number of timed builds
        #[arg(long, default_value = "20")]
        runs: usize,

        /// Leading builds left out of the average
        #[arg(long, default_value = "2")]
        warmup: usize,
    },
    /// Check index answers against a brute-force scan
    Verify {
        #[command(flatten)]
        build: BuildArgs,

        /// Records whose strings provide present probes
        #[arg(long, default_value = "100000")]
        probes: usize,

        /// Records whose strings provide sentinel probes
        #[arg(long, default_value = "100000")]
        absent: usize,
    },
    /// Index a JSON-lines file and run one query
    Query {
        /// File with one `{"id": .., "strings": [..]}` object per line
        file: PathBuf,

        #[command(flatten)]
        pattern: PatternArgs,

        #[command(flatten)]
        index: IndexArgs,
    },
    /// Build over random records and print index statistics as JSON
    Stats {
        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(Args)]
struct IndexArgs {
    /// JSON file with an index configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured shard count
    #[arg(long)]
    shards: Option<usize>,

    /// Override the configured worker thread count
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    index: IndexArgs,

    /// Number of random records
    #[arg(short = 'n', long, default_value = "100000")]
    records: usize,

    /// Seed for record generation
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PatternArgs {
    /// Match records with a string containing this
    #[arg(long)]
    contains: Option<String>,

    /// Match records with a string ending with this
    #[arg(long)]
    ends_with: Option<String>,
}

impl PatternArgs {
    fn into_query(self) -> Option<StringQuery> {
        match (self.contains, self.ends_with) {
            (Some(value), _) => Some(StringQuery::contains(value)),
            (None, Some(value)) => Some(StringQuery::ends_with(value)),
            (None, None) => None,
        }
    }
}

#[derive(Deserialize)]
struct InputRecord {
    id: u64,
    strings: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { build, runs, warmup } => run_bench(&build, runs, warmup, cli.quiet)?,
        Commands::Verify { build, probes, absent } => run_verify(&build, probes, absent, cli.quiet)?,
        Commands::Query { file, pattern, index } => {
            let query = match pattern.into_query() {
                Some(query) => query,
                None => bail!("one of --contains or --ends-with is required"),
            };
            run_query(&file, query, &index)?;
        }
        Commands::Stats { build } => {
            let index = SnapshotIndex::new(load_config(&build.index)?)?;
            index.init(borrowed(&records::generate_records(build.records, build.seed)))?;
            println!("{}", serde_json::to_string_pretty(&index.stats())?);
        }
    }

    Ok(())
}

fn load_config(args: &IndexArgs) -> Result<IndexConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            IndexConfig::from_json(&json).with_context(|| format!("invalid config in {}", path.display()))?
        }
        None => IndexConfig::default(),
    };
    if let Some(shards) = args.shards {
        config.shard_count = shards;
    }
    if let Some(threads) = args.threads {
        config.worker_threads = threads;
    }
    config.validate()?;
    Ok(config)
}

fn borrowed(records: &[Record]) -> impl Iterator<Item = (u64, impl Iterator<Item = &str> + Send)> {
    records.iter().map(|(id, strings)| (*id, strings.iter().map(String::as_str)))
}

fn run_bench(args: &BuildArgs, runs: usize, warmup: usize, quiet: bool) -> Result<()> {
    let config = load_config(&args.index)?;
    info!(records = args.records, runs, shards = config.shard_count, "starting build benchmark");

    let records = records::generate_records(args.records, args.seed);
    let index = SnapshotIndex::new(config)?;
    let bar = step_bar(runs as u64, "building", quiet);

    let mut timings = Vec::with_capacity(runs);
    for _ in 0..runs {
        let started = Instant::now();
        index.init(borrowed(&records))?;
        timings.push(started.elapsed());
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = bar {
        bar.finish_with_message("done");
    }

    let measured = timings.get(warmup..).filter(|t| !t.is_empty()).unwrap_or(&timings[..]);
    let total: Duration = measured.iter().sum();
    let average = total.as_secs_f64() * 1000.0 / measured.len().max(1) as f64;

    let stats = index.stats();
    println!("suffixes: {}, nodes: {}", stats.suffix_count, stats.node_count);
    println!("avg = {:.2} ms over {} builds", average, measured.len());
    Ok(())
}

fn run_verify(args: &BuildArgs, probes: usize, absent: usize, quiet: bool) -> Result<()> {
    let config = load_config(&args.index)?;
    let records = records::generate_records(args.records, args.seed);

    let started = Instant::now();
    let index = SnapshotIndex::new(config)?;
    index.init(borrowed(&records))?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "index ready");

    let baseline = BaselineIndex::new(records.iter().map(|(id, strings)| (*id, strings.clone())));

    let present = records::present_probes(&records, probes, args.seed);
    let bar = step_bar(present.len() as u64, "checking present", quiet);
    let mut index_time = Duration::ZERO;
    let mut baseline_time = Duration::ZERO;

    for probe in &present {
        let query = StringQuery::contains(probe.as_str());

        let started = Instant::now();
        let actual: FxHashSet<u64> = index.retrieve(query.clone())?.iter().copied().collect();
        index_time += started.elapsed();

        let started = Instant::now();
        let expected: FxHashSet<u64> = baseline.matching(&query).copied().collect();
        baseline_time += started.elapsed();

        if actual != expected {
            bail!(
                "check failed for {:?}: index found {}, baseline found {}",
                probe,
                actual.len(),
                expected.len()
            );
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = bar {
        bar.finish_with_message("present probes match");
    }

    println!("reference: {}", throughput(baseline_time, present.len()));
    println!("      sxi: {}", throughput(index_time, present.len()));

    let sentinel = records::absent_probes(&records, absent);
    for probe in &sentinel {
        let found = index.retrieve(StringQuery::contains(probe.as_str()))?;
        if !found.is_empty() {
            bail!("check failed for {:?}: expected no matches, got {}", probe, found.len());
        }
    }
    println!("{} present and {} absent probes verified", present.len(), sentinel.len());
    Ok(())
}

fn throughput(elapsed: Duration, queries: usize) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if ms > 0.0 {
        format!("Total: {:.0} ms, {:.0} qpms", ms, queries as f64 / ms)
    } else {
        format!("Total: {:.0} ms", ms)
    }
}

fn run_query(path: &Path, query: StringQuery, args: &IndexArgs) -> Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut input = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: InputRecord = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed record", path.display(), line_no + 1))?;
        input.push((record.id, record.strings));
    }

    let index = SnapshotIndex::new(load_config(args)?)?;
    index.init(borrowed(&input))?;

    let found = index
        .retrieve(query.clone())
        .with_context(|| format!("cannot answer {}", query))?;
    let mut ids: Vec<u64> = found.distinct().into_iter().copied().collect();
    ids.sort_unstable();
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}
