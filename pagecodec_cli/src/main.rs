use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pagecodec_codecs::{compress_with, uncompress_with};
use pagecodec_core::{CompressionCodec, PhysicalType, PlainValues};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pagecodec",
    about = "Compress, decompress, and PLAIN-encode columnar page buffers",
    version
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a page buffer
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Codec to use: uncompressed | snappy | gzip | lz4 | zstd
        #[arg(short, long, default_value = "zstd")]
        codec: CompressionCodec,
    },
    /// Decompress a page buffer
    Decompress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Codec the page was compressed with
        #[arg(short, long)]
        codec: CompressionCodec,
    },
    /// PLAIN-encode values given on the command line
    Encode {
        /// Physical type of the values
        #[arg(short = 't', long = "type", value_enum)]
        value_type: ValueType,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Values to encode (true/false for bool)
        #[arg(allow_negative_numbers = true)]
        values: Vec<String>,
    },
    /// PLAIN-decode a buffer and print one value per line
    Decode {
        /// Physical type of the values
        #[arg(short = 't', long = "type", value_enum)]
        value_type: ValueType,
        /// Number of values; required for bool, checked for the others
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Source file ("-" reads stdin)
        input: PathBuf,
    },
    /// Benchmark repeated compress + uncompress of one buffer
    Bench {
        /// Buffer to compress
        input: PathBuf,
        /// Codec to benchmark
        #[arg(short, long, default_value = "zstd")]
        codec: CompressionCodec,
        /// Number of compress + uncompress rounds
        #[arg(short, long, default_value_t = 100)]
        iterations: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueType {
    Bool,
    Int32,
    Int64,
    Float,
    Double,
}

impl From<ValueType> for PhysicalType {
    fn from(t: ValueType) -> Self {
        match t {
            ValueType::Bool => PhysicalType::Boolean,
            ValueType::Int32 => PhysicalType::Int32,
            ValueType::Int64 => PhysicalType::Int64,
            ValueType::Float => PhysicalType::Float,
            ValueType::Double => PhysicalType::Double,
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("reading input file {:?}", path))
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if path.to_str() == Some("-") {
        let mut out = io::stdout().lock();
        out.write_all(bytes)?;
        out.flush()?;
    } else {
        let mut file =
            File::create(path).with_context(|| format!("creating output file {:?}", path))?;
        file.write_all(bytes)?;
    }
    Ok(())
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn parse_values(ty: PhysicalType, raw: &[String]) -> anyhow::Result<PlainValues> {
    fn parse_all<T: std::str::FromStr>(raw: &[String], ty: PhysicalType) -> anyhow::Result<Vec<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        raw.iter()
            .map(|s| {
                s.parse::<T>()
                    .with_context(|| format!("parsing {:?} as {}", s, ty.name()))
            })
            .collect()
    }

    Ok(match ty {
        PhysicalType::Boolean => PlainValues::Boolean(parse_all(raw, ty)?),
        PhysicalType::Int32 => PlainValues::Int32(parse_all(raw, ty)?),
        PhysicalType::Int64 => PlainValues::Int64(parse_all(raw, ty)?),
        PhysicalType::Float => PlainValues::Float(parse_all(raw, ty)?),
        PhysicalType::Double => PlainValues::Double(parse_all(raw, ty)?),
    })
}

fn print_values(values: &PlainValues) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match values {
        PlainValues::Boolean(v) => v.iter().try_for_each(|x| writeln!(out, "{}", x))?,
        PlainValues::Int32(v) => v.iter().try_for_each(|x| writeln!(out, "{}", x))?,
        PlainValues::Int64(v) => v.iter().try_for_each(|x| writeln!(out, "{}", x))?,
        PlainValues::Float(v) => v.iter().try_for_each(|x| writeln!(out, "{}", x))?,
        PlainValues::Double(v) => v.iter().try_for_each(|x| writeln!(out, "{}", x))?,
    }
    Ok(())
}

/// Min / avg / percentile summary of a set of timings.
struct LatencyStats {
    min: Duration,
    avg: Duration,
    p50: Duration,
    p90: Duration,
    p99: Duration,
    max: Duration,
}

impl LatencyStats {
    /// `samples` must be non-empty.
    fn from_samples(mut samples: Vec<Duration>) -> Self {
        samples.sort_unstable();
        let pick = |q: f64| samples[((samples.len() - 1) as f64 * q).round() as usize];
        let total: Duration = samples.iter().sum();
        Self {
            min: samples[0],
            avg: total / samples.len() as u32,
            p50: pick(0.50),
            p90: pick(0.90),
            p99: pick(0.99),
            max: samples[samples.len() - 1],
        }
    }

    fn print(&self, label: &str) {
        println!("  {}:", label);
        println!("    min  : {} µs", self.min.as_micros());
        println!("    avg  : {} µs", self.avg.as_micros());
        println!("    p50  : {} µs", self.p50.as_micros());
        println!("    p90  : {} µs", self.p90.as_micros());
        println!("    p99  : {} µs", self.p99.as_micros());
        println!("    max  : {} µs", self.max.as_micros());
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(input: PathBuf, output: PathBuf, codec: CompressionCodec) -> anyhow::Result<()> {
    let raw = read_input(&input)?;
    let t0 = Instant::now();
    let compressed = compress_with(codec, &raw)
        .with_context(|| format!("compressing {:?} with {}", input, codec))?;
    let elapsed = t0.elapsed();
    write_output(&output, &compressed)?;

    let ratio = if compressed.is_empty() {
        1.0
    } else {
        raw.len() as f64 / compressed.len() as f64
    };
    eprintln!("  codec       : {} (id={})", codec, codec.id());
    eprintln!("  raw size    : {}", human_bytes(raw.len() as u64));
    eprintln!("  compressed  : {}", human_bytes(compressed.len() as u64));
    eprintln!("  ratio       : {:.2}x", ratio);
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf, codec: CompressionCodec) -> anyhow::Result<()> {
    let compressed = read_input(&input)?;
    let t0 = Instant::now();
    let raw = uncompress_with(codec, &compressed)
        .with_context(|| format!("decompressing {:?} as {}", input, codec))?;
    let elapsed = t0.elapsed();
    write_output(&output, &raw)?;

    eprintln!("  codec       : {} (id={})", codec, codec.id());
    eprintln!("  compressed  : {}", human_bytes(compressed.len() as u64));
    eprintln!("  raw size    : {}", human_bytes(raw.len() as u64));
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_encode(ty: PhysicalType, output: PathBuf, raw_values: Vec<String>) -> anyhow::Result<()> {
    let values = parse_values(ty, &raw_values)?;
    let encoded = values.encode();
    debug!(value_type = ty.name(), count = values.len(), bytes = encoded.len(), "encoded values");
    write_output(&output, &encoded)?;
    eprintln!("  {} {} values -> {} bytes", values.len(), ty.name(), encoded.len());
    Ok(())
}

fn run_decode(ty: PhysicalType, count: Option<usize>, input: PathBuf) -> anyhow::Result<()> {
    let buf = read_input(&input)?;
    let count = match (count, ty.width()) {
        (Some(n), _) => n,
        (None, Some(width)) => buf.len() / width,
        (None, None) => anyhow::bail!("--count is required to decode booleans"),
    };
    let values = PlainValues::decode(ty, &buf, count)
        .with_context(|| format!("decoding {:?} as {} {} values", input, count, ty.name()))?;
    print_values(&values)
}

fn run_bench(input: PathBuf, codec: CompressionCodec, iterations: u32) -> anyhow::Result<()> {
    if iterations == 0 {
        anyhow::bail!("--iterations must be at least 1");
    }
    let raw = read_input(&input)?;

    eprintln!(
        "benchmarking {} rounds of {} over {}...",
        iterations,
        codec,
        human_bytes(raw.len() as u64)
    );

    let mut compress_times = Vec::with_capacity(iterations as usize);
    let mut uncompress_times = Vec::with_capacity(iterations as usize);
    let mut compressed_len = 0usize;

    let t0 = Instant::now();
    for _ in 0..iterations {
        let t = Instant::now();
        let compressed = compress_with(codec, &raw)?;
        compress_times.push(t.elapsed());

        let t = Instant::now();
        let restored = uncompress_with(codec, &compressed)?;
        uncompress_times.push(t.elapsed());

        if restored[..] != raw[..] {
            anyhow::bail!("{} round-trip mismatch during benchmark", codec);
        }
        compressed_len = compressed.len();
    }
    let elapsed = t0.elapsed();

    let compress_stats = LatencyStats::from_samples(compress_times);
    let uncompress_stats = LatencyStats::from_samples(uncompress_times);
    let throughput = |d: Duration| {
        let secs = d.as_secs_f64();
        if secs == 0.0 {
            "n/a".to_string()
        } else {
            format!("{}/s", human_bytes((raw.len() as f64 / secs) as u64))
        }
    };

    println!();
    println!("=== Page Codec Benchmark ===");
    println!("  codec       : {} (id={})", codec, codec.id());
    println!("  raw size    : {}", human_bytes(raw.len() as u64));
    println!("  compressed  : {}", human_bytes(compressed_len as u64));
    println!("  rounds      : {}", iterations);
    println!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    println!("  compress    : {} (avg)", throughput(compress_stats.avg));
    println!("  uncompress  : {} (avg)", throughput(uncompress_stats.avg));
    compress_stats.print("compress latency");
    uncompress_stats.print("uncompress latency");

    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
        } => run_compress(input, output, codec),
        Commands::Decompress {
            input,
            output,
            codec,
        } => run_decompress(input, output, codec),
        Commands::Encode {
            value_type,
            output,
            values,
        } => run_encode(value_type.into(), output, values),
        Commands::Decode {
            value_type,
            count,
            input,
        } => run_decode(value_type.into(), count, input),
        Commands::Bench {
            input,
            codec,
            iterations,
        } => run_bench(input, codec, iterations),
    }
}
