//! Result sinks
//!
//! The sweep hands each [`SweepRow`] to a [`ResultSink`]; sinks decide the
//! layout. Column sets are derived from the kernel names passed to
//! [`ResultSink::begin`], so a sink never assumes a kernel count.

use crate::sweep::SweepRow;
use roofline_core::{Error, OutputFormat, Result, RooflineConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Consumer of sweep results.
pub trait ResultSink {
    /// Called once before the first row with the kernel names in column order.
    fn begin(&mut self, kernels: &[&str]) -> Result<()>;

    /// Called once per vector length.
    fn record(&mut self, row: &SweepRow) -> Result<()>;

    /// Called once after the last row.
    fn finish(&mut self) -> Result<()>;
}

fn check_arity(expected: usize, row: &SweepRow) -> Result<()> {
    if row.results.len() != expected {
        return Err(Error::Output(format!(
            "row for n={} has {} kernel results, header has {}",
            row.n,
            row.results.len(),
            expected
        )));
    }
    Ok(())
}

/// Comma-separated output: one line per vector length.
///
/// ```text
/// n,copy gflops,axpy gflops,copy gbytes,axpy gbytes
/// 16,0.000000,1.234567,9.876543,12.345678
/// ```
pub struct CsvSink<W: Write> {
    out: W,
    columns: usize,
}

impl CsvSink<BufWriter<File>> {
    /// CSV sink writing to a new file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        CsvSink { out, columns: 0 }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn begin(&mut self, kernels: &[&str]) -> Result<()> {
        self.columns = kernels.len();
        let mut header = String::from("n");
        for name in kernels {
            header.push_str(&format!(",{} gflops", name));
        }
        for name in kernels {
            header.push_str(&format!(",{} gbytes", name));
        }
        writeln!(self.out, "{}", header)?;
        Ok(())
    }

    fn record(&mut self, row: &SweepRow) -> Result<()> {
        check_arity(self.columns, row)?;
        let mut line = row.n.to_string();
        for result in &row.results {
            line.push_str(&format!(",{:.6}", result.gflops()));
        }
        for result in &row.results {
            line.push_str(&format!(",{:.6}", result.gbytes()));
        }
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per vector length.
pub struct JsonLinesSink<W: Write> {
    out: W,
    columns: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    /// JSON-lines sink writing to a new file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        JsonLinesSink { out, columns: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn begin(&mut self, kernels: &[&str]) -> Result<()> {
        self.columns = kernels.len();
        Ok(())
    }

    fn record(&mut self, row: &SweepRow) -> Result<()> {
        check_arity(self.columns, row)?;
        serde_json::to_writer(&mut self.out, row)
            .map_err(|e| Error::Output(format!("Failed to serialize row: {}", e)))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Human-readable summary lines.
///
/// ```text
/// n = 1024
/// axpy GFLOP/s: 12.345678901234 (3.086419725309 / thread)
/// axpy GB/s: 74.074073407407 (18.518518351852 / thread)
/// ```
///
/// The bandwidth line is printed only when both load and store bandwidth
/// are positive. In verbose mode each thread of the last repetition gets
/// its own line.
pub struct ConsoleSink<W: Write> {
    out: W,
    verbose: bool,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        ConsoleSink { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn begin(&mut self, _kernels: &[&str]) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, row: &SweepRow) -> Result<()> {
        let threads = row.threads.max(1) as f64;
        writeln!(self.out, "n = {}", row.n)?;
        for result in &row.results {
            let gflops = result.gflops();
            writeln!(
                self.out,
                "{} GFLOP/s: {:.12} ({:.12} / thread)",
                result.kernel,
                gflops,
                gflops / threads
            )?;
            let gbytes = result.gbytes();
            if result.best.load_bandwidth > 0.0 && result.best.store_bandwidth > 0.0 {
                writeln!(
                    self.out,
                    "{} GB/s: {:.12} ({:.12} / thread)",
                    result.kernel,
                    gbytes,
                    gbytes / threads
                )?;
            }
            if self.verbose {
                for (tid, t) in result.threads.iter().enumerate() {
                    writeln!(
                        self.out,
                        "  thread {}: runtime {:.9} s, {:.6} GFLOP/s, load {:.6} GB/s, store {:.6} GB/s",
                        tid,
                        t.runtime,
                        t.flop_rate() * 1e-9,
                        t.load_bandwidth() * 1e-9,
                        t.store_bandwidth() * 1e-9
                    )?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Fan-out to several sinks in order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ResultSink>) -> &mut Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for SinkSet {
    fn begin(&mut self, kernels: &[&str]) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.begin(kernels))
    }

    fn record(&mut self, row: &SweepRow) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.record(row))
    }

    fn finish(&mut self) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.finish())
    }
}

/// File sink for `config.output_format` at `config.output_path`.
pub fn file_sink(config: &RooflineConfig) -> Result<Box<dyn ResultSink>> {
    let path = config.output_path.as_path();
    info!(path = %path.display(), format = ?config.output_format, "writing results");
    Ok(match config.output_format {
        OutputFormat::Csv => Box::new(CsvSink::create(path)?),
        OutputFormat::Jsonl => Box::new(JsonLinesSink::create(path)?),
    })
}

/// Console output, plus the result file when `save_output` is set.
pub fn open_sinks(config: &RooflineConfig) -> Result<SinkSet> {
    let mut sinks = SinkSet::new();
    sinks.push(Box::new(ConsoleSink::stdout(config.verbose)));
    if config.save_output {
        sinks.push(file_sink(config)?);
    }
    Ok(sinks)
}
