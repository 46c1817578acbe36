use anyhow::Context;
use byterig_config::{HandlerKind, HarnessAssertion, HarnessScript, StopReason};
use byterig_core::handler::{EchoHandler, NullHandler, RecordingHandler};
use byterig_core::metrics::ThroughputMetrics;
use byterig_core::source::{file_source, stdin_source};
use byterig_core::{ByteSource, Pump, PumpError, PumpResult, PumpStats, StopCause};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

mod report;

const EXIT_ASSERT_FAIL: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "ByteRig Firmware Input Harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HandlerArg {
    /// Echo every byte to stdout
    Echo,
    /// Discard every byte
    Null,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pump an input byte stream into a handler
    Run {
        /// Stimulus file to read (defaults to standard input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Handler plugged into the pump
        #[arg(long, value_enum, default_value_t = HandlerArg::Echo)]
        handler: HandlerArg,

        /// Stop after delivering this many bytes
        #[arg(long)]
        max_bytes: Option<u64>,

        /// Enable per-byte delivery tracing
        #[arg(short, long)]
        trace: bool,
    },
    /// Execute a YAML harness script and emit CI artifacts
    Test {
        /// Path to the harness script (YAML)
        #[arg(short, long)]
        script: PathBuf,

        /// Directory for result.json and junit.xml
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write the JUnit report to this path
        #[arg(long)]
        junit: Option<PathBuf>,

        /// Suppress echo handler output on stdout
        #[arg(long)]
        no_echo_stdout: bool,

        /// Enable per-byte delivery tracing
        #[arg(short, long)]
        trace: bool,
    },
}

fn init_tracing(trace: bool) {
    if trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            handler,
            max_bytes,
            trace,
        } => {
            init_tracing(trace);
            run_mode(input, handler, max_bytes)
        }
        Commands::Test {
            script,
            output_dir,
            junit,
            no_echo_stdout,
            trace,
        } => {
            init_tracing(trace);
            test_mode(&script, output_dir, junit, no_echo_stdout)
        }
    }
}

fn pump_with_handler<S: ByteSource>(
    source: S,
    handler: HandlerArg,
    max_bytes: Option<u64>,
) -> PumpResult<PumpStats> {
    match handler {
        HandlerArg::Echo => {
            let mut pump = Pump::new(source, EchoHandler::new(std::io::stdout()));
            if let Some(limit) = max_bytes {
                pump = pump.with_byte_limit(limit);
            }
            pump.run()
        }
        HandlerArg::Null => {
            let mut pump = Pump::new(source, NullHandler);
            if let Some(limit) = max_bytes {
                pump = pump.with_byte_limit(limit);
            }
            pump.run()
        }
    }
}

fn run_mode(
    input: Option<PathBuf>,
    handler: HandlerArg,
    max_bytes: Option<u64>,
) -> anyhow::Result<()> {
    info!("Starting ByteRig harness");

    let result = match input {
        Some(path) => {
            info!("Reading stimulus file: {:?}", path);
            let source = file_source(&path)
                .with_context(|| format!("Failed to open stimulus file at {:?}", path))?;
            pump_with_handler(source, handler, max_bytes)
        }
        None => {
            info!("Reading standard input");
            pump_with_handler(stdin_source(), handler, max_bytes)
        }
    };

    // The original harness contract: a mid-stream read failure terminates
    // the same way as end-of-stream, with a clean exit.
    match result {
        Ok(stats) => info!(
            "Pump stopped ({:?}) after {} byte(s)",
            stats.stop, stats.bytes_delivered
        ),
        Err(e) => warn!("Input read failed, terminating: {}", e),
    }

    Ok(())
}

fn test_mode(
    script_path: &Path,
    output_dir: Option<PathBuf>,
    junit: Option<PathBuf>,
    no_echo_stdout: bool,
) -> anyhow::Result<()> {
    let script = match HarnessScript::from_file(script_path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    // Stimulus paths resolve relative to the script location.
    let stimulus_path = script_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&script.inputs.stimulus);

    let stimulus_hash = match report::sha256_file(&stimulus_path) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    info!("Running harness script: {:?}", script_path);
    info!("Stimulus: {:?}", stimulus_path);

    let source = match file_source(&stimulus_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Configuration error: failed to open {:?}: {}", stimulus_path, e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let metrics = Arc::new(ThroughputMetrics::new());
    let mut pump = Pump::new(source, RecordingHandler::new());
    if let Some(limit) = script.limits.max_bytes {
        pump = pump.with_byte_limit(limit);
    }
    pump.add_observer(metrics.clone());

    let outcome = pump.run();
    let (bytes_delivered, stop_reason) = match &outcome {
        Ok(stats) => (
            stats.bytes_delivered,
            match stats.stop {
                StopCause::EndOfStream => StopReason::EndOfStream,
                StopCause::ByteLimit => StopReason::MaxBytes,
            },
        ),
        Err(PumpError::Read { delivered, source }) => {
            warn!("Stimulus read failed: {}", source);
            (*delivered, StopReason::ReadError)
        }
    };

    let delivered_bytes = pump.into_handler().into_bytes();
    let echoed: &[u8] = if script.handler == HandlerKind::Echo {
        &delivered_bytes
    } else {
        &[]
    };

    if script.handler == HandlerKind::Echo && !no_echo_stdout {
        let mut stdout = std::io::stdout();
        stdout.write_all(echoed)?;
        stdout.flush()?;
    }

    let failures = evaluate_assertions(&script.assertions, echoed, stop_reason, bytes_delivered);

    let run_report = report::RunReport {
        status: if failures.is_empty() { "pass" } else { "fail" }.to_string(),
        stop_reason,
        bytes_delivered,
        duration_ms: metrics.elapsed().as_millis() as u64,
        stimulus_hash,
        config: report::ReportConfig {
            stimulus: stimulus_path.to_string_lossy().into_owned(),
            handler: match script.handler {
                HandlerKind::Echo => "echo".to_string(),
                HandlerKind::Null => "null".to_string(),
            },
            max_bytes: script.limits.max_bytes,
        },
        failures,
    };

    if let Some(dir) = &output_dir {
        let result_path = report::write_result_json(dir, &run_report)?;
        info!("Wrote {:?}", result_path);
        let junit_path = dir.join("junit.xml");
        report::write_junit_xml(&junit_path, &run_report)?;
        info!("Wrote {:?}", junit_path);
    }
    if let Some(path) = &junit {
        report::write_junit_xml(path, &run_report)?;
        info!("Wrote {:?}", path);
    }

    info!(
        "Harness finished: {} ({:?}, {} byte(s) delivered)",
        run_report.status, stop_reason, bytes_delivered
    );
    for failure in &run_report.failures {
        eprintln!("Assertion failed: {}", failure);
    }

    if !run_report.passed() {
        std::process::exit(EXIT_ASSERT_FAIL);
    }

    Ok(())
}

fn evaluate_assertions(
    assertions: &[HarnessAssertion],
    echoed: &[u8],
    stop_reason: StopReason,
    bytes_delivered: u64,
) -> Vec<String> {
    let mut failures = Vec::new();

    for assertion in assertions {
        match assertion {
            HarnessAssertion::EchoContains(a) => {
                let text = String::from_utf8_lossy(echoed);
                if !text.contains(&a.echo_contains) {
                    failures.push(format!(
                        "echo output does not contain '{}'",
                        a.echo_contains
                    ));
                }
            }
            HarnessAssertion::ExpectedStopReason(a) => {
                if a.expected_stop_reason != stop_reason {
                    failures.push(format!(
                        "expected stop reason {:?}, got {:?}",
                        a.expected_stop_reason, stop_reason
                    ));
                }
            }
            HarnessAssertion::ExpectedByteCount(a) => {
                if a.expected_byte_count != bytes_delivered {
                    failures.push(format!(
                        "expected {} byte(s) delivered, got {}",
                        a.expected_byte_count, bytes_delivered
                    ));
                }
            }
        }
    }

    failures
}
