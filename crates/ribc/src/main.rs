//! `ribc` entrypoint: reads an ASCII or binary RIB stream from a file (or
//! stdin) and drives it through the lexer, parser, and dispatcher against a
//! recording backend, reporting diagnostics as it goes.
//!
//! The real renderer backend is an explicit Non-goal (spec §1): this binary
//! exists to exercise and validate the core end-to-end, the way a RIB
//! linter or a test harness for a real renderer's front-end would.

use anyhow::{Context as _, Result};
use clap::Parser as ClapParser;
use rib_backend::RecordingBackend;
use rib_config::{load_from, ErrorHandlerKind, RenderConfig};
use rib_dispatch::{dispatch, Context};
use rib_errors::{AbortOnSevereReporter, ErrorReporter, IgnoreReporter, PrintReporter};
use rib_model::Value;
use rib_parser::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(ClapParser, Debug)]
#[command(name = "ribc", version, about = "RenderMan Interface Bytestream processor")]
struct Args {
    /// RIB file to process. Omit to read from stdin.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `rib.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Error-handler selection (spec §5, §7); an `ErrorHandler` request
    /// inside the stream overrides this for diagnostics reported after it
    /// by the RIB-visible `Options::error_handler` bookkeeping, but this
    /// process's abort/print/ignore behavior is fixed for the run.
    #[arg(long = "error-handler", default_value = "print")]
    pub error_handler: String,
    /// Log every backend call made, in addition to diagnostics.
    #[arg(long)]
    pub trace_calls: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = std::path::Path::new(".");
    let log_path = log_dir.join("ribc.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "ribc.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Turn a structured (`##`) comment into the `ArchiveRecord` dispatch it
/// represents (spec §6.1, §4.5.2): plain `#` line comments are a lexical
/// nicety only and are not propagated to the backend.
fn archive_record_args(comment: &rib_lexer::Comment) -> Vec<Value> {
    vec![
        Value::scalar_string("structure".to_string(), comment.line),
        Value::scalar_string(comment.text.clone(), comment.line),
    ]
}

/// Drives one RIB byte stream end to end: lex -> parse -> dispatch, with
/// deferred structured comments re-dispatched as `ArchiveRecord` right
/// after the request whose tokens they were interleaved with (spec §5
/// ordering guarantee). Returns the recording backend so the caller can
/// inspect or trace what was emitted.
fn process(
    bytes: &[u8],
    source_name: &str,
    config: RenderConfig,
    reporter: &mut dyn ErrorReporter,
) -> Result<RecordingBackend> {
    let mut parser = Parser::new(bytes, source_name);
    let mut ctx = Context::new(config, source_name);
    let mut backend = RecordingBackend::new();

    while let Some(request) = parser.next_request(reporter, Some(&ctx.config.variables)) {
        dispatch(&mut ctx, &mut backend, &request.name, request.args, reporter, request.line)
            .with_context(|| format!("{source_name}:{}: dispatching \"{}\"", request.line, request.name))?;
        for comment in &request.comments {
            if !comment.structured {
                continue;
            }
            dispatch(&mut ctx, &mut backend, "ArchiveRecord", archive_record_args(comment), reporter, comment.line)
                .with_context(|| format!("{source_name}:{}: dispatching deferred ArchiveRecord", comment.line))?;
        }
    }

    Ok(backend)
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    info!(target: "runtime", "startup");

    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from("rib.toml"));
    let loaded = load_from(&config_path).context("loading configuration")?;
    let mut config = RenderConfig::from_loaded(&loaded);

    let handler_kind = ErrorHandlerKind::parse(&args.error_handler).unwrap_or_default();
    config.options.error_handler = handler_kind;

    let (bytes, source_name) = match &args.path {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            (bytes, path.to_string_lossy().to_string())
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
            (bytes, "<stdin>".to_string())
        }
    };

    info!(target: "runtime.startup", source = %source_name, handler = %args.error_handler, "bootstrap_complete");

    // `AbortOnSevereReporter` unwinds via panic on a `Severe` diagnostic
    // (spec §6.4 "the severe case must not return to the caller"); the
    // panic hook above logs it before `catch_unwind` turns it into a clean
    // process exit rather than an ugly backtrace.
    let backend = match handler_kind {
        ErrorHandlerKind::Abort => {
            let mut reporter = AbortOnSevereReporter;
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| process(&bytes, &source_name, config, &mut reporter)));
            match result {
                Ok(inner) => inner?,
                Err(_) => anyhow::bail!("{source_name}: aborted on a severe RI error"),
            }
        }
        ErrorHandlerKind::Print => {
            let mut reporter = PrintReporter;
            process(&bytes, &source_name, config, &mut reporter)?
        }
        ErrorHandlerKind::Ignore => {
            let mut reporter = IgnoreReporter;
            process(&bytes, &source_name, config, &mut reporter)?
        }
    };

    if args.trace_calls {
        for call in &backend.calls {
            info!(target: "ribc.trace", name = %call.name, scalars = ?call.scalars, params = ?call.param_names, "backend_call");
        }
    }
    info!(target: "runtime", calls = backend.calls.len(), "done");

    Ok(())
}
