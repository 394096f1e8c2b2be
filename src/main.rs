//! envshim entry point.
//!
//! Started under any name other than `envshim` (usually through a symlink),
//! the binary wraps that command. Started as `envshim`, it runs the
//! management CLI.

use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use envshim::cli::{Cli, CommandDispatcher};
use envshim::config::{debug_requested, RuntimeEnv};
use envshim::runner::{detect_mode, run_wrapper, Mode, MANAGEMENT_NAME};
use envshim::ui::{TerminalUI, UserInterface};
use envshim::ShimError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Output goes to stderr; stdout belongs to the wrapped tool. Log level is
/// controlled by:
/// 1. `--debug` or `<PREFIX>_DEBUG` sets level to DEBUG
/// 2. `ENVSHIM_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("envshim=debug")
    } else {
        EnvFilter::try_from_env("ENVSHIM_LOG").unwrap_or_else(|_| EnvFilter::new("envshim=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Print a fatal error as one line on stderr.
fn report_error(err: &ShimError) {
    eprintln!(
        "{} {}",
        style(format!("{MANAGEMENT_NAME}:")).for_stderr().red().bold(),
        err
    );
}

fn wrapper_main(command: &str, args: Vec<OsString>) -> ExitCode {
    let env = RuntimeEnv::capture();
    init_tracing(debug_requested(command, &env));
    tracing::debug!("Wrapping {} with {} argument(s)", command, args.len());

    match run_wrapper(command, args, env) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn management_main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("envshim starting with args: {:?}", cli);

    let env = RuntimeEnv::capture();

    // Handle --no-color
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let mut ui = TerminalUI::new();
    let dispatcher = CommandDispatcher::new(env);

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code),
        Err(e) => {
            ui.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn main() -> ExitCode {
    let mut argv = std::env::args_os();
    let argv0 = argv.next();

    match detect_mode(argv0.as_deref()) {
        Mode::Wrapper { command } => wrapper_main(&command, argv.collect()),
        Mode::Management => management_main(),
    }
}
