//! Shared plumbing for the command-line tools

pub mod port;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter covering all workspace crates
pub const DEFAULT_FILTER: &str = "uid_tools=info,uid_protocol=info,uid_sim=info,uid_scan=info";

/// Initialize logging on stderr; stdout carries the bus
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse arguments, exiting with status 1 on usage errors
pub fn parse_args<T: Parser>() -> T {
    T::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    })
}
