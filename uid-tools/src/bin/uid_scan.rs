//! UID scanner: probes on stdout, replies on stdin, findings on stderr
//!
//! With `--port` the bus is a serial adapter instead of stdin/stdout.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;
use uid_protocol::{AlphabetOrder, VendorPrefix};
use uid_scan::{ScanConfig, ScanReport, Scanner};
use uid_tools::port;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// `0` to `_`
    Asc,
    /// `_` to `0`
    Desc,
}

impl From<OrderArg> for AlphabetOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => AlphabetOrder::Ascending,
            OrderArg::Desc => AlphabetOrder::Descending,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "uid-scan", version, about = "Discover device UIDs on a shared bus")]
struct Cli {
    /// 2-symbol vendor prefixes to scan, in order
    #[arg(required_unless_present = "list_ports")]
    prefixes: Vec<VendorPrefix>,

    /// Reply window per probe in milliseconds
    #[arg(long, default_value_t = 200)]
    timeout_ms: u64,

    /// Symbol order of the search walk
    #[arg(long, value_enum, default_value_t = OrderArg::Asc)]
    order: OrderArg,

    /// Probe every confirmed UID with itself before accepting it
    #[arg(long)]
    echo_verify: bool,

    /// Print one JSON report per prefix on stderr
    #[arg(long)]
    json: bool,

    /// Serial port carrying the bus instead of stdin/stdout
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for --port
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

async fn scan<R, W>(
    reader: R,
    writer: W,
    prefixes: &[VendorPrefix],
    config: ScanConfig,
) -> anyhow::Result<Vec<ScanReport>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut scanner = Scanner::with_config(reader, writer, config);
    Ok(scanner.scan_all(prefixes).await?)
}

fn print_report(report: &ScanReport, json: bool) -> anyhow::Result<()> {
    if json {
        eprintln!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    eprintln!(
        "{}: {} UID(s), {} probes, {} ms",
        report.prefix,
        report.found.len(),
        report.stats.probes,
        report.elapsed_ms
    );
    for uid in &report.found {
        eprintln!("  {}", uid);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: Cli = uid_tools::parse_args();
    uid_tools::init_tracing();

    if cli.list_ports {
        for p in port::list_ports().context("enumerating serial ports")? {
            println!("{}", p.describe());
        }
        return Ok(());
    }

    let config = ScanConfig {
        timeout: Duration::from_millis(cli.timeout_ms),
        order: cli.order.into(),
        echo_verify: cli.echo_verify,
    };
    info!(
        "Scanning {} prefix(es), {} ms reply window",
        cli.prefixes.len(),
        cli.timeout_ms
    );

    let reports = match &cli.port {
        Some(name) => {
            let stream = port::open_port(name, cli.baud)
                .await
                .with_context(|| format!("opening {}", name))?;
            let (reader, writer) = tokio::io::split(stream);
            scan(reader, writer, &cli.prefixes, config).await?
        }
        None => scan(tokio::io::stdin(), tokio::io::stdout(), &cli.prefixes, config).await?,
    };

    for report in &reports {
        print_report(report, cli.json)?;
    }
    Ok(())
}
