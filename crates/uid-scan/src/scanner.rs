//! Async scanner driving discovery over a line link
//!
//! Prefixes are scanned strictly one after another. A prefix that fails is
//! logged and skipped; only a dead link stops the whole scan.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};
use uid_protocol::{AlphabetOrder, VendorPrefix};

use crate::error::ScanError;
use crate::link::LineLink;
use crate::search::{Discovery, ScanReport};

/// Configuration for scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// How long to wait for a reply before treating a probe as unanswered
    pub timeout: Duration,
    /// Symbol order of the walk at each depth
    pub order: AlphabetOrder,
    /// Probe each confirmed UID with itself before accepting it
    pub echo_verify: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(200),
            order: AlphabetOrder::Ascending,
            echo_verify: false,
        }
    }
}

/// UID scanner bound to one bus link
pub struct Scanner<R, W> {
    link: LineLink<R, W>,
    config: ScanConfig,
}

impl<R, W> Scanner<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a scanner with default configuration
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ScanConfig::default())
    }

    /// Create a scanner with custom configuration
    pub fn with_config(reader: R, writer: W, config: ScanConfig) -> Self {
        Self {
            link: LineLink::new(reader, writer, config.timeout),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Discover every UID under one vendor prefix
    pub async fn scan_prefix(&mut self, prefix: &VendorPrefix) -> Result<ScanReport, ScanError> {
        info!("Scanning prefix {}", prefix);
        let mut discovery =
            Discovery::with_options(prefix.clone(), self.config.order, self.config.echo_verify);

        while let Some(action) = discovery.next_action()? {
            let command = action.to_command();
            if action.expects_reply() {
                let reply = self.link.request(&command).await?;
                discovery.observe(reply)?;
            } else {
                self.link.send(&command).await?;
            }
        }

        let report = discovery.finish();
        debug!("Prefix {} stats: {:?}", prefix, report.stats);
        Ok(report)
    }

    /// Scan each prefix in order
    ///
    /// Returns one report per prefix that completed.
    pub async fn scan_all(&mut self, prefixes: &[VendorPrefix]) -> Result<Vec<ScanReport>, ScanError> {
        let mut reports = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            match self.scan_prefix(prefix).await {
                Ok(report) => reports.push(report),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Scan of prefix {} failed: {}", prefix, e),
            }
        }
        Ok(reports)
    }

    /// Release the underlying streams
    pub fn into_inner(self) -> (R, W) {
        self.link.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(200));
        assert_eq!(config.order, AlphabetOrder::Ascending);
        assert!(!config.echo_verify);
    }

    #[tokio::test]
    async fn test_empty_bus_sends_prefix_then_reset() {
        use tokio::io::AsyncBufReadExt;

        let (bus_side, device_side) = tokio::io::duplex(256);
        let (rd, wr) = tokio::io::split(bus_side);
        let config = ScanConfig {
            timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let mut scanner = Scanner::with_config(rd, wr, config);

        let report = scanner.scan_prefix(&"AB".parse().unwrap()).await.unwrap();
        assert!(report.found.is_empty());
        assert_eq!(report.stats.probes, 1);

        drop(scanner);
        let mut lines = tokio::io::BufReader::new(device_side).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("AB"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("RESET_ALL"));
    }
}
