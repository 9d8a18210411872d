//! Line-oriented links to an instrument.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio_vxi11::DeviceClient;
use tracing::debug;

const MAX_READ: u32 = 4096;

/// A bidirectional text channel carrying one command or reply per line.
///
/// Implementations own addressing and connection setup. The line terminator
/// is added by `send_line` and stripped by `read_line`.
#[async_trait]
pub trait Transport: Send {
    async fn send_line(&mut self, line: &str) -> io::Result<()>;

    async fn read_line(&mut self) -> io::Result<String>;

    /// Release the link. Called once when the instrument closes.
    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where to find a LAN-connected supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    /// VXI-11 logical device, `inst0` on Aim-TTi LAN interfaces.
    pub resource: String,
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            resource: "inst0".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// VXI-11 (LXI) transport.
pub struct Vxi11Transport {
    inner: DeviceClient,
}

impl Vxi11Transport {
    pub async fn connect(config: &ConnectionConfig) -> io::Result<Self> {
        debug!(
            "VXI-11 connect -> {} {} ({:?})",
            config.host, config.resource, config.timeout
        );
        let inner =
            DeviceClient::connect_with_timeout(&config.host, &config.resource, config.timeout)
                .await
                .map_err(io::Error::other)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Transport for Vxi11Transport {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut framed = String::with_capacity(line.len() + 1);
        framed.push_str(line);
        framed.push('\n');
        self.inner
            .write(framed.as_bytes())
            .await
            .map_err(io::Error::other)?;
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<String> {
        let resp = self.inner.read(MAX_READ).await.map_err(io::Error::other)?;
        let raw = String::from_utf8(resp).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(trim_reply(&raw).to_string())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.inner.close().await.map_err(io::Error::other)?;
        Ok(())
    }
}

/// Strip NUL padding and the line terminator from a raw reply.
pub(crate) fn trim_reply(raw: &str) -> &str {
    raw.trim_matches(char::from(0)).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ConnectionConfig::new("192.168.0.10");
        assert_eq!(config.host, "192.168.0.10");
        assert_eq!(config.resource, "inst0");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let config = config
            .with_resource("gpib0,5")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.resource, "gpib0,5");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn replies_lose_padding_and_terminators() {
        assert_eq!(trim_reply("V1 10.000\r\n"), "V1 10.000");
        assert_eq!(trim_reply("1\n\0\0"), "1");
        assert_eq!(trim_reply(""), "");
    }
}
