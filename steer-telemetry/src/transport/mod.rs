//! Bus transports (local IPC, TCP)
//!
//! The default address selects the local transport, a Unix domain socket.
//! Any other address selects the network transport. Both are plain byte
//! streams carrying length-prefixed frames, see [`framing`].

use crate::config::{BusConfig, DEFAULT_ADDR};
use crate::types::{Result, TelemetryError};
use std::fmt;
use std::io::Read;
use std::net::{Ipv6Addr, TcpStream};
use std::path::PathBuf;

pub mod framing;

pub use framing::{write_frame, Fill, FrameReader};

/// Boxed stream handed to the frame reader
pub type BusStream = Box<dyn Read + Send>;

/// Where the bus publisher can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Local Unix domain socket
    Ipc(PathBuf),
    /// Remote publisher, `host:port`
    Tcp(String),
}

impl Endpoint {
    /// Pick the transport for an address
    pub fn resolve(addr: &str, config: &BusConfig) -> Result<Self> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(TelemetryError::UnsupportedEndpoint(
                "empty address".to_string(),
            ));
        }

        if addr == DEFAULT_ADDR {
            Ok(Endpoint::Ipc(config.ipc_path.clone()))
        } else if addr.parse::<Ipv6Addr>().is_ok() {
            // Bracket IPv6 literals so the port can be appended
            Ok(Endpoint::Tcp(format!("[{}]:{}", addr, config.port)))
        } else {
            Ok(Endpoint::Tcp(format!("{}:{}", addr, config.port)))
        }
    }

    /// Open the stream with the configured read timeout
    pub fn connect(&self, config: &BusConfig) -> Result<BusStream> {
        log::info!("Connecting to telemetry bus at {}", self);

        let stream: BusStream = match self {
            Endpoint::Ipc(path) => connect_ipc(path, config)?,
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str())?;
                stream.set_read_timeout(Some(config.poll_interval()))?;
                stream.set_nodelay(true)?;
                Box::new(stream)
            }
        };

        log::info!("Connected to {}", self);
        Ok(stream)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Ipc(path) => write!(f, "ipc://{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

#[cfg(unix)]
fn connect_ipc(path: &std::path::Path, config: &BusConfig) -> Result<BusStream> {
    use std::os::unix::net::UnixStream;

    let stream = UnixStream::connect(path)?;
    stream.set_read_timeout(Some(config.poll_interval()))?;
    Ok(Box::new(stream))
}

#[cfg(not(unix))]
fn connect_ipc(_path: &std::path::Path, config: &BusConfig) -> Result<BusStream> {
    log::debug!("No Unix sockets on this target, using loopback TCP");
    let stream = TcpStream::connect((DEFAULT_ADDR, config.port))?;
    stream.set_read_timeout(Some(config.poll_interval()))?;
    Ok(Box::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addr_uses_ipc() {
        let config = BusConfig::new().with_ipc_path("/tmp/bus.sock");
        let endpoint = Endpoint::resolve(DEFAULT_ADDR, &config).unwrap();
        assert_eq!(endpoint, Endpoint::Ipc(PathBuf::from("/tmp/bus.sock")));
        assert_eq!(endpoint.to_string(), "ipc:///tmp/bus.sock");
    }

    #[test]
    fn test_other_addr_uses_tcp() {
        let config = BusConfig::new().with_port(9000);
        assert_eq!(
            Endpoint::resolve("192.168.1.20", &config).unwrap(),
            Endpoint::Tcp("192.168.1.20:9000".to_string())
        );
        assert_eq!(
            Endpoint::resolve("fe80::1", &config).unwrap(),
            Endpoint::Tcp("[fe80::1]:9000".to_string())
        );
    }

    #[test]
    fn test_empty_addr_rejected() {
        let config = BusConfig::new();
        assert!(matches!(
            Endpoint::resolve("  ", &config),
            Err(TelemetryError::UnsupportedEndpoint(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_connect_missing_socket_fails() {
        let config = BusConfig::new().with_ipc_path("/nonexistent/dir/bus.sock");
        let endpoint = Endpoint::resolve(DEFAULT_ADDR, &config).unwrap();
        assert!(matches!(
            endpoint.connect(&config),
            Err(TelemetryError::IoError(_))
        ));
    }
}
