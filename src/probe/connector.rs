use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use super::{ProbeError, ProbeOptions};

/// Opens the transport to an MX host. The stream is closed when dropped.
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self, host: &str, options: &ProbeOptions) -> Result<Self::Stream, ProbeError>;
}

impl<T: Connector + ?Sized> Connector for &T {
    type Stream = T::Stream;

    fn connect(&self, host: &str, options: &ProbeOptions) -> Result<Self::Stream, ProbeError> {
        (**self).connect(host, options)
    }
}

/// Plain TCP on `host:port`, every address of the host tried in turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, options: &ProbeOptions) -> Result<TcpStream, ProbeError> {
        let addrs = resolve_socket_addrs(host, options.port).map_err(|source| {
            ProbeError::Connect {
                host: host.to_string(),
                source,
            }
        })?;
        if addrs.is_empty() {
            return Err(ProbeError::NoAddress {
                host: host.to_string(),
            });
        }

        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, options.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(options.command_timeout))
                        .map_err(ProbeError::io)?;
                    stream
                        .set_write_timeout(Some(options.command_timeout))
                        .map_err(ProbeError::io)?;
                    tracing::debug!(host, peer = %addr, "connected");
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(ProbeError::Connect {
            host: host.to_string(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        })
    }
}

fn resolve_socket_addrs(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    (host, port).to_socket_addrs().map(|iter| iter.collect())
}
