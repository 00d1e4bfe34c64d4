use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

/// Transport used to reach the upstream resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProtocol {
    Udp,
    Tcp,
    Tls,
    Https,
}

impl UpstreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::Tls => "tls",
            Self::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Udp | Self::Tcp => 53,
            Self::Tls => 853,
            Self::Https => 443,
        }
    }
}

impl FromStr for UpstreamProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            "tls" => Ok(Self::Tls),
            "https" => Ok(Self::Https),
            _ => Err(format!(
                "Invalid upstream protocol '{}'. Expected one of: udp, tcp, tls, https",
                s
            )),
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an upstream server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    /// Parses `host`, `host:port`, `ip`, `ip:port` or `[v6]:port`, falling
    /// back to `default_port` when none is given.
    pub fn parse(s: &str, default_port: u16) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Upstream address is empty".to_string());
        }
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(UpstreamAddr::Resolved(addr));
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let ip = inner
                .parse::<IpAddr>()
                .map_err(|_| format!("Invalid address '{}'", s))?;
            return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port_str)) => {
                let port = port_str
                    .parse::<u16>()
                    .map_err(|e| format!("Invalid port in address '{}': {}", s, e))?;
                (host, port)
            }
            None => (s, default_port),
        };

        if !is_valid_hostname(host) {
            return Err(format!("Invalid address '{}'", s));
        }

        Ok(UpstreamAddr::Unresolved {
            hostname: host.into(),
            port,
        })
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            UpstreamAddr::Resolved(addr) => Some(*addr),
            UpstreamAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }

    /// Host part as written in configuration (IP literal or hostname).
    pub fn host(&self) -> String {
        match self {
            UpstreamAddr::Resolved(addr) => addr.ip().to_string(),
            UpstreamAddr::Unresolved { hostname, .. } => hostname.to_string(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, UpstreamAddr::Unresolved { .. })
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

/// A concrete upstream endpoint: protocol variant plus everything needed to
/// reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp {
        addr: UpstreamAddr,
    },
    Tcp {
        addr: UpstreamAddr,
    },
    Tls {
        addr: UpstreamAddr,
        hostname: Arc<str>,
    },
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
    },
}

impl DnsProtocol {
    /// Builds an endpoint from the configured server string and protocol.
    ///
    /// `tls_hostname` overrides the name presented for SNI and certificate
    /// verification on TLS upstreams.
    pub fn new(
        protocol: UpstreamProtocol,
        server: &str,
        tls_hostname: Option<&str>,
    ) -> Result<Self, String> {
        let server = server.trim();
        match protocol {
            UpstreamProtocol::Udp => Ok(DnsProtocol::Udp {
                addr: UpstreamAddr::parse(server, protocol.default_port())?,
            }),
            UpstreamProtocol::Tcp => Ok(DnsProtocol::Tcp {
                addr: UpstreamAddr::parse(server, protocol.default_port())?,
            }),
            UpstreamProtocol::Tls => {
                let addr = UpstreamAddr::parse(server, protocol.default_port())?;
                let hostname: Arc<str> = match tls_hostname.map(str::trim) {
                    Some(name) if !name.is_empty() => name.into(),
                    _ => addr.host().into(),
                };
                Ok(DnsProtocol::Tls { addr, hostname })
            }
            UpstreamProtocol::Https => parse_https(server),
        }
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        match self {
            DnsProtocol::Udp { .. } => UpstreamProtocol::Udp,
            DnsProtocol::Tcp { .. } => UpstreamProtocol::Tcp,
            DnsProtocol::Tls { .. } => UpstreamProtocol::Tls,
            DnsProtocol::Https { .. } => UpstreamProtocol::Https,
        }
    }

    pub fn addr(&self) -> Option<&UpstreamAddr> {
        match self {
            DnsProtocol::Udp { addr } | DnsProtocol::Tcp { addr } | DnsProtocol::Tls { addr, .. } => {
                Some(addr)
            }
            DnsProtocol::Https { .. } => None,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.addr().and_then(UpstreamAddr::socket_addr)
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            DnsProtocol::Tls { hostname, .. } | DnsProtocol::Https { hostname, .. } => {
                Some(hostname)
            }
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DnsProtocol::Https { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "UDP",
            DnsProtocol::Tcp { .. } => "TCP",
            DnsProtocol::Tls { .. } => "TLS",
            DnsProtocol::Https { .. } => "HTTPS",
        }
    }
}

fn parse_https(server: &str) -> Result<DnsProtocol, String> {
    let full_url = server.starts_with("https://") || server.starts_with("http://");

    if full_url {
        let authority = server
            .split_once("://")
            .map(|(_, rest)| rest.split(['/', '?']).next().unwrap_or(rest))
            .filter(|authority| !authority.is_empty())
            .ok_or_else(|| format!("Invalid HTTPS URL: {}", server))?;
        let addr = UpstreamAddr::parse(authority, UpstreamProtocol::Https.default_port())
            .map_err(|_| format!("Invalid HTTPS URL: {}", server))?;
        return Ok(DnsProtocol::Https {
            url: server.into(),
            hostname: addr.host().into(),
        });
    }

    let addr = UpstreamAddr::parse(server, UpstreamProtocol::Https.default_port())?;
    let host = addr.host();
    let host_part = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.clone()
    };
    let url = if addr.port() == UpstreamProtocol::Https.default_port() {
        format!("https://{}/dns-query", host_part)
    } else {
        format!("https://{}:{}/dns-query", host_part, addr.port())
    };

    Ok(DnsProtocol::Https {
        url: url.into(),
        hostname: host.into(),
    })
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsProtocol::Udp { addr } => write!(f, "udp://{}", addr),
            DnsProtocol::Tcp { addr } => write!(f, "tcp://{}", addr),
            DnsProtocol::Tls { addr, hostname } => {
                write!(f, "tls://{}:{}", hostname, addr.port())
            }
            DnsProtocol::Https { url, .. } => write!(f, "{}", url),
        }
    }
}
