use std::net::SocketAddr;

/// Runtime configuration.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 0.0.0.0 | Bind address |
/// | HTTP_PORT | 3000 | Bind port; `PORT` is read when this is unset or invalid |
/// | ORDER_MAILBOX_SIZE | 64 | Pending requests buffered for the order store |
/// | LOG_LEVEL | info | Filter used when `RUST_LOG` is unset |
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub mailbox_size: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".into(),
            http_port: 3000,
            mailbox_size: 64,
            log_level: "info".into(),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            http_host: lookup("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .or_else(|| lookup("PORT").and_then(|p| p.parse().ok()))
                .unwrap_or(defaults.http_port),
            mailbox_size: lookup("ORDER_MAILBOX_SIZE")
                .and_then(|p| p.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.mailbox_size),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.http_host, self.http_port).parse()
    }
}
