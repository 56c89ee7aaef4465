use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::{
    db::DEFAULT_MAX_CONNECTIONS,
    error::{AppError, AppResult},
};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` is not fatal: the server still starts and the connection
    /// attempt logs the problem.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let port = match var("PORT") {
            Some(port) => port.parse().map_err(|_| {
                AppError::Config(format!("PORT must be a port number, got '{}'", port))
            })?,
            None => defaults.port,
        };
        let host = match var("HOST") {
            Some(host) => host.parse().map_err(|_| {
                AppError::Config(format!("HOST must be an IP address, got '{}'", host))
            })?,
            None => defaults.host,
        };
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(max) => max.parse().map_err(|_| {
                AppError::Config(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{}'",
                    max
                ))
            })?,
            None => defaults.max_connections,
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            max_connections,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
