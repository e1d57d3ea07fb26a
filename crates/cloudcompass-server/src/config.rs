use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// CloudCompass API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "cloudcompass", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CLOUDCOMPASS_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short, env = "CLOUDCOMPASS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Simulated processing delay before /api/generate answers, in milliseconds
    #[arg(long, env = "CLOUDCOMPASS_GENERATE_DELAY_MS", default_value_t = 1500)]
    pub generate_delay_ms: u64,

    /// AI settings file (defaults to ~/.cloudcompass/settings.json)
    #[arg(long, env = "CLOUDCOMPASS_SETTINGS")]
    pub settings: Option<PathBuf>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn generate_delay(&self) -> Duration {
        Duration::from_millis(self.generate_delay_ms)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(cloudcompass_core::settings_path)
    }
}
