//! Service configuration management

use anyhow::{Context, Result};
use gavel::{EngineCfg, FeeSchedule, PriceScale};
use order_gateway::GatewayConfig;
use persistence::PersistenceConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Matching core parameters
    pub engine: EngineSettings,

    /// The three listen endpoints
    pub gateway: GatewayConfig,

    /// Snapshot location
    pub persistence: PersistenceConfig,

    /// Service-level settings
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Instrument and fee parameters for the matching core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Instrument identifier carried on every frame
    pub symbol: String,

    /// Smallest price increment; book keys are multiples of this
    pub tick_size: Decimal,

    /// Smallest quantity increment
    pub lot_size: Decimal,

    /// Fee rate charged to the resting side
    pub maker_fee_rate: Decimal,

    /// Fee rate charged to the aggressing side
    pub taker_fee_rate: Decimal,

    /// Aggregated price levels per side on the market-data feed
    pub depth: usize,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            symbol: "BTC-USDT".to_string(),
            tick_size: Decimal::new(1, 2),      // 0.01
            lot_size: Decimal::new(1, 5),       // 0.00001
            maker_fee_rate: Decimal::new(10, 4), // 0.10%
            taker_fee_rate: Decimal::new(20, 4), // 0.20%
            depth: 10,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { shutdown_timeout_secs: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl EngineSettings {
    pub fn engine_cfg(&self) -> EngineCfg {
        EngineCfg {
            symbol: self.symbol.clone(),
            scale: PriceScale::new(self.tick_size, self.lot_size),
            fees: FeeSchedule { maker_rate: self.maker_fee_rate, taker_rate: self.taker_fee_rate },
            depth: self.depth,
        }
    }
}

/// Load configuration from an optional TOML file plus environment overrides
pub fn load_config() -> Result<ServiceConfig> {
    let mut config = match std::env::var("GAVEL_CONFIG") {
        Ok(path) => load_from_file(PathBuf::from(path))?,
        Err(_) => ServiceConfig::default(),
    };

    load_from_env(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

fn load_from_file(path: PathBuf) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config file {path:?}"))
}

fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    if let Ok(level) = std::env::var("GAVEL_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(format) = std::env::var("GAVEL_LOG_FORMAT") {
        config.logging.format = format;
    }
    if let Ok(symbol) = std::env::var("GAVEL_SYMBOL") {
        config.engine.symbol = symbol;
    }
    if let Ok(path) = std::env::var("GAVEL_SNAPSHOT_PATH") {
        config.persistence.snapshot_path = PathBuf::from(path);
    }
    if let Ok(addr) = std::env::var("GAVEL_ORDERS_ADDR") {
        config.gateway.orders_addr =
            addr.parse().context("GAVEL_ORDERS_ADDR is not a socket address")?;
    }
    if let Ok(addr) = std::env::var("GAVEL_MARKET_DATA_ADDR") {
        config.gateway.market_data_addr =
            addr.parse().context("GAVEL_MARKET_DATA_ADDR is not a socket address")?;
    }
    if let Ok(addr) = std::env::var("GAVEL_TRADES_ADDR") {
        config.gateway.trades_addr =
            addr.parse().context("GAVEL_TRADES_ADDR is not a socket address")?;
    }
    Ok(())
}

fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.engine.engine_cfg().validate().context("invalid engine configuration")?;

    if !config.gateway.addrs_are_distinct() {
        anyhow::bail!("the three gateway endpoints must be distinct");
    }

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!("invalid log level: {other}"),
    }
    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        other => anyhow::bail!("invalid log format: {other}"),
    }

    Ok(())
}
