use anyhow::Result;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;

pub type Number = f32;

pub const EPSILON: f32 = 1e-6;

/// Customer names the answer layer recognizes when none are configured.
pub const DEFAULT_CUSTOMERS: &[&str] = &["Amit", "Riya", "Karan"];

const DEFAULT_PATH: &str = "transactions.json";

#[derive(Deserialize)]
pub struct RagtailConfig {
    pub path: Option<String>,
    pub top_k: Option<usize>,
    pub customers: Option<Vec<String>>,
}

impl RagtailConfig {
    pub fn try_from(config: &Config) -> Result<Self, ConfigError> {
        Ok(RagtailConfig {
            path: config.get("path").ok(),
            top_k: config.get("top_k").ok(),
            customers: config.get("customers").ok(),
        })
    }
}

pub struct State {
    pub path: String,
    pub top_k: usize,
    pub customers: Vec<String>,
}

impl State {
    pub fn new() -> Result<Self> {
        let mut config = Config::default();
        #[allow(deprecated)]
        {
            config.merge(ConfigFile::with_name("ragtail_config").required(false))?;
            config.merge(Environment::with_prefix("RAGTAIL"))?;
        }

        let ragtail_config = RagtailConfig::try_from(&config)?;

        let path = ragtail_config
            .path
            .or_else(|| env::var("RAGTAIL_PATH").ok())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let top_k = ragtail_config
            .top_k
            .or_else(|| env::var("RAGTAIL_TOP_K").ok().and_then(|s| s.parse().ok()))
            .unwrap_or(3);

        let customers = ragtail_config
            .customers
            .or_else(|| env::var("RAGTAIL_CUSTOMERS").ok().map(|s| parse_customer_list(&s)))
            .unwrap_or_else(|| DEFAULT_CUSTOMERS.iter().map(|c| c.to_string()).collect());

        if top_k == 0 {
            anyhow::bail!("RAGTAIL_TOP_K must be positive.");
        }

        Ok(Self {
            path,
            top_k,
            customers,
        })
    }

    pub fn print_config(&self) {
        println!("path={}", self.path);
        println!("top_k={}", self.top_k);
        println!("customers={}", self.customers.join(","));
    }
}

fn parse_customer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn verbose_print(message: &str) {
    if env::var("RAGTAIL_VERBOSE").unwrap_or_else(|_| "false".to_string()) == "true" {
        eprintln!("{}", message);
    }
}
