use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a number")?,
            Err(_) => 3000,
        };
        let database_url =
            env::var("TASKFLOW_DB").unwrap_or_else(|_| "sqlite:taskflow.db".to_string());

        Ok(Self {
            host,
            port,
            database_url,
        })
    }
}
