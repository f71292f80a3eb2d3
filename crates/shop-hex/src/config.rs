use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_ORDERS_URL: &str = "http://orders-service:8082";
pub const DEFAULT_PAYMENTS_URL: &str = "http://payments-service:8083";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Users,
    Orders,
    Payments,
    Delivery,
}

impl ServiceKind {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Users => 8081,
            ServiceKind::Orders => 8082,
            ServiceKind::Payments => 8083,
            ServiceKind::Delivery => 8084,
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            ServiceKind::Users => "users",
            ServiceKind::Orders => "orders",
            ServiceKind::Payments => "payments",
            ServiceKind::Delivery => "deliveries",
        }
    }
}

impl FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(ServiceKind::Users),
            "orders" | "order" => Ok(ServiceKind::Orders),
            "payments" | "payment" => Ok(ServiceKind::Payments),
            "delivery" | "deliveries" => Ok(ServiceKind::Delivery),
            other => anyhow::bail!("unknown service {other:?}"),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-service", self.collection())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceKind,
    pub server_port: String,
    /// `None` keeps records in memory only.
    pub data_path: Option<PathBuf>,
    pub orders_service_url: String,
    pub payments_service_url: String,
    pub delivery_service_url: Option<String>,
    pub cascade_payments: bool,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service: ServiceKind = lookup("SERVICE")
            .context("SERVICE must be one of users, orders, payments, delivery")?
            .parse()?;

        let server_port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .unwrap_or_else(|| service.default_port().to_string());

        let data_path = match lookup("STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("file") => Some(
                lookup("DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from(format!("./data/{}.json", service.collection()))
                    }),
            ),
            Some("memory") => None,
            Some(other) => anyhow::bail!("STORAGE must be `file` or `memory`, got {other:?}"),
        };

        let cascade_payments = match lookup("CASCADE_PAYMENTS") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("CASCADE_PAYMENTS must be true or false, got {v:?}"))?,
            None => false,
        };

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("invalid UPSTREAM_TIMEOUT_SECS {v:?}"))?,
            ),
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        Ok(Self {
            service,
            server_port,
            data_path,
            orders_service_url: lookup("ORDERS_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_ORDERS_URL.into()),
            payments_service_url: lookup("PAYMENTS_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_PAYMENTS_URL.into()),
            delivery_service_url: lookup("DELIVERY_SERVICE_URL").filter(|s| !s.trim().is_empty()),
            cascade_payments,
            upstream_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_follow_service_kind() {
        let cfg = config(&[("SERVICE", "orders")]).unwrap();
        assert_eq!(cfg.service, ServiceKind::Orders);
        assert_eq!(cfg.server_port, "8082");
        assert_eq!(cfg.data_path, Some(PathBuf::from("./data/orders.json")));
        assert_eq!(cfg.payments_service_url, DEFAULT_PAYMENTS_URL);
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(10));
        assert!(!cfg.cascade_payments);
        assert!(cfg.delivery_service_url.is_none());
    }

    #[test]
    fn overrides_are_honoured() {
        let cfg = config(&[
            ("SERVICE", "delivery"),
            ("PORT", "9000"),
            ("STORAGE", "memory"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("CASCADE_PAYMENTS", "true"),
        ])
        .unwrap();
        assert_eq!(cfg.service, ServiceKind::Delivery);
        assert_eq!(cfg.server_port, "9000");
        assert!(cfg.data_path.is_none());
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(3));
        assert!(cfg.cascade_payments);
    }

    #[test]
    fn server_port_wins_over_port() {
        let cfg = config(&[("SERVICE", "users"), ("SERVER_PORT", "1"), ("PORT", "2")]).unwrap();
        assert_eq!(cfg.server_port, "1");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[]).is_err());
        assert!(config(&[("SERVICE", "billing")]).is_err());
        assert!(config(&[("SERVICE", "users"), ("STORAGE", "s3")]).is_err());
        assert!(config(&[("SERVICE", "users"), ("UPSTREAM_TIMEOUT_SECS", "x")]).is_err());
    }
}
