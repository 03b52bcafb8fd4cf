//! Server command configuration

use crate::error::{AuthzError, Result};
use crate::store::MemoryTokenStore;
use axum::http::HeaderName;
use clap::{ArgGroup, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Forward-auth token validation server
#[derive(Debug, Clone, Parser)]
#[command(name = "ingress-authz-server")]
#[command(about = "Simple external authentication service for ingresses")]
#[command(version)]
#[command(group(
    ArgGroup::new("token_config")
        .required(true)
        .args(["token_config_data", "token_config_file"]),
))]
pub struct ServerConfig {
    /// Enable debug logging
    #[arg(long, env = "INGRESS_AUTHZ_DEBUG")]
    pub debug: bool,

    /// Address the authentication server listens on
    #[arg(long, env = "INGRESS_AUTHZ_LISTEN_ADDRESS", default_value = "0.0.0.0:8080")]
    pub listen_address: SocketAddr,

    /// Path serving token authentication
    #[arg(long, env = "INGRESS_AUTHZ_AUTHENTICATION_PATH", default_value = "/auth")]
    pub authentication_path: String,

    /// Raw token catalog document
    #[arg(long, env = "INGRESS_AUTHZ_TOKEN_CONFIG_DATA")]
    pub token_config_data: Option<String>,

    /// Token catalog file (can't be used with token-config-data)
    #[arg(long, env = "INGRESS_AUTHZ_TOKEN_CONFIG_FILE")]
    pub token_config_file: Option<PathBuf>,

    /// Response header carrying the authorized client id
    #[arg(long, env = "INGRESS_AUTHZ_CLIENT_ID_HEADER", default_value = "X-Ext-Auth-Client-Id")]
    pub client_id_header: HeaderName,

    /// Address the internal server (metrics, health check) listens on
    #[arg(long, env = "INGRESS_AUTHZ_INTERNAL_LISTEN_ADDRESS", default_value = "0.0.0.0:8081")]
    pub internal_listen_address: SocketAddr,

    /// Path serving Prometheus metrics
    #[arg(long, env = "INGRESS_AUTHZ_METRICS_PATH", default_value = "/metrics")]
    pub metrics_path: String,

    /// Path serving the health check
    #[arg(long, env = "INGRESS_AUTHZ_HEALTH_CHECK_PATH", default_value = "/status")]
    pub health_check_path: String,
}

impl ServerConfig {
    /// Load the token store from whichever source was configured
    pub fn load_token_store(&self) -> Result<MemoryTokenStore> {
        match (&self.token_config_data, &self.token_config_file) {
            (Some(data), None) => MemoryTokenStore::new(data),
            (None, Some(path)) => MemoryTokenStore::from_file(path),
            _ => Err(AuthzError::Internal(
                "exactly one of token config file or token config data is required".to_string(),
            )),
        }
    }
}
