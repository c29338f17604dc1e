//! Gateway configuration.
//!
//! Loads configuration from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 4030
//! data_dir = "./data"
//! policy_executor = "0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"
//!
//! [resolver]
//! backend = "vault"
//!
//! [resolver.vault]
//! agent_id = "agent-1"
//! schema_id = "addressbook-schema"
//! node_timeout_secs = 5
//! min_matching_nodes = 2
//!
//! [[resolver.vault.nodes]]
//! name = "alpha"
//! url = "https://alpha.vault.example/"
//! did = "did:vault:alpha"
//! jwt = "$VAULT_JWT_ALPHA"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override server bind address and port
//! - Node JWTs referenced by `$VAR` in the config file

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::{Address, address};
use serde::Deserialize;
use trustflow_vault::client::NodeConfig;
use trustflow_vault::resolver::ReadConsistency;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Server bind address (default: `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `4030`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `addressbook.json` and `policies.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// The policy-executor contract calls are encoded against.
    #[serde(default = "default_policy_executor")]
    pub policy_executor: Address,

    /// Recipient-resolution backend selection.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Which approved-counterparty mechanism backs `/authorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverBackend {
    /// The owner-signed local container (re-verified on every resolve).
    #[default]
    SignedBook,

    /// The threshold secret-store cluster.
    Vault,
}

/// Resolver selection plus backend-specific settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    /// Selected backend (default: `signed-book`).
    #[serde(default)]
    pub backend: ResolverBackend,

    /// Cluster settings, required when `backend = "vault"`.
    #[serde(default)]
    pub vault: Option<VaultConfig>,
}

/// Secret-store cluster settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    /// Agent identifier scoping every read.
    pub agent_id: String,

    /// Address-book schema identifier on the nodes.
    pub schema_id: String,

    /// Per-node read timeout in seconds (default: 5).
    #[serde(default = "default_node_timeout_secs")]
    pub node_timeout_secs: u64,

    /// How many byte-identical node responses a read requires (default: 1,
    /// i.e. first responder wins).
    #[serde(default = "default_min_matching_nodes")]
    pub min_matching_nodes: usize,

    /// The storage nodes, in priority order.
    pub nodes: Vec<NodeConfig>,
}

impl VaultConfig {
    /// The per-node timeout as a [`Duration`].
    #[must_use]
    pub const fn node_timeout(&self) -> Duration {
        Duration::from_secs(self.node_timeout_secs)
    }

    /// The read-consistency policy implied by `min_matching_nodes`.
    #[must_use]
    pub const fn consistency(&self) -> ReadConsistency {
        if self.min_matching_nodes <= 1 {
            ReadConsistency::FirstAvailable
        } else {
            ReadConsistency::Quorum(self.min_matching_nodes)
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    4030
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_policy_executor() -> Address {
    address!("0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08")
}

fn default_node_timeout_secs() -> u64 {
    5
}

fn default_min_matching_nodes() -> usize {
    1
}

impl GatewayConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// String values with `$VAR` / `${VAR}` references are expanded from the
    /// process environment; `HOST` and `PORT` env vars override file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            // No config file: rely entirely on defaults.
            String::new()
        };

        let expanded = expand_env_vars(&content);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        Ok(config)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment
/// variables. Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            let braced = chars.peek() == Some(&'{');
            if braced {
                chars.next(); // consume '{'
            }

            let mut var_name = String::new();
            while let Some(&c) = chars.peek() {
                if braced {
                    if c == '}' {
                        chars.next();
                        break;
                    }
                } else if !c.is_ascii_alphanumeric() && c != '_' {
                    break;
                }
                var_name.push(c);
                chars.next();
            }

            if var_name.is_empty() {
                result.push('$');
                if braced {
                    result.push('{');
                }
            } else if let Ok(val) = std::env::var(&var_name) {
                result.push_str(&val);
            } else {
                // Leave unresolved variable as-is
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced {
                    result.push('}');
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 4030);
        assert_eq!(config.resolver.backend, ResolverBackend::SignedBook);
        assert_eq!(config.policy_executor, default_policy_executor());
    }

    #[test]
    fn test_vault_backend_with_nodes() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [resolver]
            backend = "vault"

            [resolver.vault]
            agent_id = "agent-1"
            schema_id = "book-schema"
            min_matching_nodes = 2

            [[resolver.vault.nodes]]
            name = "alpha"
            url = "https://alpha.vault.example/"
            did = "did:vault:alpha"
            jwt = "token-a"
            "#,
        )
        .unwrap();

        assert_eq!(config.resolver.backend, ResolverBackend::Vault);
        let vault = config.resolver.vault.unwrap();
        assert_eq!(vault.node_timeout(), Duration::from_secs(5));
        assert_eq!(vault.consistency(), ReadConsistency::Quorum(2));
        assert_eq!(vault.nodes.len(), 1);
    }

    #[test]
    fn test_first_available_when_min_matching_is_one() {
        let vault = VaultConfig {
            agent_id: "a".into(),
            schema_id: "s".into(),
            node_timeout_secs: 5,
            min_matching_nodes: 1,
            nodes: Vec::new(),
        };
        assert_eq!(vault.consistency(), ReadConsistency::FirstAvailable);
    }

    #[test]
    fn test_expand_env_vars_braced_and_bare() {
        // Safety: test-only env mutation, single-threaded access pattern.
        unsafe {
            std::env::set_var("TRUSTFLOW_TEST_JWT", "tok");
        }
        assert_eq!(expand_env_vars("jwt = \"$TRUSTFLOW_TEST_JWT\""), "jwt = \"tok\"");
        assert_eq!(expand_env_vars("${TRUSTFLOW_TEST_JWT}!"), "tok!");
        assert_eq!(expand_env_vars("$UNSET_VARIABLE_XYZ"), "$UNSET_VARIABLE_XYZ");
    }
}
