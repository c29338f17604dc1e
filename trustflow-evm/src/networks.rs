//! Registry of known networks and stablecoin deployments.
//!
//! Deployments with a zero placeholder address are simply absent here: a
//! lookup miss means "not available on this network", never a transfer to
//! the zero address.

use alloy_primitives::{Address, address};

/// An EIP-155 chain ID (e.g. 11155111 for Sepolia).
pub type ChainId = u64;

/// A stablecoin deployment on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDeployment {
    /// Token symbol (e.g. `"MNEE"`).
    pub symbol: &'static str,
    /// Contract address.
    pub address: Address,
    /// Number of decimals (18 for MNEE, 6 for USDT/USDC).
    pub decimals: u8,
}

/// Configuration for a known network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Human-readable network name.
    pub name: &'static str,
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Policy-executor contract, when deployed on this network.
    pub policy_executor: Option<Address>,
    /// Stablecoins available on this network.
    pub tokens: &'static [TokenDeployment],
}

const SEPOLIA_TOKENS: &[TokenDeployment] = &[
    TokenDeployment {
        symbol: "MNEE",
        address: address!("0x8ccedbAe4916b79da7F3F612EfB2EB93A2bFD6cF"),
        decimals: 18,
    },
    TokenDeployment {
        symbol: "USDT",
        address: address!("0xaA8E23Fb1079EA71e0a56F48a2aA51851D8433D0"),
        decimals: 6,
    },
];

const BASE_SEPOLIA_TOKENS: &[TokenDeployment] = &[TokenDeployment {
    symbol: "MNEE",
    address: address!("0x8ccedbAe4916b79da7F3F612EfB2EB93A2bFD6cF"),
    decimals: 18,
}];

const KNOWN_NETWORKS: &[NetworkConfig] = &[
    NetworkConfig {
        name: "sepolia",
        chain_id: 11_155_111,
        policy_executor: Some(address!("0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08")),
        tokens: SEPOLIA_TOKENS,
    },
    NetworkConfig {
        name: "base-sepolia",
        chain_id: 84_532,
        policy_executor: None,
        tokens: BASE_SEPOLIA_TOKENS,
    },
];

/// Returns the configuration for every known network.
#[must_use]
pub const fn known_networks() -> &'static [NetworkConfig] {
    KNOWN_NETWORKS
}

/// Looks up a network configuration by chain ID.
#[must_use]
pub fn network_by_chain_id(chain_id: ChainId) -> Option<&'static NetworkConfig> {
    KNOWN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

impl NetworkConfig {
    /// Looks up a stablecoin deployment by symbol (case-insensitive).
    #[must_use]
    pub fn token(&self, symbol: &str) -> Option<&TokenDeployment> {
        self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }
}
