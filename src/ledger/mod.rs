// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Ledger Rail
//!
//! Avalanche C-Chain client for the ledger-transfer settlement rail. The
//! server holds one operator key and moves native AVAX from the operator
//! account to the seller's wallet; the transaction hash becomes the
//! settlement reference.
//!
//! The RPC call is bounded by a timeout so a stalled node maps to a
//! settlement error instead of a hung request.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tracing::info;

use crate::config::{LEDGER_CHAIN_NAME_ENV, LEDGER_OPERATOR_KEY_ENV, LEDGER_RPC_URL_ENV};

/// Upper bound on one transfer submission.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Native token decimals on the C-Chain.
const NATIVE_DECIMALS: u32 = 18;

/// HTTP provider type with signing wallet (all fillers).
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors that can occur on the ledger rail.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger rail is not configured")]
    NotConfigured,

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid operator key: {0}")]
    InvalidOperatorKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Ledger RPC timed out")]
    Timeout,
}

/// The value-transfer seam the settlement engine depends on.
#[async_trait]
pub trait LedgerRail: Send + Sync {
    /// Transfer `amount` (native units) to an address. Returns the ledger
    /// transaction id on success.
    async fn transfer(&self, to_address: &str, amount: f64) -> Result<String, LedgerError>;
}

/// Chain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Network name for logs and stored identity rows
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
}

impl ChainConfig {
    /// Avalanche C-Chain mainnet.
    pub fn avalanche_mainnet() -> Self {
        Self {
            name: "avalanche-mainnet".to_string(),
            chain_id: 43114,
            rpc_url: "https://api.avax.network/ext/bc/C/rpc".to_string(),
        }
    }

    /// Avalanche Fuji testnet.
    pub fn avalanche_fuji() -> Self {
        Self {
            name: "avalanche-fuji".to_string(),
            chain_id: 43113,
            rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
        }
    }

    /// Resolve the chain from `LEDGER_CHAIN_NAME` (default Fuji), with
    /// `LEDGER_RPC_URL` overriding the endpoint.
    pub fn from_env() -> Result<Self, LedgerError> {
        let mut config = match std::env::var(LEDGER_CHAIN_NAME_ENV).ok().as_deref() {
            None | Some("avalanche-fuji") | Some("fuji") => Self::avalanche_fuji(),
            Some("avalanche-mainnet") | Some("mainnet") => Self::avalanche_mainnet(),
            Some(other) => {
                return Err(LedgerError::InvalidRpcUrl(format!(
                    "Unknown chain name: {other}"
                )))
            }
        };
        if let Ok(rpc_url) = std::env::var(LEDGER_RPC_URL_ENV) {
            config.rpc_url = rpc_url;
        }
        Ok(config)
    }
}

/// Ledger client holding the operator signer.
pub struct LedgerClient {
    chain: ChainConfig,
    provider: SigningProvider,
}

impl LedgerClient {
    /// Create a client for the given chain with the operator's private key
    /// (hex, no 0x prefix).
    pub fn new(chain: ChainConfig, operator_key_hex: &str) -> Result<Self, LedgerError> {
        let url: url::Url = chain
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let signer = Self::operator_signer(operator_key_hex)?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { chain, provider })
    }

    /// Create a client from `LEDGER_*` environment variables.
    pub fn from_env() -> Result<Self, LedgerError> {
        let key = std::env::var(LEDGER_OPERATOR_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(LedgerError::NotConfigured)?;
        Self::new(ChainConfig::from_env()?, &key)
    }

    /// The chain this client talks to.
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Parse the operator's private key into a signer.
    pub fn operator_signer(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
        let key_bytes = alloy::hex::decode(private_key_hex)
            .map_err(|e| LedgerError::InvalidOperatorKey(e.to_string()))?;
        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| LedgerError::InvalidOperatorKey(e.to_string()))
    }
}

#[async_trait]
impl LedgerRail for LedgerClient {
    async fn transfer(&self, to_address: &str, amount: f64) -> Result<String, LedgerError> {
        let to_addr = Address::from_str(to_address)
            .map_err(|e| LedgerError::InvalidAddress(e.to_string()))?;
        let value = native_to_wei(amount)?;

        let tx = TransactionRequest::default().to(to_addr).value(value);

        let pending = tokio::time::timeout(TRANSFER_TIMEOUT, self.provider.send_transaction(tx))
            .await
            .map_err(|_| LedgerError::Timeout)?
            .map_err(|e| LedgerError::TransferFailed(e.to_string()))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(
            chain = %self.chain.name,
            to = %to_address,
            amount,
            tx_hash = %tx_hash,
            "Ledger transfer submitted"
        );
        Ok(tx_hash)
    }
}

/// Installed when no operator key is configured; every transfer fails
/// with `NotConfigured` instead of the server refusing to start.
pub struct DisabledLedger;

#[async_trait]
impl LedgerRail for DisabledLedger {
    async fn transfer(&self, _to_address: &str, _amount: f64) -> Result<String, LedgerError> {
        Err(LedgerError::NotConfigured)
    }
}

/// Convert a native amount to wei without going through float multiplication.
fn native_to_wei(amount: f64) -> Result<U256, LedgerError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }

    let text = format!("{amount:.18}");
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text.as_str(), ""),
    };

    let whole: u128 = whole
        .parse()
        .map_err(|_| LedgerError::InvalidAmount(text.clone()))?;
    let frac_padded = format!("{frac:0<width$}", width = NATIVE_DECIMALS as usize);
    let frac: u128 = frac_padded[..NATIVE_DECIMALS as usize]
        .parse()
        .map_err(|_| LedgerError::InvalidAmount(text.clone()))?;

    let multiplier = 10u128.pow(NATIVE_DECIMALS);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("amount overflow: {text}")))?;

    Ok(U256::from(total))
}
