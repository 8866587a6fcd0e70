// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

use std::{env, net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use farmlink::api::router;
use farmlink::auth::TokenSigner;
use farmlink::challenge::{sweeper::ChallengeSweeper, ChallengeStore};
use farmlink::config::DATA_DIR_ENV;
use farmlink::identity::IdentitySynchronizer;
use farmlink::ledger::{DisabledLedger, LedgerClient, LedgerError, LedgerRail};
use farmlink::providers::{
    ChargeGateway, HttpEventPublisher, PaystackClient, SendgridTwilioMessenger,
};
use farmlink::settlement::SettlementEngine;
use farmlink::state::AppState;
use farmlink::storage::{DataStore, StoragePaths};

#[tokio::main]
async fn main() {
    init_tracing();

    // Missing signing secret is fatal: refusing to start beats minting
    // tokens nobody can validate.
    let tokens = match TokenSigner::from_env() {
        Ok(signer) => Arc::new(signer),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let data_dir =
        env::var(DATA_DIR_ENV).unwrap_or_else(|_| farmlink::storage::paths::DATA_ROOT.to_string());
    let mut store = DataStore::new(StoragePaths::new(&data_dir));
    store
        .initialize()
        .expect("Failed to initialize data directory");
    let store = Arc::new(store);
    info!(data_dir = %data_dir, "Storage initialized");

    let ledger: Arc<dyn LedgerRail> = match LedgerClient::from_env() {
        Ok(client) => {
            info!(chain = %client.chain().name, "Ledger rail configured");
            Arc::new(client)
        }
        Err(LedgerError::NotConfigured) => {
            warn!("LEDGER_OPERATOR_KEY not set; ledger rail disabled");
            Arc::new(DisabledLedger)
        }
        Err(e) => {
            eprintln!("Ledger configuration invalid: {e}");
            std::process::exit(1);
        }
    };

    let gateway: Arc<dyn ChargeGateway> = match PaystackClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            // Start without the gateway rail; settle requests on it will
            // report service unavailable.
            warn!(error = %e, "Card gateway disabled");
            Arc::new(UnconfiguredGateway)
        }
    };

    let events = Arc::new(
        HttpEventPublisher::from_env().expect("Failed to build realtime event publisher"),
    );
    let messenger =
        Arc::new(SendgridTwilioMessenger::from_env().expect("Failed to build messaging client"));

    let challenges = Arc::new(ChallengeStore::new(store.clone()));
    let settlement = Arc::new(SettlementEngine::new(
        store.clone(),
        ledger,
        gateway,
        events,
    ));

    let state = AppState {
        store: store.clone(),
        challenges: challenges.clone(),
        tokens,
        identity: Arc::new(IdentitySynchronizer::new(store)),
        settlement,
        messenger,
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(ChallengeSweeper::new(challenges).run(shutdown.clone()));

    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    info!("FarmLink server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server failed");
}

/// `RUST_LOG` controls the filter; `LOG_FORMAT=json` switches to JSON
/// output for log aggregation.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
    shutdown.cancel();
}

/// Stand-in gateway when no credentials are configured.
struct UnconfiguredGateway;

#[async_trait::async_trait]
impl ChargeGateway for UnconfiguredGateway {
    async fn initiate_charge(
        &self,
        _email: &str,
        _amount: f64,
        _currency: farmlink::storage::Currency,
    ) -> Result<farmlink::providers::ChargeInitiation, farmlink::providers::GatewayError> {
        Err(farmlink::providers::GatewayError::MissingConfig(
            "PAYSTACK_SECRET_KEY".to_string(),
        ))
    }
}
