// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! FarmLink - Agricultural Marketplace Backend
//!
//! Identity and payments core for the FarmLink marketplace: four
//! authentication protocols (password, email OTC, SMS OTC, wallet
//! signature) converging on one session issuer, and order settlement
//! across a ledger-transfer rail and a card-gateway rail with dual-store
//! persistence.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Roles, session tokens, password hashing, wallet proofs
//! - `challenge` - Single-use OTC codes and wallet nonces
//! - `identity` - Dual-store identity synchronizer
//! - `ledger` - Avalanche C-Chain settlement rail
//! - `providers` - Card gateway, OTC messaging, realtime events
//! - `settlement` - Payment settlement orchestrator
//! - `storage` - JSON document store and repositories

pub mod api;
pub mod auth;
pub mod challenge;
pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod providers;
pub mod settlement;
pub mod state;
pub mod storage;
