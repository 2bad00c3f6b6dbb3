//! revsync Core - Domain logic for review thread overlays
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `ReviewThread`, `Comment`, `FilePath`, identifiers
//! - **Thread store** - the session-scoped index used for rendering and navigation
//! - **Port definitions** - Traits for adapters: `IReviewGateway`, `IHostOverlay`
//!
//! # Architecture
//!
//! The domain module contains pure data and invariants with no I/O.
//! Ports define trait interfaces that adapter crates implement
//! (`revsync-github` for the remote review service, the CLI or an editor
//! plugin for the host overlay). The synchronization engine that drives the
//! ports lives in `revsync-sync`.

pub mod config;
pub mod domain;
pub mod ports;
pub mod store;
