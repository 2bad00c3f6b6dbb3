//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IReviewGateway`] - Remote review service operations (GitHub, future providers)
//! - [`IHostOverlay`] - The diff-rendering host: cursor position and redraws

pub mod host_overlay;
pub mod review_gateway;

pub use host_overlay::{CursorPosition, IHostOverlay, NoopOverlay};
pub use review_gateway::{IReviewGateway, PendingThreadRequest, UserIdentity};
