//! # Docshelf Architecture
//!
//! Docshelf mirrors a published document manifest into a local, browsable
//! offline cache. It is a library first; the `docshelf` binary is one client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints listings and progress           │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and the sync engine            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Browse, status, path lookup, config, sync summaries      │
//! │  - Returns `CmdResult`, never prints                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (engine.rs, session.rs, reconcile.rs)               │
//! │  - One sync session at a time, events to subscribers        │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Remote (remote/)             │ │  Storage (store/)         │
//! │  - HttpRemote, StaticRemote   │ │  - snapshot + file cache  │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Data flow of a sync
//!
//! 1. [`remote::ManifestSource`] returns the manifest text.
//! 2. [`manifest::parse_manifest`] turns rows into [`model::DocumentRecord`]s,
//!    extracting identifiers ([`ident`]) and classifying names ([`classify`]).
//! 3. The list is saved as a [`store::Snapshot`] and grouped into a
//!    [`catalog::Catalog`].
//! 4. [`reconcile::reconcile`] downloads whatever is missing from the cache.
//!
//! When step 1 or 2 fails the engine falls back to the saved snapshot and
//! reports `Offline`.
//!
//! ## Testing
//!
//! Everything below the CLI runs against [`remote::memory::StaticRemote`] and
//! [`store::memory::InMemorySnapshotStore`]; most tests live next to the code
//! they cover. `tests/` drives the binary end to end.

pub mod api;
pub mod catalog;
pub mod classify;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod ident;
pub mod manifest;
pub mod model;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod store;
