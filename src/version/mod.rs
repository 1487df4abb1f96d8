//! Version management for mods on The Forge
//!
//! This module provides ordering, constraint matching, dependency resolution
//! and storage for mod versions, plus the client that pulls versions from a
//! Forge instance.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│    Store    │◀────│  Resolver   │
//! │  (fetch)    │     │  (SQLite)   │     │   (deps)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │  Ordering   │     │ Constraint  │
//!                     │  (SQL sort) │     │  (matching) │
//!                     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            └───────┬───────────┘
//!                                    ▼
//!                             ┌─────────────┐
//!                             │   Semver    │
//!                             │ (compare)   │
//!                             └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `SemanticVersion`, the lenient parser and the comparator
//! - [`entity`]: ordering of anything carrying a version, with id tie-break
//! - [`ordering`]: SQL `ORDER BY` fragment matching the comparator
//! - [`constraint`]: version constraints (`^1.2`, `~3.9.0`, `>=1 <2`, `||`)
//! - [`resolver`]: dependency resolution and platform compatibility
//! - [`storer`]: storage trait used by the resolver and sync
//! - [`store`]: SQLite implementation of the storage trait
//! - [`registry`]: trait for fetching versions from a remote source
//! - [`registries`]: the Forge API client
//! - [`sync`]: fetch-and-store routines
//! - [`error`]: error types
//! - [`types`]: records shared across modules

pub mod constraint;
pub mod entity;
pub mod error;
pub mod ordering;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod store;
pub mod storer;
pub mod sync;
pub mod types;
