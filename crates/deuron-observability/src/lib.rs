// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # deuron-observability
//!
//! Logging setup shared by the Deuron binaries, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: JSON log files in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known Deuron crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "deuron",
    "deuron-config",
    "deuron-observability",
    "deuron-npu-neural",
    "deuron-npu-plasticity",
    "deuron-npu-stimulus",
    "deuron-npu-burst-engine",
];
