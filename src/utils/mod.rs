// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Utility modules
//!
//! Common utilities for the deda CLI.

pub mod colors;

pub use colors::*;
