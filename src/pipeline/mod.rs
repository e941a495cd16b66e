// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Pipeline records and the stage dependency graph
//!
//! This module defines the records the compiler reads, the validated graph
//! built from them, and the authoring lint behind `deda validate`.

mod dag;
mod definition;
mod validation;

pub use dag::{StageGraph, StageNode};
pub use definition::*;
pub use validation::{PipelineValidator, ValidationResult};
