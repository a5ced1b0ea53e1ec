// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: probing, decoding, exporting and edit settings files.

pub mod export;
pub mod media;
pub mod probe;
pub mod serialization;

#[cfg(test)]
pub(crate) mod testing;
