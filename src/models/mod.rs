// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing state: the open document, the crop selection and the trim
//! timeline.

pub mod notify;
pub mod selection;
pub mod session;
pub mod timeline;
