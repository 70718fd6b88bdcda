// SPDX-License-Identifier: MPL-2.0

//! Frame processing pipelines
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Frame Source │ ──▶ │  Pipeline Driver  │ ──▶ │  Presented   │
//! │              │     │  - Raster buffer  │     │   surface    │
//! │              │     │  - Filter chain   │     │              │
//! └──────────────┘     └───────────────────┘     └──────┬───────┘
//!                                                       │ capture
//!                                               ┌───────▼───────┐
//!                                               │ Photo export  │
//!                                               │  (PNG/JPEG)   │
//!                                               └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`driver`]: Per-tick scheduling, mode switching and presentation
//! - [`photo`]: Snapshot encoding of the presented surface

pub mod driver;
pub mod photo;
