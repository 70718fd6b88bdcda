// SPDX-License-Identifier: MPL-2.0

//! Frame source layer
//!
//! Sources supply the raw frames the pipeline driver stylizes:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Pipeline Driver               │
//! └────────────────────┬────────────────────────┘
//!                      │ FrameSource
//! ┌────────────────────┴────────────────────────┐
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │   Still image    │  │  Test pattern   │  │
//! │  │  (image crate)   │  │   (synthetic)   │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`frame_source`]: The trait the driver polls once per tick
//! - [`still_image`]: A decoded image file served as every frame
//! - [`test_pattern`]: An animated scene used when no input is given

pub mod frame_source;
pub mod still_image;
pub mod test_pattern;

pub use frame_source::FrameSource;
pub use still_image::StillImageSource;
pub use test_pattern::TestPatternSource;
