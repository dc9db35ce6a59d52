//! A context-scoped image resampling engine.
//!
//! Two cores live here: a windowed-filter resampler driven by per-axis
//! contribution tables (see [`scale2d`]), and a scoped ownership heap
//! (see [`context`]) that tracks every allocation made against a [`Context`]
//! and tears it down deterministically, in dependency order, when the
//! context drops.
//!
//! Everything above the codec boundary works in linear, premultiplied
//! light (see [`color`] and [`scanline`]); codecs convert to and from that
//! representation at the edges.

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod error;
pub mod config;
pub mod context;
pub mod pixel;
pub mod bitmap;
pub mod color;
pub mod scanline;
pub mod filters;
pub mod contribution;
pub mod scale2d;
pub mod geometry;
pub mod trim;
pub mod pipeline;
pub mod codec;

pub use config::Config;
pub use context::Context;
pub use error::{EngineError, EngineResult};
pub use pixel::PixelFormat;
pub use bitmap::{ByteBitmap, FloatBitmap};
