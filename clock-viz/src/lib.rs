#![no_std]

//! Turns a spectrum into LED colors: band reduction, phase-quadrant color
//! mapping and the per-LED strip renderer.

pub mod band_mapper;
pub mod color_mapper;
pub mod renderer;
pub mod types;

pub use band_mapper::BandMapper;
pub use color_mapper::{PhaseColorMapper, Quadrant, DEFAULT_BASE_COLOR};
pub use renderer::{FrameOutcome, Millis, Renderer, StripLine, WriteGate, YieldPolicy};
pub use smart_leds::RGB8;
pub use types::BandData;
