#![no_std]

//! Edge decoders for the front panel: a quadrature state machine for the
//! rotary encoder and a debouncing state machine for push buttons. Both are
//! fed from GPIO edge interrupts and report through small sink traits.

pub mod button;
pub mod error;
pub mod quadrature;

pub use button::{ButtonAction, ButtonDebouncer, DebounceConfig, Edge, PressSink};
pub use error::InputError;
pub use quadrature::{QuadratureDecoder, Rotation, RotationSink};

/// How an input is biased at rest.
///
/// With `Up` the contact pulls the pin low when closed (active-low), with
/// `Down` it drives the pin high (active-high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Pull {
    Up,
    Down,
}
