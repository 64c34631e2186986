#[cfg(feature = "logging")]
use defmt::trace;

use crate::Pull;

/// Receives decoded detents.
pub trait RotationSink {
    fn clockwise(&self);
    fn counter_clockwise(&self);
}

/// A `(clockwise, counter_clockwise)` pair of closures.
impl<F: Fn(), G: Fn()> RotationSink for (F, G) {
    fn clockwise(&self) {
        (self.0)()
    }

    fn counter_clockwise(&self) {
        (self.1)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Cw1,
    Cw2,
    Cw3,
    Ccw1,
    Ccw2,
    Ccw3,
}

use State::*;

/// Next state indexed by `[state][pinpair]`, rows in `State` order.
const TRANSITIONS: [[State; 4]; 7] = [
    [Start, Ccw1, Cw1, Start],  // Start
    [Cw2, Start, Cw1, Start],   // Cw1
    [Cw2, Cw3, Cw1, Start],     // Cw2
    [Cw2, Cw3, Start, Start],   // Cw3
    [Ccw2, Ccw1, Start, Start], // Ccw1
    [Ccw2, Ccw1, Ccw3, Start],  // Ccw2
    [Ccw2, Start, Ccw3, Start], // Ccw3
];

/// Both pins at their resting level.
const REST: usize = 3;

/// Rotary encoder decoder.
///
/// Call [`on_edge`](Self::on_edge) with both pin levels on every edge of
/// either pin. A detent is reported once the pins return to rest after a
/// complete gray-code sequence; anything out of order falls back to `Start`
/// without reporting.
pub struct QuadratureDecoder<S> {
    state: State,
    pull: Pull,
    sink: S,
}

impl<S: RotationSink> QuadratureDecoder<S> {
    pub fn new(pull: Pull, sink: S) -> Self {
        Self {
            state: Start,
            pull,
            sink,
        }
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// True when no partial sequence is in progress.
    pub fn is_at_rest(&self) -> bool {
        self.state == Start
    }

    pub fn on_edge(&mut self, clk: bool, dir: bool) -> Option<Rotation> {
        let pinpair = self.pinpair(clk, dir);

        let rotation = match (self.state, pinpair) {
            (Cw3, REST) => Some(Rotation::Clockwise),
            (Ccw3, REST) => Some(Rotation::CounterClockwise),
            _ => None,
        };

        match rotation {
            Some(Rotation::Clockwise) => self.sink.clockwise(),
            Some(Rotation::CounterClockwise) => self.sink.counter_clockwise(),
            None => {}
        }

        #[cfg(feature = "logging")]
        if let Some(r) = rotation {
            trace!("encoder detent {}", r);
        }

        self.state = TRANSITIONS[self.state as usize][pinpair];
        rotation
    }

    fn pinpair(&self, clk: bool, dir: bool) -> usize {
        let raw = clk as usize + 2 * dir as usize;
        match self.pull {
            Pull::Up => raw,
            Pull::Down => 3 - raw,
        }
    }
}
