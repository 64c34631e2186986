#[cfg(feature = "logging")]
use defmt::trace;

use crate::error::InputError;
use crate::Pull;

/// Milliseconds between stability re-checks.
pub const DEFAULT_PERIOD_MS: u32 = 4;
/// Consecutive stable re-checks needed to accept an edge.
pub const DEFAULT_THRESHOLD: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct DebounceConfig {
    pub period_ms: u32,
    pub threshold: u8,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Receives accepted presses.
pub trait PressSink {
    fn pressed(&self);
}

impl<F: Fn()> PressSink for F {
    fn pressed(&self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
}

/// What the owner of the pin has to do after feeding the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum ButtonAction {
    /// Nothing changed.
    Idle,
    /// Disable the edge interrupt and start the periodic re-check.
    StartRecheck,
    /// Keep the re-check timer running.
    KeepChecking,
    /// Stop the re-check timer and re-enable the edge interrupt.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    HoldUp,
    Falling,
    HoldDown,
    Rising,
}

/// Push-button debouncer driven by one edge interrupt and one periodic timer.
///
/// An edge out of a steady level starts a re-check; the new level has to be
/// read `threshold` times in a row before it is accepted. A single read of
/// the old level aborts. The press fires when the accepted edge is the
/// active one for the wiring (falling for pull-up, rising for pull-down).
pub struct ButtonDebouncer<S> {
    state: State,
    pull: Pull,
    config: DebounceConfig,
    stable_reads: u8,
    sink: S,
}

impl<S: PressSink> ButtonDebouncer<S> {
    pub fn new(pull: Pull, config: DebounceConfig, sink: S) -> Result<Self, InputError> {
        if config.threshold == 0 {
            return Err(InputError::ZeroDebounceThreshold);
        }

        Ok(Self {
            state: Self::resting(pull),
            pull,
            config,
            stable_reads: 0,
            sink,
        })
    }

    fn resting(pull: Pull) -> State {
        match pull {
            Pull::Up => State::HoldUp,
            Pull::Down => State::HoldDown,
        }
    }

    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The edge to listen for, or `None` while a re-check is running.
    pub fn awaited_edge(&self) -> Option<Edge> {
        match self.state {
            State::HoldUp => Some(Edge::Falling),
            State::HoldDown => Some(Edge::Rising),
            State::Falling | State::Rising => None,
        }
    }

    pub fn is_checking(&self) -> bool {
        self.awaited_edge().is_none()
    }

    /// True while the debounced level is the contact's closed level.
    pub fn is_held(&self) -> bool {
        match self.pull {
            Pull::Up => self.state == State::HoldDown,
            Pull::Down => self.state == State::HoldUp,
        }
    }

    pub fn on_edge(&mut self, edge: Edge) -> ButtonAction {
        let next = match (self.state, edge) {
            (State::HoldUp, Edge::Falling) => State::Falling,
            (State::HoldDown, Edge::Rising) => State::Rising,
            _ => return ButtonAction::Idle,
        };

        self.state = next;
        self.stable_reads = 0;
        ButtonAction::StartRecheck
    }

    /// One tick of the re-check timer with the current pin level.
    pub fn on_recheck(&mut self, level_high: bool) -> ButtonAction {
        let (edge, previous, accepted) = match self.state {
            State::Falling => (Edge::Falling, State::HoldUp, State::HoldDown),
            State::Rising => (Edge::Rising, State::HoldDown, State::HoldUp),
            State::HoldUp | State::HoldDown => return ButtonAction::Idle,
        };

        let back_at_start = match edge {
            Edge::Falling => level_high,
            Edge::Rising => !level_high,
        };
        if back_at_start {
            self.state = previous;
            self.stable_reads = 0;
            return ButtonAction::Settled;
        }

        self.stable_reads += 1;
        if self.stable_reads < self.config.threshold {
            return ButtonAction::KeepChecking;
        }

        self.state = accepted;
        self.stable_reads = 0;
        if edge == self.active_edge() {
            #[cfg(feature = "logging")]
            trace!("button press accepted on {} edge", edge);
            self.sink.pressed();
        }
        ButtonAction::Settled
    }

    fn active_edge(&self) -> Edge {
        match self.pull {
            Pull::Up => Edge::Falling,
            Pull::Down => Edge::Rising,
        }
    }
}
