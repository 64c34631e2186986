//! Front-panel bindings standing in for the menu layer: the encoder steps
//! through the LED modes and the button toggles the radio mute.

use clock_input::{PressSink, RotationSink};

use crate::context::ClockContext;

pub struct ModeKnob<'a> {
    ctx: &'a ClockContext,
}

impl<'a> ModeKnob<'a> {
    pub fn new(ctx: &'a ClockContext) -> Self {
        Self { ctx }
    }
}

impl RotationSink for ModeKnob<'_> {
    fn clockwise(&self) {
        self.ctx.set_mode(self.ctx.get_mode().next());
    }

    fn counter_clockwise(&self) {
        self.ctx.set_mode(self.ctx.get_mode().previous());
    }
}

/// Flips the mute flag. The owner re-applies the radio routing afterwards
/// (see [`Alarm::sync_radio_routing`](crate::alarm::Alarm::sync_radio_routing)).
pub struct MuteButton<'a> {
    ctx: &'a ClockContext,
}

impl<'a> MuteButton<'a> {
    pub fn new(ctx: &'a ClockContext) -> Self {
        Self { ctx }
    }
}

impl PressSink for MuteButton<'_> {
    fn pressed(&self) {
        self.ctx.set_radio_muted(!self.ctx.radio_muted());
    }
}
