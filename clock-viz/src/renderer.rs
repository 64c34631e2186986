use clock_dsp::{ConfigError, Spectrum};
use embedded_hal::delay::DelayNs;
use smart_leds::{SmartLedsWrite, RGB8};

#[cfg(feature = "logging")]
use defmt::trace;

use crate::band_mapper::BandMapper;
use crate::color_mapper::PhaseColorMapper;

const BLACK: RGB8 = RGB8::new(0, 0, 0);

/// Work on a single LED longer than this triggers a cooperative pause.
pub const YIELD_THRESHOLD_MS: u64 = 100;
/// Length of the cooperative pause.
pub const YIELD_PAUSE_MS: u32 = 1;

/// Electrical control of the strip's data line.
///
/// `release` puts the line in high-impedance so a powered-down LED controller
/// is not fed current; `attach` hands it back to the driver.
pub trait StripLine {
    fn attach(&mut self);
    fn release(&mut self);
}

/// Monotonic millisecond clock.
pub trait Millis {
    fn now_ms(&self) -> u64;
}

/// Checked before every strip write. Returning `false` aborts the frame.
pub trait WriteGate {
    fn writes_allowed(&self) -> bool;
}

impl<F: Fn() -> bool> WriteGate for F {
    fn writes_allowed(&self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldPolicy {
    pub threshold_ms: u64,
    pub pause_ms: u32,
}

impl Default for YieldPolicy {
    fn default() -> Self {
        Self {
            threshold_ms: YIELD_THRESHOLD_MS,
            pause_ms: YIELD_PAUSE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum FrameOutcome {
    /// Every LED was written. `yields` counts the pauses taken.
    Complete { yields: u16 },
    /// The gate closed; `written` LEDs had been flushed before it did.
    Interrupted { written: usize },
}

/// Pushes colors to an LED strip one unit at a time.
///
/// Each LED is written and flushed on its own because the strip driver needs
/// per-unit timing, so a full spectrum frame is `LEDS` transactions.
pub struct Renderer<W, const N: usize, const LEDS: usize> {
    strip: W,
    frame: [RGB8; LEDS],
    attached: bool,
    bands: BandMapper<N>,
    colors: PhaseColorMapper,
    policy: YieldPolicy,
}

impl<W, const N: usize, const LEDS: usize> Renderer<W, N, LEDS>
where
    W: SmartLedsWrite<Color = RGB8> + StripLine,
{
    pub fn new(
        strip: W,
        phase_scale: f32,
        colors: PhaseColorMapper,
        policy: YieldPolicy,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            strip,
            frame: [BLACK; LEDS],
            attached: false,
            bands: BandMapper::new(LEDS, phase_scale)?,
            colors,
            policy,
        })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn frame(&self) -> &[RGB8; LEDS] {
        &self.frame
    }

    pub fn bands(&self) -> &BandMapper<N> {
        &self.bands
    }

    pub fn strip(&self) -> &W {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut W {
        &mut self.strip
    }

    /// Hand the data line back to the driver if it was released.
    pub fn attach(&mut self) {
        if !self.attached {
            self.strip.attach();
            self.attached = true;
        }
    }

    /// Blank the strip, then release the data line.
    pub fn shutdown(&mut self) -> Result<(), W::Error> {
        if self.attached {
            self.frame = [BLACK; LEDS];
            let result = self.strip.write(self.frame.iter().cloned());
            self.strip.release();
            self.attached = false;
            result?;
        }
        Ok(())
    }

    /// Release the data line without touching the LEDs.
    pub fn release(&mut self) {
        if self.attached {
            self.strip.release();
            self.attached = false;
        }
    }

    pub fn render_constant<G: WriteGate>(
        &mut self,
        color: RGB8,
        gate: &G,
    ) -> Result<FrameOutcome, W::Error> {
        if !gate.writes_allowed() {
            return Ok(FrameOutcome::Interrupted { written: 0 });
        }
        self.frame = [color; LEDS];
        self.strip.write(self.frame.iter().cloned())?;
        Ok(FrameOutcome::Complete { yields: 0 })
    }

    pub fn render_spectrum<C, D, G>(
        &mut self,
        spectrum: &Spectrum<N>,
        clock: &C,
        delay: &mut D,
        gate: &G,
    ) -> Result<FrameOutcome, W::Error>
    where
        C: Millis,
        D: DelayNs,
        G: WriteGate,
    {
        let mut yields = 0u16;

        for led in 0..LEDS {
            let start = clock.now_ms();

            let band = self.bands.reduce(spectrum, led);
            self.frame[led] = self.colors.map(&band);

            if !gate.writes_allowed() {
                return Ok(FrameOutcome::Interrupted { written: led });
            }
            self.strip.write(self.frame.iter().cloned())?;

            let elapsed = clock.now_ms().wrapping_sub(start);
            if elapsed > self.policy.threshold_ms {
                #[cfg(feature = "logging")]
                trace!("led {} took {} ms, yielding", led, elapsed);
                delay.delay_ms(self.policy.pause_ms);
                yields = yields.saturating_add(1);
            }
        }

        Ok(FrameOutcome::Complete { yields })
    }
}
