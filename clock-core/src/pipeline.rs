use clock_dsp::{ConfigError, SampleBlock, SampleSource, Sampler, SpectralAnalyzer};
use clock_viz::{FrameOutcome, Millis, PhaseColorMapper, Renderer, StripLine};
#[cfg(feature = "logging")]
use defmt::{info, warn};
use embedded_hal::delay::DelayNs;
use smart_leds::{SmartLedsWrite, RGB8};

use crate::config::PipelineConfig;
use crate::context::ClockContext;
use crate::mode::LedMode;

/// The light loop: sample, transform, map and render, gated by the mode.
///
/// Mode changes are picked up at the start of each iteration; a sounding
/// alarm is also checked before every strip write inside a frame.
pub struct LightPipeline<'a, A, W, C, D, const N: usize, const LEDS: usize> {
    ctx: &'a ClockContext,
    sampler: Sampler<A>,
    block: SampleBlock<N>,
    analyzer: SpectralAnalyzer<N>,
    renderer: Renderer<W, N, LEDS>,
    clock: C,
    delay: D,
    config: PipelineConfig,
    applied: LedMode,
    /// The line was released by the alarm with colors still latched.
    stale: bool,
}

impl<'a, A, W, C, D, const N: usize, const LEDS: usize> LightPipeline<'a, A, W, C, D, N, LEDS>
where
    A: SampleSource,
    W: SmartLedsWrite<Color = RGB8> + StripLine,
    C: Millis,
    D: DelayNs,
{
    pub fn new(
        ctx: &'a ClockContext,
        source: A,
        strip: W,
        clock: C,
        delay: D,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        let renderer = Renderer::new(
            strip,
            config.phase_scale,
            PhaseColorMapper::new(config.base_color),
            config.yield_policy,
        )?;

        #[cfg(feature = "logging")]
        info!(
            "light pipeline: {} samples every {} us, {} LEDs, {} bins per LED",
            N,
            config.sampling_period_us,
            LEDS,
            renderer.bands().bins_per_band()
        );

        Ok(Self {
            ctx,
            sampler: Sampler::new(source, config.sampling_period_us),
            block: SampleBlock::new()?,
            analyzer: SpectralAnalyzer::new(config.sampling_period_us)?,
            renderer,
            clock,
            delay,
            config,
            applied: LedMode::Off,
            stale: false,
        })
    }

    /// Mode acted on by the last iteration.
    pub fn applied_mode(&self) -> LedMode {
        self.applied
    }

    pub fn renderer(&self) -> &Renderer<W, N, LEDS> {
        &self.renderer
    }

    pub fn analyzer(&self) -> &SpectralAnalyzer<N> {
        &self.analyzer
    }

    pub fn sampler(&self) -> &Sampler<A> {
        &self.sampler
    }

    /// One iteration. Returns the frame outcome, or `None` when the strip is
    /// off.
    pub fn run_once(&mut self) -> Result<Option<FrameOutcome>, W::Error> {
        let mode = self.ctx.effective_mode();
        if mode != self.applied {
            #[cfg(feature = "logging")]
            info!("led mode {} -> {}", self.applied, mode);
            self.applied = mode;
        }

        let ctx = self.ctx;
        let gate = || !ctx.alarm_sounding();

        match mode {
            LedMode::Off => {
                if ctx.alarm_sounding() {
                    self.yield_to_alarm();
                } else {
                    if self.stale {
                        self.renderer.attach();
                        self.stale = false;
                    }
                    self.renderer.shutdown()?;
                }
                self.delay.delay_ms(self.config.idle_ms);
                Ok(None)
            }
            LedMode::Constant => {
                if !self.attach_for_frame() {
                    return Ok(None);
                }
                let outcome = self.renderer.render_constant(ctx.constant_color(), &gate)?;
                Ok(Some(outcome))
            }
            LedMode::Spectrum => {
                if !self.attach_for_frame() {
                    return Ok(None);
                }
                self.sampler.fill(&mut self.block, &mut self.delay);
                let spectrum = self.analyzer.analyze(&self.block);
                let outcome =
                    self.renderer
                        .render_spectrum(spectrum, &self.clock, &mut self.delay, &gate)?;
                Ok(Some(outcome))
            }
        }
    }

    /// Enables the line for a frame. The alarm may have started since the
    /// mode was read, so the gate is checked on both sides of the enable.
    fn attach_for_frame(&mut self) -> bool {
        if self.ctx.alarm_sounding() {
            self.yield_to_alarm();
            return false;
        }
        self.renderer.attach();
        if self.ctx.alarm_sounding() {
            self.yield_to_alarm();
            return false;
        }
        self.stale = false;
        true
    }

    fn yield_to_alarm(&mut self) {
        self.stale |= self.renderer.is_attached();
        self.renderer.release();
    }

    /// Iterate forever. Strip errors are logged and the next iteration
    /// proceeds.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(_e) = self.run_once() {
                #[cfg(feature = "logging")]
                warn!("light strip write failed");
            }
        }
    }
}
