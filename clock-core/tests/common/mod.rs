#![allow(dead_code)]

use std::cell::Cell;
use std::convert::Infallible;

use clock_core::config::{PipelineConfig, SAMPLING_PERIOD_US};
use clock_core::{PeriodicTimer, RadioOutputStage, TonePwm};
use clock_dsp::SampleSource;
use clock_viz::{Millis, StripLine, RGB8};
use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use smart_leds::SmartLedsWrite;
use wavegen::{dc_bias, sine, wf};

pub const SAMPLE_COUNT: usize = 128;
pub const LEDS: usize = 16;

/// 12-bit ADC replaying a biased 1.3 kHz sine.
pub struct ToneSource {
    samples: Vec<u16>,
    pub position: usize,
}

impl ToneSource {
    pub fn new() -> Self {
        let rate = 1_000_000.0 / SAMPLING_PERIOD_US as f32;
        let waveform = wf!(f32, rate, sine!(1302.08, 1500.0), dc_bias!(2048.0));
        let samples = waveform
            .iter()
            .take(SAMPLE_COUNT)
            .map(|v| v.round().clamp(0.0, 4095.0) as u16)
            .collect();
        Self {
            samples,
            position: 0,
        }
    }
}

impl SampleSource for ToneSource {
    fn max_value(&self) -> u16 {
        4095
    }

    fn read_sample(&mut self) -> u16 {
        let sample = self.samples[self.position];
        self.position = (self.position + 1) % self.samples.len();
        sample
    }
}

/// Strip that records every frame written. Hooks run after each write and
/// on the first attach.
#[derive(Default)]
pub struct RecordingStrip {
    pub writes: Vec<Vec<RGB8>>,
    pub attach_calls: usize,
    pub release_calls: usize,
    pub after_write: Option<Box<dyn FnMut(usize)>>,
    pub on_first_attach: Option<Box<dyn FnOnce()>>,
}

impl SmartLedsWrite for RecordingStrip {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.writes.push(iterator.into_iter().map(Into::into).collect());
        let count = self.writes.len();
        if let Some(hook) = self.after_write.as_mut() {
            hook(count);
        }
        Ok(())
    }
}

impl StripLine for RecordingStrip {
    fn attach(&mut self) {
        self.attach_calls += 1;
        if let Some(hook) = self.on_first_attach.take() {
            hook();
        }
    }

    fn release(&mut self) {
        self.release_calls += 1;
    }
}

/// Advances one millisecond per reading.
#[derive(Default)]
pub struct TickClock(Cell<u64>);

impl Millis for TickClock {
    fn now_ms(&self) -> u64 {
        let now = self.0.get();
        self.0.set(now + 1);
        now
    }
}

#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

#[derive(Debug, Default)]
pub struct FakePwm {
    pub enabled: bool,
    pub duty: u16,
    pub duty_log: Vec<u16>,
}

impl ErrorType for FakePwm {
    type Error = Infallible;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        self.duty_log.push(duty);
        Ok(())
    }
}

impl TonePwm for FakePwm {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn release(&mut self) {
        self.enabled = false;
    }
}

#[derive(Debug, Default)]
pub struct FakeTimer {
    pub period_us: Option<u32>,
    pub starts: usize,
}

impl PeriodicTimer for FakeTimer {
    fn start(&mut self, period_us: u32) {
        self.period_us = Some(period_us);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.period_us = None;
    }
}

#[derive(Debug, Default)]
pub struct FakeRadio {
    pub high_impedance: bool,
    pub updates: usize,
}

impl RadioOutputStage for FakeRadio {
    type Error = Infallible;

    fn set_high_impedance(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.high_impedance = enabled;
        self.updates += 1;
        Ok(())
    }
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig::default()
}
