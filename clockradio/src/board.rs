use clock_core::{GatedPwm, PeriodicTimer};
use clock_dsp::SampleSource;
use clock_viz::{Millis, StripLine};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Instant;
use esp_hal::{
    analog::adc::{Adc, AdcPin},
    gpio::{GpioPin, Output},
    ledc::{channel::Channel, LowSpeed},
    peripherals::ADC1,
    spi::master::Spi,
    Blocking,
};
use smart_leds::{SmartLedsWrite, RGB8};
use ws2812_spi::Ws2812;

use crate::config::ADC_BITS;

/// Microphone input on ADC1 channel 0, scaled to 16 bits.
pub struct MicAdc {
    adc: Adc<'static, ADC1>,
    pin: AdcPin<GpioPin<1>, ADC1>,
}

impl MicAdc {
    pub fn new(adc: Adc<'static, ADC1>, pin: AdcPin<GpioPin<1>, ADC1>) -> Self {
        Self { adc, pin }
    }
}

impl SampleSource for MicAdc {
    fn max_value(&self) -> u16 {
        (((1u32 << ADC_BITS) - 1) << (16 - ADC_BITS)) as u16
    }

    fn read_sample(&mut self) -> u16 {
        let raw = nb::block!(self.adc.read_oneshot(&mut self.pin)).unwrap_or(0);
        raw << (16 - ADC_BITS)
    }
}

pub struct EmbassyClock;

impl Millis for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

type StripDriver = Ws2812<Spi<'static, Blocking>>;

/// WS2812 chain behind a level shifter whose output enable floats the
/// data line when the strip is off.
pub struct LightStrip {
    leds: StripDriver,
    output_enable: Output<'static>,
}

impl LightStrip {
    pub fn new(spi: Spi<'static, Blocking>, mut output_enable: Output<'static>) -> Self {
        output_enable.set_high();
        Self {
            leds: Ws2812::new(spi),
            output_enable,
        }
    }
}

impl SmartLedsWrite for LightStrip {
    type Error = <StripDriver as SmartLedsWrite>::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.leds.write(iterator)
    }
}

impl StripLine for LightStrip {
    fn attach(&mut self) {
        self.output_enable.set_low();
    }

    fn release(&mut self) {
        self.output_enable.set_high();
    }
}

/// LEDC channel feeding the speaker through a tri-state buffer. The
/// buffer's active-low output enable floats the line while released.
pub type Speaker = GatedPwm<Channel<'static, LowSpeed>, Output<'static>>;

#[derive(Clone, Copy)]
pub enum TimerCommand {
    Start { period_us: u32 },
    Stop,
}

pub type TimerSignal = Signal<CriticalSectionRawMutex, TimerCommand>;

/// Periodic timer backed by a ticker task on the interrupt executor.
pub struct SignalTimer {
    commands: &'static TimerSignal,
}

impl SignalTimer {
    pub fn new(commands: &'static TimerSignal) -> Self {
        Self { commands }
    }
}

impl PeriodicTimer for SignalTimer {
    fn start(&mut self, period_us: u32) {
        self.commands.signal(TimerCommand::Start { period_us });
    }

    fn stop(&mut self) {
        self.commands.signal(TimerCommand::Stop);
    }
}
