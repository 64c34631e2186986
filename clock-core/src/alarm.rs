use clock_dsp::ConfigError;
#[cfg(feature = "logging")]
use defmt::{info, warn};
use embedded_hal::pwm::SetDutyCycle;

use crate::config::{ToneConfig, MAX_VOLUME, MIN_VOLUME};
use crate::context::ClockContext;
use crate::radio::RadioOutputStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
#[repr(u8)]
pub enum AlarmState {
    Off = 0,
    Armed = 1,
    Sounding = 2,
    Snoozed = 3,
    /// A tone started from the settings menu, outside the alarm schedule.
    Test = 4,
}

impl AlarmState {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => AlarmState::Armed,
            2 => AlarmState::Sounding,
            3 => AlarmState::Snoozed,
            4 => AlarmState::Test,
            _ => AlarmState::Off,
        }
    }

    /// Sounding states own the PWM line and the speaker.
    pub const fn is_sounding(self) -> bool {
        matches!(self, AlarmState::Sounding | AlarmState::Test)
    }
}

/// One entry of an alarm pattern, played for one pattern tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum PatternStep {
    /// Square wave at this frequency in Hz.
    Tone(u16),
    /// Keep whatever the previous step played.
    Hold,
    Silence,
}

use PatternStep::{Hold, Silence, Tone};

/// Beep-beep, pause.
const DOUBLE_BEEP: [PatternStep; 8] = [
    Tone(2000),
    Hold,
    Silence,
    Tone(2000),
    Hold,
    Silence,
    Silence,
    Silence,
];

/// Rising three-note chirp.
const CHIRP: [PatternStep; 6] = [Tone(880), Tone(1175), Tone(1568), Hold, Silence, Silence];

/// Slow two-tone siren.
const SIREN: [PatternStep; 8] = [Tone(960), Hold, Hold, Hold, Tone(770), Hold, Hold, Hold];

pub const PATTERNS: [&[PatternStep]; 3] = [&DOUBLE_BEEP, &CHIRP, &SIREN];

pub fn pattern(index: usize) -> Result<&'static [PatternStep], ConfigError> {
    PATTERNS
        .get(index)
        .copied()
        .ok_or(ConfigError::UnknownPattern(index))
}

/// Walks a pattern one step per tick, looping.
#[derive(Debug, Clone)]
pub struct PatternTicker {
    steps: &'static [PatternStep],
    position: usize,
    current: Option<u16>,
}

impl PatternTicker {
    pub fn new(steps: &'static [PatternStep]) -> Self {
        Self {
            steps,
            position: 0,
            current: None,
        }
    }

    /// The tone to play until the next tick, `None` for silence.
    pub fn tick(&mut self) -> Option<u16> {
        if self.steps.is_empty() {
            return None;
        }
        match self.steps[self.position] {
            Tone(hz) => self.current = Some(hz),
            Silence => self.current = None,
            Hold => {}
        }
        self.position = (self.position + 1) % self.steps.len();
        self.current
    }

    pub fn current(&self) -> Option<u16> {
        self.current
    }
}

/// Toggles between a high and a zero duty at twice the tone frequency.
#[derive(Debug, Clone, Default)]
pub struct FrequencyGenerator {
    high: bool,
}

impl FrequencyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer period for a tone: one half of its square wave.
    pub fn half_period_us(hz: u16) -> u32 {
        1_000_000 / (2 * u32::from(hz.max(1)))
    }

    pub fn reset(&mut self) {
        self.high = false;
    }

    /// Duty for the half-period that starts now.
    pub fn tick(&mut self, volume_duty: u16) -> u16 {
        self.high = !self.high;
        if self.high {
            volume_duty
        } else {
            0
        }
    }
}

/// Duty of the high half-period for `volume` in 1..=15.
pub fn volume_duty(max_duty: u16, volume: u8) -> u16 {
    (u32::from(max_duty) / 2 * u32::from(volume) / u32::from(MAX_VOLUME)) as u16
}

/// PWM channel driving the speaker.
pub trait TonePwm: SetDutyCycle {
    /// Route the PWM signal to the pin.
    fn enable(&mut self);
    /// Return the pin to a floating input.
    fn release(&mut self);
}

/// A periodic hardware timer calling back into the alarm.
pub trait PeriodicTimer {
    fn start(&mut self, period_us: u32);
    fn stop(&mut self);
}

/// Alarm state machine and the two-timer tone synthesizer behind it.
///
/// While sounding the alarm owns the PWM line: the state is published to the
/// [`ClockContext`] before anything is driven, so the light pipeline has
/// stopped writing by the time the tone starts, and it is published again
/// only after the line has been released.
pub struct Alarm<'a, P, T, R> {
    ctx: &'a ClockContext,
    pwm: P,
    pattern_timer: T,
    tone_timer: T,
    radio: R,
    config: ToneConfig,
    ticker: PatternTicker,
    generator: FrequencyGenerator,
    tone: Option<u16>,
    resume: AlarmState,
    radio_faults: u16,
}

impl<'a, P, T, R> Alarm<'a, P, T, R>
where
    P: TonePwm,
    T: PeriodicTimer,
    R: RadioOutputStage,
{
    pub fn new(
        ctx: &'a ClockContext,
        pwm: P,
        pattern_timer: T,
        tone_timer: T,
        radio: R,
        config: ToneConfig,
    ) -> Result<Self, ConfigError> {
        check_volume(config.volume)?;
        let steps = pattern(config.pattern)?;

        Ok(Self {
            ctx,
            pwm,
            pattern_timer,
            tone_timer,
            radio,
            config,
            ticker: PatternTicker::new(steps),
            generator: FrequencyGenerator::new(),
            tone: None,
            resume: AlarmState::Off,
            radio_faults: 0,
        })
    }

    pub fn state(&self) -> AlarmState {
        self.ctx.alarm_state()
    }

    pub fn config(&self) -> ToneConfig {
        self.config
    }

    /// Tone currently being synthesized.
    pub fn tone(&self) -> Option<u16> {
        self.tone
    }

    /// Radio register updates that failed since start-up.
    pub fn radio_faults(&self) -> u16 {
        self.radio_faults
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn timers(&self) -> (&T, &T) {
        (&self.pattern_timer, &self.tone_timer)
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn set_volume(&mut self, volume: u8) -> Result<(), ConfigError> {
        check_volume(volume)?;
        self.config.volume = volume;
        Ok(())
    }

    /// Pattern for scheduled alarms. Takes effect the next time it sounds.
    pub fn set_pattern(&mut self, index: usize) -> Result<(), ConfigError> {
        pattern(index)?;
        self.config.pattern = index;
        Ok(())
    }

    pub fn enable(&mut self) {
        if self.state() == AlarmState::Off {
            self.transition(AlarmState::Armed, self.config.pattern);
        }
    }

    pub fn disable(&mut self) {
        self.transition(AlarmState::Off, self.config.pattern);
    }

    /// The alarm time or the snooze delay has come.
    pub fn trigger(&mut self) {
        if matches!(self.state(), AlarmState::Armed | AlarmState::Snoozed) {
            self.transition(AlarmState::Sounding, self.config.pattern);
        }
    }

    pub fn snooze(&mut self) {
        if self.state() == AlarmState::Sounding {
            self.transition(AlarmState::Snoozed, self.config.pattern);
        }
    }

    pub fn begin_test_tone(&mut self, index: usize) -> Result<(), ConfigError> {
        pattern(index)?;
        let current = self.state();
        if current != AlarmState::Test {
            self.resume = current;
        }
        self.transition(AlarmState::Test, index);
        Ok(())
    }

    pub fn end_test_tone(&mut self) {
        if self.state() == AlarmState::Test {
            self.transition(self.resume, self.config.pattern);
        }
    }

    /// Re-apply the radio routing after the mute flag changed.
    pub fn sync_radio_routing(&mut self) {
        let high_impedance = self.state().is_sounding() || self.ctx.radio_muted();
        self.set_radio_high_impedance(high_impedance);
    }

    /// Pattern timer callback.
    pub fn on_pattern_tick(&mut self) {
        if !self.state().is_sounding() {
            return;
        }
        let next = self.ticker.tick();
        if next == self.tone {
            return;
        }

        self.tone = next;
        self.generator.reset();
        match next {
            Some(hz) => self.tone_timer.start(FrequencyGenerator::half_period_us(hz)),
            None => {
                self.tone_timer.stop();
                self.drive(0);
            }
        }
    }

    /// Frequency timer callback.
    pub fn on_tone_tick(&mut self) {
        if self.tone.is_none() || !self.state().is_sounding() {
            return;
        }
        let duty = self
            .generator
            .tick(volume_duty(self.pwm.max_duty_cycle(), self.config.volume));
        self.drive(duty);
    }

    fn transition(&mut self, next: AlarmState, pattern_index: usize) {
        let current = self.state();
        #[cfg(feature = "logging")]
        info!("alarm {} -> {}", current, next);

        match (current.is_sounding(), next.is_sounding()) {
            (false, true) => {
                self.ctx.set_alarm_state(next);
                self.set_radio_high_impedance(true);
                self.pwm.enable();
                self.start_pattern(pattern_index);
            }
            (true, true) => {
                self.ctx.set_alarm_state(next);
                self.start_pattern(pattern_index);
            }
            (true, false) => {
                self.silence();
                self.pwm.release();
                self.set_radio_high_impedance(self.ctx.radio_muted());
                self.ctx.set_alarm_state(next);
            }
            (false, false) => self.ctx.set_alarm_state(next),
        }
    }

    fn start_pattern(&mut self, index: usize) {
        self.silence();
        // Indices are validated before a transition is requested.
        if let Ok(steps) = pattern(index) {
            self.ticker = PatternTicker::new(steps);
        }
        self.pattern_timer.start(self.config.pattern_tick_ms * 1_000);
        self.on_pattern_tick();
    }

    fn silence(&mut self) {
        self.pattern_timer.stop();
        self.tone_timer.stop();
        self.tone = None;
        self.generator.reset();
        self.drive(0);
    }

    fn drive(&mut self, duty: u16) {
        if let Err(_e) = self.pwm.set_duty_cycle(duty) {
            #[cfg(feature = "logging")]
            warn!("tone duty update failed: {}", defmt::Debug2Format(&_e));
        }
    }

    fn set_radio_high_impedance(&mut self, enabled: bool) {
        if let Err(_e) = self.radio.set_high_impedance(enabled) {
            self.radio_faults = self.radio_faults.saturating_add(1);
            #[cfg(feature = "logging")]
            warn!("radio output stage update failed: {}", defmt::Debug2Format(&_e));
        }
    }
}

fn check_volume(volume: u8) -> Result<(), ConfigError> {
    if (MIN_VOLUME..=MAX_VOLUME).contains(&volume) {
        Ok(())
    } else {
        Err(ConfigError::VolumeOutOfRange(volume))
    }
}
