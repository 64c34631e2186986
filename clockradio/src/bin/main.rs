#![no_std]
#![no_main]

use core::cell::RefCell;

use clock_core::config::{PipelineConfig, ToneConfig, LED_COUNT, SAMPLE_COUNT};
use clock_core::panel::{ModeKnob, MuteButton};
use clock_core::{Alarm, AlarmState, ClockContext, LightPipeline, Rda5807Output};
use clock_input::{ButtonAction, ButtonDebouncer, DebounceConfig, Edge, PressSink, Pull, QuadratureDecoder};
use clockradio::board::{
    EmbassyClock, LightStrip, MicAdc, SignalTimer, Speaker, TimerCommand, TimerSignal,
};
use clockradio::config::{RADIO_I2C_RATE, SPEAKER_CARRIER, STRIP_SPI_RATE};
use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::{task, Spawner};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_time::{Delay, Duration, Ticker};
use esp_backtrace as _;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, Attenuation},
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig},
    i2c::master::I2c,
    interrupt::{software::SoftwareInterruptControl, Priority},
    ledc::{
        channel::{self, ChannelIFace as _},
        timer::{self, TimerIFace as _},
        LSGlobalClkSource, Ledc, LowSpeed,
    },
    spi::{master::Spi, Mode},
    timer::timg::TimerGroup,
    Blocking,
};
use esp_hal_embassy::InterruptExecutor;

type SpeakerAlarm = Alarm<'static, Speaker, SignalTimer, Rda5807Output<I2c<'static, Blocking>>>;
type SharedAlarm = Mutex<CriticalSectionRawMutex, RefCell<SpeakerAlarm>>;

static CONTEXT: ClockContext = ClockContext::new();
static PATTERN_TIMER: TimerSignal = TimerSignal::new();
static TONE_TIMER: TimerSignal = TimerSignal::new();

/// Macro to create static variables
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

/// Runs one alarm timer: waits for a start command, then ticks until
/// stopped or restarted with a new period.
async fn run_timer(commands: &'static TimerSignal, alarm: &'static SharedAlarm, on_tick: fn(&mut SpeakerAlarm)) {
    let mut period_us = None;
    loop {
        let Some(period) = period_us else {
            if let TimerCommand::Start { period_us: p } = commands.wait().await {
                period_us = Some(p);
            }
            continue;
        };

        let mut ticker = Ticker::every(Duration::from_micros(u64::from(period)));
        loop {
            match select(commands.wait(), ticker.next()).await {
                Either::First(TimerCommand::Start { period_us: p }) => {
                    period_us = Some(p);
                    break;
                }
                Either::First(TimerCommand::Stop) => {
                    period_us = None;
                    break;
                }
                Either::Second(()) => alarm.lock(|a| on_tick(&mut a.borrow_mut())),
            }
        }
    }
}

#[task]
async fn pattern_timer_task(alarm: &'static SharedAlarm) {
    run_timer(&PATTERN_TIMER, alarm, SpeakerAlarm::on_pattern_tick).await
}

#[task]
async fn tone_timer_task(alarm: &'static SharedAlarm) {
    run_timer(&TONE_TIMER, alarm, SpeakerAlarm::on_tone_tick).await
}

#[task]
async fn encoder_task(mut clk: Input<'static>, mut dir: Input<'static>) {
    info!("encoder_task: starting!");
    let mut encoder = QuadratureDecoder::new(Pull::Up, ModeKnob::new(&CONTEXT));
    loop {
        select(clk.wait_for_any_edge(), dir.wait_for_any_edge()).await;
        encoder.on_edge(clk.is_high(), dir.is_high());
    }
}

/// Waits for one edge, then re-checks the level until the debouncer settles.
async fn debounce_once<S: PressSink>(pin: &mut Input<'static>, button: &mut ButtonDebouncer<S>) {
    let edge = match button.awaited_edge() {
        Some(Edge::Falling) => {
            pin.wait_for_falling_edge().await;
            Edge::Falling
        }
        Some(Edge::Rising) => {
            pin.wait_for_rising_edge().await;
            Edge::Rising
        }
        None => return,
    };
    if button.on_edge(edge) != ButtonAction::StartRecheck {
        return;
    }

    let period = Duration::from_millis(u64::from(button.config().period_ms));
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        if button.on_recheck(pin.is_high()) != ButtonAction::KeepChecking {
            break;
        }
    }
}

#[task]
async fn mute_button_task(mut pin: Input<'static>, alarm: &'static SharedAlarm) {
    info!("mute_button_task: starting!");
    let mut button = ButtonDebouncer::new(Pull::Up, DebounceConfig::default(), MuteButton::new(&CONTEXT))
        .expect("Invalid debounce config");
    loop {
        let muted = CONTEXT.radio_muted();
        debounce_once(&mut pin, &mut button).await;
        if CONTEXT.radio_muted() != muted {
            info!("radio muted: {}", CONTEXT.radio_muted());
            alarm.lock(|a| a.borrow_mut().sync_radio_routing());
        }
    }
}

#[task]
async fn alarm_button_task(mut pin: Input<'static>, alarm: &'static SharedAlarm) {
    info!("alarm_button_task: starting!");
    let on_press = || {
        alarm.lock(|a| {
            let mut alarm = a.borrow_mut();
            match alarm.state() {
                AlarmState::Sounding => alarm.snooze(),
                AlarmState::Test => alarm.end_test_tone(),
                _ => {
                    let pattern = alarm.config().pattern;
                    if let Err(e) = alarm.begin_test_tone(pattern) {
                        warn!("test tone rejected: {}", e);
                    }
                }
            }
        })
    };
    let mut button = ButtonDebouncer::new(Pull::Up, DebounceConfig::default(), on_press)
        .expect("Invalid debounce config");
    loop {
        debounce_once(&mut pin, &mut button).await;
    }
}

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) {
    info!("Main starting!");

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let timg0 = TimerGroup::new(peripherals.TIMG0);

    info!("Initializing Embassy");
    esp_hal_embassy::init(timg0.timer0);

    // Radio output stage
    let i2c = I2c::new(
        peripherals.I2C0,
        esp_hal::i2c::master::Config::default().with_frequency(RADIO_I2C_RATE),
    )
    .expect("Failed to create I2C")
    .with_sda(peripherals.GPIO8)
    .with_scl(peripherals.GPIO9);
    let radio = Rda5807Output::new(i2c);

    // Speaker PWM
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let speaker_timer = mk_static!(timer::Timer<'static, LowSpeed>, ledc.timer::<LowSpeed>(timer::Number::Timer0));
    speaker_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty10Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: SPEAKER_CARRIER,
        })
        .expect("Failed to configure speaker timer");
    let mut speaker_channel = ledc.channel(channel::Number::Channel0, peripherals.GPIO13);
    speaker_channel
        .configure(channel::config::Config {
            timer: &*speaker_timer,
            duty_pct: 0,
            pin_config: channel::config::PinConfig::PushPull,
        })
        .expect("Failed to configure speaker channel");

    let speaker_enable = Output::new(peripherals.GPIO14, Level::High, OutputConfig::default());

    let alarm = Alarm::new(
        &CONTEXT,
        Speaker::new(speaker_channel, speaker_enable),
        SignalTimer::new(&PATTERN_TIMER),
        SignalTimer::new(&TONE_TIMER),
        radio,
        ToneConfig::default(),
    )
    .expect("Invalid tone config");
    let alarm: &'static SharedAlarm = mk_static!(SharedAlarm, Mutex::new(RefCell::new(alarm)));
    alarm.lock(|a| a.borrow_mut().sync_radio_routing());

    // Front panel
    let pull_up = InputConfig::default().with_pull(esp_hal::gpio::Pull::Up);
    let clk = Input::new(peripherals.GPIO4, pull_up);
    let dir = Input::new(peripherals.GPIO5, pull_up);
    let mute = Input::new(peripherals.GPIO6, pull_up);
    let alarm_button = Input::new(peripherals.GPIO7, pull_up);

    // Edge and timer tasks preempt the light loop.
    let hp_executor = mk_static!(
        InterruptExecutor<2>,
        InterruptExecutor::new(sw_ints.software_interrupt2)
    );
    let high_pri_spawner = hp_executor.start(Priority::Priority3);
    high_pri_spawner
        .spawn(pattern_timer_task(alarm))
        .expect("Failed to spawn pattern_timer_task");
    high_pri_spawner
        .spawn(tone_timer_task(alarm))
        .expect("Failed to spawn tone_timer_task");
    high_pri_spawner
        .spawn(encoder_task(clk, dir))
        .expect("Failed to spawn encoder_task");
    high_pri_spawner
        .spawn(mute_button_task(mute, alarm))
        .expect("Failed to spawn mute_button_task");
    high_pri_spawner
        .spawn(alarm_button_task(alarm_button, alarm))
        .expect("Failed to spawn alarm_button_task");

    // Light pipeline
    let mut adc_config = AdcConfig::new();
    let mic_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);

    let spi = Spi::new(
        peripherals.SPI2,
        esp_hal::spi::master::Config::default()
            .with_frequency(STRIP_SPI_RATE)
            .with_mode(Mode::_0),
    )
    .expect("Failed to create SPI")
    .with_mosi(peripherals.GPIO11);
    let output_enable = Output::new(peripherals.GPIO12, Level::High, OutputConfig::default());

    let pipeline = mk_static!(
        LightPipeline<'static, MicAdc, LightStrip, EmbassyClock, Delay, SAMPLE_COUNT, LED_COUNT>,
        LightPipeline::new(
            &CONTEXT,
            MicAdc::new(adc, mic_pin),
            LightStrip::new(spi, output_enable),
            EmbassyClock,
            Delay,
            PipelineConfig::default(),
        )
        .expect("Invalid pipeline config")
    );

    info!("Starting light pipeline");
    pipeline.run()
}
