mod common;

use std::cell::RefCell;
use std::rc::Rc;

use clock_core::alarm::{volume_duty, FrequencyGenerator};
use clock_core::config::ToneConfig;
use clock_core::{Alarm, AlarmState, ClockContext, LedMode, LightPipeline};
use approx::assert_abs_diff_eq;
use clock_viz::{FrameOutcome, RGB8};
use common::*;

type TestPipeline =
    LightPipeline<'static, ToneSource, RecordingStrip, TickClock, NoDelay, SAMPLE_COUNT, LEDS>;
type TestAlarm = Alarm<'static, FakePwm, FakeTimer, FakeRadio>;

fn context() -> &'static ClockContext {
    let ctx: &'static ClockContext = Box::leak(Box::new(ClockContext::new()));
    ctx.set_radio_muted(false);
    ctx
}

fn pipeline(ctx: &'static ClockContext, strip: RecordingStrip) -> TestPipeline {
    LightPipeline::new(
        ctx,
        ToneSource::new(),
        strip,
        TickClock::default(),
        NoDelay::default(),
        pipeline_config(),
    )
    .unwrap()
}

fn alarm(ctx: &'static ClockContext) -> TestAlarm {
    Alarm::new(
        ctx,
        FakePwm::default(),
        FakeTimer::default(),
        FakeTimer::default(),
        FakeRadio::default(),
        ToneConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_spectrum_frame_writes_every_led() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());

    let outcome = pipeline.run_once().unwrap();

    assert_eq!(outcome, Some(FrameOutcome::Complete { yields: 0 }));
    assert_eq!(pipeline.renderer().strip().writes.len(), LEDS);
    assert_eq!(pipeline.renderer().strip().attach_calls, 1);
    assert_eq!(pipeline.applied_mode(), LedMode::Spectrum);

    let spectrum = pipeline.analyzer().spectrum();
    assert_abs_diff_eq!(spectrum.resolution_hz(), 162.76, epsilon = 0.01);
    assert_abs_diff_eq!(spectrum.bin_frequency(8), 1302.08, epsilon = 0.05);
    let peak = (1..SAMPLE_COUNT / 2)
        .max_by(|&a, &b| spectrum.magnitudes()[a].total_cmp(&spectrum.magnitudes()[b]))
        .unwrap();
    assert_eq!(peak, 8);
}

#[test]
fn test_test_tone_blocks_strip_writes_until_it_ends() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());
    let mut alarm = alarm(ctx);

    pipeline.run_once().unwrap();
    let before = pipeline.renderer().strip().writes.len();

    alarm.begin_test_tone(1).unwrap();
    assert!(ctx.alarm_sounding());
    assert_eq!(ctx.effective_mode(), LedMode::Off);
    assert!(alarm.radio().high_impedance);
    assert!(alarm.pwm().enabled);
    let (pattern_timer, tone_timer) = alarm.timers();
    assert_eq!(pattern_timer.period_us, Some(125_000));
    assert_eq!(tone_timer.period_us, Some(FrequencyGenerator::half_period_us(880)));

    for _ in 0..5 {
        assert_eq!(pipeline.run_once().unwrap(), None);
    }
    assert_eq!(pipeline.renderer().strip().writes.len(), before);
    assert_eq!(pipeline.renderer().strip().release_calls, 1);
    assert_eq!(ctx.get_mode(), LedMode::Spectrum);

    alarm.end_test_tone();
    assert_eq!(alarm.state(), AlarmState::Off);
    assert!(!alarm.radio().high_impedance);
    assert!(!alarm.pwm().enabled);
    assert_eq!(alarm.timers().0.period_us, None);
    assert_eq!(alarm.timers().1.period_us, None);

    pipeline.run_once().unwrap();
    assert_eq!(pipeline.renderer().strip().writes.len(), before + LEDS);
    assert_eq!(pipeline.renderer().strip().attach_calls, 2);
}

#[test]
fn test_alarm_starting_mid_frame_stops_the_frame() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let alarm = Rc::new(RefCell::new(alarm(ctx)));

    let hooked = alarm.clone();
    let strip = RecordingStrip {
        after_write: Some(Box::new(move |count| {
            if count == 3 {
                hooked.borrow_mut().begin_test_tone(0).unwrap();
            }
        })),
        ..Default::default()
    };
    let mut pipeline = pipeline(ctx, strip);

    let outcome = pipeline.run_once().unwrap();

    assert_eq!(outcome, Some(FrameOutcome::Interrupted { written: 3 }));
    assert_eq!(pipeline.renderer().strip().writes.len(), 3);
    assert_eq!(alarm.borrow().state(), AlarmState::Test);
}

#[test]
fn test_alarm_starting_while_attaching_releases_the_line() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let alarm = Rc::new(RefCell::new(alarm(ctx)));

    let hooked = alarm.clone();
    let strip = RecordingStrip {
        on_first_attach: Some(Box::new(move || {
            hooked.borrow_mut().begin_test_tone(0).unwrap();
        })),
        ..Default::default()
    };
    let mut pipeline = pipeline(ctx, strip);

    assert_eq!(pipeline.run_once().unwrap(), None);
    assert!(!pipeline.renderer().is_attached());
    assert!(pipeline.renderer().strip().writes.is_empty());
    assert_eq!(pipeline.renderer().strip().release_calls, 1);
    assert_eq!(pipeline.sampler().source().position, 0);

    // Still sounding: the line is not enabled again.
    assert_eq!(pipeline.run_once().unwrap(), None);
    assert_eq!(pipeline.renderer().strip().attach_calls, 1);

    alarm.borrow_mut().end_test_tone();
    assert_eq!(
        pipeline.run_once().unwrap(),
        Some(FrameOutcome::Complete { yields: 0 })
    );
    assert_eq!(pipeline.renderer().strip().writes.len(), LEDS);
}

#[test]
fn test_scheduled_alarm_restores_stored_mode() {
    let ctx = context();
    ctx.set_mode(LedMode::Constant);
    let amber = RGB8::new(255, 120, 0);
    ctx.set_constant_color(amber);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());
    let mut alarm = alarm(ctx);

    alarm.trigger();
    assert_eq!(alarm.state(), AlarmState::Off);

    alarm.enable();
    alarm.trigger();
    assert_eq!(alarm.state(), AlarmState::Sounding);
    assert_eq!(pipeline.run_once().unwrap(), None);
    assert!(pipeline.renderer().strip().writes.is_empty());

    alarm.snooze();
    assert_eq!(alarm.state(), AlarmState::Snoozed);
    assert_eq!(ctx.effective_mode(), LedMode::Constant);
    pipeline.run_once().unwrap();
    assert_eq!(pipeline.renderer().strip().writes, vec![vec![amber; LEDS]]);

    alarm.trigger();
    assert_eq!(alarm.state(), AlarmState::Sounding);
    alarm.disable();
    assert_eq!(alarm.state(), AlarmState::Off);
    assert!(!alarm.radio().high_impedance);
}

#[test]
fn test_muted_radio_stays_high_impedance_after_alarm() {
    let ctx = context();
    ctx.set_radio_muted(true);
    let mut alarm = alarm(ctx);

    alarm.begin_test_tone(0).unwrap();
    assert!(alarm.radio().high_impedance);
    alarm.end_test_tone();

    assert!(alarm.radio().high_impedance);
    assert_eq!(alarm.radio().updates, 2);
}

#[test]
fn test_test_tone_resumes_previous_state() {
    let ctx = context();
    let mut alarm = alarm(ctx);
    alarm.enable();

    alarm.begin_test_tone(2).unwrap();
    alarm.begin_test_tone(0).unwrap();
    assert_eq!(alarm.state(), AlarmState::Test);
    alarm.end_test_tone();

    assert_eq!(alarm.state(), AlarmState::Armed);
    assert!(!alarm.pwm().enabled);
}

#[test]
fn test_tone_alternates_duty_and_follows_pattern() {
    let ctx = context();
    let mut alarm = alarm(ctx);
    let high = volume_duty(1023, ToneConfig::default().volume);

    alarm.begin_test_tone(0).unwrap();
    assert_eq!(alarm.tone(), Some(2000));

    alarm.on_tone_tick();
    assert_eq!(alarm.pwm().duty, high);
    alarm.on_tone_tick();
    assert_eq!(alarm.pwm().duty, 0);
    alarm.on_tone_tick();
    assert_eq!(alarm.pwm().duty, high);

    // Hold keeps the tone timer running untouched.
    alarm.on_pattern_tick();
    assert_eq!(alarm.tone(), Some(2000));
    assert_eq!(alarm.timers().1.starts, 1);

    // Silence stops it and parks the line low.
    alarm.on_pattern_tick();
    assert_eq!(alarm.tone(), None);
    assert_eq!(alarm.timers().1.period_us, None);
    assert_eq!(alarm.pwm().duty, 0);
    alarm.on_tone_tick();
    assert_eq!(alarm.pwm().duty, 0);

    alarm.on_pattern_tick();
    assert_eq!(alarm.tone(), Some(2000));
    assert_eq!(alarm.timers().1.starts, 2);
}

#[test]
fn test_volume_and_pattern_are_validated() {
    let ctx = context();
    let mut alarm = alarm(ctx);

    assert!(alarm.set_volume(0).is_err());
    assert!(alarm.set_volume(16).is_err());
    alarm.set_volume(15).unwrap();
    assert!(alarm.set_pattern(9).is_err());
    alarm.set_pattern(2).unwrap();
    assert!(alarm.begin_test_tone(9).is_err());
    assert_eq!(alarm.state(), AlarmState::Off);
    assert_eq!(alarm.config().pattern, 2);
    assert_eq!(alarm.config().volume, 15);
}

#[test]
fn test_leaving_spectrum_blanks_and_releases() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());
    pipeline.run_once().unwrap();

    ctx.set_mode(LedMode::Off);
    pipeline.run_once().unwrap();
    pipeline.run_once().unwrap();

    let strip = pipeline.renderer().strip();
    assert_eq!(strip.writes.len(), LEDS + 1);
    assert_eq!(strip.writes.last().unwrap(), &vec![RGB8::new(0, 0, 0); LEDS]);
    assert_eq!(strip.release_calls, 1);
}

#[test]
fn test_muting_radio_turns_spectrum_off() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());
    pipeline.run_once().unwrap();

    ctx.set_radio_muted(true);
    assert_eq!(pipeline.run_once().unwrap(), None);
    assert_eq!(pipeline.applied_mode(), LedMode::Off);
    assert_eq!(pipeline.renderer().strip().release_calls, 1);
}

#[test]
fn test_strip_released_by_alarm_is_blanked_once_alarm_ends() {
    let ctx = context();
    ctx.set_mode(LedMode::Spectrum);
    let mut pipeline = pipeline(ctx, RecordingStrip::default());
    let mut alarm = alarm(ctx);
    pipeline.run_once().unwrap();

    alarm.begin_test_tone(0).unwrap();
    pipeline.run_once().unwrap();
    ctx.set_mode(LedMode::Off);
    alarm.end_test_tone();
    pipeline.run_once().unwrap();

    let strip = pipeline.renderer().strip();
    assert_eq!(strip.writes.len(), LEDS + 1);
    assert_eq!(strip.writes.last().unwrap(), &vec![RGB8::new(0, 0, 0); LEDS]);
    assert_eq!(strip.attach_calls, 2);
    assert_eq!(strip.release_calls, 2);
}
