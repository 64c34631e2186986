#[cfg(feature = "logging")]
use defmt::warn;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::alarm::TonePwm;

/// PWM channel behind a tri-state buffer with an active-low output enable.
///
/// Released, the buffer output is high impedance and the duty is parked at
/// zero; duty updates are ignored until [`TonePwm::enable`].
pub struct GatedPwm<P, E> {
    pwm: P,
    output_enable: E,
    enabled: bool,
}

impl<P: SetDutyCycle, E: OutputPin> GatedPwm<P, E> {
    /// Takes the channel and enable pin and starts released.
    pub fn new(pwm: P, output_enable: E) -> Self {
        let mut gated = Self {
            pwm,
            output_enable,
            enabled: true,
        };
        gated.release();
        gated
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn output_enable(&self) -> &E {
        &self.output_enable
    }
}

impl<P: SetDutyCycle, E> ErrorType for GatedPwm<P, E> {
    type Error = P::Error;
}

impl<P: SetDutyCycle, E: OutputPin> SetDutyCycle for GatedPwm<P, E> {
    fn max_duty_cycle(&self) -> u16 {
        self.pwm.max_duty_cycle()
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = if self.enabled { duty } else { 0 };
        self.pwm.set_duty_cycle(duty)
    }
}

impl<P: SetDutyCycle, E: OutputPin> TonePwm for GatedPwm<P, E> {
    fn enable(&mut self) {
        if let Err(_e) = self.output_enable.set_low() {
            #[cfg(feature = "logging")]
            warn!("speaker enable failed: {}", defmt::Debug2Format(&_e));
            return;
        }
        self.enabled = true;
    }

    fn release(&mut self) {
        self.enabled = false;
        if let Err(_e) = self.pwm.set_duty_cycle(0) {
            #[cfg(feature = "logging")]
            warn!("speaker duty park failed: {}", defmt::Debug2Format(&_e));
        }
        if let Err(_e) = self.output_enable.set_high() {
            #[cfg(feature = "logging")]
            warn!("speaker release failed: {}", defmt::Debug2Format(&_e));
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    #[derive(Default)]
    struct Channel {
        duty: Option<u16>,
        writes: usize,
    }

    impl ErrorType for Channel {
        type Error = Infallible;
    }

    impl SetDutyCycle for Channel {
        fn max_duty_cycle(&self) -> u16 {
            1023
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = Some(duty);
            self.writes += 1;
            Ok(())
        }
    }

    /// Records the enable line level; `high` means the buffer is tri-stated.
    #[derive(Default)]
    struct EnablePin {
        high: Option<bool>,
        fail: bool,
    }

    impl embedded_hal::digital::ErrorType for EnablePin {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for EnablePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(embedded_hal::digital::ErrorKind::Other);
            }
            self.high = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(embedded_hal::digital::ErrorKind::Other);
            }
            self.high = Some(true);
            Ok(())
        }
    }

    #[test]
    fn test_starts_floating_with_duty_parked() {
        let speaker = GatedPwm::new(Channel::default(), EnablePin::default());
        assert!(!speaker.is_enabled());
        assert_eq!(speaker.output_enable().high, Some(true));
        assert_eq!(speaker.pwm().duty, Some(0));
    }

    #[test]
    fn test_release_floats_the_line() {
        let mut speaker = GatedPwm::new(Channel::default(), EnablePin::default());
        speaker.enable();
        assert_eq!(speaker.output_enable().high, Some(false));
        speaker.set_duty_cycle(300).unwrap();
        assert_eq!(speaker.pwm().duty, Some(300));

        speaker.release();

        assert!(!speaker.is_enabled());
        assert_eq!(speaker.output_enable().high, Some(true));
        assert_eq!(speaker.pwm().duty, Some(0));
    }

    #[test]
    fn test_duty_ignored_while_released() {
        let mut speaker = GatedPwm::new(Channel::default(), EnablePin::default());
        speaker.set_duty_cycle(500).unwrap();
        assert_eq!(speaker.pwm().duty, Some(0));
        assert_eq!(speaker.pwm().writes, 2);
    }

    #[test]
    fn test_failed_enable_keeps_duty_parked() {
        let pin = EnablePin {
            fail: true,
            ..Default::default()
        };
        let mut speaker = GatedPwm::new(Channel::default(), pin);
        speaker.enable();
        assert!(!speaker.is_enabled());
        speaker.set_duty_cycle(500).unwrap();
        assert_eq!(speaker.pwm().duty, Some(0));
    }
}
