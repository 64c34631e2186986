use core::fmt;

use embedded_hal::i2c::I2c;

/// The FM receiver's analog output, as seen by the alarm.
pub trait RadioOutputStage {
    type Error: fmt::Debug;

    /// Put the audio output in high-impedance (`true`) or drive it normally.
    fn set_high_impedance(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum RadioError<E> {
    /// The I²C transaction failed.
    Bus(E),
}

impl<E: fmt::Debug> fmt::Display for RadioError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioError::Bus(e) => write!(f, "radio bus error: {:?}", e),
        }
    }
}

/// RDA5807M random-access I²C address.
pub const RANDOM_ACCESS_ADDRESS: u8 = 0x11;
/// Configuration register 02h.
pub const REG_CONFIG: u8 = 0x02;
/// Audio output high-Z disable: set for normal output, clear for high-Z.
pub const DHIZ: u16 = 1 << 15;

/// Output-stage control of an RDA5807M.
///
/// Only the DHIZ bit is touched; the rest of the configuration register is
/// read back and written unchanged.
pub struct Rda5807Output<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Rda5807Output<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, RANDOM_ACCESS_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn read_register(&mut self, register: u8) -> Result<u16, RadioError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(RadioError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn write_register(&mut self, register: u8, value: u16) -> Result<(), RadioError<I2C::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[register, hi, lo])
            .map_err(RadioError::Bus)
    }

    pub fn is_high_impedance(&mut self) -> Result<bool, RadioError<I2C::Error>> {
        Ok(self.read_register(REG_CONFIG)? & DHIZ == 0)
    }
}

impl<I2C: I2c> RadioOutputStage for Rda5807Output<I2C> {
    type Error = RadioError<I2C::Error>;

    fn set_high_impedance(&mut self, enabled: bool) -> Result<(), Self::Error> {
        let config = self.read_register(REG_CONFIG)?;
        let updated = if enabled { config & !DHIZ } else { config | DHIZ };
        if updated != config {
            self.write_register(REG_CONFIG, updated)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// One-register RDA5807M stand-in.
    struct FakeBus {
        config: u16,
        writes: usize,
        fail: bool,
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            if self.fail || address != RANDOM_ACCESS_ADDRESS {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write([REG_CONFIG]) => {}
                    Operation::Write([REG_CONFIG, hi, lo]) => {
                        self.config = u16::from_be_bytes([*hi, *lo]);
                        self.writes += 1;
                    }
                    Operation::Read(buf) => buf.copy_from_slice(&self.config.to_be_bytes()),
                    _ => return Err(ErrorKind::Other),
                }
            }
            Ok(())
        }
    }

    fn radio(config: u16) -> Rda5807Output<FakeBus> {
        Rda5807Output::new(FakeBus {
            config,
            writes: 0,
            fail: false,
        })
    }

    #[test]
    fn test_high_impedance_clears_only_dhiz() {
        let mut radio = radio(0xC00D);
        radio.set_high_impedance(true).unwrap();
        assert_eq!(radio.release().config, 0x400D);
    }

    #[test]
    fn test_normal_output_sets_only_dhiz() {
        let mut radio = radio(0x400D);
        radio.set_high_impedance(false).unwrap();
        assert!(!radio.is_high_impedance().unwrap());
        assert_eq!(radio.release().config, 0xC00D);
    }

    #[test]
    fn test_unchanged_register_is_not_rewritten() {
        let mut radio = radio(0x400D);
        radio.set_high_impedance(true).unwrap();
        assert_eq!(radio.release().writes, 0);
    }

    #[test]
    fn test_bus_errors_are_wrapped() {
        let mut radio = Rda5807Output::new(FakeBus {
            config: 0,
            writes: 0,
            fail: true,
        });
        assert_eq!(radio.set_high_impedance(true), Err(RadioError::Bus(ErrorKind::Other)));
    }
}
