//! A platform-agnostic driver for the Micro Crystal RV-3028-C7 real-time clock.
//!
//! The driver talks to the RTC over I2C through the `embedded-hal` traits and
//! uses a delay source to pace the EEPROM busy-poll. With the `async` feature
//! every bus operation becomes an `async fn` over `embedded-hal-async`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rv3028c7::{Config, RV3028};
//!
//! let mut rtc = RV3028::new(i2c, delay);
//! rtc.configure(&Config::default())?;
//! rtc.update_time()?;
//! println!("{}", rtc.format_timestamp());
//! ```
//!
//! # Time snapshot
//!
//! Time getters and the formatted output read a cached copy of the 7 time
//! registers. Call [`RV3028::update_time`] to refresh it from the device.
//! Every time setter writes the whole 7-register block back.
//!
//! # EEPROM-backed configuration
//!
//! Trickle charging, backup switchover and the clock output live in EEPROM
//! mirrored configuration registers. They are changed through
//! [`RV3028::write_eeprom_config`], a fixed sequence that disables automatic
//! EEPROM refresh, writes the RAM mirror, commits it and re-enables refresh.
//! Every step runs even when an earlier one failed; the error names the first
//! failing [`EepromPhase`].
//!
//! # Features
//!
//! - `async`: use `embedded-hal-async` I2C and delay traits
//! - `log`: log through the `log` crate
//! - `defmt`: log through `defmt` and derive `defmt::Format` for public types
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod alarm;
mod backup;
pub mod bcd;
mod clock;
mod datetime;
mod eeprom;
mod registers;
#[cfg(all(test, not(feature = "async")))]
mod sim;
mod timer;

pub use alarm::{AlarmConfig, AlarmDay, AlarmError, AlarmMode};
pub use datetime::{
    DateDisplay, DateOrder, DateTimeError, Meridiem, TimeDisplay, TimeFields, TimestampDisplay,
};
pub use eeprom::{EepromFault, EepromPhase, EepromTiming, EEPROM_SENTINEL};
pub use registers::{
    AlarmHours, AlarmMinutes, AlarmWeekdayDate, BackupSwitchoverMode, ClockInterruptMask,
    ClockOutFrequency, Control1, Control2, EepromBackup, EepromClkout, EepromCommand, Hours, Id,
    RegAddr, Status, TimeRepresentation, TimerFrequency, TrickleChargeResistor, UpdatePeriod,
    WeekdayDateSelect, RV3028_ADDRESS,
};

use datetime::RV3028DateTime;

pub(crate) mod hal {
    cfg_if::cfg_if! {
        if #[cfg(feature = "async")] {
            pub use embedded_hal_async::{delay::DelayNs, i2c::I2c};
        } else {
            pub use embedded_hal::{delay::DelayNs, i2c::I2c};
        }
    }
}

use hal::{DelayNs, I2c};

/// Longest payload accepted by [`RV3028::write_registers`].
pub const MAX_BLOCK_WRITE: usize = 16;

/// Device setup applied by [`RV3028::configure`].
///
/// The default matches the usual power-up setup: 24-hour mode, trickle
/// charger off, level switching backup switchover and a cleared status
/// register.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Hour mode of the time registers
    pub time_representation: TimeRepresentation,
    /// Trickle charger series resistor, or `None` to disable charging
    pub trickle_charge: Option<TrickleChargeResistor>,
    /// Backup switchover mode
    pub backup_switchover_mode: BackupSwitchoverMode,
    /// Clear all status flags after configuring
    pub clear_status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_representation: TimeRepresentation::TwentyFourHour,
            trickle_charge: None,
            backup_switchover_mode: BackupSwitchoverMode::Level,
            clear_status: true,
        }
    }
}

/// Errors returned by the RV-3028-C7 driver.
#[derive(Debug)]
pub enum RV3028Error<I2CE> {
    /// I2C transaction failed
    I2c(I2CE),
    /// Invalid date or time value
    DateTime(DateTimeError),
    /// Invalid alarm configuration
    Alarm(AlarmError),
    /// EEPROM mirror access failed; `phase` is the first step that failed
    Eeprom {
        /// First failing step of the sequence
        phase: EepromPhase,
        /// What went wrong in that step
        fault: EepromFault<I2CE>,
    },
    /// An EEPROM-backed configuration byte read back as 0xFF
    ConfigUnavailable,
    /// Block write longer than [`MAX_BLOCK_WRITE`] bytes
    BlockTooLong,
}

impl<I2CE> From<I2CE> for RV3028Error<I2CE> {
    fn from(e: I2CE) -> Self {
        RV3028Error::I2c(e)
    }
}

/// RV-3028-C7 driver.
///
/// Owns the I2C bus and a delay source; [`RV3028::release`] hands them back.
pub struct RV3028<I2C: I2c, D: DelayNs> {
    i2c: I2C,
    delay: D,
    time: RV3028DateTime,
    time_representation: TimeRepresentation,
    time_representation_known: bool,
    eeprom_timing: EepromTiming,
}

macro_rules! register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::paste!{
                #[cfg(not(feature = "async"))]
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), RV3028Error<I2C::Error>> {
                    self.i2c.write(
                        RV3028_ADDRESS,
                        &[$regaddr as u8, value.into()],
                        )?;
                    Ok(())
                }
                #[cfg(feature = "async")]
                pub async fn [< set_ $name >](&mut self, value: $typ) -> Result<(), RV3028Error<I2C::Error>> {
                    self.i2c.write(
                        RV3028_ADDRESS,
                        &[$regaddr as u8, value.into()],
                        )
                        .await?;
                    Ok(())
                }
            }

            #[cfg(not(feature = "async"))]
            pub fn $name(&mut self) -> Result<$typ, RV3028Error<I2C::Error>> {
                let mut data = [0];
                self.i2c
                    .write_read(RV3028_ADDRESS, &[$regaddr as u8], &mut data)?;
                Ok(paste::paste!([<$typ>])(data[0]))
            }
            #[cfg(feature = "async")]
            pub async fn $name(&mut self) -> Result<$typ, RV3028Error<I2C::Error>> {
                let mut data = [0];
                self.i2c
                    .write_read(RV3028_ADDRESS, &[$regaddr as u8], &mut data)
                    .await?;
                Ok(paste::paste!([<$typ>])(data[0]))
            }
        )+
    }
}

impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Creates a driver for the RTC at the fixed address 0x52.
    ///
    /// No bus traffic happens here. The cached time starts at the device reset
    /// value (2000-01-01 00:00:00) until [`RV3028::update_time`] is called.
    /// The hour mode is not known yet either: the first time setter reads it
    /// from Control 2 unless [`RV3028::update_time`], [`RV3028::configure`] or
    /// a mode change ran before.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            time: RV3028DateTime::default(),
            time_representation: TimeRepresentation::TwentyFourHour,
            time_representation_known: false,
            eeprom_timing: EepromTiming::default(),
        }
    }

    /// Consumes the driver and returns the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Sets the busy-poll budget used by EEPROM mirror access.
    pub fn set_eeprom_timing(&mut self, timing: EepromTiming) {
        self.eeprom_timing = timing;
    }

    /// Current EEPROM busy-poll budget.
    pub fn eeprom_timing(&self) -> EepromTiming {
        self.eeprom_timing
    }

    register_access!(
        (status, RegAddr::Status, Status),
        (control1, RegAddr::Control1, Control1),
        (control2, RegAddr::Control2, Control2),
        (clock_interrupt_mask, RegAddr::ClockInterruptMask, ClockInterruptMask)
    );
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    pub(crate) async fn read_byte(&mut self, address: u8) -> Result<u8, I2C::Error> {
        let mut data = [0];
        self.i2c
            .write_read(RV3028_ADDRESS, &[address], &mut data)
            .await?;
        Ok(data[0])
    }

    pub(crate) async fn write_byte(&mut self, address: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(RV3028_ADDRESS, &[address, value]).await
    }

    /// Reads one register.
    pub async fn read_register(&mut self, address: u8) -> Result<u8, RV3028Error<I2C::Error>> {
        Ok(self.read_byte(address).await?)
    }

    /// Writes one register.
    pub async fn write_register(
        &mut self,
        address: u8,
        value: u8,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_byte(address, value).await?;
        Ok(())
    }

    /// Reads `buffer.len()` consecutive registers starting at `address`.
    pub async fn read_registers(
        &mut self,
        address: u8,
        buffer: &mut [u8],
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.i2c
            .write_read(RV3028_ADDRESS, &[address], buffer)
            .await?;
        Ok(())
    }

    /// Writes up to [`MAX_BLOCK_WRITE`] consecutive registers starting at
    /// `address` in one transaction.
    pub async fn write_registers(
        &mut self,
        address: u8,
        values: &[u8],
    ) -> Result<(), RV3028Error<I2C::Error>> {
        if values.len() > MAX_BLOCK_WRITE {
            error!("block write of {} bytes is too long", values.len());
            return Err(RV3028Error::BlockTooLong);
        }
        let mut buffer = [0u8; MAX_BLOCK_WRITE + 1];
        buffer[0] = address;
        buffer[1..=values.len()].copy_from_slice(values);
        self.i2c
            .write(RV3028_ADDRESS, &buffer[..=values.len()])
            .await?;
        Ok(())
    }

    /// Reads the hardware and version ID register.
    pub async fn id(&mut self) -> Result<Id, RV3028Error<I2C::Error>> {
        Ok(Id(self.read_byte(RegAddr::Id as u8).await?))
    }

    /// Clears every flag in the status register.
    pub async fn clear_status(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_status(Status::default()).await
    }

    /// Applies a device setup: hour mode, trickle charger, backup switchover
    /// and optionally a status clear.
    ///
    /// Steps run in that order and the first failure stops the setup.
    pub async fn configure(&mut self, config: &Config) -> Result<(), RV3028Error<I2C::Error>> {
        debug!("configure: {:?}", config);
        match config.time_representation {
            TimeRepresentation::TwentyFourHour => self.set_24_hour().await?,
            TimeRepresentation::TwelveHour => self.set_12_hour().await?,
        }
        match config.trickle_charge {
            Some(resistor) => {
                self.set_trickle_charge_resistor(resistor).await?;
                self.enable_trickle_charge(true).await?;
            }
            None => self.enable_trickle_charge(false).await?,
        }
        self.set_backup_switchover_mode(config.backup_switchover_mode)
            .await?;
        if config.clear_status {
            self.clear_status().await?;
        }
        Ok(())
    }
}
