//! Alarm configuration for the RV-3028-C7 RTC.
//!
//! The RV-3028-C7 has one alarm with minute resolution, programmed through
//! three registers at 0x07-0x09 (minutes, hours, weekday or date). Each
//! register carries a mask bit (AE_M, AE_H, AE_WD) in bit 7; a set mask bit
//! removes that field from the comparison. The WADA bit of Control 1 selects
//! whether the third register holds a weekday or a date.
//!
//! # Alarm modes
//!
//! [`AlarmMode`] names the eight mask combinations:
//!
//! | Mode | Triggers when                       |
//! |------|-------------------------------------|
//! | 0    | minutes, hours and weekday/date match |
//! | 1    | hours and weekday/date match          |
//! | 2    | minutes and weekday/date match        |
//! | 3    | weekday/date matches                  |
//! | 4    | hours and minutes match               |
//! | 5    | hours match                           |
//! | 6    | minutes match                         |
//! | 7    | never (all fields masked)             |
//!
//! Alarm hours are always programmed in 24-hour form; setting an alarm
//! switches the device to 24-hour mode.

use crate::bcd::{bcd_to_dec, dec_to_bcd};
use crate::hal::{DelayNs, I2c};
use crate::registers::{
    AlarmHours, AlarmMinutes, AlarmWeekdayDate, RegAddr, TimeRepresentation, WeekdayDateSelect,
};
use crate::{RV3028Error, RV3028};

/// Error type for alarm configuration operations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Invalid time component value
    InvalidTime(&'static str),
    /// Invalid day of week (must be 0-6)
    InvalidDayOfWeek,
    /// Invalid date of month (must be 1-31)
    InvalidDateOfMonth,
}

/// Which fields take part in the alarm comparison.
///
/// Bit 0 of the mode masks minutes, bit 1 hours and bit 2 the weekday/date.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMode {
    /// Minutes, hours and weekday/date must match
    MinutesHoursDay = 0,
    /// Hours and weekday/date must match
    HoursDay = 1,
    /// Minutes and weekday/date must match
    MinutesDay = 2,
    /// Weekday/date must match
    Day = 3,
    /// Hours and minutes must match (daily)
    MinutesHours = 4,
    /// Hours must match (daily)
    Hours = 5,
    /// Minutes must match (hourly)
    Minutes = 6,
    /// All fields masked
    Disabled = 7,
}

impl AlarmMode {
    fn masks_minutes(self) -> bool {
        (self as u8) & 0b001 != 0
    }

    fn masks_hours(self) -> bool {
        (self as u8) & 0b010 != 0
    }

    fn masks_day(self) -> bool {
        (self as u8) & 0b100 != 0
    }

    fn from_masks(minutes: bool, hours: bool, day: bool) -> Self {
        Self::from(u8::from(minutes) | (u8::from(hours) << 1) | (u8::from(day) << 2))
    }
}

impl From<u8> for AlarmMode {
    /// Values above 7 are treated as [`AlarmMode::Disabled`].
    fn from(v: u8) -> Self {
        match v {
            0 => AlarmMode::MinutesHoursDay,
            1 => AlarmMode::HoursDay,
            2 => AlarmMode::MinutesDay,
            3 => AlarmMode::Day,
            4 => AlarmMode::MinutesHours,
            5 => AlarmMode::Hours,
            6 => AlarmMode::Minutes,
            _ => AlarmMode::Disabled,
        }
    }
}

impl From<AlarmMode> for u8 {
    fn from(v: AlarmMode) -> Self {
        v as u8
    }
}

/// Day field of the alarm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmDay {
    /// Day of week, 0-6 with Sunday = 0
    Weekday(u8),
    /// Date of month, 1-31
    Date(u8),
}

/// A complete alarm setting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// Minute (0-59)
    pub minute: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Weekday or date
    pub day: AlarmDay,
    /// Fields compared
    pub mode: AlarmMode,
}

impl AlarmConfig {
    /// Validates the configuration. Masked fields are validated too since
    /// they are still written to the device.
    pub fn validate(&self) -> Result<(), AlarmError> {
        if self.minute > 59 {
            return Err(AlarmError::InvalidTime("minute must be 0-59"));
        }
        if self.hour > 23 {
            return Err(AlarmError::InvalidTime("hour must be 0-23"));
        }
        match self.day {
            AlarmDay::Weekday(weekday) if weekday > 6 => Err(AlarmError::InvalidDayOfWeek),
            AlarmDay::Date(date) if !(1..=31).contains(&date) => {
                Err(AlarmError::InvalidDateOfMonth)
            }
            _ => Ok(()),
        }
    }

    /// Weekday/date select bit needed for this configuration.
    pub fn day_select(&self) -> WeekdayDateSelect {
        match self.day {
            AlarmDay::Weekday(_) => WeekdayDateSelect::Weekday,
            AlarmDay::Date(_) => WeekdayDateSelect::Date,
        }
    }

    /// Encodes the configuration into the three alarm registers.
    pub fn to_registers(&self) -> Result<[u8; 3], AlarmError> {
        self.validate()?;

        let mut minutes = AlarmMinutes(dec_to_bcd(self.minute));
        minutes.set_alarm_mask(self.mode.masks_minutes());

        let mut hours = AlarmHours(dec_to_bcd(self.hour));
        hours.set_alarm_mask(self.mode.masks_hours());

        let day = match self.day {
            AlarmDay::Weekday(weekday) => weekday,
            AlarmDay::Date(date) => date,
        };
        let mut weekday_date = AlarmWeekdayDate(dec_to_bcd(day));
        weekday_date.set_alarm_mask(self.mode.masks_day());

        Ok([minutes.into(), hours.into(), weekday_date.into()])
    }

    /// Decodes the three alarm registers, assuming 24-hour hours.
    pub fn from_registers(
        registers: [u8; 3],
        day_select: WeekdayDateSelect,
    ) -> Result<Self, AlarmError> {
        let minutes = AlarmMinutes(registers[0]);
        let hours = AlarmHours(registers[1]);
        let weekday_date = AlarmWeekdayDate(registers[2]);

        let day = bcd_to_dec(registers[2] & 0x3F);
        let config = AlarmConfig {
            minute: bcd_to_dec(registers[0] & 0x7F),
            hour: bcd_to_dec(registers[1] & 0x3F),
            day: match day_select {
                WeekdayDateSelect::Weekday => AlarmDay::Weekday(day),
                WeekdayDateSelect::Date => AlarmDay::Date(day),
            },
            mode: AlarmMode::from_masks(
                minutes.alarm_mask(),
                hours.alarm_mask(),
                weekday_date.alarm_mask(),
            ),
        };
        config.validate()?;
        Ok(config)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Programs the alarm.
    ///
    /// The alarm interrupt is disabled and the alarm flag cleared first so
    /// nothing fires mid-configuration; the device is switched to 24-hour
    /// mode, the weekday/date select bit and the three alarm registers are
    /// written, and the alarm interrupt is enabled again.
    pub async fn set_alarm(&mut self, config: &AlarmConfig) -> Result<(), RV3028Error<I2C::Error>> {
        let registers = config.to_registers().map_err(RV3028Error::Alarm)?;
        debug!("set_alarm: {:?} -> {:?}", config, registers);

        self.set_alarm_interrupt(false).await?;
        self.clear_alarm_flag().await?;
        self.set_time_representation(TimeRepresentation::TwentyFourHour)
            .await?;

        let mut control = self.control1().await?;
        control.set_weekday_date_select(config.day_select());
        self.set_control1(control).await?;

        self.write_registers(RegAddr::MinutesAlarm as u8, &registers)
            .await?;

        self.set_alarm_interrupt(true).await
    }

    /// Reads back the programmed alarm.
    pub async fn alarm_config(&mut self) -> Result<AlarmConfig, RV3028Error<I2C::Error>> {
        let day_select = self.control1().await?.weekday_date_select();
        let mut registers = [0u8; 3];
        self.read_registers(RegAddr::MinutesAlarm as u8, &mut registers)
            .await?;
        AlarmConfig::from_registers(registers, day_select).map_err(RV3028Error::Alarm)
    }

    /// Weekday/date select bit (WADA) of Control 1.
    pub async fn alarm_day_select(&mut self) -> Result<WeekdayDateSelect, RV3028Error<I2C::Error>> {
        Ok(self.control1().await?.weekday_date_select())
    }

    /// Enables or disables the alarm interrupt (AIE).
    pub async fn set_alarm_interrupt(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control2().await?;
        control.set_alarm_interrupt_enable(enable);
        self.set_control2(control).await
    }

    /// Alarm flag (AF) of the status register.
    pub async fn alarm_flag(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        Ok(self.status().await?.alarm_flag())
    }

    /// Clears the alarm flag, leaving the other flags as they are.
    pub async fn clear_alarm_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.set_alarm_flag(false);
        self.set_status(status).await
    }
}
