//! Time snapshot and conversion utilities for the RV-3028-C7 RTC.
//!
//! The RV-3028-C7 keeps the calendar in 7 consecutive BCD registers starting at
//! 0x00: seconds, minutes, hours, weekday, date, month and year. The driver
//! holds a copy of that block, [`RV3028DateTime`], which is written back to the
//! device as a whole on every change and refreshed only on request.
//!
//! Unlike the hours register of some other RTCs, the RV-3028-C7 hours byte does
//! not say which hour mode it is encoded in; the 12_24 bit lives in Control 2.
//! Every hour conversion here therefore takes the [`TimeRepresentation`]
//! explicitly.
//!
//! # Conventions
//!
//! - Hours passed in and returned are always 0-23.
//! - Weekday is 0-6 with Sunday = 0.
//! - Year is 2000-2099, stored as an offset from 2000.

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd::{bcd_to_dec, dec_to_bcd};
use crate::registers::{Hours, TimeRepresentation};

/// Errors that can occur during RV-3028-C7 date/time conversion or validation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The provided or decoded date/time is invalid (out of range or not a real calendar date)
    InvalidDateTime,
    /// The year is before 2000
    YearNotAfter1999,
    /// The year is after 2099
    YearNotBefore2100,
}

/// Cached copy of the 7 time registers, raw BCD.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RV3028DateTime {
    seconds: u8,
    minutes: u8,
    hours: Hours,
    weekday: u8,
    date: u8,
    month: u8,
    year: u8,
}

impl Default for RV3028DateTime {
    /// 2000-01-01 00:00:00, a Saturday: the device's reset value.
    fn default() -> Self {
        Self::from([0x00, 0x00, 0x00, 0x06, 0x01, 0x01, 0x00])
    }
}

impl RV3028DateTime {
    fn encode(value: u8, min: u8, max: u8) -> Result<u8, DateTimeError> {
        if !(min..=max).contains(&value) {
            return Err(DateTimeError::InvalidDateTime);
        }
        Ok(dec_to_bcd(value))
    }

    fn encode_year(year: u16) -> Result<u8, DateTimeError> {
        if year < 2000 {
            error!("Year {} is too early! must be greater than 1999", year);
            return Err(DateTimeError::YearNotAfter1999);
        }
        if year > 2099 {
            error!("Year {} is too late! must be before 2100", year);
            return Err(DateTimeError::YearNotBefore2100);
        }
        let offset = u8::try_from(year - 2000).map_err(|_| DateTimeError::InvalidDateTime)?;
        Ok(dec_to_bcd(offset))
    }

    /// Encodes an hour in 0-23 for the given hour mode.
    pub(crate) fn encode_hours(
        hour: u8,
        time_representation: TimeRepresentation,
    ) -> Result<Hours, DateTimeError> {
        if hour > 23 {
            return Err(DateTimeError::InvalidDateTime);
        }
        match time_representation {
            TimeRepresentation::TwentyFourHour => Ok(Hours(dec_to_bcd(hour))),
            TimeRepresentation::TwelveHour => {
                let (hour12, is_pm) = match hour {
                    0 => (12, false),
                    1..=11 => (hour, false),
                    12 => (12, true),
                    _ => (hour - 12, true),
                };
                let mut value = Hours(dec_to_bcd(hour12));
                value.set_pm(is_pm);
                Ok(value)
            }
        }
    }

    /// Decodes an hours register into 0-23 for the given hour mode.
    pub(crate) fn decode_hours(hours: Hours, time_representation: TimeRepresentation) -> u8 {
        match time_representation {
            TimeRepresentation::TwentyFourHour => {
                10 * hours.ten_hours_24() + hours.hours()
            }
            TimeRepresentation::TwelveHour => {
                let hour12 = 10 * hours.ten_hours_12() + hours.hours();
                match (hour12, hours.pm()) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, false) => h,
                    (h, true) => h + 12,
                }
            }
        }
    }

    /// Re-encodes an hours register read under one mode for the other.
    pub(crate) fn convert_hours(
        hours: Hours,
        from: TimeRepresentation,
        to: TimeRepresentation,
    ) -> Result<Hours, DateTimeError> {
        Self::encode_hours(Self::decode_hours(hours, from), to)
    }

    pub(crate) fn from_fields(
        fields: &TimeFields,
        time_representation: TimeRepresentation,
    ) -> Result<Self, DateTimeError> {
        Ok(Self {
            seconds: Self::encode(fields.seconds, 0, 59)?,
            minutes: Self::encode(fields.minutes, 0, 59)?,
            hours: Self::encode_hours(fields.hours, time_representation)?,
            weekday: Self::encode(fields.weekday, 0, 6)?,
            date: Self::encode(fields.date, 1, 31)?,
            month: Self::encode(fields.month, 1, 12)?,
            year: Self::encode_year(fields.year)?,
        })
    }

    pub(crate) fn from_datetime(
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<Self, DateTimeError> {
        let year = u16::try_from(datetime.year()).map_err(|_| DateTimeError::YearNotAfter1999)?;
        let fields = TimeFields {
            seconds: datetime.second() as u8,
            minutes: datetime.minute() as u8,
            hours: datetime.hour() as u8,
            weekday: datetime.weekday().num_days_from_sunday() as u8,
            date: datetime.day() as u8,
            month: datetime.month() as u8,
            year,
        };
        let raw = Self::from_fields(&fields, time_representation)?;
        debug!("raw={:?}", <[u8; 7]>::from(&raw));
        Ok(raw)
    }

    pub(crate) fn into_datetime(
        self,
        time_representation: TimeRepresentation,
    ) -> Result<NaiveDateTime, DateTimeError> {
        let hours = u32::from(self.hours(time_representation));
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month()),
            u32::from(self.date()),
        )
        .and_then(|d| d.and_hms_opt(hours, u32::from(self.minutes()), u32::from(self.seconds())))
        .ok_or(DateTimeError::InvalidDateTime)
    }

    pub(crate) fn seconds(&self) -> u8 {
        bcd_to_dec(self.seconds)
    }

    pub(crate) fn minutes(&self) -> u8 {
        bcd_to_dec(self.minutes)
    }

    pub(crate) fn hours(&self, time_representation: TimeRepresentation) -> u8 {
        Self::decode_hours(self.hours, time_representation)
    }

    pub(crate) fn weekday(&self) -> u8 {
        bcd_to_dec(self.weekday)
    }

    pub(crate) fn date(&self) -> u8 {
        bcd_to_dec(self.date)
    }

    pub(crate) fn month(&self) -> u8 {
        bcd_to_dec(self.month)
    }

    pub(crate) fn year(&self) -> u16 {
        2000 + u16::from(bcd_to_dec(self.year))
    }

    /// PM flag of the cached hours; always false in 24-hour mode.
    pub(crate) fn is_pm(&self, time_representation: TimeRepresentation) -> bool {
        time_representation == TimeRepresentation::TwelveHour && self.hours.pm()
    }

    pub(crate) fn set_seconds(&mut self, value: u8) -> Result<(), DateTimeError> {
        self.seconds = Self::encode(value, 0, 59)?;
        Ok(())
    }

    pub(crate) fn set_minutes(&mut self, value: u8) -> Result<(), DateTimeError> {
        self.minutes = Self::encode(value, 0, 59)?;
        Ok(())
    }

    pub(crate) fn set_hours(
        &mut self,
        value: u8,
        time_representation: TimeRepresentation,
    ) -> Result<(), DateTimeError> {
        self.hours = Self::encode_hours(value, time_representation)?;
        Ok(())
    }

    pub(crate) fn raw_hours(&self) -> Hours {
        self.hours
    }

    pub(crate) fn set_raw_hours(&mut self, hours: Hours) {
        self.hours = hours;
    }

    pub(crate) fn set_weekday(&mut self, value: u8) -> Result<(), DateTimeError> {
        self.weekday = Self::encode(value, 0, 6)?;
        Ok(())
    }

    pub(crate) fn set_date(&mut self, value: u8) -> Result<(), DateTimeError> {
        self.date = Self::encode(value, 1, 31)?;
        Ok(())
    }

    pub(crate) fn set_month(&mut self, value: u8) -> Result<(), DateTimeError> {
        self.month = Self::encode(value, 1, 12)?;
        Ok(())
    }

    pub(crate) fn set_year(&mut self, value: u16) -> Result<(), DateTimeError> {
        self.year = Self::encode_year(value)?;
        Ok(())
    }

    pub(crate) fn date_display(&self, order: DateOrder) -> DateDisplay {
        DateDisplay {
            order,
            date: self.date(),
            month: self.month(),
            year: self.year(),
        }
    }

    pub(crate) fn time_display(&self, time_representation: TimeRepresentation) -> TimeDisplay {
        let meridiem = match time_representation {
            TimeRepresentation::TwentyFourHour => None,
            TimeRepresentation::TwelveHour if self.hours.pm() => Some(Meridiem::Pm),
            TimeRepresentation::TwelveHour => Some(Meridiem::Am),
        };
        let hour = match time_representation {
            TimeRepresentation::TwentyFourHour => 10 * self.hours.ten_hours_24() + self.hours.hours(),
            TimeRepresentation::TwelveHour => 10 * self.hours.ten_hours_12() + self.hours.hours(),
        };
        TimeDisplay {
            hour,
            minute: self.minutes(),
            second: self.seconds(),
            meridiem,
        }
    }

    pub(crate) fn timestamp_display(
        &self,
        time_representation: TimeRepresentation,
    ) -> TimestampDisplay {
        TimestampDisplay {
            date: self.date_display(DateOrder::YearMonthDay),
            time: self.time_display(time_representation),
        }
    }
}

impl From<[u8; 7]> for RV3028DateTime {
    fn from(data: [u8; 7]) -> Self {
        RV3028DateTime {
            seconds: data[0],
            minutes: data[1],
            hours: Hours(data[2]),
            weekday: data[3],
            date: data[4],
            month: data[5],
            year: data[6],
        }
    }
}

impl From<&RV3028DateTime> for [u8; 7] {
    fn from(dt: &RV3028DateTime) -> [u8; 7] {
        [
            dt.seconds,
            dt.minutes,
            dt.hours.0,
            dt.weekday,
            dt.date,
            dt.month,
            dt.year,
        ]
    }
}

/// All seven calendar fields in plain integers, as taken by `set_time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeFields {
    /// 0-59
    pub seconds: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-23, regardless of the device hour mode
    pub hours: u8,
    /// 0-6, Sunday = 0
    pub weekday: u8,
    /// 1-31
    pub date: u8,
    /// 1-12
    pub month: u8,
    /// 2000-2099
    pub year: u16,
}

/// Field order of a formatted date.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateOrder {
    /// `MM/DD/YYYY`
    MonthDayYear,
    /// `DD/MM/YYYY`
    DayMonthYear,
    /// `YYYY-MM-DD`
    YearMonthDay,
}

/// AM/PM suffix of a 12-hour time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    /// Before noon
    Am,
    /// Noon and after
    Pm,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::Am => f.write_str("AM"),
            Meridiem::Pm => f.write_str("PM"),
        }
    }
}

/// A date taken from the cached time snapshot, formatted on display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateDisplay {
    order: DateOrder,
    date: u8,
    month: u8,
    year: u16,
}

impl fmt::Display for DateDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            DateOrder::MonthDayYear => {
                write!(f, "{:02}/{:02}/{:04}", self.month, self.date, self.year)
            }
            DateOrder::DayMonthYear => {
                write!(f, "{:02}/{:02}/{:04}", self.date, self.month, self.year)
            }
            DateOrder::YearMonthDay => {
                write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.date)
            }
        }
    }
}

/// A time of day taken from the cached time snapshot.
///
/// In 12-hour mode the hour is shown as it appears on the clock face (1-12)
/// followed by `AM` or `PM` with no separating space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeDisplay {
    hour: u8,
    minute: u8,
    second: u8,
    meridiem: Option<Meridiem>,
}

impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if let Some(meridiem) = self.meridiem {
            write!(f, "{}", meridiem)?;
        }
        Ok(())
    }
}

/// `YYYY-MM-DD  HH:MM:SS[AM|PM]`, two spaces between date and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampDisplay {
    date: DateDisplay,
    time: TimeDisplay,
}

impl fmt::Display for TimestampDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::ToString;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_from_datetime_and_into_datetime_roundtrip() {
        let dt = ymd_hms(2024, 3, 14, 15, 30, 0);
        for rep in [
            TimeRepresentation::TwentyFourHour,
            TimeRepresentation::TwelveHour,
        ] {
            let raw = RV3028DateTime::from_datetime(&dt, rep).unwrap();
            assert_eq!(raw.into_datetime(rep).unwrap(), dt);
        }
    }

    #[test]
    fn test_block_layout() {
        // Thursday 2024-03-14 15:30:07
        let dt = ymd_hms(2024, 3, 14, 15, 30, 7);
        let raw = RV3028DateTime::from_datetime(&dt, TimeRepresentation::TwentyFourHour).unwrap();
        let block: [u8; 7] = (&raw).into();
        assert_eq!(block, [0x07, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24]);
        assert_eq!(RV3028DateTime::from(block), raw);
    }

    #[test]
    fn test_year_range() {
        let err = RV3028DateTime::from_datetime(
            &ymd_hms(1999, 12, 31, 23, 59, 59),
            TimeRepresentation::TwentyFourHour,
        )
        .unwrap_err();
        assert_eq!(err, DateTimeError::YearNotAfter1999);

        let err = RV3028DateTime::from_datetime(
            &ymd_hms(2100, 1, 1, 0, 0, 0),
            TimeRepresentation::TwentyFourHour,
        )
        .unwrap_err();
        assert_eq!(err, DateTimeError::YearNotBefore2100);

        let mut raw = RV3028DateTime::default();
        assert!(raw.set_year(2099).is_ok());
        assert_eq!(raw.year(), 2099);
        assert_eq!(raw.set_year(2100), Err(DateTimeError::YearNotBefore2100));
        assert_eq!(raw.year(), 2099);
    }

    #[test]
    fn test_field_setters_validate() {
        let mut raw = RV3028DateTime::default();
        assert!(raw.set_seconds(60).is_err());
        assert!(raw.set_minutes(60).is_err());
        assert!(raw.set_hours(24, TimeRepresentation::TwentyFourHour).is_err());
        assert!(raw.set_weekday(7).is_err());
        assert!(raw.set_date(0).is_err());
        assert!(raw.set_date(32).is_err());
        assert!(raw.set_month(0).is_err());
        assert!(raw.set_month(13).is_err());
        assert_eq!(raw, RV3028DateTime::default());

        raw.set_seconds(59).unwrap();
        raw.set_minutes(7).unwrap();
        raw.set_weekday(2).unwrap();
        raw.set_date(31).unwrap();
        raw.set_month(12).unwrap();
        assert_eq!(raw.seconds(), 59);
        assert_eq!(raw.minutes(), 7);
        assert_eq!(raw.weekday(), 2);
        assert_eq!(raw.date(), 31);
        assert_eq!(raw.month(), 12);
    }

    #[test]
    fn test_encode_hours_twelve_hour() {
        let midnight = RV3028DateTime::encode_hours(0, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(midnight.0, 0x12);
        assert!(!midnight.pm());

        let one_pm = RV3028DateTime::encode_hours(13, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(one_pm.0, 0x21);
        assert!(one_pm.pm());
        assert_eq!(one_pm.hours(), 1);

        let noon = RV3028DateTime::encode_hours(12, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(noon.0, 0x32);

        let eleven_pm = RV3028DateTime::encode_hours(23, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(eleven_pm.0, 0x31);
    }

    #[test]
    fn test_hour_mode_conversion_restores_every_hour() {
        for hour in 0..=23u8 {
            let h24 = RV3028DateTime::encode_hours(hour, TimeRepresentation::TwentyFourHour).unwrap();
            let h12 = RV3028DateTime::convert_hours(
                h24,
                TimeRepresentation::TwentyFourHour,
                TimeRepresentation::TwelveHour,
            )
            .unwrap();
            let back = RV3028DateTime::convert_hours(
                h12,
                TimeRepresentation::TwelveHour,
                TimeRepresentation::TwentyFourHour,
            )
            .unwrap();
            assert_eq!(back, h24, "hour {hour}");
            assert_eq!(
                RV3028DateTime::decode_hours(h12, TimeRepresentation::TwelveHour),
                hour
            );
        }
    }

    #[test]
    fn test_invalid_bcd_to_datetime() {
        // month 0x13
        let raw = RV3028DateTime::from([0x00, 0x00, 0x00, 0x01, 0x01, 0x13, 0x24]);
        assert_eq!(
            raw.into_datetime(TimeRepresentation::TwentyFourHour),
            Err(DateTimeError::InvalidDateTime)
        );

        // February 30th
        let raw = RV3028DateTime::from([0x00, 0x00, 0x00, 0x01, 0x30, 0x02, 0x24]);
        assert!(raw.into_datetime(TimeRepresentation::TwentyFourHour).is_err());
    }

    #[test]
    fn test_weekday_conversion() {
        let sunday = ymd_hms(2024, 3, 10, 0, 0, 0);
        let raw = RV3028DateTime::from_datetime(&sunday, TimeRepresentation::TwentyFourHour).unwrap();
        assert_eq!(raw.weekday(), 0);

        let saturday = ymd_hms(2024, 3, 16, 0, 0, 0);
        let raw =
            RV3028DateTime::from_datetime(&saturday, TimeRepresentation::TwentyFourHour).unwrap();
        assert_eq!(raw.weekday(), 6);
    }

    #[test]
    fn test_is_pm_depends_on_mode() {
        let raw = RV3028DateTime::from([0x00, 0x00, 0x21, 0x01, 0x01, 0x01, 0x24]);
        assert!(raw.is_pm(TimeRepresentation::TwelveHour));
        assert!(!raw.is_pm(TimeRepresentation::TwentyFourHour));
    }

    #[test]
    fn test_formatting() {
        let dt = ymd_hms(2024, 3, 4, 13, 5, 9);
        let raw = RV3028DateTime::from_datetime(&dt, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(
            raw.date_display(DateOrder::MonthDayYear).to_string(),
            "03/04/2024"
        );
        assert_eq!(
            raw.date_display(DateOrder::DayMonthYear).to_string(),
            "04/03/2024"
        );
        assert_eq!(
            raw.time_display(TimeRepresentation::TwelveHour).to_string(),
            "01:05:09PM"
        );
        assert_eq!(
            raw.timestamp_display(TimeRepresentation::TwelveHour)
                .to_string(),
            "2024-03-04  01:05:09PM"
        );

        let raw = RV3028DateTime::from_datetime(&dt, TimeRepresentation::TwentyFourHour).unwrap();
        assert_eq!(
            raw.time_display(TimeRepresentation::TwentyFourHour)
                .to_string(),
            "13:05:09"
        );
        assert_eq!(
            raw.timestamp_display(TimeRepresentation::TwentyFourHour)
                .to_string(),
            "2024-03-04  13:05:09"
        );

        let midnight = ymd_hms(2024, 3, 4, 0, 0, 0);
        let raw = RV3028DateTime::from_datetime(&midnight, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(
            raw.time_display(TimeRepresentation::TwelveHour).to_string(),
            "12:00:00AM"
        );
    }
}
