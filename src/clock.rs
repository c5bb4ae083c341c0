//! Calendar time, hour mode and the UNIX time counter.

use chrono::NaiveDateTime;

use crate::datetime::{
    DateDisplay, DateOrder, DateTimeError, RV3028DateTime, TimeDisplay, TimeFields,
    TimestampDisplay,
};
use crate::hal::{DelayNs, I2c};
use crate::registers::{Hours, RegAddr, TimeRepresentation};
use crate::{RV3028Error, RV3028};

const UNIX_READ_ATTEMPTS: usize = 4;

/// Accessors for the cached time snapshot. None of these touch the bus.
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Seconds (0-59) of the cached time.
    pub fn seconds(&self) -> u8 {
        self.time.seconds()
    }

    /// Minutes (0-59) of the cached time.
    pub fn minutes(&self) -> u8 {
        self.time.minutes()
    }

    /// Hours (0-23) of the cached time, whatever the hour mode.
    pub fn hours(&self) -> u8 {
        self.time.hours(self.time_representation)
    }

    /// Weekday (0-6, Sunday = 0) of the cached time.
    pub fn weekday(&self) -> u8 {
        self.time.weekday()
    }

    /// Day of month (1-31) of the cached time.
    pub fn date(&self) -> u8 {
        self.time.date()
    }

    /// Month (1-12) of the cached time.
    pub fn month(&self) -> u8 {
        self.time.month()
    }

    /// Full year (2000-2099) of the cached time.
    pub fn year(&self) -> u16 {
        self.time.year()
    }

    /// True if the cached time is PM in 12-hour mode.
    pub fn is_pm(&self) -> bool {
        self.time.is_pm(self.time_representation)
    }

    /// Hour mode as of the last mode change or [`RV3028::update_time`].
    pub fn time_representation(&self) -> TimeRepresentation {
        self.time_representation
    }

    /// The cached time as a `NaiveDateTime`.
    pub fn datetime(&self) -> Result<NaiveDateTime, DateTimeError> {
        self.time.into_datetime(self.time_representation)
    }

    /// `MM/DD/YYYY`
    pub fn format_date_usa(&self) -> DateDisplay {
        self.time.date_display(DateOrder::MonthDayYear)
    }

    /// `DD/MM/YYYY`
    pub fn format_date(&self) -> DateDisplay {
        self.time.date_display(DateOrder::DayMonthYear)
    }

    /// `HH:MM:SS`, or `HH:MM:SSAM` / `HH:MM:SSPM` in 12-hour mode.
    pub fn format_time(&self) -> TimeDisplay {
        self.time.time_display(self.time_representation)
    }

    /// `YYYY-MM-DD  HH:MM:SS`, with an `AM`/`PM` suffix in 12-hour mode.
    pub fn format_timestamp(&self) -> TimestampDisplay {
        self.time.timestamp_display(self.time_representation)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Learns the device hour mode once, re-encoding the cached hours if it
    /// differs from the assumed one.
    async fn sync_time_representation(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        if self.time_representation_known {
            return Ok(());
        }
        let device = self.control2().await?.time_representation();
        if device != self.time_representation {
            let hours = RV3028DateTime::convert_hours(
                self.time.raw_hours(),
                self.time_representation,
                device,
            )
            .map_err(RV3028Error::DateTime)?;
            self.time.set_raw_hours(hours);
            self.time_representation = device;
        }
        self.time_representation_known = true;
        Ok(())
    }

    async fn write_time(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        let block: [u8; 7] = (&self.time).into();
        debug!("write time: {:?}", block);
        self.write_registers(RegAddr::Seconds as u8, &block).await
    }

    /// Reads the time registers and the hour mode into the cache.
    pub async fn update_time(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        let representation = self.control2().await?.time_representation();
        let mut block = [0u8; 7];
        self.read_registers(RegAddr::Seconds as u8, &mut block)
            .await?;
        debug!("read time: {:?}", block);
        self.time_representation = representation;
        self.time_representation_known = true;
        self.time = RV3028DateTime::from(block);
        Ok(())
    }

    /// Sets the seconds and writes the time block.
    pub async fn set_seconds(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_seconds(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the minutes and writes the time block.
    pub async fn set_minutes(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_minutes(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the hours (0-23) and writes the time block. The hour is encoded
    /// in the cached hour mode.
    pub async fn set_hours(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time
            .set_hours(value, self.time_representation)
            .map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the weekday (0-6, Sunday = 0) and writes the time block.
    pub async fn set_weekday(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_weekday(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the day of month and writes the time block.
    pub async fn set_date(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_date(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the month and writes the time block.
    pub async fn set_month(&mut self, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_month(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the full year (2000-2099) and writes the time block.
    pub async fn set_year(&mut self, value: u16) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time.set_year(value).map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets all seven fields at once. Nothing is cached or written if any
    /// field is out of range.
    pub async fn set_time(&mut self, fields: &TimeFields) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time = RV3028DateTime::from_fields(fields, self.time_representation)
            .map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Sets the time from a `NaiveDateTime`; the weekday is derived from the
    /// calendar date.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.sync_time_representation().await?;
        self.time = RV3028DateTime::from_datetime(datetime, self.time_representation)
            .map_err(RV3028Error::DateTime)?;
        self.write_time().await
    }

    /// Live read of the 12_24 bit in Control 2.
    pub async fn is_12_hour(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        Ok(self.control2().await?.time_representation() == TimeRepresentation::TwelveHour)
    }

    /// Switches the device to 12-hour mode, converting the current hour.
    pub async fn set_12_hour(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwelveHour)
            .await
    }

    /// Switches the device to 24-hour mode, converting the current hour.
    pub async fn set_24_hour(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwentyFourHour)
            .await
    }

    /// Changes the hour mode. The hours register is re-encoded so the device
    /// keeps the same time of day. Nothing is written if the device is
    /// already in the requested mode.
    pub async fn set_time_representation(
        &mut self,
        representation: TimeRepresentation,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control2().await?;
        let current = control.time_representation();
        if current == representation {
            self.time_representation = representation;
            self.time_representation_known = true;
            return Ok(());
        }

        let hours = Hours(self.read_byte(RegAddr::Hours as u8).await?);
        let converted = RV3028DateTime::convert_hours(hours, current, representation)
            .map_err(RV3028Error::DateTime)?;
        debug!(
            "hour mode change: 0x{:02x} -> 0x{:02x}",
            u8::from(hours),
            u8::from(converted)
        );

        control.set_time_representation(representation);
        self.set_control2(control).await?;
        self.write_byte(RegAddr::Hours as u8, converted.into())
            .await?;

        self.time.set_raw_hours(converted);
        self.time_representation = representation;
        self.time_representation_known = true;
        Ok(())
    }

    /// Writes the 32-bit UNIX time counter. Independent of the calendar time.
    pub async fn set_unix(&mut self, value: u32) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(RegAddr::UnixTime0 as u8, &value.to_le_bytes())
            .await
    }

    /// Reads the 32-bit UNIX time counter.
    pub async fn unix(&mut self) -> Result<u32, RV3028Error<I2C::Error>> {
        let mut bytes = [0u8; 4];
        self.read_registers(RegAddr::UnixTime0 as u8, &mut bytes)
            .await?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads the UNIX time counter until two consecutive reads agree, so a
    /// read racing the counter increment is not returned. Gives up after a
    /// few attempts and returns the last value read.
    pub async fn unix_stable(&mut self) -> Result<u32, RV3028Error<I2C::Error>> {
        let mut previous = self.unix().await?;
        for _ in 1..UNIX_READ_ATTEMPTS {
            let current = self.unix().await?;
            if current == previous {
                return Ok(current);
            }
            previous = current;
        }
        warn!("UNIX time did not settle, returning {}", previous);
        Ok(previous)
    }
}
