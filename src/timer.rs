//! Periodic countdown timer and periodic time update interrupt.
//!
//! The countdown timer counts a 12-bit value (registers 0x0A/0x0B) down at the
//! frequency selected by TD and raises TF when it reaches zero. The periodic
//! time update raises UF every second or every minute (USEL).

use crate::hal::{DelayNs, I2c};
use crate::registers::{RegAddr, TimerFrequency, UpdatePeriod};
use crate::{RV3028Error, RV3028};

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Writes the countdown timer reload value, low byte first. Only the
    /// lower 12 bits are used by the device.
    pub async fn set_timer_duration(&mut self, duration: u16) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(RegAddr::TimerValue0 as u8, &duration.to_le_bytes())
            .await
    }

    /// Reads the countdown timer reload value.
    pub async fn timer_duration(&mut self) -> Result<u16, RV3028Error<I2C::Error>> {
        let mut bytes = [0u8; 2];
        self.read_registers(RegAddr::TimerValue0 as u8, &mut bytes)
            .await?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Reads the current countdown value.
    pub async fn timer_current(&mut self) -> Result<u16, RV3028Error<I2C::Error>> {
        let mut bytes = [0u8; 2];
        self.read_registers(RegAddr::TimerStatus0 as u8, &mut bytes)
            .await?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Starts or stops the countdown timer (TE).
    pub async fn enable_timer(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control1().await?;
        control.set_timer_enable(enable);
        self.set_control1(control).await
    }

    /// Reloads the timer automatically when it reaches zero (TRPT).
    pub async fn enable_timer_repeat(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control1().await?;
        control.set_timer_repeat(enable);
        self.set_control1(control).await
    }

    /// Countdown timer interrupt enable (TIE).
    pub async fn enable_timer_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control2().await?;
        control.set_timer_interrupt_enable(enable);
        self.set_control2(control).await
    }

    /// Countdown timer clock frequency (TD).
    pub async fn set_timer_frequency(
        &mut self,
        frequency: TimerFrequency,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control1().await?;
        control.set_timer_frequency(frequency);
        debug!("timer frequency {:?}, control1=0x{:02x}", frequency, u8::from(control));
        self.set_control1(control).await
    }

    /// Countdown timer flag (TF).
    pub async fn timer_flag(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        Ok(self.status().await?.timer_flag())
    }

    /// Clears the countdown timer flag, leaving the other flags as they are.
    pub async fn clear_timer_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.set_timer_flag(false);
        self.set_status(status).await
    }

    /// Periodic time update interrupt enable (UIE).
    pub async fn enable_update_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control2().await?;
        control.set_update_interrupt_enable(enable);
        self.set_control2(control).await
    }

    /// Routes the periodic time update to the clock output (CUIE).
    pub async fn enable_clock_update_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut mask = self.clock_interrupt_mask().await?;
        mask.set_update(enable);
        self.set_clock_interrupt_mask(mask).await
    }

    /// Selects a periodic time update every second or every minute (USEL).
    pub async fn set_update_period(
        &mut self,
        period: UpdatePeriod,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control = self.control1().await?;
        control.set_update_period(period);
        self.set_control1(control).await
    }

    /// Periodic time update flag (UF).
    pub async fn update_flag(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        Ok(self.status().await?.update_flag())
    }

    /// Clears the periodic time update flag.
    pub async fn clear_update_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.set_update_flag(false);
        self.set_status(status).await
    }
}
