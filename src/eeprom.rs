//! EEPROM mirror access.
//!
//! Configuration bytes 0x30-0x3F live in EEPROM and are mirrored in RAM. The
//! device refreshes the mirror from EEPROM periodically, so every access
//! disables that refresh (EERD in Control 1) for its duration and re-enables it
//! at the end.
//!
//! Both sequences are fail-soft: every step runs even when an earlier step
//! failed, so refresh is re-enabled whenever the bus allows it. The one
//! exception is a read-modify-write of Control 1 whose read failed: its write
//! is withheld since the other bits of the register are unknown. The result
//! names the first step that failed.

use crate::hal::{DelayNs, I2c};
use crate::registers::{Control1, EepromCommand, RegAddr, Status};
use crate::{RV3028Error, RV3028};

/// Value returned by [`RV3028::read_eeprom_config_lossy`] when the read
/// failed. Also what an erased or absent configuration byte reads as.
pub const EEPROM_SENTINEL: u8 = 0xFF;

/// Busy-poll budget for EEPROM access.
///
/// Every busy-wait in a sequence gets the full budget. There is no clock to
/// read, so elapsed time is estimated: each poll counts as `poll_interval_us`
/// of sleep plus `poll_cost_us` for the status read itself. The default cost
/// fits a 100 kHz bus, where the read takes about 360 us.
///
/// A wait on a stuck busy flag therefore lasts about
/// `timeout_ms * (poll_interval_us + t_read) / (poll_interval_us + poll_cost_us)`,
/// where `t_read` is the real duration of one status read. On a faster bus the
/// wait ends early; set `poll_cost_us` to the measured read time to tighten it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromTiming {
    /// Budget of a single busy-wait in milliseconds
    pub timeout_ms: u32,
    /// Sleep between two status polls in microseconds
    pub poll_interval_us: u32,
    /// Estimated bus time of one status poll in microseconds
    pub poll_cost_us: u32,
}

impl Default for EepromTiming {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            poll_interval_us: 100,
            poll_cost_us: 400,
        }
    }
}

/// Steps of the EEPROM read and write sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromPhase {
    /// Wait for the EEPROM to be idle before starting
    WaitIdle,
    /// Set EERD to stop automatic refresh
    DisableRefresh,
    /// Write the value to its RAM mirror register
    WriteMirror,
    /// Write the EEPROM address register
    SetAddress,
    /// Issue the leading command byte
    CommandFirst,
    /// Issue the update (RAM to EEPROM) command
    CommandUpdate,
    /// Issue the single byte read command
    CommandReadSingle,
    /// Wait for the command to complete
    WaitCommand,
    /// Read the EEPROM data register
    ReadData,
    /// Wait after reading the data register
    WaitData,
    /// Clear EERD to restore automatic refresh
    EnableRefresh,
    /// Wait after restoring automatic refresh
    WaitRefresh,
}

/// Why an EEPROM step failed.
#[derive(Debug, PartialEq)]
pub enum EepromFault<E> {
    /// The bus transaction failed
    Bus(E),
    /// The busy flag did not clear within the budget
    Timeout,
    /// Control 1 read back as 0x00 although EERD had been set
    ControlReadback,
}

impl<E> From<E> for EepromFault<E> {
    fn from(e: E) -> Self {
        EepromFault::Bus(e)
    }
}

/// Collects step results, keeping the first failure.
struct Outcome<E> {
    first: Option<(EepromPhase, EepromFault<E>)>,
}

impl<E> Outcome<E> {
    fn new() -> Self {
        Self { first: None }
    }

    fn record<T>(&mut self, phase: EepromPhase, result: Result<T, EepromFault<E>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(fault) => {
                warn!("EEPROM step {:?} failed", phase);
                if self.first.is_none() {
                    self.first = Some((phase, fault));
                }
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, RV3028Error<E>> {
        match self.first {
            None => Ok(value),
            Some((phase, fault)) => {
                error!("EEPROM access failed at {:?}", phase);
                Err(RV3028Error::Eeprom { phase, fault })
            }
        }
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    /// Polls the status register until EEBUSY clears.
    ///
    /// A poll whose read fails counts as busy. At the deadline the wait fails
    /// with the last bus error if the final poll failed, otherwise with
    /// [`EepromFault::Timeout`].
    pub(crate) async fn wait_for_eeprom(&mut self) -> Result<(), EepromFault<I2C::Error>> {
        let budget_us = u64::from(self.eeprom_timing.timeout_ms) * 1000;
        let step_us = self.eeprom_timing.poll_interval_us.max(1);
        let poll_us = u64::from(step_us) + u64::from(self.eeprom_timing.poll_cost_us);
        let mut elapsed_us: u64 = 0;
        loop {
            let last_error = match self.read_byte(RegAddr::Status as u8).await {
                Ok(value) if !Status(value).eeprom_busy() => return Ok(()),
                Ok(_) => None,
                Err(e) => Some(e),
            };
            if elapsed_us >= budget_us {
                warn!("EEPROM still busy after {} us", elapsed_us);
                return Err(last_error.map_or(EepromFault::Timeout, EepromFault::Bus));
            }
            self.delay.delay_us(step_us).await;
            elapsed_us += poll_us;
        }
    }

    async fn disable_eeprom_refresh(&mut self) -> Result<(), EepromFault<I2C::Error>> {
        let mut control = Control1(self.read_byte(RegAddr::Control1 as u8).await?);
        control.set_eeprom_refresh_disable(true);
        self.write_byte(RegAddr::Control1 as u8, control.into())
            .await?;
        Ok(())
    }

    // The write goes out even when the readback is implausible.
    async fn enable_eeprom_refresh(&mut self) -> Result<(), EepromFault<I2C::Error>> {
        let raw = self.read_byte(RegAddr::Control1 as u8).await?;
        let mut control = Control1(raw);
        control.set_eeprom_refresh_disable(false);
        let written = self
            .write_byte(RegAddr::Control1 as u8, control.into())
            .await;
        if raw == 0x00 {
            return Err(EepromFault::ControlReadback);
        }
        written?;
        Ok(())
    }

    async fn eeprom_command(
        &mut self,
        command: EepromCommand,
    ) -> Result<(), EepromFault<I2C::Error>> {
        self.write_byte(RegAddr::EepromCommand as u8, command.into())
            .await?;
        Ok(())
    }

    /// Writes `value` to the EEPROM-mirrored configuration register at
    /// `address` and commits the configuration RAM to EEPROM.
    ///
    /// Steps, in order: wait for idle, set EERD, write the RAM mirror, issue
    /// `First` then `Update`, wait, clear EERD, wait. A Control 1 readback of
    /// 0x00 before clearing EERD counts as a failure.
    pub async fn write_eeprom_config(
        &mut self,
        address: u8,
        value: u8,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        debug!("EEPROM write 0x{:02x} = 0x{:02x}", address, value);
        let mut outcome = Outcome::new();

        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitIdle, result);
        let result = self.disable_eeprom_refresh().await;
        outcome.record(EepromPhase::DisableRefresh, result);
        let result = self.write_byte(address, value).await;
        outcome.record(EepromPhase::WriteMirror, result.map_err(EepromFault::Bus));
        let result = self.eeprom_command(EepromCommand::First).await;
        outcome.record(EepromPhase::CommandFirst, result);
        let result = self.eeprom_command(EepromCommand::Update).await;
        outcome.record(EepromPhase::CommandUpdate, result);
        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitCommand, result);
        let result = self.enable_eeprom_refresh().await;
        outcome.record(EepromPhase::EnableRefresh, result);
        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitRefresh, result);

        outcome.finish(())
    }

    /// Reads the EEPROM configuration byte at `address`.
    ///
    /// Steps, in order: wait for idle, set EERD, write the EEPROM address,
    /// issue `First` then `ReadSingle`, wait, read the data register, wait,
    /// clear EERD. The byte is returned only if every step succeeded.
    pub async fn read_eeprom_config(&mut self, address: u8) -> Result<u8, RV3028Error<I2C::Error>> {
        let mut outcome = Outcome::new();

        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitIdle, result);
        let result = self.disable_eeprom_refresh().await;
        outcome.record(EepromPhase::DisableRefresh, result);
        let result = self.write_byte(RegAddr::EepromAddress as u8, address).await;
        outcome.record(EepromPhase::SetAddress, result.map_err(EepromFault::Bus));
        let result = self.eeprom_command(EepromCommand::First).await;
        outcome.record(EepromPhase::CommandFirst, result);
        let result = self.eeprom_command(EepromCommand::ReadSingle).await;
        outcome.record(EepromPhase::CommandReadSingle, result);
        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitCommand, result);
        let result = self.read_byte(RegAddr::EepromData as u8).await;
        let data = outcome
            .record(EepromPhase::ReadData, result.map_err(EepromFault::Bus))
            .unwrap_or(EEPROM_SENTINEL);
        let result = self.wait_for_eeprom().await;
        outcome.record(EepromPhase::WaitData, result);
        let result = self.enable_eeprom_refresh().await;
        outcome.record(EepromPhase::EnableRefresh, result);

        let data = outcome.finish(data)?;
        debug!("EEPROM read 0x{:02x} = 0x{:02x}", address, data);
        Ok(data)
    }

    /// Like [`RV3028::read_eeprom_config`] but returns [`EEPROM_SENTINEL`]
    /// on any failure.
    pub async fn read_eeprom_config_lossy(&mut self, address: u8) -> u8 {
        self.read_eeprom_config(address)
            .await
            .unwrap_or(EEPROM_SENTINEL)
    }

    /// Read-modify-write of an EEPROM configuration byte. A byte reading back
    /// as [`EEPROM_SENTINEL`] is treated as unavailable and left untouched.
    pub(crate) async fn modify_eeprom_config<F>(
        &mut self,
        address: u8,
        f: F,
    ) -> Result<(), RV3028Error<I2C::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let current = self.read_eeprom_config(address).await?;
        if current == EEPROM_SENTINEL {
            warn!("EEPROM config 0x{:02x} unavailable", address);
            return Err(RV3028Error::ConfigUnavailable);
        }
        self.write_eeprom_config(address, f(current)).await
    }
}
