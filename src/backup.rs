//! EEPROM-backed configuration: trickle charger, backup switchover and the
//! clock output.
//!
//! Each setter is a read-modify-write of one configuration byte through the
//! EEPROM mirror sequence. A byte that reads back as 0xFF is treated as
//! unavailable: the setter returns [`RV3028Error::ConfigUnavailable`] and
//! writes nothing.

use crate::hal::{DelayNs, I2c};
use crate::registers::{
    BackupSwitchoverMode, ClockOutFrequency, EepromBackup, EepromClkout, RegAddr,
    TrickleChargeResistor,
};
use crate::{RV3028Error, RV3028};

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c, D: DelayNs> RV3028<I2C, D> {
    async fn modify_backup<F>(&mut self, f: F) -> Result<(), RV3028Error<I2C::Error>>
    where
        F: FnOnce(&mut EepromBackup),
    {
        self.modify_eeprom_config(RegAddr::EepromBackup as u8, |raw| {
            let mut backup = EepromBackup(raw);
            f(&mut backup);
            backup.into()
        })
        .await
    }

    async fn modify_clkout<F>(&mut self, f: F) -> Result<(), RV3028Error<I2C::Error>>
    where
        F: FnOnce(&mut EepromClkout),
    {
        self.modify_eeprom_config(RegAddr::EepromClkout as u8, |raw| {
            let mut clkout = EepromClkout(raw);
            f(&mut clkout);
            clkout.into()
        })
        .await
    }

    /// Reads the EEPROM backup register (0x37).
    pub async fn backup_config(&mut self) -> Result<EepromBackup, RV3028Error<I2C::Error>> {
        Ok(EepromBackup(
            self.read_eeprom_config(RegAddr::EepromBackup as u8).await?,
        ))
    }

    /// Reads the EEPROM clock output register (0x35).
    pub async fn clock_output_config(&mut self) -> Result<EepromClkout, RV3028Error<I2C::Error>> {
        Ok(EepromClkout(
            self.read_eeprom_config(RegAddr::EepromClkout as u8).await?,
        ))
    }

    /// Trickle charge enable (TCE).
    pub async fn enable_trickle_charge(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_backup(|backup| backup.set_trickle_charge_enable(enable))
            .await
    }

    /// Trickle charge series resistor (TCR).
    pub async fn set_trickle_charge_resistor(
        &mut self,
        resistor: TrickleChargeResistor,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_backup(|backup| backup.set_trickle_charge_resistor(resistor))
            .await
    }

    /// Backup switchover mode (BSM). Fast edge detection (FEDE) is always
    /// set along with it.
    pub async fn set_backup_switchover_mode(
        &mut self,
        mode: BackupSwitchoverMode,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_backup(|backup| {
            backup.set_fast_edge_detection(true);
            backup.set_backup_switchover_mode(mode);
        })
        .await
    }

    /// Backup switchover interrupt enable (BSIE).
    pub async fn enable_backup_switchover_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_backup(|backup| backup.set_backup_switchover_interrupt_enable(enable))
            .await
    }

    /// Clock output enable (CLKOE).
    pub async fn enable_clock_output(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_clkout(|clkout| clkout.set_clock_output_enable(enable))
            .await
    }

    /// Clock output frequency (FD).
    pub async fn set_clock_output_frequency(
        &mut self,
        frequency: ClockOutFrequency,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_clkout(|clkout| clkout.set_clock_output_frequency(frequency))
            .await
    }

    /// Synchronized clock output enable (CLKSY).
    pub async fn enable_clock_output_synchronize(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_clkout(|clkout| clkout.set_clock_output_synchronized(enable))
            .await
    }

    /// Power on reset interrupt enable (PORIE).
    pub async fn enable_power_on_reset_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.modify_clkout(|clkout| clkout.set_power_on_reset_interrupt_enable(enable))
            .await
    }
}

#[cfg(all(test, not(feature = "async")))]
mod tests {
    use super::*;
    use crate::sim::{Access, SimDelay, SimDevice};
    use crate::{Config, EepromPhase, TimeRepresentation};

    const BACKUP: u8 = 0x37;
    const CLKOUT: u8 = 0x35;

    fn device_with(address: u8, value: u8) -> RV3028<SimDevice, SimDelay> {
        let mut sim = SimDevice::new();
        sim.set_eeprom(address, value);
        RV3028::new(sim, SimDelay::default())
    }

    fn wrote_to(dev: &RV3028<SimDevice, SimDelay>, register: u8) -> bool {
        dev.i2c
            .log
            .iter()
            .any(|access| matches!(access, Access::Write { register: r, .. } if *r == register))
    }

    #[test]
    fn test_trickle_charge() {
        let mut dev = device_with(BACKUP, 0x1C);
        dev.set_trickle_charge_resistor(TrickleChargeResistor::R9k)
            .unwrap();
        dev.enable_trickle_charge(true).unwrap();
        assert_eq!(dev.i2c.eeprom(BACKUP), 0x3E);

        let backup = dev.backup_config().unwrap();
        assert!(backup.trickle_charge_enable());
        assert_eq!(backup.trickle_charge_resistor(), TrickleChargeResistor::R9k);

        dev.enable_trickle_charge(false).unwrap();
        assert_eq!(dev.i2c.eeprom(BACKUP), 0x1E);
    }

    #[test]
    fn test_backup_switchover_mode_forces_fast_edge_detection() {
        let mut dev = device_with(BACKUP, 0x00);
        dev.set_backup_switchover_mode(BackupSwitchoverMode::Direct)
            .unwrap();
        let backup = EepromBackup(dev.i2c.eeprom(BACKUP));
        assert!(backup.fast_edge_detection());
        assert_eq!(backup.backup_switchover_mode(), BackupSwitchoverMode::Direct);
    }

    #[test]
    fn test_backup_switchover_interrupt_toggles_only_bsie() {
        let mut dev = device_with(BACKUP, 0x1C);
        dev.enable_backup_switchover_interrupt(true).unwrap();
        assert_eq!(dev.i2c.eeprom(BACKUP), 0x5C);
        dev.enable_backup_switchover_interrupt(false).unwrap();
        assert_eq!(dev.i2c.eeprom(BACKUP), 0x1C);
    }

    #[test]
    fn test_clock_output_settings() {
        let mut dev = device_with(CLKOUT, 0x00);
        dev.enable_clock_output(true).unwrap();
        dev.set_clock_output_frequency(ClockOutFrequency::Hz1)
            .unwrap();
        dev.enable_clock_output_synchronize(true).unwrap();
        dev.enable_power_on_reset_interrupt(true).unwrap();
        assert_eq!(dev.i2c.eeprom(CLKOUT), 0b1100_1101);

        let clkout = dev.clock_output_config().unwrap();
        assert_eq!(clkout.clock_output_frequency(), ClockOutFrequency::Hz1);

        dev.enable_clock_output(false).unwrap();
        assert_eq!(dev.i2c.eeprom(CLKOUT), 0b0100_1101);
    }

    #[test]
    fn test_unavailable_config_performs_no_writes() {
        let mut dev = device_with(BACKUP, 0xFF);
        dev.i2c.set_eeprom(CLKOUT, 0xFF);

        assert!(matches!(
            dev.enable_trickle_charge(true),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.set_trickle_charge_resistor(TrickleChargeResistor::R3k),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.set_backup_switchover_mode(BackupSwitchoverMode::Level),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.enable_backup_switchover_interrupt(true),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.enable_clock_output(true),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.set_clock_output_frequency(ClockOutFrequency::Hz64),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.enable_clock_output_synchronize(true),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert!(matches!(
            dev.enable_power_on_reset_interrupt(true),
            Err(RV3028Error::ConfigUnavailable)
        ));

        assert!(!wrote_to(&dev, BACKUP));
        assert!(!wrote_to(&dev, CLKOUT));
        assert!(!dev
            .i2c
            .writes()
            .iter()
            .any(|&(register, value)| register == 0x27 && value == 0x11));
        assert_eq!(dev.i2c.eeprom(BACKUP), 0xFF);
    }

    #[test]
    fn test_failed_read_performs_no_update() {
        let mut sim = SimDevice::new();
        sim.set_eeprom(BACKUP, 0x1C);
        sim.fail_reads_of(0x26);
        let mut dev = RV3028::new(sim, SimDelay::default());

        assert!(matches!(
            dev.enable_trickle_charge(true),
            Err(RV3028Error::Eeprom {
                phase: EepromPhase::ReadData,
                ..
            })
        ));
        assert!(!wrote_to(&dev, BACKUP));
        assert_eq!(dev.i2c.eeprom(BACKUP), 0x1C);
    }

    #[test]
    fn test_configure_applies_setup() {
        let mut sim = SimDevice::new();
        sim.set_eeprom(BACKUP, 0x00);
        sim.set_register(0x0E, 0x05);
        let mut dev = RV3028::new(sim, SimDelay::default());

        let config = Config {
            time_representation: TimeRepresentation::TwelveHour,
            trickle_charge: Some(TrickleChargeResistor::R5k),
            backup_switchover_mode: BackupSwitchoverMode::Level,
            clear_status: true,
        };
        dev.configure(&config).unwrap();

        assert!(dev.is_12_hour().unwrap());
        let backup = EepromBackup(dev.i2c.eeprom(BACKUP));
        assert!(backup.trickle_charge_enable());
        assert_eq!(backup.trickle_charge_resistor(), TrickleChargeResistor::R5k);
        assert_eq!(backup.backup_switchover_mode(), BackupSwitchoverMode::Level);
        assert!(backup.fast_edge_detection());
        assert_eq!(dev.i2c.register(0x0E), 0x00);
    }

    #[test]
    fn test_configure_stops_on_unavailable_config() {
        let mut dev = device_with(BACKUP, 0xFF);
        dev.i2c.set_register(0x0E, 0x01);
        assert!(matches!(
            dev.configure(&Config::default()),
            Err(RV3028Error::ConfigUnavailable)
        ));
        assert_eq!(dev.i2c.register(0x0E), 0x01);
    }
}
