//! Register definitions and bitfield structures for the RV-3028-C7 RTC.
//!
//! This module contains all register addresses, EEPROM commands, bitfield
//! definitions and related types for interacting with the RV-3028-C7
//! Real-Time Clock registers.

use bitfield::bitfield;

/// Fixed 7-bit I2C address of the RV-3028-C7.
pub const RV3028_ADDRESS: u8 = 0x52;

/// Register addresses for the RV-3028-C7 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Weekday register (0-6)
    Weekday = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12)
    Month = 0x05,
    /// Year register (0-99, offset from 2000)
    Year = 0x06,
    /// Minutes alarm register
    MinutesAlarm = 0x07,
    /// Hours alarm register
    HoursAlarm = 0x08,
    /// Weekday/date alarm register
    WeekdayDateAlarm = 0x09,
    /// Countdown timer value, low byte
    TimerValue0 = 0x0A,
    /// Countdown timer value, high nibble
    TimerValue1 = 0x0B,
    /// Countdown timer status, low byte
    TimerStatus0 = 0x0C,
    /// Countdown timer status, high nibble
    TimerStatus1 = 0x0D,
    /// Status register
    Status = 0x0E,
    /// Control 1 register
    Control1 = 0x0F,
    /// Control 2 register
    Control2 = 0x10,
    /// General purpose bits
    GpBits = 0x11,
    /// Clock interrupt mask register
    ClockInterruptMask = 0x12,
    /// Event control register
    EventControl = 0x13,
    /// Time stamp event counter
    CountTs = 0x14,
    /// Time stamp seconds
    SecondsTs = 0x15,
    /// Time stamp minutes
    MinutesTs = 0x16,
    /// Time stamp hours
    HoursTs = 0x17,
    /// Time stamp date
    DateTs = 0x18,
    /// Time stamp month
    MonthTs = 0x19,
    /// Time stamp year
    YearTs = 0x1A,
    /// UNIX time counter, least significant byte
    UnixTime0 = 0x1B,
    /// UNIX time counter, byte 1
    UnixTime1 = 0x1C,
    /// UNIX time counter, byte 2
    UnixTime2 = 0x1D,
    /// UNIX time counter, most significant byte
    UnixTime3 = 0x1E,
    /// User RAM 1
    UserRam1 = 0x1F,
    /// User RAM 2
    UserRam2 = 0x20,
    /// Password byte 0
    Password0 = 0x21,
    /// Password byte 1
    Password1 = 0x22,
    /// Password byte 2
    Password2 = 0x23,
    /// Password byte 3
    Password3 = 0x24,
    /// EEPROM address register
    EepromAddress = 0x25,
    /// EEPROM data register
    EepromData = 0x26,
    /// EEPROM command register
    EepromCommand = 0x27,
    /// Hardware and version ID
    Id = 0x28,
    /// EEPROM-mirrored clock output configuration
    EepromClkout = 0x35,
    /// EEPROM-mirrored crystal offset
    EepromOffset = 0x36,
    /// EEPROM-mirrored backup power configuration
    EepromBackup = 0x37,
}

impl From<RegAddr> for u8 {
    fn from(v: RegAddr) -> Self {
        v as u8
    }
}

/// Commands accepted by the EEPROM command register (0x27).
///
/// Every command must be preceded by [`EepromCommand::First`].
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromCommand {
    /// Leading command byte, written before every other command
    First = 0x00,
    /// Copy all configuration RAM to EEPROM
    Update = 0x11,
    /// Copy all EEPROM to configuration RAM
    Refresh = 0x12,
    /// Write the data register to the EEPROM address in the address register
    WriteSingle = 0x21,
    /// Read the EEPROM address in the address register into the data register
    ReadSingle = 0x22,
}

impl From<EepromCommand> for u8 {
    fn from(v: EepromCommand) -> Self {
        v as u8
    }
}

/// Hour mode of the time and alarm registers (12_24 bit of Control 2).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Weekday/date alarm select (WADA bit of Control 1).
///
/// This controls whether the weekday/date alarm register matches against
/// the day of the week or the date of the month.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WeekdayDateSelect {
    /// Match against day of the week (0-6)
    Weekday = 0,
    /// Match against date of the month (1-31)
    Date = 1,
}
impl From<u8> for WeekdayDateSelect {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => WeekdayDateSelect::Weekday,
            1 => WeekdayDateSelect::Date,
            _ => panic!("Invalid value for WeekdayDateSelect: {}", v),
        }
    }
}
impl From<WeekdayDateSelect> for u8 {
    fn from(v: WeekdayDateSelect) -> Self {
        v as u8
    }
}

/// Periodic time update interrupt period (USEL bit of Control 1).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdatePeriod {
    /// Update event on every second
    Second = 0,
    /// Update event on every minute
    Minute = 1,
}
impl From<u8> for UpdatePeriod {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => UpdatePeriod::Second,
            1 => UpdatePeriod::Minute,
            _ => panic!("Invalid value for UpdatePeriod: {}", v),
        }
    }
}
impl From<UpdatePeriod> for u8 {
    fn from(v: UpdatePeriod) -> Self {
        v as u8
    }
}

/// Countdown timer clock frequency (TD bits of Control 1).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerFrequency {
    /// 4096 Hz, 244.14 µs per tick
    Hz4096 = 0b00,
    /// 64 Hz, 15.625 ms per tick
    Hz64 = 0b01,
    /// 1 Hz, one second per tick
    Hz1 = 0b10,
    /// 1/60 Hz, one minute per tick
    OnePerMinute = 0b11,
}
impl From<u8> for TimerFrequency {
    /// # Panics
    /// Panics if the value does not fit in two bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => TimerFrequency::Hz4096,
            0b01 => TimerFrequency::Hz64,
            0b10 => TimerFrequency::Hz1,
            0b11 => TimerFrequency::OnePerMinute,
            _ => panic!("Invalid value for TimerFrequency: {}", v),
        }
    }
}
impl From<TimerFrequency> for u8 {
    fn from(v: TimerFrequency) -> Self {
        v as u8
    }
}

/// Backup switchover mode (BSM bits of the EEPROM backup register).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackupSwitchoverMode {
    /// Switchover disabled
    Disabled = 0b00,
    /// Direct switching mode
    Direct = 0b01,
    /// Switchover disabled (alternate encoding)
    DisabledAlt = 0b10,
    /// Level switching mode
    Level = 0b11,
}
impl From<u8> for BackupSwitchoverMode {
    /// # Panics
    /// Panics if the value does not fit in two bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => BackupSwitchoverMode::Disabled,
            0b01 => BackupSwitchoverMode::Direct,
            0b10 => BackupSwitchoverMode::DisabledAlt,
            0b11 => BackupSwitchoverMode::Level,
            _ => panic!("Invalid value for BackupSwitchoverMode: {}", v),
        }
    }
}
impl From<BackupSwitchoverMode> for u8 {
    fn from(v: BackupSwitchoverMode) -> Self {
        v as u8
    }
}

/// Trickle charge series resistor (TCR bits of the EEPROM backup register).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrickleChargeResistor {
    /// 3 kΩ (factory default)
    R3k = 0b00,
    /// 5 kΩ
    R5k = 0b01,
    /// 9 kΩ
    R9k = 0b10,
    /// 15 kΩ
    R15k = 0b11,
}
impl From<u8> for TrickleChargeResistor {
    /// # Panics
    /// Panics if the value does not fit in two bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => TrickleChargeResistor::R3k,
            0b01 => TrickleChargeResistor::R5k,
            0b10 => TrickleChargeResistor::R9k,
            0b11 => TrickleChargeResistor::R15k,
            _ => panic!("Invalid value for TrickleChargeResistor: {}", v),
        }
    }
}
impl From<TrickleChargeResistor> for u8 {
    fn from(v: TrickleChargeResistor) -> Self {
        v as u8
    }
}

/// CLKOUT frequency (FD bits of the EEPROM clock output register).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOutFrequency {
    /// 32.768 kHz (factory default)
    Hz32768 = 0b000,
    /// 8192 Hz
    Hz8192 = 0b001,
    /// 1024 Hz
    Hz1024 = 0b010,
    /// 64 Hz
    Hz64 = 0b011,
    /// 32 Hz
    Hz32 = 0b100,
    /// 1 Hz
    Hz1 = 0b101,
    /// Predefined periodic countdown timer interrupt
    CountdownTimer = 0b110,
    /// CLKOUT held low
    Low = 0b111,
}
impl From<u8> for ClockOutFrequency {
    /// # Panics
    /// Panics if the value does not fit in three bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => ClockOutFrequency::Hz32768,
            0b001 => ClockOutFrequency::Hz8192,
            0b010 => ClockOutFrequency::Hz1024,
            0b011 => ClockOutFrequency::Hz64,
            0b100 => ClockOutFrequency::Hz32,
            0b101 => ClockOutFrequency::Hz1,
            0b110 => ClockOutFrequency::CountdownTimer,
            0b111 => ClockOutFrequency::Low,
            _ => panic!("Invalid value for ClockOutFrequency: {}", v),
        }
    }
}
impl From<ClockOutFrequency> for u8 {
    fn from(v: ClockOutFrequency) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours register. Bit 5 is the PM flag in 12-hour mode and the second
    /// tens bit in 24-hour mode.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// PM flag (12-hour mode only)
    pub pm, set_pm: 5;
    /// Tens place of hours in 24-hour mode (0-2)
    pub ten_hours_24, set_ten_hours_24: 5, 4;
    /// Tens place of hours in 12-hour mode (0-1)
    pub ten_hours_12, set_ten_hours_12: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Status register: event flags and the EEPROM busy flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// EEPROM memory busy (EEBUSY)
    pub eeprom_busy, set_eeprom_busy: 7;
    /// Clock output interrupt flag (CLKF)
    pub clock_output_flag, set_clock_output_flag: 6;
    /// Backup switch flag (BSF)
    pub backup_switch_flag, set_backup_switch_flag: 5;
    /// Periodic time update flag (UF)
    pub update_flag, set_update_flag: 4;
    /// Periodic countdown timer flag (TF)
    pub timer_flag, set_timer_flag: 3;
    /// Alarm flag (AF)
    pub alarm_flag, set_alarm_flag: 2;
    /// External event flag (EVF)
    pub event_flag, set_event_flag: 1;
    /// Power on reset flag (PORF)
    pub power_on_reset_flag, set_power_on_reset_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status(");
        let flags = [
            (self.eeprom_busy(), "EEBUSY"),
            (self.clock_output_flag(), "CLKF"),
            (self.backup_switch_flag(), "BSF"),
            (self.update_flag(), "UF"),
            (self.timer_flag(), "TF"),
            (self.alarm_flag(), "AF"),
            (self.event_flag(), "EVF"),
            (self.power_on_reset_flag(), "PORF"),
        ];
        let mut first = true;
        for (set, name) in flags {
            if set {
                if !first {
                    defmt::write!(f, ", ");
                }
                defmt::write!(f, "{=str}", name);
                first = false;
            }
        }
        if first {
            defmt::write!(f, "clear");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Control 1 register: countdown timer, alarm select and EEPROM refresh.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control1(u8);
    impl Debug;
    /// Countdown timer repeat mode (TRPT)
    pub timer_repeat, set_timer_repeat: 7;
    /// Weekday/date alarm select (WADA)
    pub from into WeekdayDateSelect, weekday_date_select, set_weekday_date_select: 5, 5;
    /// Update interrupt period select (USEL)
    pub from into UpdatePeriod, update_period, set_update_period: 4, 4;
    /// EEPROM memory refresh disable (EERD)
    pub eeprom_refresh_disable, set_eeprom_refresh_disable: 3;
    /// Countdown timer enable (TE)
    pub timer_enable, set_timer_enable: 2;
    /// Countdown timer clock frequency (TD)
    pub from into TimerFrequency, timer_frequency, set_timer_frequency: 1, 0;
}
from_register_u8!(Control1);

bitfield! {
    /// Control 2 register: interrupt enables and hour mode.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control2(u8);
    impl Debug;
    /// Time stamp enable (TSE)
    pub time_stamp_enable, set_time_stamp_enable: 7;
    /// Interrupt controlled clock output enable (CLKIE)
    pub clock_interrupt_enable, set_clock_interrupt_enable: 6;
    /// Periodic time update interrupt enable (UIE)
    pub update_interrupt_enable, set_update_interrupt_enable: 5;
    /// Countdown timer interrupt enable (TIE)
    pub timer_interrupt_enable, set_timer_interrupt_enable: 4;
    /// Alarm interrupt enable (AIE)
    pub alarm_interrupt_enable, set_alarm_interrupt_enable: 3;
    /// External event interrupt enable (EIE)
    pub event_interrupt_enable, set_event_interrupt_enable: 2;
    /// 12/24 hour mode (12_24)
    pub from into TimeRepresentation, time_representation, set_time_representation: 1, 1;
    /// Software reset (RESET)
    pub reset, set_reset: 0;
}
from_register_u8!(Control2);

bitfield! {
    /// Clock interrupt mask register: which interrupts drive CLKOUT.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct ClockInterruptMask(u8);
    impl Debug;
    /// Clock output on external event (CEIE)
    pub event, set_event: 3;
    /// Clock output on alarm (CAIE)
    pub alarm, set_alarm: 2;
    /// Clock output on countdown timer (CTIE)
    pub timer, set_timer: 1;
    /// Clock output on periodic time update (CUIE)
    pub update, set_update: 0;
}
from_register_u8!(ClockInterruptMask);

bitfield! {
    /// Minutes alarm register. A set mask bit (AE_M) excludes the field from
    /// the alarm comparison.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit (AE_M)
    pub alarm_mask, set_alarm_mask: 7;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Hours alarm register with mask bit (AE_H).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit (AE_H)
    pub alarm_mask, set_alarm_mask: 7;
    /// Tens place of hours in 24-hour mode (0-2)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Weekday/date alarm register with mask bit (AE_WD).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmWeekdayDate(u8);
    impl Debug;
    /// Alarm mask bit (AE_WD)
    pub alarm_mask, set_alarm_mask: 7;
    /// Tens place of date (0-3), zero for a weekday alarm
    pub ten_date, set_ten_date: 5, 4;
    /// Weekday (0-6) or ones place of date (0-9)
    pub weekday_or_date, set_weekday_or_date: 3, 0;
}
from_register_u8!(AlarmWeekdayDate);

bitfield! {
    /// EEPROM backup register (0x37): trickle charger and backup switchover.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct EepromBackup(u8);
    impl Debug;
    /// Least significant bit of the crystal offset (EEOffset)
    pub ee_offset_lsb, set_ee_offset_lsb: 7;
    /// Backup switchover interrupt enable (BSIE)
    pub backup_switchover_interrupt_enable, set_backup_switchover_interrupt_enable: 6;
    /// Trickle charge enable (TCE)
    pub trickle_charge_enable, set_trickle_charge_enable: 5;
    /// Fast edge detection enable (FEDE)
    pub fast_edge_detection, set_fast_edge_detection: 4;
    /// Backup switchover mode (BSM)
    pub from into BackupSwitchoverMode, backup_switchover_mode, set_backup_switchover_mode: 3, 2;
    /// Trickle charge series resistor (TCR)
    pub from into TrickleChargeResistor, trickle_charge_resistor, set_trickle_charge_resistor: 1, 0;
}
from_register_u8!(EepromBackup);

#[cfg(feature = "defmt")]
impl defmt::Format for EepromBackup {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "EepromBackup(bsm={}, tcr={}, tce={}, fede={}, bsie={})",
            self.backup_switchover_mode(),
            self.trickle_charge_resistor(),
            self.trickle_charge_enable(),
            self.fast_edge_detection(),
            self.backup_switchover_interrupt_enable()
        );
    }
}

bitfield! {
    /// EEPROM clock output register (0x35).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct EepromClkout(u8);
    impl Debug;
    /// CLKOUT enable (CLKOE)
    pub clock_output_enable, set_clock_output_enable: 7;
    /// CLKOUT synchronized enable (CLKSY)
    pub clock_output_synchronized, set_clock_output_synchronized: 6;
    /// Power on reset interrupt enable (PORIE)
    pub power_on_reset_interrupt_enable, set_power_on_reset_interrupt_enable: 3;
    /// CLKOUT frequency selection (FD)
    pub from into ClockOutFrequency, clock_output_frequency, set_clock_output_frequency: 2, 0;
}
from_register_u8!(EepromClkout);

bitfield! {
    /// ID register (0x28).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Id(u8);
    impl Debug;
    /// Hardware identification (HID)
    pub hardware_id, _: 7, 4;
    /// Version identification (VID)
    pub version_id, _: 3, 0;
}
from_register_u8!(Id);
