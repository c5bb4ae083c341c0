//! # RV-3028-C7 RTC Alarm Example for ESP32
//!
//! Sets a known date and time on the RV-3028-C7, programs the alarm for one
//! minute later and polls the clock every 100ms, printing the time whenever
//! it changes along with the alarm flag and the INT pin level.
//!
//! ## Hardware Connections
//! - **SDA**: GPIO23 (I2C Data)
//! - **SCL**: GPIO15 (I2C Clock)
//! - **INT**: GPIO22 (open drain interrupt output, needs a pull-up)
//!
//! ## Operation
//! 1. Applies the default setup (24-hour mode, trickle charger off, level
//!    switching backup switchover, status cleared)
//! 2. Sets the time to 2024-12-20 14:30:00
//! 3. Programs the alarm for 14:31 on any day and enables its interrupt
//! 4. Prints time, alarm flag and INT level on every change
//! 5. Clears the alarm flag when the alarm fires
//!
//! ## Expected Output
//! ```
//! Time: 2024-12-20  14:30:45 | Alarm: clear | INT: HIGH
//! Time: 2024-12-20  14:31:00 | Alarm: TRIGGERED | INT: LOW
//! ALARM TRIGGERED! Clearing flag...
//! ```

#![no_std]
#![no_main]

use chrono::NaiveDate;
use esp_backtrace as _;
use esp_hal::time::Rate;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    main,
    time::{Duration, Instant},
};
use log::info;
use rv3028c7::{AlarmConfig, AlarmDay, AlarmMode, Config, RV3028};

#[main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("RV-3028-C7 Alarm Example Starting...");

    let int_pin = Input::new(
        peripherals.GPIO22,
        InputConfig::default().with_pull(Pull::Up),
    );

    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(100));
    let i2c = I2c::new(peripherals.I2C0, i2c_config)
        .unwrap()
        .with_sda(peripherals.GPIO23)
        .with_scl(peripherals.GPIO15);

    let mut rtc = RV3028::new(i2c, Delay::new());

    match rtc.id() {
        Ok(id) => info!(
            "RV-3028-C7 found: hardware {} version {}",
            id.hardware_id(),
            id.version_id()
        ),
        Err(e) => {
            info!("No RTC on the bus: {:?}", e);
            panic!("RV-3028-C7 not found");
        }
    }

    match rtc.configure(&Config::default()) {
        Ok(_) => info!("RV-3028-C7 configured successfully"),
        Err(e) => {
            info!("Failed to configure RV-3028-C7: {:?}", e);
            panic!("RV-3028-C7 configuration failed");
        }
    }

    let initial_datetime = NaiveDate::from_ymd_opt(2024, 12, 20)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();

    match rtc.set_datetime(&initial_datetime) {
        Ok(_) => info!("Initial time set to: {}", rtc.format_timestamp()),
        Err(e) => {
            info!("Failed to set initial time: {:?}", e);
            panic!("Failed to set initial time");
        }
    }

    // The day is ignored in this mode, so the alarm fires daily at 14:31
    let alarm_config = AlarmConfig {
        minute: 31,
        hour: 14,
        day: AlarmDay::Weekday(0),
        mode: AlarmMode::MinutesHours,
    };

    match rtc.set_alarm(&alarm_config) {
        Ok(_) => info!("Alarm set for 14:31"),
        Err(e) => {
            info!("Failed to set alarm: {:?}", e);
            panic!("Failed to set alarm");
        }
    }

    info!("Starting time monitoring...");

    let mut last_seconds: Option<u8> = None;
    let mut last_alarm_flag = false;
    let mut last_pin_level = int_pin.is_high();

    loop {
        let loop_start = Instant::now();

        match rtc.update_time() {
            Ok(_) => {
                let alarm_flag = rtc.alarm_flag().unwrap_or(false);
                let pin_level = int_pin.is_high();

                let time_changed = last_seconds != Some(rtc.seconds());
                let alarm_changed = last_alarm_flag != alarm_flag;
                let pin_changed = last_pin_level != pin_level;

                if time_changed || alarm_changed || pin_changed {
                    info!(
                        "Time: {} | Alarm: {} | INT: {}",
                        rtc.format_timestamp(),
                        if alarm_flag { "TRIGGERED" } else { "clear" },
                        if pin_level { "HIGH" } else { "LOW" }
                    );

                    if alarm_flag && !last_alarm_flag {
                        info!("ALARM TRIGGERED! Clearing flag...");
                        match rtc.clear_alarm_flag() {
                            Ok(_) => info!("Alarm flag cleared"),
                            Err(e) => info!("Failed to clear alarm flag: {:?}", e),
                        }
                    }

                    last_seconds = Some(rtc.seconds());
                    last_alarm_flag = alarm_flag;
                    last_pin_level = pin_level;
                }
            }
            Err(e) => {
                info!("Failed to read time: {:?}", e);
            }
        }

        while loop_start.elapsed() < Duration::from_millis(100) {
            // Busy wait
        }
    }
}
