//! Simulated RV-3028-C7 for tests.
//!
//! A register file behind an `embedded_hal::i2c::I2c` implementation that
//! models register auto-increment, the EEPROM command/address/data registers,
//! the EEBUSY flag and injected bus failures. Every attempted register access
//! is logged, including the failed ones.

extern crate alloc;

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::RV3028_ADDRESS;

const STATUS: u8 = 0x0E;
const EEPROM_ADDRESS: u8 = 0x25;
const EEPROM_DATA: u8 = 0x26;
const EEPROM_COMMAND: u8 = 0x27;
const CONFIG_START: usize = 0x30;
const REGISTERS: usize = 0x40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Access {
    Read { register: u8, value: Option<u8> },
    Write { register: u8, value: u8, ok: bool },
}

#[derive(Debug)]
pub(crate) struct SimDevice {
    registers: [u8; REGISTERS],
    eeprom: [u8; REGISTERS],
    pointer: u8,
    first_command: bool,
    busy_polls: u32,
    busy_remaining: u32,
    stuck_busy: bool,
    failing_writes: Vec<u8>,
    failing_reads: Vec<u8>,
    pub(crate) log: Vec<Access>,
}

impl SimDevice {
    pub(crate) fn new() -> Self {
        let mut registers = [0; REGISTERS];
        // 2000-01-01, Saturday
        registers[0x03] = 0x06;
        registers[0x04] = 0x01;
        registers[0x05] = 0x01;
        registers[0x28] = 0x31;
        Self {
            registers,
            eeprom: [0; REGISTERS],
            pointer: 0,
            first_command: false,
            busy_polls: 0,
            busy_remaining: 0,
            stuck_busy: false,
            failing_writes: Vec::new(),
            failing_reads: Vec::new(),
            log: Vec::new(),
        }
    }

    pub(crate) fn register(&self, register: u8) -> u8 {
        self.registers[usize::from(register)]
    }

    pub(crate) fn set_register(&mut self, register: u8, value: u8) {
        self.registers[usize::from(register)] = value;
    }

    pub(crate) fn eeprom(&self, address: u8) -> u8 {
        self.eeprom[usize::from(address)]
    }

    /// Sets an EEPROM byte and, for configuration bytes, its RAM mirror.
    pub(crate) fn set_eeprom(&mut self, address: u8, value: u8) {
        let address = usize::from(address);
        self.eeprom[address] = value;
        if address >= CONFIG_START {
            self.registers[address] = value;
        }
    }

    /// Number of status polls that report busy after each EEPROM command.
    pub(crate) fn set_busy_polls(&mut self, polls: u32) {
        self.busy_polls = polls;
    }

    pub(crate) fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    /// Fails writes carrying data to `register`. The register select of a
    /// read still goes through.
    pub(crate) fn fail_writes_to(&mut self, register: u8) {
        self.failing_writes.push(register);
    }

    pub(crate) fn fail_reads_of(&mut self, register: u8) {
        self.failing_reads.push(register);
    }

    /// Successful writes in order.
    pub(crate) fn writes(&self) -> Vec<(u8, u8)> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write {
                    register,
                    value,
                    ok: true,
                } => Some((register, value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }

    fn read_next(&mut self) -> u8 {
        let register = self.pointer;
        self.pointer = self.pointer.wrapping_add(1) % REGISTERS as u8;
        let mut value = self.registers[usize::from(register)];
        if register == STATUS {
            let busy = self.stuck_busy || self.busy_remaining > 0;
            self.busy_remaining = self.busy_remaining.saturating_sub(1);
            value = if busy { value | 0x80 } else { value & 0x7F };
        }
        value
    }

    fn write_next(&mut self, value: u8) {
        let register = self.pointer;
        self.pointer = self.pointer.wrapping_add(1) % REGISTERS as u8;
        match register {
            STATUS => self.registers[usize::from(STATUS)] = value & 0x7F,
            EEPROM_COMMAND => self.command(value),
            _ => self.registers[usize::from(register)] = value,
        }
    }

    fn command(&mut self, command: u8) {
        self.registers[usize::from(EEPROM_COMMAND)] = command;
        if command == 0x00 {
            self.first_command = true;
            return;
        }
        if !self.first_command {
            return;
        }
        self.first_command = false;
        let address = usize::from(self.registers[usize::from(EEPROM_ADDRESS)]) % REGISTERS;
        match command {
            0x11 => self.eeprom[CONFIG_START..].copy_from_slice(&self.registers[CONFIG_START..]),
            0x12 => self.registers[CONFIG_START..].copy_from_slice(&self.eeprom[CONFIG_START..]),
            0x21 => self.eeprom[address] = self.registers[usize::from(EEPROM_DATA)],
            0x22 => self.registers[usize::from(EEPROM_DATA)] = self.eeprom[address],
            _ => return,
        }
        self.busy_remaining = self.busy_polls;
    }
}

impl ErrorType for SimDevice {
    type Error = ErrorKind;
}

impl I2c for SimDevice {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != RV3028_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&register, values)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = register % REGISTERS as u8;
                    if !values.is_empty() && self.failing_writes.contains(&register) {
                        for (offset, &value) in values.iter().enumerate() {
                            self.log.push(Access::Write {
                                register: register.wrapping_add(offset as u8),
                                value,
                                ok: false,
                            });
                        }
                        return Err(ErrorKind::Other);
                    }
                    for &value in values.iter() {
                        let register = self.pointer;
                        self.write_next(value);
                        self.log.push(Access::Write {
                            register,
                            value,
                            ok: true,
                        });
                    }
                }
                Operation::Read(buffer) => {
                    let register = self.pointer;
                    if self.failing_reads.contains(&register) {
                        self.log.push(Access::Read {
                            register,
                            value: None,
                        });
                        return Err(ErrorKind::Other);
                    }
                    for byte in buffer.iter_mut() {
                        let register = self.pointer;
                        *byte = self.read_next();
                        self.log.push(Access::Read {
                            register,
                            value: Some(*byte),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only counts the time it was asked to sleep.
#[derive(Debug, Default)]
pub(crate) struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    pub(crate) fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1000
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
