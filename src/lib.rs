#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

use failure::Fail;

pub type AResult<T> = Result<T, failure::Error>;

pub mod bits;
pub mod chip;
pub mod eeprom;
pub mod gpio;
pub mod shift_register;
pub mod wiring;

#[cfg(test)]
mod sim;

pub use self::eeprom::Eeprom;
pub use self::shift_register::{
	ShiftRegister,
	ShiftRegisterLines,
};

/// Contract violations detected before any line is driven.
#[derive(Clone, Debug, PartialEq, Eq, Fail)]
pub enum Misuse {
	#[fail(display = "address 0x{:x} doesn't fit the {}-bit address bus", address, bits)]
	AddressOutOfRange {
		address: u64,
		bits: usize,
	},
	#[fail(display = "expected {} {} lines, got {}", expected, what, got)]
	LineCount {
		what: &'static str,
		expected: usize,
		got: usize,
	},
	#[fail(display = "line {} is wired to more than one signal", line)]
	LineReused {
		line: u32,
	},
	#[fail(display = "chip {} has no {} command", chip, command)]
	UnsupportedCommand {
		chip: &'static str,
		command: crate::chip::Command,
	},
}
