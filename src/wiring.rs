//! Which GPIO line carries which signal.

use std::collections::HashSet;
use std::fmt;
use std::str;

use crate::bits::DATA_BUS_WIDTH;
use crate::gpio::{
	Delay,
	DigitalLine,
};
use crate::{
	Eeprom,
	Misuse,
	ShiftRegister,
	ShiftRegisterLines,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ShiftRegisterPins {
	pub ser: u32,
	pub oe: u32,
	pub rclk: u32,
	pub srclk: u32,
	pub srclr: u32,
}

impl Default for ShiftRegisterPins {
	fn default() -> Self {
		ShiftRegisterPins {
			ser: 5,
			oe: 6,
			rclk: 7,
			srclk: 8,
			srclr: 9,
		}
	}
}

/// Comma separated list of line numbers, e.g. "10,11,12"
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PinList(pub Vec<u32>);

impl fmt::Display for PinList {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, pin) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{}", pin)?;
		}
		Ok(())
	}
}

impl str::FromStr for PinList {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut pins = Vec::new();
		for part in s.split(',') {
			let part = part.trim();
			ensure!(!part.is_empty(), "empty entry in line list: {:?}", s);
			let pin = with_context!(("invalid line number {:?}", part),
				Ok(part.parse::<u32>()?)
			)?;
			pins.push(pin);
		}
		Ok(PinList(pins))
	}
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Wiring {
	pub shift_register: ShiftRegisterPins,
	/// data lines D0..D7
	pub io: Vec<u32>,
	pub ce: u32,
	pub oe: u32,
	pub we: u32,
}

impl Default for Wiring {
	fn default() -> Self {
		Wiring {
			shift_register: ShiftRegisterPins::default(),
			io: (10..=17).collect(),
			ce: 20,
			oe: 19,
			we: 18,
		}
	}
}

impl Wiring {
	fn all_lines(&self) -> Vec<u32> {
		let sr = &self.shift_register;
		let mut lines = vec![sr.ser, sr.oe, sr.rclk, sr.srclk, sr.srclr];
		lines.extend(self.io.iter().cloned());
		lines.extend(&[self.ce, self.oe, self.we]);
		lines
	}

	/// exactly 8 data lines, and no line used twice
	pub fn validate(&self) -> Result<(), Misuse> {
		if self.io.len() != DATA_BUS_WIDTH {
			return Err(Misuse::LineCount {
				what: "data",
				expected: DATA_BUS_WIDTH,
				got: self.io.len(),
			});
		}
		let mut seen = HashSet::new();
		for line in self.all_lines() {
			if !seen.insert(line) {
				return Err(Misuse::LineReused { line });
			}
		}
		Ok(())
	}

	/// Open every line through `open_line` and build the programmer.
	pub fn build<L, D, F>(&self, mut open_line: F, delay: D) -> crate::AResult<Eeprom<L, D>>
	where
		L: DigitalLine,
		D: Delay,
		F: FnMut(u32) -> crate::AResult<L>,
	{
		self.validate()?;
		debug!("wiring: {}", self);

		let pins = &self.shift_register;
		let sr = ShiftRegister::new(ShiftRegisterLines {
			ser: open_line(pins.ser)?,
			oe: open_line(pins.oe)?,
			rclk: open_line(pins.rclk)?,
			srclk: open_line(pins.srclk)?,
			srclr: open_line(pins.srclr)?,
		})?;
		let mut io = Vec::with_capacity(self.io.len());
		for line in self.io.iter() {
			io.push(open_line(*line)?);
		}
		let ce = open_line(self.ce)?;
		let oe = open_line(self.oe)?;
		let we = open_line(self.we)?;

		Eeprom::new(sr, io, ce, oe, we, delay)
	}
}

impl fmt::Display for Wiring {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let sr = &self.shift_register;
		write!(f,
			"SER {} OE {} RCLK {} SRCLK {} SRCLR {}; D0-D7 {}; CE {} OE {} WE {}",
			sr.ser, sr.oe, sr.rclk, sr.srclk, sr.srclr,
			PinList(self.io.clone()),
			self.ce, self.oe, self.we,
		)
	}
}

#[cfg(test)]
mod test {
	use super::{
		PinList,
		Wiring,
	};
	use crate::Misuse;
	use crate::sim::Sim;

	fn check_pins(repr: &str, pins: &[u32]) {
		match repr.parse::<PinList>() {
			Err(e) => panic!("{} failed to parse as PinList: {}", repr, e),
			Ok(list) => assert_eq!(list.0, pins, "failed validating parsed {}", repr),
		}
	}

	fn check_invalid_pins(repr: &str) {
		assert!(repr.parse::<PinList>().is_err(), "{:?} must not be a valid line list", repr);
	}

	#[test]
	fn parse_pin_list() {
		check_pins("10,11,12,13,14,15,16,17", &[10, 11, 12, 13, 14, 15, 16, 17]);
		check_pins("3", &[3]);
		check_pins(" 4, 5 ,6", &[4, 5, 6]);
		check_invalid_pins("");
		check_invalid_pins("1,,2");
		check_invalid_pins("1,");
		check_invalid_pins("a,b");
		check_invalid_pins("-1");
		assert_eq!(PinList(vec![1, 2, 3]).to_string(), "1,2,3");
	}

	#[test]
	fn default_wiring() {
		let w = Wiring::default();
		assert_eq!(w.io, vec![10, 11, 12, 13, 14, 15, 16, 17]);
		assert_eq!((w.we, w.oe, w.ce), (18, 19, 20));
		assert_eq!(w.validate(), Ok(()));
	}

	#[test]
	fn reject_wrong_data_width() {
		let mut w = Wiring::default();
		w.io.pop();
		assert_eq!(w.validate(), Err(Misuse::LineCount { what: "data", expected: 8, got: 7 }));
	}

	#[test]
	fn reject_reused_line() {
		let mut w = Wiring::default();
		w.ce = w.shift_register.srclk;
		assert_eq!(w.validate(), Err(Misuse::LineReused { line: 8 }));

		let sim = Sim::new();
		let e = w.build(|line| Ok(sim.line(line)), sim.delay()).err().unwrap();
		assert_eq!(e.downcast_ref::<Misuse>(), Some(&Misuse::LineReused { line: 8 }));
		// nothing opened, nothing driven
		assert!(sim.events().is_empty());
	}

	#[test]
	fn open_failure_propagates() {
		let sim = Sim::new();
		sim.fail(19);
		let e = Wiring::default().build(|line| Ok(sim.line(line)), sim.delay()).err().unwrap();
		assert!(e.to_string().contains("simulated failure on line 19"), "{}", e);
	}
}
