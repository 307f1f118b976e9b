//! Simulated programmer board for tests.
//!
//! Models the cascaded shift register chain (24 bits), the chip's data bus
//! and its write strobe, and logs every line operation and sleep in order.
//! Line numbers follow `Wiring::default()`.

use std::cell::RefCell;
use std::collections::{
	HashMap,
	HashSet,
};
use std::rc::Rc;
use std::time::Duration;

use crate::bits::ADDRESS_BITS;
use crate::gpio::{
	Delay,
	DigitalLine,
	Direction,
};
use crate::wiring::Wiring;
use crate::{
	Eeprom,
	ShiftRegister,
	ShiftRegisterLines,
};

pub const SR_SER: u32 = 5;
pub const SR_OE: u32 = 6;
pub const SR_RCLK: u32 = 7;
pub const SR_SRCLK: u32 = 8;
pub const SR_SRCLR: u32 = 9;
pub const IO: [u32; 8] = [10, 11, 12, 13, 14, 15, 16, 17];
pub const EE_WE: u32 = 18;
pub const EE_OE: u32 = 19;
pub const EE_CE: u32 = 20;

const CHAIN_MASK: u32 = (1 << ADDRESS_BITS) - 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Configure(u32, Direction, Option<bool>),
	Set(u32, bool),
	Get(u32),
	Sleep(Duration),
}

#[derive(Default)]
struct Board {
	levels: HashMap<u32, bool>,
	directions: HashMap<u32, Direction>,
	failing: HashSet<u32>,
	chain: u32,
	latched: u32,
	shifted: Vec<bool>,
	latches: usize,
	memory: HashMap<u32, u8>,
	reads: Vec<u32>,
	writes: Vec<(u32, u8)>,
	events: Vec<Event>,
}

impl Board {
	fn level(&self, line: u32) -> bool {
		*self.levels.get(&line).unwrap_or(&false)
	}

	fn bus_byte(&self) -> u8 {
		IO.iter().enumerate()
			.filter(|(_, line)| self.level(**line))
			.fold(0u8, |byte, (bit, _)| byte | (1u8 << bit))
	}

	fn chip_reading(&self) -> bool {
		!self.level(EE_CE) && !self.level(EE_OE) && !self.level(SR_OE)
	}

	fn drive(&mut self, line: u32, level: bool) {
		let previous = self.level(line);
		self.levels.insert(line, level);
		match line {
			SR_SRCLK if level && !previous => {
				if self.level(SR_SRCLR) {
					let ser = self.level(SR_SER);
					self.chain = ((self.chain << 1) | ser as u32) & CHAIN_MASK;
					self.shifted.push(ser);
				}
			},
			SR_SRCLR if !level => {
				self.chain = 0;
				self.shifted.clear();
			},
			SR_RCLK if level && !previous => {
				self.latched = self.chain;
				self.latches += 1;
			},
			EE_WE if !level && previous && !self.level(EE_CE) => {
				let byte = self.bus_byte();
				self.writes.push((self.latched, byte));
				self.memory.insert(self.latched, byte);
			},
			_ => (),
		}
	}

	fn sample(&mut self, line: u32) -> bool {
		let input = self.directions.get(&line) == Some(&Direction::Input);
		match IO.iter().position(|l| *l == line) {
			Some(bit) if input && self.chip_reading() => {
				if 0 == bit {
					self.reads.push(self.latched);
				}
				let byte = *self.memory.get(&self.latched).unwrap_or(&0xff);
				0 != (byte >> bit) & 1
			},
			_ => self.level(line),
		}
	}
}

#[derive(Clone, Default)]
pub struct Sim(Rc<RefCell<Board>>);

pub struct SimLine {
	sim: Sim,
	line: u32,
}

pub struct SimDelay(Sim);

impl Sim {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn line(&self, line: u32) -> SimLine {
		SimLine {
			sim: self.clone(),
			line,
		}
	}

	pub fn delay(&self) -> SimDelay {
		SimDelay(self.clone())
	}

	pub fn shift_register(&self) -> ShiftRegister<SimLine> {
		ShiftRegister::new(ShiftRegisterLines {
			ser: self.line(SR_SER),
			oe: self.line(SR_OE),
			rclk: self.line(SR_RCLK),
			srclk: self.line(SR_SRCLK),
			srclr: self.line(SR_SRCLR),
		}).unwrap()
	}

	pub fn eeprom(&self) -> Eeprom<SimLine, SimDelay> {
		Wiring::default().build(|line| Ok(self.line(line)), self.delay()).unwrap()
	}

	pub fn fail(&self, line: u32) {
		self.0.borrow_mut().failing.insert(line);
	}

	pub fn load(&self, address: u32, data: &[u8]) {
		let mut board = self.0.borrow_mut();
		for (i, byte) in data.iter().enumerate() {
			board.memory.insert(address + i as u32, *byte);
		}
	}

	pub fn memory(&self, address: u32) -> Option<u8> {
		self.0.borrow().memory.get(&address).cloned()
	}

	pub fn events(&self) -> Vec<Event> {
		self.0.borrow().events.clone()
	}

	pub fn clear_events(&self) {
		let mut board = self.0.borrow_mut();
		board.events.clear();
		board.reads.clear();
		board.writes.clear();
		board.latches = 0;
	}

	pub fn sleeps(&self) -> Vec<Duration> {
		self.0.borrow().events.iter().filter_map(|e| match e {
			Event::Sleep(d) => Some(*d),
			_ => None,
		}).collect()
	}

	pub fn level(&self, line: u32) -> bool {
		self.0.borrow().level(line)
	}

	pub fn direction(&self, line: u32) -> Option<Direction> {
		self.0.borrow().directions.get(&line).cloned()
	}

	pub fn chain(&self) -> u32 {
		self.0.borrow().chain
	}

	pub fn latched(&self) -> u32 {
		self.0.borrow().latched
	}

	pub fn latches(&self) -> usize {
		self.0.borrow().latches
	}

	/// bits shifted in since the last clear, oldest first
	pub fn shifted_bits(&self) -> Vec<bool> {
		self.0.borrow().shifted.clone()
	}

	pub fn outputs_enabled(&self) -> bool {
		!self.level(SR_OE)
	}

	/// latched addresses the chip was sampled at
	pub fn reads(&self) -> Vec<u32> {
		self.0.borrow().reads.clone()
	}

	/// (address, data) pairs taken by the chip on WE strobes
	pub fn writes(&self) -> Vec<(u32, u8)> {
		self.0.borrow().writes.clone()
	}
}

impl DigitalLine for SimLine {
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()> {
		let mut board = self.sim.0.borrow_mut();
		ensure!(!board.failing.contains(&self.line), "simulated failure on line {}", self.line);
		board.events.push(Event::Configure(self.line, direction, initial));
		board.directions.insert(self.line, direction);
		if let Some(level) = initial {
			board.drive(self.line, level);
		}
		Ok(())
	}

	fn set(&mut self, level: bool) -> crate::AResult<()> {
		let mut board = self.sim.0.borrow_mut();
		ensure!(!board.failing.contains(&self.line), "simulated failure on line {}", self.line);
		board.events.push(Event::Set(self.line, level));
		board.drive(self.line, level);
		Ok(())
	}

	fn get(&mut self) -> crate::AResult<bool> {
		let mut board = self.sim.0.borrow_mut();
		ensure!(!board.failing.contains(&self.line), "simulated failure on line {}", self.line);
		board.events.push(Event::Get(self.line));
		Ok(board.sample(self.line))
	}
}

impl Delay for SimDelay {
	fn sleep(&mut self, duration: Duration) {
		(self.0).0.borrow_mut().events.push(Event::Sleep(duration));
	}
}
