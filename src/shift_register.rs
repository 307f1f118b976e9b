//! Serial-in/parallel-out shift register (74HC595 style) driving the
//! address bus.
//!
//! Signals:
//! - SER: serial data, sampled on the rising SRCLK edge
//! - SRCLK: shift clock; every pulse moves the chain one stage towards the
//!   last output and takes SER into the first stage
//! - RCLK: register clock; a pulse copies the whole chain to the outputs
//! - SRCLR: active low clear of the chain (outputs keep their value)
//! - OE: active low output enable; high tri-states the outputs
//!
//! Outputs only change on a latch (`RCLK` pulse).

use crate::bits::byte_shift_order;
use crate::gpio::{
	DigitalLine,
	Direction,
};

pub const DEFAULT_LEN: usize = 8;

/// The five lines a shift register needs.
pub struct ShiftRegisterLines<L> {
	pub ser: L,
	pub oe: L,
	pub rclk: L,
	pub srclk: L,
	pub srclr: L,
}

pub struct ShiftRegister<L: DigitalLine> {
	ser: L,
	oe: L,
	rclk: L,
	srclk: L,
	srclr: L,
	len: usize,
}

impl<L: DigitalLine> ShiftRegister<L> {
	/// Outputs start disabled (OE high) and the chain is not cleared.
	pub fn new(lines: ShiftRegisterLines<L>) -> crate::AResult<Self> {
		Self::with_len(lines, DEFAULT_LEN)
	}

	/// `len` is the width of one register package; longer chains are built by
	/// cascading packages.
	pub fn with_len(lines: ShiftRegisterLines<L>, len: usize) -> crate::AResult<Self> {
		ensure!(len > 0, "shift register needs at least one stage");
		let ShiftRegisterLines { mut ser, mut oe, mut rclk, mut srclk, mut srclr } = lines;

		ser.configure(Direction::Output, Some(false))?;
		oe.configure(Direction::Output, Some(true))?;
		rclk.configure(Direction::Output, Some(false))?;
		srclk.configure(Direction::Output, Some(false))?;
		srclr.configure(Direction::Output, Some(true))?;
		debug!("shift register ready ({} bit packages)", len);

		Ok(ShiftRegister {
			ser,
			oe,
			rclk,
			srclk,
			srclr,
			len,
		})
	}

	pub fn len(&self) -> usize {
		self.len
	}

	/// reset the chain to zero; latched outputs stay until the next `latch`
	pub fn clear(&mut self) -> crate::AResult<()> {
		self.srclr.set(false)?;
		self.srclr.set(true)
	}

	pub fn shift(&mut self) -> crate::AResult<()> {
		self.srclk.set(true)?;
		self.srclk.set(false)
	}

	pub fn latch(&mut self) -> crate::AResult<()> {
		self.rclk.set(true)?;
		self.rclk.set(false)
	}

	pub fn on(&mut self) -> crate::AResult<()> {
		self.oe.set(false)
	}

	pub fn off(&mut self) -> crate::AResult<()> {
		self.oe.set(true)
	}

	pub fn send_bit(&mut self, bit: bool) -> crate::AResult<()> {
		self.ser.set(bit)?;
		self.shift()
	}

	/// Shift in `value` least significant bit first and latch.
	///
	/// Bit 0 ends up deepest in the chain, bit 7 in the first stage.
	pub fn send_byte(&mut self, value: u8) -> crate::AResult<()> {
		trace!("shift register: byte 0x{:02x}", value);
		for bit in byte_shift_order(value).iter() {
			self.send_bit(*bit)?;
		}
		self.latch()
	}

	pub fn into_lines(self) -> ShiftRegisterLines<L> {
		ShiftRegisterLines {
			ser: self.ser,
			oe: self.oe,
			rclk: self.rclk,
			srclk: self.srclk,
			srclr: self.srclr,
		}
	}
}
