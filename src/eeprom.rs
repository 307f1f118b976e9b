//! Parallel EEPROM/flash on a 24-bit address bus behind the shift register.
//!
//! Control lines CE, OE and WE idle high. Reads go through CE+OE low with the
//! data bus as input; writes drive the data bus and strobe CE+WE.
//!
//! Access timing (minimums):
//! - 150ns address/CE/OE to data valid before sampling
//! - 150ns after raising CE/WE before data is driven, then 100ns data setup
//!   before CE/WE fall
//! - 50ms OE pulse once before a write batch, 150ns after the batch

use crate::bits::{
	self,
	DATA_BUS_WIDTH,
};
use crate::chip::{
	self,
	ChipProfile,
	Command,
};
use crate::gpio::{
	Delay,
	DigitalLine,
	Direction,
};
use crate::shift_register::ShiftRegister;
use crate::Misuse;

const ACCESS_TIME_NS: u64 = 150;
const DATA_SETUP_NS: u64 = 100;
const WRITE_RECOVERY_NS: u64 = 150;
const BUS_SETTLE_MS: u64 = 50;

/// Owns the shift register, the data bus and the control lines.
pub struct Eeprom<L: DigitalLine, D: Delay> {
	sr: ShiftRegister<L>,
	io: Vec<L>,
	ce: L,
	oe: L,
	we: L,
	delay: D,
	chip: &'static ChipProfile,
}

pub struct EepromParts<L: DigitalLine, D: Delay> {
	pub sr: ShiftRegister<L>,
	pub io: Vec<L>,
	pub ce: L,
	pub oe: L,
	pub we: L,
	pub delay: D,
}

impl<L: DigitalLine, D: Delay> Eeprom<L, D> {
	/// `io` lists the data lines D0..D7 (see `bits::DATA_LINE_BITS`).
	///
	/// Enables the shift register outputs for good.
	pub fn new(mut sr: ShiftRegister<L>, mut io: Vec<L>, mut ce: L, mut oe: L, mut we: L, delay: D) -> crate::AResult<Self> {
		if io.len() != DATA_BUS_WIDTH {
			return Err(Misuse::LineCount {
				what: "data",
				expected: DATA_BUS_WIDTH,
				got: io.len(),
			}.into());
		}

		sr.on()?;
		for line in io.iter_mut() {
			line.configure(Direction::Output, None)?;
		}
		ce.configure(Direction::Output, Some(true))?;
		oe.configure(Direction::Output, Some(true))?;
		we.configure(Direction::Output, Some(true))?;

		Ok(Eeprom {
			sr,
			io,
			ce,
			oe,
			we,
			delay,
			chip: &chip::AT29C010A,
		})
	}

	/// select the command table used by `run_command`
	pub fn with_chip(mut self, chip: &'static ChipProfile) -> Self {
		self.chip = chip;
		self
	}

	pub fn chip(&self) -> &'static ChipProfile {
		self.chip
	}

	pub fn into_parts(self) -> EepromParts<L, D> {
		EepromParts {
			sr: self.sr,
			io: self.io,
			ce: self.ce,
			oe: self.oe,
			we: self.we,
			delay: self.delay,
		}
	}

	fn set_controls(&mut self, level: bool) -> crate::AResult<()> {
		self.ce.set(level)?;
		self.oe.set(level)?;
		self.we.set(level)
	}

	/// idle / deselect: CE, OE and WE high
	pub fn set_1(&mut self) -> crate::AResult<()> {
		self.set_controls(true)
	}

	pub fn set_0(&mut self) -> crate::AResult<()> {
		self.set_controls(false)
	}

	pub fn io_output(&mut self) -> crate::AResult<()> {
		for line in self.io.iter_mut() {
			line.configure(Direction::Output, None)?;
		}
		Ok(())
	}

	pub fn io_input(&mut self) -> crate::AResult<()> {
		for line in self.io.iter_mut() {
			line.configure(Direction::Input, None)?;
		}
		Ok(())
	}

	/// Clear the chain, shift all 24 address bits most significant first,
	/// latch once.
	pub fn set_address(&mut self, address: u32) -> crate::AResult<()> {
		let order = bits::address_shift_order(address)?;
		trace!("address 0x{:06x}", address);
		self.sr.clear()?;
		for bit in order.iter() {
			self.sr.send_bit(*bit)?;
		}
		self.sr.latch()
	}

	pub fn read_byte(&mut self, address: u32) -> crate::AResult<u8> {
		bits::check_address(address as u64)?;
		self.io_input()?;
		self.set_address(address)?;

		self.ce.set(false)?;
		self.oe.set(false)?;

		self.delay.sleep_ns(ACCESS_TIME_NS);

		let mut levels = [false; DATA_BUS_WIDTH];
		for (level, line) in levels.iter_mut().zip(self.io.iter_mut()) {
			*level = line.get()?;
		}

		self.set_1()?;

		let byte = bits::assemble_data_lines(&levels);
		trace!("read 0x{:06x}: 0x{:02x}", address, byte);
		Ok(byte)
	}

	/// Lazily read `page_size` bytes starting at `page * page_size`.
	pub fn page_reader(&mut self, page: u32, page_size: u32) -> crate::AResult<PageReader<L, D>> {
		let base = (page as u64) * (page_size as u64);
		if page_size > 0 {
			bits::check_address(base + page_size as u64 - 1)?;
		}
		debug!("reading page {} ({} bytes at 0x{:06x})", page, page_size, base);
		Ok(PageReader {
			eeprom: self,
			next: base as u32,
			remaining: page_size,
		})
	}

	pub fn read_page(&mut self, page: u32, page_size: u32) -> crate::AResult<Vec<u8>> {
		self.page_reader(page, page_size)?.collect()
	}

	/// Write `data[i]` to `addresses[i]`, stopping at the end of the shorter
	/// list.
	pub fn write_bytes(&mut self, addresses: &[u32], data: &[u8]) -> crate::AResult<()> {
		for address in addresses.iter().take(data.len()) {
			bits::check_address(*address as u64)?;
		}
		if addresses.len() != data.len() {
			warn!(
				"write_bytes: {} addresses but {} data bytes, writing {}",
				addresses.len(), data.len(), addresses.len().min(data.len()),
			);
		}
		debug!("writing {} bytes", addresses.len().min(data.len()));

		self.io_output()?;
		self.oe.set(false)?;
		self.delay.sleep_ms(BUS_SETTLE_MS);
		self.oe.set(true)?;

		for (address, byte) in addresses.iter().zip(data.iter()) {
			self.set_address(*address)?;
			self.ce.set(true)?;
			self.we.set(true)?;
			self.delay.sleep_ns(ACCESS_TIME_NS);

			for (line, level) in self.io.iter_mut().zip(bits::data_line_levels(*byte).iter()) {
				line.set(*level)?;
			}
			trace!("write 0x{:06x}: 0x{:02x}", address, byte);

			self.delay.sleep_ns(DATA_SETUP_NS);
			self.ce.set(false)?;
			self.we.set(false)?;
		}

		self.set_1()?;
		self.delay.sleep_ns(WRITE_RECOVERY_NS);
		Ok(())
	}

	/// Write the command sequence of the selected chip and wait for it to
	/// settle. Nothing verifies the chip actually executed it.
	pub fn run_command(&mut self, command: Command) -> crate::AResult<()> {
		let sequence = match self.chip.sequence(command) {
			Some(s) => s,
			None => return Err(Misuse::UnsupportedCommand {
				chip: self.chip.name,
				command,
			}.into()),
		};
		debug!("{}: {}", self.chip, command);
		self.write_bytes(&sequence.addresses(), &sequence.data())?;
		self.delay.sleep(sequence.settle);
		Ok(())
	}

	pub fn enable_protection(&mut self) -> crate::AResult<()> {
		self.run_command(Command::EnableProtection)
	}

	pub fn disable_protection(&mut self) -> crate::AResult<()> {
		self.run_command(Command::DisableProtection)
	}

	pub fn erase_chip(&mut self) -> crate::AResult<()> {
		self.run_command(Command::EraseChip)
	}
}

pub struct PageReader<'a, L: DigitalLine + 'a, D: Delay + 'a> {
	eeprom: &'a mut Eeprom<L, D>,
	next: u32,
	remaining: u32,
}

impl<'a, L: DigitalLine, D: Delay> Iterator for PageReader<'a, L, D> {
	type Item = crate::AResult<u8>;

	fn next(&mut self) -> Option<Self::Item> {
		if 0 == self.remaining {
			return None;
		}
		self.remaining -= 1;
		let address = self.next;
		self.next += 1;
		Some(self.eeprom.read_byte(address))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining as usize, Some(self.remaining as usize))
	}
}
