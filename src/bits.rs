//! Bit ordering between values and lines.
//!
//! Two independent rules meet on the programmer board and both must stay
//! exactly as they are, the physical wiring depends on their composition:
//!
//! - a byte pushed through [`ShiftRegister::send_byte`] goes out least
//!   significant bit first;
//! - an address goes out most significant bit first, without reversal.
//!
//! On the data bus, line `i` of the configured list carries bit
//! [`DATA_LINE_BITS`]`[i]`.
//!
//! [`ShiftRegister::send_byte`]: crate::ShiftRegister::send_byte

use crate::Misuse;

pub const ADDRESS_BITS: usize = 24;
pub const ADDRESS_LIMIT: u32 = 1 << ADDRESS_BITS;

pub const DATA_BUS_WIDTH: usize = 8;

/// Data line index -> bit of the byte it carries.
///
/// The first configured line is the least significant bit. Do not reverse
/// this: the boards in use are wired line 0 = D0.
pub const DATA_LINE_BITS: [u8; DATA_BUS_WIDTH] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Serial order used by `send_byte`: bit 0 first, bit 7 last.
pub fn byte_shift_order(value: u8) -> [bool; 8] {
	let mut bits = [false; 8];
	for (i, bit) in bits.iter_mut().enumerate() {
		*bit = 0 != (value >> i) & 1;
	}
	bits
}

/// Serial order used to set an address: bit 23 first, bit 0 last.
pub fn address_shift_order(address: u32) -> crate::AResult<[bool; ADDRESS_BITS]> {
	check_address(address as u64)?;
	let mut bits = [false; ADDRESS_BITS];
	for (i, bit) in bits.iter_mut().enumerate() {
		*bit = 0 != (address >> (ADDRESS_BITS - 1 - i)) & 1;
	}
	Ok(bits)
}

pub fn check_address(address: u64) -> Result<(), Misuse> {
	if address >= ADDRESS_LIMIT as u64 {
		return Err(Misuse::AddressOutOfRange {
			address,
			bits: ADDRESS_BITS,
		});
	}
	Ok(())
}

/// Levels to drive on the data lines for `value`, in line order.
pub fn data_line_levels(value: u8) -> [bool; DATA_BUS_WIDTH] {
	let mut levels = [false; DATA_BUS_WIDTH];
	for (level, bit) in levels.iter_mut().zip(DATA_LINE_BITS.iter()) {
		*level = 0 != (value >> bit) & 1;
	}
	levels
}

/// Byte sampled from data line levels given in line order.
pub fn assemble_data_lines(levels: &[bool; DATA_BUS_WIDTH]) -> u8 {
	levels.iter()
		.zip(DATA_LINE_BITS.iter())
		.filter(|(level, _)| **level)
		.fold(0u8, |byte, (_, bit)| byte | (1u8 << bit))
}
