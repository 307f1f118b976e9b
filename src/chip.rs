//! Software data protection and erase command sequences.
//!
//! The chip's controller recognizes fixed address/data write sequences
//! (JEDEC style unlock codes) as commands instead of data. Each profile lists
//! the sequences one chip family understands.

use std::fmt;
use std::str;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Command {
	EnableProtection,
	DisableProtection,
	EraseChip,
}

impl Command {
	pub const ALL: [Command; 3] = [
		Command::EnableProtection,
		Command::DisableProtection,
		Command::EraseChip,
	];

	pub fn name(&self) -> &'static str {
		match self {
			Command::EnableProtection => "protect",
			Command::DisableProtection => "unprotect",
			Command::EraseChip => "erase",
		}
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl str::FromStr for Command {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match Command::ALL.iter().find(|c| c.name() == s) {
			Some(c) => Ok(*c),
			None => bail!("unknown command {:?} (expected protect, unprotect or erase)", s),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CommandSequence {
	/// (address, data) pairs, written back to back
	pub writes: &'static [(u32, u8)],
	/// wait after the last write before the chip accepts anything else
	pub settle: Duration,
}

impl CommandSequence {
	pub fn addresses(&self) -> Vec<u32> {
		self.writes.iter().map(|(a, _)| *a).collect()
	}

	pub fn data(&self) -> Vec<u8> {
		self.writes.iter().map(|(_, d)| *d).collect()
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChipProfile {
	pub name: &'static str,
	pub commands: &'static [(Command, CommandSequence)],
}

impl ChipProfile {
	pub fn sequence(&self, command: Command) -> Option<&'static CommandSequence> {
		self.commands.iter().find(|(c, _)| *c == command).map(|(_, s)| s)
	}

	pub fn supports(&self, command: Command) -> bool {
		self.sequence(command).is_some()
	}
}

impl fmt::Display for ChipProfile {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name)
	}
}

const AT29C010A_SETTLE: Duration = Duration::from_millis(10);

/// Atmel AT29C010A, 1 Mbit (128K x 8) flash
pub const AT29C010A: ChipProfile = ChipProfile {
	name: "AT29C010A",
	commands: &[
		(Command::EnableProtection, CommandSequence {
			writes: &[(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0xA0)],
			settle: AT29C010A_SETTLE,
		}),
		(Command::DisableProtection, CommandSequence {
			writes: &[
				(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x80),
				(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x20),
			],
			settle: AT29C010A_SETTLE,
		}),
		(Command::EraseChip, CommandSequence {
			writes: &[
				(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x80),
				(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x10),
			],
			settle: AT29C010A_SETTLE,
		}),
	],
};

pub const CHIPS: &[ChipProfile] = &[
	AT29C010A,
];

/// case insensitive lookup in `CHIPS`
pub fn find_chip(name: &str) -> crate::AResult<&'static ChipProfile> {
	match CHIPS.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
		Some(chip) => Ok(chip),
		None => bail!("unknown chip {:?}", name),
	}
}
