use rppal::gpio::{
	Gpio,
	IoPin,
	Level,
	Mode,
};

use crate::gpio::{
	DigitalLine,
	Direction,
};

fn mode(direction: Direction) -> Mode {
	match direction {
		Direction::Input => Mode::Input,
		Direction::Output => Mode::Output,
	}
}

fn level(high: bool) -> Level {
	if high { Level::High } else { Level::Low }
}

/// GPIO line on the Raspberry Pi register block (through `/dev/gpiomem`).
///
/// rppal refuses to hand out a line twice while it is in use, and resets the
/// line to its previous mode on drop.
#[derive(Debug)]
pub struct RppalLine {
	pin: IoPin,
}

impl RppalLine {
	pub fn open(gpio: &Gpio, line: u32) -> crate::AResult<Self> {
		ensure!(line <= u8::max_value() as u32, "GPIO {} out of range", line);
		let pin = with_context!(("couldn't get GPIO {}", line),
			Ok(gpio.get(line as u8)?)
		)?;
		// outputs get configured (with level) before use, start as input
		Ok(RppalLine {
			pin: pin.into_io(Mode::Input),
		})
	}

	pub fn line(&self) -> u8 {
		self.pin.pin()
	}
}

impl DigitalLine for RppalLine {
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()> {
		// output latch first, so the line never glitches to the old level
		if let (Direction::Output, Some(high)) = (direction, initial) {
			self.pin.write(level(high));
		}
		self.pin.set_mode(mode(direction));
		Ok(())
	}

	fn set(&mut self, high: bool) -> crate::AResult<()> {
		self.pin.write(level(high));
		Ok(())
	}

	fn get(&mut self) -> crate::AResult<bool> {
		Ok(self.pin.read() == Level::High)
	}
}
