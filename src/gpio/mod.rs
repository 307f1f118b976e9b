mod delay;
pub mod linux;

pub use self::delay::{
	Delay,
	StdDelay,
	reliable_sleep,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

/// A single GPIO line.
///
/// Levels are plain `bool`s: `true` is electrically high. Each line is owned
/// by exactly one driver; nothing else may touch it while the driver lives.
pub trait DigitalLine {
	/// switch direction; `initial` is the level to drive when switching to
	/// output (`None` keeps whatever the line had)
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()>;
	fn set(&mut self, level: bool) -> crate::AResult<()>;
	fn get(&mut self) -> crate::AResult<bool>;
}

impl<'a, L: ?Sized + DigitalLine> DigitalLine for &'a mut L {
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()> {
		L::configure(*self, direction, initial)
	}
	fn set(&mut self, level: bool) -> crate::AResult<()> {
		L::set(*self, level)
	}
	fn get(&mut self) -> crate::AResult<bool> {
		L::get(*self)
	}
}

impl<L: ?Sized + DigitalLine> DigitalLine for Box<L> {
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()> {
		L::configure(&mut **self, direction, initial)
	}
	fn set(&mut self, level: bool) -> crate::AResult<()> {
		L::set(&mut **self, level)
	}
	fn get(&mut self) -> crate::AResult<bool> {
		L::get(&mut **self)
	}
}
