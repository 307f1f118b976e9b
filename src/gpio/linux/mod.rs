use std::fmt;
use std::str;

use rppal::gpio::Gpio;

mod pi;
mod sysfs;

pub use self::pi::RppalLine;
pub use self::sysfs::SysfsLine;

use crate::gpio::DigitalLine;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Backend {
	/// `/sys/class/gpio`, works everywhere but each level change is a syscall
	Sysfs,
	/// Raspberry Pi register block through `/dev/gpiomem` (rppal)
	GpioMem,
}

impl fmt::Display for Backend {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Backend::Sysfs => write!(f, "sysfs"),
			Backend::GpioMem => write!(f, "gpiomem"),
		}
	}
}

impl str::FromStr for Backend {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sysfs" => Ok(Backend::Sysfs),
			"gpiomem" => Ok(Backend::GpioMem),
			_ => bail!("unknown GPIO backend {:?} (expected sysfs or gpiomem)", s),
		}
	}
}

/// Opens lines for one backend; all lines of a `gpiomem` opener share a
/// single register mapping.
pub struct LineOpener {
	backend: Backend,
	gpio: Option<Gpio>,
}

impl LineOpener {
	pub fn new(backend: Backend) -> crate::AResult<Self> {
		let gpio = match backend {
			Backend::Sysfs => None,
			Backend::GpioMem => Some(with_context!("couldn't map /dev/gpiomem",
				Ok(Gpio::new()?)
			)?),
		};
		Ok(LineOpener {
			backend,
			gpio,
		})
	}

	pub fn backend(&self) -> Backend {
		self.backend
	}

	pub fn open(&mut self, line: u32) -> crate::AResult<Box<dyn DigitalLine>> {
		debug!("opening GPIO {} via {}", line, self.backend);
		match &self.gpio {
			None => Ok(Box::new(SysfsLine::open(line)?)),
			Some(gpio) => Ok(Box::new(RppalLine::open(gpio, line)?)),
		}
	}
}
