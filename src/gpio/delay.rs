use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Blocking waits; every entry point blocks for at least the requested time.
pub trait Delay {
	fn sleep(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}

	fn sleep_ns(&mut self, ns: u64) {
		self.sleep(Duration::from_nanos(ns));
	}

	fn sleep_us(&mut self, us: u64) {
		self.sleep(Duration::from_micros(us));
	}

	fn sleep_ms(&mut self, ms: u64) {
		self.sleep(Duration::from_millis(ms));
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
}

impl<'a, D: ?Sized + Delay> Delay for &'a mut D {
	fn sleep(&mut self, duration: Duration) {
		D::sleep(*self, duration)
	}
}

#[cfg(test)]
mod test {
	use std::time::{
		Duration,
		Instant,
	};

	use super::{
		Delay,
		StdDelay,
	};

	#[test]
	fn sleeps_at_least_requested() {
		let mut delay = StdDelay;
		let start = Instant::now();
		delay.sleep_ns(150);
		delay.sleep_us(20);
		delay.sleep_ms(2);
		assert!(start.elapsed() >= Duration::from_nanos(2_020_150));
	}
}
