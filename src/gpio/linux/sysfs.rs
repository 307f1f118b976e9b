use std::fs;
use std::io::{
	self,
	Write,
};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::time::Duration;

use crate::gpio::{
	DigitalLine,
	Direction,
	reliable_sleep,
};

const SYSFS_GPIO: &str = "/sys/class/gpio";

fn line_file(line: u32, name: &str) -> String {
	format!("{}/gpio{}/{}", SYSFS_GPIO, line, name)
}

const PERMISSION_RETRIES: usize = 10;

// udev may still be fixing permissions on a fresh export
fn retry_permission<T, F>(mut f: F) -> io::Result<T>
where
	F: FnMut() -> io::Result<T>,
{
	let mut attempts = 0;
	loop {
		match f() {
			Err(ref e) if e.kind() == io::ErrorKind::PermissionDenied && attempts < PERMISSION_RETRIES => {
				attempts += 1;
				reliable_sleep(Duration::from_millis(10));
			},
			r => return r,
		}
	}
}

fn write_control_file<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
	// sysfs wants the whole value in one write
	fs::OpenOptions::new().write(true).open(path)?.write_all(data)
}

#[derive(Debug)]
pub struct SysfsLine {
	line: u32,
	value: fs::File,
	exported: bool, // unexport on drop only if we did the export
}

impl SysfsLine {
	pub fn open(line: u32) -> crate::AResult<Self> {
		let exported = if Path::new(&line_file(line, "value")).exists() {
			false
		} else {
			with_context!(("couldn't export GPIO {}", line), {
				write_control_file(format!("{}/export", SYSFS_GPIO), line.to_string().as_bytes())?;
				Ok(())
			})?;
			true
		};

		let value = with_context!(("couldn't open value of GPIO {}", line),
			Ok(retry_permission(|| {
				fs::OpenOptions::new().read(true).write(true).open(line_file(line, "value"))
			})?)
		)?;

		Ok(SysfsLine {
			line,
			value,
			exported,
		})
	}

	pub fn line(&self) -> u32 {
		self.line
	}
}

impl DigitalLine for SysfsLine {
	fn configure(&mut self, direction: Direction, initial: Option<bool>) -> crate::AResult<()> {
		// "high"/"low" switch to output and set the level in one step
		let setting: &[u8] = match (direction, initial) {
			(Direction::Input, _) => b"in",
			(Direction::Output, None) => b"out",
			(Direction::Output, Some(false)) => b"low",
			(Direction::Output, Some(true)) => b"high",
		};
		with_context!(("GPIO {}: set direction {:?}", self.line, direction), {
			let path = line_file(self.line, "direction");
			retry_permission(|| write_control_file(&path, setting))?;
			Ok(())
		})
	}

	fn set(&mut self, level: bool) -> crate::AResult<()> {
		let data: &[u8] = if level { b"1" } else { b"0" };
		with_context!(("GPIO {}: write value", self.line), {
			self.value.write_all_at(data, 0)?;
			Ok(())
		})
	}

	fn get(&mut self) -> crate::AResult<bool> {
		let mut buf = [0u8; 2];
		let l = with_context!(("GPIO {}: read value", self.line),
			Ok(self.value.read_at(&mut buf, 0)?)
		)?;
		match &buf[..l] {
			b"0" | b"0\n" => Ok(false),
			b"1" | b"1\n" => Ok(true),
			v => bail!("GPIO {}: invalid value {:?}", self.line, String::from_utf8_lossy(v)),
		}
	}
}

impl Drop for SysfsLine {
	fn drop(&mut self) {
		if !self.exported {
			return;
		}
		let line = self.line.to_string();
		if let Err(e) = write_control_file(format!("{}/unexport", SYSFS_GPIO), line.as_bytes()) {
			error!("GPIO {}: Failed to unexport: {}", self.line, e);
		}
	}
}
