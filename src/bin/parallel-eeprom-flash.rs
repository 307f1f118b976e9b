#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate parallel_eeprom_flash;
use parallel_eeprom_flash::*;

use std::process::exit;
use std::str;

use parallel_eeprom_flash::chip::{
	self,
	Command,
};
use parallel_eeprom_flash::gpio::{
	DigitalLine,
	StdDelay,
};
use parallel_eeprom_flash::gpio::linux::{
	Backend,
	LineOpener,
};
use parallel_eeprom_flash::wiring::{
	PinList,
	Wiring,
};

type Programmer = Eeprom<Box<dyn DigitalLine>, StdDelay>;

const DEFAULT_PAGE_SIZE: u32 = 256;

/// decimal, or hexadecimal with "0x" prefix
struct Number(u32);

impl str::FromStr for Number {
	type Err = failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value = if s.starts_with("0x") || s.starts_with("0X") {
			u32::from_str_radix(&s[2..], 16)?
		} else {
			s.parse::<u32>()?
		};
		Ok(Number(value))
	}
}

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	match get_optional_param(matches, name)? {
		Some(v) => Ok(v),
		None => bail!("missing parameter {}", name),
	}
}

fn get_optional_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn parse_byte(s: &str) -> AResult<u8> {
	let n: Number = s.parse().map_err(|e: failure::Error| {
		let msg = format!("invalid byte {:?}: {}", s, e);
		failure::Error::from(e.context(msg))
	})?;
	ensure!(n.0 <= 0xff, "byte {:?} doesn't fit in 8 bits", s);
	Ok(n.0 as u8)
}

fn wiring(matches: &clap::ArgMatches) -> AResult<Wiring> {
	let mut w = Wiring::default();
	if let Some(n) = get_optional_param::<u32>(matches, "ser")? {
		w.shift_register.ser = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "sr_oe")? {
		w.shift_register.oe = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "rclk")? {
		w.shift_register.rclk = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "srclk")? {
		w.shift_register.srclk = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "srclr")? {
		w.shift_register.srclr = n;
	}
	if let Some(io) = get_optional_param::<PinList>(matches, "io")? {
		w.io = io.0;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "ce")? {
		w.ce = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "oe")? {
		w.oe = n;
	}
	if let Some(n) = get_optional_param::<u32>(matches, "we")? {
		w.we = n;
	}
	Ok(w)
}

fn open_programmer(matches: &clap::ArgMatches) -> AResult<Programmer> {
	let backend = get_optional_param::<Backend>(matches, "backend")?.unwrap_or(Backend::Sysfs);
	let chip = match matches.value_of("chip") {
		Some(name) => chip::find_chip(name)?,
		None => &chip::AT29C010A,
	};
	let wiring = wiring(matches)?;

	let mut opener = LineOpener::new(backend)?;
	info!("{} programmer via {}: {}", chip, opener.backend(), wiring);
	let ee = wiring.build(|line| opener.open(line), StdDelay)?;
	Ok(ee.with_chip(chip))
}

fn print_hex(base: u32, data: &[u8]) {
	for (i, chunk) in data.chunks(16).enumerate() {
		print!("{:06x} ", base as usize + i * 16);
		for (j, b) in chunk.iter().enumerate() {
			if 8 == j {
				print!(" ");
			}
			print!(" {:02x}", b);
		}
		println!();
	}
}

fn read(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address: Number = get_param(sub_m, "ADDRESS")?;
	let mut ee = open_programmer(matches)?;
	let byte = ee.read_byte(address.0)?;
	println!("{:06x}: {:02x}", address.0, byte);
	Ok(())
}

fn read_page(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let page: Number = get_param(sub_m, "PAGE")?;
	let page_size = get_optional_param::<Number>(sub_m, "PAGE_SIZE")?.map_or(DEFAULT_PAGE_SIZE, |n| n.0);
	let mut ee = open_programmer(matches)?;
	let data = ee.read_page(page.0, page_size)?;
	print_hex(page.0.wrapping_mul(page_size), &data);
	Ok(())
}

fn write(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let start: Number = get_param(sub_m, "ADDRESS")?;
	let mut data = Vec::new();
	for value in sub_m.values_of("BYTES").into_iter().flatten() {
		data.push(parse_byte(value)?);
	}
	let addresses = (0..data.len() as u32).map(|i| start.0.checked_add(i))
		.collect::<Option<Vec<u32>>>()
		.ok_or_else(|| format_err!("address range starting at 0x{:x} overflows", start.0))?;

	let mut ee = open_programmer(matches)?;
	ee.write_bytes(&addresses, &data)?;
	info!("wrote {} bytes at 0x{:06x}", data.len(), start.0);
	Ok(())
}

fn command(matches: &clap::ArgMatches, command: Command) -> AResult<()> {
	let mut ee = open_programmer(matches)?;
	ee.run_command(command)?;
	info!("{}: sent {} sequence", ee.chip(), command);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg backend: -b --backend +takes_value "GPIO backend: sysfs (default) or gpiomem")
		(@arg chip: -c --chip +takes_value "chip profile for command sequences (default: AT29C010A)")
		(@arg ser: --ser +takes_value "shift register SER line (default: 5)")
		(@arg sr_oe: --("sr-oe") +takes_value "shift register OE line (default: 6)")
		(@arg rclk: --rclk +takes_value "shift register RCLK line (default: 7)")
		(@arg srclk: --srclk +takes_value "shift register SRCLK line (default: 8)")
		(@arg srclr: --srclr +takes_value "shift register SRCLR line (default: 9)")
		(@arg io: --io +takes_value "data lines D0..D7, comma separated (default: 10,11,12,13,14,15,16,17)")
		(@arg ce: --ce +takes_value "EEPROM chip enable line (default: 20)")
		(@arg oe: --oe +takes_value "EEPROM output enable line (default: 19)")
		(@arg we: --we +takes_value "EEPROM write enable line (default: 18)")
		(@subcommand read =>
			(about: "read a single byte")
			(@arg ADDRESS: +required "address (decimal or 0x hex)")
		)
		(@subcommand read_page =>
			(about: "read a page and print it as hex dump")
			(@arg PAGE: +required "page number")
			(@arg PAGE_SIZE: "bytes per page (default: 256)")
		)
		(@subcommand write =>
			(about: "write bytes to consecutive addresses")
			(@arg ADDRESS: +required "first address (decimal or 0x hex)")
			(@arg BYTES: +required +multiple "data bytes (decimal or 0x hex)")
		)
		(@subcommand protect =>
			(about: "enable software data protection")
		)
		(@subcommand unprotect =>
			(about: "disable software data protection")
		)
		(@subcommand erase =>
			(about: "erase the whole chip")
		)
	).get_matches();

	match matches.subcommand() {
		("read", Some(sub_m)) => {
			read(&matches, sub_m)
		},
		("read_page", Some(sub_m)) => {
			read_page(&matches, sub_m)
		},
		("write", Some(sub_m)) => {
			write(&matches, sub_m)
		},
		("protect", _) => {
			command(&matches, Command::EnableProtection)
		},
		("unprotect", _) => {
			command(&matches, Command::DisableProtection)
		},
		("erase", _) => {
			command(&matches, Command::EraseChip)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
