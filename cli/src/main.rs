mod error;
use colored::Colorize;
use error::*;
use regmach::{fileio, reader, Blueprint, Error, MachineConfig, Value};
use std::{fs::{OpenOptions, read}, io::{ErrorKind, Write}, process::ExitCode};
use tracing_subscriber::EnvFilter;

struct RunOptions {
	config: MachineConfig,
	trace: bool,
	registers: Vec<(String, Value)>,
}

fn main() -> ExitCode {
	let args: Vec<String> = std::env::args().skip(1).collect(); // Ignore program name
	let trace = args.iter().any(|a| a == "--trace");
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::new(if trace { "regmach=trace" } else { "regmach=warn" }))
		.with_writer(std::io::stderr)
		.init();

	match dispatch(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("{} {}", "error:".red().bold(), e);
			ExitCode::FAILURE
		}
	}
}

fn dispatch(args: Vec<String>) -> CLIResult {
	let mut args = args.into_iter();
	match args.next() {
		Some(arg) => {
			if &arg == "build" {
				let file = args.next().ok_or(CLIError::InsufficientArguments)?;
				let blueprint = load(&file)?;
				// Reject programs that would not assemble before writing them out
				blueprint.build_standard(MachineConfig::default()).map_err(Error::from)?;
				let code = fileio::ser(&blueprint).map_err(Error::from)?;
				let (save_as, _) = file.rsplit_once('.').unwrap_or((file.as_str(), ""));
				let out = format!("{}.rmc", save_as);
				let mut handle = OpenOptions::new()
					.write(true)
					.truncate(true)
					.create(true)
					.open(&out)
					.map_err(|e| CLIError::ExternalError("io::Error".into(), e.to_string()))?;
				handle
					.write_all(&code)
					.map_err(|e| CLIError::ExternalError("io::Error".into(), e.to_string()))?;
				println!("{} {}", "wrote".green(), out);
				Ok(())
			} else if &arg == "check" {
				let file = args.next().ok_or(CLIError::InsufficientArguments)?;
				let machine = load(&file)?
					.build_standard(MachineConfig::default())
					.map_err(Error::from)?;
				if let Some(program) = machine.program() {
					println!("{} {} instruction(s)", "ok".green(), program.len());
					for (label, at) in program.labels.iter() {
						println!("  {:>4}  {}", at.0, label.cyan());
					}
				}
				Ok(())
			} else if &arg == "run" {
				let file = args.next().ok_or(CLIError::InsufficientArguments)?;
				let options = options(args)?;
				run(&file, options)
			} else {
				Err(CLIError::UnkownArgument(arg))
			}
		}

		None => Err(CLIError::InsufficientArguments)
	}
}

fn options(args: impl Iterator<Item = String>) -> CLIResult<RunOptions> {
	let mut args = args;
	let mut options = RunOptions {
		config: MachineConfig::default(),
		trace: false,
		registers: vec![],
	};
	while let Some(arg) = args.next() {
		match arg.as_str() {
			"--trace" => options.trace = true,
			"--balanced" => options.config.check_stack_balance = true,
			"--limit" => {
				let n = args.next().ok_or(CLIError::InsufficientArguments)?;
				let limit = n.parse::<u64>().map_err(|_| CLIError::BadValue(arg.clone(), n))?;
				options.config.step_limit = Some(limit);
			}
			"--set" => {
				let assignment = args.next().ok_or(CLIError::InsufficientArguments)?;
				let (name, value) = assignment
					.split_once('=')
					.ok_or_else(|| CLIError::BadValue(arg.clone(), assignment.clone()))?;
				let value = match value {
					"true" => Value::VBool(true),
					"false" => Value::VBool(false),
					v => v.parse::<f64>().map(Value::VNumber).unwrap_or_else(|_| Value::from(v)),
				};
				options.registers.push((name.to_string(), value));
			}
			_ => return Err(CLIError::UnkownArgument(arg)),
		}
	}
	Ok(options)
}

/// Read either a source file or a built image
fn load(file: &str) -> CLIResult<Blueprint> {
	let bytes = match read(file) {
		Ok(b) => b,
		Err(e) => match e.kind() {
			ErrorKind::NotFound => return Err(CLIError::NotFound(file.to_string())),
			_ => return Err(CLIError::ExternalError("io::Error".into(), e.to_string()))
		}
	};
	if fileio::is_image(&bytes) {
		return Ok(fileio::de(&bytes).map_err(Error::from)?);
	}
	let source = String::from_utf8(bytes)
		.map_err(|e| CLIError::ExternalError("Utf8Error".into(), e.to_string()))?;
	Ok(reader::read(&source).map_err(Error::from)?)
}

fn run(file: &str, options: RunOptions) -> CLIResult {
	let mut machine = load(file)?.build_standard(options.config).map_err(Error::from)?;
	for (name, value) in options.registers {
		machine.set_register(&name, value).map_err(Error::from)?;
	}
	let done = machine.start().map_err(Error::from)?;

	for register in machine.registers() {
		if register.name == "pc" && !options.trace {
			continue;
		}
		println!("{:>12} = {}", register.name.bold(), register.value);
	}
	println!(
		"{} after {} instruction(s); {} push(es), max stack depth {}",
		"halted".green(),
		done.steps,
		done.stack.pushes,
		done.stack.max_depth
	);
	Ok(())
}
