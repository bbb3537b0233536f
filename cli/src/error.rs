use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CLIError {
	ExternalError(String, String),
	UnkownArgument(String),
	BadValue(String, String),
	InsufficientArguments,
	NotFound(String),
}

impl fmt::Display for CLIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CLIError::ExternalError(kind, why) => write!(f, "{}: {}", kind, why),
			CLIError::UnkownArgument(arg) => write!(f, "unknown argument `{}`", arg),
			CLIError::BadValue(flag, value) => write!(f, "bad value `{}` for {}", value, flag),
			CLIError::InsufficientArguments => write!(f, "not enough arguments\n\n{}", USAGE),
			CLIError::NotFound(file) => write!(f, "file not found: {}", file),
		}
	}
}

impl From<regmach::Error> for CLIError {
	fn from(e: regmach::Error) -> Self {
		let kind = match e {
			regmach::Error::Reader(_) => "ReaderError",
			regmach::Error::Config(_) => "ConfigError",
			regmach::Error::Runtime(_) => "RuntimeError",
			regmach::Error::FileIO(_) => "FileIOError",
		};
		CLIError::ExternalError(kind.into(), e.to_string())
	}
}

pub const USAGE: &str = "usage:
  regmach build <file.rm>                  write <file>.rmc
  regmach check <file>                     assemble without running
  regmach run <file> [options]             run a source file or image
options:
  --trace                                  log every executed instruction
  --limit <n>                              stop after <n> instructions
  --balanced                               fail if the stack is not empty at halt
  --set <register>=<value>                 initialise a register before starting";

pub type CLIResult<O=()> = Result<O, CLIError>;
