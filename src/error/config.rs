use crate::InstructionKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownRegister {
        name: String,
        kind: InstructionKind,
    },
    UnknownLabel {
        name: String,
        kind: InstructionKind,
    },
    UnknownOperation {
        name: String,
        kind: InstructionKind,
    },
    MalformedInstruction {
        instruction: String,
        reason: &'static str,
    },
    DuplicateRegister(String),
    NoSuchRegister(String),
    Frozen,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownRegister { name, kind } => {
                write!(f, "unknown register `{}` in {} instruction", name, kind)
            }
            ConfigError::UnknownLabel { name, kind } => {
                write!(f, "undefined label `{}` in {} instruction", name, kind)
            }
            ConfigError::UnknownOperation { name, kind } => {
                write!(f, "unknown operation `{}` in {} instruction", name, kind)
            }
            ConfigError::MalformedInstruction {
                instruction,
                reason,
            } => write!(f, "bad instruction {}: {}", instruction, reason),
            ConfigError::DuplicateRegister(name) => {
                write!(f, "multiply defined register `{}`", name)
            }
            ConfigError::NoSuchRegister(name) => write!(f, "unknown register `{}`", name),
            ConfigError::Frozen => write!(f, "machine has already been started"),
        }
    }
}

impl std::error::Error for ConfigError {}

macro_rules! config_error {
    (Malformed, $inst:expr, $why:expr) => {{
        let error = ConfigError::MalformedInstruction {
            instruction: $inst.to_string(),
            reason: $why,
        };
        tracing::debug!("{}", error);
        return Err(error);
    }};
    ($kind:ident, $name:expr, $inst:expr) => {{
        let error = ConfigError::$kind {
            name: $name.to_string(),
            kind: $inst.kind(),
        };
        tracing::debug!(instruction = %$inst, "{}", error);
        return Err(error);
    }};
}

pub(crate) use config_error;

pub type ConfigResult<O = ()> = Result<O, ConfigError>;
