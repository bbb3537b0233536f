use crate::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    EmptyStack,
    Operation { name: String, error: OperationError },
    BadJumpTarget(Value),
    StepLimitExceeded(u64),
    UnbalancedStack(usize),
    NoProgram,
    AlreadyStarted,
    Instruction {
        position: usize,
        instruction: String,
        error: Box<RuntimeError>,
    },
}

/// Failure reported by a primitive operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationError {
    Arity { expected: usize, got: usize },
    TypeConflict { expected: &'static str, got: Value },
    DivisionByZero,
    Other(String),
}

impl RuntimeError {
    /// The error underneath any instruction context
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::Instruction { error, .. } => error.root(),
            e => e,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::EmptyStack => write!(f, "empty stack -- pop"),
            RuntimeError::Operation { name, error } => {
                write!(f, "operation `{}` failed: {}", name, error)
            }
            RuntimeError::BadJumpTarget(v) => {
                write!(f, "cannot jump to {} ({}), expected a position", v, v.type_name())
            }
            RuntimeError::StepLimitExceeded(n) => {
                write!(f, "step limit of {} instructions exceeded", n)
            }
            RuntimeError::UnbalancedStack(depth) => {
                write!(f, "halted with {} value(s) left on the stack", depth)
            }
            RuntimeError::NoProgram => write!(f, "no instruction sequence installed"),
            RuntimeError::AlreadyStarted => write!(f, "machine has already been started"),
            RuntimeError::Instruction {
                position,
                instruction,
                error,
            } => write!(f, "{} (at {}: {})", error, position, instruction),
        }
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::Arity { expected, got } => {
                write!(f, "expected {} argument(s), got {}", expected, got)
            }
            OperationError::TypeConflict { expected, got } => {
                write!(f, "expected a {}, got {}", expected, got)
            }
            OperationError::DivisionByZero => write!(f, "division by zero"),
            OperationError::Other(why) => f.write_str(why),
        }
    }
}

impl std::error::Error for RuntimeError {}
impl std::error::Error for OperationError {}

pub type RuntimeResult<T = ()> = Result<T, RuntimeError>;
pub type OperationResult = Result<Value, OperationError>;
