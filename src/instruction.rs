/*
    A controller program is a flat sequence of labels and instructions:

    (assign <reg> (reg <reg>))               (test (op <name>) <input>...)
    (assign <reg> (const <value>))           (branch (label <name>))
    (assign <reg> (label <name>))            (goto (label <name>))
    (assign <reg> (op <name>) <input>...)    (goto (reg <reg>))
    (perform (op <name>) <input>...)         (save <reg>)
                                             (restore <reg>)

    Inputs to an operation are constants, registers or labels; operations do not nest.
*/
use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Reg(String),
    Label(String),
    Op(OpExpr),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpExpr {
    pub op: String,
    pub operands: Vec<Expr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign { reg: String, source: Expr },
    Test { condition: Expr },
    Branch { target: Expr },
    GoTo { target: Expr },
    Save { reg: String },
    Restore { reg: String },
    Perform { action: Expr },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ControllerItem {
    Label(String),
    Instruction(Instruction),
}

/// Instruction tag, used to say where an identifier was referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Assign,
    Test,
    Branch,
    GoTo,
    Save,
    Restore,
    Perform,
}

impl Instruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Assign { .. } => InstructionKind::Assign,
            Instruction::Test { .. } => InstructionKind::Test,
            Instruction::Branch { .. } => InstructionKind::Branch,
            Instruction::GoTo { .. } => InstructionKind::GoTo,
            Instruction::Save { .. } => InstructionKind::Save,
            Instruction::Restore { .. } => InstructionKind::Restore,
            Instruction::Perform { .. } => InstructionKind::Perform,
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionKind::Assign => "assign",
            InstructionKind::Test => "test",
            InstructionKind::Branch => "branch",
            InstructionKind::GoTo => "goto",
            InstructionKind::Save => "save",
            InstructionKind::Restore => "restore",
            InstructionKind::Perform => "perform",
        };
        f.write_str(name)
    }
}

impl fmt::Display for OpExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(op {})", self.op)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "(const {})", v),
            Expr::Reg(r) => write!(f, "(reg {})", r),
            Expr::Label(l) => write!(f, "(label {})", l),
            Expr::Op(o) => write!(f, "{}", o),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Instruction::Assign { reg, source } => write!(f, "({} {} {})", kind, reg, source),
            Instruction::Test { condition: e }
            | Instruction::Branch { target: e }
            | Instruction::GoTo { target: e }
            | Instruction::Perform { action: e } => write!(f, "({} {})", kind, e),
            Instruction::Save { reg } | Instruction::Restore { reg } => {
                write!(f, "({} {})", kind, reg)
            }
        }
    }
}

impl fmt::Display for ControllerItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerItem::Label(l) => f.write_str(l),
            ControllerItem::Instruction(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for ControllerItem {
    fn from(label: &str) -> Self {
        ControllerItem::Label(label.to_string())
    }
}

impl From<String> for ControllerItem {
    fn from(label: String) -> Self {
        ControllerItem::Label(label)
    }
}

impl From<Instruction> for ControllerItem {
    fn from(instruction: Instruction) -> Self {
        ControllerItem::Instruction(instruction)
    }
}

pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

pub fn reg(name: &str) -> Expr {
    Expr::Reg(name.to_string())
}

pub fn label(name: &str) -> Expr {
    Expr::Label(name.to_string())
}

pub fn op(name: &str, operands: Vec<Expr>) -> Expr {
    Expr::Op(OpExpr {
        op: name.to_string(),
        operands,
    })
}

pub fn assign(reg: &str, source: Expr) -> Instruction {
    Instruction::Assign {
        reg: reg.to_string(),
        source,
    }
}

pub fn test(condition: Expr) -> Instruction {
    Instruction::Test { condition }
}

pub fn branch(target: Expr) -> Instruction {
    Instruction::Branch { target }
}

pub fn go_to(target: Expr) -> Instruction {
    Instruction::GoTo { target }
}

pub fn save(reg: &str) -> Instruction {
    Instruction::Save {
        reg: reg.to_string(),
    }
}

pub fn restore(reg: &str) -> Instruction {
    Instruction::Restore {
        reg: reg.to_string(),
    }
}

pub fn perform(action: Expr) -> Instruction {
    Instruction::Perform { action }
}

/// Build a controller sequence from labels and instructions
/// ```
/// use regmach::{controller, instruction::*};
/// let program = controller![
///     "loop",
///     assign("n", op("+", vec![reg("n"), constant(1)])),
///     go_to(label("loop")),
/// ];
/// assert_eq!(program.len(), 3);
/// ```
#[macro_export]
macro_rules! controller {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::ControllerItem::from($item)),*]
    };
}
