/*
    # Instruction compiler
    Every instruction is resolved once, before the machine runs: register names become register
    ids, labels become positions and operation names become entries of the operation table.
    Only the contents of registers are left to be read at execution time.
*/
use crate::{
    assembler::{extract_labels, LabelTable},
    error::config::*,
    instruction::{ControllerItem, Expr, Instruction, OpExpr},
    machine::{RegisterFile, RegisterId, PC},
    operations::{OpId, OperationTable},
    Position, Value,
};

/// An input whose identity is fixed at compile time
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(Value),
    Reg(RegisterId),
    Label(Position),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub op: OpId,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Operand(Operand),
    Apply(Application),
}

/// The executable form of one instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Assign { target: RegisterId, source: Source },
    Test(Application),
    Branch(Position),
    GoTo(Position),
    GoToReg(RegisterId),
    Save(RegisterId),
    Restore(RegisterId),
    Perform(Application),
}

/// An assembled controller program, ready to be run
#[derive(Debug, Clone)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub actions: Vec<Action>,
    pub labels: LabelTable,
}

impl Program {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The position at which execution stops
    pub fn end(&self) -> Position {
        Position(self.actions.len())
    }
}

pub struct Compiler<'m> {
    pub registers: &'m RegisterFile,
    pub operations: &'m OperationTable,
    pub labels: &'m LabelTable,
}

impl<'m> Compiler<'m> {
    pub fn compile(&self, inst: &Instruction) -> ConfigResult<Action> {
        Ok(match inst {
            Instruction::Assign { reg, source } => Action::Assign {
                target: self.target(reg, inst)?,
                source: match source {
                    Expr::Op(o) => Source::Apply(self.application(o, inst)?),
                    e => Source::Operand(self.operand(e, inst)?),
                },
            },
            Instruction::Test { condition } => match condition {
                Expr::Op(o) => Action::Test(self.application(o, inst)?),
                _ => config_error!(Malformed, inst, "test condition must be an operation"),
            },
            Instruction::Branch { target } => match target {
                Expr::Label(l) => Action::Branch(self.label(l, inst)?),
                _ => config_error!(Malformed, inst, "branch target must be a label"),
            },
            Instruction::GoTo { target } => match target {
                Expr::Label(l) => Action::GoTo(self.label(l, inst)?),
                Expr::Reg(r) => Action::GoToReg(self.register(r, inst)?),
                _ => config_error!(Malformed, inst, "goto target must be a label or a register"),
            },
            Instruction::Save { reg } => Action::Save(self.register(reg, inst)?),
            Instruction::Restore { reg } => Action::Restore(self.target(reg, inst)?),
            Instruction::Perform { action } => match action {
                Expr::Op(o) => Action::Perform(self.application(o, inst)?),
                _ => config_error!(Malformed, inst, "perform action must be an operation"),
            },
        })
    }

    fn register(&self, name: &str, inst: &Instruction) -> ConfigResult<RegisterId> {
        match self.registers.lookup(name) {
            Some(id) => Ok(id),
            None => config_error!(UnknownRegister, name, inst),
        }
    }

    /// A register the instruction writes. The counter only moves through branch and goto.
    fn target(&self, name: &str, inst: &Instruction) -> ConfigResult<RegisterId> {
        let id = self.register(name, inst)?;
        if id == PC {
            config_error!(Malformed, inst, "pc can only be changed by branch and goto");
        }
        Ok(id)
    }

    fn label(&self, name: &str, inst: &Instruction) -> ConfigResult<Position> {
        match self.labels.lookup(name) {
            Some(p) => Ok(p),
            None => config_error!(UnknownLabel, name, inst),
        }
    }

    fn operand(&self, expr: &Expr, inst: &Instruction) -> ConfigResult<Operand> {
        Ok(match expr {
            Expr::Constant(v) => Operand::Constant(v.clone()),
            Expr::Reg(r) => Operand::Reg(self.register(r, inst)?),
            Expr::Label(l) => Operand::Label(self.label(l, inst)?),
            Expr::Op(_) => config_error!(Malformed, inst, "operation inputs cannot be operations"),
        })
    }

    fn application(&self, expr: &OpExpr, inst: &Instruction) -> ConfigResult<Application> {
        let op = match self.operations.lookup(&expr.op) {
            Some(id) => id,
            None => config_error!(UnknownOperation, expr.op, inst),
        };
        let operands = expr
            .operands
            .iter()
            .map(|e| self.operand(e, inst))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Application { op, operands })
    }
}

/// Resolve labels, then compile every instruction against the given tables
pub fn assemble(
    controller: &[ControllerItem],
    registers: &RegisterFile,
    operations: &OperationTable,
) -> ConfigResult<Program> {
    let (instructions, labels) = extract_labels(controller);
    let compiler = Compiler {
        registers,
        operations,
        labels: &labels,
    };
    let actions = instructions
        .iter()
        .map(|inst| compiler.compile(inst))
        .collect::<ConfigResult<Vec<_>>>()?;
    tracing::debug!(
        instructions = actions.len(),
        labels = labels.len(),
        "assembled controller"
    );
    Ok(Program {
        instructions,
        actions,
        labels,
    })
}
