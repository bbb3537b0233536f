/*
    # Register machine
    A machine owns its registers, its stack and its operation table. Once a controller program
    is installed and the machine is started, the program counter walks the compiled actions:
    each action performs its effect and moves the counter, either to the next instruction or to
    a jump target. Reaching the end of the instruction sequence halts the machine.

    Nothing here bounds the number of steps taken; a program that loops forever runs forever
    unless `MachineConfig::step_limit` is set.
*/

use crate::{
    compiler::{assemble, Action, Application, Operand, Program, Source},
    error::{config::*, runtime::*},
    operations::{standard_operations, Operation, OperationTable},
    ControllerItem, Position, Value,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

mod registers;
mod stack;
pub use registers::*;
pub use stack::*;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Fail with [RuntimeError::StepLimitExceeded] after this many instructions
    pub step_limit: Option<u64>,
    /// Fail with [RuntimeError::UnbalancedStack] if values remain on the stack at halt
    pub check_stack_balance: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineState {
    Configuring,
    Running,
    Halted,
    Failed,
}

/// Returned by [Machine::start] once the program counter runs off the end of the program
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Done {
    pub steps: u64,
    pub stack: StackStatistics,
}

pub struct Machine {
    pub config: MachineConfig,
    registers: RegisterFile,
    stack: Stack,
    operations: OperationTable,
    program: Option<Rc<Program>>,
    state: MachineState,
    steps: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// A machine with only `pc`, `flag` and the `initialize-stack` operation
    pub fn new() -> Self {
        let mut operations = OperationTable::new();
        operations.install("initialize-stack", Operation::InitializeStack);
        Self {
            config: MachineConfig::default(),
            registers: RegisterFile::new(),
            stack: Stack::new(),
            operations,
            program: None,
            state: MachineState::Configuring,
            steps: 0,
        }
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    fn configurable(&self) -> ConfigResult {
        match self.state {
            MachineState::Configuring => Ok(()),
            _ => Err(ConfigError::Frozen),
        }
    }

    pub fn allocate_register(&mut self, name: &str) -> ConfigResult<RegisterId> {
        self.configurable()?;
        let id = self.registers.allocate(name)?;
        tracing::debug!(register = %name, "allocated register");
        Ok(id)
    }

    /// Add operations to the table. A name that is already bound keeps its first binding.
    pub fn install_operations<S: Into<String>>(
        &mut self,
        operations: impl IntoIterator<Item = (S, Operation)>,
    ) -> ConfigResult {
        self.configurable()?;
        for (name, operation) in operations {
            self.operations.install(name, operation);
        }
        Ok(())
    }

    /// Assemble `controller` against the registers and operations installed so far
    pub fn install_instruction_sequence(&mut self, controller: &[ControllerItem]) -> ConfigResult {
        self.configurable()?;
        let program = assemble(controller, &self.registers, &self.operations)?;
        self.program = Some(Rc::new(program));
        Ok(())
    }

    pub fn get_register(&self, name: &str) -> Option<&Value> {
        self.registers.lookup(name).map(|id| self.registers.get(id))
    }

    pub fn set_register(&mut self, name: &str, value: Value) -> ConfigResult {
        match self.registers.lookup(name) {
            Some(id) => {
                self.registers.set(id, value);
                Ok(())
            }
            None => Err(ConfigError::NoSuchRegister(name.to_string())),
        }
    }

    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// Instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn stack_statistics(&self) -> StackStatistics {
        self.stack.statistics()
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_deref()
    }

    /// Point the program counter at the first instruction and run until it falls off the end
    pub fn start(&mut self) -> RuntimeResult<Done> {
        if self.state != MachineState::Configuring {
            return Err(RuntimeError::AlreadyStarted);
        }
        let program = self.program.clone().ok_or(RuntimeError::NoProgram)?;
        self.state = MachineState::Running;
        self.registers.set(PC, Value::VLabel(Position::START));

        let result = self.exec(&program);
        self.state = match result {
            Ok(_) => MachineState::Halted,
            Err(_) => MachineState::Failed,
        };
        match &result {
            Ok(done) => tracing::debug!(steps = done.steps, "machine halted"),
            Err(e) => tracing::debug!(error = %e, "machine failed"),
        }
        result
    }

    fn exec(&mut self, program: &Program) -> RuntimeResult<Done> {
        loop {
            let at = self.pc()?;
            let action = match program.actions.get(at.0) {
                Some(action) => action,
                None => break,
            };
            if let Some(limit) = self.config.step_limit {
                if self.steps >= limit {
                    return Err(RuntimeError::StepLimitExceeded(limit));
                }
            }
            tracing::trace!(position = at.0, instruction = %program.instructions[at.0], "exec");
            self.steps += 1;
            self.step(action, at, program)
                .map_err(|error| RuntimeError::Instruction {
                    position: at.0,
                    instruction: program.instructions[at.0].to_string(),
                    error: Box::new(error),
                })?;
        }

        if self.config.check_stack_balance && !self.stack.is_empty() {
            return Err(RuntimeError::UnbalancedStack(self.stack.depth()));
        }
        Ok(Done {
            steps: self.steps,
            stack: self.stack.statistics(),
        })
    }

    fn pc(&self) -> RuntimeResult<Position> {
        let pc = self.registers.get(PC);
        pc.as_position()
            .ok_or_else(|| RuntimeError::BadJumpTarget(pc.clone()))
    }

    fn jump(&mut self, to: Position) {
        self.registers.set(PC, Value::VLabel(to));
    }

    fn advance(&mut self, from: Position) {
        self.jump(from.next())
    }

    fn step(&mut self, action: &Action, at: Position, program: &Program) -> RuntimeResult {
        match action {
            Action::Assign { target, source } => {
                let value = match source {
                    Source::Operand(o) => self.value_of(o),
                    Source::Apply(app) => self.apply(app)?,
                };
                self.registers.set(*target, value);
                self.advance(at);
            }
            Action::Test(app) => {
                let result = self.apply(app)?;
                self.registers.set(FLAG, Value::VBool(result.is_true()));
                self.advance(at);
            }
            Action::Branch(to) => {
                if self.registers.get(FLAG).is_true() {
                    self.jump(*to);
                } else {
                    self.advance(at);
                }
            }
            Action::GoTo(to) => self.jump(*to),
            Action::GoToReg(reg) => {
                let target = self.registers.get(*reg).clone();
                match target.as_position() {
                    Some(to) if to <= program.end() => self.jump(to),
                    _ => return Err(RuntimeError::BadJumpTarget(target)),
                }
            }
            Action::Save(reg) => {
                self.stack.push(self.registers.get(*reg).clone());
                self.advance(at);
            }
            Action::Restore(reg) => {
                let value = self.stack.pop()?;
                self.registers.set(*reg, value);
                self.advance(at);
            }
            Action::Perform(app) => {
                self.apply(app)?;
                self.advance(at);
            }
        }
        Ok(())
    }

    fn value_of(&self, operand: &Operand) -> Value {
        match operand {
            Operand::Constant(v) => v.clone(),
            Operand::Reg(r) => self.registers.get(*r).clone(),
            Operand::Label(p) => Value::VLabel(*p),
        }
    }

    fn apply(&mut self, app: &Application) -> RuntimeResult<Value> {
        let args: Vec<Value> = app.operands.iter().map(|o| self.value_of(o)).collect();
        match self.operations.get(app.op) {
            Operation::Host(f) => f(&args).map_err(|error| RuntimeError::Operation {
                name: self.operations.name(app.op).to_string(),
                error,
            }),
            Operation::InitializeStack => {
                self.stack.initialize();
                Ok(Value::VUnassigned)
            }
        }
    }
}

/// The parts of a machine that can be written down: register names and a controller program
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Blueprint {
    pub registers: Vec<String>,
    pub controller: Vec<ControllerItem>,
}

impl Blueprint {
    /// Allocate the registers, install `operations` and the controller program
    pub fn build<S: Into<String>>(
        &self,
        operations: impl IntoIterator<Item = (S, Operation)>,
        config: MachineConfig,
    ) -> ConfigResult<Machine> {
        let mut machine = Machine::with_config(config);
        for name in &self.registers {
            machine.allocate_register(name)?;
        }
        machine.install_operations(operations)?;
        machine.install_instruction_sequence(&self.controller)?;
        Ok(machine)
    }

    /// Build with the standard operations
    pub fn build_standard(&self, config: MachineConfig) -> ConfigResult<Machine> {
        self.build(standard_operations(), config)
    }
}

/// Allocate `registers`, install `operations` and assemble `controller` into a fresh machine
pub fn make_machine<S: Into<String>>(
    registers: &[&str],
    operations: impl IntoIterator<Item = (S, Operation)>,
    controller: &[ControllerItem],
) -> ConfigResult<Machine> {
    let mut machine = Machine::new();
    for name in registers {
        machine.allocate_register(name)?;
    }
    machine.install_operations(operations)?;
    machine.install_instruction_sequence(controller)?;
    Ok(machine)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{controller, instruction::*, operations::standard};

    pub(crate) mod util {
        use super::*;

        pub fn ops(names: &[&str]) -> Vec<(String, Operation)> {
            names
                .iter()
                .map(|n| (n.to_string(), standard(n).unwrap()))
                .collect()
        }

        pub fn gcd_controller() -> Vec<ControllerItem> {
            controller![
                assign("a", constant(26)),
                assign("b", constant(13)),
                "test-b",
                test(op("=", vec![reg("b"), constant(0)])),
                branch(label("gcd-done")),
                assign("t", op("rem", vec![reg("a"), reg("b")])),
                assign("a", reg("b")),
                assign("b", reg("t")),
                go_to(label("test-b")),
                "gcd-done",
            ]
        }

        pub fn factorial_controller() -> Vec<ControllerItem> {
            controller![
                assign("continue", label("fact-done")),
                "fact-loop",
                test(op("=", vec![reg("n"), constant(1)])),
                branch(label("base-case")),
                save("continue"),
                save("n"),
                assign("n", op("-", vec![reg("n"), constant(1)])),
                assign("continue", label("after-fact")),
                go_to(label("fact-loop")),
                "after-fact",
                restore("n"),
                restore("continue"),
                assign("val", op("*", vec![reg("n"), reg("val")])),
                go_to(reg("continue")),
                "base-case",
                assign("val", constant(1)),
                go_to(reg("continue")),
                "fact-done",
            ]
        }
    }
    use util::*;

    #[test]
    fn gcd() {
        let mut machine = make_machine(&["a", "b", "t"], ops(&["=", "rem"]), &gcd_controller()).unwrap();
        assert!(!machine.is_halted());
        let done = machine.start().unwrap();
        assert!(machine.is_halted());
        assert_eq!(machine.get_register("a"), Some(&Value::from(13)));
        assert_eq!(machine.get_register("b"), Some(&Value::from(0)));
        assert_eq!(machine.get_register("flag"), Some(&Value::VBool(true)));
        assert_eq!(machine.get_register("pc"), Some(&Value::VLabel(Position(8))));
        // two assigns, then one full loop of six and a final test and branch
        assert_eq!(done.steps, 10);
    }

    #[test]
    fn factorial() {
        let mut machine = make_machine(
            &["n", "val", "continue"],
            ops(&["=", "-", "*"]),
            &factorial_controller(),
        )
        .unwrap();
        machine.set_register("n", Value::from(5)).unwrap();
        let done = machine.start().unwrap();
        assert_eq!(machine.get_register("val"), Some(&Value::from(120)));
        assert_eq!(done.stack, StackStatistics { pushes: 8, max_depth: 8, depth: 0 });
    }

    #[test]
    fn empty_program_halts_immediately() {
        let mut machine = make_machine(&[], ops(&[]), &controller!["only-a-label"]).unwrap();
        assert_eq!(machine.start().unwrap().steps, 0);
        assert!(machine.is_halted());
    }

    #[test]
    fn perform_discards_result() {
        let mut machine = Machine::new();
        machine.allocate_register("x").unwrap();
        machine
            .install_operations(vec![("answer", Operation::host(|_| Ok(Value::from(42))))])
            .unwrap();
        machine
            .install_instruction_sequence(&controller![perform(op("answer", vec![]))])
            .unwrap();
        let done = machine.start().unwrap();
        assert_eq!(done.steps, 1);
        assert_eq!(machine.get_register("x"), Some(&Value::VUnassigned));
        assert_eq!(machine.get_register("pc"), Some(&Value::VLabel(Position(1))));
    }

    #[test]
    fn restore_from_empty_stack() {
        let mut machine = make_machine(&["x"], ops(&[]), &controller![save("x"), restore("x"), restore("x")]).unwrap();
        let err = machine.start().unwrap_err();
        assert_eq!(err.root(), &RuntimeError::EmptyStack);
        assert_eq!(
            err,
            RuntimeError::Instruction {
                position: 2,
                instruction: "(restore x)".into(),
                error: Box::new(RuntimeError::EmptyStack),
            }
        );
        assert_eq!(machine.state(), MachineState::Failed);
    }

    #[test]
    fn unknown_register_leaves_machine_unstarted() {
        let mut machine = Machine::new();
        machine.allocate_register("a").unwrap();
        let err = machine
            .install_instruction_sequence(&controller![assign("b", reg("a"))])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownRegister {
                name: "b".into(),
                kind: crate::InstructionKind::Assign
            }
        );
        assert_eq!(machine.start(), Err(RuntimeError::NoProgram));
        assert_eq!(machine.state(), MachineState::Configuring);
    }

    #[test]
    fn initialize_stack() {
        let mut machine = make_machine(
            &["x"],
            ops(&[]),
            &controller![save("x"), save("x"), perform(op("initialize-stack", vec![]))],
        )
        .unwrap();
        machine.config.check_stack_balance = true;
        let done = machine.start().unwrap();
        assert_eq!(done.stack, StackStatistics::default());
    }

    #[test]
    fn unbalanced_stack() {
        let mut machine = make_machine(&["x"], ops(&[]), &controller![save("x")]).unwrap();
        machine.config.check_stack_balance = true;
        assert_eq!(machine.start(), Err(RuntimeError::UnbalancedStack(1)));
    }

    #[test]
    fn step_limit() {
        let mut machine = make_machine(&[], ops(&[]), &controller!["spin", go_to(label("spin"))]).unwrap();
        machine.config.step_limit = Some(100);
        assert_eq!(machine.start(), Err(RuntimeError::StepLimitExceeded(100)));
        assert_eq!(machine.steps(), 100);
    }

    #[test]
    fn bad_jump_target() {
        let mut machine = make_machine(&["r"], ops(&[]), &controller![assign("r", constant(3)), go_to(reg("r"))]).unwrap();
        let err = machine.start().unwrap_err();
        assert_eq!(err.root(), &RuntimeError::BadJumpTarget(Value::from(3)));
    }

    #[test]
    fn operation_failure() {
        let mut machine = make_machine(&["a"], ops(&["rem"]), &controller![assign("a", op("rem", vec![constant(1), constant(0)]))]).unwrap();
        let err = machine.start().unwrap_err();
        assert_eq!(
            err.root(),
            &RuntimeError::Operation {
                name: "rem".into(),
                error: OperationError::DivisionByZero
            }
        );
    }

    #[test]
    fn runs_once() {
        let mut machine = make_machine(&[], ops(&[]), &[]).unwrap();
        machine.start().unwrap();
        assert_eq!(machine.start(), Err(RuntimeError::AlreadyStarted));
        assert_eq!(machine.allocate_register("late"), Err(ConfigError::Frozen));
        assert_eq!(machine.install_instruction_sequence(&[]), Err(ConfigError::Frozen));
        assert_eq!(ConfigError::Frozen.to_string(), "machine has already been started");
        // registers stay readable and writable
        assert!(machine.set_register("flag", Value::from(true)).is_ok());
        assert_eq!(
            machine.set_register("nope", Value::from(true)),
            Err(ConfigError::NoSuchRegister("nope".into()))
        );
    }

    #[test]
    fn zero_result_does_not_branch() {
        let mut machine = make_machine(
            &["x"],
            ops(&["rem"]),
            &controller![
                test(op("rem", vec![constant(4), constant(2)])),
                branch(label("taken")),
                assign("x", constant("fell-through")),
                go_to(label("end")),
                "taken",
                assign("x", constant("taken")),
                "end",
            ],
        )
        .unwrap();
        machine.start().unwrap();
        assert_eq!(machine.get_register("flag"), Some(&Value::VBool(false)));
        assert_eq!(machine.get_register("x"), Some(&Value::from("fell-through")));
    }

    #[test]
    fn counter_writes_are_rejected() {
        let mut machine = Machine::new();
        machine.allocate_register("x").unwrap();
        let err = machine
            .install_instruction_sequence(&controller![
                assign("pc", label("skip")),
                assign("x", constant(1)),
                "skip",
                assign("x", constant(2)),
            ])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedInstruction { .. }), "{:?}", err);
        assert_eq!(machine.state(), MachineState::Configuring);
    }

    #[test]
    fn first_operation_binding_wins() {
        let mut machine = Machine::new();
        machine.allocate_register("x").unwrap();
        machine
            .install_operations(vec![("seven", Operation::host(|_| Ok(Value::from(7))))])
            .unwrap();
        machine
            .install_operations(vec![("seven", Operation::host(|_| Ok(Value::from(8))))])
            .unwrap();
        machine
            .install_instruction_sequence(&controller![assign("x", op("seven", vec![]))])
            .unwrap();
        machine.start().unwrap();
        assert_eq!(machine.get_register("x"), Some(&Value::from(7)));
    }
}
