//! A register machine simulator: describe registers, primitive operations and a controller
//! program, and the machine assembles the program and runs it to completion.
//!
//! ```
//! use regmach::{controller, instruction::*, operations::standard_operations, make_machine, Value};
//!
//! let mut machine = make_machine(
//!     &["a", "b", "t"],
//!     standard_operations(),
//!     &controller![
//!         "test-b",
//!         test(op("=", vec![reg("b"), constant(0)])),
//!         branch(label("gcd-done")),
//!         assign("t", op("rem", vec![reg("a"), reg("b")])),
//!         assign("a", reg("b")),
//!         assign("b", reg("t")),
//!         go_to(label("test-b")),
//!         "gcd-done",
//!     ],
//! )
//! .unwrap();
//! machine.set_register("a", Value::from(206)).unwrap();
//! machine.set_register("b", Value::from(40)).unwrap();
//! machine.start().unwrap();
//! assert_eq!(machine.get_register("a"), Some(&Value::from(2)));
//! ```
pub mod assembler;
pub mod compiler;
pub mod error;
pub mod fileio;
pub mod instruction;
pub mod machine;
pub mod operations;
pub mod reader;
mod scanner;
mod value;

pub use error::{Error, Result};
pub use instruction::{ControllerItem, Expr, Instruction, InstructionKind, OpExpr};
pub use machine::{make_machine, Blueprint, Done, Machine, MachineConfig, MachineState};
pub use operations::{Operation, OperationTable};
pub use scanner::TokenKind;
pub use value::{Position, Value};

pub const REGMACH_VER: &str = env!("CARGO_PKG_VERSION");

/// Read a machine description, build it with the standard operations and run it
pub fn run(source: &str, config: MachineConfig) -> Result<Machine> {
    let blueprint = reader::read(source)?;
    let mut machine = blueprint.build_standard(config)?;
    machine.start()?;
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIBONACCI: &str = r#"
        (machine
          (registers n val continue)
          (controller
              (assign continue (label fib-done))
            fib-loop
              (test (op <) (reg n) (const 2))
              (branch (label immediate-answer))
              (save continue)
              (assign continue (label afterfib-n-1))
              (save n)
              (assign n (op -) (reg n) (const 1))
              (goto (label fib-loop))
            afterfib-n-1
              (restore n)
              (restore continue)
              (assign n (op -) (reg n) (const 2))
              (save continue)
              (assign continue (label afterfib-n-2))
              (save val)
              (goto (label fib-loop))
            afterfib-n-2
              (assign n (reg val))
              (restore val)
              (restore continue)
              (assign val (op +) (reg val) (reg n))
              (goto (reg continue))
            immediate-answer
              (assign val (reg n))
              (goto (reg continue))
            fib-done))
    "#;

    #[test]
    fn fibonacci_from_source() {
        let blueprint = reader::read(FIBONACCI).unwrap();
        let mut machine = blueprint
            .build_standard(MachineConfig {
                check_stack_balance: true,
                ..Default::default()
            })
            .unwrap();
        machine.set_register("n", Value::from(10)).unwrap();
        machine.start().unwrap();
        assert_eq!(machine.get_register("val"), Some(&Value::from(55)));
        assert_eq!(machine.stack_statistics().depth, 0);
    }

    #[test]
    fn run_reports_each_stage() {
        assert!(matches!(run("(machine", MachineConfig::default()), Err(Error::Reader(_))));
        assert!(matches!(
            run("(machine (registers) (controller (save x)))", MachineConfig::default()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            run("(machine (registers x) (controller (restore x)))", MachineConfig::default()),
            Err(Error::Runtime(_))
        ));
        let machine = run(
            "(machine (registers x) (controller (assign x (op +) (const 1) (const 2))))",
            MachineConfig::default(),
        )
        .unwrap();
        assert_eq!(machine.get_register("x"), Some(&Value::from(3)));
    }
}
