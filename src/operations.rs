use crate::{error::runtime::*, Value};
use lazy_static::lazy_static;
use maplit::hashmap;
use std::{collections::HashMap, fmt, rc::Rc};

pub type Primitive = fn(&[Value]) -> OperationResult;

/// Something a controller program can name with `(op ...)`
#[derive(Clone)]
pub enum Operation {
    /// A function of the host over register values
    Host(Rc<dyn Fn(&[Value]) -> OperationResult>),
    /// Empties the machine's stack and its statistics
    InitializeStack,
}

impl Operation {
    pub fn host(f: impl Fn(&[Value]) -> OperationResult + 'static) -> Self {
        Operation::Host(Rc::new(f))
    }
}

impl From<Primitive> for Operation {
    fn from(f: Primitive) -> Self {
        Operation::Host(Rc::new(f))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Host(_) => write!(f, "Host(..)"),
            Operation::InitializeStack => write!(f, "InitializeStack"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpId(pub(crate) usize);

/// Name to operation bindings. The first binding of a name is the one programs see.
#[derive(Debug, Default, Clone)]
pub struct OperationTable {
    entries: Vec<(String, Operation)>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding, keeping any earlier binding of the same name.
    /// Returns whether the new binding is visible.
    pub fn install(&mut self, name: impl Into<String>, operation: Operation) -> bool {
        let name = name.into();
        if self.lookup(&name).is_some() {
            tracing::warn!(operation = %name, "operation already installed, keeping the first binding");
            return false;
        }
        self.entries.push((name, operation));
        true
    }

    pub fn lookup(&self, name: &str) -> Option<OpId> {
        self.entries.iter().position(|(n, _)| n == name).map(OpId)
    }

    pub fn get(&self, id: OpId) -> &Operation {
        &self.entries[id.0].1
    }

    pub fn name(&self, id: OpId) -> &str {
        &self.entries[id.0].0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn arity(args: &[Value], expected: usize) -> Result<(), OperationError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(OperationError::Arity {
            expected,
            got: args.len(),
        })
    }
}

fn number(v: &Value) -> Result<f64, OperationError> {
    v.as_number().ok_or_else(|| OperationError::TypeConflict {
        expected: "number",
        got: v.clone(),
    })
}

macro_rules! arithmetic {
    ($op:tt) => {
        |args: &[Value]| -> OperationResult {
            arity(args, 2)?;
            number(&args[0])?;
            number(&args[1])?;
            (args[0].clone() $op args[1].clone()).ok_or(OperationError::Other("arithmetic on non-numbers".into()))
        }
    };
}

macro_rules! comparison {
    ($op:tt) => {
        |args: &[Value]| -> OperationResult {
            arity(args, 2)?;
            Ok(Value::VBool(number(&args[0])? $op number(&args[1])?))
        }
    };
}

fn divide(args: &[Value]) -> OperationResult {
    arity(args, 2)?;
    if number(&args[1])? == 0.0 {
        return Err(OperationError::DivisionByZero);
    }
    Ok(Value::VNumber(number(&args[0])? / number(&args[1])?))
}

fn remainder(args: &[Value]) -> OperationResult {
    arity(args, 2)?;
    if number(&args[1])? == 0.0 {
        return Err(OperationError::DivisionByZero);
    }
    Ok(Value::VNumber(number(&args[0])? % number(&args[1])?))
}

fn equal(args: &[Value]) -> OperationResult {
    arity(args, 2)?;
    Ok(Value::VBool(args[0] == args[1]))
}

fn not(args: &[Value]) -> OperationResult {
    arity(args, 1)?;
    Ok(Value::VBool(!args[0].is_true()))
}

fn print(args: &[Value]) -> OperationResult {
    let line = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
    println!("{}", line);
    Ok(Value::VUnassigned)
}

lazy_static! {
    static ref STANDARD: HashMap<&'static str, Primitive> = hashmap! {
        "+" => arithmetic!(+) as Primitive,
        "-" => arithmetic!(-) as Primitive,
        "*" => arithmetic!(*) as Primitive,
        "/" => divide as Primitive,
        "rem" => remainder as Primitive,
        "=" => equal as Primitive,
        "<" => comparison!(<) as Primitive,
        ">" => comparison!(>) as Primitive,
        "<=" => comparison!(<=) as Primitive,
        ">=" => comparison!(>=) as Primitive,
        "not" => not as Primitive,
        "print" => print as Primitive,
    };
}

/// The arithmetic, comparison and output primitives, sorted by name
pub fn standard_operations() -> Vec<(String, Operation)> {
    let mut ops: Vec<_> = STANDARD
        .iter()
        .map(|(name, f)| (name.to_string(), Operation::from(*f)))
        .collect();
    ops.sort_by(|a, b| a.0.cmp(&b.0));
    ops
}

/// Look up a single standard primitive
pub fn standard(name: &str) -> Option<Operation> {
    STANDARD.get(name).map(|f| Operation::from(*f))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> OperationResult {
        match standard(name).unwrap() {
            Operation::Host(f) => f(args),
            Operation::InitializeStack => unreachable!(),
        }
    }

    #[test]
    fn primitives() {
        assert_eq!(call("rem", &[26.into(), 13.into()]), Ok(Value::from(0)));
        assert_eq!(call("+", &[2.into(), 3.into()]), Ok(Value::from(5)));
        assert_eq!(call("*", &[4.into(), 3.into()]), Ok(Value::from(12)));
        assert_eq!(call("=", &["a".into(), "a".into()]), Ok(Value::VBool(true)));
        assert_eq!(call("<", &[1.into(), 2.into()]), Ok(Value::VBool(true)));
        assert_eq!(call(">=", &[1.into(), 2.into()]), Ok(Value::VBool(false)));
        assert_eq!(call("not", &[false.into()]), Ok(Value::VBool(true)));
    }

    #[test]
    fn failures() {
        assert_eq!(call("rem", &[1.into(), 0.into()]), Err(OperationError::DivisionByZero));
        assert_eq!(
            call("-", &[1.into()]),
            Err(OperationError::Arity { expected: 2, got: 1 })
        );
        assert_eq!(
            call("<", &[1.into(), true.into()]),
            Err(OperationError::TypeConflict {
                expected: "number",
                got: Value::VBool(true)
            })
        );
    }

    #[test]
    fn first_binding_wins() {
        let mut table = OperationTable::new();
        assert!(table.install("id", Operation::host(|args| Ok(args[0].clone()))));
        assert!(!table.install("id", Operation::host(|_| Ok(Value::from(0)))));
        assert_eq!(table.len(), 1);
        let id = table.lookup("id").unwrap();
        match table.get(id) {
            Operation::Host(f) => assert_eq!(f(&[7.into()]), Ok(Value::from(7))),
            _ => panic!("expected a host operation"),
        }
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    fn standard_set() {
        let names: Vec<_> = standard_operations().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"rem".to_string()));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }
}
