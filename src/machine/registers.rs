use crate::{error::config::*, Value};
use std::collections::HashMap;

/// A named cell, starting out unassigned
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Register {
    pub name: String,
    pub value: Value,
}

impl Register {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Value::VUnassigned,
        }
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    pub fn set(&mut self, value: Value) {
        self.value = value;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterId(pub(crate) usize);

/// Program counter
pub const PC: RegisterId = RegisterId(0);
/// Result of the last `test`
pub const FLAG: RegisterId = RegisterId(1);

#[derive(Clone, Debug)]
pub struct RegisterFile {
    registers: Vec<Register>,
    index: HashMap<String, RegisterId>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut file = Self {
            registers: Vec::new(),
            index: HashMap::new(),
        };
        file.push("pc");
        file.push("flag");
        file
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str) -> RegisterId {
        let id = RegisterId(self.registers.len());
        self.registers.push(Register::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn allocate(&mut self, name: &str) -> ConfigResult<RegisterId> {
        if self.index.contains_key(name) {
            return Err(ConfigError::DuplicateRegister(name.to_string()));
        }
        Ok(self.push(name))
    }

    pub fn lookup(&self, name: &str) -> Option<RegisterId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: RegisterId) -> &Value {
        self.registers[id.0].get()
    }

    pub fn set(&mut self, id: RegisterId, value: Value) {
        self.registers[id.0].set(value)
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Registers in allocation order, `pc` and `flag` first
    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_registers() {
        let file = RegisterFile::new();
        assert_eq!(file.lookup("pc"), Some(PC));
        assert_eq!(file.lookup("flag"), Some(FLAG));
        assert_eq!(file.get(PC), &Value::VUnassigned);
    }

    #[test]
    fn allocate() {
        let mut file = RegisterFile::new();
        let a = file.allocate("a").unwrap();
        assert_eq!(file.get(a), &Value::VUnassigned);
        file.set(a, Value::from(26));
        assert_eq!(file.get(a), &Value::from(26));
        assert_eq!(
            file.allocate("a"),
            Err(ConfigError::DuplicateRegister("a".into()))
        );
        assert_eq!(
            file.allocate("flag"),
            Err(ConfigError::DuplicateRegister("flag".into()))
        );
        assert_eq!(
            file.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["pc", "flag", "a"]
        );
    }
}
