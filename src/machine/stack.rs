use crate::{error::runtime::*, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackStatistics {
    pub pushes: u64,
    pub max_depth: usize,
    pub depth: usize,
}

/// Values saved by `save`, handed back by `restore` in reverse order
#[derive(Clone, Debug, Default)]
pub struct Stack {
    values: Vec<Value>,
    pushes: u64,
    max_depth: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
        self.pushes += 1;
        self.max_depth = self.max_depth.max(self.values.len());
    }

    pub fn pop(&mut self) -> RuntimeResult<Value> {
        self.values.pop().ok_or(RuntimeError::EmptyStack)
    }

    /// Drop every value and start counting afresh
    pub fn initialize(&mut self) {
        *self = Self::default();
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn statistics(&self) -> StackStatistics {
        StackStatistics {
            pushes: self.pushes,
            max_depth: self.max_depth,
            depth: self.values.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_in_first_out() {
        let mut stack = Stack::new();
        stack.push(Value::from(1));
        stack.push(Value::from("two"));
        stack.push(Value::from(true));
        assert_eq!(stack.pop(), Ok(Value::from(true)));
        assert_eq!(stack.pop(), Ok(Value::from("two")));
        assert_eq!(stack.pop(), Ok(Value::from(1)));
        assert_eq!(stack.pop(), Err(RuntimeError::EmptyStack));
        assert_eq!(RuntimeError::EmptyStack.to_string(), "empty stack -- pop");
    }

    #[test]
    fn statistics() {
        let mut stack = Stack::new();
        for i in 0..3 {
            stack.push(Value::from(i));
        }
        stack.pop().unwrap();
        stack.push(Value::from(9));
        assert_eq!(
            stack.statistics(),
            StackStatistics {
                pushes: 4,
                max_depth: 3,
                depth: 3
            }
        );
        stack.initialize();
        assert!(stack.is_empty());
        assert_eq!(stack.statistics(), StackStatistics::default());
    }
}
