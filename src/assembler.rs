use crate::{ControllerItem, Instruction, Position};
use std::collections::HashMap;

/// Label name to the position of the first instruction after it
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelTable {
    labels: HashMap<String, Position>,
}

impl LabelTable {
    pub fn lookup(&self, name: &str) -> Option<Position> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels sorted by position, then name
    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        let mut labels: Vec<_> = self.labels.iter().map(|(n, p)| (n.as_str(), *p)).collect();
        labels.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        labels.into_iter()
    }
}

/// Split a controller sequence into its instructions, in order, and the labels between them.
///
/// The sequence is walked from its end, so by the time a label is reached every instruction
/// after it has been counted and the label's position is the remainder from that point on.
/// A label defined twice resolves to its first occurrence in program order.
pub fn extract_labels(controller: &[ControllerItem]) -> (Vec<Instruction>, LabelTable) {
    let total = controller
        .iter()
        .filter(|item| matches!(item, ControllerItem::Instruction(_)))
        .count();

    let mut instructions = Vec::with_capacity(total);
    let mut labels = LabelTable::default();
    // Number of instructions seen so far, i.e. the length of the remainder
    let mut remaining = 0;
    for item in controller.iter().rev() {
        match item {
            ControllerItem::Label(name) => {
                let at = Position(total - remaining);
                if labels.labels.insert(name.clone(), at).is_some() {
                    tracing::debug!(label = %name, "label defined more than once");
                }
            }
            ControllerItem::Instruction(inst) => {
                instructions.push(inst.clone());
                remaining += 1;
            }
        }
    }
    instructions.reverse();
    (instructions, labels)
}
