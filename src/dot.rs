use std::{collections::HashMap, io::Write};

use crate::Value;

impl Value {
    /// Write graphviz dot file to the given writer.
    ///
    /// Nodes are numbered in topological order, so the same graph always renders the same way.
    pub fn dot(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let order = self.topological_order();
        let ids: HashMap<usize, usize> = order
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();
        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for (i, node) in order.iter().enumerate() {
            let label = node.label().replace('"', "\\\"");
            let op = if node.is_leaf() {
                String::new()
            } else {
                format!(" [{}]", node.op_tag())
            };
            writeln!(
                writer,
                "a{i} [label=\"{label}{op} \\ndata:{}, grad:{}\"];",
                node.data(),
                node.grad()
            )?;
        }
        for (i, node) in order.iter().enumerate() {
            for child in node.children() {
                if let Some(cid) = ids.get(&child.id()) {
                    writeln!(writer, "a{cid} -> a{i};")?;
                }
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}
