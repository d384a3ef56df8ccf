//! Indented tree rendering of parsed statements, one node per line.

use std::fmt;

use super::ast::{Node, Variable};

pub fn render(node: &Node) -> String {
    let mut lines = Vec::new();
    render_into(node, 0, &mut lines);
    lines.join("\n")
}

fn render_into(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Block(block) => {
            lines.push(format!("{indent}Block ({})", block.statements.len()));
            for statement in &block.statements {
                render_into(statement, depth + 1, lines);
            }
        }
        Node::VarDeclaration(variable)
        | Node::VarDefinition(variable)
        | Node::VarAllocation(variable)
        | Node::VarReference(variable) => {
            lines.push(format!("{indent}{} {}", node.kind_name(), describe_variable(variable)));
        }
        Node::Empty => lines.push(format!("{indent}Empty")),
        _ => lines.push(format!("{indent}{} {}", node.kind_name(), inline(node))),
    }
}

fn describe_variable(variable: &Variable) -> String {
    let mut text = format!("{} [{}]", variable.name, variable.specifier());
    if let Some(value) = &variable.value {
        text.push_str(" = ");
        text.push_str(&inline(value));
    }
    text
}

/// Single-line form of a value node.
fn inline(node: &Node) -> String {
    match node {
        Node::Literal(value) => value.to_string(),
        Node::Lvalue(name) => name.clone(),
        Node::Set(set) => set.to_string(),
        other => format!("<{}>", other.kind_name()),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
