//! Diagnostic dumps of a plan tree, as indented text and as JSON.

use std::fmt::Write;
use serde_json::{Map, Value};
use crate::blueprint::node::{NodeId, NodeKind, Operator};
use crate::blueprint::tree::PlanTree;

/// Structured form shared by the text and JSON renderings.
#[derive(Debug, Clone, PartialEq)]
enum Dump {
    Object(String, Vec<(String, Dump)>),
    Bool(bool),
    Int(u64),
    Float(f64),
    Str(String),
}

impl PlanTree {
    /// Nested `Name { key: value }` rendering of the subtree at `id`.
    pub fn as_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        render_text(&self.dump_node(id), 0, &mut out);
        out.push('\n');
        out
    }

    /// The same content as [`as_string`](Self::as_string) as a JSON object;
    /// each object carries its type name under `"[type]"`.
    pub fn as_json(&self, id: NodeId) -> Value {
        to_json(&self.dump_node(id))
    }

    fn is_term_like(&self, id: NodeId) -> bool {
        match self.node(id).operator() {
            None => true,
            Some(Operator::Or | Operator::WeakAnd { .. }) => {
                self.children(id).iter().all(|&c| self.is_term_like(c))
            }
            Some(_) => false,
        }
    }

    fn dump_node(&self, id: NodeId) -> Dump {
        let node = self.node(id);
        let state = self.state(id);
        let type_name = match &node.kind {
            NodeKind::Leaf(_) => "LeafBlueprint".to_string(),
            NodeKind::Intermediate(op) => op.name().to_string(),
        };
        let mut members = vec![("isTermLike".to_string(), Dump::Bool(self.is_term_like(id)))];
        if let NodeKind::Leaf(leaf) = &node.kind {
            members.push(("source".to_string(), Dump::Str(leaf.source.name().to_string())));
        }
        if let Some(op) = node.operator() {
            match op {
                Operator::Near { window } | Operator::ONear { window } => {
                    members.push(("window".to_string(), Dump::Int(window as u64)));
                }
                Operator::WeakAnd { target_hits } => {
                    members.push(("target_hits".to_string(), Dump::Int(target_hits as u64)));
                }
                _ => {}
            }
        }
        let fields = state
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let field = Dump::Object(
                    "Field".to_string(),
                    vec![
                        ("fieldId".to_string(), Dump::Int(f.field_id as u64)),
                        ("handle".to_string(), Dump::Int(f.handle as u64)),
                        ("isFilter".to_string(), Dump::Bool(f.is_filter)),
                    ],
                );
                (format!("[{}]", i), field)
            })
            .collect();
        members.push(("fields".to_string(), Dump::Object("FieldList".to_string(), fields)));
        members.push((
            "estimate".to_string(),
            Dump::Object(
                "HitEstimate".to_string(),
                vec![
                    ("empty".to_string(), Dump::Bool(state.estimate.empty)),
                    ("estHits".to_string(), Dump::Int(state.estimate.est_hits as u64)),
                    ("cost_tier".to_string(), Dump::Int(state.cost_tier as u64)),
                    ("tree_size".to_string(), Dump::Int(state.tree_size as u64)),
                    ("allow_termwise_eval".to_string(), Dump::Bool(state.allow_termwise_eval)),
                ],
            ),
        ));
        members.push(("relative_estimate".to_string(), Dump::Float(node.flow.estimate)));
        members.push(("cost".to_string(), Dump::Float(node.flow.cost)));
        members.push(("strict_cost".to_string(), Dump::Float(node.flow.strict_cost)));
        members.push(("sourceId".to_string(), Dump::Int(node.source_id as u64)));
        members.push(("docid_limit".to_string(), Dump::Int(node.docid_limit as u64)));
        members.push(("id".to_string(), Dump::Int(node.id as u64)));
        members.push(("strict".to_string(), Dump::Bool(node.strict)));
        if node.operator().is_some() {
            let children = node
                .children
                .iter()
                .enumerate()
                .map(|(i, &c)| (format!("[{}]", i), self.dump_node(c)))
                .collect();
            members.push(("children".to_string(), Dump::Object("Children".to_string(), children)));
        }
        Dump::Object(type_name, members)
    }
}

fn render_text(dump: &Dump, depth: usize, out: &mut String) {
    match dump {
        Dump::Object(name, members) => {
            let _ = write!(out, "{} {{", name);
            for (key, value) in members {
                let _ = write!(out, "\n{}{}: ", "    ".repeat(depth + 1), key);
                render_text(value, depth + 1, out);
            }
            let _ = write!(out, "\n{}}}", "    ".repeat(depth));
        }
        Dump::Bool(v) => {
            let _ = write!(out, "{}", v);
        }
        Dump::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Dump::Float(v) => {
            let _ = write!(out, "{}", v);
        }
        Dump::Str(v) => {
            let _ = write!(out, "'{}'", v);
        }
    }
}

fn to_json(dump: &Dump) -> Value {
    match dump {
        Dump::Object(name, members) => {
            let mut map = Map::new();
            map.insert("[type]".to_string(), Value::String(name.clone()));
            for (key, value) in members {
                map.insert(key.clone(), to_json(value));
            }
            Value::Object(map)
        }
        Dump::Bool(v) => Value::Bool(*v),
        Dump::Int(v) => Value::from(*v),
        Dump::Float(v) => Value::from(*v),
        Dump::Str(v) => Value::String(v.clone()),
    }
}
