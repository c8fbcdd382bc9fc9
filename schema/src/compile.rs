//! Schema compilation: keyword parsing and eager `$ref` resolution.
//!
//! Every schema location is registered under its JSON pointer while the
//! document is walked. Once the walk is complete each `$ref` is resolved
//! against that table, and the end of every reference chain is memoized so
//! [`Schema::actual`](crate::Schema::actual) is a single lookup.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::node::{AdditionalProperties, NodeId, SchemaNode};
use crate::types::JsonType;

/// Output of a successful compilation.
pub(crate) struct Compiled {
    pub nodes: Vec<SchemaNode>,
    pub actual: Vec<NodeId>,
    pub root: NodeId,
}

#[derive(Default)]
pub(crate) struct Compiler {
    nodes: Vec<SchemaNode>,
    pointers: HashMap<String, NodeId>,
    references: Vec<(NodeId, String)>,
}

impl Compiler {
    pub fn compile(mut self, root: &Value) -> Result<Compiled> {
        let root = self.node(root, "#".to_string())?;

        let mut targets: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (id, reference) in &self.references {
            let pointer = &self.nodes[id.0].pointer;
            if !reference.starts_with('#') {
                return Err(SchemaError::UnsupportedReference {
                    pointer: pointer.clone(),
                    reference: reference.clone(),
                });
            }
            let target = self.pointers.get(reference.as_str()).copied().ok_or_else(|| {
                SchemaError::UnresolvedReference {
                    pointer: pointer.clone(),
                    reference: reference.clone(),
                }
            })?;
            targets[id.0] = Some(target);
        }

        let actual = (0..self.nodes.len())
            .map(|index| follow(&self.nodes, &targets, NodeId(index)))
            .collect::<Result<Vec<_>>>()?;
        check_applicator_cycles(&self.nodes, &targets)?;

        debug!(
            nodes = self.nodes.len(),
            references = self.references.len(),
            "Compiled schema"
        );

        Ok(Compiled {
            nodes: self.nodes,
            actual,
            root,
        })
    }

    fn node(&mut self, value: &Value, pointer: String) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode {
            pointer: pointer.clone(),
            ..SchemaNode::default()
        });
        self.pointers.insert(pointer.clone(), id);

        let map = match value {
            Value::Object(map) => map,
            Value::Bool(true) => return Ok(id),
            Value::Bool(false) => {
                let everything = self.node(&Value::Bool(true), format!("{pointer}/not"))?;
                self.nodes[id.0].not = Some(everything);
                return Ok(id);
            }
            other => {
                return Err(SchemaError::InvalidSchema {
                    pointer,
                    reason: format!("expected an object or boolean, found {other}"),
                });
            }
        };

        let mut node = SchemaNode {
            pointer: pointer.clone(),
            ..SchemaNode::default()
        };
        let mut exclusive_minimum_flag = false;
        let mut exclusive_maximum_flag = false;

        for (key, value) in map {
            match key.as_str() {
                "$schema" | "$id" | "id" => {}
                "$ref" => {
                    if let Some(reference) = value.as_str() {
                        node.reference = Some(reference.to_string());
                        self.references.push((id, reference.to_string()));
                    }
                }
                "title" => node.title = value.as_str().map(String::from),
                "description" => node.description = value.as_str().map(String::from),
                "type" => node.types = JsonType::from_keyword(value),
                "format" => node.format = value.as_str().map(String::from),
                "default" => node.default = Some(value.clone()),
                "properties" => {
                    node.properties = self.members(value, &format!("{pointer}/properties"))?;
                }
                "definitions" | "$defs" => {
                    let defs = self.members(value, &format!("{pointer}/{key}"))?;
                    node.definitions.extend(defs);
                }
                "required" => match value {
                    Value::Array(names) => {
                        node.required = names
                            .iter()
                            .filter_map(Value::as_str)
                            .map(String::from)
                            .collect();
                    }
                    Value::Bool(flag) => node.required_flag = *flag,
                    _ => {}
                },
                "items" => match value {
                    Value::Array(items) => {
                        let ids = self.list(items, &format!("{pointer}/items"))?;
                        node.item = ids.first().copied();
                    }
                    other => node.item = Some(self.node(other, format!("{pointer}/items"))?),
                },
                "enum" => node.enumeration = value.as_array().cloned(),
                "const" => node.enumeration = Some(vec![value.clone()]),
                "minimum" => node.minimum = value.as_f64(),
                "maximum" => node.maximum = value.as_f64(),
                "exclusiveMinimum" => match value {
                    Value::Bool(flag) => exclusive_minimum_flag = *flag,
                    other => node.exclusive_minimum = other.as_f64(),
                },
                "exclusiveMaximum" => match value {
                    Value::Bool(flag) => exclusive_maximum_flag = *flag,
                    other => node.exclusive_maximum = other.as_f64(),
                },
                "multipleOf" => node.multiple_of = value.as_f64().filter(|m| *m > 0.0),
                "minLength" => node.min_length = as_usize(value),
                "maxLength" => node.max_length = as_usize(value),
                "pattern" => {
                    if let Some(pattern) = value.as_str() {
                        let regex =
                            Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                                pointer: pointer.clone(),
                                source,
                            })?;
                        node.pattern = Some(regex);
                    }
                }
                "minItems" => node.min_items = as_usize(value),
                "maxItems" => node.max_items = as_usize(value),
                "uniqueItems" => node.unique_items = value.as_bool().unwrap_or(false),
                "additionalProperties" => {
                    node.additional_properties = match value {
                        Value::Bool(false) => AdditionalProperties::Denied,
                        Value::Object(_) => AdditionalProperties::Schema(
                            self.node(value, format!("{pointer}/additionalProperties"))?,
                        ),
                        _ => AdditionalProperties::Allowed,
                    };
                }
                "allOf" | "anyOf" | "oneOf" => {
                    let ids = match value {
                        Value::Array(items) => self.list(items, &format!("{pointer}/{key}"))?,
                        _ => Vec::new(),
                    };
                    match key.as_str() {
                        "allOf" => node.all_of = ids,
                        "anyOf" => node.any_of = ids,
                        _ => node.one_of = ids,
                    }
                }
                "not" => node.not = Some(self.node(value, format!("{pointer}/not"))?),
                _ => {
                    node.extension_data.insert(key.clone(), value.clone());
                }
            }
        }

        // Draft 4 spells exclusive bounds as booleans next to minimum/maximum.
        if exclusive_minimum_flag {
            node.exclusive_minimum = node.minimum.take();
        }
        if exclusive_maximum_flag {
            node.exclusive_maximum = node.maximum.take();
        }

        self.nodes[id.0] = node;
        Ok(id)
    }

    fn members(&mut self, value: &Value, pointer: &str) -> Result<Vec<(String, NodeId)>> {
        let Value::Object(map) = value else {
            return Ok(Vec::new());
        };
        let mut members = Vec::with_capacity(map.len());
        for (name, schema) in map {
            let id = self.node(schema, format!("{pointer}/{}", escape_pointer(name)))?;
            members.push((name.clone(), id));
        }
        Ok(members)
    }

    fn list(&mut self, items: &[Value], pointer: &str) -> Result<Vec<NodeId>> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.node(item, format!("{pointer}/{index}")))
            .collect()
    }
}

/// Follows `$ref` targets from `start` to the first node that is not a
/// reference.
fn follow(nodes: &[SchemaNode], targets: &[Option<NodeId>], start: NodeId) -> Result<NodeId> {
    let mut seen = HashSet::new();
    let mut current = start;
    while let Some(next) = targets[current.0] {
        if !seen.insert(current) {
            return Err(SchemaError::ReferenceCycle(nodes[start.0].pointer.clone()));
        }
        current = next;
    }
    Ok(current)
}

/// Schemas applied to the same value as `id`: its `$ref` target, otherwise
/// its `allOf`/`anyOf`/`oneOf`/`not` members.
fn applicators(nodes: &[SchemaNode], targets: &[Option<NodeId>], id: NodeId) -> Vec<NodeId> {
    if let Some(target) = targets[id.0] {
        return vec![target];
    }
    let node = &nodes[id.0];
    node.all_of
        .iter()
        .chain(&node.any_of)
        .chain(&node.one_of)
        .chain(node.not.iter())
        .copied()
        .collect()
}

/// Rejects a schema that reaches itself through `$ref` and combinators
/// without descending into a member or item.
fn check_applicator_cycles(nodes: &[SchemaNode], targets: &[Option<NodeId>]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for start in (0..nodes.len()).map(NodeId) {
        if marks[start.0] != Mark::Unvisited {
            continue;
        }
        marks[start.0] = Mark::Active;
        let mut stack = vec![(start, applicators(nodes, targets, start))];

        while let Some((id, pending)) = stack.last_mut() {
            let id = *id;
            match pending.pop() {
                Some(next) => match marks[next.0] {
                    Mark::Active => {
                        return Err(SchemaError::ReferenceCycle(nodes[next.0].pointer.clone()));
                    }
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[next.0] = Mark::Active;
                        stack.push((next, applicators(nodes, targets, next)));
                    }
                },
                None => {
                    marks[id.0] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }
    Ok(())
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

/// Escapes a member name as a JSON pointer token (RFC 6901).
pub(crate) fn escape_pointer(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}
