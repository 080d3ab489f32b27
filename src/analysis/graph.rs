use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Direction, Graph};
use tracing::debug;

use crate::catalog::{FactMap, ObjectType, Sortable, TableDefinition, Type, TypeKind};
use crate::error::{PredataError, Result};

/// One entry of the emission sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub object_type: ObjectType,
    pub name: String,
    /// Index in the emission sequence.
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyType {
    /// Argument, result, attribute, column or base type.
    Type,
    /// Input/output function of a base type.
    Function,
    /// Inheritance parent of a table.
    Parent,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: Graph<ObjectRef, DependencyType>,
    node_map: HashMap<ObjectRef, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from the references each object carries. Edges point
    /// from dependency to dependent; references to objects outside the
    /// sequence are dropped.
    pub fn build_from_sortables(objects: &[Sortable], table_defs: &FactMap<TableDefinition>) -> Self {
        let mut graph = Self::new();
        debug!("Building dependency graph from {} objects", objects.len());

        let refs: Vec<ObjectRef> = objects
            .iter()
            .enumerate()
            .map(|(position, object)| ObjectRef {
                object_type: object.object_type(),
                name: object.fqn(),
                position,
            })
            .collect();

        // first occurrence wins for overloaded names
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (position, object) in objects.iter().enumerate() {
            graph.add_node(refs[position].clone());
            by_name.entry(object.fqn()).or_insert(position);
            if let Some(bare) = unqualified_public_name(object) {
                by_name.entry(bare).or_insert(position);
            }
        }

        // (function, base type) pairs where the function is an I/O function
        // of the type; those functions only see the shell type
        let mut io_functions: HashSet<(usize, usize)> = HashSet::new();
        for (position, object) in objects.iter().enumerate() {
            if let Sortable::Type(Type {
                kind: TypeKind::Base(base),
                ..
            }) = object
            {
                for function in [&base.input, &base.output, &base.receive, &base.send] {
                    if let Some(&function_position) = by_name.get(function.as_str()) {
                        io_functions.insert((function_position, position));
                    }
                }
            }
        }

        for (position, object) in objects.iter().enumerate() {
            for (reference, dep_type) in references(object, table_defs) {
                let Some(&dep_position) = by_name.get(&reference) else {
                    continue;
                };
                if dep_position == position {
                    continue;
                }
                if dep_type == DependencyType::Type && io_functions.contains(&(position, dep_position)) {
                    continue;
                }
                debug!(
                    "  Creating edge: {} -> {}",
                    refs[dep_position].name, refs[position].name
                );
                graph.add_edge(refs[dep_position].clone(), refs[position].clone(), dep_type);
            }
        }

        graph
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, object_ref: ObjectRef) -> NodeIndex {
        if let Some(&node_id) = self.node_map.get(&object_ref) {
            node_id
        } else {
            let node_id = self.graph.add_node(object_ref.clone());
            self.node_map.insert(object_ref, node_id);
            node_id
        }
    }

    /// Add an edge between two objects
    pub fn add_edge(&mut self, from: ObjectRef, to: ObjectRef, dep_type: DependencyType) {
        let from_node = self.add_node(from);
        let to_node = self.add_node(to);
        self.graph.add_edge(from_node, to_node, dep_type);
    }

    /// Check if the graph has cycles
    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Fail on the first object emitted before something it depends on.
    pub fn check_order(&self) -> Result<()> {
        if self.has_cycles() {
            let members = petgraph::algo::tarjan_scc(&self.graph)
                .into_iter()
                .find(|component| component.len() > 1)
                .map(|component| {
                    component
                        .into_iter()
                        .map(|node| self.graph[node].name.clone())
                        .collect::<Vec<_>>()
                        .join(" -> ")
                })
                .unwrap_or_default();
            return Err(PredataError::CircularDependency(members));
        }

        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by_key(|edge| (self.graph[edge.target()].position, self.graph[edge.source()].position));

        for edge in edges {
            let dependency = &self.graph[edge.source()];
            let object = &self.graph[edge.target()];
            if dependency.position > object.position {
                return Err(PredataError::DependencyOrder {
                    object: object.name.clone(),
                    dependency: dependency.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Get dependencies of a specific object
    pub fn dependencies_of(&self, object_ref: &ObjectRef) -> Vec<ObjectRef> {
        match self.node_map.get(object_ref) {
            Some(&node_id) => self
                .graph
                .neighbors_directed(node_id, Direction::Incoming)
                .map(|dep_node| self.graph[dep_node].clone())
                .collect(),
            None => vec![],
        }
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Output the dependency graph in Graphviz DOT format
    pub fn to_graphviz(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph dependency_graph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=rounded];\n\n");

        for node_index in self.graph.node_indices() {
            let obj_ref = &self.graph[node_index];
            let (color, shape) = match obj_ref.object_type {
                ObjectType::Table | ObjectType::ForeignTable => ("lightcyan", "rect"),
                ObjectType::Function => ("lightgreen", "ellipse"),
                ObjectType::Type => ("lightyellow", "diamond"),
                ObjectType::Domain => ("lightcoral", "hexagon"),
                _ => ("lightgray", "box"),
            };

            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\", fillcolor={}, style=\"filled,rounded\", shape={}];\n",
                node_id(obj_ref),
                escape_label(&obj_ref.name),
                obj_ref.object_type.to_string().to_lowercase(),
                color,
                shape
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            let edge_style = match edge.weight() {
                DependencyType::Type => "solid",
                DependencyType::Function => "dashed",
                DependencyType::Parent => "bold",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                node_id(&self.graph[edge.source()]),
                node_id(&self.graph[edge.target()]),
                edge_style
            ));
        }

        output.push_str("}\n");
        output
    }
}

/// Build the graph for `objects` and check that every object follows the
/// objects it references.
pub fn validate_dependency_order(
    objects: &[Sortable],
    table_defs: &FactMap<TableDefinition>,
) -> Result<DependencyGraph> {
    let graph = DependencyGraph::build_from_sortables(objects, table_defs);
    graph.check_order()?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Dependency order validated"
    );
    Ok(graph)
}

fn node_id(obj_ref: &ObjectRef) -> String {
    format!("{}::{}", obj_ref.position, escape_label(&obj_ref.name))
}

fn escape_label(name: &str) -> String {
    name.replace('"', "\\\"")
}

/// Objects in `public` can be referenced without their schema.
fn unqualified_public_name(object: &Sortable) -> Option<String> {
    let (schema, name) = match object {
        Sortable::Function(function) => (&function.schema, &function.name),
        Sortable::Type(type_) => (&type_.schema, &type_.name),
        Sortable::Table(relation) => (&relation.schema, &relation.name),
    };
    (schema == "public").then(|| crate::catalog::quote_ident(name))
}

/// Names an object refers to, as they appear in its catalog text.
fn references(object: &Sortable, table_defs: &FactMap<TableDefinition>) -> Vec<(String, DependencyType)> {
    let mut refs = Vec::new();

    match object {
        Sortable::Function(function) => {
            push_names(argument_types(&function.arguments), &mut refs);
            push_names(result_types(&function.result_type), &mut refs);
        }
        Sortable::Type(type_) => match &type_.kind {
            TypeKind::Base(base) => {
                for function in [&base.input, &base.output, &base.receive, &base.send] {
                    if !function.is_empty() {
                        refs.push((function.clone(), DependencyType::Function));
                    }
                }
                push_names(type_names(&base.element), &mut refs);
            }
            TypeKind::Composite { attributes } => {
                for attribute in attributes {
                    push_names(type_names(&attribute.type_name), &mut refs);
                }
            }
            TypeKind::Domain(domain) => push_names(type_names(&domain.base_type), &mut refs),
        },
        Sortable::Table(relation) => {
            if let Some(def) = table_defs.lookup(relation.oid) {
                for column in &def.column_defs {
                    push_names(type_names(&column.type_name), &mut refs);
                }
                push_names(type_names(&def.table_type), &mut refs);
                refs.extend(def.inherits.iter().map(|parent| (parent.clone(), DependencyType::Parent)));
            }
        }
    }
    refs
}

fn push_names(names: Vec<String>, refs: &mut Vec<(String, DependencyType)>) {
    refs.extend(names.into_iter().map(|name| (name, DependencyType::Type)));
}

const ARGUMENT_MODES: [&str; 4] = ["IN", "OUT", "INOUT", "VARIADIC"];

/// Words that continue a multi-word type name such as `double precision`.
const TYPE_CONTINUATIONS: [&str; 12] = [
    "varying", "precision", "with", "without", "zone", "to", "year", "month", "day", "hour", "minute",
    "second",
];

/// Type names in a function argument list: `[mode] [name] type [DEFAULT expr], ...`.
fn argument_types(arguments: &str) -> Vec<String> {
    split_top_level(arguments, ',')
        .into_iter()
        .flat_map(|argument| {
            let mut words = words(argument);
            if let Some(default) = words.iter().position(|word| word.eq_ignore_ascii_case("DEFAULT")) {
                words.truncate(default);
            }
            if words
                .first()
                .is_some_and(|word| ARGUMENT_MODES.iter().any(|mode| word.eq_ignore_ascii_case(mode)))
            {
                words.remove(0);
            }
            if words.len() > 1 && !is_type_continuation(&words[1]) {
                words.remove(0);
            }
            words.iter().filter_map(|word| type_name(word)).collect::<Vec<_>>()
        })
        .collect()
}

/// Type names in a result: a type, `SETOF type` or `TABLE(name type, ...)`.
fn result_types(result: &str) -> Vec<String> {
    let result = result.trim();
    if let Some(columns) = strip_prefix_ignore_case(result, "TABLE")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return argument_types(columns);
    }
    let result = strip_prefix_ignore_case(result, "SETOF ").unwrap_or(result);
    type_names(result)
}

fn type_names(text: &str) -> Vec<String> {
    words(text).iter().filter_map(|word| type_name(word)).collect()
}

fn is_type_continuation(word: &str) -> bool {
    let bare = type_name(word).unwrap_or_default();
    TYPE_CONTINUATIONS.iter().any(|keyword| bare.eq_ignore_ascii_case(keyword))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// A word with any type modifier or array bounds removed.
fn type_name(word: &str) -> Option<String> {
    let mut in_quotes = false;
    let mut end = word.len();
    for (index, c) in word.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => {
                end = index;
                break;
            }
            _ => {}
        }
    }
    let name = &word[..end];
    (!name.is_empty()).then(|| name.to_string())
}

/// Whitespace-separated words, keeping quoted identifiers and
/// parenthesized modifiers attached to their word.
fn words(text: &str) -> Vec<String> {
    split_top_level(text, ' ')
        .into_iter()
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split on `separator` outside double quotes and parentheses. A space
/// separator matches any whitespace.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            _ if in_quotes || depth > 0 => {}
            _ if c == separator || (separator == ' ' && c.is_whitespace()) => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
