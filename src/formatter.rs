//! Graphviz `dot` rendering, feature-gated behind `visualization`.
//!
//! [`GraphWriter`] is a small strongly typed writer for the `dot` language
//! (only the subset actually used: digraphs, node/edge attribute lists).
//! [`Formatter`] is the per-machine hook that turns a transition-table
//! entry into the ids and label `render_dot` needs; [`crate::fsm::Fsm::render`]
//! and [`crate::pdm::Pdm::render`] supply it.
use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};

/// A `dot` identifier: printed bare when it already looks like one,
/// quoted and escaped otherwise.
#[derive(Clone, Debug)]
pub struct Id(String);

impl Id {
    pub fn new(raw: impl Into<String>) -> Self {
        Id(raw.into())
    }

    fn is_bare(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            write!(f, "{}", self.0)
        } else {
            let escaped = self.0.replace('\\', "\\\\").replace('"', "\\\"");
            write!(f, "\"{escaped}\"")
        }
    }
}

/// Node attributes (`a_list` in `dot` terms): a label and a peripheries
/// count (automaton convention: 2 for accepting states, 1 otherwise).
#[derive(Clone, Default)]
pub struct Node {
    pub label: Option<Id>,
    pub peripheries: Option<usize>,
}

/// Edge attributes: just a label.
#[derive(Clone, Default)]
pub struct Edge {
    pub label: Option<Id>,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(label) = &self.label {
            parts.push(format!("label={label}"));
        }
        if let Some(peripheries) = self.peripheries {
            parts.push(format!("peripheries={peripheries}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "label={label}"),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Family {
    Directed,
    Undirected,
}

impl Family {
    fn keyword(self) -> &'static str {
        match self {
            Family::Directed => "digraph",
            Family::Undirected => "graph",
        }
    }

    fn edgeop(self) -> &'static str {
        match self {
            Family::Directed => "->",
            Family::Undirected => "--",
        }
    }
}

/// Writes a `dot` graph incrementally. Closes the graph body on drop if
/// [`GraphWriter::finish`] was not called.
pub struct GraphWriter<W: Write> {
    inner: Option<W>,
    family: Family,
}

impl<W: Write> GraphWriter<W> {
    pub fn new(mut inner: W, family: Family, name: Option<&str>) -> io::Result<Self> {
        match name {
            Some(name) => writeln!(inner, "{} {} {{", family.keyword(), Id::new(name))?,
            None => writeln!(inner, "{} {{", family.keyword())?,
        }
        Ok(GraphWriter {
            inner: Some(inner),
            family,
        })
    }

    pub fn node(&mut self, id: Id, node: Node) -> io::Result<()> {
        let inner = self.inner.as_mut().expect("writer already finished");
        writeln!(inner, "\t{id} [{node}];")
    }

    pub fn edge(&mut self, from: Id, to: Id, edge: Edge) -> io::Result<()> {
        let inner = self.inner.as_mut().expect("writer already finished");
        writeln!(inner, "\t{from} {} {to} [{edge}];", self.family.edgeop())
    }

    pub fn finish(mut self) -> io::Result<W> {
        let mut inner = self.inner.take().expect("writer already finished");
        inner.write_all(b"}\n")?;
        Ok(inner)
    }
}

impl<W: Write> Drop for GraphWriter<W> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.as_mut() {
            let _ = inner.write_all(b"}\n");
        }
    }
}

/// The per-machine hook `render_dot` uses to turn a `(key, value)`
/// transition-table entry into renderable ids and a label.
pub trait Formatter<K, V> {
    fn source_id(key: &K) -> String;
    fn target_id(value: &V) -> String;
    fn label(key: &K, value: &V) -> String;
}

/// Render a machine's states and transitions to `dot` source. `start` gets
/// a synthetic point node with an edge into it (the conventional way to
/// mark an automaton's start state without a dedicated shape attribute);
/// every accepting id gets a doubled periphery.
pub fn render_dot<K, V, F: Formatter<K, V>>(
    state_ids: &[String],
    start_id: &str,
    accepting_ids: &HashSet<String>,
    edges: impl IntoIterator<Item = (K, V)>,
) -> io::Result<String> {
    let mut buffer = Vec::new();
    {
        let mut writer = GraphWriter::new(&mut buffer, Family::Directed, None)?;

        writer.node(
            Id::new("__start"),
            Node {
                label: Some(Id::new("")),
                peripheries: Some(0),
            },
        )?;
        writer.edge(Id::new("__start"), Id::new(start_id), Edge::default())?;

        for id in state_ids {
            let peripheries = if accepting_ids.contains(id) { 2 } else { 1 };
            writer.node(
                Id::new(id.clone()),
                Node {
                    label: Some(Id::new(id.clone())),
                    peripheries: Some(peripheries),
                },
            )?;
        }

        for (key, value) in edges {
            writer.edge(
                Id::new(F::source_id(&key)),
                Id::new(F::target_id(&value)),
                Edge {
                    label: Some(Id::new(F::label(&key, &value))),
                },
            )?;
        }

        writer.finish()?;
    }
    Ok(String::from_utf8(buffer).expect("dot writer only emits valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifiers_print_unquoted() {
        assert_eq!(Id::new("state_0").to_string(), "state_0");
    }

    #[test]
    fn identifiers_with_spaces_are_quoted_and_escaped() {
        assert_eq!(Id::new("has space").to_string(), "\"has space\"");
        assert_eq!(Id::new("a\"b").to_string(), "\"a\\\"b\"");
    }

    struct Echo;
    impl Formatter<(u32, u32), u32> for Echo {
        fn source_id(key: &(u32, u32)) -> String {
            key.0.to_string()
        }
        fn target_id(value: &u32) -> String {
            value.to_string()
        }
        fn label(key: &(u32, u32), _value: &u32) -> String {
            key.1.to_string()
        }
    }

    #[test]
    fn render_dot_emits_one_node_per_state_and_one_edge_per_transition() {
        let states = vec!["0".to_string(), "1".to_string()];
        let accepting = HashSet::from(["1".to_string()]);
        let edges = vec![((0, 42), 1)];
        let dot = render_dot::<_, _, Echo>(&states, "0", &accepting, edges).unwrap();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("peripheries=2"));
        assert!(dot.contains("0 -> 1"));
        assert!(dot.contains("label=42"));
    }
}
