//! DOT-graph emission for a checked proof.
use std::fmt::Write;

use rustc_hash::FxHashSet;

use smtcore_proof::{ClauseId, ClauseSource, Premise};

/// Render the resolution DAG rooted at `roots` as a Graphviz DOT digraph.
///
/// Each clause is a node labeled with its literals; `History` edges point from a derived clause to
/// the parents it was resolved from. This is the only persisted proof artifact this core produces
/// (see the top-level error-handling notes): there is no binary proof format, only this
/// human/tool-readable graph.
pub fn to_dot(source: &impl ClauseSource, roots: &[ClauseId]) -> String {
    let mut out = String::new();
    let mut visited = FxHashSet::default();

    writeln!(out, "digraph proof {{").unwrap();
    writeln!(out, "  rankdir=BT;").unwrap();

    let mut stack: Vec<ClauseId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }

        let label = match source.literals(id) {
            Some(lits) if lits.is_empty() => "\u{22a5}".to_string(),
            Some(lits) => lits
                .iter()
                .map(|l| l.to_dimacs().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            None => "?".to_string(),
        };

        let shape = match source.premise(id) {
            Some(Premise::Hyp) => "box",
            Some(Premise::Local) => "ellipse",
            Some(Premise::Lemma(_)) => "hexagon",
            Some(Premise::History(_)) => "diamond",
            None => "plaintext",
        };

        writeln!(
            out,
            "  c{} [label=\"{}\", shape={}];",
            id.raw(),
            label.replace('"', "\\\""),
            shape
        )
        .unwrap();

        if let Some(Premise::History(parents)) = source.premise(id) {
            for &parent in parents {
                writeln!(out, "  c{} -> c{};", id.raw(), parent.raw()).unwrap();
                stack.push(parent);
            }
        }
    }

    writeln!(out, "}}").unwrap();
    out
}
