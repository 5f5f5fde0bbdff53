//! Renders the retained processes and realized links into a Graphviz
//! `digraph` description.
//!
//! The attribute names and value grammar here are consumed by an external
//! layout tool (`dot`, `xdot`, ...) and must stay stable. Nodes are sorted
//! by pid and links arrive pre-sorted from the correlator, so the same
//! capture always renders byte-identical output regardless of line order.

use crate::config::{Config, DEFAULT_RANKDIR};
use crate::link::Link;
use crate::record::{Pid, ProcessRecord, NO_PARENT};

use super::STYLES;

/// Escapes a value for use inside a double-quoted dot string.
fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// One node statement: label carries name, pid and login on two lines.
fn node_statement(pid: Pid, rec: &ProcessRecord) -> String {
    let color = if rec.is_resident() {
        &STYLES.node.resident_fill
    } else {
        &STYLES.node.default_fill
    };
    let name = escape_label(rec.display_name());
    let login = escape_label(rec.login.as_deref().unwrap_or("-"));
    format!(
        "p{pid} [label=\"{name}\\n{pid} {login}\", fillcolor={color}];",
        pid = pid,
        name = name,
        login = login,
        color = color
    )
}

/// Ancestry edge parent -> child: heavy, neutral, no arrowheads, so the
/// layout keeps families together without suggesting data flow.
fn ancestry_statement(parent: Pid, child: Pid) -> String {
    format!(
        "p{a} -> p{b} [label=\"\", penwidth=2, weight=100, color={color}, dir=\"none\"];",
        a = parent,
        b = child,
        color = STYLES.edge.ancestry_color
    )
}

/// Channel edge between the two participants of a realized link.
fn link_statement(link: &Link) -> String {
    format!(
        "p{a} -> p{b} [label=\"{desc}:\\n{key}\", penwidth=1, weight=10, color={color}, dir=\"{dir}\"];",
        a = link.src,
        b = link.dst,
        desc = link.class.label(),
        key = link.key,
        color = STYLES.channel_color(link.class),
        dir = link.direction.dot_value()
    )
}

/// Renders the full graph description.
pub fn render(snapshot: &crate::record::Snapshot, links: &[Link], cfg: &Config) -> String {
    let rankdir = cfg.rankdir.as_deref().unwrap_or(DEFAULT_RANKDIR);
    let show_ancestry = cfg.show_ancestry.unwrap_or(true);

    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for pid in snapshot.sorted_pids() {
        let rec = &snapshot.processes[&pid];
        nodes.push(node_statement(pid, rec));

        if show_ancestry {
            if let Some(parent) = rec.parent {
                // Edges to filtered-out parents would conjure phantom
                // nodes in the layout, so both ends must be retained.
                if parent != NO_PARENT && snapshot.processes.contains_key(&parent) {
                    edges.push(ancestry_statement(parent, pid));
                }
            }
        }
    }

    for link in links {
        edges.push(link_statement(link));
    }

    let mut out = String::new();
    out.push_str("digraph G {\n");
    out.push_str(&format!(
        "    graph [center=true, margin=0.2, nodesep=0.1, ranksep=0.3, rankdir={}];\n",
        rankdir
    ));
    out.push_str(
        "\tnode [shape=box, style=\"rounded,filled\", width=0, height=0, fontname=Helvetica, fontsize=10];\n",
    );
    out.push_str("\tedge [fontname=Helvetica, fontsize=10];\n");
    for node in &nodes {
        out.push('\t');
        out.push_str(node);
        out.push('\n');
    }
    for edge in &edges {
        out.push('\t');
        out.push_str(edge);
        out.push('\n');
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::correlate;
    use crate::record::parse_capture;

    fn render_capture(input: &str) -> String {
        let snapshot = parse_capture(input.as_bytes()).unwrap();
        let links = correlate(&snapshot).unwrap();
        render(&snapshot, &links, &Config::default())
    }

    #[test]
    fn test_single_process_no_descriptors() {
        let out = render_capture("p10\ncbash\nLroot\nR1\n");
        assert!(out.contains("p10 [label=\"bash\\n10 root\", fillcolor=grey70];"));
        assert!(!out.contains("->"));
    }

    #[test]
    fn test_non_resident_fill() {
        let out = render_capture("p10\ncbash\nLroot\nR500\n");
        assert!(out.contains("fillcolor=white"));
    }

    #[test]
    fn test_ancestry_edge_between_retained_processes() {
        let out = render_capture("p10\ncbash\nLroot\nR1\np20\ncvi\nLroot\nR10\n");
        assert!(out.contains(
            "p10 -> p20 [label=\"\", penwidth=2, weight=100, color=gray60, dir=\"none\"];"
        ));
    }

    #[test]
    fn test_no_ancestry_edge_to_sentinel_parent() {
        let out = render_capture("p10\ncbash\nLroot\nR1\n");
        assert!(!out.contains("p1 -> p10"));
    }

    #[test]
    fn test_no_ancestry_edge_to_missing_parent() {
        // Parent 500 is not in the capture, so no edge may reference it
        let out = render_capture("p10\ncbash\nLroot\nR500\n");
        assert!(!out.contains("p500"));
    }

    #[test]
    fn test_unix_link_edge() {
        let out = render_capture(
            "p10\ncclient\nLroot\nR1\nf4\ntunix\nau\ni12345\n\
             p20\ncserver\nLroot\nR1\nf7\ntunix\nau\ni12345\n",
        );
        assert!(out.contains(
            "p10 -> p20 [label=\"unix:\\n12345\", penwidth=1, weight=10, color=purple, dir=\"both\"];"
        ));
    }

    #[test]
    fn test_rankdir_from_config() {
        let snapshot = parse_capture("p10\ncx\n".as_bytes()).unwrap();
        let mut cfg = Config::default();
        cfg.rankdir = Some("TB".to_string());
        let out = render(&snapshot, &[], &cfg);
        assert!(out.contains("rankdir=TB"));
    }

    #[test]
    fn test_show_ancestry_disabled() {
        let snapshot = parse_capture("p10\ncx\nR1\np20\ncy\nR10\n".as_bytes()).unwrap();
        let mut cfg = Config::default();
        cfg.show_ancestry = Some(false);
        let out = render(&snapshot, &[], &cfg);
        assert!(!out.contains("p10 -> p20"));
    }

    #[test]
    fn test_label_escaping() {
        let out = render_capture("p10\ncweird\"name\n");
        assert!(out.contains("weird\\\"name"));
    }

    #[test]
    fn test_graph_wrapper_grammar() {
        let out = render_capture("p10\ncx\n");
        assert!(out.starts_with("digraph G {\n"));
        assert!(out.contains(
            "graph [center=true, margin=0.2, nodesep=0.1, ranksep=0.3, rankdir=LR];"
        ));
        assert!(out.contains("node [shape=box, style=\"rounded,filled\""));
        assert!(out.ends_with('}'));
    }
}
