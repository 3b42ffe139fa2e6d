use crate::aig::Aig;
use crate::node::NodeId;

impl Aig {
    /// Renders the graph in Graphviz DOT format.
    ///
    /// PIs are drawn as source-ranked boxes and ANDs as circles;
    /// complemented fanin edges are dashed. Nodes listed in `highlight`
    /// (typically the leaves of a cut) are drawn filled.
    pub fn to_dot(&self, highlight: &[NodeId]) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph aig {{")?;
        writeln!(dot, "rankdir=BT;")?;
        writeln!(dot, "node [shape=circle, fixedsize=true];")?;

        // Inputs
        writeln!(dot, "{{ rank=source")?;
        self.foreach_node(|n| {
            if self.is_constant(n) || !self.is_pi(n) {
                return;
            }
            let style = if highlight.contains(&n) {
                ", style=filled"
            } else {
                ""
            };
            let _ = writeln!(dot, "{} [shape=box, label=\"x{}\"{}];", n, n, style);
        });
        writeln!(dot, "}}")?;

        // AND nodes and their fanin edges
        self.foreach_node(|n| {
            if self.is_constant(n) || self.is_pi(n) {
                return;
            }
            let style = if highlight.contains(&n) {
                " [style=filled]"
            } else {
                ""
            };
            let _ = writeln!(dot, "{} [label=\"n{}\"]{};", n, n, style);
            self.foreach_fanin(n, |fi| {
                if fi.is_complemented() {
                    let _ = writeln!(dot, "{} -> {} [style=dashed];", fi.index(), n);
                } else {
                    let _ = writeln!(dot, "{} -> {};", fi.index(), n);
                }
                true
            });
        });

        // Outputs
        writeln!(dot, "{{ rank=sink")?;
        let mut position = 0;
        self.foreach_po(|_| {
            let _ = writeln!(dot, "o{} [shape=box, label=\"o{}\"];", position, position);
            position += 1;
        });
        writeln!(dot, "}}")?;

        let mut position = 0;
        self.foreach_po(|output| {
            if output.is_complemented() {
                let _ = writeln!(dot, "{} -> o{} [style=dashed];", output.index(), position);
            } else {
                let _ = writeln!(dot, "{} -> o{};", output.index(), position);
            }
            position += 1;
        });

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
