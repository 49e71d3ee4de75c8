//! AIG to DOT (Graphviz) conversion.
//!
//! Conventions of the generated graph:
//! - the constant node is a square at the bottom (sink rank),
//! - primary inputs are triangles, AND nodes are circles ranked by level,
//! - complemented edges are dotted and end in a hollow circle,
//! - roots are rectangles at the top (source rank).
//!
//! ```
//! use fraig_rs::aig::Aig;
//!
//! let aig = Aig::new(2, 0);
//! let f = aig.apply_xor(aig.input(0), aig.input(1));
//!
//! let dot = aig.to_dot(&[f]).unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::aig::Aig;
use crate::reference::Ref;
use crate::sat::SatSolver;

/// Visual settings for [`Aig::to_dot_with_config`].
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for AND nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for primary inputs (default: "invtriangle")
    pub input_shape: &'static str,
    /// Shape for the constant node (default: "square")
    pub constant_shape: &'static str,
    /// Shape for root nodes (default: "rect")
    pub root_shape: &'static str,
    /// Style for regular edges (default: "solid")
    pub edge_style: &'static str,
    /// Style for complemented edges (default: "dotted")
    pub negated_edge_style: &'static str,
    /// Whether to use HTML labels for subscripts (default: true)
    pub use_html_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            input_shape: "invtriangle",
            constant_shape: "square",
            root_shape: "rect",
            edge_style: "solid",
            negated_edge_style: "dotted",
            use_html_labels: true,
        }
    }
}

impl DotConfig {
    fn edge_attrs(&self, r: Ref) -> String {
        if r.is_complemented() {
            format!("style={}, arrowhead=odot", self.negated_edge_style)
        } else {
            format!("style={}", self.edge_style)
        }
    }
}

impl<S: SatSolver> Aig<S> {
    /// Render the cone of `roots` in DOT format.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[Ref], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"1\"];", config.constant_shape)?;
        writeln!(dot, "}}")?;

        let nodes = self.topological_order(roots);

        let mut levels = BTreeMap::<u32, Vec<Ref>>::new();
        for &id in nodes.iter() {
            let r = Ref::positive(id);
            if !self.is_const(r) {
                levels.entry(self.level(r)).or_default().push(r);
            }
        }

        for level in levels.values() {
            writeln!(dot, "{{ rank=same")?;
            for &r in level.iter() {
                if self.is_input(r) {
                    let i = r.index() - 1;
                    let label = if config.use_html_labels {
                        format!("<x<SUB>{}</SUB>>", i)
                    } else {
                        format!("\"x{}\"", i)
                    };
                    writeln!(dot, "{} [shape={}, label={}];", r.index(), config.input_shape, label)?;
                } else {
                    writeln!(dot, "{} [label=\"{}\"];", r.index(), r.index())?;
                }
            }
            writeln!(dot, "}}")?;
        }

        // Edges point from a gate to its children.
        for &id in nodes.iter() {
            if let Some(fanins) = self.fanins(Ref::positive(id)) {
                for f in fanins {
                    writeln!(dot, "{} -> {} [{}];", id.index(), f.index(), config.edge_attrs(f))?;
                }
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, &root) in roots.iter().enumerate() {
            writeln!(dot, "r{} -> {} [{}];", i, root.index(), config.edge_attrs(root))?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dot_basic() {
        let aig = Aig::new(3, 0);
        let f = aig.apply_and_many([aig.input(0), !aig.input(1), aig.input(2)]);

        let dot = aig.to_dot(&[f]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("arrowhead=odot"));
        assert!(dot.contains("<x<SUB>2</SUB>>"));
    }

    #[test]
    fn test_to_dot_constants() {
        let aig = Aig::new(1, 0);
        let dot = aig.to_dot(&[aig.zero, aig.one]).unwrap();
        assert!(dot.contains("r0 -> 0 [style=dotted, arrowhead=odot];"));
        assert!(dot.contains("r1 -> 0 [style=solid];"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let aig = Aig::new(2, 0);
        let f = aig.apply_or(aig.input(0), aig.input(1));

        let config = DotConfig {
            use_html_labels: false,
            ..DotConfig::default()
        };
        let dot = aig.to_dot_with_config(&[f], &config).unwrap();
        assert!(dot.contains("\"x1\""));
        assert!(!dot.contains("<SUB>"));
    }

    #[test]
    #[ignore]
    fn test_write_dot_file() {
        let aig = Aig::new(2, 0);
        let f = aig.apply_xor(aig.input(0), aig.input(1));
        let dot = aig.to_dot(&[f]).unwrap();
        std::fs::write("test_output.dot", &dot).unwrap();
        println!("DOT output:\n{}", dot);
    }
}
