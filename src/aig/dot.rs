//! You can export AIGs to the Graphviz dot format using [`Aig::to_dot`].
//!
//! ```rust
//! use aigman::Aig;
//! use aigman::dot::GraphvizStyle;
//!
//! let mut aig = Aig::new();
//! let a = aig.create_ci();
//! let b = aig.create_ci();
//! let s = aig.xor(a, b);
//! let c = aig.and(a, b);
//! aig.create_co(s);
//! aig.create_co(!c);
//! println!("{}", aig.to_dot(GraphvizStyle::default()));
//! ```
//!
//! You can then render the graphs using the DOT engine. Choices (see
//! [`Aig::mark_valid_choices`]) are drawn with dashed edges from each node to the next
//! alternative of its class.

use std::{fmt::Display, ops::Add};

use crate::{Aig, AigEdge, AigNode, NodeId, NodeKind, dfs::Dfs};

// Definining default global style.
const DEFAULT_RANKDIR: &str = "BT";

// Defining default style for nodes.
const DEFAULT_CONST_NODE_FORMAT: &str = "[shape=point, label=\"VDD\", width=1.5]";
const DEFAULT_INPUT_NODE_FORMAT: &str = "[shape=box]";
const DEFAULT_AND_NODE_FORMAT: &str = "[shape=circle]";
const DEFAULT_XOR_NODE_FORMAT: &str = "[shape=circle, label=\"⊕\"]";
const DEFAULT_BUF_NODE_FORMAT: &str = "[shape=triangle, label=\"\"]";
/// See https://stackoverflow.com/questions/50822798/how-to-use-graphviz-to-draw-a-node-pointed-by-an-arrow.
const DEFAULT_OUTPUT_NODE_FORMAT: &str = "[shape=none, height=.0, width=.0]";

// Defining default style for edges.
const DEFAULT_EDGE_ALL_FORMAT: &str = "[arrowsize=0.3]";
const DEFAULT_EDGE_COMPLEMENT_FORMAT: &str = "[headlabel=\"●\", labelangle=.0, labeldistance=1.5]";
const DEFAULT_EDGE_OUTPUT_FORMAT: &str = "[arrowhead=none]";
const DEFAULT_EDGE_CHOICE_FORMAT: &str = "[style=\"dashed\", constraint=false]";

/// String containing the graphviz node style (you must manually include square brackets).
///
/// See [`GraphvizStyle`] for what kind of nodes can be described.
#[derive(Debug, Clone)]
pub struct GraphvizNodeStyle(String);

impl Display for GraphvizNodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String containing the graphviz edge style (you must manually include square brackets).
///
/// See [`GraphvizStyle`] for what kind of edges can be described.
#[derive(Debug, Clone, Default)]
pub struct GraphvizEdgeStyle(String);

impl Display for GraphvizEdgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for GraphvizEdgeStyle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        GraphvizEdgeStyle(format!("{}{}", self.0, rhs.0))
    }
}

/// Parameters for Graphviz rendering.
///
/// ### Global parameters
/// - `rankdir`
///
/// ### Nodes
/// Every [`NodeKind`] can be rendered using its own [`GraphvizNodeStyle`]. By default outputs are
/// invisible nodes, just to get an arrow.
///
/// ### Edges
/// Edge styles are additive. All edges implement the `edge_all` style. To that can be added:
/// - `edge_complement` if the edge is complemented
/// - `edge_output` if the edge is directed to an output.
///
/// Choice links use the `edge_choice` style.
#[derive(Debug, Clone)]
pub struct GraphvizStyle {
    // Global
    pub rankdir: String,

    // Nodes
    pub cst: GraphvizNodeStyle,
    pub input: GraphvizNodeStyle,
    pub and: GraphvizNodeStyle,
    pub xor: GraphvizNodeStyle,
    pub buf: GraphvizNodeStyle,
    pub output: GraphvizNodeStyle,

    // Edges
    pub edge_all: GraphvizEdgeStyle,
    pub edge_complement: GraphvizEdgeStyle,
    pub edge_output: GraphvizEdgeStyle,
    pub edge_choice: GraphvizEdgeStyle,
}

impl Default for GraphvizStyle {
    fn default() -> Self {
        GraphvizStyle {
            rankdir: DEFAULT_RANKDIR.to_string(),

            cst: GraphvizNodeStyle(DEFAULT_CONST_NODE_FORMAT.to_string()),
            input: GraphvizNodeStyle(DEFAULT_INPUT_NODE_FORMAT.to_string()),
            and: GraphvizNodeStyle(DEFAULT_AND_NODE_FORMAT.to_string()),
            xor: GraphvizNodeStyle(DEFAULT_XOR_NODE_FORMAT.to_string()),
            buf: GraphvizNodeStyle(DEFAULT_BUF_NODE_FORMAT.to_string()),
            output: GraphvizNodeStyle(DEFAULT_OUTPUT_NODE_FORMAT.to_string()),

            edge_all: GraphvizEdgeStyle(DEFAULT_EDGE_ALL_FORMAT.to_string()),
            edge_complement: GraphvizEdgeStyle(DEFAULT_EDGE_COMPLEMENT_FORMAT.to_string()),
            edge_output: GraphvizEdgeStyle(DEFAULT_EDGE_OUTPUT_FORMAT.to_string()),
            edge_choice: GraphvizEdgeStyle(DEFAULT_EDGE_CHOICE_FORMAT.to_string()),
        }
    }
}

fn get_graphviz_id(id: NodeId) -> String {
    format!("n{}", id)
}

impl AigNode {
    fn graphviz_decl(&self) -> String {
        let label = match self.kind {
            NodeKind::Ci => format!("i{}", self.id),
            NodeKind::Co => format!("o{}", self.id),
            NodeKind::And => "".to_string(),
            // Style gives the label
            NodeKind::Const1 | NodeKind::Xor | NodeKind::Buf => {
                return format!("{}\n", get_graphviz_id(self.id));
            }
        };
        format!("{} [label=\"{}\"]\n", get_graphviz_id(self.id), label)
    }
}

impl AigEdge {
    fn graphviz_decl(&self, to: NodeId, to_output: bool, graphviz_style: &GraphvizStyle) -> String {
        let mut style = GraphvizEdgeStyle::default();
        if self.complement {
            style = style + graphviz_style.edge_complement.clone();
        }
        if to_output {
            style = style + graphviz_style.edge_output.clone();
        }
        format!(
            "{} -> {} {}\n",
            get_graphviz_id(self.node),
            get_graphviz_id(to),
            style
        )
    }
}

impl Aig {
    /// Returns a DOT representation of the AIG: the cones of the outputs, and of the choices.
    pub fn to_dot(&self, graphviz_style: GraphvizStyle) -> String {
        let mut decl_edges = String::new();

        // Creating different subgraphs for node declarations
        let mut decl_const_optional = "".to_string();
        let mut decl_inputs = format!("subgraph inputs {{\n node {}\n", graphviz_style.input);
        let mut decl_outputs = format!("subgraph outputs {{\n node {}\n", graphviz_style.output);
        let mut decl_ands = format!("subgraph ands {{\n node {}\n", graphviz_style.and);
        let mut decl_xors = format!("subgraph xors {{\n node {}\n", graphviz_style.xor);
        let mut decl_bufs = format!("subgraph bufs {{\n node {}\n", graphviz_style.buf);

        // Choices are dangling, they need their own starting points
        let mut starts = self.get_cos().to_vec();
        starts.extend((0..self.equivs.len()).filter_map(|id| self.equiv(id)));

        let mut dfs = Dfs::from_nodes(&starts);
        while let Some(id) = dfs.next(self) {
            let node = self.node(id);
            let decl = node.graphviz_decl();
            match node.kind {
                NodeKind::Const1 => decl_const_optional.push_str(&format!(
                    "{} {}\n",
                    get_graphviz_id(id),
                    graphviz_style.cst
                )),
                NodeKind::Ci => decl_inputs.push_str(&decl),
                NodeKind::Co => decl_outputs.push_str(&decl),
                NodeKind::And => decl_ands.push_str(&decl),
                NodeKind::Xor => decl_xors.push_str(&decl),
                NodeKind::Buf => decl_bufs.push_str(&decl),
            }
            for fanin in node.get_fanins() {
                decl_edges.push_str(&fanin.graphviz_decl(id, node.is_co(), &graphviz_style));
            }
            if let Some(next) = self.equiv(id) {
                decl_edges.push_str(&format!(
                    "{} -> {} {}\n",
                    get_graphviz_id(id),
                    get_graphviz_id(next),
                    graphviz_style.edge_choice
                ));
            }
        }

        // Concatenating everything together
        format!(
            "
strict digraph {{
    rankdir=\"{}\"
    edge {}
    {}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
}}",
            graphviz_style.rankdir,
            graphviz_style.edge_all,
            decl_const_optional,
            decl_inputs,
            decl_ands,
            decl_xors,
            decl_bufs,
            decl_outputs,
            decl_edges
        )
    }
}
