use std::io;
use thiserror::Error;

/// Failures raised while structuring a control flow graph.
///
/// Malformed graphs abort the whole analysis: no partial set of primitives is
/// ever returned alongside one of these errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The graph contains a shape the structuring passes cannot classify.
    #[error("unsupported control flow shape in `{graph}` at node `{node}`: {reason}")]
    UnsupportedShape {
        /// Name of the analyzed graph.
        graph: String,
        /// DOT ID of the offending node.
        node: String,
        /// Short description of the rejected shape.
        reason: String,
    },
    /// Two intervals produced the same name while assembling the record.
    #[error("interval `{name}` recorded twice")]
    DuplicateInterval { name: String },
    /// The derived sequence failed to stabilise within the safety bound.
    #[error("derived sequence of `{graph}` did not stabilise within {bound} graphs")]
    NonTerminating { graph: String, bound: usize },
}

/// Failures raised while reading a Graphviz `.dot` control flow graph.
#[derive(Debug, Error)]
pub enum DotParseError {
    /// The input does not start with a `digraph` header.
    #[error("the input is not a digraph")]
    NotADigraph,
    /// A line could not be parsed as a node or edge statement.
    #[error("line {line}: not a valid graph statement")]
    Syntax { line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}
