mod cfg;
pub use self::cfg::{Cfg, LoopType, Node, NodeArena, NodeId};
mod error;
pub use self::error::{AnalysisError, DotParseError};
mod graph;
pub use self::graph::{DomTree, Graph};
mod interval;
pub use self::interval::{intervals, Interval};
mod derived;
pub use self::derived::derived_sequence;
mod primitive;
pub use self::primitive::{If, Loop, Primitives, Switch};
mod structure;
pub use self::structure::analyze;
