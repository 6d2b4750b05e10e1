pub mod classify;
pub mod dom;
pub mod emitter;
pub mod export;
pub mod gradient;
pub mod id;
pub mod mutate;
pub mod parser;
pub mod resolver;
pub mod selector;
pub mod tree;

pub use dom::{Attr, Element, SvgDocument, XmlNode};
pub use emitter::emit_document;
pub use gradient::{GradientConfig, GradientKind, apply_gradient};
pub use id::NodeId;
pub use mutate::{EditError, PaintProperty, apply_color, apply_stroke_width};
pub use parser::{ParseError, parse_document};
pub use selector::{MARKER_ATTR, Selector};
pub use tree::{TreeNode, build_tree, toggle_expanded};

// Re-export petgraph's index type so downstream crates don't need a direct
// dependency for plain tree navigation.
pub use petgraph::graph::NodeIndex;
