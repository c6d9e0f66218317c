/// Syntax analysis: arena tree, pattern matcher, and context extraction.
pub mod context;
pub mod matcher;
pub mod tree;
