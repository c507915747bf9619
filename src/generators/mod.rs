pub mod markdown_docs;
pub mod mermaid_erd;

pub use markdown_docs::*;
pub use mermaid_erd::*;
