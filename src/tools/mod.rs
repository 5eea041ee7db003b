//! External tool invocation (node, pytest, Playwright).

pub mod subprocess;

pub use subprocess::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner, run_tool, tail_chars};

#[cfg(test)]
pub use subprocess::MockToolRunner;
