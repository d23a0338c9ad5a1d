//! Anchors machine-generated code suggestions to an externally rendered
//! diff view. Parses the unified diff into exact new-file line ranges,
//! validates each suggestion's coordinate, then resolves an anchor node in
//! the render target through a cascade of matching tiers that fails loudly
//! rather than ever attaching to the wrong line.

pub mod config;
pub mod diff;
pub mod error;
pub mod inject;
pub mod render;
pub mod resolve;
pub mod suggest;
pub mod target;
pub mod watch;

pub use config::DpConfig;
pub use diff::DiffIndex;
pub use error::{ItemError, ParseError};
pub use inject::{inject_code_suggestions, InjectionOutcome};
pub use resolve::{Confidence, Placement};
pub use suggest::Suggestion;
pub use target::{Fragment, NodeId, RenderTarget, TreeTarget};
