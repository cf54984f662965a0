//! Semantic rewrite passes from annotated UnityScript trees to C#-shaped trees.

pub mod context;
pub mod error;
pub mod fold;
pub mod known_api;
pub mod passes;

pub use context::PassContext;
pub use known_api::{KnownApi, KnownApiTable};
pub use passes::{run_passes, standard_passes, RewritePass};
