//! The rewrite passes, in the order they run.

mod coercion;
mod constructors;
mod escaping;
mod known_api;
mod lambda;
mod static_access;
mod sugar;
mod value_chain;

pub use coercion::CoercionPass;
pub use constructors::{guard_field_name, ConstructorPass};
pub use escaping::EscapingPass;
pub use known_api::KnownApiPass;
pub use lambda::LambdaPass;
pub use static_access::StaticAccessPass;
pub use sugar::SugarPass;
pub use value_chain::ValueChainPass;

use crate::context::PassContext;
use tracing::debug;
use us2cs_core::ast::SourceUnit;
use us2cs_core::Result;

/// A total tree-to-tree transform over one source unit.
pub trait RewritePass: Send + Sync {
    fn name(&self) -> &'static str;
    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit>;
}

/// The fixed pass sequence; each pass relies on the invariants of the ones before it.
pub fn standard_passes() -> Vec<Box<dyn RewritePass>> {
    vec![
        Box::new(SugarPass),
        Box::new(StaticAccessPass),
        Box::new(CoercionPass),
        Box::new(ValueChainPass),
        Box::new(KnownApiPass),
        Box::new(LambdaPass),
        Box::new(ConstructorPass),
        Box::new(EscapingPass),
    ]
}

/// Runs `passes` in order, stopping at the first failure.
pub fn run_passes(
    passes: &[Box<dyn RewritePass>],
    mut unit: SourceUnit,
    ctx: &PassContext,
) -> Result<SourceUnit> {
    for pass in passes {
        debug!(pass = pass.name(), file = %unit.file_name, "running rewrite pass");
        unit = pass.rewrite_unit(unit, ctx)?;
    }
    Ok(unit)
}
