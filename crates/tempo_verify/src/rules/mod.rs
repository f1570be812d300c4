//! Builtin structural rules.

mod async_needs_reset;
mod single_use_port;

pub use async_needs_reset::AsyncNeedsReset;
pub use single_use_port::SingleUsePort;

use crate::engine::Verifier;

/// Registers all builtin rules with the verifier.
pub fn register_builtin_rules(verifier: &mut Verifier) {
    verifier.register(Box::new(SingleUsePort));
    verifier.register(Box::new(AsyncNeedsReset));
}
