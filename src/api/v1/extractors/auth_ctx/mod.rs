/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the verified token (AuthCtx) to handlers behind the permission gate
 * - axum-specific code lives in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
