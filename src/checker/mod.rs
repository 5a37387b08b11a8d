// src/checker/mod.rs
// =============================================================================
// This module contains all link health checking logic.
//
// Submodules:
// - result:  UrlStatus and UrlCheckResult, the per-URL outcome
// - link:    the per-URL state machine (syntax, DNS, HTTP, retry/backoff)
// - http:    HEAD/GET probing, manual redirect following, status table
// - resolve: the pluggable DNS resolution step
// - limiter: the token bucket shared by every worker
// - pool:    LinkChecker, the bounded worker pool over distinct URLs
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of the crate can use.
// =============================================================================

mod http;
mod limiter;
mod link;
mod pool;
mod resolve;
mod result;

// Re-export public items from submodules
// This lets users write `checker::LinkChecker` instead of
// `checker::pool::LinkChecker`
pub use limiter::RateLimiter;
pub use pool::{LinkChecker, LinkReport};
pub use resolve::{ResolveError, Resolver, SystemResolver};
pub use result::{UrlCheckResult, UrlStatus};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is mod.rs?
//    - When you have a directory as a module (like src/checker/), the
//      mod.rs file inside it is the module root
//
// 2. Why use 'pub use'?
//    - It re-exports items from submodules
//    - Callers don't need to know about our internal organization
//
// 3. Module privacy:
//    - `http` and `link` stay private; only the pool and the types it
//      returns are part of the API
// -----------------------------------------------------------------------------
