//! Audit trail of permission decisions.
//!
//! This module provides:
//! - `PermissionAuditEvent`: what was asked, by which origin, and the outcome
//! - `AuditOutcome`: how the request ended
//! - `AuditTrail`: thread-safe in-memory recorder
//!
//! Events only carry the redacted origin (scheme, host, port). Paths and
//! query strings never reach the audit log.

mod event;
mod trail;

pub use event::{AuditOutcome, PermissionAuditEvent};
pub use trail::AuditTrail;
