//! # crm-ref
//!
//! Reference data and runnable scenarios for the sales CRM authorization
//! core.
//!
//! 1. **Sales Representative** — deny-by-default around a narrow grant.
//! 2. **Role Administration** — the management gate, custom subjects, the
//!    permission matrix, and persistence through the catalog store.
//! 3. **Legacy Payload Ingestion** — normalization of the old single-action
//!    permission shape.
//!
//! All data is hardcoded and fictional. Storage is in-memory.

pub mod mock_data;
pub mod scenarios;
