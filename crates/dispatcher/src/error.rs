//! Re-exports the shared error boundary every stratum maps onto. The
//! dispatcher has no error variants of its own: [`StratumErrorKind`] already
//! covers everything that can cross the trait-object boundary (spec.md §7).

pub use core_types::StratumErrorKind;
