//! State container for the promo engine.
//!
//! `promo-core` is a pure-function core; this crate is the thin store that
//! every screen talks to instead of re-implementing discount arithmetic:
//!
//! - **Registry**: holds the latest catalog and flash-sale snapshots,
//!   applying fetch completions in issue order so a slow, superseded fetch
//!   can never overwrite fresher data.
//! - **Session**: owns the cart for one client session, wiring snapshots
//!   through price resolution and stock gating, with JSON persistence and
//!   cross-tab merge.
//!
//! Network I/O stays outside: callers fetch, then hand results to
//! [`SnapshotRegistry::apply_catalog`] / [`SnapshotRegistry::apply_flash`]
//! tagged with the sequence they were issued under.

pub mod registry;
pub mod session;

pub use registry::{CampaignFeed, EntryFeed, FetchSeq, ProductFeed, SnapshotRegistry, VariantFeed};
pub use session::CartSession;
