//! Client-side coordination layer for the Union Hub app shells.
//!
//! The native/web shells own rendering and transport; this crate owns the
//! state that has to be correct regardless of the shell: the session-scoped
//! application context, union selection on load, and the optimistic chat
//! timeline that reconciles local echoes against server records.

pub mod context;
pub mod error;
pub mod resolver;
pub mod timeline;

pub use context::{AppContext, Identity, Surface, UnionId};
pub use error::ClientError;
pub use resolver::{
    MembershipDirectory, MembershipResolver, Navigation, PreferenceStore, ResolveOutcome,
    SwitchEffect, UnionSummary,
};
pub use timeline::{ChatEntry, ChatTimeline, DeliveryState, EntryId, OutboundDraft, ServerMessage};
