//! # Catalog Synchronization
//!
//! Keeps the Content Cache in step with the remote backend and the local
//! snapshot.
//!
//! ## Components
//!
//! - **Local Persistence Adapter** (`local_store`): the whole catalog under one storage key
//! - **Merge** (`merge`): fills remote gaps from the local snapshot
//! - **Synchronizer** (`synchronizer`): one refresh pass over remote or local data
//! - **Change Notifier** (`notifier`): polling plus optional push, announcing real changes only
//! - **Mutation API** (`mutation`): add, update and delete with remote-first semantics

pub mod error;
pub mod local_store;
pub mod merge;
pub mod mutation;
pub mod notifier;
pub mod synchronizer;

pub use error::{Result, SyncError};
pub use local_store::LocalSnapshotStore;
pub use merge::merge_with_local;
pub use mutation::CatalogMutations;
pub use notifier::{ChangeNotifier, NotifierState, CONTENT_RESOURCE, PUSH_RESUBSCRIBE_DELAY};
pub use synchronizer::{RefreshOutcome, Synchronizer};
