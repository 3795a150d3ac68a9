//! # reactivities-store
//!
//! Client-side cache of activities kept in sync with the backend.
//!
//! [`ActivityStore`] is the only writer of its [`EntityRegistry`]. Observers
//! read immutable copies (flags, selection, [`views::group_by_date`]) and
//! subscribe to [`StoreEvent`]s to learn when to read again. Network access
//! goes through an injected [`RemoteServiceClient`].

pub mod events;
pub mod registry;
pub mod remote;
pub mod store;
pub mod views;

mod error;

#[cfg(test)]
mod test_support;

pub use error::StoreError;
pub use events::{Operation, StoreEvent};
pub use registry::EntityRegistry;
pub use remote::RemoteServiceClient;
pub use store::{ActivityStore, StatusFlags, StoreSnapshot};
pub use views::{group_by_date, sorted_by_date, DateBucket};
