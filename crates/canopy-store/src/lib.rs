//! Canopy Store
//!
//! A single shared state tree partitioned into named slices. The host builds the
//! store once with its own static slices; micro-apps add their slices later via
//! [`Store::register_slice`], which is add-if-absent: a name is registered at
//! most once and a second registration keeps the first reducer and its state.
//!
//! ```text
//! Store
//! ├── static slices   (router, session, ...)   fixed at build time
//! ├── dynamic slices  (authorize, users, ...)  grow at run time
//! ├── root reducer    rebuilt on every new slice
//! └── state           { "<slice>": <json>, ... } published through a watch channel
//! ```

mod action;
mod handle;
mod reducer;
mod store;

pub use action::Action;
pub use handle::{Dispatcher, Registration, RegistrationHandle};
pub use reducer::{FnReducer, Reducer, SharedReducer, reducer_fn};
pub use store::{Store, StoreBuilder};
