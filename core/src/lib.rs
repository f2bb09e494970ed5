//! Client-side state modules bound to Rails-style JSON resources.
//!
//! # Overview
//! For a resource such as `posts`, a `ResourceModule` mirrors the server's
//! collection (`all`), the most recently touched item (`current`) and the last
//! failure (`error`), and keeps them in sync through five actions:
//! `get_all`, `get`, `create`, `update` and `destroy`. Each action issues one
//! request against `/posts.json` or `/posts/<id>.json` and then commits one
//! `Mutation` to the state.
//!
//! # Design
//! - `ResourceClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network; a `Transport` does the I/O.
//! - Every request carries an `X-CSRF-TOKEN` header taken from a
//!   `TokenProvider` at send time.
//! - Mutations are an enum applied by `ResourceState::commit`.
//! - Modules live in a host-owned `Store`; `resource_plugin` registers one.
//!
//! ```rust,ignore
//! use resource_store::{resource_plugin, ResourceClient, StaticToken, Store, UreqTransport};
//!
//! let client = ResourceClient::new("http://localhost:3000", "posts", StaticToken::new(token));
//! let mut store = Store::new();
//! let posts = resource_plugin(client, UreqTransport::new())(&mut store);
//! posts.get_all(&Default::default()).await?;
//! println!("{} posts", posts.state().all.len());
//! ```

pub mod client;
pub mod csrf;
pub mod error;
pub mod http;
pub mod module;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use client::ResourceClient;
pub use csrf::{StaticToken, TokenProvider, CSRF_HEADER};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use module::{Action, ResourceModule};
pub use state::{replace_or_remove, Mutation, MutationKind, ResourceState, StoredError};
pub use store::{resource_plugin, ModuleRegistry, Store};
pub use transport::UreqTransport;
pub use types::{Item, Params};
