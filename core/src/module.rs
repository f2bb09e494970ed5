//! A registered resource: state container plus the five CRUD actions.
//!
//! # Design
//! Every action follows the same chain: build the request, hand it to the
//! transport, parse the response, then commit exactly one mutation. Success
//! commits the matching mutation and returns the raw response; any failure
//! along the way commits `Mutation::Error` and returns the raw error.
//!
//! Actions take `&self`, so several can be in flight at once on a shared
//! module. Each commits when its own call settles; the lock around the state
//! is only taken inside `commit` and is never held across an await.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::state::{Mutation, ResourceState, StoredError};
use crate::types::{Item, Params};

/// An action invocation, for hosts that dispatch by value.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    GetAll { params: Params },
    Get { id: Value, params: Params },
    Create(Item),
    Update(Item),
    Destroy(Item),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::GetAll { .. } => "get_all",
            Action::Get { .. } => "get",
            Action::Create(_) => "create",
            Action::Update(_) => "update",
            Action::Destroy(_) => "destroy",
        }
    }
}

/// State and actions for one resource, bound to a client and transport.
#[derive(Debug)]
pub struct ResourceModule<T> {
    client: ResourceClient,
    transport: T,
    state: Mutex<ResourceState>,
}

impl<T: Transport> ResourceModule<T> {
    pub fn new(client: ResourceClient, transport: T) -> Self {
        Self {
            client,
            transport,
            state: Mutex::new(ResourceState::new()),
        }
    }

    /// The resource name, which is also the module's namespace.
    pub fn name(&self) -> &str {
        self.client.resource()
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ResourceState {
        self.lock().clone()
    }

    /// Read the state in place without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ResourceState) -> R) -> R {
        f(&self.lock())
    }

    /// Apply a mutation directly.
    pub fn commit(&self, mutation: Mutation) {
        debug!(resource = %self.name(), mutation = %mutation.kind(), "commit");
        self.lock().commit(mutation);
    }

    /// Fetch the collection and replace `all` with it.
    pub async fn get_all(&self, params: &Params) -> Result<HttpResponse, ApiError> {
        let request = self.client.build_get_all(params);
        self.settle("get_all", request, |client, response| {
            client.parse_list(response).map(Mutation::All)
        })
        .await
    }

    /// Fetch one item, make it `current` and refresh its entry in `all`.
    pub async fn get(&self, id: &Value, params: &Params) -> Result<HttpResponse, ApiError> {
        let request = self.client.build_get(id, params);
        self.settle("get", request, |client, response| {
            client.parse_item(response).map(Mutation::Get)
        })
        .await
    }

    /// Create an item and add the server's version of it to `all`.
    pub async fn create(&self, item: Item) -> Result<HttpResponse, ApiError> {
        let request = self.client.build_create(&item);
        self.settle("create", request, |client, response| {
            client.parse_item(response).map(Mutation::Create)
        })
        .await
    }

    /// Update an item and refresh its entry in `all`.
    pub async fn update(&self, item: Item) -> Result<HttpResponse, ApiError> {
        let request = self.client.build_update(&item);
        self.settle("update", request, |client, response| {
            client.parse_item(response).map(Mutation::Update)
        })
        .await
    }

    /// Delete an item and drop it from `all`.
    ///
    /// The response body is ignored; the item passed in is what gets removed.
    pub async fn destroy(&self, item: Item) -> Result<HttpResponse, ApiError> {
        let request = self.client.build_destroy(&item);
        self.settle("destroy", request, move |client, response| {
            client.parse_empty(response).map(|()| Mutation::Destroy(item))
        })
        .await
    }

    pub async fn dispatch(&self, action: Action) -> Result<HttpResponse, ApiError> {
        match action {
            Action::GetAll { params } => self.get_all(&params).await,
            Action::Get { id, params } => self.get(&id, &params).await,
            Action::Create(item) => self.create(item).await,
            Action::Update(item) => self.update(item).await,
            Action::Destroy(item) => self.destroy(item).await,
        }
    }

    async fn settle<F>(
        &self,
        action: &'static str,
        request: Result<HttpRequest, ApiError>,
        into_mutation: F,
    ) -> Result<HttpResponse, ApiError>
    where
        F: FnOnce(&ResourceClient, &HttpResponse) -> Result<Mutation, ApiError>,
    {
        let outcome = match request {
            Ok(request) => {
                debug!(
                    resource = %self.name(),
                    action,
                    method = request.method.as_str(),
                    path = %request.path,
                    "sending request"
                );
                match self.transport.execute(request).await {
                    Ok(response) => into_mutation(&self.client, &response).map(|m| (response, m)),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok((response, mutation)) => {
                self.commit(mutation);
                Ok(response)
            }
            Err(err) => {
                warn!(resource = %self.name(), action, error = %err, "action failed");
                self.commit(Mutation::Error(StoredError::from(err.clone())));
                Err(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
