use std::time::Duration;

use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{bson::doc, Client, Collection, IndexModel};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StoreConfig;

pub mod models;
mod users;

pub use models::{default_list, Item, TodoList, User};

/// Errors from the document store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

/// Handle to the document store, constructed once at startup and injected
/// into the router state. Clones share the underlying connection pool.
#[derive(Clone)]
pub struct Store {
    client: Client,
    users: Collection<User>,
}

impl Store {
    /// Build the client and resolve the `users` collection. The driver
    /// connects lazily, so this succeeds even when the store is down; a
    /// bounded server-selection timeout keeps later operations from hanging.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.url).await?;
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));

        let client = Client::with_options(options)?;
        let users = client.database(&config.database).collection::<User>("users");

        Ok(Self { client, users })
    }

    /// Ping the store. Used by `/health` and the startup probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    /// Create the unique partial indexes that back duplicate-username
    /// detection and find-or-create idempotency. Safe to call repeatedly.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        use mongodb::options::IndexOptions;

        for field in ["username", "google_id"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { field: { "$exists": true } })
                        .build(),
                )
                .build();
            self.users.create_index(index).await?;
        }
        Ok(())
    }

    /// Startup probe: log store reachability and ensure indexes, but never
    /// abort the process over it. Requests reconnect lazily.
    pub async fn startup_probe(&self) {
        match self.ping().await {
            Ok(()) => {
                info!("document store reachable");
                if let Err(e) = self.ensure_indexes().await {
                    warn!("could not ensure store indexes: {e}");
                }
            }
            Err(e) => warn!("document store unreachable at startup: {e}"),
        }
    }

    /// Close the connection pool. Part of graceful shutdown.
    pub async fn close(self) {
        self.client.shutdown().await;
        info!("document store connection closed");
    }

    pub(crate) fn users(&self) -> &Collection<User> {
        &self.users
    }
}

/// Whether a driver error is a unique-index violation (E11000).
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

pub(crate) fn map_write_error(err: mongodb::error::Error, key: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::DuplicateKey(key.to_string())
    } else {
        StoreError::Driver(err)
    }
}
