use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use uuid::Uuid;

use super::{map_write_error, Item, Store, StoreError, TodoList, User};

impl Store {
    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(by_id(id)).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "username": username }).await?)
    }

    /// Insert a freshly registered user. A unique-index violation on the
    /// username surfaces as `DuplicateKey` so the caller can report the
    /// registration conflict.
    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users()
            .insert_one(user)
            .await
            .map_err(|e| map_write_error(e, "username"))?;
        Ok(())
    }

    /// Resolve a federated identity to its user, creating the user on first
    /// sign-in. A single upsert keeps this idempotent; if a concurrent
    /// identical upsert wins the race, the unique index rejects ours and the
    /// retry finds the winner.
    pub async fn find_or_create_google(&self, google_id: &str) -> Result<User, StoreError> {
        for _ in 0..2 {
            let result = self
                .users()
                .find_one_and_update(
                    doc! { "google_id": google_id },
                    doc! { "$setOnInsert": new_google_user(google_id) },
                )
                .upsert(true)
                .return_document(ReturnDocument::After)
                .await;

            match result {
                Ok(Some(user)) => return Ok(user),
                Ok(None) => break,
                Err(e) if super::is_duplicate_key(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::NotFound(format!(
            "user for federated id {google_id}"
        )))
    }

    /// Atomic set-if-absent seeding of the user's list. A user whose list
    /// already exists is left untouched, so the seed happens at most once
    /// even under concurrent first views.
    pub async fn init_list_if_absent(&self, id: Uuid, list: &TodoList) -> Result<(), StoreError> {
        self.users()
            .update_one(seed_filter(id), seed_update(list)?)
            .await?;
        Ok(())
    }

    /// Set-semantics append to the user's list items.
    pub async fn push_item(&self, id: Uuid, item: &Item) -> Result<(), StoreError> {
        self.users()
            .update_one(by_id(id), add_item_update(item)?)
            .await?;
        Ok(())
    }

    /// Remove the item with the given id. Removing a missing id matches
    /// nothing and is not an error.
    pub async fn pull_item(&self, id: Uuid, item_id: Uuid) -> Result<(), StoreError> {
        self.users()
            .update_one(by_id(id), pull_item_update(item_id))
            .await?;
        Ok(())
    }

    /// Wholesale overwrite of the user's secret.
    pub async fn set_secret(&self, id: Uuid, secret: &str) -> Result<(), StoreError> {
        self.users()
            .update_one(by_id(id), doc! { "$set": { "secret": secret } })
            .await?;
        Ok(())
    }

    /// All users that have submitted a secret, for the public wall.
    pub async fn users_with_secrets(&self) -> Result<Vec<User>, StoreError> {
        let cursor = self
            .users()
            .find(doc! { "secret": { "$exists": true, "$ne": null } })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": mongodb::bson::Uuid::from_uuid_1(id) }
}

fn new_google_user(google_id: &str) -> Document {
    doc! {
        "_id": mongodb::bson::Uuid::from_uuid_1(Uuid::new_v4()),
        "google_id": google_id,
        "created_at": mongodb::bson::DateTime::now(),
    }
}

fn seed_filter(id: Uuid) -> Document {
    doc! {
        "_id": mongodb::bson::Uuid::from_uuid_1(id),
        "list": { "$exists": false },
    }
}

fn seed_update(list: &TodoList) -> Result<Document, StoreError> {
    Ok(doc! { "$set": { "list": mongodb::bson::to_bson(list)? } })
}

fn add_item_update(item: &Item) -> Result<Document, StoreError> {
    Ok(doc! { "$addToSet": { "list.items": mongodb::bson::to_bson(item)? } })
}

fn pull_item_update(item_id: Uuid) -> Document {
    doc! { "$pull": { "list.items": { "id": mongodb::bson::Uuid::from_uuid_1(item_id) } } }
}
