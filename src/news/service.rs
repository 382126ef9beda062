use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{CleanupOutcome, DeleteError, Result, SubmitError};
use crate::news::{
    image_path, NewsItem, NewsSubmission, StoredNews, SubmitTarget, NEWS_COLLECTION,
};
use crate::storage::{to_record, Document, DocumentStore, ObjectStore, Record};

/// Create, update, delete and list news with their images.
#[derive(Clone)]
pub struct NewsService {
    documents: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    collection: String,
}

impl NewsService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            objects,
            clock,
            collection: NEWS_COLLECTION.to_string(),
        }
    }

    pub fn with_collection<C: Into<String>>(mut self, collection: C) -> Self {
        self.collection = collection.into();
        self
    }

    /// Upload the image, then write the document that references it.
    ///
    /// The document is never written unless the upload succeeded. When the
    /// write fails the uploaded image is deleted again; the outcome of that
    /// cleanup is reported inside [`SubmitError::Persist`] but never replaces
    /// the write failure.
    pub async fn submit(&self, submission: &NewsSubmission) -> std::result::Result<(), SubmitError> {
        let image = submission.validate()?;
        let path = image_path(&submission.location, &image.file_name);

        debug!("Uploading {} bytes to {}", image.bytes.len(), path);
        if let Err(source) = self.objects.upload(&path, image).await {
            warn!("Image upload to {} failed: {}", path, source);
            return Err(SubmitError::Upload { path, source });
        }

        let image_url = match self.objects.url(&path).await {
            Ok(url) => url,
            Err(source) => {
                warn!("Could not resolve URL for {}: {}", path, source);
                self.remove_image(&path).await;
                return Err(SubmitError::Upload { path, source });
            }
        };

        let item = NewsItem {
            location: submission.location.clone(),
            title: submission.title.clone(),
            image_url,
            image_path: Some(path.clone()),
            content: submission.content.clone(),
            author_id: submission.author.id.clone(),
            author_name: submission.author.name.clone(),
            created_date: self.clock.today(),
        };

        let written = match to_record(&item) {
            Ok(record) => self.write(&submission.target, record).await,
            Err(e) => Err(e),
        };

        if let Err(source) = written {
            warn!("Saving news '{}' failed: {}", item.title, source);
            let cleanup = self.remove_image(&path).await;
            return Err(SubmitError::Persist {
                path,
                cleanup,
                source,
            });
        }

        info!("Saved news '{}' for {}", item.title, item.location);
        Ok(())
    }

    async fn write(&self, target: &SubmitTarget, record: Record) -> Result<()> {
        match target {
            SubmitTarget::Create => {
                let id = self.documents.create_document(&self.collection, record).await?;
                debug!("Created news document {}", id);
                Ok(())
            }
            SubmitTarget::Update(id) => {
                self.documents
                    .update_document(&self.collection, id, record)
                    .await
            }
        }
    }

    /// Best-effort image delete; failures are logged and reported, never raised.
    async fn remove_image(&self, path: &str) -> CleanupOutcome {
        match self.objects.delete(path).await {
            Ok(()) => {
                debug!("Removed image {}", path);
                CleanupOutcome::Removed
            }
            Err(e) => {
                warn!("Failed to remove image {}: {}", path, e);
                CleanupOutcome::Failed(e.to_string())
            }
        }
    }

    /// Delete a news document and its image. Deleting a missing id is a no-op.
    pub async fn delete(&self, id: &str) -> std::result::Result<(), DeleteError> {
        let wrap = |source| DeleteError {
            id: id.to_string(),
            source,
        };

        let Some(doc) = self
            .documents
            .get_document(&self.collection, id)
            .await
            .map_err(wrap)?
        else {
            debug!("News {} does not exist, nothing to delete", id);
            return Ok(());
        };

        self.documents
            .delete_document(&self.collection, id)
            .await
            .map_err(wrap)?;
        info!("Deleted news {}", id);

        if let Some(path) = doc.get_str("imagePath").filter(|p| !p.is_empty()) {
            self.remove_image(path).await;
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<StoredNews>> {
        match self.documents.get_document(&self.collection, id).await? {
            Some(doc) => Ok(Some(StoredNews {
                item: doc.decode()?,
                id: doc.id,
            })),
            None => Ok(None),
        }
    }

    pub async fn news_by_user(&self, user_id: &str) -> Result<Vec<StoredNews>> {
        self.query("userid", user_id).await
    }

    pub async fn news_by_location(&self, location: &str) -> Result<Vec<StoredNews>> {
        self.query("location", location).await
    }

    async fn query(&self, field: &str, value: &str) -> Result<Vec<StoredNews>> {
        let docs = self
            .documents
            .query_equals(&self.collection, field, &Value::String(value.to_string()))
            .await?;

        Ok(docs.into_iter().filter_map(decode_news).collect())
    }
}

fn decode_news(doc: Document) -> Option<StoredNews> {
    match doc.decode::<NewsItem>() {
        Ok(item) => Some(StoredNews { id: doc.id, item }),
        Err(e) => {
            warn!("Skipping malformed news document {}: {}", doc.id, e);
            None
        }
    }
}
