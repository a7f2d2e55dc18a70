// Catalog store — published portfolio content.
//
// Owns the `content` collection. Knows nothing about purchases or access;
// the facade gates who may list a model's portfolio.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fangate_core::db::backend::{from_record, to_record, Filter, Query};
use fangate_core::db::schema::CONTENT_COLLECTION;
use fangate_core::utils::generate_id;
use fangate_core::{Content, ErrorCode, MarketError, MediaKind, Result, StorageBackend};

/// Input for publishing a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    pub title: String,
    pub description: String,
    /// Preview reference shown before purchase.
    pub thumbnail: String,
    /// Ordered media references from the upload gateway.
    pub media_files: Vec<String>,
}

impl NewContent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        thumbnail: impl Into<String>,
        media_files: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            thumbnail: thumbnail.into(),
            media_files,
        }
    }
}

/// Partial content update. Only provided fields change; replacing the
/// media list re-derives the media kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_files: Option<Vec<String>>,
    /// `false` hides the item from listings without deleting it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Store for content records.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    backend: Arc<dyn StorageBackend>,
}

impl CatalogStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Publish a content item into a model's portfolio at `now`.
    pub async fn add_content(
        &self,
        model_id: &str,
        new: NewContent,
        now: DateTime<Utc>,
    ) -> Result<Content> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(MarketError::Validation(ErrorCode::TitleRequired));
        }
        let description = new.description.trim();
        if description.is_empty() {
            return Err(MarketError::Validation(ErrorCode::DescriptionRequired));
        }
        let thumbnail = new.thumbnail.trim();
        if thumbnail.is_empty() {
            return Err(MarketError::Validation(ErrorCode::ThumbnailRequired));
        }
        if new.media_files.is_empty() {
            return Err(MarketError::Validation(ErrorCode::MediaFilesRequired));
        }

        let content = Content {
            id: generate_id(),
            model_id: model_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            thumbnail: thumbnail.to_string(),
            media_kind: MediaKind::from_references(&new.media_files),
            media_files: new.media_files,
            is_active: true,
            created_at: now,
        };

        let created = self
            .backend
            .create(CONTENT_COLLECTION, to_record(&content)?)
            .await?;
        from_record(created)
    }

    /// Apply a partial update to a content item.
    pub async fn update_content(&self, id: &str, update: ContentUpdate) -> Result<Content> {
        if self.find(id).await?.is_none() {
            return Err(MarketError::NotFound(ErrorCode::ContentNotFound));
        }

        let mut patch = serde_json::Map::new();

        if let Some(title) = &update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(MarketError::Validation(ErrorCode::TitleRequired));
            }
            patch.insert("title".into(), Value::String(title.to_string()));
        }
        if let Some(description) = &update.description {
            let description = description.trim();
            if description.is_empty() {
                return Err(MarketError::Validation(ErrorCode::DescriptionRequired));
            }
            patch.insert("description".into(), Value::String(description.to_string()));
        }
        if let Some(thumbnail) = &update.thumbnail {
            let thumbnail = thumbnail.trim();
            if thumbnail.is_empty() {
                return Err(MarketError::Validation(ErrorCode::ThumbnailRequired));
            }
            patch.insert("thumbnail".into(), Value::String(thumbnail.to_string()));
        }
        if let Some(media_files) = &update.media_files {
            if media_files.is_empty() {
                return Err(MarketError::Validation(ErrorCode::MediaFilesRequired));
            }
            patch.insert("mediaFiles".into(), serde_json::to_value(media_files)?);
            patch.insert(
                "mediaKind".into(),
                serde_json::to_value(MediaKind::from_references(media_files))?,
            );
        }
        if let Some(is_active) = update.is_active {
            patch.insert("isActive".into(), Value::Bool(is_active));
        }

        let updated = self
            .backend
            .update(
                CONTENT_COLLECTION,
                &[Filter::eq("id", id)],
                Value::Object(patch),
            )
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::ContentNotFound))?;
        from_record(updated)
    }

    /// Permanently remove a content item. Purchases are unaffected.
    pub async fn delete_content(&self, id: &str) -> Result<()> {
        let removed = self
            .backend
            .delete(CONTENT_COLLECTION, &[Filter::eq("id", id)])
            .await?;
        if !removed {
            return Err(MarketError::NotFound(ErrorCode::ContentNotFound));
        }
        Ok(())
    }

    /// Look up a content item by id.
    pub async fn find(&self, id: &str) -> Result<Option<Content>> {
        let record = self
            .backend
            .find_one(CONTENT_COLLECTION, &[Filter::eq("id", id)])
            .await?;
        record.map(from_record).transpose()
    }

    /// A model's active content, in publication order.
    pub async fn list_by_model(&self, model_id: &str) -> Result<Vec<Content>> {
        let records = self
            .backend
            .find_many(
                CONTENT_COLLECTION,
                Query::filtered(vec![
                    Filter::eq("modelId", model_id),
                    Filter::eq("isActive", true),
                ]),
            )
            .await?;
        records.into_iter().map(from_record).collect()
    }

    /// Number of active content items in a model's portfolio.
    pub async fn count_for_model(&self, model_id: &str) -> Result<i64> {
        self.backend
            .count(
                CONTENT_COLLECTION,
                &[Filter::eq("modelId", model_id), Filter::eq("isActive", true)],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangate_memory::MemoryBackend;

    fn store() -> CatalogStore {
        CatalogStore::new(Arc::new(MemoryBackend::new()))
    }

    fn image_post(title: &str) -> NewContent {
        NewContent::new(
            title,
            "A description",
            "data:image/jpeg;base64,thumb",
            vec!["data:image/jpeg;base64,pic".into()],
        )
    }

    #[tokio::test]
    async fn test_add_content_derives_kind_and_activates() {
        let store = store();
        let now = Utc::now();
        let content = store
            .add_content(
                "m1",
                NewContent::new(
                    "Beach set",
                    "Summer collection",
                    "data:image/jpeg;base64,thumb",
                    vec![
                        "data:image/jpeg;base64,pic".into(),
                        "data:video/mp4;base64,clip".into(),
                    ],
                ),
                now,
            )
            .await
            .unwrap();

        assert!(!content.id.is_empty());
        assert_eq!(content.model_id, "m1");
        assert_eq!(content.media_kind, MediaKind::Both);
        assert!(content.is_active);
        assert_eq!(content.created_at, now);
    }

    #[tokio::test]
    async fn test_add_content_validations() {
        let store = store();
        let now = Utc::now();

        let mut input = image_post("ok");
        input.title = "  ".into();
        let err = store.add_content("m1", input, now).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(ErrorCode::TitleRequired)));

        let mut input = image_post("ok");
        input.description = "".into();
        let err = store.add_content("m1", input, now).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Validation(ErrorCode::DescriptionRequired)
        ));

        let mut input = image_post("ok");
        input.thumbnail = "".into();
        let err = store.add_content("m1", input, now).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Validation(ErrorCode::ThumbnailRequired)
        ));

        let mut input = image_post("ok");
        input.media_files.clear();
        let err = store.add_content("m1", input, now).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Validation(ErrorCode::MediaFilesRequired)
        ));
    }

    #[tokio::test]
    async fn test_listing_keeps_order_and_hides_inactive() {
        let store = store();
        let first = store
            .add_content("m1", image_post("first"), Utc::now())
            .await
            .unwrap();
        let second = store
            .add_content("m1", image_post("second"), Utc::now())
            .await
            .unwrap();
        store
            .add_content("m2", image_post("other model"), Utc::now())
            .await
            .unwrap();

        let listed = store.list_by_model("m1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);

        // Deactivation hides without deleting.
        store
            .update_content(
                &first.id,
                ContentUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = store.list_by_model("m1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);
        assert!(store.find(&first.id).await.unwrap().is_some());
        assert_eq!(store.count_for_model("m1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_rederives_media_kind() {
        let store = store();
        let content = store
            .add_content("m1", image_post("set"), Utc::now())
            .await
            .unwrap();
        assert_eq!(content.media_kind, MediaKind::Image);

        let updated = store
            .update_content(
                &content.id,
                ContentUpdate {
                    media_files: Some(vec![
                        "data:image/png;base64,pic".into(),
                        "data:video/mp4;base64,clip".into(),
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.media_kind, MediaKind::Both);
        assert_eq!(updated.title, "set");
    }

    #[tokio::test]
    async fn test_update_validations_and_missing() {
        let store = store();
        let content = store
            .add_content("m1", image_post("set"), Utc::now())
            .await
            .unwrap();

        let err = store
            .update_content(
                &content.id,
                ContentUpdate {
                    title: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(ErrorCode::TitleRequired)));

        let err = store
            .update_content(
                &content.id,
                ContentUpdate {
                    media_files: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Validation(ErrorCode::MediaFilesRequired)
        ));

        let err = store
            .update_content("missing", ContentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound(ErrorCode::ContentNotFound)));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = store();
        let content = store
            .add_content("m1", image_post("set"), Utc::now())
            .await
            .unwrap();

        store.delete_content(&content.id).await.unwrap();
        assert!(store.find(&content.id).await.unwrap().is_none());

        let err = store.delete_content(&content.id).await.unwrap_err();
        assert!(matches!(err, MarketError::NotFound(ErrorCode::ContentNotFound)));
    }
}
