//! In-memory blog post store.
//!
//! Posts are kept newest-first in a lock-guarded vector owned by the shared
//! application state; nothing survives a restart. The store is injected
//! rather than global so tests can build their own and a database can slot in
//! later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub date: DateTime<Utc>,
    pub author: String,
    pub category: String,
}

/// Fields for a new post; `category` falls back to "Uncategorized".
#[derive(Debug, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update: `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct PostStore {
    posts: RwLock<Vec<Post>>,
}

impl PostStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    pub async fn create(&self, new: NewPost) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            title: new.title,
            content: new.content,
            image_url: new.image_url,
            date: Utc::now(),
            author: new.author,
            category: new.category.unwrap_or_else(|| "Uncategorized".to_string()),
        };

        let mut posts = self.posts.write().await;
        posts.insert(0, post.clone());
        post
    }

    /// Apply a partial update, refreshing the post's date. Returns `None`
    /// when the id is unknown.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Option<Post> {
        let mut posts = self.posts.write().await;
        let post = posts.iter_mut().find(|post| post.id == id)?;

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(author) = patch.author {
            post.author = author;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(image_url) = patch.image_url {
            post.image_url = Some(image_url);
        }
        post.date = Utc::now();

        Some(post.clone())
    }

    /// Remove a post by id; `false` when the id is unknown.
    pub async fn delete(&self, id: Uuid) -> bool {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| post.id != id);
        posts.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "Wax on, wax off".to_string(),
            author: "Skipper".to_string(),
            category: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_prepends_newest_first() {
        let store = PostStore::new();
        store.create(new_post("first")).await;
        store.create(new_post("second")).await;

        let posts = store.list().await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "second");
        assert_eq!(posts[1].title, "first");
    }

    #[tokio::test]
    async fn test_create_defaults_category() {
        let store = PostStore::new();
        let post = store.create(new_post("first")).await;
        assert_eq!(post.category, "Uncategorized");

        let post = store
            .create(NewPost {
                category: Some("Hull care".to_string()),
                ..new_post("second")
            })
            .await;
        assert_eq!(post.category, "Hull care");
    }

    #[tokio::test]
    async fn test_update_patches_only_given_fields() {
        let store = PostStore::new();
        let post = store.create(new_post("original")).await;

        let updated = store
            .update(
                post.id,
                PostPatch {
                    title: Some("updated".to_string()),
                    ..PostPatch::default()
                },
            )
            .await
            .expect("post exists");

        assert_eq!(updated.title, "updated");
        assert_eq!(updated.content, "Wax on, wax off");
        assert_eq!(updated.author, "Skipper");
        assert!(updated.date >= post.date);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = PostStore::new();
        assert!(store.update(Uuid::new_v4(), PostPatch::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = PostStore::new();
        let post = store.create(new_post("doomed")).await;

        assert!(store.delete(post.id).await);
        assert!(!store.delete(post.id).await);
        assert!(store.list().await.is_empty());
    }

    #[test]
    fn test_post_serializes_with_image_url_key() {
        let post = Post {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            content: "c".to_string(),
            image_url: Some("/uploads/1-boat.jpg".to_string()),
            date: Utc::now(),
            author: "a".to_string(),
            category: "Uncategorized".to_string(),
        };

        let value = serde_json::to_value(&post).expect("serialize");
        assert_eq!(value["imageUrl"], "/uploads/1-boat.jpg");
        assert!(value.get("image_url").is_none());
    }
}
