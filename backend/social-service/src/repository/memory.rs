//! In-memory repositories
//!
//! Same contracts as the PostgreSQL repositories. Each conditional write holds
//! the write lock across its check, which gives the same atomicity as the SQL
//! versions.

use super::{FollowRepository, PostFilter, PostRepository, PostSelection, PostSort};
use crate::domain::{Follow, NewPost, PostRecord};
use anyhow::Result;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Number of distinct query terms present in the post's title or body
fn relevance(term: &str, post: &PostRecord) -> f32 {
    let words: HashSet<String> = tokens(&post.title).chain(tokens(&post.body)).collect();
    let terms: HashSet<String> = tokens(term).collect();
    terms.iter().filter(|t| words.contains(*t)).count() as f32
}

/// Posts kept in insertion order
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<PostRecord>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.posts.write().await.push(PostRecord {
            id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_date: post.created_date,
            author_id: post.author_id,
            score: None,
        });
        Ok(id)
    }

    async fn update_content(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<bool> {
        let mut posts = self.posts.write().await;
        match posts
            .iter_mut()
            .find(|p| p.id == post_id && p.author_id == author_id)
        {
            Some(post) => {
                post.title = title.to_string();
                post.body = body.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| !(p.id == post_id && p.author_id == author_id));
        Ok(posts.len() != before)
    }

    async fn select(&self, selection: &PostSelection) -> Result<Vec<PostRecord>> {
        let posts = self.posts.read().await;

        let mut selected: Vec<PostRecord> = match &selection.filter {
            PostFilter::Id(id) => posts.iter().filter(|p| p.id == *id).cloned().collect(),
            PostFilter::Author(author_id) => posts
                .iter()
                .filter(|p| p.author_id == *author_id)
                .cloned()
                .collect(),
            PostFilter::Authors(author_ids) => posts
                .iter()
                .filter(|p| author_ids.contains(&p.author_id))
                .cloned()
                .collect(),
            PostFilter::Text(term) => posts
                .iter()
                .filter_map(|p| {
                    let score = relevance(term, p);
                    (score > 0.0).then(|| PostRecord {
                        score: Some(score),
                        ..p.clone()
                    })
                })
                .collect(),
        };

        if let Some(PostSort::Newest) = selection.sort {
            selected.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        }

        Ok(selected)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| p.author_id == author_id).count() as i64)
    }
}

/// Follow edges kept in insertion order
#[derive(Default)]
pub struct InMemoryFollowRepository {
    edges: RwLock<Vec<Follow>>,
}

impl InMemoryFollowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn insert_if_absent(&self, edge: &Follow) -> Result<bool> {
        let mut edges = self.edges.write().await;
        if edge.is_self_follow() || edges.contains(edge) {
            return Ok(false);
        }
        edges.push(*edge);
        Ok(true)
    }

    async fn delete_if_present(&self, edge: &Follow) -> Result<bool> {
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|e| e != edge);
        Ok(edges.len() != before)
    }

    async fn exists(&self, edge: &Follow) -> Result<bool> {
        Ok(self.edges.read().await.contains(edge))
    }

    async fn follower_ids(&self, followed_id: Uuid) -> Result<Vec<Uuid>> {
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| e.followed_id == followed_id)
            .map(|e| e.author_id)
            .collect())
    }

    async fn following_ids(&self, author_id: Uuid) -> Result<Vec<Uuid>> {
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| e.author_id == author_id)
            .map(|e| e.followed_id)
            .collect())
    }

    async fn count_followers(&self, followed_id: Uuid) -> Result<i64> {
        let edges = self.edges.read().await;
        Ok(edges.iter().filter(|e| e.followed_id == followed_id).count() as i64)
    }

    async fn count_following(&self, author_id: Uuid) -> Result<i64> {
        let edges = self.edges.read().await;
        Ok(edges.iter().filter(|e| e.author_id == author_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn new_post(author_id: Uuid, title: &str, body: &str, age_minutes: i64) -> NewPost {
        NewPost {
            title: title.to_string(),
            body: body.to_string(),
            created_date: Utc::now() - Duration::minutes(age_minutes),
            author_id,
        }
    }

    #[tokio::test]
    async fn test_conditional_update_and_delete_require_owner() {
        let repo = InMemoryPostRepository::new();
        let owner = Uuid::new_v4();
        let id = repo.insert(&new_post(owner, "t", "b", 0)).await.unwrap();

        assert!(!repo.update_content(id, Uuid::new_v4(), "x", "y").await.unwrap());
        assert!(!repo.delete(id, Uuid::new_v4()).await.unwrap());
        assert!(repo.update_content(id, owner, "x", "y").await.unwrap());
        assert!(repo.delete(id, owner).await.unwrap());
        assert!(!repo.delete(id, owner).await.unwrap());
    }

    #[tokio::test]
    async fn test_text_selection_scores_matching_posts_only() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        repo.insert(&new_post(author, "hello world", "hello again", 0))
            .await
            .unwrap();
        repo.insert(&new_post(author, "unrelated", "nothing here", 0))
            .await
            .unwrap();
        repo.insert(&new_post(author, "Hello", "there, world!", 0))
            .await
            .unwrap();

        let found = repo
            .select(&PostSelection {
                filter: PostFilter::Text("hello world".into()),
                sort: None,
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.score == Some(2.0)));
    }

    #[tokio::test]
    async fn test_newest_sort() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        repo.insert(&new_post(author, "old", "b", 30)).await.unwrap();
        repo.insert(&new_post(author, "new", "b", 1)).await.unwrap();

        let found = repo
            .select(&PostSelection {
                filter: PostFilter::Author(author),
                sort: Some(PostSort::Newest),
            })
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_follow_edges_are_unique_per_ordered_pair() {
        let repo = InMemoryFollowRepository::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(repo.insert_if_absent(&Follow::new(b, a)).await.unwrap());
        assert!(!repo.insert_if_absent(&Follow::new(b, a)).await.unwrap());
        assert!(repo.insert_if_absent(&Follow::new(a, b)).await.unwrap());
        assert!(!repo.insert_if_absent(&Follow::new(a, a)).await.unwrap());

        assert_eq!(repo.count_followers(b).await.unwrap(), 1);
        assert_eq!(repo.count_following(a).await.unwrap(), 1);
        assert_eq!(repo.follower_ids(b).await.unwrap(), vec![a]);

        assert!(repo.delete_if_present(&Follow::new(b, a)).await.unwrap());
        assert!(!repo.delete_if_present(&Follow::new(b, a)).await.unwrap());
    }
}
