//! Post services.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::author_service::map_author_repository_error;
use crate::domain::ports::{AuthorRepository, PostCommand, PostQuery, PostRepository};
use crate::domain::user_service::map_post_repository_error;
use crate::domain::{
    AuthorId, Error, Offset, PAGE_SIZE, Page, Post, PostContent, PostId, Principal,
};

/// Post service implementing the post driving ports.
#[derive(Clone)]
pub struct PostService<P, A> {
    posts: Arc<P>,
    authors: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<P, A> PostService<P, A> {
    pub fn new(posts: Arc<P>, authors: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts,
            authors,
            clock,
        }
    }
}

impl<P, A> PostService<P, A>
where
    P: PostRepository,
    A: AuthorRepository,
{
    async fn load_post(&self, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(map_post_repository_error)?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))
    }

    async fn ensure_author_exists(&self, author_id: Option<AuthorId>) -> Result<(), Error> {
        let Some(author_id) = author_id else {
            return Ok(());
        };
        self.authors
            .find_by_id(&author_id)
            .await
            .map_err(map_author_repository_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("author {author_id} not found")))
    }

    async fn load_managed_post(&self, principal: &Principal, id: &PostId) -> Result<Post, Error> {
        let post = self.load_post(id).await?;
        if !principal.can_manage(post.user_id()) {
            return Err(Error::forbidden("only the owner or an admin may change this post"));
        }
        Ok(post)
    }
}

#[async_trait]
impl<P, A> PostCommand for PostService<P, A>
where
    P: PostRepository,
    A: AuthorRepository,
{
    async fn create(&self, principal: &Principal, content: PostContent) -> Result<Post, Error> {
        self.ensure_author_exists(content.author_id).await?;
        let post = Post::draft(principal.user_id, content, self.clock.utc());
        self.posts
            .create(&post)
            .await
            .map_err(map_post_repository_error)?;
        info!(post_id = %post.id(), user_id = %principal.user_id, "created post");
        Ok(post)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &PostId,
        content: PostContent,
    ) -> Result<(), Error> {
        let post = self.load_managed_post(principal, id).await?;
        self.ensure_author_exists(content.author_id).await?;
        let revised = post.revise(content, self.clock.utc());
        self.posts
            .update(&revised)
            .await
            .map_err(map_post_repository_error)?;
        info!(post_id = %id, "updated post");
        Ok(())
    }

    async fn delete(&self, principal: &Principal, id: &PostId) -> Result<(), Error> {
        self.load_managed_post(principal, id).await?;
        self.posts
            .delete(id)
            .await
            .map_err(map_post_repository_error)?;
        info!(post_id = %id, "deleted post");
        Ok(())
    }
}

#[async_trait]
impl<P, A> PostQuery for PostService<P, A>
where
    P: PostRepository,
    A: AuthorRepository,
{
    async fn get(&self, id: &PostId) -> Result<Post, Error> {
        self.load_post(id).await
    }

    async fn list(&self, offset: Offset) -> Result<Page<Post>, Error> {
        self.posts
            .list(offset, PAGE_SIZE)
            .await
            .map_err(map_post_repository_error)
    }
}
