//! In-memory adapters for the driven ports, shared by the HTTP tests.
//!
//! They honour the same uniqueness, foreign key and concurrency rules as the
//! PostgreSQL schema so the full stack can be exercised without a database.

#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::cookie::{Key, SameSite};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use blog_backend::domain::ports::{
    AuthorRepository, AuthorRepositoryError, AvatarStore, AvatarStoreError, CommentRepository,
    CommentRepositoryError, PasswordHasher, PasswordHasherError, PostRepository,
    PostRepositoryError, StoredAvatar, TokenRepository, TokenRepositoryError, UserRepository,
    UserRepositoryError,
};
use blog_backend::domain::{
    AuthService, Author, AuthorId, AuthorService, AvatarImage, Comment, CommentId, CommentService,
    ConcurrencyStamp, Email, Offset, Page, Password, PasswordHash, Post, PostContent, PostId,
    PostService, Role, TokenDigest, User, UserId, UserName, UserParts, UserService, UserToken,
};
use blog_backend::inbound::http::session_config::SessionSettings;
use blog_backend::inbound::http::state::{AccountPorts, ContentPorts, HttpState};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    tokens: HashMap<String, UserToken>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    authors: Vec<Author>,
    avatars: HashMap<UserId, StoredAvatar>,
}

/// Shared in-memory tables implementing every repository port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

fn rebuild(user: &User, edit: impl FnOnce(&mut UserParts)) -> User {
    let mut parts = UserParts {
        id: user.id(),
        email: user.email().clone(),
        profile: user.profile().clone(),
        password_hash: user.password_hash().clone(),
        concurrency_stamp: user.concurrency_stamp(),
        avatar_url: user.avatar_url().map(str::to_owned),
        roles: user.roles().to_vec(),
        created_at: user.created_at(),
    };
    edit(&mut parts);
    User::from_parts(parts)
}

fn page_of(mut posts: Vec<Post>, offset: Offset, limit: i64) -> Page<Post> {
    posts.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
    let total = i64::try_from(posts.len()).expect("post count fits i64");
    let skip = usize::try_from(offset.get()).expect("offset fits usize");
    let take = usize::try_from(limit).expect("limit fits usize");
    let items = posts.into_iter().skip(skip).take(take).collect();
    Page::new(items, offset, limit, total)
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store lock poisoned")
    }

    /// Give an existing user the admin role.
    pub fn grant_admin(&self, id: &UserId) {
        let mut tables = self.lock();
        let user = tables.users.get(id).expect("user exists").clone();
        let promoted = rebuild(&user, |parts| parts.roles.push(Role::Admin));
        tables.users.insert(*id, promoted);
    }

    pub fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).cloned()
    }

    pub fn token_count(&self) -> usize {
        self.lock().tokens.len()
    }

    pub fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock();
        for existing in tables.users.values() {
            if existing.user_name().normalized() == user.user_name().normalized() {
                return Err(UserRepositoryError::duplicate_user_name());
            }
            if existing.email().normalized() == user.email().normalized() {
                return Err(UserRepositoryError::duplicate_email());
            }
        }
        tables.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.email().normalized() == email.normalized())
            .cloned())
    }

    async fn user_name_exists(&self, user_name: &UserName) -> Result<bool, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|user| user.user_name().normalized() == user_name.normalized()))
    }

    async fn update_profile(
        &self,
        user: &User,
        expected: ConcurrencyStamp,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock();
        let Some(stored) = tables.users.get(&user.id()) else {
            return Err(UserRepositoryError::not_found());
        };
        if stored.concurrency_stamp() != expected {
            return Err(UserRepositoryError::concurrency_conflict());
        }
        let taken = tables.users.values().any(|other| {
            other.id() != user.id()
                && other.user_name().normalized() == user.user_name().normalized()
        });
        if taken {
            return Err(UserRepositoryError::duplicate_user_name());
        }
        let updated = rebuild(stored, |parts| {
            parts.profile = user.profile().clone();
            parts.concurrency_stamp = user.concurrency_stamp();
        });
        tables.users.insert(user.id(), updated);
        Ok(())
    }

    async fn set_avatar_url(&self, id: &UserId, url: &str) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock();
        let Some(stored) = tables.users.get(id) else {
            return Err(UserRepositoryError::not_found());
        };
        let updated = rebuild(stored, |parts| parts.avatar_url = Some(url.to_owned()));
        tables.users.insert(*id, updated);
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn store(&self, token: &UserToken) -> Result<(), TokenRepositoryError> {
        self.lock()
            .tokens
            .insert(token.digest.as_str().to_owned(), token.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserToken>, TokenRepositoryError> {
        Ok(self
            .lock()
            .tokens
            .get(digest.as_str())
            .filter(|token| token.is_active(now))
            .cloned())
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError> {
        self.lock().tokens.remove(digest.as_str());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut tables = self.lock();
        if let Some(author_id) = post.author_id() {
            if !tables.authors.iter().any(|author| author.id() == author_id) {
                return Err(PostRepositoryError::author_not_found());
            }
        }
        tables.posts.push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        Ok(self.lock().posts.iter().find(|post| post.id() == *id).cloned())
    }

    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut tables = self.lock();
        let slot = tables
            .posts
            .iter_mut()
            .find(|existing| existing.id() == post.id())
            .ok_or_else(PostRepositoryError::not_found)?;
        *slot = post.clone();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|post| post.id() != *id);
        if tables.posts.len() == before {
            return Err(PostRepositoryError::not_found());
        }
        tables.comments.retain(|comment| comment.post_id() != *id);
        Ok(())
    }

    async fn list(&self, offset: Offset, limit: i64) -> Result<Page<Post>, PostRepositoryError> {
        Ok(page_of(self.lock().posts.clone(), offset, limit))
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        offset: Offset,
        limit: i64,
    ) -> Result<Page<Post>, PostRepositoryError> {
        let posts = self
            .lock()
            .posts
            .iter()
            .filter(|post| post.user_id() == *user_id)
            .cloned()
            .collect();
        Ok(page_of(posts, offset, limit))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: &Comment) -> Result<(), CommentRepositoryError> {
        let mut tables = self.lock();
        if !tables.posts.iter().any(|post| post.id() == comment.post_id()) {
            return Err(CommentRepositoryError::post_not_found());
        }
        tables.comments.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .find(|comment| comment.id() == *id)
            .cloned())
    }

    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|comment| comment.post_id() == *post_id)
            .cloned()
            .collect();
        comments.sort_by_key(Comment::created_at);
        Ok(comments)
    }

    async fn delete(&self, id: &CommentId) -> Result<(), CommentRepositoryError> {
        let mut tables = self.lock();
        let before = tables.comments.len();
        tables.comments.retain(|comment| comment.id() != *id);
        if tables.comments.len() == before {
            return Err(CommentRepositoryError::not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Author>, AuthorRepositoryError> {
        let mut authors = self.lock().authors.clone();
        authors.sort_by(|a, b| a.name().as_ref().cmp(b.name().as_ref()));
        Ok(authors)
    }

    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError> {
        Ok(self
            .lock()
            .authors
            .iter()
            .find(|author| author.id() == *id)
            .cloned())
    }

    async fn create(&self, author: &Author) -> Result<(), AuthorRepositoryError> {
        self.lock().authors.push(author.clone());
        Ok(())
    }

    async fn update(&self, author: &Author) -> Result<(), AuthorRepositoryError> {
        let mut tables = self.lock();
        let slot = tables
            .authors
            .iter_mut()
            .find(|existing| existing.id() == author.id())
            .ok_or_else(AuthorRepositoryError::not_found)?;
        *slot = author.clone();
        Ok(())
    }

    async fn delete(&self, id: &AuthorId) -> Result<(), AuthorRepositoryError> {
        let mut tables = self.lock();
        let before = tables.authors.len();
        tables.authors.retain(|author| author.id() != *id);
        if tables.authors.len() == before {
            return Err(AuthorRepositoryError::not_found());
        }
        for post in &mut tables.posts {
            if post.author_id() == Some(*id) {
                let content = PostContent {
                    author_id: None,
                    ..post.content().clone()
                };
                *post = Post::new(post.id(), post.user_id(), content, post.created_at(), post.updated_at());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AvatarStore for InMemoryStore {
    async fn save(&self, user_id: &UserId, image: &AvatarImage) -> Result<String, AvatarStoreError> {
        let format = image.format();
        self.lock().avatars.insert(
            *user_id,
            StoredAvatar {
                format,
                bytes: image.bytes().to_vec(),
            },
        );
        Ok(format!("{user_id}.{}", format.extension()))
    }

    async fn load(&self, user_id: &UserId) -> Result<Option<StoredAvatar>, AvatarStoreError> {
        Ok(self.lock().avatars.get(user_id).cloned())
    }
}

/// Reversible "hash" that keeps tests fast.
#[derive(Clone, Copy, Default)]
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("plain${}", password.expose())))
    }

    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_str() == format!("plain${candidate}"))
    }
}

/// Clock advancing one second per reading so creation order is observable.
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self {
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .expect("valid start time");
        start + Duration::seconds(tick)
    }
}

/// Handler state wiring the real domain services to `store`.
pub fn http_state(store: &InMemoryStore) -> HttpState {
    let repo = Arc::new(store.clone());
    let hasher = Arc::new(PlainHasher);
    let clock: Arc<dyn Clock> = Arc::new(SteppingClock::default());

    let login = Arc::new(AuthService::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        Arc::clone(&hasher),
        Arc::clone(&clock),
    ));
    let users = Arc::new(UserService::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        hasher,
        Arc::clone(&repo),
        Arc::clone(&clock),
    ));
    let posts = Arc::new(PostService::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        Arc::clone(&clock),
    ));
    let comments = Arc::new(CommentService::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        Arc::clone(&clock),
    ));
    let authors = Arc::new(AuthorService::new(repo));

    HttpState::new(
        AccountPorts {
            login,
            commands: users.clone(),
            queries: users,
        },
        ContentPorts {
            post_commands: posts.clone(),
            posts,
            comment_commands: comments.clone(),
            comments,
            author_commands: authors.clone(),
            authors,
        },
    )
}

/// Session settings suitable for plain-HTTP tests.
pub fn test_session_settings() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}
