//! Builders shared by the domain service tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Comment, CommentBody, CommentId, Email, FirstName, LastName, PasswordHash, Post, PostBody,
    PostContent, PostId, Principal, Role, Summary, Title, User, UserId, UserName, UserProfile,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn profile(user_name: &str) -> UserProfile {
    UserProfile {
        first_name: FirstName::new("Ada").expect("valid first name"),
        last_name: LastName::new("Lovelace").expect("valid last name"),
        user_name: UserName::new(user_name).expect("valid user name"),
    }
}

pub(crate) fn user(user_name: &str) -> User {
    User::register(
        Email::new(format!("{user_name}@example.org")).expect("valid email"),
        profile(user_name),
        PasswordHash::new("hashed"),
        fixture_timestamp(),
    )
}

pub(crate) fn author_principal(user_id: UserId) -> Principal {
    Principal::new(user_id, vec![Role::Author])
}

pub(crate) fn admin_principal() -> Principal {
    Principal::new(UserId::random(), vec![Role::Author, Role::Admin])
}

pub(crate) fn content(title: &str) -> PostContent {
    PostContent {
        title: Title::new(title).expect("valid title"),
        summary: Summary::new("summary").expect("valid summary"),
        body: PostBody::new("body").expect("valid body"),
        author_id: None,
    }
}

pub(crate) fn post_by(user_id: UserId) -> Post {
    Post::draft(user_id, content("A post"), fixture_timestamp())
}

pub(crate) fn comment_on(post_id: PostId, user_id: UserId) -> Comment {
    Comment::new(
        CommentId::random(),
        post_id,
        user_id,
        CommentBody::new("nice").expect("valid body"),
        fixture_timestamp(),
    )
}
