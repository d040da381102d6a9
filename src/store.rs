//! In-process relational store.
//!
//! Every table is a `DashMap`. Unique indexes are separate maps written
//! through the `entry` API, so the check and the insert happen under one
//! shard lock. Posts own their comments: both live in a single
//! [`PostRecord`] row, which makes the post → comments cascade atomic.

use crate::models::{Comment, Follow, Group, NewGroup, NewPost, Post, PostRecord, User};
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    Unique(&'static str),
    #[error("check constraint violated: {0}")]
    Check(&'static str),
    #[error("foreign key violated: {0}")]
    ForeignKey(&'static str),
}

/// Monotonic id generator, one per table.
#[derive(Debug)]
struct Sequence(AtomicI64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Store {
    users: DashMap<Uuid, User>,
    usernames: DashMap<String, Uuid>,
    groups: DashMap<i64, Group>,
    group_slugs: DashMap<String, i64>,
    posts: DashMap<i64, PostRecord>,
    follows: DashMap<(Uuid, Uuid), Follow>,
    group_seq: Sequence,
    post_seq: Sequence,
    comment_seq: Sequence,
    follow_seq: Sequence,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            groups: DashMap::new(),
            group_slugs: DashMap::new(),
            posts: DashMap::new(),
            follows: DashMap::new(),
            group_seq: Sequence::new(),
            post_seq: Sequence::new(),
            comment_seq: Sequence::new(),
            follow_seq: Sequence::new(),
        }
    }

    // ---- users -------------------------------------------------------------

    pub fn insert_user(
        &self,
        username: &str,
        email: Option<String>,
        hashed_password: String,
    ) -> Result<User, StoreError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Unique("username")),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    email,
                    hashed_password,
                    created_at: Utc::now(),
                };
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        let id = *self.usernames.get(username)?;
        self.user(id)
    }

    pub fn username_of(&self, id: Uuid) -> Option<String> {
        self.users.get(&id).map(|u| u.username.clone())
    }

    // ---- groups ------------------------------------------------------------

    pub fn insert_group(&self, group: NewGroup) -> Result<Group, StoreError> {
        match self.group_slugs.entry(group.slug.clone()) {
            Entry::Occupied(_) => Err(StoreError::Unique("slug")),
            Entry::Vacant(slot) => {
                let group = Group {
                    id: self.group_seq.next(),
                    title: group.title,
                    slug: group.slug,
                    description: group.description,
                };
                self.groups.insert(group.id, group.clone());
                slot.insert(group.id);
                Ok(group)
            }
        }
    }

    pub fn group(&self, id: i64) -> Option<Group> {
        self.groups.get(&id).map(|g| g.value().clone())
    }

    pub fn groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.groups.iter().map(|g| g.value().clone()).collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    // ---- posts -------------------------------------------------------------

    pub fn insert_post(&self, new: NewPost) -> Result<PostRecord, StoreError> {
        if !self.users.contains_key(&new.author) {
            return Err(StoreError::ForeignKey("author"));
        }
        if let Some(group) = new.group {
            if !self.groups.contains_key(&group) {
                return Err(StoreError::ForeignKey("group"));
            }
        }
        let record = PostRecord {
            post: Post {
                id: self.post_seq.next(),
                text: new.text,
                pub_date: Utc::now(),
                author: new.author,
                image: new.image,
                group: new.group,
            },
            comments: Vec::new(),
        };
        self.posts.insert(record.post.id, record.clone());
        Ok(record)
    }

    pub fn post(&self, id: i64) -> Option<PostRecord> {
        self.posts.get(&id).map(|p| p.value().clone())
    }

    pub fn post_exists(&self, id: i64) -> bool {
        self.posts.contains_key(&id)
    }

    /// All posts, newest first.
    pub fn posts(&self) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = self.posts.iter().map(|p| p.value().clone()).collect();
        posts.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(b.post.id.cmp(&a.post.id))
        });
        posts
    }

    /// Runs `f` with the post row locked. `None` when the post is absent.
    ///
    /// `f` must not call back into the posts table.
    pub fn update_post<T, E>(
        &self,
        id: i64,
        f: impl FnOnce(&mut PostRecord) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut row = self.posts.get_mut(&id)?;
        Some(f(row.value_mut()))
    }

    /// Removes the post and, with it, every comment it owns.
    ///
    /// `guard` runs under the row lock and may veto the removal.
    pub fn delete_post<E>(
        &self,
        id: i64,
        guard: impl FnOnce(&Post) -> Result<(), E>,
    ) -> Option<Result<PostRecord, E>> {
        match self.posts.entry(id) {
            Entry::Vacant(_) => None,
            Entry::Occupied(row) => Some(guard(&row.get().post).map(|()| row.remove())),
        }
    }

    // ---- comments ----------------------------------------------------------

    /// `None` when the parent post does not exist.
    pub fn insert_comment(&self, post_id: i64, author: Uuid, text: String) -> Option<Comment> {
        let mut row = self.posts.get_mut(&post_id)?;
        let comment = Comment {
            id: self.comment_seq.next(),
            post: post_id,
            author,
            text,
            created: Utc::now(),
        };
        row.comments.push(comment.clone());
        Some(comment)
    }

    /// Comments of a post, oldest first. `None` when the post is absent.
    pub fn comments(&self, post_id: i64) -> Option<Vec<Comment>> {
        let row = self.posts.get(&post_id)?;
        let mut comments = row.comments.clone();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Some(comments)
    }

    pub fn comment(&self, post_id: i64, comment_id: i64) -> Option<Comment> {
        let row = self.posts.get(&post_id)?;
        row.comments.iter().find(|c| c.id == comment_id).cloned()
    }

    /// Runs `f` with the comment's parent row locked. `None` when either the
    /// post is absent or the comment does not belong to it.
    pub fn update_comment<T, E>(
        &self,
        post_id: i64,
        comment_id: i64,
        f: impl FnOnce(&mut Comment) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut row = self.posts.get_mut(&post_id)?;
        let comment = row.comments.iter_mut().find(|c| c.id == comment_id)?;
        Some(f(comment))
    }

    pub fn delete_comment<E>(
        &self,
        post_id: i64,
        comment_id: i64,
        guard: impl FnOnce(&Comment) -> Result<(), E>,
    ) -> Option<Result<Comment, E>> {
        let mut row = self.posts.get_mut(&post_id)?;
        let index = row.comments.iter().position(|c| c.id == comment_id)?;
        Some(guard(&row.comments[index]).map(|()| row.comments.remove(index)))
    }

    // ---- follows -----------------------------------------------------------

    pub fn insert_follow(&self, user: Uuid, following: Uuid) -> Result<Follow, StoreError> {
        if user == following {
            return Err(StoreError::Check("no_self_follow"));
        }
        if !self.users.contains_key(&user) || !self.users.contains_key(&following) {
            return Err(StoreError::ForeignKey("user"));
        }
        match self.follows.entry((user, following)) {
            Entry::Occupied(_) => Err(StoreError::Unique("user, following")),
            Entry::Vacant(slot) => {
                let follow = Follow {
                    id: self.follow_seq.next(),
                    user,
                    following,
                    created_at: Utc::now(),
                };
                slot.insert(follow.clone());
                Ok(follow)
            }
        }
    }

    /// Outgoing edges of `user`, in creation order.
    pub fn follows_of(&self, user: Uuid) -> Vec<Follow> {
        let mut follows: Vec<Follow> = self
            .follows
            .iter()
            .filter(|f| f.user == user)
            .map(|f| f.value().clone())
            .collect();
        follows.sort_by_key(|f| f.id);
        follows
    }

    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}
