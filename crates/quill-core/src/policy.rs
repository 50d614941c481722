//! Blog access policy
//!
//! Published blogs are readable by anyone; drafts only by their author.
//! Only the author may change or remove a blog.

use uuid::Uuid;

use crate::models::{Blog, BlogState, Caller};
use crate::{QuillError, Result};

/// Kind of mutation being authorized; only shapes the denial message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Self::Update => "modify",
            Self::Delete => "delete",
        }
    }
}

pub fn can_view(blog: &Blog, caller: Option<&Caller>) -> bool {
    match blog.state {
        BlogState::Published => true,
        BlogState::Draft => caller.is_some_and(|caller| caller.id == blog.author),
    }
}

pub fn can_modify(blog: &Blog, caller_id: Uuid) -> bool {
    caller_id == blog.author
}

/// Anonymous and foreign callers get the same denial
pub fn authorize_view(blog: &Blog, caller: Option<&Caller>) -> Result<()> {
    if can_view(blog, caller) {
        Ok(())
    } else {
        Err(QuillError::permission_denied(
            "You do not have permission to view this blog.",
        ))
    }
}

pub fn authorize_modify(blog: &Blog, caller_id: Uuid, mutation: Mutation) -> Result<()> {
    if can_modify(blog, caller_id) {
        Ok(())
    } else {
        Err(QuillError::permission_denied(format!(
            "You do not have permission to {} this blog.",
            mutation.verb()
        )))
    }
}
