use serde::Deserialize;
use std::collections::HashSet;

use crate::models::{
    post::{Post, PostId},
    user::Profile,
};

/// Pagination metadata returned with every post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub number_of_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            number_of_pages: 1,
        }
    }
}

/// One page of a feed, in display order (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for FeedPage {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl FeedPage {
    /// Builds a page from posts as the API returns them (oldest first).
    pub fn from_server_order(mut posts: Vec<Post>, pagination: PaginationInfo) -> Self {
        posts.reverse();
        Self {
            posts,
            current_page: pagination.current_page.max(1),
            total_pages: pagination.number_of_pages.max(1),
        }
    }

    /// A page holding a single post (the single-post view).
    pub fn single(post: Post) -> Self {
        Self {
            posts: vec![post],
            ..Self::default()
        }
    }

    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn post_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| &p.id == id)
    }

    pub fn position(&self, id: &PostId) -> Option<usize> {
        self.posts.iter().position(|p| &p.id == id)
    }
}

/// Everything a feed view holds between fetches.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub page: FeedPage,
    /// The signed-in user's profile, used to label optimistic comments.
    pub viewer: Option<Profile>,
    /// Posts whose comment panel is open.
    pub expanded: HashSet<PostId>,
    /// Posts with a comment submission in flight.
    pub submitting: HashSet<PostId>,
    /// Posts with a delete call in flight.
    pub deleting: HashSet<PostId>,
    next_local_id: u64,
}

impl FeedState {
    /// Replaces the page wholesale. Panel state for posts that are gone is
    /// dropped.
    pub fn replace_page(&mut self, page: FeedPage) {
        self.expanded.retain(|id| page.post(id).is_some());
        self.page = page;
    }

    pub fn toggle_comments(&mut self, post_id: &PostId) -> bool {
        if self.expanded.remove(post_id) {
            false
        } else {
            self.expanded.insert(post_id.clone());
            true
        }
    }

    pub fn is_expanded(&self, post_id: &PostId) -> bool {
        self.expanded.contains(post_id)
    }

    pub fn is_submitting(&self, post_id: &PostId) -> bool {
        self.submitting.contains(post_id)
    }

    pub fn is_deleting(&self, post_id: &PostId) -> bool {
        self.deleting.contains(post_id)
    }

    /// Next placeholder id; monotonic for the lifetime of the state.
    pub fn next_local_id(&mut self) -> u64 {
        self.next_local_id += 1;
        self.next_local_id
    }
}
