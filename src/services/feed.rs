use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    error::{FeedError, Result},
    models::{
        feed::FeedPage,
        post::PostId,
        session::Session,
    },
    repositories::api::{PostsPage, RemoteApi},
};

pub const LOAD_POSTS_FAILED: &str = "Failed to load posts. Please try again.";
pub const LOAD_POST_FAILED: &str = "Failed to load post.";

/// Which collection a feed view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// The most recent page of the global feed.
    Latest,
    /// A specific page of the global feed.
    Page(u32),
    /// The signed-in user's own posts.
    Own,
    /// A single post.
    Single(PostId),
}

/// Fetches feed pages and remembers the last known page count.
pub struct FeedLoader {
    api: Arc<dyn RemoteApi>,
    page_size: u32,
    /// 0 until a global feed fetch has reported a page count.
    total_pages: AtomicU32,
}

impl FeedLoader {
    pub fn new(api: Arc<dyn RemoteApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            total_pages: AtomicU32::new(0),
        }
    }

    /// The page count reported by the last global feed fetch (1 before any).
    pub fn total_pages(&self) -> u32 {
        self.total_pages.load(Ordering::Relaxed).max(1)
    }

    fn knows_total_pages(&self) -> bool {
        self.total_pages.load(Ordering::Relaxed) > 0
    }

    /// Loads `source`.
    pub async fn load(&self, source: &FeedSource, session: &Session) -> Result<FeedPage> {
        match source {
            FeedSource::Latest => self.load_latest_page(session).await,
            FeedSource::Page(n) => self.load_numbered_page(session, *n).await,
            FeedSource::Own => self.load_own_page(session).await,
            FeedSource::Single(id) => self.load_post(session, id).await,
        }
    }

    /// Loads the newest page of the global feed.
    ///
    /// The collection is stored oldest-first, so the newest posts live on the
    /// last page: page 1 is fetched to learn the page count, then the last
    /// page is fetched with the same page size.
    pub async fn load_latest_page(&self, session: &Session) -> Result<FeedPage> {
        let first = self
            .api
            .list_posts(session, self.page_size, 1)
            .await
            .map_err(|e| failed("Fetch posts", e, LOAD_POSTS_FAILED))?;

        let last = first.pagination.number_of_pages.max(1);
        let page = if last == 1 {
            first
        } else {
            self.api
                .list_posts(session, self.page_size, last)
                .await
                .map_err(|e| failed("Fetch posts", e, LOAD_POSTS_FAILED))?
        };

        Ok(self.remember(page))
    }

    /// Loads page `page_number`, learning the page count from page 1 first
    /// when no fetch has reported it yet.
    pub async fn load_numbered_page(&self, session: &Session, page_number: u32) -> Result<FeedPage> {
        if !self.knows_total_pages() && page_number != 0 {
            let first = self
                .api
                .list_posts(session, self.page_size, 1)
                .await
                .map_err(|e| failed("Fetch posts", e, LOAD_POSTS_FAILED))?;
            let first = self.remember(first);
            if page_number == 1 {
                return Ok(first);
            }
        }
        self.load_page(session, page_number).await
    }

    /// Loads page `page_number` of the global feed.
    ///
    /// Pages outside `1..=total_pages` are rejected without a network call.
    pub async fn load_page(&self, session: &Session, page_number: u32) -> Result<FeedPage> {
        let total = self.total_pages();
        if page_number == 0 || page_number > total {
            tracing::debug!("Page {} outside 1..={}", page_number, total);
            return Err(FeedError::ValidationRejected(format!(
                "Page {} does not exist (1-{})",
                page_number, total
            )));
        }

        let page = self
            .api
            .list_posts(session, self.page_size, page_number)
            .await
            .map_err(|e| failed("Fetch posts", e, LOAD_POSTS_FAILED))?;

        Ok(self.remember(page))
    }

    /// Loads the caller's own posts.
    ///
    /// The identity comes from the server's profile rather than the token
    /// claim, so this takes two sequential calls.
    pub async fn load_own_page(&self, session: &Session) -> Result<FeedPage> {
        let profile = self
            .api
            .profile(session)
            .await
            .map_err(|e| failed("Fetch profile", e, LOAD_POSTS_FAILED))?;

        let page = self
            .api
            .list_user_posts(session, &profile.id, self.page_size)
            .await
            .map_err(|e| failed("Fetch own posts", e, LOAD_POSTS_FAILED))?;

        tracing::info!("✅ Loaded {} posts of user {}", page.posts.len(), profile.id);
        Ok(FeedPage::from_server_order(page.posts, page.pagination))
    }

    /// Loads one post for the single-post view.
    pub async fn load_post(&self, session: &Session, post_id: &PostId) -> Result<FeedPage> {
        let post = self
            .api
            .get_post(session, post_id)
            .await
            .map_err(|e| failed("Fetch post", e, LOAD_POST_FAILED))?;
        Ok(FeedPage::single(post))
    }

    fn remember(&self, page: PostsPage) -> FeedPage {
        let page = FeedPage::from_server_order(page.posts, page.pagination);
        self.total_pages.store(page.total_pages, Ordering::Relaxed);
        tracing::info!(
            "✅ Loaded page {}/{} ({} posts)",
            page.current_page,
            page.total_pages,
            page.posts.len()
        );
        page
    }
}

fn failed(operation: &str, error: FeedError, fallback: &str) -> FeedError {
    tracing::error!("❌ {} error: {}", operation, error);
    error.with_fallback(fallback)
}
