use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::{FeedError, Result},
    models::{
        comment::CommentId,
        feed::{FeedPage, FeedState},
        post::PostId,
        session::Session,
        user::Owned,
    },
    repositories::api::RemoteApi,
    services::{
        feed::{FeedLoader, FeedSource},
        mutations::{Confirmation, MutationEngine, MutationOutcome, SharedFeed},
        session::{SessionGate, is_owner},
    },
    state::AppState,
};

/// One screen's worth of feed: its source, its state, and the components
/// that load and mutate it. Views never share state.
pub struct FeedView {
    source: Mutex<FeedSource>,
    gate: SessionGate,
    api: Arc<dyn RemoteApi>,
    loader: FeedLoader,
    engine: MutationEngine,
    feed: SharedFeed,
}

impl FeedView {
    pub fn new(state: &AppState, source: FeedSource, confirmation: Arc<dyn Confirmation>) -> Self {
        let feed: SharedFeed = Arc::new(Mutex::new(FeedState::default()));
        Self {
            source: Mutex::new(source),
            gate: SessionGate::new(state.sessions.clone()),
            api: state.api.clone(),
            loader: FeedLoader::new(state.api.clone(), state.config.page_size),
            engine: MutationEngine::new(
                state.api.clone(),
                feed.clone(),
                confirmation,
                state.config.rollback,
            ),
            feed,
        }
    }

    /// Fetches the viewer's profile and the feed concurrently and replaces
    /// the local state. A failed profile fetch is logged and ignored.
    pub async fn activate(&self) -> Result<()> {
        let session = self.gate.require_session().await?;
        let source = self.source.lock().await.clone();

        let (viewer, page) = futures::join!(
            self.api.profile(&session),
            self.loader.load(&source, &session)
        );

        let mut feed = self.feed.lock().await;
        match viewer {
            Ok(profile) => feed.viewer = Some(profile),
            Err(e) => tracing::error!("❌ Fetch user data error: {}", e),
        }
        feed.replace_page(page?);
        Ok(())
    }

    /// Switches to page `page` of the global feed. Only views of the global
    /// feed paginate.
    pub async fn go_to_page(&self, page: u32) -> Result<()> {
        let session = self.gate.require_session().await?;
        let source = self.source.lock().await.clone();
        if !matches!(source, FeedSource::Latest | FeedSource::Page(_)) {
            tracing::debug!("Page {} requested on a {:?} view", page, source);
            return Err(FeedError::ValidationRejected(
                "This feed has no pages".to_string(),
            ));
        }

        let loaded = self.loader.load_numbered_page(&session, page).await?;
        *self.source.lock().await = FeedSource::Page(page);
        self.feed.lock().await.replace_page(loaded);
        Ok(())
    }

    /// Refetches the current source.
    pub async fn refresh(&self) -> Result<()> {
        let session = self.gate.require_session().await?;
        let source = self.source.lock().await.clone();
        let page = self.loader.load(&source, &session).await?;
        self.feed.lock().await.replace_page(page);
        Ok(())
    }

    pub async fn source(&self) -> FeedSource {
        self.source.lock().await.clone()
    }

    /// A copy of the current page.
    pub async fn page(&self) -> FeedPage {
        self.feed.lock().await.page.clone()
    }

    /// A copy of the whole view state.
    pub async fn snapshot(&self) -> FeedState {
        self.feed.lock().await.clone()
    }

    pub async fn toggle_comments(&self, post_id: &PostId) -> bool {
        self.feed.lock().await.toggle_comments(post_id)
    }

    /// Whether edit/delete should be offered for `entity`.
    pub async fn can_modify<E: Owned + ?Sized>(&self, entity: &E) -> bool {
        let session: Option<Session> = self.gate.get_session().await;
        is_owner(entity, session.as_ref())
    }

    pub async fn create_comment(&self, post_id: &PostId, body: &str) -> Result<MutationOutcome> {
        let session = self.gate.require_session().await?;
        self.engine.create_comment(post_id, body, &session).await
    }

    pub async fn edit_comment(
        &self,
        comment_id: &CommentId,
        post_id: &PostId,
        new_body: &str,
    ) -> Result<MutationOutcome> {
        let session = self.gate.require_session().await?;
        self.engine
            .edit_comment(comment_id, post_id, new_body, &session)
            .await
    }

    pub async fn delete_comment(
        &self,
        comment_id: &CommentId,
        post_id: &PostId,
    ) -> Result<MutationOutcome> {
        let session = self.gate.require_session().await?;
        self.engine
            .delete_comment(comment_id, post_id, &session)
            .await
    }

    pub async fn delete_post(&self, post_id: &PostId) -> Result<MutationOutcome> {
        let session = self.gate.require_session().await?;
        self.engine.delete_post(post_id, &session).await
    }
}
