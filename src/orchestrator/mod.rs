//! Refresh orchestrator: sequences fetches, rendering, document mutation
//! and listener rebinding into one "show posts for user X" transition, plus
//! the per-post "toggle comments" operation.

pub mod details;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::client::Fetcher;
use crate::constants::{DEFAULT_USER_ID, HIDE_CLASS, LOADED_ATTR};
use crate::dom::{Document, DomError, NodeId};
use crate::listeners::{BoundButton, CLICK, ListenerManager};
use crate::models::{CommentLoading, Id, PostDetail, User, present};
use crate::mutate::{self, MainContent, Toggle};
use crate::progress::ProgressTracker;
use crate::render;

use details::{DetailLoader, DetailOptions};

/// Errors from a page transition.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

/// Where a refresh is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    Idle,
    Loading,
    Rendering,
}

/// What the page currently shows. The document is rendered from this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub selected_user: Option<Id>,
    pub users: Vec<User>,
    pub posts: Vec<PostDetail>,
    /// Posts whose comment section is visible.
    pub expanded: BTreeSet<Id>,
}

impl ViewState {
    pub fn is_expanded(&self, post_id: Id) -> bool {
        self.expanded.contains(&post_id)
    }
}

/// A click delivered to a toggle handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: NodeId,
    pub post_id: Option<Id>,
}

/// Outcome of one user selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub user_id: Id,
    pub post_count: usize,
    pub unbound: Vec<BoundButton>,
    pub bound: Vec<BoundButton>,
}

/// Outcome of one comments toggle, per half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleReport {
    pub post_id: Option<Id>,
    pub section: Toggle,
    pub button: Toggle,
}

impl ToggleReport {
    fn noop() -> Self {
        Self {
            post_id: None,
            section: Toggle::NoOp,
            button: Toggle::NoOp,
        }
    }
}

/// Settings for a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub details: DetailOptions,
    /// User shown when a selection carries no usable value.
    pub default_user: Id,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            details: DetailOptions::default(),
            default_user: DEFAULT_USER_ID,
        }
    }
}

/// Borrowed view of a page for the output renderers.
#[derive(Debug, Clone, Copy)]
pub struct PageSnapshot<'a> {
    pub state: RefreshState,
    pub view: &'a ViewState,
    pub document: &'a Document,
}

/// One browsing session: the document and everything that drives it.
pub struct Page {
    document: Document,
    loader: DetailLoader,
    listeners: ListenerManager,
    view: ViewState,
    state: RefreshState,
    default_user: Id,
}

impl Page {
    pub fn new(fetcher: Fetcher, options: PageOptions, progress: Arc<ProgressTracker>) -> Self {
        Self {
            document: mutate::page_skeleton(),
            loader: DetailLoader::new(fetcher, options.details, progress),
            listeners: ListenerManager::new(),
            view: ViewState::default(),
            state: RefreshState::Idle,
            default_user: present(options.default_user).unwrap_or(DEFAULT_USER_ID),
        }
    }

    /// Fill the user picker and show the placeholder.
    ///
    /// Returns the number of users listed, or `None` if the list could not
    /// be fetched (the picker then keeps only its default option).
    pub async fn init(&mut self) -> Result<Option<usize>, PageError> {
        let users = self.loader.fetcher().users().await;
        let listed = users.as_ref().map(Vec::len);
        if mutate::populate_select_menu(&mut self.document, users.as_deref()).is_none() {
            tracing::debug!("user picker left with its default option");
        }
        self.view.users = users.unwrap_or_default();
        mutate::replace_main_content(&mut self.document, &MainContent::Placeholder)?;
        Ok(listed)
    }

    /// Show the posts of the user named by `value`.
    ///
    /// A value that is absent, blank, unparseable or zero selects the
    /// default user. The picker is disabled for the whole transition and
    /// re-enabled even when a document step fails.
    pub async fn select_user(&mut self, value: Option<&str>) -> Result<RefreshReport, PageError> {
        if self.state != RefreshState::Idle {
            tracing::warn!(state = ?self.state, "previous refresh did not finish; starting over");
        }
        self.set_picker_disabled(true);
        self.state = RefreshState::Loading;

        let result = self.refresh(value).await;

        self.set_picker_disabled(false);
        self.state = RefreshState::Idle;
        result
    }

    async fn refresh(&mut self, value: Option<&str>) -> Result<RefreshReport, PageError> {
        let user_id = resolve_user_id(value, self.default_user);
        tracing::info!(user_id, "loading posts");

        let posts = self.loader.fetcher().posts_by_user(user_id).await;
        let posts = posts.filter(|p| !p.is_empty());

        let unbound = self.listeners.unbind_toggle_handlers(&mut self.document);
        let main = mutate::main_container(&self.document);
        mutate::clear_children(&mut self.document, main)?;

        self.state = RefreshState::Rendering;
        let (content, details) = match render::build_post_fragment(&self.loader, posts.as_deref()).await {
            Some(view) => (MainContent::Posts(view.fragment), view.details),
            None => (MainContent::Placeholder, Vec::new()),
        };
        mutate::append_main_content(&mut self.document, &content)?;

        let bound = self.listeners.bind_toggle_handlers(&mut self.document);
        mutate::set_selected_option(&mut self.document, &user_id.to_string());

        self.view.selected_user = Some(user_id);
        self.view.posts = details;
        self.view.expanded.clear();

        tracing::info!(user_id, posts = self.view.posts.len(), "posts rendered");
        Ok(RefreshReport {
            user_id,
            post_count: self.view.posts.len(),
            unbound,
            bound,
        })
    }

    /// Flip a post's comment section and button label.
    ///
    /// A missing event or post id is a no-op. In lazy mode the first
    /// expand of a section fetches and fills its comments beforehand.
    pub async fn toggle_comments(&mut self, event: Option<ClickEvent>) -> ToggleReport {
        let Some(post_id) = event.and_then(|e| e.post_id) else {
            return ToggleReport::noop();
        };

        if self.loader.options().comments == CommentLoading::Lazy {
            self.load_comments_if_needed(post_id).await;
        }

        let section = mutate::toggle_comment_section(&mut self.document, Some(post_id));
        let button = mutate::toggle_comment_button(&mut self.document, Some(post_id));
        if section == Toggle::NotFound || button == Toggle::NotFound {
            tracing::debug!(post_id, ?section, ?button, "partial toggle");
        }

        if let Toggle::Toggled(node) = section {
            if self.document.has_class(node, HIDE_CLASS) {
                self.view.expanded.remove(&post_id);
            } else {
                self.view.expanded.insert(post_id);
            }
        }

        ToggleReport {
            post_id: Some(post_id),
            section,
            button,
        }
    }

    async fn load_comments_if_needed(&mut self, post_id: Id) {
        let Some(section) = mutate::comment_section(&self.document, post_id) else {
            return;
        };
        let unloaded = self.document.attr(section, LOADED_ATTR) == Some("false");
        if !unloaded || !self.document.has_class(section, HIDE_CLASS) {
            return;
        }

        let Some(comments) = self.loader.fetcher().comments_by_post(post_id).await else {
            // Left unloaded so the next expand retries.
            return;
        };
        if let Some(fragment) = render::build_comment_fragment(Some(&comments)) {
            if let Err(e) = self.document.append_fragment(section, &fragment) {
                tracing::warn!(post_id, "could not attach comments: {e}");
                return;
            }
        }
        if let Err(e) = self.document.set_attr(section, LOADED_ATTR, "true") {
            tracing::debug!(post_id, "could not mark comments loaded: {e}");
        }
        if let Some(detail) = self.view.posts.iter_mut().find(|d| d.post.id == post_id) {
            detail.comments = Some(comments);
        }
    }

    /// Dispatch a click on `node` to every handler bound there.
    ///
    /// Nodes without a bound handler ignore the click.
    pub async fn click(&mut self, node: NodeId) -> Vec<ToggleReport> {
        let mut reports = Vec::new();
        for listener in self.document.listeners(node, CLICK) {
            let event = ClickEvent {
                target: node,
                post_id: self.listeners.post_for_listener(listener),
            };
            reports.push(self.toggle_comments(Some(event)).await);
        }
        reports
    }

    /// Click the toggle button of `post_id`, if it is rendered.
    pub async fn click_post(&mut self, post_id: Id) -> Vec<ToggleReport> {
        match mutate::toggle_button(&self.document, post_id) {
            Some(button) => self.click(button).await,
            None => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> PageSnapshot<'_> {
        PageSnapshot {
            state: self.state,
            view: &self.view,
            document: &self.document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn listeners(&self) -> &ListenerManager {
        &self.listeners
    }

    pub fn picker_disabled(&self) -> bool {
        mutate::select_menu(&self.document).is_some_and(|s| self.document.is_disabled(s))
    }

    fn set_picker_disabled(&mut self, disabled: bool) {
        if let Some(select) = mutate::select_menu(&self.document) {
            if let Err(e) = self.document.set_disabled(select, disabled) {
                tracing::debug!(disabled, "could not update user picker: {e}");
            }
        }
    }
}

/// The user id a selection value names, or `default`.
pub fn resolve_user_id(value: Option<&str>, default: Id) -> Id {
    value
        .and_then(|v| v.trim().parse::<Id>().ok())
        .and_then(present)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, PostsApi};
    use crate::constants::{HIDE_COMMENTS, POST_ID_ATTR, SHOW_COMMENTS};
    use crate::models::{Comment, Company, Post};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned upstream that records which user ids posts were requested for.
    #[derive(Default)]
    struct Canned {
        users: Vec<User>,
        posts: HashMap<Id, Vec<Post>>,
        comments: HashMap<Id, Vec<Comment>>,
        failing_comments: Vec<Id>,
        /// Users whose post list never arrives.
        stalled_posts: Vec<Id>,
        post_requests: Mutex<Vec<Id>>,
        comment_requests: Mutex<Vec<Id>>,
    }

    #[async_trait]
    impl PostsApi for Canned {
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            Ok(self.users.clone())
        }

        async fn get_user(&self, id: Id) -> Result<User, ApiError> {
            self.users
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(ApiError::NotFound { what: "user", id })
        }

        async fn list_posts_by_user(&self, user_id: Id) -> Result<Vec<Post>, ApiError> {
            self.post_requests.lock().unwrap().push(user_id);
            if self.stalled_posts.contains(&user_id) {
                std::future::pending::<()>().await;
            }
            Ok(self.posts.get(&user_id).cloned().unwrap_or_default())
        }

        async fn list_comments_by_post(&self, post_id: Id) -> Result<Vec<Comment>, ApiError> {
            self.comment_requests.lock().unwrap().push(post_id);
            if self.failing_comments.contains(&post_id) {
                return Err(ApiError::BadStatus {
                    url: format!("http://test/comments?postId={post_id}"),
                    status: 500,
                });
            }
            Ok(self.comments.get(&post_id).cloned().unwrap_or_default())
        }
    }

    fn ann() -> User {
        User {
            id: 3,
            name: "Ann".into(),
            username: String::new(),
            email: String::new(),
            company: Company {
                name: "Acme".into(),
                catch_phrase: "Go go".into(),
            },
        }
    }

    fn post(id: Id, user_id: Id) -> Post {
        Post {
            id,
            user_id,
            title: format!("Post {id}"),
            body: "body".into(),
        }
    }

    fn comment(id: Id, post_id: Id) -> Comment {
        Comment {
            id,
            post_id,
            name: format!("comment {id}"),
            email: "x@example.com".into(),
            body: "hello".into(),
        }
    }

    fn canned() -> Canned {
        let mut api = Canned {
            users: vec![ann()],
            ..Default::default()
        };
        api.posts.insert(3, vec![post(10, 3), post(11, 3)]);
        api.posts.insert(1, vec![post(1, 1)]);
        api.comments.insert(10, vec![comment(100, 10)]);
        api
    }

    fn page(api: Arc<Canned>, comments: CommentLoading) -> Page {
        let options = PageOptions {
            details: DetailOptions {
                comments,
                max_concurrent: 4,
            },
            ..Default::default()
        };
        Page::new(Fetcher::new(api), options, Arc::new(ProgressTracker::silent()))
    }

    fn post_ids_under_main(page: &Page, tag: &str) -> Vec<String> {
        let doc = page.document();
        let main = mutate::main_container(doc).unwrap();
        doc.elements_by_tag(main, tag)
            .into_iter()
            .filter_map(|n| doc.attr(n, POST_ID_ATTR).map(str::to_string))
            .collect()
    }

    #[test]
    fn resolve_user_id_defaults() {
        assert_eq!(resolve_user_id(Some("3"), 1), 3);
        assert_eq!(resolve_user_id(Some(" 7 "), 1), 7);
        assert_eq!(resolve_user_id(None, 1), 1);
        assert_eq!(resolve_user_id(Some(""), 1), 1);
        assert_eq!(resolve_user_id(Some("abc"), 1), 1);
        assert_eq!(resolve_user_id(Some("0"), 2), 2);
    }

    #[tokio::test]
    async fn init_lists_users_and_shows_placeholder() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        assert_eq!(page.init().await, Ok(Some(1)));

        let doc = page.document();
        let select = mutate::select_menu(doc).unwrap();
        assert_eq!(doc.elements_by_tag(select, "option").len(), 2);
        let main = mutate::main_container(doc).unwrap();
        assert_eq!(doc.text_content(main), crate::constants::PLACEHOLDER_TEXT);
    }

    #[tokio::test]
    async fn selecting_user_three_renders_author_line() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.init().await.unwrap();
        let report = page.select_user(Some("3")).await.unwrap();

        assert_eq!(report.user_id, 3);
        assert_eq!(report.post_count, 2);
        let doc = page.document();
        let main = mutate::main_container(doc).unwrap();
        let articles = doc.element_children(main);
        assert_eq!(articles.len(), 2);
        let text = doc.text_content(articles[0]);
        assert!(text.contains("Post ID: 10"));
        assert!(text.contains("Author: Ann with Acme"));
        assert!(text.contains("Go go"));
    }

    #[tokio::test]
    async fn selection_without_value_defaults_to_user_one() {
        let api = Arc::new(canned());
        let mut page = page(api.clone(), CommentLoading::Eager);
        let report = page.select_user(None).await.unwrap();
        assert_eq!(report.user_id, 1);
        assert_eq!(*api.post_requests.lock().unwrap(), vec![1]);
        assert_eq!(page.view().selected_user, Some(1));
    }

    #[tokio::test]
    async fn bound_buttons_match_rendered_sections() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        let report = page.select_user(Some("3")).await.unwrap();

        assert_eq!(report.bound.len(), report.post_count);
        let buttons = post_ids_under_main(&page, "button");
        let sections = post_ids_under_main(&page, "section");
        assert_eq!(buttons, sections);
        for binding in &report.bound {
            let matching = sections
                .iter()
                .filter(|id| **id == binding.post_id.to_string())
                .count();
            assert_eq!(matching, 1);
        }
    }

    #[tokio::test]
    async fn reselecting_unbinds_previous_handlers() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        let first = page.select_user(Some("3")).await.unwrap();
        let second = page.select_user(Some("1")).await.unwrap();

        assert_eq!(second.unbound, first.bound);
        assert_eq!(second.bound.len(), 1);
        assert_eq!(page.listeners().len(), 1);
        for old in &first.bound {
            assert!(page.document().listeners(old.button, CLICK).is_empty());
        }
    }

    #[tokio::test]
    async fn user_without_posts_shows_placeholder() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        let report = page.select_user(Some("9")).await.unwrap();

        assert_eq!(report.post_count, 0);
        assert!(report.bound.is_empty());
        let doc = page.document();
        let main = mutate::main_container(doc).unwrap();
        assert_eq!(doc.text_content(main), crate::constants::PLACEHOLDER_TEXT);
    }

    #[tokio::test]
    async fn picker_is_reenabled_and_state_idle_after_refresh() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.select_user(Some("3")).await.unwrap();
        assert!(!page.picker_disabled());
        assert_eq!(page.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn picker_stays_disabled_while_posts_are_loading() {
        let mut api = canned();
        api.stalled_posts.push(3);
        let mut page = page(Arc::new(api), CommentLoading::Eager);
        page.init().await.unwrap();

        let stalled =
            tokio::time::timeout(Duration::from_millis(50), page.select_user(Some("3"))).await;
        assert!(stalled.is_err());
        assert!(page.picker_disabled());
        assert_eq!(page.state(), RefreshState::Loading);

        let report = page.select_user(Some("1")).await.unwrap();
        assert_eq!(report.user_id, 1);
        assert!(!page.picker_disabled());
        assert_eq!(page.state(), RefreshState::Idle);
        assert_eq!(post_ids_under_main(&page, "button"), vec!["1"]);
    }

    #[tokio::test]
    async fn repeated_refreshes_keep_node_count_stable() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.init().await.unwrap();
        page.select_user(Some("3")).await.unwrap();
        let settled = page.document().node_count();

        for _ in 0..5 {
            page.select_user(Some("1")).await.unwrap();
            page.select_user(Some("3")).await.unwrap();
            page.click_post(10).await;
            page.click_post(10).await;
            assert_eq!(page.document().node_count(), settled);
        }
    }

    #[tokio::test]
    async fn failed_comments_render_empty_section() {
        let mut api = canned();
        api.failing_comments.push(11);
        let mut page = page(Arc::new(api), CommentLoading::Eager);
        page.select_user(Some("3")).await.unwrap();

        let doc = page.document();
        let section = mutate::comment_section(doc, 11).unwrap();
        assert!(doc.children(section).is_empty());
        assert!(page.view().posts[1].comments.is_none());
    }

    #[tokio::test]
    async fn click_toggles_twice_back_to_start() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.select_user(Some("3")).await.unwrap();
        let button = mutate::toggle_button(page.document(), 10).unwrap();
        let section = mutate::comment_section(page.document(), 10).unwrap();

        let reports = page.click(button).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].section, Toggle::Toggled(section));
        assert_eq!(page.document().text_content(button), HIDE_COMMENTS);
        assert!(page.view().is_expanded(10));

        page.click(button).await;
        assert!(page.document().has_class(section, HIDE_CLASS));
        assert_eq!(page.document().text_content(button), SHOW_COMMENTS);
        assert!(!page.view().is_expanded(10));
    }

    #[tokio::test]
    async fn toggle_without_event_or_id_is_noop() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.select_user(Some("3")).await.unwrap();

        assert_eq!(page.toggle_comments(None).await, ToggleReport::noop());
        let main = mutate::main_container(page.document()).unwrap();
        let event = ClickEvent {
            target: main,
            post_id: None,
        };
        assert_eq!(page.toggle_comments(Some(event)).await.section, Toggle::NoOp);
    }

    #[tokio::test]
    async fn clicking_unbound_node_does_nothing() {
        let mut page = page(Arc::new(canned()), CommentLoading::Eager);
        page.select_user(Some("3")).await.unwrap();
        let main = mutate::main_container(page.document()).unwrap();
        assert!(page.click(main).await.is_empty());
        assert!(page.click_post(999).await.is_empty());
    }

    #[tokio::test]
    async fn lazy_mode_fetches_comments_on_first_expand_only() {
        let api = Arc::new(canned());
        let mut page = page(api.clone(), CommentLoading::Lazy);
        page.select_user(Some("3")).await.unwrap();
        assert!(api.comment_requests.lock().unwrap().is_empty());

        page.click_post(10).await;
        let section = mutate::comment_section(page.document(), 10).unwrap();
        assert_eq!(page.document().attr(section, LOADED_ATTR), Some("true"));
        assert!(page.document().text_content(section).contains("comment 100"));
        assert_eq!(page.view().posts[0].comments.as_ref().map(Vec::len), Some(1));

        page.click_post(10).await;
        page.click_post(10).await;
        assert_eq!(*api.comment_requests.lock().unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn lazy_mode_retries_after_failed_fetch() {
        let mut api = canned();
        api.failing_comments.push(11);
        let api = Arc::new(api);
        let mut page = page(api.clone(), CommentLoading::Lazy);
        page.select_user(Some("3")).await.unwrap();

        let report = page.click_post(11).await;
        assert!(matches!(report[0].section, Toggle::Toggled(_)));
        page.click_post(11).await;
        page.click_post(11).await;

        let section = mutate::comment_section(page.document(), 11).unwrap();
        assert_eq!(page.document().attr(section, LOADED_ATTR), Some("false"));
        assert_eq!(*api.comment_requests.lock().unwrap(), vec![11, 11]);
    }
}
