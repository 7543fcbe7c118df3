//! Application state management for the Bold East Africa reader
//!
//! This module contains the main application state: which screen is mounted,
//! the navigation history, list selection and scroll position, and keyboard
//! handling for every view.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use tracing::info;

use crate::cli::StartupConfig;
use crate::data::{Article, Campaign, Category};
use crate::screens::{
    ArticleDetail, ArticleModel, CategoryFeed, CategoryModel, HomeFeed, HomeModel,
    RevalidatePolicy, ScreenContext, ScreenHandle, ScreenState, ViewTracker, CATEGORIES_KEY,
};

/// How long each sponsored campaign stays on screen
pub const CAMPAIGN_ROTATION: Duration = Duration::from_secs(8);

/// Upper bound for the article scroll offset
const MAX_SCROLL: u16 = 1000;

/// A place in the reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    /// Landing feed
    #[default]
    Home,
    /// Category feed by slug
    Category(String),
    /// Article by numeric id or slug
    Article(String),
}

/// The mounted screen, one handle per route kind
enum ActiveScreen {
    Home(ScreenHandle<HomeModel>),
    Category(ScreenHandle<CategoryModel>),
    Article(ScreenHandle<ArticleModel>),
}

impl ActiveScreen {
    fn view(&self) -> View {
        match self {
            ActiveScreen::Home(handle) => View::Home(handle.state()),
            ActiveScreen::Category(handle) => View::Category(handle.state()),
            ActiveScreen::Article(handle) => View::Article(handle.state()),
        }
    }

    fn refresh(&self) {
        match self {
            ActiveScreen::Home(handle) => handle.refresh(),
            ActiveScreen::Category(handle) => handle.refresh(),
            ActiveScreen::Article(handle) => handle.refresh(),
        }
    }
}

/// Snapshot of the mounted screen's state, taken once per frame
#[derive(Debug, Clone)]
pub enum View {
    Home(ScreenState<HomeModel>),
    Category(ScreenState<CategoryModel>),
    Article(ScreenState<ArticleModel>),
}

impl View {
    /// Nothing to show yet
    pub fn is_loading(&self) -> bool {
        match self {
            View::Home(state) => state.loading,
            View::Category(state) => state.loading,
            View::Article(state) => state.loading,
        }
    }

    /// Articles the list selection moves over
    pub fn list(&self) -> Vec<Article> {
        match self {
            View::Home(state) => state
                .model
                .as_ref()
                .map(|model| model.latest().into_iter().cloned().collect())
                .unwrap_or_default(),
            View::Category(state) => state
                .model
                .as_ref()
                .map(|model| model.articles.clone())
                .unwrap_or_default(),
            View::Article(_) => Vec::new(),
        }
    }
}

/// Open category picker
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPicker {
    pub categories: Vec<Category>,
    pub selected: usize,
}

/// Main application struct managing state and navigation
pub struct App {
    ctx: ScreenContext,
    policy: RevalidatePolicy,
    tracker: ViewTracker,
    screen: ActiveScreen,
    /// Current route
    pub route: Route,
    /// Routes to return to on Esc, with their list selection
    pub history: Vec<(Route, usize)>,
    /// Index of the selected article in list views
    pub selected_index: usize,
    /// Scroll offset for the article reader
    pub scroll_offset: u16,
    /// Category picker overlay, when open
    pub picker: Option<CategoryPicker>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    rotation_started: Instant,
}

impl App {
    /// Creates the app and mounts the startup route
    ///
    /// Must be called inside a tokio runtime; mounting spawns the screen's
    /// revalidation task.
    pub fn new(ctx: ScreenContext, startup: StartupConfig) -> Self {
        Self::with_policy(ctx, startup, RevalidatePolicy::default())
    }

    pub fn with_policy(ctx: ScreenContext, startup: StartupConfig, policy: RevalidatePolicy) -> Self {
        ctx.connectivity.set_online(!startup.offline);
        let tracker = ViewTracker::new();
        let screen = mount(&startup.route, &ctx, &policy, &tracker);
        Self {
            ctx,
            policy,
            tracker,
            screen,
            route: startup.route,
            history: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            picker: None,
            show_help: false,
            should_quit: false,
            rotation_started: Instant::now(),
        }
    }

    /// State of the mounted screen
    pub fn view(&self) -> View {
        self.screen.view()
    }

    pub fn is_online(&self) -> bool {
        self.ctx.connectivity.is_online()
    }

    /// Currently selected article in a list view
    pub fn selected_article(&self) -> Option<Article> {
        self.view().list().into_iter().nth(self.selected_index)
    }

    /// Campaign for the sponsored slot right now
    pub fn sponsored<'a>(&self, campaigns: &[&'a Campaign]) -> Option<&'a Campaign> {
        rotate(campaigns.len(), self.rotation_started.elapsed()).map(|index| campaigns[index])
    }

    /// Mounts `route`, remembering the current one for Esc
    pub fn navigate(&mut self, route: Route) {
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push((previous, self.selected_index));
        self.mount_current(0);
    }

    /// Returns to the previous route; quits from the first screen
    pub fn back(&mut self) {
        match self.history.pop() {
            Some((route, selected)) => {
                self.route = route;
                self.mount_current(selected);
            }
            None => self.should_quit = true,
        }
    }

    /// Forces a revalidation pass on the mounted screen
    pub fn refresh(&self) {
        self.screen.refresh();
    }

    pub fn toggle_offline(&self) {
        let online = !self.is_online();
        info!(online, "connectivity toggled");
        self.ctx.connectivity.set_online(online);
    }

    /// Opens the category picker with the persisted category list
    pub fn open_picker(&mut self) {
        let categories = self
            .ctx
            .local
            .get::<Vec<Category>>(CATEGORIES_KEY)
            .map(|record| record.data)
            .unwrap_or_default();
        let selected = match &self.route {
            Route::Category(slug) => categories.iter().position(|c| &c.slug == slug).unwrap_or(0),
            _ => 0,
        };
        self.picker = Some(CategoryPicker {
            categories,
            selected,
        });
    }

    fn mount_current(&mut self, selected: usize) {
        // Replacing the handle drops, and so unmounts, the previous screen.
        self.screen = mount(&self.route, &self.ctx, &self.policy, &self.tracker);
        self.selected_index = selected;
        self.scroll_offset = 0;
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection, or scroll the article
    /// - `Enter`: Open the selected article
    /// - `1`-`4`: Open a related article from the reader
    /// - `Esc`: Go back (quits from the first screen)
    /// - `c`: Category picker
    /// - `r`: Refresh now
    /// - `o`: Toggle offline mode
    /// - `?`: Help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        if self.picker.is_some() {
            self.handle_picker_key(key_event);
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.back(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('c') => self.open_picker(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('o') => self.toggle_offline(),
            _ => match self.route {
                Route::Article(_) => self.handle_reader_key(key_event),
                Route::Home | Route::Category(_) => self.handle_list_key(key_event),
            },
        }
    }

    fn handle_list_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            KeyCode::Enter => {
                if let Some(article) = self.selected_article() {
                    self.navigate(Route::Article(article.id.to_string()));
                }
            }
            _ => {}
        }
    }

    fn handle_reader_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.scroll_offset = self.scroll_offset.saturating_add(10).min(MAX_SCROLL);
            }
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::Char('g') => self.scroll_offset = 0,
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                let related = match self.view() {
                    View::Article(state) => state.model.and_then(|m| m.related.into_iter().nth(index)),
                    _ => None,
                };
                if let Some(article) = related {
                    self.navigate(Route::Article(article.id.to_string()));
                }
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key_event: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        let count = picker.categories.len();

        match key_event.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => self.picker = None,
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                picker.selected = (picker.selected + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                picker.selected = (picker.selected + 1) % count;
            }
            KeyCode::Enter => {
                let slug = picker.categories.get(picker.selected).map(|c| c.slug.clone());
                self.picker = None;
                if let Some(slug) = slug {
                    if self.route != Route::Category(slug.clone()) {
                        self.navigate(Route::Category(slug));
                    }
                }
            }
            _ => {}
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.view().list().len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index.min(count - 1) + count - 1) % count;
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.view().list().len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < MAX_SCROLL {
            self.scroll_offset += 1;
        }
    }
}

fn mount(route: &Route, ctx: &ScreenContext, policy: &RevalidatePolicy, tracker: &ViewTracker) -> ActiveScreen {
    info!(?route, "mounting screen");
    let ctx = ctx.clone();
    let policy = policy.clone();
    match route {
        Route::Home => ActiveScreen::Home(ScreenHandle::mount(HomeFeed, ctx, policy)),
        Route::Category(slug) => {
            ActiveScreen::Category(ScreenHandle::mount(CategoryFeed::new(slug.clone()), ctx, policy))
        }
        Route::Article(ident) => ActiveScreen::Article(ScreenHandle::mount(
            ArticleDetail::new(ident.clone(), tracker.clone()),
            ctx,
            policy,
        )),
    }
}

/// Index of the campaign shown after `elapsed`, if there is any
pub fn rotate(len: usize, elapsed: Duration) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let step = elapsed.as_secs() / CAMPAIGN_ROTATION.as_secs();
    Some((step % len as u64) as usize)
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::{loaded_app, settle};
    use crate::screens::fixtures::{context, serve_all};
    use crossterm::event::KeyModifiers;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(key_event(code));
    }

    #[test]
    fn test_rotate_cycles_campaigns() {
        assert_eq!(rotate(0, Duration::from_secs(100)), None);
        assert_eq!(rotate(3, Duration::ZERO), Some(0));
        assert_eq!(rotate(3, CAMPAIGN_ROTATION), Some(1));
        assert_eq!(rotate(3, CAMPAIGN_ROTATION * 3), Some(0));
    }

    #[test]
    fn test_route_default_is_home() {
        assert_eq!(Route::default(), Route::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_lists_published_newest_first() {
        let (app, _dir) = loaded_app(Route::Home).await;

        let ids: Vec<u64> = app.view().list().iter().map(|a| a.id).collect();

        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(app.selected_article().map(|a| a.id), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_wraps() {
        let (mut app, _dir) = loaded_app(Route::Home).await;

        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_index, 2);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_opens_article_and_esc_returns() {
        let (mut app, _dir) = loaded_app(Route::Home).await;
        press(&mut app, KeyCode::Down);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route, Route::Article("1".to_string()));
        settle(&app).await;
        match app.view() {
            View::Article(state) => assert_eq!(state.model.map(|m| m.article.id), Some(1)),
            other => panic!("expected article view, got {:?}", other),
        }

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Route::Home);
        assert_eq!(app.selected_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_related_article_shortcut() {
        let (mut app, _dir) = loaded_app(Route::Home).await;
        app.navigate(Route::Article("1".to_string()));
        settle(&app).await;

        press(&mut app, KeyCode::Char('1'));

        assert_eq!(app.route, Route::Article("3".to_string()));
        assert_eq!(app.history.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reader_scroll_bounds() {
        let (mut app, _dir) = loaded_app(Route::Home).await;
        app.navigate(Route::Article("1".to_string()));

        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll_offset, 0);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.scroll_offset, 2);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_picker_navigates() {
        let (mut app, _dir) = loaded_app(Route::Home).await;

        press(&mut app, KeyCode::Char('c'));
        let picker = app.picker.clone().expect("picker should open");
        assert_eq!(picker.categories.len(), 2);

        press(&mut app, KeyCode::Enter);
        assert!(app.picker.is_none());
        assert_eq!(app.route, Route::Category("news".to_string()));

        settle(&app).await;
        let ids: Vec<u64> = app.view().list().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_picker_esc_closes_without_navigating() {
        let (mut app, _dir) = loaded_app(Route::Home).await;

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Esc);

        assert!(app.picker.is_none());
        assert_eq!(app.route, Route::Home);
        assert!(!app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_overlay_intercepts_keys() {
        let (mut app, _dir) = loaded_app(Route::Home).await;

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route, Route::Home);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_esc_on_first_screen_quits() {
        let (mut app, _dir) = loaded_app(Route::Home).await;

        press(&mut app, KeyCode::Esc);

        assert!(app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_offline_and_toggle() {
        let (ctx, transport, _dir) = context();
        serve_all(&transport);
        let startup = StartupConfig {
            route: Route::Category("business".to_string()),
            offline: true,
        };

        let mut app = App::new(ctx, startup);
        assert!(!app.is_online());

        settle(&app).await;
        assert_eq!(app.view().list().len(), 1);

        press(&mut app, KeyCode::Char('o'));
        assert!(app.is_online());
    }
}
