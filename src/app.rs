use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::time::Instant;

use crate::clipboard::CopyStatus;
use crate::config::Settings;
use crate::error::Result;
use crate::feed::{FeedSnapshot, FeedState, LiveFeeds};
use crate::flash::{Flash, FlashTracker};
use crate::format::truncate_address;
use crate::table::{SortField, SortState, sort_tokens};
use crate::token::{Category, Token};
use crate::ui::{Hit, hit_test};

const MAX_LOGS: usize = 100;

pub const DEFAULT_LOADING_DELAY: Duration = Duration::from_millis(1_500);

pub enum Theme {
    Light,
    Dark,
}

/// Side effects the event loop performs on behalf of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Copy(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    pub live_updates: bool,
    pub default_tab: Category,
    pub loading_delay: Duration,
    pub flash_duration: Duration,
    pub copied_duration: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Settings::default().app_options()
    }
}

pub struct App {
    pub should_quit: bool,
    pub logs: Vec<String>,
    pub theme: Theme,
    pub active: Category,
    pub live_updates: bool,
    pub sort: SortState,
    pub cursor: usize,
    /// Id of the token shown in the detail view.
    pub selected: Option<String>,
    pub show_tooltip: bool,
    feeds: LiveFeeds,
    flashes: FlashTracker,
    copy_status: CopyStatus,
    loading_until: Instant,
    now: Instant,
}

impl App {
    pub fn new(feeds: LiveFeeds, options: AppOptions, now: Instant) -> Self {
        Self {
            should_quit: false,
            logs: vec!["Welcome to Token Discovery".to_string()],
            theme: Theme::Dark,
            active: options.default_tab,
            live_updates: options.live_updates,
            sort: SortState::default(),
            cursor: 0,
            selected: None,
            show_tooltip: false,
            feeds,
            flashes: FlashTracker::new(options.flash_duration),
            copy_status: CopyStatus::new(options.copied_duration),
            loading_until: now + options.loading_delay,
            now,
        }
    }

    /// Time of the last processed frame.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn is_loading(&self) -> bool {
        self.now < self.loading_until
    }

    pub fn snapshot(&self, category: Category) -> FeedSnapshot {
        self.feeds.get(category).current()
    }

    pub fn feed_state(&self, category: Category) -> FeedState {
        self.feeds.get(category).state()
    }

    /// Active collection in table order.
    pub fn sorted_tokens(&self) -> Vec<Token> {
        sort_tokens(&self.snapshot(self.active).tokens, self.sort)
    }

    /// Latest snapshot of the selected token, if it is still in the active
    /// collection.
    pub fn selected_token(&self) -> Option<Token> {
        let id = self.selected.as_deref()?;
        self.snapshot(self.active)
            .tokens
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn flash(&self, id: &str) -> Option<Flash> {
        self.flashes.get(id, self.now)
    }

    pub fn is_copied(&self, address: &str) -> bool {
        self.copy_status.is_copied(address, self.now)
    }

    /// Called once per loop iteration before drawing.
    pub fn on_frame(&mut self, now: Instant) {
        self.now = now;
        let snapshot = self.snapshot(self.active);
        self.flashes.observe(&snapshot.tokens, now);

        if let Some(id) = self.selected.clone() {
            match self.sorted_tokens().iter().position(|t| t.id == id) {
                Some(position) => self.cursor = position,
                None => {
                    tracing::warn!(token = %id, "selected token left the active collection");
                    self.add_log(format!("{} is no longer listed; closed details.", id));
                    self.selected = None;
                }
            }
        }

        let len = snapshot.tokens.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Starts or stops feeds so that only the active tab ticks, and only
    /// while live updates are on.
    pub async fn sync_feeds(&mut self) -> Result<()> {
        self.feeds.reconcile(self.active, self.live_updates).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.feeds.shutdown().await
    }

    pub fn select_tab(&mut self, category: Category) {
        if self.active == category {
            return;
        }
        self.active = category;
        self.cursor = 0;
        self.selected = None;
        tracing::info!(category = category.slug(), "switched tab");
    }

    pub fn toggle_live(&mut self) {
        self.live_updates = !self.live_updates;
        if self.live_updates {
            self.add_log("Live updates resumed.".to_string());
        } else {
            self.add_log("Live updates paused.".to_string());
        }
    }

    pub fn request_sort(&mut self, field: SortField) {
        self.sort.request(field);
        if self.selected.is_none() {
            self.cursor = 0;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.snapshot(self.active).tokens.len();
        if len == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
        if self.selected.is_some() {
            self.open_at(self.cursor);
        }
    }

    /// Shows the token at `row` of the sorted table. Replaces any open
    /// selection directly.
    pub fn open_at(&mut self, row: usize) {
        if self.is_loading() {
            return;
        }
        if let Some(token) = self.sorted_tokens().get(row) {
            self.cursor = row;
            self.selected = Some(token.id.clone());
        }
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    /// Address of the open token, or of the row under the cursor.
    pub fn copy_address(&mut self) -> Option<String> {
        let token = match self.selected_token() {
            Some(token) => token,
            None if !self.is_loading() => self.sorted_tokens().get(self.cursor)?.clone(),
            None => return None,
        };
        self.copy_status.record(&token.address, self.now);
        self.add_log(format!("Copied {}", truncate_address(&token.address)));
        Some(token.address)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return Action::Quit;
            }
            KeyCode::Esc | KeyCode::Char('x') if self.selected.is_some() => self.close_details(),
            KeyCode::Esc => {
                self.quit();
                return Action::Quit;
            }
            KeyCode::Tab => self.select_tab(self.active.next()),
            KeyCode::BackTab => self.select_tab(self.active.previous()),
            KeyCode::Char('1') => self.select_tab(Category::New),
            KeyCode::Char('2') => self.select_tab(Category::Final),
            KeyCode::Char('3') => self.select_tab(Category::Migrated),
            KeyCode::Char(' ') => self.toggle_live(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter => self.open_at(self.cursor),
            KeyCode::Char('y') => {
                if let Some(address) = self.copy_address() {
                    return Action::Copy(address);
                }
            }
            KeyCode::Char(c) if !self.is_loading() => {
                if let Some(field) = SortField::from_key(c) {
                    self.request_sort(field);
                }
            }
            _ => {}
        }
        Action::None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> Action {
        let hit = hit_test(self, area, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                self.show_tooltip = hit == Hit::LiveToggle;
            }
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Hit::Tab(category) => self.select_tab(category),
                Hit::LiveToggle => self.toggle_live(),
                Hit::Header(field) => self.request_sort(field),
                Hit::Row(row) => self.open_at(row),
                Hit::CopyAddress => {
                    if let Some(address) = self.copy_address() {
                        return Action::Copy(address);
                    }
                }
                Hit::Backdrop | Hit::CloseDetails => self.close_details(),
                Hit::Modal | Hit::None => {}
            },
            MouseEventKind::ScrollUp => self.move_cursor(-1),
            MouseEventKind::ScrollDown => self.move_cursor(1),
            _ => {}
        }
        Action::None
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn add_log(&mut self, message: String) {
        tracing::info!("{}", message);
        self.logs.push(message);
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }
}
