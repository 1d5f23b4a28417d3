use std::time::{Duration, Instant};

use api_types::auth::{LoginRequest, RegisterRequest, TokenResponse};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Position, Rect},
};
use tokio::task::JoinHandle;

use crate::{
    accounts::{AccountsPage, GestureOutcome, Modal, PullToRefresh},
    client::{ApiError, AuthApi, Client},
    config::AppConfig,
    error::{AppError, Result},
    events::{EventBus, Subscription, Topic},
    local_state::LocalState,
    ui::{
        self,
        keymap::{AppAction, map_key},
        screens::accounts::AccountsLayout,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Login,
    Register,
    Accounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
    Confirm,
}

const LOGIN_FIELDS: &[AuthField] = &[AuthField::Username, AuthField::Password];
const REGISTER_FIELDS: &[AuthField] = &[
    AuthField::Username,
    AuthField::Email,
    AuthField::Password,
    AuthField::Confirm,
];

impl AuthField {
    pub fn all(register: bool) -> &'static [AuthField] {
        if register {
            REGISTER_FIELDS
        } else {
            LOGIN_FIELDS
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::Confirm => "Confirm",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::Confirm)
    }
}

/// Shared buffer behind the login and register screens.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub focus: Option<AuthField>,
    pub message: Option<String>,
}

impl AuthForm {
    pub fn new(username: Option<&str>) -> Self {
        Self {
            username: username.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    pub fn focus(&self) -> AuthField {
        self.focus.unwrap_or(AuthField::Username)
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.username,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::Confirm => &self.password2,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.focus() {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Confirm => &mut self.password2,
        }
    }

    fn step(&mut self, register: bool, forward: bool) {
        let fields = AuthField::all(register);
        let current = fields
            .iter()
            .position(|field| *field == self.focus())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = Some(fields[next]);
    }

    pub fn next_field(&mut self, register: bool) {
        self.step(register, true);
    }

    pub fn prev_field(&mut self, register: bool) {
        self.step(register, false);
    }

    pub fn push_char(&mut self, ch: char) {
        self.active_mut().push(ch);
    }

    pub fn pop_char(&mut self) {
        self.active_mut().pop();
    }

    /// Clears secrets and the message; keeps the username for the next try.
    pub fn reset(&mut self) {
        *self = Self::new(Some(&self.username));
    }

    pub fn login_request(&self) -> std::result::Result<LoginRequest, String> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err("Enter username and password".to_string());
        }
        Ok(LoginRequest {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn register_request(&self) -> std::result::Result<RegisterRequest, String> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err("Fill in every field".to_string());
        }
        if self.password != self.password2 {
            return Err("Passwords do not match".to_string());
        }
        Ok(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            password2: self.password2.clone(),
        })
    }
}

/// Inline text for a rejected login or registration.
pub fn auth_failure_message(register: bool, err: &ApiError) -> String {
    let action = if register { "Registration" } else { "Login" };
    match err {
        ApiError::Http { status, message } => {
            format!("{action} failed ({}): {message}", status.as_u16())
        }
        ApiError::Network(_) => format!("{action} failed: {}", err.status_label()),
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub auth: AuthForm,
    pub accounts: AccountsPage<Client>,
    pub gesture: PullToRefresh,
    /// Status shown in the header while a request is in flight.
    pub busy: Option<&'static str>,
    pub timezone: Tz,
    pub username: Option<String>,
    pub base_url: String,
}

enum AuthRequest {
    Login(LoginRequest),
    Register(RegisterRequest),
}

pub struct App {
    config: AppConfig,
    client: Client,
    bus: EventBus,
    subscription: Option<Subscription>,
    local: LocalState,
    viewport: Rect,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Timezone(format!("{}: {err}", config.timezone)))?;
        let local = LocalState::load(&config.state_path)?;
        let token = config
            .token
            .clone()
            .or_else(|| local.token().map(str::to_string));

        let state = AppState {
            screen: if token.is_some() {
                Screen::Accounts
            } else {
                Screen::Landing
            },
            auth: AuthForm::new(local.username.as_deref()),
            accounts: AccountsPage::new(client.clone(), token),
            gesture: PullToRefresh::default(),
            busy: None,
            timezone,
            username: local.username.clone(),
            base_url: config.base_url.clone(),
        };
        Ok(Self {
            config,
            client,
            bus: EventBus::new(),
            subscription: None,
            local,
            viewport: Rect::default(),
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let ticker = self
            .config
            .refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(|secs| spawn_refresh_ticker(self.bus.clone(), Duration::from_secs(secs)));

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        if let Some(ticker) = ticker {
            ticker.abort();
        }
        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let tick_rate = Duration::from_millis(100);
        if self.state.screen == Screen::Accounts {
            self.enter_accounts();
            self.reload(terminal).await?;
        }

        while !self.should_quit {
            self.draw(terminal)?;

            if self.apply_updates(terminal).await? {
                continue;
            }
            self.state.gesture.tick(Instant::now());

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(terminal, key).await?;
                    }
                    Event::Mouse(mouse) => self.handle_mouse(terminal, mouse).await?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Reloads once if any `accounts:update` arrived since the last call.
    async fn apply_updates<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<bool> {
        let pending = self
            .subscription
            .as_mut()
            .map(Subscription::drain)
            .unwrap_or(0);
        if pending == 0 {
            return Ok(false);
        }
        tracing::debug!(pending, "accounts update received");
        self.reload(terminal).await?;
        Ok(true)
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let state = &self.state;
        let viewport = &mut self.viewport;
        terminal
            .draw(|frame| {
                *viewport = frame.area();
                ui::render(frame, state);
            })
            .map_err(|err| AppError::Terminal(err.to_string()))?;
        Ok(())
    }

    fn layout(&self) -> AccountsLayout {
        ui::screens::accounts::layout_for(self.viewport, &self.state)
    }

    async fn handle_key<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        key: KeyEvent,
    ) -> Result<()> {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.screen {
            Screen::Landing => match action {
                AppAction::Input('l') => self.show_auth(Screen::Login),
                AppAction::Input('r') => self.show_auth(Screen::Register),
                AppAction::Input('q') | AppAction::Cancel => self.should_quit = true,
                _ => {}
            },
            Screen::Login => self.handle_auth_key(terminal, action, false).await?,
            Screen::Register => self.handle_auth_key(terminal, action, true).await?,
            Screen::Accounts => self.handle_accounts_key(terminal, action).await?,
        }
        Ok(())
    }

    fn show_auth(&mut self, screen: Screen) {
        self.state.auth.reset();
        self.state.screen = screen;
    }

    async fn handle_auth_key<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        action: AppAction,
        register: bool,
    ) -> Result<()> {
        let form = &mut self.state.auth;
        match action {
            AppAction::Cancel => {
                form.reset();
                self.state.screen = Screen::Landing;
            }
            AppAction::NextField | AppAction::Down => form.next_field(register),
            AppAction::PrevField | AppAction::Up => form.prev_field(register),
            AppAction::Backspace => form.pop_char(),
            AppAction::Input(ch) => form.push_char(ch),
            AppAction::Submit => self.submit_auth(terminal, register).await?,
            AppAction::Quit | AppAction::None => {}
        }
        Ok(())
    }

    async fn submit_auth<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        register: bool,
    ) -> Result<()> {
        let request = if register {
            self.state.auth.register_request().map(AuthRequest::Register)
        } else {
            self.state.auth.login_request().map(AuthRequest::Login)
        };
        let request = match request {
            Ok(request) => request,
            Err(message) => {
                self.state.auth.message = Some(message);
                return Ok(());
            }
        };

        self.state.auth.message = None;
        self.state.busy = Some(if register {
            "Creating account..."
        } else {
            "Signing in..."
        });
        self.draw(terminal)?;
        let result = match &request {
            AuthRequest::Login(payload) => self.client.login(payload).await,
            AuthRequest::Register(payload) => self.client.register(payload).await,
        };
        self.state.busy = None;

        match result {
            Ok(tokens) => self.start_session(tokens)?,
            Err(err) => {
                tracing::warn!("authentication failed: {err}");
                self.state.auth.message = Some(auth_failure_message(register, &err));
            }
        }
        Ok(())
    }

    fn start_session(&mut self, tokens: TokenResponse) -> Result<()> {
        let TokenResponse {
            user,
            access,
            refresh,
        } = tokens;
        tracing::info!(username = %user.username, "signed in");

        self.local
            .set_session(&user.username, access.clone(), refresh);
        self.local.save(&self.config.state_path)?;
        self.state.username = Some(user.username);
        self.state.auth.reset();
        self.state.accounts.set_token(Some(access));

        self.enter_accounts();
        self.bus.publish(Topic::AccountsUpdate);
        Ok(())
    }

    fn enter_accounts(&mut self) {
        self.state.screen = Screen::Accounts;
        let subscription = self.bus.subscribe(Topic::AccountsUpdate);
        tracing::debug!(topic = subscription.topic().name(), "accounts screen listening");
        self.subscription = Some(subscription);
    }

    fn logout(&mut self) -> Result<()> {
        self.subscription = None;
        self.state.accounts.reset();
        self.state.accounts.set_token(None);
        self.state.gesture = PullToRefresh::default();
        self.local.clear_session();
        self.local.save(&self.config.state_path)?;
        self.state.screen = Screen::Landing;
        tracing::info!("signed out");
        Ok(())
    }

    async fn handle_accounts_key<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        action: AppAction,
    ) -> Result<()> {
        let page = &mut self.state.accounts;
        if page.alert().is_some() {
            if matches!(action, AppAction::Submit | AppAction::Cancel) {
                page.dismiss_alert();
            }
            return Ok(());
        }

        match page.modal() {
            Modal::Editor { .. } => match action {
                AppAction::Cancel => page.close_modal(),
                AppAction::Submit => self.save(terminal).await?,
                _ => {
                    if let Some(draft) = page.draft_mut() {
                        match action {
                            AppAction::NextField | AppAction::Down => draft.next_field(),
                            AppAction::PrevField | AppAction::Up => draft.prev_field(),
                            AppAction::Backspace => draft.pop_char(),
                            AppAction::Input(ch) => draft.push_char(ch),
                            _ => {}
                        }
                    }
                }
            },
            Modal::ConfirmDelete(_) => match action {
                AppAction::Input('y') | AppAction::Submit => self.delete(terminal).await?,
                AppAction::Input('n') | AppAction::Cancel => page.close_modal(),
                _ => {}
            },
            Modal::Closed => match action {
                AppAction::Input('r') => self.reload(terminal).await?,
                AppAction::Input('a' | 'n') => page.open_create(),
                AppAction::Input('e') | AppAction::Submit => page.open_edit_selected(),
                AppAction::Input('d') => page.confirm_delete_selected(),
                AppAction::Down | AppAction::Input('j') => page.select_next(),
                AppAction::Up | AppAction::Input('k') => page.select_prev(),
                AppAction::Input('x') => self.logout()?,
                AppAction::Input('q') => self.should_quit = true,
                _ => {}
            },
        }
        Ok(())
    }

    async fn reload<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.state.busy = Some("Refreshing...");
        self.draw(terminal)?;
        // failures land in the banner
        let _ = self.state.accounts.load().await;
        self.state.busy = None;
        Ok(())
    }

    async fn save<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if self.state.accounts.is_saving() {
            return Ok(());
        }
        self.state.busy = Some("Saving...");
        self.draw(terminal)?;
        // failures are reported through the alert
        let _ = self.state.accounts.save().await;
        self.state.busy = None;
        Ok(())
    }

    async fn delete<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let Some(ticket) = self.state.accounts.begin_delete() else {
            return Ok(());
        };
        tracing::debug!(id = %ticket.target().id, name = %ticket.target().name, "deleting account");
        // the row is already gone on screen before the request goes out
        self.state.busy = Some("Deleting...");
        self.draw(terminal)?;
        let _ = self.state.accounts.complete_delete(ticket).await;
        self.state.busy = None;
        Ok(())
    }

    async fn handle_mouse<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mouse: MouseEvent,
    ) -> Result<()> {
        let page = &self.state.accounts;
        if self.state.screen != Screen::Accounts
            || page.alert().is_some()
            || *page.modal() != Modal::Closed
        {
            return Ok(());
        }

        let layout = self.layout();
        let y = f32::from(mouse.row) * self.config.pull_row_units;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let position = Position::new(mouse.column, mouse.row);
                if !layout.list.contains(position) {
                    return Ok(());
                }
                if let Some(index) = layout.card_at(mouse.row) {
                    self.state.accounts.select(index);
                }
                self.state.gesture.press(y, layout.offset);
            }
            MouseEventKind::Drag(MouseButton::Left) => self.state.gesture.drag(y, layout.offset),
            MouseEventKind::Up(MouseButton::Left) => {
                let loading = self.state.accounts.is_loading() || self.state.busy.is_some();
                if self.state.gesture.release(loading) == GestureOutcome::Refresh {
                    tracing::debug!("pull to refresh");
                    self.reload(terminal).await?;
                    self.state.gesture.refresh_finished(Instant::now());
                }
            }
            MouseEventKind::ScrollDown => self.state.accounts.select_next(),
            MouseEventKind::ScrollUp => self.state.accounts.select_prev(),
            _ => {}
        }
        Ok(())
    }
}

/// Publishes `accounts:update` every `period`; the first tick is skipped
/// since the screen loads on entry.
fn spawn_refresh_ticker(bus: EventBus, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            bus.publish(Topic::AccountsUpdate);
        }
    })
}
