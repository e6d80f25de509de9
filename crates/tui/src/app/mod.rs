use std::time::{Duration, Instant};

use admin_core::{
    ConnectionState, ErrorKind, FetchOutcome, Gateway, LiveChannel, LiveEvent, SessionStore,
    live::CONNECT_ERROR_MESSAGE, views::Outcome,
};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    error::Result,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

mod actions;
pub mod forms;
pub mod state;

pub use state::{
    AppState, ConfirmAction, ConfirmState, Detail, LoginField, Mode, Screen, Section,
};

const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

pub struct App {
    config: AppConfig,
    gateway: Gateway,
    store: SessionStore,
    live: Option<LiveChannel>,
    live_events: Option<broadcast::Receiver<LiveEvent>>,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let gateway = Gateway::new(&config.gateway())?;
        let store = SessionStore::new(&config.state_path);
        let session = store.load().unwrap_or_else(|err| {
            warn!(error = %err, path = %store.path().display(), "ignoring unreadable session file");
            Default::default()
        });
        let state = AppState::new(
            session,
            config.base_url.clone(),
            config.username.clone(),
            config.auto_refresh(),
        );

        Ok(Self {
            config,
            gateway,
            store,
            live: None,
            live_events: None,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.restore_session().await;
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        self.disconnect_live().await;
        ui::restore_terminal(&mut terminal)?;
        info!("admin console closed");
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.state))?;

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key).await;
            }
            self.tick().await;
        }

        Ok(())
    }

    async fn tick(&mut self) {
        let now = Instant::now();
        self.state.expire_toasts(now, self.config.toast_ttl());
        if self.state.screen != Screen::Console {
            return;
        }

        self.drain_live().await;
        if self.state.section == Section::GameResults
            && let Some(outcome) = self
                .state
                .game_results
                .tick(&self.gateway, &self.state.session, now)
                .await
        {
            self.after_fetch(outcome).await;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Login => self.handle_login_key(action).await,
            Screen::Console => self.handle_console_key(action).await,
        }
    }

    async fn handle_login_key(&mut self, action: AppAction) {
        match action {
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                self.state.login.focus = match self.state.login.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            AppAction::Submit => self.attempt_login().await,
            AppAction::Backspace => {
                self.login_field_mut().pop();
            }
            AppAction::Input(ch) => self.login_field_mut().push(ch),
            AppAction::Cancel => self.should_quit = true,
            AppAction::Quit | AppAction::Left | AppAction::Right | AppAction::None => {}
        }
    }

    fn login_field_mut(&mut self) -> &mut String {
        match self.state.login.focus {
            LoginField::Username => &mut self.state.login.username,
            LoginField::Password => &mut self.state.login.password,
        }
    }

    async fn attempt_login(&mut self) {
        let username = self.state.login.username.trim().to_string();
        let password = self.state.login.password.clone();
        if username.is_empty() || password.is_empty() {
            self.state.login.message = Some("Please enter username and password".to_string());
            return;
        }

        match self.gateway.login(&username, &password).await {
            Ok(res) => {
                self.state.session.set_token(res.token);
                self.persist_session();
                self.state.user = Some(res.user);
                self.state.login.password.clear();
                self.state.login.message = None;
                self.enter_console();
            }
            Err(err) => {
                warn!(error = %err, %username, "login failed");
                self.state.login.message = Some(err.to_string());
            }
        }
    }

    /// Reuses a stored token when the backend still accepts it.
    async fn restore_session(&mut self) {
        if !self.state.session.is_authenticated() {
            return;
        }
        match self.gateway.verify(&self.state.session).await {
            Ok(user) => {
                self.state.user = user;
                self.enter_console();
            }
            Err(err) => {
                warn!(error = %err, "stored session not usable");
                if err.kind() == ErrorKind::Unauthorized {
                    self.state.session.clear_token();
                    self.persist_session();
                }
                self.state.login.message = Some(err.to_string());
            }
        }
    }

    fn enter_console(&mut self) {
        self.state.screen = Screen::Console;
        self.state.section = Section::Dashboard;
        self.state.mode = Mode::Normal;
        self.connect_live();
        info!(
            user = self.state.user.as_ref().map_or("?", |user| user.username.as_str()),
            "console ready"
        );
    }

    fn persist_session(&mut self) {
        if let Err(err) = self.store.save(&self.state.session) {
            warn!(error = %err, "failed to persist session");
            self.state
                .notice
                .warning(format!("Could not save session: {err}"));
        }
    }

    fn connect_live(&mut self) {
        match LiveChannel::connect(self.config.live(), &self.state.session) {
            Ok((channel, events)) => {
                self.live = Some(channel);
                self.live_events = Some(events);
            }
            Err(err) => {
                warn!(error = %err, "live channel not started");
                self.state.notice.error(CONNECT_ERROR_MESSAGE);
            }
        }
    }

    async fn disconnect_live(&mut self) {
        self.live_events = None;
        if let Some(live) = self.live.take() {
            live.close().await;
        }
        self.state.live = ConnectionState::Disconnected;
    }

    async fn drain_live(&mut self) {
        if let Some(live) = &self.live {
            self.state.live = live.state();
        }
        let Some(rx) = self.live_events.as_mut() else {
            return;
        };

        let mut events = Vec::new();
        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "live events dropped");
                }
                Err(TryRecvError::Closed) => {
                    closed = true;
                    break;
                }
            }
        }
        if closed {
            debug!("live event stream ended");
            self.live_events = None;
        }
        for event in events {
            self.apply_live(event).await;
        }
    }

    async fn apply_live(&mut self, event: LiveEvent) {
        debug!(?event, "live event");
        self.state.dashboard.handle_live(&event);
        self.state.cashiers.handle_live(&event);

        if self.state.shops.handle_live(&event) && self.state.loaded[Section::Shops.index()] {
            let outcome = self
                .state
                .shops
                .list_mut()
                .fetch_quietly(&self.gateway, &self.state.session)
                .await;
            self.after_fetch(outcome).await;
        }
        if self.state.shop_owners.handle_live(&event)
            && self.state.loaded[Section::ShopOwners.index()]
        {
            let outcome = self
                .state
                .shop_owners
                .list_mut()
                .fetch_quietly(&self.gateway, &self.state.session)
                .await;
            self.after_fetch(outcome).await;
        }
        if let LiveEvent::ConnectError(message) = &event {
            self.state.notice.error(message.clone());
        }
        self.state.clamp_selection();
    }

    /// A 401 anywhere sends the operator back to the login screen.
    async fn after_fetch(&mut self, outcome: FetchOutcome) {
        if outcome == FetchOutcome::Failed(ErrorKind::Unauthorized) {
            self.session_expired().await;
        } else {
            self.state.clamp_selection();
        }
    }

    async fn after_outcome(&mut self, outcome: &Outcome) {
        if outcome.needs_login() {
            self.session_expired().await;
        } else {
            self.state.clamp_selection();
        }
    }

    async fn session_expired(&mut self) {
        warn!("session expired");
        self.end_session(Some(SESSION_EXPIRED_MESSAGE)).await;
    }

    async fn logout(&mut self) {
        if let Err(err) = self.gateway.logout(&self.state.session).await {
            debug!(error = %err, "logout request failed");
        }
        self.end_session(None).await;
        info!("logged out");
    }

    async fn end_session(&mut self, message: Option<&str>) {
        self.disconnect_live().await;
        if let Err(err) = self.store.logout(&mut self.state.session) {
            warn!(error = %err, "failed to clear stored session");
            self.state.session.clear_token();
        }
        self.state.reset_views(self.config.auto_refresh());
        self.state.screen = Screen::Login;
        self.state.login.focus = LoginField::Username;
        self.state.login.message = message.map(str::to_string);
    }
}
