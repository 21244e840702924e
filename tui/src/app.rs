//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, frame tick, background-task notices)
//! - Controllers from `teller-core` doing the actual work
//! - Render functions consuming controller snapshots
//!
//! The surface holds no business logic. Key events become controller
//! calls; long-running calls are spawned and report back through a
//! notice channel; the chat controller's confirm dialog arrives through
//! a modal queue and resolves on a keypress.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{broadcast, mpsc};

use teller_core::admin::parse_filter;
use teller_core::models::{AdminLogEntry, Session};
use teller_core::validators::FormReport;
use teller_core::voice::{NullSpeechPlatform, VoiceAdapter, VoiceError};
use teller_core::{
    build_api, AdminController, ApiMode, AppEvent, AuthController, AuthError, ChatController,
    CreateGoalError, DashboardController, EventBus, Goal, GoalForm, LogFilter, SessionStore,
    TellerConfig, TurnOutcome,
};

use crate::prompt::TuiPrompt;
use crate::views;
use crate::widgets::{ActiveModal, ModalRequest, ToastLevel, ToastStack};

/// Which page owns the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Sign-in form
    Login,
    /// Sign-up form
    Register,
    /// Goals and transactions
    Dashboard,
    /// Operation log
    Admin,
}

/// Reports from spawned background tasks back to the event loop
pub enum Notice {
    /// Show a toast
    Toast(ToastLevel, String),
    /// Sign-in/up finished successfully
    LoggedIn(Session),
    /// Sign-in/up failed
    AuthFailed {
        /// True when the register form was submitted
        register: bool,
        /// What went wrong
        error: AuthError,
    },
    /// Dashboard reload finished
    DashboardLoaded(Result<(), String>),
    /// Goal submission finished
    GoalCreated(Result<Goal, CreateGoalError>),
    /// Admin log fetch finished
    AdminLoaded(Result<usize, String>),
    /// A chat turn ran to completion
    ChatTurn(TurnOutcome),
}

/// Login form state
#[derive(Default)]
pub struct LoginForm {
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Focused field index
    pub focus: usize,
    /// Inline validation annotations
    pub report: FormReport,
}

/// Register form state
#[derive(Default)]
pub struct RegisterForm {
    /// Name field
    pub name: String,
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Focused field index
    pub focus: usize,
    /// Inline validation annotations
    pub report: FormReport,
}

/// Create-goal form overlay state
#[derive(Default)]
pub struct GoalFormState {
    /// Raw field values
    pub form: GoalForm,
    /// Focused field index
    pub focus: usize,
    /// Inline validation annotations
    pub report: FormReport,
}

/// Admin filter row state
#[derive(Default)]
pub struct AdminFilterForm {
    /// User id filter, unparsed
    pub user_id: String,
    /// Action type filter
    pub action_type: String,
    /// Status filter, unparsed
    pub status: String,
    /// Focused field index
    pub focus: usize,
    /// Inline parse error
    pub error: Option<String>,
}

/// Main application state
pub struct App {
    running: bool,
    /// Active page
    pub screen: Screen,
    config: TellerConfig,
    session: SessionStore,

    // === Controllers ===
    /// Sign-in/out
    pub auth: Arc<AuthController>,
    /// Goals and transactions
    pub dashboard: Arc<DashboardController>,
    /// Operation log
    pub admin: Arc<AdminController>,
    /// Assistant
    pub chat: Arc<ChatController>,

    // === Plumbing ===
    bus_rx: broadcast::Receiver<AppEvent>,
    notice_tx: mpsc::Sender<Notice>,
    notice_rx: mpsc::Receiver<Notice>,
    modal_tx: mpsc::Sender<ModalRequest>,
    modal_rx: mpsc::Receiver<ModalRequest>,

    // === UI State ===
    /// Confirm dialog currently on screen
    pub modal: Option<ActiveModal>,
    /// Live toasts
    pub toasts: ToastStack,
    /// Login form
    pub login_form: LoginForm,
    /// Register form
    pub register_form: RegisterForm,
    /// Create-goal overlay, when open
    pub goal_form: Option<GoalFormState>,
    /// Admin filter row
    pub admin_filter: AdminFilterForm,
    /// Client-side refilter view over the loaded log, when active
    pub admin_view: Option<Vec<AdminLogEntry>>,
    /// Whether the chat panel overlays the screen
    pub chat_open: bool,
    /// Chat input buffer
    pub chat_input: String,
    /// Dashboard fetch in flight
    pub dashboard_loading: bool,
    /// Admin fetch in flight
    pub admin_loading: bool,
    /// Auth call in flight
    pub auth_busy: bool,
    /// Frame counter for spinners
    pub frame: usize,
}

impl App {
    /// Build the app: config, session, backend and controllers
    pub fn new() -> Self {
        let config = TellerConfig::load();
        let session = match SessionStore::default_path() {
            Some(path) => SessionStore::open(path),
            None => SessionStore::in_memory(),
        };

        let api = build_api(&config.api, session.clone());
        tracing::info!(backend = api.name(), "teller starting");

        let events = EventBus::new();
        // The terminal has no speech hardware; voice features stay off
        let voice = Arc::new(VoiceAdapter::new(
            Arc::new(NullSpeechPlatform),
            config.voice.speech_enabled,
        ));

        let auth = Arc::new(AuthController::new(Arc::clone(&api), session.clone()));
        let dashboard = Arc::new(DashboardController::new(Arc::clone(&api), session.clone()));
        let admin = Arc::new(AdminController::new(Arc::clone(&api)));
        let chat = Arc::new(ChatController::new(
            api,
            session.clone(),
            voice,
            events.clone(),
        ));

        let (notice_tx, notice_rx) = mpsc::channel(64);
        let (modal_tx, modal_rx) = mpsc::channel(8);
        let bus_rx = events.subscribe();

        let screen = if session.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Login
        };

        Self {
            running: true,
            screen,
            config,
            session,
            auth,
            dashboard,
            admin,
            chat,
            bus_rx,
            notice_tx,
            notice_rx,
            modal_tx,
            modal_rx,
            modal: None,
            toasts: ToastStack::default(),
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            goal_form: None,
            admin_filter: AdminFilterForm::default(),
            admin_view: None,
            chat_open: false,
            chat_input: String::new(),
            dashboard_loading: false,
            admin_loading: false,
            auth_busy: false,
            frame: 0,
        }
    }

    /// Whether somebody is signed in
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Display name of the signed-in user
    pub fn profile_name(&self) -> Option<String> {
        self.session
            .current()
            .and_then(|s| s.profile.map(|p| p.name))
    }

    /// Active backend mode, for the status bar
    pub fn api_mode(&self) -> ApiMode {
        self.config.api.mode
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        if self.session.is_authenticated() {
            self.reload_dashboard();
        }

        // Render the first frame immediately so the user sees UI
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        if key.kind == KeyEventKind::Press {
                            self.handle_key(key);
                        }
                    }
                }

                // Confirm dialogs raised by background chat turns
                Some(request) = self.modal_rx.recv() => {
                    self.modal = Some(ActiveModal::from(request));
                }

                // Background task results
                Some(notice) = self.notice_rx.recv() => {
                    self.apply_notice(notice);
                }

                // Cross-controller signals
                bus_event = self.bus_rx.recv() => {
                    if let Ok(AppEvent::DashboardRefresh) = bus_event {
                        self.reload_dashboard();
                    }
                }

                // Frame tick for spinners and toast expiry
                () = tokio::time::sleep(Duration::from_millis(100)) => {}
            }

            self.frame = self.frame.wrapping_add(1);
            self.toasts.tick();
            self.render(terminal)?;
        }

        Ok(())
    }

    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| views::render(frame, self))?;
        Ok(())
    }

    // ============================================
    // Key handling
    // ============================================

    fn handle_key(&mut self, key: event::KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Quit from anywhere
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.running = false;
            return;
        }

        // An open dialog captures input until resolved
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        // Global navigation once signed in
        if self.session.is_authenticated() {
            match key.code {
                KeyCode::F(2) => {
                    self.screen = Screen::Dashboard;
                    return;
                }
                KeyCode::F(3) => {
                    self.screen = Screen::Admin;
                    self.reload_admin();
                    return;
                }
                KeyCode::F(4) => {
                    self.chat_open = !self.chat_open;
                    return;
                }
                KeyCode::F(10) => {
                    self.logout();
                    return;
                }
                _ => {}
            }
        }

        if self.chat_open {
            self.handle_chat_key(key);
            return;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Register => self.handle_register_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Admin => self.handle_admin_key(key),
        }
    }

    fn handle_modal_key(&mut self, key: event::KeyEvent) {
        let choice = match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(true),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
            _ => None,
        };
        if let Some(confirmed) = choice {
            if let Some(mut modal) = self.modal.take() {
                modal.resolve(confirmed);
            }
        }
    }

    fn handle_chat_key(&mut self, key: event::KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.chat_open = false,
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Char('s') if ctrl => self.toggle_speech(),
            KeyCode::Char('v') if ctrl => self.submit_voice(),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(c) if !ctrl => self.chat_input.push(c),
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.login_form.focus = (self.login_form.focus + 1) % 2,
            KeyCode::BackTab | KeyCode::Up => {
                self.login_form.focus = (self.login_form.focus + 1) % 2;
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::F(2) => self.screen = Screen::Register,
            KeyCode::Backspace => {
                self.login_field_mut().pop();
            }
            KeyCode::Char(c) => self.login_field_mut().push(c),
            _ => {}
        }
    }

    fn login_field_mut(&mut self) -> &mut String {
        match self.login_form.focus {
            0 => &mut self.login_form.email,
            _ => &mut self.login_form.password,
        }
    }

    fn handle_register_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.register_form.focus = (self.register_form.focus + 1) % 3;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_form.focus = (self.register_form.focus + 2) % 3;
            }
            KeyCode::Enter => self.submit_register(),
            KeyCode::F(2) => self.screen = Screen::Login,
            KeyCode::Backspace => {
                self.register_field_mut().pop();
            }
            KeyCode::Char(c) => self.register_field_mut().push(c),
            _ => {}
        }
    }

    fn register_field_mut(&mut self) -> &mut String {
        match self.register_form.focus {
            0 => &mut self.register_form.name,
            1 => &mut self.register_form.email,
            _ => &mut self.register_form.password,
        }
    }

    fn handle_dashboard_key(&mut self, key: event::KeyEvent) {
        if self.goal_form.is_some() {
            self.handle_goal_form_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('r') => self.reload_dashboard(),
            KeyCode::Char('n') => self.goal_form = Some(GoalFormState::default()),
            _ => {}
        }
    }

    fn handle_goal_form_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.goal_form = None;
                return;
            }
            KeyCode::Enter => {
                self.submit_goal();
                return;
            }
            _ => {}
        }
        let Some(state) = self.goal_form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => state.focus = (state.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => state.focus = (state.focus + 2) % 3,
            KeyCode::Backspace => {
                goal_field_mut(state).pop();
            }
            KeyCode::Char(c) => goal_field_mut(state).push(c),
            _ => {}
        }
    }

    fn handle_admin_key(&mut self, key: event::KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.admin_filter.focus = (self.admin_filter.focus + 1) % 3;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.admin_filter.focus = (self.admin_filter.focus + 2) % 3;
            }
            // Server-side filtered fetch
            KeyCode::Enter => match self.parse_admin_filter() {
                Ok(filter) => {
                    self.admin_filter.error = None;
                    self.admin_view = None;
                    self.spawn_admin_load(filter);
                }
                Err(message) => self.admin_filter.error = Some(message),
            },
            // Client-side re-filter over the loaded set
            KeyCode::Char('f') if ctrl => match self.parse_admin_filter() {
                Ok(filter) => {
                    self.admin_filter.error = None;
                    self.admin_view = Some(self.admin.refilter(&filter));
                }
                Err(message) => self.admin_filter.error = Some(message),
            },
            // Reset filters
            KeyCode::Char('x') if ctrl => {
                self.admin_filter = AdminFilterForm::default();
                self.admin_view = None;
                self.spawn_admin_load(LogFilter::default());
            }
            KeyCode::Backspace => {
                self.admin_field_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.admin_field_mut().push(c),
            _ => {}
        }
    }

    fn admin_field_mut(&mut self) -> &mut String {
        match self.admin_filter.focus {
            0 => &mut self.admin_filter.user_id,
            1 => &mut self.admin_filter.action_type,
            _ => &mut self.admin_filter.status,
        }
    }

    fn parse_admin_filter(&self) -> Result<LogFilter, String> {
        parse_filter(
            &self.admin_filter.user_id,
            &self.admin_filter.action_type,
            &self.admin_filter.status,
        )
    }

    // ============================================
    // Controller calls (spawned, report via notices)
    // ============================================

    fn submit_login(&mut self) {
        let report =
            teller_core::validate_login(&self.login_form.email, &self.login_form.password);
        self.login_form.report = report.clone();
        if !report.is_ok() {
            return;
        }

        self.auth_busy = true;
        let auth = Arc::clone(&self.auth);
        let notices = self.notice_tx.clone();
        let email = self.login_form.email.clone();
        let password = self.login_form.password.clone();
        tokio::spawn(async move {
            let notice = match auth.login(&email, &password).await {
                Ok(session) => Notice::LoggedIn(session),
                Err(error) => Notice::AuthFailed {
                    register: false,
                    error,
                },
            };
            let _ = notices.send(notice).await;
        });
    }

    fn submit_register(&mut self) {
        let report = teller_core::validate_register(
            &self.register_form.name,
            &self.register_form.email,
            &self.register_form.password,
        );
        self.register_form.report = report.clone();
        if !report.is_ok() {
            return;
        }

        self.auth_busy = true;
        let auth = Arc::clone(&self.auth);
        let notices = self.notice_tx.clone();
        let name = self.register_form.name.clone();
        let email = self.register_form.email.clone();
        let password = self.register_form.password.clone();
        tokio::spawn(async move {
            let notice = match auth.register(&name, &email, &password).await {
                Ok(session) => Notice::LoggedIn(session),
                Err(error) => Notice::AuthFailed {
                    register: true,
                    error,
                },
            };
            let _ = notices.send(notice).await;
        });
    }

    fn reload_dashboard(&mut self) {
        self.dashboard_loading = true;
        let dashboard = Arc::clone(&self.dashboard);
        let notices = self.notice_tx.clone();
        tokio::spawn(async move {
            let result = dashboard.refresh().await.map_err(|e| e.to_string());
            let _ = notices.send(Notice::DashboardLoaded(result)).await;
        });
    }

    fn submit_goal(&mut self) {
        let Some(state) = self.goal_form.as_mut() else {
            return;
        };
        let report = state.form.validate();
        state.report = report.clone();
        if !report.is_ok() {
            return;
        }

        let form = state.form.clone();
        let dashboard = Arc::clone(&self.dashboard);
        let notices = self.notice_tx.clone();
        tokio::spawn(async move {
            let result = dashboard.create_goal(&form).await;
            let _ = notices.send(Notice::GoalCreated(result)).await;
        });
    }

    fn reload_admin(&mut self) {
        let filter = self.parse_admin_filter().unwrap_or_default();
        self.spawn_admin_load(filter);
    }

    fn spawn_admin_load(&mut self, filter: LogFilter) {
        self.admin_loading = true;
        let admin = Arc::clone(&self.admin);
        let notices = self.notice_tx.clone();
        tokio::spawn(async move {
            let result = admin.load(&filter).await.map_err(|e| e.to_string());
            let _ = notices.send(Notice::AdminLoaded(result)).await;
        });
    }

    fn submit_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        let chat = Arc::clone(&self.chat);
        let prompt = TuiPrompt::new(self.modal_tx.clone());
        let notices = self.notice_tx.clone();
        let dashboard_active = self.screen == Screen::Dashboard;
        tokio::spawn(async move {
            let outcome = chat.submit(&text, &prompt, dashboard_active).await;
            let _ = notices.send(Notice::ChatTurn(outcome)).await;
        });
    }

    fn submit_voice(&mut self) {
        // Capability was probed at init; without it the feature stays off
        if !self.chat.voice().recognition_available() {
            return;
        }
        let chat = Arc::clone(&self.chat);
        let prompt = TuiPrompt::new(self.modal_tx.clone());
        let notices = self.notice_tx.clone();
        let dashboard_active = self.screen == Screen::Dashboard;
        tokio::spawn(async move {
            let notice = match chat.submit_voice(&prompt, dashboard_active).await {
                Ok(outcome) => Notice::ChatTurn(outcome),
                // A cancelled session is silent
                Err(VoiceError::Cancelled) => return,
                Err(err) => Notice::Toast(ToastLevel::Error, err.to_string()),
            };
            let _ = notices.send(notice).await;
        });
    }

    fn toggle_speech(&mut self) {
        let enabled = !self.chat.voice().speech_enabled();
        self.chat.voice().set_speech_enabled(enabled);
        self.config.voice.speech_enabled = enabled;
        if let Err(err) = self.config.save() {
            tracing::warn!(error = %err, "speech toggle not persisted");
        }
        let label = if enabled {
            "Озвучивание ответов включено"
        } else {
            "Озвучивание ответов выключено"
        };
        self.toasts.push(ToastLevel::Info, label);
    }

    fn logout(&mut self) {
        self.auth.logout();
        self.screen = Screen::Login;
        self.chat_open = false;
        self.chat_input.clear();
        self.goal_form = None;
        self.login_form = LoginForm::default();
        self.toasts.push(ToastLevel::Info, "Вы вышли из аккаунта");
    }

    // ============================================
    // Notices
    // ============================================

    fn apply_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Toast(level, text) => self.toasts.push(level, text),

            Notice::LoggedIn(session) => {
                self.auth_busy = false;
                self.screen = Screen::Dashboard;
                self.login_form = LoginForm::default();
                self.register_form = RegisterForm::default();
                let greeting = match session.profile {
                    Some(profile) => format!("Добро пожаловать, {}!", profile.name),
                    None => "Добро пожаловать!".to_string(),
                };
                self.toasts.push(ToastLevel::Success, greeting);
                self.reload_dashboard();
            }

            Notice::AuthFailed { register, error } => {
                self.auth_busy = false;
                match error {
                    AuthError::Invalid(report) => {
                        if register {
                            self.register_form.report = report;
                        } else {
                            self.login_form.report = report;
                        }
                    }
                    AuthError::Api(err) => {
                        tracing::warn!(error = %err, "auth request failed");
                        self.toasts
                            .push(ToastLevel::Error, "Не удалось войти. Проверьте подключение.");
                    }
                }
            }

            Notice::DashboardLoaded(result) => {
                self.dashboard_loading = false;
                if let Err(err) = result {
                    tracing::warn!(error = %err, "dashboard load failed");
                    self.toasts
                        .push(ToastLevel::Error, "Не удалось загрузить данные");
                }
            }

            Notice::GoalCreated(result) => match result {
                Ok(goal) => {
                    self.goal_form = None;
                    self.toasts
                        .push(ToastLevel::Success, format!("Цель «{}» создана", goal.title));
                }
                Err(CreateGoalError::Invalid(report)) => {
                    if let Some(state) = self.goal_form.as_mut() {
                        state.report = report;
                    }
                }
                Err(CreateGoalError::Api(err)) => {
                    tracing::warn!(error = %err, "goal creation failed");
                    self.toasts
                        .push(ToastLevel::Error, "Не удалось создать цель");
                }
            },

            Notice::AdminLoaded(result) => {
                self.admin_loading = false;
                if let Err(err) = result {
                    tracing::warn!(error = %err, "admin log load failed");
                    self.toasts
                        .push(ToastLevel::Error, "Не удалось загрузить журнал");
                }
            }

            Notice::ChatTurn(outcome) => match outcome {
                TurnOutcome::ActionExecuted {
                    success: true,
                    detail,
                } => {
                    let text = if detail.is_empty() {
                        "Действие выполнено".to_string()
                    } else {
                        detail
                    };
                    self.toasts.push(ToastLevel::Success, text);
                }
                TurnOutcome::ActionExecuted { success: false, .. } => {
                    self.toasts
                        .push(ToastLevel::Error, "Действие не выполнено");
                }
                TurnOutcome::ReplyFailed => {
                    self.toasts.push(ToastLevel::Error, "Ассистент недоступен");
                }
                _ => {}
            },
        }
    }
}

fn goal_field_mut(state: &mut GoalFormState) -> &mut String {
    match state.focus {
        0 => &mut state.form.title,
        1 => &mut state.form.target_amount,
        _ => &mut state.form.deadline,
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
