//! TUI event loop: terminal lifecycle, key routing, screen switching,
//! and draining pushed platform events into the application state.

use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::client::{PlatformEvent, SessionInfo};
use crate::components::PlaceSelector;
use crate::config::Config;
use crate::prefs::Preferences;
use crate::routing::Screen;
use crate::services::Services;
use crate::state::AppState;
use crate::ui::{panels, wizard_view, Dashboard};
use crate::wizard::steps::signup_steps;
use crate::wizard::{
    NextOutcome, PrevOutcome, ProgressRecorder, WizardContext, WizardController, WizardIdentity,
};

pub struct App {
    config: Config,
    services: Services,
    state: AppState,
    prefs: Preferences,
    events: broadcast::Receiver<PlatformEvent>,
    dashboard: Dashboard,
    place_selector: PlaceSelector,
    selector_visible: bool,
    wizard: Option<WizardController>,
    screen: Screen,
    /// Transient status text shown in the footer
    status_message: Option<String>,
    /// Start the signup flow fresh (drop persisted progress)
    fresh_signup: bool,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        services: Services,
        session: &SessionInfo,
        screen: Screen,
        fresh_signup: bool,
    ) -> Self {
        let prefs = Preferences::load(config.preferences_path());
        let events = services.client().subscribe();
        Self {
            config,
            services,
            state: AppState::new(session),
            prefs,
            events,
            dashboard: Dashboard::new(),
            place_selector: PlaceSelector::new(),
            selector_visible: false,
            wizard: None,
            screen,
            status_message: None,
            fresh_signup,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.initial_load().await;
        if self.screen == Screen::Signup {
            self.start_signup(self.fresh_signup).await;
        }

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            terminal.draw(|f| {
                match self.screen {
                    Screen::Signup => {
                        if let Some(wizard) = &mut self.wizard {
                            wizard_view::render(f, wizard, self.status_message.as_deref());
                        }
                    }
                    _ => {
                        self.dashboard
                            .render(f, &self.state, self.status_message.as_deref());
                        if self.selector_visible {
                            let area = panels::centered_rect(50, 40, f.area());
                            self.place_selector.render(f, area);
                        }
                    }
                }
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code).await?;
                    }
                }
            }

            self.drain_platform_events();
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    async fn initial_load(&mut self) {
        match self.services.session().list_available_places().await {
            Ok(places) => {
                self.place_selector.set_places(places);
                self.state.set_places(self.place_selector.places().to_vec());
            }
            Err(e) => {
                warn!(error = %e, "failed to list places");
                self.status_message = Some(format!("Couldn't load places: {e}"));
                return;
            }
        }

        // Last-used place if it's still available, else the first by name
        let preferred = self
            .prefs
            .last_place(self.state.person_id())
            .map(String::from);
        let chosen = self
            .state
            .places()
            .iter()
            .find(|p| Some(&p.place_id) == preferred.as_ref())
            .or_else(|| self.state.places().first())
            .map(|p| (p.place_id.clone(), p.name.clone()));

        if let Some((place_id, name)) = chosen {
            self.activate_place(place_id, name).await;
        }
    }

    async fn activate_place(&mut self, place_id: String, name: String) {
        if let Err(e) = self.services.session().set_active_place(&place_id).await {
            warn!(error = %e, place = place_id, "failed to activate place");
            self.status_message = Some(format!("Couldn't switch place: {e}"));
            return;
        }
        info!(place = %name, "active place set");
        self.state.set_active_place(place_id.clone(), name);
        self.place_selector.select_place(&place_id);
        if let Err(e) = self.prefs.set_last_place(self.state.person_id(), &place_id) {
            warn!(error = %e, "failed to persist place preference");
        }
        self.refresh_place_data().await;
    }

    async fn refresh_place_data(&mut self) {
        let Some(place_id) = self.state.active_place().map(|p| p.place_id.clone()) else {
            return;
        };
        // Independent prerequisites, fetched together
        let places = self.services.places();
        let (devices, subsystems) = tokio::join!(
            places.list_devices(&place_id),
            places.list_subsystems(&place_id)
        );
        match devices {
            Ok(devices) => self.state.set_devices(devices),
            Err(e) => warn!(error = %e, "failed to list devices"),
        }
        match subsystems {
            Ok(records) => {
                for record in records {
                    self.state.subsystems_mut().load_record(record);
                }
            }
            Err(e) => warn!(error = %e, "failed to load subsystems"),
        }
    }

    async fn start_signup(&mut self, fresh: bool) {
        let person_id = self.state.person_id().to_string();
        let place_id = self
            .state
            .active_place()
            .map(|p| p.place_id.clone())
            .unwrap_or_default();
        let identity = WizardIdentity {
            person_id: person_id.clone(),
            account_id: self.state.account_id().to_string(),
            place_id,
        };

        let path = ProgressRecorder::path_for(&self.config.state_path(), &person_id);
        let mut progress = match ProgressRecorder::load(path) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(error = %e, "progress file unreadable; starting fresh");
                ProgressRecorder::in_memory()
            }
        };
        if fresh {
            if let Err(e) = progress.clear_all_progress() {
                warn!(error = %e, "failed to clear progress");
            }
        }

        let ctx = WizardContext::new(self.services.clone(), identity, progress);
        let mut controller = WizardController::new(signup_steps(), ctx);
        controller.start().await;
        self.status_message = if controller.is_complete() {
            Some("Signup is already complete.".to_string())
        } else {
            None
        };
        self.wizard = Some(controller);
        self.screen = Screen::Signup;
    }

    fn leave_wizard(&mut self) {
        self.wizard = None;
        self.screen = Screen::Dashboard;
        self.status_message = None;
    }

    async fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        if self.screen == Screen::Signup {
            self.handle_wizard_key(key).await;
            return Ok(());
        }
        if self.selector_visible {
            self.handle_selector_key(key).await;
            return Ok(());
        }

        self.status_message = None;
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => self.start_signup(false).await,
            KeyCode::Char('p') => {
                if !self.place_selector.is_empty() {
                    self.selector_visible = true;
                }
            }
            KeyCode::Char('r') => self.refresh_place_data().await,
            KeyCode::Char('j') | KeyCode::Down => {
                self.dashboard.select_next_device(self.state.devices().len());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.dashboard.select_prev_device(self.state.devices().len());
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_selector_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.selector_visible = false,
            KeyCode::Up | KeyCode::Char('k') => self.place_selector.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.place_selector.select_next(),
            KeyCode::Enter => {
                self.selector_visible = false;
                if let Some(place) = self.place_selector.selected_place() {
                    let (place_id, name) = (place.place_id.clone(), place.name.clone());
                    self.activate_place(place_id, name).await;
                }
            }
            _ => {}
        }
    }

    async fn handle_wizard_key(&mut self, key: KeyCode) {
        let Some(wizard) = &mut self.wizard else {
            self.leave_wizard();
            return;
        };

        if wizard.is_complete() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                self.leave_wizard();
            }
            return;
        }

        match key {
            KeyCode::Enter => {
                self.status_message = None;
                match wizard.next().await {
                    NextOutcome::Advanced => {}
                    NextOutcome::NotSatisfied => {
                        self.status_message = wizard
                            .current()
                            .map(|step| step.unsatisfied_hint().to_string());
                    }
                    // The step keeps its own form error on failure
                    NextOutcome::Failed => {}
                    NextOutcome::Complete => {
                        self.status_message = Some("Signup complete.".to_string());
                    }
                }
            }
            KeyCode::Esc => {
                self.status_message = None;
                match wizard.prev().await {
                    PrevOutcome::MovedBack | PrevOutcome::Failed => {}
                    PrevOutcome::AtStart => self.leave_wizard(),
                }
            }
            KeyCode::Tab => {
                if let Some(form) = wizard.current_mut().and_then(|s| s.form_mut()) {
                    form.next_field();
                }
            }
            KeyCode::BackTab => {
                if let Some(form) = wizard.current_mut().and_then(|s| s.form_mut()) {
                    form.prev_field();
                }
            }
            other => {
                if let Some(form) = wizard.current_mut().and_then(|s| s.form_mut()) {
                    form.handle_key(other);
                }
            }
        }
    }

    fn drain_platform_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.state.apply_platform_event(&event);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "platform event stream lagged");
                }
                Err(_) => break,
            }
        }
    }
}
