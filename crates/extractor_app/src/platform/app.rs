use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use clap::Parser;
use extractor_client::{EngineHandle, ReqwestApi};
use extractor_core::{update, AppState, Msg};
use extractor_logging::{extractor_error, extractor_info, extractor_warn};
use log::LevelFilter;

use super::config::{AppConfig, Cli};
use super::effects::{EffectRunner, UiEffect};
use super::input::{parse_line, Action};
use super::ui::render::{render, Overlay};
use super::ui::terminal::Terminal;

enum AppEvent {
    Line(String),
    Msg(Msg),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli).context("loading configuration")?;
    extractor_logging::initialize(config.log.into(), LevelFilter::Info, &config.log_file);
    extractor_info!(
        "Starting field-extractor: server={} downloads={:?}",
        config.server_url,
        config.download_dir
    );

    let api = ReqwestApi::new(config.client_settings()).context("building HTTP client")?;
    let (engine, engine_events) = EngineHandle::spawn(Arc::new(api), config.download_dir.clone())
        .context("starting request engine")?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_forwarder(msg_rx, event_tx.clone())?;
    spawn_stdin_reader(event_tx)?;

    let runner = EffectRunner::new(engine, engine_events, config.download_dir.clone(), msg_tx)
        .context("starting event forwarder")?;
    let mut app = App::new(runner);
    app.redraw();

    if let Some(path) = cli.file.as_deref() {
        app.open_file(path);
    }

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Line(line) => {
                if !app.handle_line(&line) {
                    break;
                }
            }
            AppEvent::Msg(msg) => app.dispatch(msg),
            AppEvent::InputClosed => break,
        }
    }
    extractor_info!("Shutting down");
    Ok(())
}

fn spawn_forwarder(msg_rx: mpsc::Receiver<Msg>, event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("extractor-msgs".to_string())
        .spawn(move || {
            while let Ok(msg) = msg_rx.recv() {
                if event_tx.send(AppEvent::Msg(msg)).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("extractor-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if event_tx.send(AppEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    terminal: Terminal,
    overlay: Overlay,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            terminal: Terminal::new(),
            overlay: Overlay::default(),
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        // Any input acknowledges an open alert, like closing a dialog.
        if self.overlay.alert.take().is_some() {
            self.redraw();
            return true;
        }
        self.overlay.notice = None;
        self.overlay.show_help = false;

        match parse_line(line, &self.state.view()) {
            Action::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
                self.redraw();
            }
            Action::Open(path) => self.open_file(&path),
            Action::Help => {
                self.overlay.show_help = true;
                self.redraw();
            }
            Action::Quit => return false,
            Action::Unknown(text) => {
                self.overlay.notice = Some(format!("Неизвестная команда: {text}"));
                self.redraw();
            }
        }
        true
    }

    fn open_file(&mut self, path: &Path) {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let name = file_name(path);
                self.dispatch(Msg::FileChosen {
                    path: path.to_path_buf(),
                    name,
                    size_bytes: meta.len(),
                });
            }
            Ok(_) | Err(_) => {
                extractor_warn!("Cannot open {:?}", path);
                self.show_alert(format!("Файл не найден: {}", path.display()));
            }
        }
        self.redraw();
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        let ui_effects = self.runner.enqueue(effects);
        let had_ui_effects = !ui_effects.is_empty();
        for effect in ui_effects {
            match effect {
                UiEffect::Alert(message) => self.show_alert(message),
                UiEffect::Notice(message) => self.overlay.notice = Some(message),
                UiEffect::ScrollToTop => {
                    if let Err(err) = self.terminal.scroll_to_top() {
                        extractor_warn!("Failed to reset terminal: {}", err);
                    }
                }
            }
        }

        if was_dirty || had_ui_effects {
            self.redraw();
        }
    }

    fn show_alert(&mut self, message: String) {
        extractor_info!("Alert: {}", message);
        self.overlay.alert = Some(message);
    }

    fn redraw(&mut self) {
        let cmds = render(&self.state.view(), &self.overlay);
        if let Err(err) = self.terminal.draw(&cmds) {
            extractor_error!("Failed to draw screen: {}", err);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
