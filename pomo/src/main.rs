use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, warn};

mod app;
mod config;
mod ipc;
mod profile;
mod session;
mod timer;
mod ui;

use app::{App, AppMode, View};
use pomo_ipc::SessionKind;
use profile::Profile;
use session::{SessionController, SessionEvent};
use timer::SessionTimer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    init_tracing();
    let profile = Profile::load().unwrap_or_default();

    let notifications = Arc::new(AtomicBool::new(profile.notifications_enabled));
    let completion_flag = Arc::new(AtomicBool::new(false));

    // The single controller instance for the whole process; every layer
    // below gets a handle to this one.
    let timer = SessionTimer::new(SessionController::new());
    {
        let notifications = notifications.clone();
        let completion_flag = completion_flag.clone();
        timer
            .on_event(move |event| {
                if let SessionEvent::Completed {
                    finished, activity, ..
                } = event
                {
                    completion_flag.store(true, Ordering::SeqCst);
                    if notifications.load(Ordering::SeqCst) {
                        send_completion_notification(*finished, activity);
                    }
                }
            })
            .await;
    }

    tokio::spawn({
        let timer = timer.clone();
        async move {
            if let Err(e) = ipc::server::start(timer).await {
                error!("IPC server failed: {}", e);
            }
        }
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config, profile, timer, notifications, completion_flag);
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.refresh().await;
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.mode {
                        AppMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Tab => app.view = app.view.next(),
                            KeyCode::Char('1') => app.view = View::Timer,
                            KeyCode::Char('2') => app.view = View::Tasks,
                            KeyCode::Char('3') => app.view = View::Profile,
                            KeyCode::Char(' ') => app.toggle_session().await,
                            KeyCode::Char('r') => app.reset_session().await,
                            KeyCode::Up | KeyCode::Char('k') if app.view == View::Profile => {
                                app.profile_cursor_up()
                            }
                            KeyCode::Down | KeyCode::Char('j') if app.view == View::Profile => {
                                app.profile_cursor_down()
                            }
                            KeyCode::Enter if app.view == View::Profile => {
                                app.activate_profile_row()
                            }
                            _ => {}
                        },
                        AppMode::EnteringActivity | AppMode::EditingProfile(_) => match key.code {
                            KeyCode::Esc => app.cancel_input(),
                            KeyCode::Enter => app.submit_input().await,
                            KeyCode::Backspace => app.handle_backspace(),
                            KeyCode::Char(c) => app.handle_char(c),
                            _ => {}
                        },
                        AppMode::ConfirmReset => match key.code {
                            KeyCode::Char('y') | KeyCode::Enter => app.confirm_reset().await,
                            KeyCode::Esc | KeyCode::Char('n') => app.mode = AppMode::Normal,
                            _ => {}
                        },
                        AppMode::SessionComplete => match key.code {
                            KeyCode::Enter | KeyCode::Esc => app.dismiss_completion(),
                            _ => {}
                        },
                    }
                }
            }
        }
    }
}

fn send_completion_notification(finished: SessionKind, activity: &str) {
    let body = if activity.is_empty() {
        format!("{} session complete", finished)
    } else {
        format!("{} session complete: {}", finished, activity)
    };
    if let Err(e) = notify_rust::Notification::new()
        .summary("Pomo")
        .body(&body)
        .appname("pomo")
        .show()
    {
        warn!("Failed to send notification: {}", e);
    }
}

/// Log to a file in the data dir; stderr belongs to the alternate screen.
fn init_tracing() {
    let Some(proj_dirs) = ProjectDirs::from("com", "spalijama", "Pomo") else {
        return;
    };
    let data_dir = proj_dirs.data_dir();
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(data_dir.join("pomo.log")) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}
