use crate::app::{App, AppMode, ProfileField, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.foreground)),
        area,
    );
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_tabs(f, chunks[1], app);
    match app.view {
        View::Timer => draw_timer_view(f, chunks[2], app),
        View::Tasks => draw_tasks_view(f, chunks[2], app),
        View::Profile => draw_profile_view(f, chunks[2], app),
    }
    draw_status_bar(f, chunks[3], app);

    match &app.mode {
        AppMode::EnteringActivity => {
            draw_input_overlay(f, "Input activity", &app.input_buffer, app)
        }
        AppMode::EditingProfile(ProfileField::Username) => {
            draw_input_overlay(f, "Username", &app.input_buffer, app)
        }
        AppMode::EditingProfile(ProfileField::Email) => {
            draw_input_overlay(f, "Email", &app.input_buffer, app)
        }
        AppMode::ConfirmReset => draw_confirm_overlay(f, app),
        AppMode::SessionComplete => draw_completion_overlay(f, app),
        AppMode::Normal => {}
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "POMO",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let icons = &app.config.icons;
    let tabs = [
        (View::Timer, &icons.timer, "Timer"),
        (View::Tasks, &icons.tasks, "Tasks"),
        (View::Profile, &icons.profile, "Profile"),
    ];
    let mut spans = Vec::new();
    for (i, (view, icon, label)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        let style = if *view == app.view {
            Style::default()
                .fg(theme.selection)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.gray)
        };
        spans.push(Span::styled(format!("{} {}", icon, label), style));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_timer_view(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let icons = &app.config.icons;
    let snapshot = &app.snapshot;

    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", icons.timer, snapshot.kind),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if snapshot.is_running {
            theme.green
        } else {
            theme.gray
        }));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    // Cycle indicator: one slot per session before the long break.
    let filled = snapshot.completed_work_sessions as usize;
    let dots: Vec<String> = (0..4)
        .map(|i| {
            if i < filled {
                icons.session_filled.clone()
            } else {
                icons.session_empty.clone()
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(dots.join(" "))
            .style(Style::default().fg(theme.yellow))
            .alignment(Alignment::Center),
        v_chunks[0],
    );

    let state_icon = if snapshot.is_running {
        &icons.play
    } else {
        &icons.pause
    };
    f.render_widget(
        Paragraph::new(format!(
            "{} {}",
            state_icon,
            format_mmss(snapshot.remaining_seconds)
        ))
        .style(
            Style::default()
                .fg(if snapshot.is_running {
                    theme.green
                } else {
                    theme.foreground
                })
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center),
        v_chunks[2],
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme.blue).bg(theme.black))
            .percent(elapsed_percent(snapshot.remaining_seconds, snapshot.kind.duration_secs())),
        v_chunks[3],
    );

    let focus_line = if snapshot.current_activity.is_empty() {
        Line::from(Span::styled(
            "Press space to begin a session",
            Style::default().fg(theme.gray),
        ))
    } else {
        Line::from(vec![
            Span::styled("Focus: ", Style::default().fg(theme.gray)),
            Span::styled(
                snapshot.current_activity.clone(),
                Style::default().fg(theme.cyan),
            ),
        ])
    };
    f.render_widget(
        Paragraph::new(focus_line).alignment(Alignment::Center),
        v_chunks[5],
    );
}

fn draw_tasks_view(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let icons = &app.config.icons;
    let snapshot = &app.snapshot;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let current_block = Block::default()
        .title(Span::styled(
            " Current Activity ",
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.green));
    let current_inner = current_block.inner(chunks[0]);
    f.render_widget(current_block, chunks[0]);
    let current_line = if snapshot.current_activity.is_empty() {
        Line::from(Span::styled(
            "No current activity for today",
            Style::default().fg(theme.gray),
        ))
    } else {
        let state_icon = if snapshot.is_running {
            &icons.play
        } else {
            &icons.pause
        };
        Line::from(vec![
            Span::styled(
                format!("{} ", state_icon),
                Style::default().fg(if snapshot.is_running {
                    theme.green
                } else {
                    theme.yellow
                }),
            ),
            Span::raw(snapshot.current_activity.clone()),
        ])
    };
    f.render_widget(Paragraph::new(current_line), current_inner);

    let completed_block = Block::default()
        .title(Span::styled(
            format!(" {} Completed ", icons.tasks),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.green));
    let completed_inner = completed_block.inner(chunks[1]);
    f.render_widget(completed_block, chunks[1]);

    if snapshot.completed_activities.is_empty() {
        f.render_widget(
            Paragraph::new("Nothing completed yet.")
                .style(Style::default().fg(theme.gray))
                .alignment(Alignment::Center),
            completed_inner,
        );
        return;
    }

    let items: Vec<ListItem> = snapshot
        .completed_activities
        .iter()
        .map(|activity| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", icons.done),
                    Style::default().fg(theme.green),
                ),
                Span::raw(activity.name.clone()),
                Span::styled(
                    format!("  {}", activity.completed_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(theme.gray),
                ),
            ]))
        })
        .collect();
    f.render_widget(List::new(items), completed_inner);
}

fn draw_profile_view(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let icons = &app.config.icons;
    let profile = &app.profile;

    let block = Block::default()
        .title(Span::styled(
            format!(" {} Profile ", icons.profile),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.green));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let toggle = |on: bool| {
        if on {
            icons.done.clone()
        } else {
            icons.pending.clone()
        }
    };
    let or_unset = |s: &str| {
        if s.is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };
    let rows: [(String, String); 6] = [
        ("Username".into(), or_unset(&profile.username)),
        ("Email".into(), or_unset(&profile.email)),
        (
            "Enable Notifications".into(),
            toggle(profile.notifications_enabled),
        ),
        ("Dark Mode".into(), toggle(profile.dark_mode)),
        ("Save Changes".into(), String::new()),
        ("Reset All Activity".into(), String::new()),
    ];

    let constraints: Vec<Constraint> = rows.iter().map(|_| Constraint::Length(1)).collect();
    let row_chunks = Layout::default()
        .margin(1)
        .constraints(constraints)
        .split(inner_area);
    for (i, (label, value)) in rows.iter().enumerate() {
        if let Some(row_area) = row_chunks.get(i) {
            let marker = if i == app.profile_cursor {
                Span::styled(
                    format!("{} ", icons.select),
                    Style::default().fg(theme.selection),
                )
            } else {
                Span::raw("  ")
            };
            let label_style = if *label == "Reset All Activity" {
                Style::default().fg(theme.red)
            } else {
                Style::default().fg(theme.foreground)
            };
            let mut spans = vec![marker, Span::styled(label.clone(), label_style)];
            if !value.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", value),
                    Style::default().fg(theme.gray),
                ));
            }
            f.render_widget(Paragraph::new(Line::from(spans)), *row_area);
        }
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let (mode_text, mode_color) = match app.mode {
        AppMode::Normal => ("NORMAL", theme.green),
        AppMode::EnteringActivity => ("INPUT", theme.yellow),
        AppMode::EditingProfile(_) => ("EDIT", theme.blue),
        AppMode::ConfirmReset => ("CONFIRM", theme.red),
        AppMode::SessionComplete => ("DONE", theme.magenta),
    };
    let help = match (&app.mode, app.view) {
        (AppMode::Normal, View::Profile) => "j/k:select │ enter:apply │ tab:view │ q:quit",
        (AppMode::Normal, _) => "space:start/pause │ r:reset │ tab:view │ 1/2/3:jump │ q:quit",
        (AppMode::ConfirmReset, _) => "y:confirm │ esc:cancel",
        (AppMode::SessionComplete, _) => "enter:dismiss",
        _ => "enter:confirm │ esc:cancel",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn draw_input_overlay(f: &mut Frame, title: &str, input: &str, app: &App) {
    let theme = app.theme();
    let area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.yellow))
        .border_type(BorderType::Double)
        .style(Style::default().bg(theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(theme.foreground)),
            Span::styled(input, Style::default().fg(theme.foreground)),
            Span::styled(
                &app.config.icons.input_cursor,
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])),
        inner_area,
    );
}

fn draw_confirm_overlay(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Confirm Reset ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.red))
        .border_type(BorderType::Double)
        .style(Style::default().bg(theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new("Are you sure you want to reset all activity?")
            .style(Style::default().fg(theme.foreground))
            .alignment(Alignment::Center),
        inner_area,
    );
}

fn draw_completion_overlay(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Activity Completed ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.magenta))
        .border_type(BorderType::Double)
        .style(Style::default().bg(theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let message = match &app.last_completed {
        Some(name) => format!("Congrats! Activity '{}' is complete", name),
        None => "Session complete".to_string(),
    };
    f.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(theme.foreground))
            .alignment(Alignment::Center),
        inner_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn format_mmss(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

fn elapsed_percent(remaining: u32, total: u32) -> u16 {
    if total == 0 {
        return 0;
    }
    let progress = 1.0 - (remaining as f64 / total as f64);
    (progress.clamp(0.0, 1.0) * 100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mmss_pads_both_fields() {
        assert_eq!(format_mmss(1500), "25:00");
        assert_eq!(format_mmss(90), "01:30");
        assert_eq!(format_mmss(0), "00:00");
    }

    #[test]
    fn elapsed_percent_clamps() {
        assert_eq!(elapsed_percent(1500, 1500), 0);
        assert_eq!(elapsed_percent(750, 1500), 50);
        assert_eq!(elapsed_percent(0, 1500), 100);
        // A reset can leave more remaining than the active kind's
        // duration; the gauge stays pinned at zero.
        assert_eq!(elapsed_percent(1500, 300), 0);
    }
}
