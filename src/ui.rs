pub mod charting;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::session::{CharState, TypingSession};
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Untyped characters render as this in hard mode.
const MASK_CHAR: char = '•';

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let dim_bold_style = Style::default().add_modifier(Modifier::BOLD | Modifier::DIM);

    let passage: String = app.session.target().iter().collect();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((passage.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if passage.width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let top = (area.height.saturating_sub(prompt_occupied_lines + 4) / 2).max(1);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top),
                Constraint::Length(1), // timer
                Constraint::Length(1), // live metrics
                Constraint::Length(prompt_occupied_lines),
                Constraint::Length(1), // paste notice
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(area);

    let timer_text = match app.clock.remaining_secs() {
        Some(remaining) => format!("{remaining}"),
        None => format!("{}", app.clock.elapsed_secs()),
    };
    Paragraph::new(Span::styled(timer_text, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let stats = format!(
        "{} wpm   {}% acc   {} mistakes   best {}",
        app.wpm(),
        app.accuracy(),
        app.session.mistakes(),
        app.high_score
    );
    Paragraph::new(Span::styled(stats, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let cells = passage_cells(
        &app.session,
        app.ghost_cursor,
        app.config.hard_mode,
    );
    let grouped = cells.into_iter().chunk_by(|(style, _)| *style);
    let spans: Vec<Span> = grouped
        .into_iter()
        .map(|(style, group)| Span::styled(group.map(|(_, s)| s).collect::<String>(), style))
        .collect();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    if app.paste_rejected {
        Paragraph::new(Span::styled(
            "pasting is disabled, type it out",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}

/// Per-character style and display text for the passage line.
///
/// The live cursor underlines the next expected character and the ghost
/// cursor rides along in magenta; where both land on the same cell the
/// live cursor wins.
fn passage_cells(
    session: &TypingSession,
    ghost_cursor: Option<usize>,
    hard_mode: bool,
) -> Vec<(Style, String)> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default().patch(bold_style).add_modifier(Modifier::DIM);
    let cursor_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let ghost_style = Style::default()
        .patch(bold_style)
        .fg(Color::Magenta)
        .add_modifier(Modifier::UNDERLINED);

    session
        .char_states()
        .iter()
        .enumerate()
        .map(|(idx, state)| {
            let expected = session.target()[idx];
            let (mut style, shown) = match state {
                CharState::Correct => (green_bold_style, expected.to_string()),
                CharState::Incorrect => (
                    red_bold_style,
                    match session.typed()[idx] {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                ),
                CharState::Pending => {
                    let shown = if hard_mode && expected != ' ' {
                        MASK_CHAR.to_string()
                    } else {
                        expected.to_string()
                    };
                    (dim_bold_style, shown)
                }
            };
            if ghost_cursor == Some(idx) {
                style = ghost_style;
            }
            if idx == session.typed_len() && !session.has_finished() {
                style = cursor_style;
            }
            (style, shown)
        })
        .collect()
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // history chart
                Constraint::Length(1), // final stats
                Constraint::Length(1), // high score line
                Constraint::Length(1), // padding
                Constraint::Length(5), // recent runs
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    // oldest to newest, one point per run
    let points: Vec<(f64, f64)> = app
        .history
        .iter()
        .rev()
        .enumerate()
        .map(|(i, r)| ((i + 1) as f64, r.wpm as f64))
        .collect();

    if points.len() > 1 {
        let (last_run, highest_wpm) = charting::compute_chart_params(&points);

        let datasets = vec![Dataset::default()
            .marker(ratatui::symbols::Marker::Braille)
            .style(magenta_style)
            .graph_type(GraphType::Line)
            .data(&points)];

        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("runs")
                    .bounds([1.0, last_run])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(charting::format_label(last_run), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("wpm")
                    .bounds([0.0, highest_wpm])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(highest_wpm), bold_style),
                    ]),
            )
            .render(chunks[0], buf);
    } else {
        Paragraph::new(Span::styled(
            "finish more runs to chart your progress",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    }

    let (wpm, accuracy) = match &app.last_result {
        Some(r) => (r.wpm, r.accuracy),
        None => (app.wpm(), app.accuracy()),
    };
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} mistakes",
            wpm,
            accuracy,
            app.session.mistakes()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let high_score_line = if app.new_high_score {
        Span::styled(
            "new high score! your ghost just got faster",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("best {} wpm", app.high_score),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        )
    };
    Paragraph::new(high_score_line)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let recent: Vec<Line> = app
        .history
        .iter()
        .take(5)
        .map(|r| {
            let secs = (chrono::Local::now() - r.timestamp).num_seconds();
            Line::from(Span::styled(
                format!(
                    "{:>3} wpm  {:>3}% acc  {:<5}  {}",
                    r.wpm,
                    r.accuracy,
                    r.mode.to_string(),
                    HumanTime::from(-secs)
                ),
                Style::default().fg(Color::Gray),
            ))
        })
        .collect();
    Paragraph::new(recent)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let legend = if Browser::is_available() {
        "(r)etry / (t)weet / (tab) restart / (esc)ape"
    } else {
        "(r)etry / (tab) restart / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);
}
