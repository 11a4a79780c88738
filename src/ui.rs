pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    metrics::Verdict,
    session::{Session, SessionResult, SessionStatus, DURATION_CHOICES},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.is_loading() {
            render_loading(area, buf);
            return;
        }

        match (self.session.status(), self.session.result()) {
            (SessionStatus::Finished, Some(result)) => render_results(self, result, area, buf),
            _ => render_typing(&self.session, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn render_loading(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "loading words…",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);
}

fn duration_selector(session: &Session) -> Line<'static> {
    let current = session.duration_secs();
    let locked = session.status() == SessionStatus::Running;
    let mut spans = Vec::new();

    for secs in DURATION_CHOICES {
        let style = if secs == current {
            bold().add_modifier(Modifier::REVERSED)
        } else {
            dim_bold()
        };
        spans.push(Span::styled(format!(" {secs}s "), style));
        spans.push(Span::raw(" "));
    }
    if !DURATION_CHOICES.contains(&current) {
        spans.push(Span::styled(
            format!(" {current}s "),
            bold().add_modifier(Modifier::REVERSED),
        ));
    }
    if locked {
        spans = spans
            .into_iter()
            .map(|s| {
                let style = s.style.add_modifier(Modifier::DIM);
                s.style(style)
            })
            .collect();
    }
    Line::from(spans)
}

fn readout(session: &Session) -> Line<'static> {
    let remaining = session.remaining_secs();
    match session.status() {
        SessionStatus::Running => {
            let live = session.live_metrics();
            Line::from(vec![
                Span::styled(format!("{remaining}s"), bold().fg(Color::Yellow)),
                Span::raw("   "),
                Span::styled(format!("{} wpm", live.wpm), bold()),
                Span::raw("   "),
                Span::styled(format!("{}% acc", live.accuracy), bold()),
            ])
        }
        _ => Line::from(vec![
            Span::styled(format!("{remaining}s"), bold().fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled(
                "start typing or press enter",
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]),
    }
}

/// Spans for the target text coloured by verdict, with the caret on the
/// next expected character.
fn text_spans(session: &Session) -> Vec<Span<'static>> {
    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);
    let caret = dim_bold().add_modifier(Modifier::UNDERLINED);
    let cursor = session.cursor();

    session
        .target()
        .chars()
        .iter()
        .zip(session.verdicts())
        .enumerate()
        .map(|(idx, (expected, verdict))| match verdict {
            Verdict::Correct => Span::styled(expected.to_string(), green_bold),
            Verdict::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold,
            ),
            Verdict::Untyped if idx == cursor => Span::styled(expected.to_string(), caret),
            Verdict::Untyped => Span::styled(expected.to_string(), dim_bold()),
        })
        .collect()
}

/// First visible line so the caret line sits near the middle of the view.
fn scroll_offset(session: &Session, line_width: u16, visible_lines: u16) -> u16 {
    let line_width = usize::from(line_width.max(1));
    let typed: String = session.target().chars()[..session.cursor()].iter().collect();
    let caret_line = typed.width() / line_width;
    let total_lines = session.target().as_str().width() / line_width + 1;

    if total_lines <= usize::from(visible_lines) {
        return 0;
    }
    let offset = caret_line.saturating_sub(usize::from(visible_lines) / 2);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn render_typing(session: &Session, area: Rect, buf: &mut Buffer) {
    let line_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let text_width = session.target().as_str().width();
    let text_lines = ((text_width as f64 / f64::from(line_width)).ceil() as u16 + 1)
        .min(area.height.saturating_sub(6).max(1));
    let single_line = text_width <= usize::from(line_width);
    let text_lines = if single_line { 1 } else { text_lines };
    let padding = area.height.saturating_sub(text_lines + 6) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // duration selector
            Constraint::Length(1),
            Constraint::Length(1), // timer and live metrics
            Constraint::Length(1),
            Constraint::Length(text_lines),
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(duration_selector(session))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(readout(session))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let scroll = scroll_offset(session, line_width, chunks[5].height);
    Paragraph::new(Line::from(text_spans(session)))
        .alignment(if single_line {
            // single-line prompts are centered
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .render(chunks[5], buf);

    let legend = if session.status() == SessionStatus::Running {
        "(tab) new text / (esc) stop"
    } else {
        "(tab) new text / (←/→) duration / (esc)ape"
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[7], buf);
}

fn best_line(app: &App) -> Line<'static> {
    if app.is_new_best() {
        return Line::from(Span::styled(
            "new best!",
            bold().fg(Color::Magenta),
        ));
    }
    match app.best() {
        Some(best) => {
            let when = best
                .achieved_at
                .map(|t| format!(" on {}", t.format("%Y-%m-%d")))
                .unwrap_or_default();
            Line::from(Span::styled(
                format!("best {} wpm / {}% acc{}", best.wpm, best.accuracy, when),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ))
        }
        None => Line::from(Span::styled(
            "no best score yet",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )),
    }
}

fn render_results(app: &App, result: &SessionResult, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // chars and time
            Constraint::Length(1), // best score
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let coords = app.session.wpm_coords();
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(coords, app.session.duration_secs());
    let tuples: Vec<(f64, f64)> = coords.iter().map(|p| (*p).into()).collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(overall_duration), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(highest_wpm), bold()),
                ]),
        )
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {:.2} sd",
            result.wpm, result.accuracy, result.std_dev
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}/{} chars correct in {}s",
            result.correct_chars, result.total_chars, result.elapsed_secs
        ),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(best_line(app))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (←/→) duration / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[5], buf);
}
