//! Ratatui-based terminal dashboard.
//!
//! Shows the key statistics for the aligned data, one of three charts
//! (emissions, anomaly, both on their own scales) and optionally the merged
//! table. Pipeline failures are shown in the status line; the dashboard keeps
//! running so the inputs can be fixed and reloaded.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
};
use tracing::{info, warn};

use crate::app::pipeline::{RunConfig, load_and_run};
use crate::domain::{AlignedTable, ChartKind};
use crate::error::{AppError, EXIT_UNEXPECTED};
use crate::pipeline::PipelineRun;

mod plotters_chart;

use plotters_chart::{ChartSeries, SeriesChart};

const EMISSIONS_COLOR: RGBColor = RGBColor(0, 200, 0);
const ANOMALY_COLOR: RGBColor = RGBColor(255, 60, 60);

/// Start the dashboard.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_UNEXPECTED, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_UNEXPECTED, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_UNEXPECTED,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    run: Option<PipelineRun>,
    error: Option<String>,
    status: String,
    chart: ChartKind,
    show_table: bool,
    table_offset: usize,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let mut app = Self {
            config,
            run: None,
            error: None,
            status: String::new(),
            chart: ChartKind::Dual,
            show_table: false,
            table_offset: 0,
        };
        app.reload();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_UNEXPECTED, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_UNEXPECTED, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_UNEXPECTED, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('t') => {
                self.show_table = !self.show_table;
                self.table_offset = 0;
            }
            KeyCode::Char('1') => self.chart = ChartKind::Emissions,
            KeyCode::Char('2') => self.chart = ChartKind::Anomaly,
            KeyCode::Char('3') => self.chart = ChartKind::Dual,
            KeyCode::Tab => self.chart = next_chart(self.chart),
            KeyCode::Up => self.table_offset = self.table_offset.saturating_sub(1),
            KeyCode::Down => {
                let rows = self.run.as_ref().map_or(0, |r| r.aligned.len());
                if self.table_offset + 1 < rows {
                    self.table_offset += 1;
                }
            }
            _ => {}
        }
        false
    }

    fn reload(&mut self) {
        match load_and_run(&self.config) {
            Ok(run) => {
                info!(years = run.aligned.len(), "dashboard data loaded");
                self.status = format!("Loaded {} aligned years.", run.aligned.len());
                self.error = None;
                self.run = Some(run);
            }
            Err(err) => {
                warn!(error = %err, "dashboard reload failed");
                self.error = Some(format!("An error occurred while processing the data: {err}"));
                self.status = "Reload failed.".to_string();
                self.run = None;
            }
        }
        self.table_offset = 0;
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("climate", Style::default().fg(Color::Cyan)),
            Span::raw(": CO2 emissions vs temperature anomaly"),
        ]));
        lines.push(Line::from(Span::styled(
            format!("emissions: {} | temperature: {}", self.config.emissions, self.config.temperature),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            let stats = run.aligned.key_stats();
            let year = |y: Option<i32>| y.map_or_else(|| "-".to_string(), |y| y.to_string());
            lines.push(Line::from(Span::styled(
                format!(
                    "start year: {} | end year: {} | data points: {}",
                    year(stats.start_year),
                    year(stats.end_year),
                    stats.data_points
                ),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if !self.show_table {
            self.draw_chart(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(54)])
            .split(area);
        self.draw_chart(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(chart_title(self.chart)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let (msg, color) = match &self.error {
                Some(err) => (err.as_str(), Color::Red),
                None => ("Waiting for data...", Color::Yellow),
            };
            let p = Paragraph::new(msg)
                .style(Style::default().fg(color))
                .wrap(ratatui::widgets::Wrap { trim: true });
            frame.render_widget(p, inner);
            return;
        };

        let Some(data) = chart_data(&run.aligned, self.chart) else {
            let msg = Paragraph::new("No years present in both datasets.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SeriesChart {
            series: data
                .series
                .iter()
                .map(|(points, color)| ChartSeries {
                    points,
                    color: *color,
                })
                .collect(),
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "year",
            y_label: data.y_label,
            fmt_x: fmt_axis_year,
            fmt_y: fmt_axis_value,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Merged data").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(block, area);
            return;
        };

        let rows = run.aligned.records().iter().skip(self.table_offset).map(|r| {
            Row::new(vec![
                r.year.to_string(),
                format!("{:.3}", r.emissions),
                format!("{:.3}", r.anomaly),
            ])
        });
        let header = Row::new(vec!["Year", "Global CO2 Emissions", "Temperature_Anomaly"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let table = Table::new(rows, [Constraint::Length(6), Constraint::Length(22), Constraint::Length(20)])
            .header(header)
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "1/2/3/Tab chart  t table  ↑/↓ scroll  r reload  q quit";
        let (status, color) = match &self.error {
            Some(err) => (err.as_str(), Color::Red),
            None => (self.status.as_str(), Color::Yellow),
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn next_chart(cur: ChartKind) -> ChartKind {
    match cur {
        ChartKind::Emissions => ChartKind::Anomaly,
        ChartKind::Anomaly => ChartKind::Dual,
        ChartKind::Dual => ChartKind::Emissions,
    }
}

fn chart_title(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Emissions => "Global CO2 emissions per year",
        ChartKind::Anomaly => "Mean temperature anomaly per year",
        ChartKind::Dual => "Emissions (green) vs anomaly (red), each scaled to its range",
    }
}

/// Series and bounds for one chart, computed outside the render call.
#[derive(Debug, Clone)]
struct ChartData {
    series: Vec<(Vec<(f64, f64)>, RGBColor)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &'static str,
}

fn chart_data(table: &AlignedTable, kind: ChartKind) -> Option<ChartData> {
    let (first, last) = (table.first_year()?, table.last_year()?);
    let x_bounds = if last > first {
        [f64::from(first), f64::from(last)]
    } else {
        [f64::from(first) - 1.0, f64::from(last) + 1.0]
    };

    let (series, y_label) = match kind {
        ChartKind::Emissions => (vec![(table.emissions_points(), EMISSIONS_COLOR)], "emissions"),
        ChartKind::Anomaly => (vec![(table.anomaly_points(), ANOMALY_COLOR)], "anomaly (°C)"),
        ChartKind::Dual => (
            vec![
                (scale_to_unit(&table.emissions_points()), EMISSIONS_COLOR),
                (scale_to_unit(&table.anomaly_points()), ANOMALY_COLOR),
            ],
            "scaled (0-1)",
        ),
    };

    let y_bounds = y_bounds(series.iter().flat_map(|(points, _)| points.iter().map(|&(_, y)| y)));

    Some(ChartData {
        series,
        x_bounds,
        y_bounds,
        y_label,
    })
}

/// Min-max scale a series onto `[0, 1]`; a flat series sits at `0.5`.
fn scale_to_unit(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let span = hi - lo;
    points
        .iter()
        .map(|&(x, y)| {
            let u = if span > 0.0 { (y - lo) / span } else { 0.5 };
            (x, u)
        })
        .collect()
}

fn y_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for y in values {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

/// Compact tick label; emissions totals run into the tens of thousands.
fn fmt_axis_value(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_year(x0 + u * (x1 - x0));
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y0 + u * (y1 - y0));
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("year")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(data.y_label).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::domain::YearlySeries;

    fn table() -> AlignedTable {
        let emissions: YearlySeries = [(2000, 100.0), (2001, 300.0), (2002, 200.0)].into_iter().collect();
        let anomaly: YearlySeries = [(2000, 0.2), (2001, 0.4), (2002, 0.6)].into_iter().collect();
        align(&emissions, &anomaly)
    }

    #[test]
    fn dual_chart_rescales_each_series() {
        let data = chart_data(&table(), ChartKind::Dual).unwrap();
        assert_eq!(data.series.len(), 2);
        let emissions: Vec<f64> = data.series[0].0.iter().map(|&(_, y)| y).collect();
        assert_eq!(emissions, vec![0.0, 1.0, 0.5]);
        let anomaly: Vec<f64> = data.series[1].0.iter().map(|&(_, y)| y).collect();
        assert!((anomaly[1] - 0.5).abs() < 1e-12);
        assert_eq!(data.x_bounds, [2000.0, 2002.0]);
        assert!(data.y_bounds[0] < 0.0 && data.y_bounds[1] > 1.0);
    }

    #[test]
    fn single_series_keeps_raw_values() {
        let data = chart_data(&table(), ChartKind::Emissions).unwrap();
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].0[1], (2001.0, 300.0));
        assert_eq!(data.y_bounds, [90.0, 310.0]);
    }

    #[test]
    fn empty_table_has_no_chart() {
        assert!(chart_data(&AlignedTable::default(), ChartKind::Anomaly).is_none());
    }

    #[test]
    fn flat_series_scales_to_middle() {
        assert_eq!(scale_to_unit(&[(1.0, 5.0), (2.0, 5.0)]), vec![(1.0, 0.5), (2.0, 0.5)]);
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(fmt_axis_value(35_123.0), "35.1k");
        assert_eq!(fmt_axis_value(2_500_000.0), "2.5M");
        assert_eq!(fmt_axis_value(-0.126), "-0.13");
        assert_eq!(fmt_axis_year(2001.4), "2001");
    }

    #[test]
    fn chart_cycle_covers_all_kinds() {
        assert_eq!(next_chart(ChartKind::Emissions), ChartKind::Anomaly);
        assert_eq!(next_chart(ChartKind::Anomaly), ChartKind::Dual);
        assert_eq!(next_chart(ChartKind::Dual), ChartKind::Emissions);
    }
}
