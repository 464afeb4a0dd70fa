use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table,
        canvas::{Canvas, Line},
    },
};

use crate::app::{App, Theme};
use crate::flash::Flash;
use crate::format::{
    format_count, format_currency_magnitude, format_percent, format_price, format_signed_percent,
};
use crate::table::{SortField, visible_window};
use crate::token::{Category, PricePoint, Token};

const LIVE_TOGGLE_WIDTH: u16 = 32;
const TOOLTIP: &str = "Live price updates via WebSocket";
const ROW_HEIGHT: u16 = 2;
const SKELETON_ROWS: u16 = 5;
const COPY_BUTTON_WIDTH: u16 = 12;
const CLOSE_BUTTON: &str = "[x]";
const MODAL_MAX_WIDTH: u16 = 76;
const MODAL_MAX_HEIGHT: u16 = 24;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Token,
    Sort(SortField),
    Chart,
    Action,
}

const COLUMNS: [Column; 9] = [
    Column::Token,
    Column::Sort(SortField::Price),
    Column::Sort(SortField::PriceChange24h),
    Column::Sort(SortField::Volume24h),
    Column::Sort(SortField::MarketCap),
    Column::Sort(SortField::Liquidity),
    Column::Sort(SortField::Holders),
    Column::Chart,
    Column::Action,
];

impl Column {
    fn width(self) -> u16 {
        match self {
            Column::Token => 30,
            Column::Sort(SortField::Price) => 12,
            Column::Sort(SortField::PriceChange24h) => 10,
            Column::Sort(SortField::Holders) => 9,
            Column::Sort(_) => 12,
            Column::Chart => 14,
            Column::Action => 6,
        }
    }
}

/// What sits under a terminal cell, for mouse handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Tab(Category),
    LiveToggle,
    Header(SortField),
    /// Index into the sorted table.
    Row(usize),
    CopyAddress,
    CloseDetails,
    Modal,
    Backdrop,
    None,
}

pub struct Areas {
    pub header: Rect,
    pub live_toggle: Rect,
    pub tabs: Rect,
    pub table: Rect,
    pub footer: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title + live toggle
            Constraint::Length(1), // Tabs
            Constraint::Min(5),    // Table
            Constraint::Length(2), // Activity + key hints
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(LIVE_TOGGLE_WIDTH)])
        .split(chunks[0]);

    Areas {
        header: chunks[0],
        live_toggle: header[1],
        tabs: chunks[1],
        table: chunks[2],
        footer: chunks[3],
    }
}

struct ModalAreas {
    close_button: Rect,
    header: Rect,
    metrics: Rect,
    chart: Rect,
    address: Rect,
    copy_button: Rect,
    links: Rect,
    hint: Rect,
}

fn modal_area(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(MODAL_MAX_WIDTH);
    let height = area.height.saturating_sub(2).min(MODAL_MAX_HEIGHT);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn modal_layout(modal: Rect) -> ModalAreas {
    let inner = modal_block().inner(modal);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Name, symbol, stats line
            Constraint::Length(4), // Metric grid
            Constraint::Min(3),    // Chart
            Constraint::Length(2), // Contract address
            Constraint::Length(1), // Social links
            Constraint::Length(1), // Hint
        ])
        .split(inner);

    let address = chunks[3];
    let button_width = COPY_BUTTON_WIDTH.min(address.width);
    let copy_button = Rect {
        x: address.x + address.width - button_width,
        y: address.y + 1,
        width: button_width,
        height: 1.min(address.height.saturating_sub(1)),
    };

    let close_width = (CLOSE_BUTTON.len() as u16).min(modal.width);
    let close_button = Rect {
        x: (modal.x + modal.width).saturating_sub(close_width + 2).max(modal.x),
        y: modal.y,
        width: close_width,
        height: 1.min(modal.height),
    };

    ModalAreas {
        close_button,
        header: chunks[0],
        metrics: chunks[1],
        chart: chunks[2],
        address,
        copy_button,
        links: chunks[4],
        hint: chunks[5],
    }
}

fn modal_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

fn table_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

fn column_areas(inner: Rect) -> Vec<Rect> {
    Layout::horizontal(COLUMNS.map(|c| Constraint::Length(c.width())))
        .flex(Flex::Start)
        .spacing(1)
        .split(inner)
        .to_vec()
}

fn tab_titles(app: &App) -> Vec<String> {
    Category::ALL
        .iter()
        .map(|c| format!(" {} {} ", c.label(), app.snapshot(*c).tokens.len()))
        .collect()
}

fn tab_areas(area: Rect, titles: &[String]) -> Vec<Rect> {
    Layout::horizontal(
        titles
            .iter()
            .map(|t| Constraint::Length(t.chars().count() as u16)),
    )
    .flex(Flex::Start)
    .spacing(1)
    .split(area)
    .to_vec()
}

fn visible_rows(inner: Rect) -> usize {
    (inner.height.saturating_sub(2) / ROW_HEIGHT) as usize
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

pub fn hit_test(app: &App, area: Rect, x: u16, y: u16) -> Hit {
    if app.selected_token().is_some() {
        let modal = modal_area(area);
        if !contains(modal, x, y) {
            return Hit::Backdrop;
        }
        let parts = modal_layout(modal);
        if contains(parts.close_button, x, y) {
            return Hit::CloseDetails;
        }
        if contains(parts.copy_button, x, y) {
            return Hit::CopyAddress;
        }
        return Hit::Modal;
    }

    let areas = layout(area);
    if contains(areas.live_toggle, x, y) {
        return Hit::LiveToggle;
    }

    if contains(areas.tabs, x, y) {
        let titles = tab_titles(app);
        return tab_areas(areas.tabs, &titles)
            .iter()
            .zip(Category::ALL)
            .find(|(rect, _)| contains(**rect, x, y))
            .map(|(_, category)| Hit::Tab(category))
            .unwrap_or(Hit::None);
    }

    if app.is_loading() || !contains(areas.table, x, y) {
        return Hit::None;
    }

    let inner = table_block().inner(areas.table);
    if y == inner.y {
        return column_areas(inner)
            .iter()
            .zip(COLUMNS)
            .find(|(rect, _)| x >= rect.x && x < rect.x + rect.width)
            .and_then(|(_, column)| match column {
                Column::Sort(field) => Some(Hit::Header(field)),
                _ => None,
            })
            .unwrap_or(Hit::None);
    }

    let rows_top = inner.y + 2;
    if y < rows_top || !contains(inner, x, y) {
        return Hit::None;
    }
    let len = app.snapshot(app.active).tokens.len();
    let start = visible_window(app.cursor, len, visible_rows(inner));
    let row = start + ((y - rows_top) / ROW_HEIGHT) as usize;
    if row < len {
        Hit::Row(row)
    } else {
        Hit::None
    }
}

struct Palette {
    bg: Color,
    fg: Color,
    border: Color,
    muted: Color,
    accent: Color,
    cursor: Color,
}

fn palette(theme: &Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            border: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Blue,
            cursor: Color::Rgb(225, 228, 240),
        },
        Theme::Dark => Palette {
            bg: Color::Rgb(20, 20, 25),
            fg: Color::White,
            border: Color::DarkGray,
            muted: Color::Gray,
            accent: Color::LightBlue,
            cursor: Color::Rgb(40, 40, 55),
        },
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let colors = palette(&app.theme);
    let base_style = Style::default().bg(colors.bg).fg(colors.fg);

    // Fill background
    let size = f.area();
    f.render_widget(Block::default().style(base_style), size);

    let areas = layout(size);
    render_header(f, app, &areas, &colors);
    render_tabs(f, app, areas.tabs, &colors);
    render_table(f, app, areas.table, &colors);
    render_footer(f, app, areas.footer, &colors);

    if app.show_tooltip {
        render_tooltip(f, areas.live_toggle, size);
    }

    if let Some(token) = app.selected_token() {
        render_details(f, app, &token, size, &colors);
    }
}

fn render_header(f: &mut Frame, app: &App, areas: &Areas, colors: &Palette) {
    let title = Paragraph::new(TextLine::from(vec![Span::styled(
        "Token Discovery",
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )]));
    f.render_widget(title, areas.header);

    let (checkbox, status) = if app.live_updates {
        (
            "[x]",
            Span::styled("● Connected", Style::default().fg(Color::Green)),
        )
    } else {
        (
            "[ ]",
            Span::styled("○ Disconnected", Style::default().fg(colors.muted)),
        )
    };
    let toggle = Paragraph::new(TextLine::from(vec![
        Span::raw(format!("{} Live Updates  ", checkbox)),
        status,
    ]))
    .alignment(Alignment::Right);
    f.render_widget(toggle, areas.live_toggle);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let titles = tab_titles(app);
    for ((title, rect), category) in titles.iter().zip(tab_areas(area, &titles)).zip(Category::ALL) {
        let style = if category == app.active {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.muted)
        };
        f.render_widget(Paragraph::new(Span::styled(title.clone(), style)), rect);
    }
}

fn render_table(f: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let block = table_block()
        .border_style(Style::default().fg(colors.border))
        .title(format!(" {} ", app.active.label()));
    let inner = block.inner(area);

    if app.is_loading() {
        f.render_widget(block, area);
        render_skeleton(f, inner, colors);
        return;
    }

    let sorted = app.sorted_tokens();
    if sorted.is_empty() {
        let notice = Paragraph::new(vec![
            TextLine::from(""),
            TextLine::from("⚠"),
            TextLine::from(""),
            TextLine::from("No tokens found in this category"),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.muted))
        .block(block);
        f.render_widget(notice, area);
        return;
    }

    let header = Row::new(COLUMNS.map(|column| match column {
        Column::Token => "Token".to_string(),
        Column::Sort(field) => app.sort.header(field),
        Column::Chart => "Chart".to_string(),
        Column::Action => "Action".to_string(),
    }))
    .style(
        Style::default()
            .fg(colors.muted)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let height = visible_rows(inner);
    let start = visible_window(app.cursor, sorted.len(), height);
    let rows: Vec<Row> = sorted
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, token)| {
            let row = token_row(app, token, colors);
            if i == app.cursor {
                row.style(Style::default().bg(colors.cursor))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(rows, COLUMNS.map(|c| Constraint::Length(c.width())))
        .header(header)
        .column_spacing(1)
        .flex(Flex::Start)
        .block(block);
    f.render_widget(table, area);
}

fn token_row<'a>(app: &App, token: &Token, colors: &Palette) -> Row<'a> {
    let mut name_line = vec![
        Span::styled(
            format!(" {} ", token.initials()),
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            token.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    for badge in token.badges.iter().flatten() {
        name_line.push(Span::raw(" "));
        name_line.push(Span::styled(
            badge.clone(),
            Style::default().fg(Color::LightBlue),
        ));
    }
    let symbol_line = TextLine::from(Span::styled(
        format!("     {}", token.symbol),
        Style::default().fg(colors.muted),
    ));

    let price_style = match app.flash(&token.id) {
        Some(Flash::Up) => Style::default().bg(Color::Rgb(20, 70, 35)),
        Some(Flash::Down) => Style::default().bg(Color::Rgb(85, 25, 25)),
        None => Style::default(),
    };

    let (arrow, change_color) = if token.is_up() {
        ("▲", Color::Green)
    } else {
        ("▼", Color::Red)
    };

    let action = if app.is_copied(&token.address) {
        Cell::from(Span::styled("✓", Style::default().fg(Color::Green)))
    } else {
        Cell::from(Span::styled(
            "View",
            Style::default().bg(Color::Blue).fg(Color::White),
        ))
    };

    Row::new(vec![
        Cell::from(Text::from(vec![TextLine::from(name_line), symbol_line])),
        Cell::from(format_price(token.price)).style(price_style),
        Cell::from(format!("{} {}", arrow, format_percent(token.price_change_24h)))
            .style(Style::default().fg(change_color)),
        Cell::from(format_currency_magnitude(token.volume_24h)),
        Cell::from(format_currency_magnitude(token.market_cap)),
        Cell::from(format_currency_magnitude(token.liquidity)),
        Cell::from(format_count(token.holders)),
        Cell::from(sparkline(&token.chart_data, Column::Chart.width() as usize))
            .style(Style::default().fg(Color::Blue)),
        action,
    ])
    .height(ROW_HEIGHT)
}

fn render_skeleton(f: &mut Frame, inner: Rect, colors: &Palette) {
    let bar = "▒".repeat(inner.width as usize);
    let mut lines = Vec::new();
    for _ in 0..SKELETON_ROWS {
        lines.push(TextLine::from(Span::styled(
            bar.clone(),
            Style::default().fg(colors.border),
        )));
        lines.push(TextLine::from(""));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let last_log = app.logs.last().cloned().unwrap_or_default();
    let sort_keys: String = SortField::ALL.iter().map(|field| field.key()).collect();
    let hints = format!(
        "q quit · Tab/1-3 category · {} sort · ↑↓ move · Enter details · y copy · Space live · t theme",
        sort_keys
    );
    let text = vec![
        TextLine::from(Span::styled(last_log, Style::default().fg(colors.fg))),
        TextLine::from(Span::styled(hints, Style::default().fg(colors.muted))),
    ];
    f.render_widget(Paragraph::new(text), area);
}

fn render_tooltip(f: &mut Frame, anchor: Rect, bounds: Rect) {
    let width = (TOOLTIP.chars().count() as u16 + 2).min(bounds.width);
    let x = (anchor.x + anchor.width)
        .saturating_sub(width)
        .max(bounds.x);
    let y = (anchor.y + 1).min(bounds.y + bounds.height.saturating_sub(1));
    let rect = Rect {
        x,
        y,
        width,
        height: 1,
    };
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(format!(" {} ", TOOLTIP))
            .style(Style::default().bg(Color::Rgb(30, 30, 40)).fg(Color::White)),
        rect,
    );
}

fn render_details(f: &mut Frame, app: &App, token: &Token, area: Rect, colors: &Palette) {
    let modal = modal_area(area);
    let parts = modal_layout(modal);

    f.render_widget(Clear, modal);
    f.render_widget(
        modal_block()
            .border_style(Style::default().fg(colors.accent))
            .title(format!(" {} ", token.name))
            .style(Style::default().bg(colors.bg).fg(colors.fg)),
        modal,
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            CLOSE_BUTTON,
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )),
        parts.close_button,
    );

    let mut title = vec![
        Span::styled(
            format!(" {} ", token.initials()),
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            token.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", token.symbol), Style::default().fg(colors.muted)),
    ];
    for badge in token.badges.iter().flatten() {
        title.push(Span::raw(" "));
        title.push(Span::styled(badge.clone(), Style::default().fg(Color::LightBlue)));
    }
    let stats = TextLine::from(Span::styled(
        format!(
            "Holders {} · Tx 24h {} · Created {}",
            format_count(token.holders),
            format_count(token.transactions_24h),
            token.created_at.format("%Y-%m-%d %H:%M UTC")
        ),
        Style::default().fg(colors.muted),
    ));
    f.render_widget(
        Paragraph::new(vec![TextLine::from(title), stats]),
        parts.header,
    );

    render_metrics(f, token, parts.metrics, colors);
    render_price_chart(f, token, parts.chart, colors);

    let copy_label = if app.is_copied(&token.address) {
        Span::styled("✓ Copied!", Style::default().fg(Color::Green))
    } else {
        Span::styled("[y] Copy", Style::default().fg(colors.accent))
    };
    f.render_widget(
        Paragraph::new(vec![
            TextLine::from(Span::styled(
                "Contract Address",
                Style::default().fg(colors.muted),
            )),
            TextLine::from(token.address.clone()),
        ]),
        parts.address,
    );
    f.render_widget(
        Paragraph::new(TextLine::from(copy_label)).alignment(Alignment::Right),
        parts.copy_button,
    );

    let mut links: Vec<Span> = Vec::new();
    for (kind, url) in token.social_links.iter() {
        links.push(Span::styled(
            format!("↗ {} ", kind.label()),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ));
        links.push(Span::styled(
            format!("{}   ", url),
            Style::default().fg(colors.muted),
        ));
    }
    if token.social_links.is_empty() {
        links.push(Span::styled(
            "No social links",
            Style::default().fg(colors.muted),
        ));
    }
    f.render_widget(Paragraph::new(TextLine::from(links)), parts.links);

    f.render_widget(
        Paragraph::new("Esc/[x] close · ↑↓ next token · y copy address")
            .style(Style::default().fg(colors.muted)),
        parts.hint,
    );
}

fn render_metrics(f: &mut Frame, token: &Token, area: Rect, colors: &Palette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let label = |text: &'static str| TextLine::from(Span::styled(text, Style::default().fg(colors.muted)));
    let value = |text: String| {
        Span::styled(text, Style::default().fg(colors.fg).add_modifier(Modifier::BOLD))
    };

    let change_color = if token.is_up() { Color::Green } else { Color::Red };
    f.render_widget(
        Paragraph::new(vec![
            label("Price"),
            TextLine::from(vec![
                value(format_price(token.price)),
                Span::raw("  "),
                Span::styled(
                    format_signed_percent(token.price_change_24h),
                    Style::default().fg(change_color),
                ),
            ]),
        ]),
        top[0],
    );
    f.render_widget(
        Paragraph::new(vec![
            label("Market Cap"),
            TextLine::from(value(format_currency_magnitude(token.market_cap))),
        ]),
        top[1],
    );
    f.render_widget(
        Paragraph::new(vec![
            label("24h Volume"),
            TextLine::from(value(format_currency_magnitude(token.volume_24h))),
        ]),
        bottom[0],
    );
    f.render_widget(
        Paragraph::new(vec![
            label("Liquidity"),
            TextLine::from(value(format_currency_magnitude(token.liquidity))),
        ]),
        bottom[1],
    );
}

fn render_price_chart(f: &mut Frame, token: &Token, area: Rect, colors: &Palette) {
    let points = &token.chart_data;
    let (low, high) = price_bounds(points);
    let pad = ((high - low) * 0.05).max(high.abs() * 0.001).max(f64::EPSILON);
    let color = match (points.first(), points.last()) {
        (Some(first), Some(last)) if last.price < first.price => Color::Red,
        _ => Color::Green,
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.border))
                .title(format!("Chart - {} 24h", token.symbol)),
        )
        .x_bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
        .y_bounds([low - pad, high + pad])
        .paint(|ctx| {
            for (i, pair) in points.windows(2).enumerate() {
                ctx.draw(&Line {
                    x1: i as f64,
                    y1: pair[0].price,
                    x2: (i + 1) as f64,
                    y2: pair[1].price,
                    color,
                });
            }
        });
    f.render_widget(canvas, area);
}

fn price_bounds(points: &[PricePoint]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 1.0);
    }
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.price), hi.max(p.price))
    })
}

/// Compresses a price series into `width` block characters.
pub fn sparkline(points: &[PricePoint], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }
    let (low, high) = price_bounds(points);
    let width = width.min(points.len());
    let top = (SPARK_LEVELS.len() - 1) as f64;

    (0..width)
        .map(|i| {
            let price = points[i * points.len() / width].price;
            let level = if high > low {
                (((price - low) / (high - low)) * top).round() as usize
            } else {
                SPARK_LEVELS.len() / 2
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}
