use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use log::{error, info};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};

use crate::catalog::{Catalog, Section, load_catalog};
use crate::cbz::{CbzDocument, CbzSource};
use crate::detail::DetailView;
use crate::document::{DocumentHandle, DocumentSource};
use crate::errors::RenderError;
use crate::event_source::EventSource;
use crate::notification::{NotificationManager, Severity};
use crate::reader::{
    LOAD_FAILED_TEXT, PagerView, PanelState, ReaderSession, RenderPass, SpreadLayout,
    SpreadPanels, SpreadView, render_spread,
};
use crate::settings;
use crate::surface::PixelSurface;
use crate::viewport::FixedViewport;

const TOP_BAR_ROWS: u16 = 2;
const PAGER_ROWS: u16 = 3;
const FALLBACK_FONT_SIZE: (u16, u16) = (8, 16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Library,
    Detail,
    Reader,
}

pub struct App {
    base_dir: PathBuf,
    catalog: Option<Catalog>,
    catalog_error: Option<String>,
    view: View,
    library_cursor: usize,
    detail: Option<DetailView>,
    volume_cursor: usize,
    active_title: Option<String>,
    session: Option<ReaderSession>,
    document: Option<CbzDocument>,
    panels: SpreadPanels<PixelSurface>,
    picker: Option<Picker>,
    left_protocol: Option<StatefulProtocol>,
    right_protocol: Option<StatefulProtocol>,
    last_spread_view: Option<SpreadView>,
    notifications: NotificationManager,
    bookmarked: bool,
    terminal_size: Rect,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::new_with_config(None, true)
    }

    /// `query_terminal` is off in tests, where probing the terminal for an
    /// image protocol would block or fail.
    pub fn new_with_config(catalog_path: Option<&str>, query_terminal: bool) -> Self {
        let catalog_path = catalog_path
            .map(str::to_string)
            .unwrap_or_else(settings::get_catalog_path);
        let path = Path::new(&catalog_path);
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let (catalog, catalog_error) = match load_catalog(path) {
            Ok(catalog) => {
                info!(
                    "catalog {catalog_path}: {} entries, {} sections",
                    catalog.entries.len(),
                    catalog.sections.len()
                );
                (Some(catalog), None)
            }
            Err(e) => {
                error!("catalog load failed: {e}");
                (None, Some(format!("Could not load library metadata. {e}")))
            }
        };

        let picker = if query_terminal {
            Picker::from_query_stdio().ok()
        } else {
            None
        };

        Self {
            base_dir,
            catalog,
            catalog_error,
            view: View::Library,
            library_cursor: 0,
            detail: None,
            volume_cursor: 0,
            active_title: None,
            session: None,
            document: None,
            panels: SpreadPanels::default(),
            picker,
            left_protocol: None,
            right_protocol: None,
            last_spread_view: None,
            notifications: NotificationManager::new(),
            bookmarked: false,
            terminal_size: Rect::new(0, 0, 120, 40),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> Option<&ReaderSession> {
        self.session.as_ref()
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    fn font_size(&self) -> (f32, f32) {
        let (w, h) = self
            .picker
            .as_ref()
            .map(|p| p.font_size())
            .unwrap_or(FALLBACK_FONT_SIZE);
        (w as f32, h as f32)
    }

    /// Metrics for the render fit math, in logical pixels derived from the
    /// terminal grid and the cell font size.
    fn current_viewport(&self) -> FixedViewport {
        let (fw, fh) = self.font_size();
        let cols = self.terminal_size.width as f32;
        let rows = self.terminal_size.height as f32;
        let top_bar = TOP_BAR_ROWS as f32 * fh;
        let pager = PAGER_ROWS as f32 * fh;
        let stage_rows = (rows - TOP_BAR_ROWS as f32 - PAGER_ROWS as f32).max(1.0);

        FixedViewport {
            window: (cols * fw, rows * fh),
            stage: (cols * fw, stage_rows * fh),
            top_bar_height: top_bar,
            pager_height: pager,
            panel_gap: 2.0 * fw,
            device_pixel_ratio: 1.0,
        }
    }

    // --- document lifecycle ---

    pub fn load_document(&mut self, archive: &str) {
        self.bookmarked = false;
        self.notifications.clear();
        self.last_spread_view = None;
        self.left_protocol = None;
        self.right_protocol = None;

        let config = settings::reader_config();
        let direction = settings::initial_direction();
        let viewport = self.current_viewport();
        let single_page = viewport.window.0 < config.single_page_breakpoint;

        match CbzSource::new(&self.base_dir).open(archive) {
            Ok(document) => {
                let pages = document.page_count();
                info!("opened {archive}: {pages} pages");
                self.document = Some(document);
                let mut session = ReaderSession::new(pages, direction, single_page, config);
                let index = session.current_spread();
                let pass = session.request_render(index);
                self.session = Some(session);
                self.view = View::Reader;
                self.drive_render(pass);
            }
            Err(e) => {
                error!("failed to open {archive}: {e}");
                self.document = None;
                let mut session = ReaderSession::after_load_failure(direction, config);
                let pass = session.request_render(0);
                self.session = Some(session);
                self.view = View::Reader;
                self.notifications
                    .show_persistent_error(format!("Could not load {archive}. {e}"));
                self.drive_render(pass);
            }
        }
    }

    fn close_reader(&mut self) {
        self.session = None;
        self.document = None;
        self.last_spread_view = None;
        self.left_protocol = None;
        self.right_protocol = None;
        self.notifications.clear();
        self.view = if self.detail.is_some() {
            View::Detail
        } else {
            View::Library
        };
    }

    // --- render trampoline ---

    /// Executes admitted render passes until the scheduler runs dry. A
    /// failing render still completes its pass so coalesced requests drain.
    fn drive_render(&mut self, pass: Option<RenderPass>) {
        let mut next = pass;
        while let Some(pass) = next {
            let index = pass.index();
            if let Err(e) = self.execute_render(index) {
                error!("render of spread {index} failed: {e}");
                self.notifications.show_error(format!("Render failed: {e}"));
            }
            next = self.session.as_mut().and_then(ReaderSession::complete_render);
        }
    }

    fn execute_render(&mut self, index: usize) -> Result<(), RenderError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let Some(spread) = session.spread_at(index).copied() else {
            return Ok(());
        };
        let direction = session.direction();
        let zoom = session.zoom();
        let viewport = self.current_viewport();

        let view = match self.document.as_mut() {
            Some(document) => render_spread(
                document,
                &mut self.panels,
                &viewport,
                &spread,
                direction,
                zoom,
            )?,
            None => SpreadView {
                layout: SpreadLayout::Single,
                left: PanelState::Placeholder(LOAD_FAILED_TEXT),
                right: PanelState::Hidden,
            },
        };

        self.refresh_protocols();
        self.last_spread_view = Some(view);
        Ok(())
    }

    fn refresh_protocols(&mut self) {
        let Some(picker) = self.picker.as_mut() else {
            self.left_protocol = None;
            self.right_protocol = None;
            return;
        };
        self.left_protocol = (!self.panels.left.is_empty())
            .then(|| picker.new_resize_protocol(self.panels.left.to_image()));
        self.right_protocol = (!self.panels.right.is_empty())
            .then(|| picker.new_resize_protocol(self.panels.right.to_image()));
    }

    // --- input ---

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Library => self.handle_library_key(key.code),
            View::Detail => self.handle_detail_key(key.code),
            View::Reader => self.handle_reader_key(key.code),
        }
    }

    fn handle_library_key(&mut self, code: KeyCode) {
        let entry_count = self.catalog.as_ref().map_or(0, |c| c.entries.len());
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                if entry_count > 0 {
                    self.library_cursor = (self.library_cursor + 1).min(entry_count - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.library_cursor = self.library_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.open_detail(),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, code: KeyCode) {
        let volume_count = self.detail.as_ref().map_or(0, |d| d.volumes.len());
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('h') => {
                self.detail = None;
                self.view = View::Library;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if volume_count > 0 {
                    self.volume_cursor = (self.volume_cursor + 1).min(volume_count - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.volume_cursor = self.volume_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.open_selected_volume(),
            _ => {}
        }
    }

    fn handle_reader_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.close_reader(),
            KeyCode::Left => {
                let pass = self.session.as_mut().and_then(ReaderSession::press_left);
                self.drive_render(pass);
            }
            KeyCode::Right => {
                let pass = self.session.as_mut().and_then(ReaderSession::press_right);
                self.drive_render(pass);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let pass = self.session.as_mut().and_then(ReaderSession::zoom_in);
                self.drive_render(pass);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                let pass = self.session.as_mut().and_then(ReaderSession::zoom_out);
                self.drive_render(pass);
            }
            KeyCode::Char('d') => {
                let pass = self
                    .session
                    .as_mut()
                    .and_then(ReaderSession::toggle_direction);
                if let Some(session) = self.session.as_ref() {
                    settings::set_direction(session.direction());
                }
                self.drive_render(pass);
            }
            KeyCode::Char('b') => {
                self.bookmarked = !self.bookmarked;
            }
            _ => {}
        }
    }

    fn open_detail(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        let Some(entry) = catalog.entries.get(self.library_cursor) else {
            return;
        };
        self.detail = Some(DetailView::from_entry(entry));
        self.active_title = Some(entry.title.clone());
        self.volume_cursor = 0;
        self.view = View::Detail;
    }

    fn open_selected_volume(&mut self) {
        let archive = self
            .detail
            .as_ref()
            .and_then(|d| d.volumes.get(self.volume_cursor))
            .map(|v| v.archive.clone());
        if let Some(archive) = archive {
            self.load_document(&archive);
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = Rect::new(0, 0, width, height);
        if self.view == View::Reader {
            let window_width = self.current_viewport().window.0;
            let pass = self
                .session
                .as_mut()
                .and_then(|s| s.on_viewport_change(window_width));
            self.drive_render(pass);
        }
    }

    // --- drawing ---

    pub fn draw(&mut self, frame: &mut Frame) {
        self.terminal_size = frame.area();
        match self.view {
            View::Library => self.draw_library(frame, frame.area()),
            View::Detail => self.draw_detail(frame, frame.area()),
            View::Reader => self.draw_reader(frame, frame.area()),
        }
    }

    fn draw_library(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Mangokrat Library ");
        let mut lines: Vec<Line> = Vec::new();

        if let Some(error) = &self.catalog_error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(""));
        }

        if let Some(catalog) = &self.catalog {
            let sections = if catalog.sections.is_empty() {
                vec![Section {
                    id: "all".to_string(),
                    title: "All Manga".to_string(),
                }]
            } else {
                catalog.sections.clone()
            };

            for section in &sections {
                let items: Vec<_> = if section.id == "all" {
                    catalog.entries.iter().collect()
                } else {
                    catalog.entries_in_section(&section.id)
                };
                if items.is_empty() {
                    continue;
                }

                lines.push(Line::from(Span::styled(
                    section.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for item in items {
                    let index = catalog.entries.iter().position(|e| e.id == item.id);
                    let selected = index == Some(self.library_cursor);
                    let genres = if item.genres.is_empty() {
                        "Manga".to_string()
                    } else {
                        item.genres.join(", ")
                    };
                    let style = if selected {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("  {} ({})", item.title, genres),
                        style,
                    )));
                }
                lines.push(Line::from(""));
            }
        } else if self.catalog_error.is_none() {
            lines.push(Line::from("No manga available. Add entries to the catalog."));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_detail(&mut self, frame: &mut Frame, area: Rect) {
        let Some(detail) = &self.detail else {
            return;
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", detail.title));
        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                detail.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} · {} · {} · {}",
                detail.author, detail.status, detail.age_rating, detail.rating_label
            )),
            Line::from(detail.genres.join(", ")),
            Line::from(""),
        ];
        for paragraph in &detail.paragraphs {
            lines.push(Line::from(paragraph.clone()));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Volumes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (index, volume) in detail.volumes.iter().enumerate() {
            let date = if volume.date.is_empty() {
                "Coming soon"
            } else {
                volume.date.as_str()
            };
            let style = if index == self.volume_cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("  {} · {}", volume.title, date),
                style,
            )));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_reader(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(TOP_BAR_ROWS),
                Constraint::Min(1),
                Constraint::Length(PAGER_ROWS),
            ])
            .split(area);

        self.draw_top_bar(frame, chunks[0]);
        self.draw_stage(frame, chunks[1]);
        self.draw_pager(frame, chunks[2]);
    }

    fn draw_top_bar(&mut self, frame: &mut Frame, area: Rect) {
        let title = self.active_title.as_deref().unwrap_or("Reader");
        let bookmark = if self.bookmarked { " ♥" } else { "" };
        let line = Line::from(format!("{title}{bookmark}"));
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM)),
            area,
        );
    }

    fn draw_stage(&mut self, frame: &mut Frame, area: Rect) {
        let banner = self
            .notifications
            .current()
            .map(|n| (n.severity, n.message.clone()));

        if let Some(view) = self.last_spread_view.clone() {
            let (left_area, right_area) = stage_split(area, view.layout);
            self.draw_panel(frame, left_area, &view.left, true);
            if let Some(right_area) = right_area {
                self.draw_panel(frame, right_area, &view.right, false);
            }
        }

        if let Some((severity, message)) = banner {
            let color = match severity {
                Severity::Info => Color::Blue,
                Severity::Warning => Color::Yellow,
                Severity::Error => Color::Red,
            };
            let banner_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: 1,
            };
            frame.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::White).bg(color)),
                banner_area,
            );
        }
    }

    fn draw_panel(&mut self, frame: &mut Frame, area: Rect, state: &PanelState, left: bool) {
        match state {
            PanelState::Hidden => {}
            PanelState::Placeholder(text) => {
                let middle = vertical_center(area, 1);
                frame.render_widget(
                    Paragraph::new(*text).alignment(Alignment::Center),
                    middle,
                );
            }
            PanelState::Content { width, height } => {
                let (fw, fh) = self.font_size();
                let content_area = centered_content(area, *width, *height, fw, fh);
                let surface = if left {
                    &self.panels.left
                } else {
                    &self.panels.right
                };
                let overlay: Vec<Line> = surface
                    .texts()
                    .iter()
                    .map(|item| Line::from(item.content.clone()))
                    .collect();

                let protocol = if left {
                    self.left_protocol.as_mut()
                } else {
                    self.right_protocol.as_mut()
                };
                match protocol {
                    Some(protocol) => {
                        frame.render_stateful_widget(StatefulImage::default(), content_area, protocol);
                    }
                    None if overlay.is_empty() => {
                        // No image protocol available: textual stand-in.
                        let middle = vertical_center(content_area, 1);
                        frame.render_widget(
                            Paragraph::new(format!("[page {width}x{height}]"))
                                .alignment(Alignment::Center),
                            middle,
                        );
                    }
                    None => {}
                }

                if !overlay.is_empty() {
                    let rows = overlay.len() as u16;
                    let middle = vertical_center(content_area, rows);
                    frame.render_widget(
                        Paragraph::new(overlay).alignment(Alignment::Center),
                        middle,
                    );
                }
            }
        }
    }

    fn draw_pager(&mut self, frame: &mut Frame, area: Rect) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let pager = PagerView::for_session(session);

        let disabled = Style::default().fg(Color::DarkGray);
        let left_style = if pager.left_enabled {
            Style::default()
        } else {
            disabled
        };
        let right_style = if pager.right_enabled {
            Style::default()
        } else {
            disabled
        };

        let line = Line::from(vec![
            Span::styled(format!("◀ {}", pager.left_label), left_style),
            Span::raw("   "),
            Span::raw(pager.indicator),
            Span::raw("   "),
            Span::styled(format!("{} ▶", pager.right_label), right_style),
            Span::raw("   "),
            Span::raw(format!("zoom {}", pager.zoom_label)),
            Span::raw("   "),
            Span::raw(pager.direction_label),
        ]);
        frame.render_widget(
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::TOP)),
            area,
        );
    }
}

/// Splits the stage for one or two panels, with a one-cell gap for doubles.
fn stage_split(area: Rect, layout: SpreadLayout) -> (Rect, Option<Rect>) {
    match layout {
        SpreadLayout::Single => (area, None),
        SpreadLayout::Double => {
            let chunks = Layout::default()
                .direction(LayoutDirection::Horizontal)
                .constraints([
                    Constraint::Percentage(50),
                    Constraint::Length(1),
                    Constraint::Percentage(50),
                ])
                .split(area);
            (chunks[0], Some(chunks[2]))
        }
    }
}

/// Cell rectangle for content of the given logical pixel size, centered.
fn centered_content(area: Rect, width: u32, height: u32, fw: f32, fh: f32) -> Rect {
    let cols = ((width as f32 / fw).ceil() as u16).clamp(1, area.width.max(1));
    let rows = ((height as f32 / fh).ceil() as u16).clamp(1, area.height.max(1));
    Rect {
        x: area.x + (area.width.saturating_sub(cols)) / 2,
        y: area.y + (area.height.saturating_sub(rows)) / 2,
        width: cols,
        height: rows,
    }
}

fn vertical_center(area: Rect, rows: u16) -> Rect {
    let rows = rows.min(area.height.max(1));
    Rect {
        x: area.x,
        y: area.y + (area.height.saturating_sub(rows)) / 2,
        width: area.width,
        height: rows,
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if let Some(event) = event_source.poll_event(Duration::from_millis(250))? {
            match event {
                Event::Key(key) => app.handle_key_event(key),
                Event::Resize(width, height) => app.on_resize(width, height),
                _ => {}
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
