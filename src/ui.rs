use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row as TableRow, Table, TableState, Wrap},
};

use tablescout::{Row, favorite_label};

use crate::domain::HELP_TEXT;
use crate::model::{Model, Status};

pub const COLUMN_WIDTH_MARGIN: usize = 1;
const FAVORITES_PANEL_MAX_ROWS: usize = 5;
const STATUS_MESSAGE_FADE: Duration = Duration::from_secs(5);

pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        TableUI
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let area = frame.area();
        if model.status == Status::LOADING {
            self.draw_loading(model, frame, area);
        } else {
            self.draw_table_screen(model, frame, area);
        }
        if model.show_help() {
            self.draw_help(frame, area);
        }
    }

    fn draw_loading(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let [body, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let path = model.config().data_path.display().to_string();
        let text = Text::from(vec![Line::from(vec![
            "Loading data from ".into(),
            path.yellow(),
            " ...".into(),
        ])]);
        let block = Block::bordered()
            .title(Line::from(" tablescout ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Paragraph::new(text).centered().block(block), body);
        self.draw_status_line(model, frame, status);
    }

    fn draw_table_screen(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let query = model.query();
        let summary = query.filter_state().describe();
        let nfavorites = query.favorites().len();
        let favorites_height = if nfavorites == 0 {
            0
        } else {
            std::cmp::min(nfavorites, FAVORITES_PANEL_MAX_ROWS) as u16 + 2
        };

        let [filters, summary_area, favorites, table, footer, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(u16::from(summary.is_some())),
            Constraint::Length(favorites_height),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.draw_filters(model, frame, filters);
        if let Some(sentence) = summary {
            frame.render_widget(Paragraph::new(sentence.italic()), summary_area);
        }
        if nfavorites > 0 {
            self.draw_favorites(model, frame, favorites);
        }
        self.draw_rows(model, frame, table);
        self.draw_pagination(model, frame, footer);
        self.draw_status_line(model, frame, status);
    }

    fn draw_filters(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let state = model.query().filter_state();
        let ntext = state.text_filters().len();
        let mut constraints = vec![Constraint::Fill(1); ntext];
        constraints.push(Constraint::Length(14));
        constraints.push(Constraint::Length(14));
        let cells = Layout::horizontal(constraints).split(area);

        for (idx, filter) in state.text_filters().iter().enumerate() {
            let editing = model
                .active_input()
                .filter(|(column, _)| *column == filter.column);
            let (value, style) = match editing {
                Some((_, input)) => (input.input.clone(), Style::new().yellow()),
                None if filter.query.is_empty() => {
                    (format!("Filter by {}", filter.column), Style::new().dark_gray())
                }
                None => (filter.query.clone(), Style::new()),
            };
            let block = Block::bordered().title(format!(" {} {} ", idx + 1, filter.column));
            let block = if editing.is_some() {
                block.border_style(Style::new().yellow())
            } else {
                block
            };
            frame.render_widget(Paragraph::new(value).style(style).block(block), cells[idx]);

            if let Some((_, input)) = editing {
                let x = cells[idx].x + 1 + input.cursor as u16;
                frame.set_cursor_position(Position::new(x, cells[idx].y + 1));
            }
        }

        let formation = state
            .formation
            .map(|f| f.code().to_string())
            .unwrap_or_else(|| "All".to_string());
        let category = state
            .category
            .map(|c| c.code().to_string())
            .unwrap_or_else(|| "All".to_string());
        frame.render_widget(
            Paragraph::new(formation).block(Block::bordered().title(" F Formation ")),
            cells[ntext],
        );
        frame.render_widget(
            Paragraph::new(category).block(Block::bordered().title(" C Category ")),
            cells[ntext + 1],
        );
    }

    fn draw_favorites(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let labels = &model.config().labels;
        let lines: Vec<Line> = model
            .query()
            .favorites()
            .iter()
            .take(FAVORITES_PANEL_MAX_ROWS)
            .map(|row| Line::from(vec!["★ ".yellow(), favorite_label(row, labels).into()]))
            .collect();
        let block = Block::bordered().title(format!(
            " Your favorites ({}) ",
            model.query().favorites().len()
        ));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn column_width(name: &str, rows: &[&Row], max_width: usize) -> u16 {
        let widest = rows
            .iter()
            .filter_map(|r| r.get(name))
            .map(|v| v.chars().count())
            .max()
            .unwrap_or(0);
        let width = std::cmp::max(name.chars().count(), widest) + COLUMN_WIDTH_MARGIN;
        std::cmp::min(width, max_width) as u16
    }

    fn draw_rows(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let query = model.query();
        let columns = query.columns();
        let rows = query.page_rows();
        let max_width = model.config().max_column_width;

        let mut widths = vec![Constraint::Length(2)];
        widths.extend(
            columns
                .iter()
                .map(|c| Constraint::Length(Self::column_width(c, &rows, max_width))),
        );

        let header = TableRow::new(
            std::iter::once(Cell::from("★"))
                .chain(columns.iter().map(|c| Cell::from(c.as_str())))
                .collect::<Vec<_>>(),
        )
        .style(Style::new().bold().reversed());

        let block = Block::bordered().border_set(border::PLAIN);
        if rows.is_empty() {
            let empty = Paragraph::new("No results found.".dark_gray())
                .centered()
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let body: Vec<TableRow> = rows
            .iter()
            .map(|row| {
                let star = if query.is_favorite(row) {
                    Cell::from("★".yellow())
                } else {
                    Cell::from("☆".dark_gray())
                };
                let cells = columns.iter().map(|c| {
                    let value = row.get(c).unwrap_or_default();
                    if value.starts_with("http") {
                        Cell::from(Span::styled(
                            value.to_string(),
                            Style::new().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                        ))
                    } else {
                        Cell::from(value.to_string())
                    }
                });
                TableRow::new(std::iter::once(star).chain(cells).collect::<Vec<_>>())
            })
            .collect();

        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed());
        let mut state = TableState::default().with_selected(Some(model.selected_row()));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_pagination(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let query = model.query();
        if query.total_pages() <= 1 {
            let text = format!("{} results", query.total_count());
            frame.render_widget(Paragraph::new(text).centered(), area);
            return;
        }
        let prev = if query.current_page() == 1 {
            "◀ Previous".dark_gray()
        } else {
            "◀ Previous".into()
        };
        let next = if query.current_page() == query.total_pages() {
            "Next ▶".dark_gray()
        } else {
            "Next ▶".into()
        };
        let line = Line::from(vec![
            prev,
            format!(
                "  Page {} of {} -- ({} results)  ",
                query.current_page(),
                query.total_pages(),
                query.total_count()
            )
            .into(),
            next,
        ]);
        frame.render_widget(Paragraph::new(line).centered(), area);
    }

    fn draw_status_line(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let style = if model.last_status_message_update().elapsed() > STATUS_MESSAGE_FADE {
            Style::new().dark_gray()
        } else {
            Style::new()
        };
        let line = Line::from(vec![
            Span::styled(model.status_message().to_string(), style),
            "  <?> help  <q> quit".dark_gray(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let popup = Self::centered(area, 64, 16);
        frame.render_widget(Clear, popup);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> close ").centered())
            .border_set(border::THICK);
        frame.render_widget(
            Paragraph::new(HELP_TEXT).wrap(Wrap { trim: false }).block(block),
            popup,
        );
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = std::cmp::min(width, area.width);
        let height = std::cmp::min(height, area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_width_is_capped() {
        let long = Row::from_pairs([("VILLE", "Saint-Pierre-et-Miquelon-la-Grande")]);
        let short = Row::from_pairs([("VILLE", "Pau")]);
        assert_eq!(TableUI::column_width("VILLE", &[&short], 30), 6);
        assert_eq!(TableUI::column_width("VILLE", &[&short, &long], 12), 12);
    }

    #[test]
    fn popup_is_centered_and_fits() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(TableUI::centered(area, 64, 16), Rect::new(18, 12, 64, 16));
        let tiny = Rect::new(0, 0, 10, 5);
        assert_eq!(TableUI::centered(tiny, 64, 16), tiny);
    }
}
