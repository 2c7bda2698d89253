//! Create/edit popup and the delete confirmation dialog.

use census_core::person::PersonView;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use super::{centered, format_cpf};
use crate::form::{FormField, PersonForm};

const LABEL_WIDTH: usize = 16;

/// Render `form` as a popup over `area`.
pub fn draw(f: &mut Frame, area: Rect, form: &PersonForm) {
  let title = match form.editing {
    Some(id) => format!(" Edit #{id} "),
    None => " New person ".to_string(),
  };
  let height = FormField::ALL.len() as u16 + 4;
  let popup = centered(area, 60, height);

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);

  let mut lines: Vec<Line> = FormField::ALL
    .iter()
    .map(|&field| {
      let focused = field == form.focus;
      let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Cyan)
      };
      let cursor = if focused { "_" } else { "" };
      Line::from(vec![
        Span::styled(
          format!("{:<w$}", field.label(), w = LABEL_WIDTH),
          label_style,
        ),
        Span::raw(format!("{}{cursor}", form.value(field))),
      ])
    })
    .collect();

  lines.push(Line::from(""));
  lines.push(match &form.error {
    Some(msg) => Line::from(Span::styled(
      msg.clone(),
      Style::default().fg(Color::Red),
    )),
    None => Line::from(Span::styled(
      "Birth date as YYYY-MM-DD.  * required",
      Style::default().fg(Color::DarkGray),
    )),
  });

  f.render_widget(Paragraph::new(lines), inner);
}

/// Render the yes/no dialog for deleting `person`.
pub fn draw_confirm(f: &mut Frame, area: Rect, person: &PersonView) {
  let popup = centered(area, 50, 5);
  let block = Block::default()
    .title(" Delete ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);

  let lines = vec![
    Line::from(format!(
      "Delete {} ({})?",
      person.name,
      format_cpf(&person.tax_id)
    )),
    Line::from(Span::styled(
      "[y] yes  [n] no",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
