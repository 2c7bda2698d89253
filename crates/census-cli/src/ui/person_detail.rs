//! Person detail pane — right panel.

use census_core::person::{PersonView, birth_date_text};
use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::format_cpf;

/// Render `person` into `area`.
pub fn draw(f: &mut Frame, area: Rect, person: &PersonView) {
  let block = Block::default()
    .title(format!(" {} ", person.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let local = |dt: chrono::DateTime<chrono::Utc>| {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
  };

  let mut lines = vec![
    row("CPF", Some(format_cpf(&person.tax_id))),
    row("Birth date", Some(birth_date_text(person.birth_date))),
    row("Email", person.email.clone()),
    row("Gender", person.gender.clone()),
    row("Place of birth", person.place_of_birth.clone()),
    row("Nationality", person.nationality.clone()),
    Line::from(""),
  ];
  lines.push(Line::from(Span::styled(
    format!(
      "#{}  created {}  updated {}",
      person.id,
      local(person.created_at),
      local(person.updated_at)
    ),
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn row(label: &'static str, value: Option<String>) -> Line<'static> {
  let value = match value {
    Some(v) => Span::raw(v),
    None => Span::styled("—", Style::default().fg(Color::DarkGray)),
  };
  Line::from(vec![
    Span::styled(
      format!("{label:<16}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    value,
  ])
}
