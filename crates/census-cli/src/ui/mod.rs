//! TUI rendering — orchestrates all panes.

pub mod person_detail;
pub mod person_form;
pub mod person_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();
  let [header, body, status] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(0),
    Constraint::Length(1),
  ])
  .areas(area);

  draw_header(f, header, app);
  draw_body(f, body, app);
  draw_status(f, status, app);

  match app.screen {
    Screen::Form => {
      if let Some(form) = &app.form {
        person_form::draw(f, area, form);
      }
    }
    Screen::ConfirmDelete => {
      if let Some(person) = &app.selected {
        person_form::draw_confirm(f, area, person);
      }
    }
    _ => {}
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let bar = Style::default().bg(Color::DarkGray);
  let title = Line::from(Span::styled(
    " census",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  ));
  let stamp = Line::from(format!(
    "{} records · {} ",
    app.persons.len(),
    Local::now().format("%Y-%m-%d")
  ))
  .right_aligned();

  f.render_widget(Paragraph::new(title).style(bar), area);
  f.render_widget(Paragraph::new(stamp), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let [list, detail] =
    Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
      .areas(area);

  person_list::draw(f, list, app);

  match &app.selected {
    Some(person) => person_detail::draw(f, detail, person),
    None => draw_empty_detail(f, detail),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select a person and press Enter.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::List if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter done",
    ),
    Screen::List => (
      "NORMAL",
      "↑↓/jk navigate  Enter detail  n new  e edit  d delete  r reload  q quit",
    ),
    Screen::Detail => ("DETAIL", "Esc back  e edit  d delete  q quit"),
    Screen::Form => ("EDIT", "Tab next  Shift-Tab prev  Enter save  Esc cancel"),
    Screen::ConfirmDelete => ("DELETE", "y confirm  n cancel"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Mask an 11-digit CPF as `000.000.000-00`; anything else is returned as is.
pub fn format_cpf(tax_id: &str) -> String {
  if tax_id.len() != 11 || !tax_id.bytes().all(|b| b.is_ascii_digit()) {
    return tax_id.to_string();
  }
  format!(
    "{}.{}.{}-{}",
    &tax_id[0..3],
    &tax_id[3..6],
    &tax_id[6..9],
    &tax_id[9..11]
  )
}

/// A rectangle of `width` × `height` cells centred in `area`, clamped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cpf_is_masked() {
    assert_eq!(format_cpf("11144477735"), "111.444.777-35");
  }

  #[test]
  fn non_canonical_cpf_passes_through() {
    assert_eq!(format_cpf("1114447773"), "1114447773");
    assert_eq!(format_cpf("111.444.777-35"), "111.444.777-35");
  }

  #[test]
  fn centered_clamps_to_area() {
    let area = Rect::new(0, 0, 20, 10);
    assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
    assert_eq!(centered(area, 40, 40), area);
  }
}
