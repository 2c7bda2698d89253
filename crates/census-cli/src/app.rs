//! Application state machine and event dispatcher.

use std::sync::Arc;

use census_core::person::{PersonId, PersonView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::{
  client::{ApiClient, ApiFailure},
  form::PersonForm,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the person list.
  List,
  /// Focus on the detail pane.
  Detail,
  /// The create/edit popup is open.
  Form,
  /// Waiting for a yes/no on deleting the selected person.
  ConfirmDelete,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Every person, as last fetched from the API.
  pub persons: Vec<PersonView>,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* person list.
  pub list_cursor: usize,

  /// The person shown in the detail pane.
  pub selected: Option<PersonView>,

  /// The open form, on [`Screen::Form`].
  pub form: Option<PersonForm>,

  /// Screen to return to when the form or dialog closes.
  return_to: Screen,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::List,
      persons: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      selected: None,
      form: None,
      return_to: Screen::List,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all persons from the API and populate `self.persons`.
  pub async fn load_persons(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading people…".into();
    match self.client.list_persons().await {
      Ok(persons) => {
        self.persons = persons;
        let len = self.filtered_persons().len();
        self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Persons whose name or CPF matches the current filter query.
  pub fn filtered_persons(&self) -> Vec<&PersonView> {
    if self.filter.is_empty() {
      return self.persons.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .persons
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.name, &self.filter).is_some()
          || matcher.fuzzy_match(&p.tax_id, &self.filter).is_some()
      })
      .collect()
  }

  /// The person under the list cursor in the filtered view, if any.
  pub fn cursor_person(&self) -> Option<&PersonView> {
    self.filtered_persons().get(self.list_cursor).copied()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return Ok(false);
    }

    match self.screen {
      Screen::Form => {
        self.handle_form_key(key).await;
        Ok(true)
      }
      Screen::ConfirmDelete => {
        self.handle_confirm_key(key).await;
        Ok(true)
      }
      Screen::List if self.filter_active => {
        self.handle_filter_key(key);
        Ok(true)
      }
      Screen::List => self.handle_list_key(key).await,
      Screen::Detail => self.handle_detail_key(key).await,
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_persons().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_person().map(|p| p.id) {
          self.open_detail(id).await;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('r') => {
        // Failure is already on the status bar.
        let _ = self.load_persons().await;
      }
      KeyCode::Char('n') => self.open_form(PersonForm::blank()),
      KeyCode::Char('e') => {
        if let Some(form) = self.cursor_person().map(PersonForm::from_view) {
          self.open_form(form);
        }
      }
      KeyCode::Char('d') => {
        if let Some(person) = self.cursor_person().cloned() {
          self.selected = Some(person);
          self.return_to = Screen::List;
          self.screen = Screen::ConfirmDelete;
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::List;
        self.selected = None;
      }
      KeyCode::Char('e') => {
        if let Some(form) = self.selected.as_ref().map(PersonForm::from_view) {
          self.open_form(form);
        }
      }
      KeyCode::Char('d') => {
        if self.selected.is_some() {
          self.return_to = Screen::Detail;
          self.screen = Screen::ConfirmDelete;
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(form) = self.form.as_mut() else {
      self.screen = self.return_to;
      return;
    };
    match key.code {
      KeyCode::Esc => {
        self.form = None;
        self.screen = self.return_to;
      }
      KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
      KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
      KeyCode::Backspace => form.pop(),
      KeyCode::Char(c) => form.push(c),
      KeyCode::Enter => self.submit_form().await,
      _ => {}
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => self.delete_selected().await,
      KeyCode::Char('n') | KeyCode::Esc => self.screen = self.return_to,
      _ => {}
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn open_form(&mut self, form: PersonForm) {
    self.return_to = if self.screen == Screen::Detail {
      Screen::Detail
    } else {
      Screen::List
    };
    self.form = Some(form);
    self.screen = Screen::Form;
  }

  /// Transition to `Detail` for `id`, refetching the record.
  async fn open_detail(&mut self, id: PersonId) {
    match self.client.get_person(id).await {
      Ok(person) => {
        self.selected = Some(person);
        self.screen = Screen::Detail;
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  /// Check the form locally, then send it. Server rejections land back on
  /// the form.
  async fn submit_form(&mut self) {
    let Some(form) = self.form.as_mut() else { return };
    let Ok(input) = form.check() else { return };

    let result = match form.editing {
      Some(id) => self.client.update_person(id, &input).await,
      None => self.client.create_person(&input).await,
    };

    match result {
      Ok(person) => {
        self.status_msg = format!("Saved {}", person.name);
        self.form = None;
        self.selected = Some(person);
        self.screen = Screen::Detail;
        match self.client.list_persons().await {
          Ok(persons) => self.persons = persons,
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
      Err(e) => match e.downcast::<ApiFailure>() {
        Ok(failure) => form.reject(failure.message, failure.field),
        Err(e) => form.reject(e.to_string(), None),
      },
    }
  }

  async fn delete_selected(&mut self) {
    let Some(person) = self.selected.take() else {
      self.screen = Screen::List;
      return;
    };
    match self.client.delete_person(person.id).await {
      Ok(()) => {
        self.screen = Screen::List;
        if self.load_persons().await.is_ok() {
          self.status_msg = format!("Deleted {}", person.name);
        }
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        self.selected = Some(person);
        self.screen = self.return_to;
      }
    }
  }
}
