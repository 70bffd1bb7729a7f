//! Country selector state machine
//!
//! Three coupled widgets share one piece of state: the multi-select list and
//! the "select all" / "deselect all" toggles.
//!
//! | Event               | selected   | select_all | deselect_all |
//! |---------------------|------------|------------|--------------|
//! | `SelectAll(true)`   | universe   | true       | false        |
//! | `DeselectAll(true)` | empty      | false      | true         |
//! | `SelectAll(false)`  | unchanged  | false      | unchanged    |
//! | `DeselectAll(false)`| unchanged  | unchanged  | false        |
//! | `Edit(list)`        | list       | false      | false        |
//!
//! The two toggles are never both on. Picking every country by hand leaves
//! `select_all` off.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A change made to one of the three widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum SelectorEvent {
    SelectAll(bool),
    DeselectAll(bool),
    /// Direct edit of the multi-select list
    #[serde(rename = "countries")]
    Edit(Vec<String>),
}

/// Current values of the three widgets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorState {
    /// Selected countries in widget order
    pub selected: Vec<String>,
    #[serde(default)]
    pub select_all: bool,
    #[serde(default)]
    pub deselect_all: bool,
}

impl SelectorState {
    /// State showing `selected` with both toggles off
    pub fn with_selected(selected: Vec<String>) -> Self {
        Self {
            selected,
            select_all: false,
            deselect_all: false,
        }
    }

    /// Selected countries as a set, for building a selection
    pub fn selected_set(&self) -> BTreeSet<String> {
        self.selected.iter().cloned().collect()
    }
}

/// Apply one event to a state, keeping only countries in `universe`
///
/// The prior state is normalized first, so a state posted by a client that
/// breaks the toggle rules cannot carry through.
pub fn transition(universe: &[String], state: &SelectorState, event: SelectorEvent) -> SelectorState {
    let mut next = normalize(universe, state);
    match event {
        SelectorEvent::SelectAll(true) => {
            next.selected = universe.to_vec();
            next.select_all = true;
            next.deselect_all = false;
        }
        SelectorEvent::DeselectAll(true) => {
            next.selected.clear();
            next.select_all = false;
            next.deselect_all = true;
        }
        SelectorEvent::SelectAll(false) => next.select_all = false,
        SelectorEvent::DeselectAll(false) => next.deselect_all = false,
        SelectorEvent::Edit(list) => {
            next.selected = keep_known(universe, list);
            next.select_all = false;
            next.deselect_all = false;
        }
    }
    next
}

/// Drop unknown countries and duplicates, and switch off any toggle the
/// selection contradicts
///
/// `select_all` survives only over the full universe and `deselect_all`
/// only over an empty selection.
pub fn normalize(universe: &[String], state: &SelectorState) -> SelectorState {
    let selected = keep_known(universe, state.selected.iter().cloned());
    let full = !universe.is_empty() && selected.len() == universe.len();
    SelectorState {
        select_all: state.select_all && full,
        deselect_all: state.deselect_all && selected.is_empty(),
        selected,
    }
}

fn keep_known(universe: &[String], countries: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    countries
        .into_iter()
        .filter(|country| {
            if !universe.contains(country) {
                tracing::debug!(country = %country, "Dropping unknown country from selection");
                return false;
            }
            seen.insert(country.clone())
        })
        .collect()
}

/// One tab's country widgets
#[derive(Debug, Clone)]
pub struct CountrySelector {
    universe: Arc<[String]>,
    defaults: Vec<String>,
    state: SelectorState,
}

impl CountrySelector {
    /// Create a selector over `universe`, starting from `defaults`
    ///
    /// Defaults that are not in the universe are skipped.
    pub fn new(universe: Arc<[String]>, defaults: &[String]) -> Self {
        let defaults: Vec<String> = defaults
            .iter()
            .filter(|c| universe.contains(c))
            .cloned()
            .collect();
        let state = SelectorState::with_selected(defaults.clone());
        Self {
            universe,
            defaults,
            state,
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Apply an event and return the reconciled state
    pub fn apply(&mut self, event: SelectorEvent) -> &SelectorState {
        self.state = transition(&self.universe, &self.state, event);
        &self.state
    }

    /// Back to the default selection with both toggles off
    pub fn reset(&mut self) {
        self.state = SelectorState::with_selected(self.defaults.clone());
    }

    pub fn selected_set(&self) -> BTreeSet<String> {
        self.state.selected_set()
    }
}
