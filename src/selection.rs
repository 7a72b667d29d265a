//! # Dependent Selection Module
//!
//! State machine behind the Item → Description → Custom text disclosure of the
//! intake modal.
//!
//! ## States
//!
//! - [`SelectionState::NoItem`]: the Description select is an inert placeholder
//! - [`SelectionState::ItemChosen`]: Description offers exactly the catalog
//!   list of the chosen item
//! - [`SelectionState::CustomDescription`]: the sentinel was picked and a
//!   required free-text field follows the Description select
//!
//! Every transition returns a brand new [`FormView`]; fields other than the
//! dependent ones are carried over untouched.

use tracing::{debug, warn};

use crate::catalog::{Catalog, CUSTOM_SENTINEL};
use crate::view::{block_ids, Field, FieldKind, FormView, SelectOption};

/// Observable progress of the dependent fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoItem,
    ItemChosen,
    CustomDescription,
}

/// User interaction with one of the dependent selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent<'a> {
    ItemSelected(&'a str),
    DescriptionSelected(&'a str),
}

impl<'a> SelectionEvent<'a> {
    /// Map a platform action to an event; other action ids are not ours
    pub fn from_action(action_id: &str, value: &'a str) -> Option<Self> {
        match action_id {
            block_ids::ITEM => Some(Self::ItemSelected(value)),
            id if block_ids::is_description(id) => Some(Self::DescriptionSelected(value)),
            _ => None,
        }
    }
}

/// Description select offering `descriptions`; empty renders the placeholder
pub fn description_field(revision: u32, descriptions: &[String]) -> Field {
    Field::new(
        block_ids::description(revision),
        "Description",
        FieldKind::Select {
            placeholder: "Choose description".to_string(),
            options: descriptions.iter().map(SelectOption::plain).collect(),
            initial_value: None,
        },
    )
    .dispatching()
}

/// The Description select, whatever its current revision
pub fn description_block(view: &FormView) -> Option<&Field> {
    view.find_field(block_ids::is_description)
}

pub fn description_options(view: &FormView) -> Option<&[SelectOption]> {
    description_block(view).and_then(Field::options)
}

/// Free-text field shown once the sentinel description is picked
pub fn custom_description_field() -> Field {
    Field::new(
        block_ids::CUSTOM_DESCRIPTION,
        "Custom Description",
        FieldKind::Text {
            multiline: false,
            initial_value: None,
        },
    )
}

/// Derive the current state from a view
pub fn state_of(view: &FormView) -> SelectionState {
    if view.contains(block_ids::CUSTOM_DESCRIPTION) {
        return SelectionState::CustomDescription;
    }
    match description_options(view) {
        Some(options) if !options.is_empty() => SelectionState::ItemChosen,
        _ => SelectionState::NoItem,
    }
}

/// Compute the view that follows `event`
///
/// # Transitions
///
/// - item selected: Description is rebuilt from the catalog under a new
///   revision of its block id and any custom field is dropped; an unknown
///   item falls back to the placeholder
/// - sentinel description selected: exactly one custom field after Description
/// - any other description: the custom field is removed
pub fn apply(catalog: &Catalog, view: &FormView, event: SelectionEvent<'_>) -> FormView {
    match event {
        SelectionEvent::ItemSelected(item) => {
            let descriptions: &[String] = match catalog.descriptions_for(item) {
                Some(descriptions) => descriptions,
                None => {
                    warn!(item = %item, "Selected item is not in the catalog");
                    &[]
                }
            };
            let current = description_block(view)
                .map(|field| field.block_id.clone())
                .unwrap_or_else(|| block_ids::DESCRIPTION.to_string());
            let revision = block_ids::description_revision(&current)
                .map_or(0, |revision| revision.wrapping_add(1));
            debug!(
                item = %item,
                options = descriptions.len(),
                revision,
                "Rebuilding description field"
            );

            view.with_field_replacing(&current, description_field(revision, descriptions))
                .without_field(block_ids::CUSTOM_DESCRIPTION)
        }
        SelectionEvent::DescriptionSelected(description) if description == CUSTOM_SENTINEL => {
            let anchor = description_block(view)
                .map(|field| field.block_id.clone())
                .unwrap_or_else(|| block_ids::DESCRIPTION.to_string());
            view.with_field_after(&anchor, custom_description_field())
        }
        SelectionEvent::DescriptionSelected(_) => view.without_field(block_ids::CUSTOM_DESCRIPTION),
    }
}
