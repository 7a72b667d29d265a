//! # Submission Module
//!
//! Turns the final field values of the intake modal into a flat
//! [`SubmissionRecord`], or into field-keyed [`ValidationErrors`] when a
//! required value is missing. Nothing here talks to the network.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::catalog::{Catalog, CUSTOM_SENTINEL};
use crate::view::{block_ids, NO_SELECTION};

/// Fields that must carry a value before a submission is accepted
pub const REQUIRED_FIELDS: [&str; 5] = [
    block_ids::CLIENT,
    block_ids::CLIENT_EMAIL,
    block_ids::QUANTITY,
    block_ids::ITEM,
    block_ids::DESCRIPTION,
];

/// Submitted values keyed by block id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: HashMap<String, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; every Description revision lands under one key
    pub fn insert(&mut self, block_id: impl Into<String>, value: impl Into<String>) {
        let block_id = block_id.into();
        let key = block_ids::canonical(&block_id).to_string();
        self.values.insert(key, value.into());
    }

    /// Trimmed value of `block_id`
    ///
    /// Blank values and the empty-select placeholder count as absent.
    pub fn get(&self, block_id: &str) -> Option<&str> {
        self.values
            .get(block_id)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty() && *value != NO_SELECTION)
    }

    fn text(&self, block_id: &str) -> String {
        self.get(block_id).unwrap_or_default().to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut values = Self::new();
        for (block_id, value) in iter {
            values.insert(block_id, value);
        }
        values
    }
}

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    /// The item is not in the catalog
    UnknownItem,
    /// The description is not offered for the chosen item
    DescriptionMismatch,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::UnknownItem => write!(f, "unknown item"),
            Self::DescriptionMismatch => write!(f, "not offered for the item"),
        }
    }
}

/// Field-level validation failures keyed by block id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, block_id: &str) -> Option<FieldError> {
        self.errors.get(block_id).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    fn merge(&mut self, other: ValidationErrors) {
        for (field, error) in other.errors {
            self.errors.entry(field).or_insert(error);
        }
    }

    /// Render every error to a user-facing message
    pub fn render<F>(&self, message: F) -> BTreeMap<String, String>
    where
        F: Fn(FieldError) -> String,
    {
        self.errors
            .iter()
            .map(|(field, error)| (field.clone(), message(*error)))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .errors
            .iter()
            .map(|(field, error)| format!("{field} ({error})"))
            .collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Flat record handed to the delivery sink
///
/// Serializes to the webhook payload; absent optional values are empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub job_number: String,
    pub client: String,
    pub client_email: String,
    pub date: String,
    pub deadline: String,
    pub status: String,
    pub quantity: String,
    pub size: String,
    pub invoice: String,
    pub payment_status: String,
    pub assignee: String,
    pub folder_link: String,
    pub item: String,
    pub description: String,
    pub notes: String,
    pub manufacture_notes: String,
    pub manufacture: String,
    pub second_manufacture: String,
    pub delivery_address: String,
    pub tracking: String,
    pub design_time: String,
}

/// Check the required fields
pub fn validate(values: &FieldValues) -> Result<(), ValidationErrors> {
    let errors: BTreeMap<String, FieldError> = REQUIRED_FIELDS
        .iter()
        .filter(|field| values.get(field).is_none())
        .map(|field| (field.to_string(), FieldError::Required))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// Check the chosen item and description against the catalog
///
/// Absent values are left to [`validate`]. The sentinel is offered for every
/// item, so it always passes.
pub fn validate_selection(catalog: &Catalog, values: &FieldValues) -> Result<(), ValidationErrors> {
    let mut errors = BTreeMap::new();

    if let Some(item) = values.get(block_ids::ITEM) {
        match catalog.descriptions_for(item) {
            None => {
                errors.insert(block_ids::ITEM.to_string(), FieldError::UnknownItem);
            }
            Some(offered) => {
                let description = values.get(block_ids::DESCRIPTION);
                if description.is_some_and(|d| !offered.iter().any(|o| o == d)) {
                    errors.insert(block_ids::DESCRIPTION.to_string(), FieldError::DescriptionMismatch);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// Final description, with the sentinel replaced by the custom text
///
/// Falls back to the sentinel itself when no custom text was typed.
pub fn resolve_description(values: &FieldValues) -> String {
    match values.get(block_ids::DESCRIPTION) {
        Some(CUSTOM_SENTINEL) => values
            .get(block_ids::CUSTOM_DESCRIPTION)
            .unwrap_or(CUSTOM_SENTINEL)
            .to_string(),
        Some(description) => description.to_string(),
        None => String::new(),
    }
}

/// Validate the submitted values and build the record
///
/// # Errors
///
/// Returns [`ValidationErrors`] naming every missing required field; no
/// record is produced in that case.
pub fn handle_submit(values: &FieldValues) -> Result<SubmissionRecord, ValidationErrors> {
    validate(values)?;
    Ok(build_record(values))
}

/// Like [`handle_submit`], also rejecting item and description pairs the
/// catalog does not offer
///
/// # Errors
///
/// Returns every missing field and every catalog mismatch at once.
pub fn handle_catalog_submit(
    catalog: &Catalog,
    values: &FieldValues,
) -> Result<SubmissionRecord, ValidationErrors> {
    let mut errors = validate(values).err().unwrap_or_default();
    if let Err(selection) = validate_selection(catalog, values) {
        errors.merge(selection);
    }

    if errors.is_empty() {
        Ok(build_record(values))
    } else {
        Err(errors)
    }
}

fn build_record(values: &FieldValues) -> SubmissionRecord {
    SubmissionRecord {
        job_number: values.text(block_ids::JOB_NUMBER),
        client: values.text(block_ids::CLIENT),
        client_email: values.text(block_ids::CLIENT_EMAIL),
        date: values.text(block_ids::DATE),
        deadline: values.text(block_ids::DEADLINE),
        status: values.text(block_ids::STATUS),
        quantity: values.text(block_ids::QUANTITY),
        size: values.text(block_ids::SIZE),
        invoice: values.text(block_ids::INVOICE),
        payment_status: values.text(block_ids::PAYMENT_STATUS),
        assignee: values.text(block_ids::ASSIGNEE),
        folder_link: values.text(block_ids::FOLDER_LINK),
        item: values.text(block_ids::ITEM),
        description: resolve_description(values),
        notes: values.text(block_ids::NOTES),
        manufacture_notes: values.text(block_ids::MANUFACTURE_NOTES),
        manufacture: values.text(block_ids::MANUFACTURE),
        second_manufacture: values.text(block_ids::SECOND_MANUFACTURE),
        delivery_address: values.text(block_ids::DELIVERY_ADDRESS),
        tracking: values.text(block_ids::TRACKING),
        design_time: values.text(block_ids::DESIGN_TIME),
    }
}
