//! # Form View Module
//!
//! Platform-independent model of the intake modal: an ordered list of fields,
//! each addressed by a stable block id. Views are immutable values; every
//! change produces a new [`FormView`] that replaces the previous one wholesale.

/// Value shown in a select that has nothing to offer yet
///
/// Slack rejects selects without options, so an empty option list renders as
/// this single entry. Submitting it counts as "nothing selected".
pub const NO_SELECTION: &str = "—";

/// Block ids of the intake modal; action ids are identical
///
/// Every id is stable except Description, which gets a new revision each time
/// its options are rebuilt so Slack drops the previous selection.
pub mod block_ids {
    pub const JOB_NUMBER: &str = "jobNumber";
    pub const CLIENT: &str = "client";
    pub const CLIENT_EMAIL: &str = "clientEmail";
    pub const QUANTITY: &str = "quantity";
    pub const SIZE: &str = "size";
    pub const INVOICE: &str = "invoice";
    pub const FOLDER_LINK: &str = "folderLink";
    pub const NOTES: &str = "notes";
    pub const MANUFACTURE_NOTES: &str = "manufactureNotes";
    pub const DELIVERY_ADDRESS: &str = "deliveryAddress";
    pub const TRACKING: &str = "tracking";
    pub const DESIGN_TIME: &str = "designTime";
    pub const DATE: &str = "date";
    pub const DEADLINE: &str = "deadline";
    pub const ASSIGNEE: &str = "assignee";
    pub const STATUS: &str = "status";
    pub const PAYMENT_STATUS: &str = "paymentStatus";
    pub const MANUFACTURE: &str = "manufacture";
    pub const SECOND_MANUFACTURE: &str = "secondManufacture";
    pub const ITEM: &str = "item";
    pub const DESCRIPTION: &str = "description";
    pub const CUSTOM_DESCRIPTION: &str = "customDescription";

    const REVISION_SEPARATOR: &str = "-r";

    /// Description block id for `revision`; revision 0 is the bare id
    pub fn description(revision: u32) -> String {
        if revision == 0 {
            DESCRIPTION.to_string()
        } else {
            format!("{DESCRIPTION}{REVISION_SEPARATOR}{revision}")
        }
    }

    /// Revision encoded in a Description block id, `None` for other ids
    pub fn description_revision(id: &str) -> Option<u32> {
        if id == DESCRIPTION {
            return Some(0);
        }
        id.strip_prefix(DESCRIPTION)?
            .strip_prefix(REVISION_SEPARATOR)?
            .parse()
            .ok()
    }

    pub fn is_description(id: &str) -> bool {
        description_revision(id).is_some()
    }

    /// Id under which a block's value is read; all Description revisions
    /// share [`DESCRIPTION`]
    pub fn canonical(id: &str) -> &str {
        if is_description(id) {
            DESCRIPTION
        } else {
            id
        }
    }
}

/// One `(label, value)` entry of a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    /// Option whose label and value are the same text
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            value: text,
        }
    }
}

/// Supported field kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text {
        multiline: bool,
        initial_value: Option<String>,
    },
    Email,
    Url,
    Date,
    Select {
        placeholder: String,
        options: Vec<SelectOption>,
        initial_value: Option<String>,
    },
    /// Workspace member picker
    User,
}

/// A single input of the modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub block_id: String,
    pub label: String,
    pub optional: bool,
    /// Whether changing the field emits an action event before submission
    pub dispatch_action: bool,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(block_id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            block_id: block_id.into(),
            label: label.into(),
            optional: false,
            dispatch_action: false,
            kind,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn dispatching(mut self) -> Self {
        self.dispatch_action = true;
        self
    }

    /// Options of a select field, `None` for other kinds
    pub fn options(&self) -> Option<&[SelectOption]> {
        match &self.kind {
            FieldKind::Select { options, .. } => Some(options),
            _ => None,
        }
    }
}

/// Ordered, id-unique collection of fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    fields: Vec<Field>,
}

impl FormView {
    /// Build a view; a later field with an already used block id is dropped
    pub fn new(fields: Vec<Field>) -> Self {
        let mut view = Self::default();
        for field in fields {
            if !view.contains(&field.block_id) {
                view.fields.push(field);
            }
        }
        view
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, block_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.block_id == block_id)
    }

    pub fn contains(&self, block_id: &str) -> bool {
        self.field(block_id).is_some()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.block_id.as_str())
    }

    /// Options of the select with `block_id`
    pub fn options_of(&self, block_id: &str) -> Option<&[SelectOption]> {
        self.field(block_id).and_then(Field::options)
    }

    /// New view with `field` in place of the field sharing its block id,
    /// or appended when there is none
    pub fn with_field(&self, field: Field) -> Self {
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|f| f.block_id == field.block_id) {
            Some(slot) => *slot = field,
            None => fields.push(field),
        }
        Self { fields }
    }

    /// New view with `field` placed right after `anchor`
    ///
    /// An existing field with the same block id is replaced in place instead,
    /// so a view never holds the same id twice. A missing anchor appends.
    pub fn with_field_after(&self, anchor: &str, field: Field) -> Self {
        if self.contains(&field.block_id) {
            return self.with_field(field);
        }

        let mut fields = self.fields.clone();
        let position = fields
            .iter()
            .position(|f| f.block_id == anchor)
            .map(|index| index + 1)
            .unwrap_or(fields.len());
        fields.insert(position, field);
        Self { fields }
    }

    /// First field whose block id matches `predicate`
    pub fn find_field<P>(&self, predicate: P) -> Option<&Field>
    where
        P: Fn(&str) -> bool,
    {
        self.fields.iter().find(|f| predicate(&f.block_id))
    }

    /// New view with the field `block_id` swapped for `field` at the same
    /// position, even when the new field carries another block id
    ///
    /// Appends when `block_id` is missing. Any other field already using the
    /// new id is dropped.
    pub fn with_field_replacing(&self, block_id: &str, field: Field) -> Self {
        if !self.contains(block_id) {
            return self.with_field(field);
        }

        let fields = self
            .fields
            .iter()
            .filter(|f| f.block_id == block_id || f.block_id != field.block_id)
            .map(|f| {
                if f.block_id == block_id {
                    field.clone()
                } else {
                    f.clone()
                }
            })
            .collect();
        Self { fields }
    }

    /// New view without the field `block_id`
    pub fn without_field(&self, block_id: &str) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|f| f.block_id != block_id)
                .cloned()
                .collect(),
        }
    }
}
