//! UI Builder module for creating the intake modal and formatting messages

use crate::catalog::Catalog;
use crate::localization::LocalizationManager;
use crate::selection::description_field;
use crate::slack::blocks::{render, ModalView, Text};
use crate::submission::SubmissionRecord;
use crate::view::{block_ids, Field, FieldKind, FormView, SelectOption, NO_SELECTION};

/// Callback id identifying submissions of the intake modal
pub const INTAKE_CALLBACK_ID: &str = "project_intake_modal";

pub const STATUS_OPTIONS: [&str; 4] = ["OPEN", "IN PROGRESS", "COMPLETED", "CANCELLED"];
pub const PAYMENT_STATUS_OPTIONS: [&str; 3] = ["PAID", "UNPAID", "PARTIAL"];
pub const MANUFACTURE_OPTIONS: [&str; 3] = ["In-house", "Partner Print", "Other"];
pub const SECOND_MANUFACTURE_OPTIONS: [&str; 4] = [NO_SELECTION, "In-house", "Partner Print", "Other"];

fn text_field(block_id: &str, label: &str) -> Field {
    Field::new(
        block_id,
        label,
        FieldKind::Text {
            multiline: false,
            initial_value: None,
        },
    )
}

fn multiline_field(block_id: &str, label: &str) -> Field {
    Field::new(
        block_id,
        label,
        FieldKind::Text {
            multiline: true,
            initial_value: None,
        },
    )
}

fn select_field<S: AsRef<str>>(block_id: &str, label: &str, options: &[S]) -> Field {
    Field::new(
        block_id,
        label,
        FieldKind::Select {
            placeholder: format!("Choose {}", label.to_lowercase()),
            options: options
                .iter()
                .map(|option| SelectOption::plain(option.as_ref()))
                .collect(),
            initial_value: None,
        },
    )
}

/// Job number as shown in the modal and in messages
pub fn format_job_number(job_number: u64) -> String {
    format!("#{job_number}")
}

/// Build the initial field set of the intake modal
///
/// The Item select offers the catalog items in lexicographic order and the
/// Description select starts empty until an item is picked.
pub fn build_initial_view(catalog: &Catalog, job_number: u64) -> FormView {
    let items: Vec<&str> = catalog.items().collect();

    FormView::new(vec![
        Field::new(
            block_ids::JOB_NUMBER,
            "Job #",
            FieldKind::Text {
                multiline: false,
                initial_value: Some(format_job_number(job_number)),
            },
        ),
        text_field(block_ids::CLIENT, "Client"),
        Field::new(block_ids::CLIENT_EMAIL, "Client Email", FieldKind::Email),
        text_field(block_ids::QUANTITY, "Quantity"),
        text_field(block_ids::SIZE, "Size").optional(),
        text_field(block_ids::INVOICE, "Invoice").optional(),
        Field::new(block_ids::FOLDER_LINK, "Folder Link", FieldKind::Url).optional(),
        multiline_field(block_ids::NOTES, "Notes").optional(),
        multiline_field(block_ids::MANUFACTURE_NOTES, "Manufacture Notes").optional(),
        multiline_field(block_ids::DELIVERY_ADDRESS, "Delivery Address").optional(),
        text_field(block_ids::TRACKING, "Track #CONF.").optional(),
        text_field(block_ids::DESIGN_TIME, "Design Time").optional(),
        Field::new(block_ids::DATE, "Date", FieldKind::Date).optional(),
        Field::new(block_ids::DEADLINE, "Deadline", FieldKind::Date).optional(),
        Field::new(block_ids::ASSIGNEE, "Assignee", FieldKind::User).optional(),
        select_field(block_ids::STATUS, "Status", &STATUS_OPTIONS),
        select_field(block_ids::PAYMENT_STATUS, "Payment Status", &PAYMENT_STATUS_OPTIONS),
        select_field(block_ids::MANUFACTURE, "Manufacture", &MANUFACTURE_OPTIONS),
        select_field(
            block_ids::SECOND_MANUFACTURE,
            "Second Manufacture",
            &SECOND_MANUFACTURE_OPTIONS,
        ),
        select_field(block_ids::ITEM, "Item", &items).dispatching(),
        description_field(0, &[]),
    ])
}

/// Wrap a view in the intake modal envelope
///
/// `private_metadata` carries the channel the command came from so the
/// confirmation can be posted there.
pub fn build_modal(
    view: &FormView,
    localization: &LocalizationManager,
    private_metadata: &str,
) -> ModalView {
    ModalView {
        kind: "modal".to_string(),
        callback_id: INTAKE_CALLBACK_ID.to_string(),
        title: Text::plain(localization.get_message("modal-title", None)),
        submit: Some(Text::plain(localization.get_message("modal-submit", None))),
        close: Some(Text::plain(localization.get_message("modal-close", None))),
        private_metadata: private_metadata.to_string(),
        blocks: render(view),
    }
}

fn display_job_number(record: &SubmissionRecord, localization: &LocalizationManager) -> String {
    if record.job_number.is_empty() {
        localization.get_message("missing-job-number", None)
    } else {
        record.job_number.clone()
    }
}

/// Two-line summary posted by the channel sink
pub fn format_submission_summary(
    record: &SubmissionRecord,
    localization: &LocalizationManager,
) -> String {
    let job_number = display_job_number(record, localization);
    let title = localization.get_message_with_args(
        "channel-summary-title",
        &[
            ("job_number", job_number.as_str()),
            ("client", record.client.as_str()),
            ("client_email", record.client_email.as_str()),
        ],
    );
    let detail = localization.get_message_with_args(
        "channel-summary-detail",
        &[
            ("quantity", record.quantity.as_str()),
            ("item", record.item.as_str()),
            ("description", record.description.as_str()),
        ],
    );
    format!("{title}\n{detail}")
}

/// Ephemeral confirmation after a successful delivery
pub fn format_confirmation(
    record: &SubmissionRecord,
    list_name: &str,
    localization: &LocalizationManager,
) -> String {
    let job_number = display_job_number(record, localization);
    localization.get_message_with_args(
        "submission-confirmed",
        &[("job_number", job_number.as_str()), ("list_name", list_name)],
    )
}

/// Ephemeral notice after a failed delivery
pub fn format_delivery_failure(
    record: &SubmissionRecord,
    list_name: &str,
    error: &str,
    localization: &LocalizationManager,
) -> String {
    let job_number = display_job_number(record, localization);
    localization.get_message_with_args(
        "submission-failed",
        &[
            ("job_number", job_number.as_str()),
            ("list_name", list_name),
            ("error", error),
        ],
    )
}
