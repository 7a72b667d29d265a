//! Command Handler module for the slash command that opens the intake modal

use anyhow::Result;
use tracing::{debug, info};

use crate::server::AppState;
use crate::slack::SlashCommand;

use super::ui_builder::{build_initial_view, build_modal};

/// Open the intake modal for a slash command invocation
///
/// Issues the next job number, builds the initial view from the catalog and
/// opens it with the command's trigger id. Command arguments are ignored.
pub async fn command_handler(state: &AppState, command: &SlashCommand) -> Result<()> {
    debug!(user_id = %command.user_id, command = %command.command, "Received slash command");

    let job_number = state.counter.issue().await?;
    let view = build_initial_view(&state.catalog, job_number);
    let modal = build_modal(&view, &state.localization, &command.channel_id);

    state.slack.views_open(&command.trigger_id, &modal).await?;

    info!(
        user_id = %command.user_id,
        job_number,
        fields = view.fields().len(),
        "Opened intake modal"
    );
    Ok(())
}
