//! Callback Handler module for block actions raised inside the intake modal

use tracing::{debug, info};

use crate::errors::SlackError;
use crate::selection::{self, SelectionEvent};
use crate::server::AppState;
use crate::slack::blocks::{parse, render};
use crate::slack::payload::BlockActions;

/// React to an Item or Description change
///
/// The next view is computed from the blocks carried by the event and pushed
/// with `views.update` using the event's hash. Actions on other fields, and
/// actions without a value, are ignored.
pub async fn callback_handler(state: &AppState, actions: &BlockActions) -> Result<(), SlackError> {
    let Some(view) = &actions.view else {
        debug!(user_id = %actions.user.id, "Block action outside a view, ignoring");
        return Ok(());
    };

    let Some(action) = actions.actions.first() else {
        return Ok(());
    };

    let Some(value) = action.selected_value() else {
        debug!(action_id = %action.action_id, "Block action without a value, ignoring");
        return Ok(());
    };

    let Some(event) = SelectionEvent::from_action(&action.action_id, value) else {
        debug!(action_id = %action.action_id, "Not a dependent field, ignoring");
        return Ok(());
    };

    let current = parse(&view.blocks);
    let next = selection::apply(&state.catalog, &current, event);
    let modal = view.with_blocks(render(&next));

    state.slack.views_update(&view.id, &view.hash, &modal).await?;

    info!(
        user_id = %actions.user.id,
        view_id = %view.id,
        state = ?selection::state_of(&next),
        "Updated intake modal"
    );
    Ok(())
}
