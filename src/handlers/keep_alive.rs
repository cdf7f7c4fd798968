use tracing::trace;

use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(KeepAliveAction, msg::CLIENT_KEEP_ALIVE, handle_client_keep_alive);

/// Receiving any datagram already refreshed the session deadline.
pub async fn handle_client_keep_alive(
    _message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    trace!({ fields::USER_ID } = handler.user_id(), "Keep alive");
    Ok(())
}
