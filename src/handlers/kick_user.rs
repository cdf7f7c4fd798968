use tracing::info;

use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(KickUserAction, msg::KICK_USER, handle_kick_user);

/*
 **Client to Server**:
  - Empty String
  - `2B`: UserID
*/
pub async fn handle_kick_user(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let target_id = body.read_u16()?;

    info!(
        { fields::USER_ID } = handler.user_id(),
        { fields::KICKED_USER_ID } = target_id,
        "Kick requested"
    );
    handler
        .server()
        .kick(handler.user_id(), target_id)
        .await?;
    Ok(())
}
