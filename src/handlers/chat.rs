use tracing::info;

use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(ChatAction, msg::GLOBAL_CHAT, handle_global_chat);
command_action!(GameChatAction, msg::GAME_CHAT, handle_game_chat);

/*
- **NB**: Empty String `[00]`
- **NB**: Message
 */
pub async fn handle_global_chat(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let chat_message = body.read_string()?;

    handler
        .server()
        .chat(handler.user_id(), chat_message)
        .await?;
    Ok(())
}

pub async fn handle_game_chat(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let chat_message = body.read_string()?;

    // some clients leak a 0x11 control byte into game chat on start
    if chat_message.as_bytes().contains(&0x11) {
        info!(
            { fields::USER_ID } = handler.user_id(),
            "Skipping game chat message containing 0x11"
        );
        return Ok(());
    }

    handler
        .server()
        .game_chat(handler.user_id(), chat_message)
        .await?;
    Ok(())
}
