use tracing::debug;

use super::util;
use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(StartGameAction, msg::START_GAME, handle_start_game);
command_action!(ReadyAction, msg::READY_TO_PLAY, handle_ready_to_play);

/*
'     0x11 = Start Game
'            Client Request:
'            NB : Empty String [00]
'            2B : 0xFF
'            1B : 0xFF
'            1B : 0xFF
- **Client**: Sends **Start Game Request** `[0x11]`
- **Server**: Sends **Update Game Status** `[0x0E]`
- **Server**: Sends **Start Game Notification** `[0x11]`
- **Client**: Enters **Netsync Mode** and waits for all players to send **Ready to Play Signal** `[0x15]`
- **Server**: Enters **Playing Mode** after receiving **Ready to Play Signal** `[0x15]` from all players in room
 */
pub async fn handle_start_game(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;

    if let Err(e) = handler.server().start_game(handler.user_id()).await {
        debug!(
            { fields::USER_ID } = handler.user_id(),
            { fields::ERROR } = %e,
            "Failed to start game"
        );
        handler
            .send(msg::GAME_CHAT, util::build_chat("Error", &e.to_string()))
            .await?;
    }
    Ok(())
}

/*
'     0x15 = Ready to Play Signal
'            Client Request:
'            NB : Empty String [00]
 */
pub async fn handle_ready_to_play(
    _message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    handler.server().ready(handler.user_id()).await?;
    Ok(())
}
