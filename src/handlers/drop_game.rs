use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(DropGameAction, msg::DROP_GAME, handle_drop_game);

/*
0x14 = Drop Game

This ends the game session but keeps the room open.
Players remain in the room and can start a new game.

Client Request:
- NB : Empty String [00]
- 1B : 0x00

Note: This is different from Quit Game (0x0B) which removes players from the room.
*/
pub async fn handle_drop_game(
    _message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    handler.server().drop_game(handler.user_id()).await?;
    Ok(())
}
