use tracing::info;

use super::util;
use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(CreateGameAction, msg::CREATE_GAME, handle_create_game);

/*
- **NB**: Empty String `[00]`
- **NB**: Game Name
- **NB**: Empty String `[00]`
- **4B**: 0xFFFFFFFF
 */
pub async fn handle_create_game(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let game_name = body.read_string()?;
    body.skip_string()?;
    let _ = body.read_u32()?;

    let user = handler.user();
    match handler.server().create_game(user.id(), game_name.clone()).await {
        Ok(game) => {
            info!(
                { fields::USER_ID } = user.id(),
                { fields::GAME_ID } = game.id(),
                { fields::GAME_NAME } = %game_name,
                "Game created"
            );
            Ok(())
        }
        Err(e) => {
            info!(
                { fields::USER_ID } = user.id(),
                { fields::GAME_NAME } = %game_name,
                { fields::REASON } = %e,
                "Create game denied"
            );
            // the client already shows itself in the game; take it back out
            handler
                .send(
                    msg::SERVER_INFORMATION,
                    util::build_information_message(
                        "server",
                        &format!("Create game denied: {}", e),
                    ),
                )
                .await?;
            handler
                .send(msg::QUIT_GAME, util::build_quit_game(&user.name(), user.id()))
                .await?;
            Ok(())
        }
    }
}
