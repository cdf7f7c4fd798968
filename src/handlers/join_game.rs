use tracing::info;

use super::util;
use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(JoinGameAction, msg::JOIN_GAME, handle_join_game);

/*
- **NB**: Empty String `[00]`
- **4B**: GameID
- **NB**: Empty String `[00]`
- **4B**: 0x00000000
- **2B**: 0xFFFF
- **1B**: Connection Type
 */
pub async fn handle_join_game(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let game_id = body.read_u32()?;

    let user = handler.user();
    if let Err(e) = handler.server().join_game(user.id(), game_id).await {
        info!(
            { fields::USER_ID } = user.id(),
            { fields::GAME_ID } = game_id,
            { fields::REASON } = %e,
            "Join game denied"
        );
        handler
            .send(
                msg::SERVER_INFORMATION,
                util::build_information_message("server", &format!("Join game denied: {}", e)),
            )
            .await?;
        handler
            .send(msg::QUIT_GAME, util::build_quit_game(&user.name(), user.id()))
            .await?;
    }
    Ok(())
}
