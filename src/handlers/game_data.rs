use tracing::trace;

use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(GameDataAction, msg::GAME_DATA, handle_game_data);

/*
- **NB**: Empty String `[00]`
- **2B**: Length of Game Data
- **NB**: Game Data
 */
pub async fn handle_game_data(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let data_length = body.read_u16()? as usize;
    let data = body.read_bytes(data_length)?;

    let key = handler.client_cache().add(data.clone());
    trace!(
        { fields::DATA_LENGTH } = data_length,
        { fields::CACHE_POSITION } = key,
        "Game data received"
    );

    handler
        .server()
        .add_game_data(handler.user_id(), data)
        .await?;
    Ok(())
}
