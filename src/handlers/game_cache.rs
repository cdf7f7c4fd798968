use tracing::trace;

use crate::client_handler::ClientHandler;
use crate::error::{ActionError, FormatError};
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(CachedGameDataAction, msg::GAME_CACHE, handle_game_cache);

/*
- **NB**: Empty String `[00]`
- **1B**: Cache Position
 */
pub async fn handle_game_cache(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let key = body.read_u8()?;

    let cached = handler.client_cache().get(key).cloned();
    let data = cached.ok_or(FormatError::InvalidField {
        field: "cache_position",
        value: key as i64,
    })?;
    trace!(
        { fields::CACHE_POSITION } = key,
        { fields::DATA_LENGTH } = data.len(),
        "Game cache hit"
    );

    handler
        .server()
        .add_game_data(handler.user_id(), data)
        .await?;
    Ok(())
}
