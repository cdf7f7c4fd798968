use crate::client_handler::ClientHandler;
use crate::error::ActionError;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

command_action!(QuitAction, msg::USER_QUIT, handle_user_quit);

/*
- **NB**: Empty String `[00]`
- **2B**: 0xFFFF
- **NB**: Message
 */
pub async fn handle_user_quit(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    body.skip_string()?;
    let _ = body.read_u16()?;
    let quit_message = body.read_string()?;

    // the UserQuit event addressed to this user stops the handler
    handler
        .server()
        .quit(handler.user_id(), &quit_message)
        .await?;
    Ok(())
}
