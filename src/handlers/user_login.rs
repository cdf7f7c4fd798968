use tracing::{info, warn};

use super::util;
use crate::client_handler::ClientHandler;
use crate::error::{ActionError, ModelError};
use crate::fields;
use crate::kaillera::body::BodyReader;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::V086Message;

/// ACKs the client must answer before the best round trip becomes its ping.
const SPEED_TEST_ACKS: u32 = 3;

command_action!(LoginAction, msg::USER_LOGIN, handle_user_login);
command_action!(AckAction, msg::CLIENT_TO_SERVER_ACK, handle_client_ack);

/*
- **NB**: Username
- **NB**: Emulator Name
- **1B**: Connection Type
 */
pub async fn handle_user_login(
    message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let mut body = BodyReader::new(&message.body);
    let user_name = body.read_string()?;
    let emulator = body.read_string()?;
    let connection_type = body.read_u8()?;

    let user = handler.user();
    if user.is_logged_in() {
        return Err(ModelError::AlreadyLoggedIn(user.id()).into());
    }

    info!(
        { fields::USER_ID } = user.id(),
        { fields::USER_NAME } = %user_name,
        emulator = %emulator,
        { fields::CONNECTION_TYPE } = connection_type,
        "Login request"
    );
    user.set_login_info(user_name, emulator, connection_type);

    handler.start_speed_test();
    handler
        .send(msg::SERVER_TO_CLIENT_ACK, util::build_server_ack())
        .await?;
    Ok(())
}

/*
- **NB**: Empty String `[00]`
- **4B**: 00000000 .. 00000003
 */
pub async fn handle_client_ack(
    _message: &V086Message,
    handler: &ClientHandler,
) -> Result<(), ActionError> {
    let user = handler.user();
    if user.is_logged_in() {
        return Ok(());
    }

    handler.add_speed_measurement();
    if handler.speed_measurement_count() <= SPEED_TEST_ACKS {
        handler
            .send(msg::SERVER_TO_CLIENT_ACK, util::build_server_ack())
            .await?;
        return Ok(());
    }

    let best = handler.best_network_speed();
    let ping = u32::try_from(best.as_millis()).unwrap_or(u32::MAX);
    info!(
        { fields::USER_ID } = user.id(),
        { fields::PING } = ping,
        average_ms = handler.average_network_speed().as_millis() as u64,
        "Speed test complete"
    );
    user.set_ping(ping);

    if let Err(e) = handler.server().login(user.id()).await {
        warn!(
            { fields::USER_ID } = user.id(),
            { fields::ERROR } = %e,
            "Login rejected"
        );
        handler
            .send(
                msg::CONNECTION_REJECTED,
                util::build_connection_rejected(&user.name(), user.id(), &e.to_string()),
            )
            .await?;
        return Err(ActionError::Fatal(format!("login rejected: {}", e)));
    }
    Ok(())
}
