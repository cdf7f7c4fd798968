// Body builders for every server-to-client message. Renderers and actions
// pass the result to `ClientHandler::send` with the matching message type.

use bytes::{BufMut, Bytes, BytesMut};

use crate::kaillera::body::PutString;
use crate::model::game::GameSnapshot;
use crate::model::user::UserInfo;

// '     0x05 = Server to Client ACK
// '            NB : Empty String [00]
// '            4B : 00000000
// '            4B : 00000001
// '            4B : 00000002
// '            4B : 00000003
pub fn build_server_ack() -> BytesMut {
    let mut data = BytesMut::with_capacity(17);
    data.put_u8(0);
    for value in 0..4u32 {
        data.put_u32_le(value);
    }
    data
}

// '     0x16 = Connection Rejected
// '            NB : Username
// '            2B : UserID
// '            NB : Message
pub fn build_connection_rejected(user_name: &str, user_id: u16, message: &str) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(user_name);
    data.put_u16_le(user_id);
    data.put_string(message);
    data
}

// '     0x17 = Server Information Message
// '            NB : "Server"
// '            NB : Message
pub fn build_information_message(source: &str, message: &str) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(source);
    data.put_string(message);
    data
}

// '     0x01 = User Quit
// '            NB : Username
// '            2B : UserID
// '            NB : Message
pub fn build_user_quit(user_name: &str, user_id: u16, message: &str) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(user_name);
    data.put_u16_le(user_id);
    data.put_string(message);
    data
}

// '     0x02 = User Joined
// '            NB : Username
// '            2B : UserID
// '            4B : Ping
// '            1B : Connection Type
pub fn build_user_joined(user: &UserInfo) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(&user.name);
    data.put_u16_le(user.id);
    data.put_u32_le(user.ping);
    data.put_u8(user.connection_type);
    data
}

// '     0x07 = Global Chat / 0x08 = Game Chat
// '            NB : Username
// '            NB : Message
pub fn build_chat(user_name: &str, message: &str) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(user_name);
    data.put_string(message);
    data
}

// '     0x0A = Create Game
// '            NB : Username
// '            NB : Game Name
// '            NB : Emulator Name
// '            4B : GameID
pub fn build_new_game_notification(game: &GameSnapshot) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(&game.owner_name);
    data.put_string(&game.name);
    data.put_string(&game.emulator);
    data.put_u32_le(game.id);
    data
}

// '     0x0B = Quit Game
// '            NB : Username
// '            2B : UserID
pub fn build_quit_game(user_name: &str, user_id: u16) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(user_name);
    data.put_u16_le(user_id);
    data
}

// '     0x0C = Join Game
// '            NB : Empty String [00]
// '            4B : GameID
// '            NB : Username
// '            4B : Ping
// '            2B : UserID
// '            1B : Connection Type
pub fn build_join_game(game_id: u32, user: &UserInfo) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u32_le(game_id);
    data.put_string(&user.name);
    data.put_u32_le(user.ping);
    data.put_u16_le(user.id);
    data.put_u8(user.connection_type);
    data
}

// '     0x0D = Player Information
// '            NB : Empty String [00]
// '            4B : Number of Users in Room [not including you]
// '            NB : Username
// '            4B : Ping
// '            2B : UserID
// '            1B : Connection Type
pub fn build_player_information(players: &[&UserInfo]) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u32_le(players.len() as u32);
    for player in players {
        data.put_string(&player.name);
        data.put_u32_le(player.ping);
        data.put_u16_le(player.id);
        data.put_u8(player.connection_type);
    }
    data
}

// '     0x0E = Update Game Status
// '            NB : Empty String [00]
// '            4B : GameID
// '            1B : Game Status (0=Waiting, 1=Playing, 2=Netsync)
// '            1B : Number of Players in Room
// '            1B : Maximum Players
pub fn build_game_status(game: &GameSnapshot) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u32_le(game.id);
    data.put_u8(game.status as u8);
    data.put_u8(game.num_players);
    data.put_u8(game.max_players);
    data
}

// '     0x10 = Close Game
// '            NB : Empty String [00]
// '            4B : GameID
pub fn build_close_game(game_id: u32) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u32_le(game_id);
    data
}

// '     0x11 = Start Game
// '            NB : Empty String [00]
// '            2B : Frame Delay
// '            1B : Your Player Number
// '            1B : Total Players
pub fn build_start_game(frame_delay: u16, player_number: u8, num_players: u8) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u16_le(frame_delay);
    data.put_u8(player_number);
    data.put_u8(num_players);
    data
}

// '     0x12 = Game Data
// '            NB : Empty String [00]
// '            2B : Length of Game Data
// '            NB : Game Data
pub fn build_game_data(game_data: &Bytes) -> BytesMut {
    let mut data = BytesMut::with_capacity(3 + game_data.len());
    data.put_u8(0);
    data.put_u16_le(game_data.len() as u16);
    data.put_slice(game_data);
    data
}

// '     0x13 = Game Cache
// '            NB : Empty String [00]
// '            1B : Cache Position
pub fn build_cached_game_data(key: u8) -> BytesMut {
    let mut data = BytesMut::with_capacity(2);
    data.put_u8(0);
    data.put_u8(key);
    data
}

// '     0x14 = Drop Game
// '            NB : Username
// '            1B : Player Number
pub fn build_player_drop(user_name: &str, player_number: u8) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_string(user_name);
    data.put_u8(player_number);
    data
}

// '     0x15 = Ready to Play Signal
// '            NB : Empty String [00]
pub fn build_all_ready() -> BytesMut {
    let mut data = BytesMut::with_capacity(1);
    data.put_u8(0);
    data
}

// '     0x04 = Server Status
// '            NB : Empty String [00]
// '            4B : Number of Users in Server [not including you]
// '            4B : Number of Games in Server
// '            per user:
// '            NB : Username
// '            4B : Ping
// '            1B : Status (0=Playing, 1=Idle)
// '            2B : UserID
// '            1B : Connection Type
// '            per game:
// '            NB : Game Name
// '            4B : GameID
// '            NB : Emulator Name
// '            NB : Owner
// '            NB : Number of Players/Maximum Players
// '            1B : Status (0=Waiting, 1=Playing, 2=Netsync)
pub fn build_server_status(users: &[UserInfo], games: &[GameSnapshot]) -> BytesMut {
    let mut data = BytesMut::new();
    data.put_u8(0);
    data.put_u32_le(users.len() as u32);
    data.put_u32_le(games.len() as u32);

    for user in users {
        data.put_string(&user.name);
        data.put_u32_le(user.ping);
        data.put_u8(user.status as u8);
        data.put_u16_le(user.id);
        data.put_u8(user.connection_type);
    }

    for game in games {
        data.put_string(&game.name);
        data.put_u32_le(game.id);
        data.put_string(&game.emulator);
        data.put_string(&game.owner_name);
        data.put_string(&format!("{}/{}", game.num_players, game.max_players));
        data.put_u8(game.status as u8);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::game::GameStatus;
    use crate::model::user::UserStatus;

    fn user(id: u16, name: &str) -> UserInfo {
        UserInfo {
            id,
            name: name.to_string(),
            emulator: "emu".to_string(),
            connection_type: 1,
            ping: 20,
            status: UserStatus::Idle,
            addr: "127.0.0.1:5000".parse().unwrap(),
            game_id: None,
            player_number: 0,
        }
    }

    fn game() -> GameSnapshot {
        GameSnapshot {
            id: 7,
            name: "kof".to_string(),
            emulator: "emu".to_string(),
            owner_id: 1,
            owner_name: "a".to_string(),
            status: GameStatus::Playing,
            num_players: 2,
            max_players: 4,
        }
    }

    #[test]
    fn test_server_ack_layout() {
        assert_eq!(
            build_server_ack().to_vec(),
            vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]
        );
    }

    #[test]
    fn test_user_joined_layout() {
        assert_eq!(
            build_user_joined(&user(0x0102, "ab")).to_vec(),
            vec![b'a', b'b', 0, 0x02, 0x01, 20, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_start_game_layout() {
        assert_eq!(build_start_game(2, 1, 3).to_vec(), vec![0, 2, 0, 1, 3]);
    }

    #[test]
    fn test_game_data_layout() {
        let data = Bytes::from_static(&[9, 8, 7]);
        assert_eq!(build_game_data(&data).to_vec(), vec![0, 3, 0, 9, 8, 7]);
        assert_eq!(build_cached_game_data(5).to_vec(), vec![0, 5]);
    }

    #[test]
    fn test_player_information_layout() {
        let b = user(2, "b");
        assert_eq!(
            build_player_information(&[&b]).to_vec(),
            vec![0, 1, 0, 0, 0, b'b', 0, 20, 0, 0, 0, 2, 0, 1]
        );
    }

    #[test]
    fn test_server_status_layout() {
        let data = build_server_status(&[user(2, "b")], &[game()]).to_vec();
        let mut expected = vec![0, 1, 0, 0, 0, 1, 0, 0, 0];
        expected.extend_from_slice(&[b'b', 0, 20, 0, 0, 0, 1, 2, 0, 1]);
        expected.extend_from_slice(b"kof\0");
        expected.extend_from_slice(&[7, 0, 0, 0]);
        expected.extend_from_slice(b"emu\0a\x002/4\0");
        expected.push(1);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_game_status_layout() {
        assert_eq!(
            build_game_status(&game()).to_vec(),
            vec![0, 7, 0, 0, 0, 1, 2, 4]
        );
    }
}
