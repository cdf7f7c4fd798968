// Per-player input buffer feeding the game's broadcast merge.
//
// The owning player appends its controller input; every player of the game
// (including the owner) reads it back through its own read head, so a slow
// reader never steals data from a fast one.

use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::{fields, lock};

/// A read did not get enough data in time. `timeout_number` is filled in by
/// the caller, which counts consecutive timeouts per merge step.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("player {player_number} (user {user_id}) timed out (#{timeout_number})")]
pub struct PlayerTimeout {
    pub player_number: u8,
    pub user_id: u16,
    pub timeout_number: u32,
}

#[derive(Debug)]
struct QueueState {
    ring: Vec<u8>,
    /// Total bytes ever written since the last reset.
    written: u64,
    /// Total bytes consumed, per reader player number (index 0 = player 1).
    heads: Vec<u64>,
    synched: bool,
    last_timeout: Option<PlayerTimeout>,
}

impl QueueState {
    fn available(&mut self, reader: usize) -> usize {
        let capacity = self.ring.len() as u64;
        // a reader that fell a whole ring behind has lost the overwritten bytes
        if self.written - self.heads[reader] > capacity {
            self.heads[reader] = self.written - capacity;
        }
        (self.written - self.heads[reader]) as usize
    }

    fn read(&mut self, reader: usize, dest: &mut [u8]) {
        let capacity = self.ring.len() as u64;
        for byte in dest.iter_mut() {
            *byte = self.ring[(self.heads[reader] % capacity) as usize];
            self.heads[reader] += 1;
        }
    }

    fn reset(&mut self) {
        self.written = 0;
        self.heads.iter_mut().for_each(|h| *h = 0);
        self.ring.iter_mut().for_each(|b| *b = 0);
    }
}

#[derive(Debug)]
pub struct PlayerActionQueue {
    player_number: u8,
    user_id: u16,
    timeout: Duration,
    state: Mutex<QueueState>,
    data_ready: Notify,
}

impl PlayerActionQueue {
    /// Queue for `player_number` (1-based) in a game of `num_players`. The ring
    /// holds `buffer_size * num_players` bytes.
    pub fn new(
        player_number: u8,
        user_id: u16,
        num_players: usize,
        buffer_size: usize,
        timeout: Duration,
    ) -> Self {
        let num_players = num_players.max(1);
        Self {
            player_number,
            user_id,
            timeout,
            state: Mutex::new(QueueState {
                ring: vec![0; buffer_size.max(1) * num_players],
                written: 0,
                heads: vec![0; num_players],
                synched: false,
                last_timeout: None,
            }),
            data_ready: Notify::new(),
        }
    }

    pub fn player_number(&self) -> u8 {
        self.player_number
    }

    pub fn user_id(&self) -> u16 {
        self.user_id
    }

    pub fn is_synched(&self) -> bool {
        lock(&self.state).synched
    }

    /// Going unsynched discards buffered data and wakes every parked reader,
    /// which then fails with a timeout.
    pub fn set_synched(&self, synched: bool) {
        {
            let mut state = lock(&self.state);
            if state.synched == synched {
                return;
            }
            state.synched = synched;
            if !synched {
                state.reset();
            }
        }
        debug!(
            { fields::PLAYER_NUMBER } = self.player_number,
            { fields::USER_ID } = self.user_id,
            synched,
            "Action queue sync changed"
        );
        if !synched {
            self.data_ready.notify_waiters();
        }
    }

    pub fn last_timeout(&self) -> Option<PlayerTimeout> {
        lock(&self.state).last_timeout
    }

    pub fn set_last_timeout(&self, timeout: PlayerTimeout) {
        lock(&self.state).last_timeout = Some(timeout);
    }

    /// Appends input. Ignored while unsynched.
    pub fn add_actions(&self, actions: &[u8]) {
        {
            let mut state = lock(&self.state);
            if !state.synched {
                return;
            }
            let capacity = state.ring.len() as u64;
            for &b in actions {
                let pos = (state.written % capacity) as usize;
                state.ring[pos] = b;
                state.written += 1;
            }
            state.last_timeout = None;
        }
        trace!(
            { fields::PLAYER_NUMBER } = self.player_number,
            { fields::DATA_LENGTH } = actions.len(),
            "Actions queued"
        );
        self.data_ready.notify_waiters();
    }

    /// Fills `dest` with the next `dest.len()` bytes for `reader` (the reading
    /// player's number). An unsynched queue yields zeros at once; a synched
    /// one waits at most the queue timeout for data to arrive.
    pub async fn get_action(&self, reader: u8, dest: &mut [u8]) -> Result<(), PlayerTimeout> {
        let reader_index = reader as usize;
        let deadline = Instant::now() + self.timeout;
        let mut parked = false;

        loop {
            let notified = self.data_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = lock(&self.state);
                if reader_index == 0 || reader_index > state.heads.len() {
                    return Err(self.timed_out());
                }
                if !state.synched {
                    if parked {
                        return Err(self.timed_out());
                    }
                    dest.iter_mut().for_each(|b| *b = 0);
                    return Ok(());
                }
                if state.available(reader_index - 1) >= dest.len() {
                    state.read(reader_index - 1, dest);
                    return Ok(());
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let mut state = lock(&self.state);
                if state.synched && state.available(reader_index - 1) >= dest.len() {
                    state.read(reader_index - 1, dest);
                    return Ok(());
                }
                return Err(self.timed_out());
            }
            parked = true;
        }
    }

    fn timed_out(&self) -> PlayerTimeout {
        PlayerTimeout {
            player_number: self.player_number,
            user_id: self.user_id,
            timeout_number: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn queue(timeout_ms: u64) -> Arc<PlayerActionQueue> {
        Arc::new(PlayerActionQueue::new(
            1,
            100,
            2,
            16,
            Duration::from_millis(timeout_ms),
        ))
    }

    #[tokio::test]
    async fn test_unsynched_returns_zeros() {
        let q = queue(50);
        q.add_actions(&[1, 2, 3, 4]);
        let mut dest = [9u8; 4];
        q.get_action(1, &mut dest).await.unwrap();
        assert_eq!(dest, [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_each_reader_sees_every_action() {
        let q = queue(50);
        q.set_synched(true);
        q.add_actions(&[1, 2, 3, 4]);

        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        q.get_action(1, &mut a).await.unwrap();
        assert_eq!(a, [1, 2]);
        q.get_action(2, &mut b).await.unwrap();
        assert_eq!(b, [1, 2, 3, 4]);
        q.get_action(1, &mut a).await.unwrap();
        assert_eq!(a, [3, 4]);
    }

    #[tokio::test]
    async fn test_times_out_on_empty_queue() {
        let q = queue(40);
        q.set_synched(true);
        let start = std::time::Instant::now();
        let mut dest = [0u8; 2];
        let err = q.get_action(1, &mut dest).await.unwrap_err();
        assert!(start.elapsed() >= Duration::from_millis(35));
        assert_eq!(err.player_number, 1);
        assert_eq!(err.user_id, 100);
    }

    #[tokio::test]
    async fn test_add_wakes_waiter() {
        let q = queue(2000);
        q.set_synched(true);
        let reader = q.clone();
        let waiter = tokio::spawn(async move {
            let mut dest = [0u8; 2];
            reader.get_action(2, &mut dest).await.map(|_| dest)
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let start = std::time::Instant::now();
        q.add_actions(&[7, 8]);
        let got = waiter.await.unwrap().unwrap();
        assert_eq!(got, [7, 8]);
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_desynch_releases_parked_reader() {
        let q = queue(2000);
        q.set_synched(true);
        let reader = q.clone();
        let waiter = tokio::spawn(async move {
            let mut dest = [0u8; 2];
            reader.get_action(1, &mut dest).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        q.set_synched(false);
        assert!(waiter.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_desynch_discards_buffer() {
        let q = queue(30);
        q.set_synched(true);
        q.add_actions(&[1, 2]);
        q.set_synched(false);
        q.set_synched(true);
        let mut dest = [0u8; 2];
        assert!(q.get_action(1, &mut dest).await.is_err());
        q.add_actions(&[5, 6]);
        q.get_action(1, &mut dest).await.unwrap();
        assert_eq!(dest, [5, 6]);
    }

    #[tokio::test]
    async fn test_add_clears_last_timeout() {
        let q = queue(30);
        q.set_synched(true);
        let timeout = PlayerTimeout {
            player_number: 1,
            user_id: 100,
            timeout_number: 2,
        };
        q.set_last_timeout(timeout);
        assert_eq!(q.last_timeout(), Some(timeout));
        q.add_actions(&[1]);
        assert_eq!(q.last_timeout(), None);
    }
}
