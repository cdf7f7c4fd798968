use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::cmp;
use std::collections::VecDeque;

use super::message_types as msg;
use crate::error::ParseError;

/// Largest number of messages a bundle may declare.
pub const MAX_MESSAGE_COUNT: usize = 32;

/// Resend ring capacity, and the most messages one resend will carry.
pub const MAX_BUNDLE_SIZE: usize = 5;

/// Messages carried by a normal send (the new one plus two for redundancy).
pub const DEFAULT_SEND_COUNT: usize = 3;

/// seq(2) + length(2) + type(1)
const MESSAGE_HEADER_SIZE: usize = 5;

/// One framed protocol message. `body` excludes the type byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V086Message {
    pub seq: u16,
    pub message_type: u8,
    pub body: Bytes,
}

impl V086Message {
    pub fn new(seq: u16, message_type: u8, body: impl Into<Bytes>) -> Self {
        Self {
            seq,
            message_type,
            body: body.into(),
        }
    }

    /// Value of the wire length field: body plus the type byte.
    pub fn length(&self) -> usize {
        self.body.len() + 1
    }

    pub fn encoded_len(&self) -> usize {
        MESSAGE_HEADER_SIZE + self.body.len()
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.seq);
        buf.put_u16_le(self.length() as u16);
        buf.put_u8(self.message_type);
        buf.put_slice(&self.body);
    }
}

/// The messages of one datagram, in wire order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V086Bundle {
    pub messages: Vec<V086Message>,
}

impl V086Bundle {
    pub fn new(messages: Vec<V086Message>) -> Self {
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Oldest first, which is the order messages must be processed in.
    pub fn oldest_first(&self) -> impl Iterator<Item = &V086Message> {
        self.messages.iter().rev()
    }

    pub fn encoded_len(&self) -> usize {
        1 + self
            .messages
            .iter()
            .map(V086Message::encoded_len)
            .sum::<usize>()
    }
}

/// `candidate` is newer than `last` when the forward distance around the
/// 16-bit ring is in (0, 0x8000).
pub fn is_newer(candidate: u16, last: u16) -> bool {
    let diff = candidate.wrapping_sub(last);
    diff > 0 && diff < 0x8000
}

/// Parse one datagram. With `last_seq` set, messages are read newest first
/// and parsing stops at the first one that is not newer than `last_seq`;
/// `None` keeps everything.
pub fn parse_bundle(data: &[u8], last_seq: Option<u16>) -> Result<V086Bundle, ParseError> {
    let mut buf = Bytes::copy_from_slice(data);
    if buf.remaining() < 1 {
        return Err(ParseError::InvalidBufferLength(data.len()));
    }

    let count = buf.get_u8();
    if count == 0 || count as usize > MAX_MESSAGE_COUNT {
        return Err(ParseError::InvalidMessageCount(count));
    }

    let mut messages = Vec::with_capacity(count as usize);
    for index in 0..count as usize {
        if buf.remaining() < 4 {
            return Err(ParseError::InvalidBufferLength(data.len()));
        }
        let seq = buf.get_u16_le();

        if let Some(last) = last_seq {
            if !is_newer(seq, last) {
                // anything after this in the bundle is older still
                break;
            }
        }

        let length = buf.get_u16_le() as usize;
        if length < 1 || length > buf.remaining() {
            return Err(ParseError::InvalidBundleLength {
                index,
                declared: length,
                remaining: buf.remaining(),
            });
        }

        let message_type = buf.get_u8();
        if !msg::is_known(message_type) {
            return Err(ParseError::UnknownMessageType(message_type));
        }
        let body = buf.split_to(length - 1);

        messages.push(V086Message {
            seq,
            message_type,
            body,
        });
    }

    Ok(V086Bundle { messages })
}

/// Serialize a bundle into `buf`. Messages past `MAX_MESSAGE_COUNT` are not
/// written.
pub fn write_bundle(bundle: &V086Bundle, buf: &mut BytesMut) {
    let count = cmp::min(bundle.messages.len(), MAX_MESSAGE_COUNT);
    buf.reserve(bundle.encoded_len());
    buf.put_u8(count as u8);
    for message in bundle.messages.iter().take(count) {
        message.write_to(buf);
    }
}

/// Outbound half of a session: hands out sequence numbers and keeps the last
/// `MAX_BUNDLE_SIZE` messages so every datagram can carry redundant copies
/// and a client retransmit request can be answered.
#[derive(Debug, Clone)]
pub struct UDPPacketGenerator {
    recent_messages: VecDeque<V086Message>,
    send_count: u16,
}

impl Default for UDPPacketGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UDPPacketGenerator {
    pub fn new() -> Self {
        Self {
            recent_messages: VecDeque::with_capacity(MAX_BUNDLE_SIZE),
            send_count: 0,
        }
    }

    /// Assign the next sequence number and store the message in the ring,
    /// evicting the oldest when full.
    pub fn push(&mut self, message_type: u8, body: impl Into<Bytes>) -> &V086Message {
        let message = V086Message::new(self.send_count, message_type, body);
        self.send_count = self.send_count.wrapping_add(1);

        if self.recent_messages.len() >= MAX_BUNDLE_SIZE {
            self.recent_messages.pop_front();
        }
        self.recent_messages.push_back(message);
        &self.recent_messages[self.recent_messages.len() - 1]
    }

    /// Newest `min(num_to_send, MAX_BUNDLE_SIZE, stored)` messages, newest
    /// first.
    pub fn bundle(&self, num_to_send: usize) -> V086Bundle {
        let count = cmp::min(num_to_send, self.recent_messages.len());
        V086Bundle::new(
            self.recent_messages
                .iter()
                .rev()
                .take(count)
                .cloned()
                .collect(),
        )
    }

    /// Push a new message and return the datagram for a normal send.
    pub fn make_send_packet(&mut self, message_type: u8, body: impl Into<Bytes>) -> BytesMut {
        self.push(message_type, body);
        let mut buf = BytesMut::new();
        write_bundle(&self.bundle(DEFAULT_SEND_COUNT), &mut buf);
        buf
    }

    /// Datagram answering the `retry_count`th consecutive retransmit request,
    /// or `None` if there is nothing to resend.
    pub fn make_resend_packet(&self, retry_count: u32) -> Option<BytesMut> {
        let count = resend_count(retry_count);
        if count == 0 || self.recent_messages.is_empty() {
            return None;
        }
        let mut buf = BytesMut::new();
        write_bundle(&self.bundle(count), &mut buf);
        Some(buf)
    }

    pub fn next_seq(&self) -> u16 {
        self.send_count
    }

    pub fn stored(&self) -> usize {
        self.recent_messages.len()
    }
}

/// Messages re-sent for a retransmit request: three per consecutive request,
/// capped at the ring size.
pub fn resend_count(retry_count: u32) -> usize {
    cmp::min(3usize.saturating_mul(retry_count as usize), MAX_BUNDLE_SIZE)
}
