//! Messages exchanged between a predicting client and the authority, and the
//! in-process transport that carries them.
//!
//! [`RpcChannel`] is reliable and ordered: frames are postcard-encoded on
//! send, held back for a fixed number of ticks, and decoded in FIFO order on
//! receive.

use std::collections::VecDeque;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strider_movement::{AbilityRequest, AbilityRpcSink, MoveInput, MovementSnapshot};
use tracing::warn;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Input of one simulated client tick.
///
/// Carries no ability flags: the authority only changes those through gated
/// [`ClientMessage::Ability`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientMove {
    /// Client tick that produced this move.
    pub tick: u64,
    /// Step length in seconds.
    pub dt: f32,
    pub input: MoveInput,
}

/// Client → authority traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// `RequestTeleport` / `RequestJetpack` / `RequestWallRun`.
    Ability {
        player_id: u64,
        request: AbilityRequest,
    },
    /// A predicted move to be simulated authoritatively.
    Move { player_id: u64, step: ClientMove },
}

impl ClientMessage {
    pub fn player_id(&self) -> u64 {
        match self {
            Self::Ability { player_id, .. } | Self::Move { player_id, .. } => *player_id,
        }
    }
}

/// Authority → client traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Authoritative state after the last processed move of `player_id`.
    Snapshot {
        player_id: u64,
        snapshot: MovementSnapshot,
    },
}

// ---------------------------------------------------------------------------
// WireError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("failed to encode frame: {0}")]
    Encode(postcard::Error),

    #[error("failed to decode frame: {0}")]
    Decode(postcard::Error),
}

// ---------------------------------------------------------------------------
// RpcChannel
// ---------------------------------------------------------------------------

struct Frame {
    deliver_at: u64,
    bytes: Vec<u8>,
}

/// Reliable, ordered, one-directional message pipe with a fixed delay.
pub struct RpcChannel<T> {
    frames: VecDeque<Frame>,
    latency_ticks: u64,
    now: u64,
    bytes_sent: usize,
    _message: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> RpcChannel<T> {
    /// A channel delivering each frame `latency_ticks` calls to
    /// [`advance`](Self::advance) after it was sent.
    pub fn new(latency_ticks: u32) -> Self {
        Self {
            frames: VecDeque::new(),
            latency_ticks: u64::from(latency_ticks),
            now: 0,
            bytes_sent: 0,
            _message: PhantomData,
        }
    }

    pub fn send(&mut self, message: &T) -> Result<(), WireError> {
        let bytes = postcard::to_allocvec(message).map_err(WireError::Encode)?;
        self.bytes_sent += bytes.len();
        self.frames.push_back(Frame {
            deliver_at: self.now + self.latency_ticks,
            bytes,
        });
        Ok(())
    }

    /// Moves the channel clock forward by one tick.
    pub fn advance(&mut self) {
        self.now += 1;
    }

    /// Takes the oldest frame that is due, if any.
    ///
    /// A frame that fails to decode is consumed and reported as an error.
    pub fn poll(&mut self) -> Option<Result<T, WireError>> {
        if self.frames.front()?.deliver_at > self.now {
            return None;
        }
        let frame = self.frames.pop_front()?;
        Some(postcard::from_bytes(&frame.bytes).map_err(WireError::Decode))
    }

    /// Decodes every frame that is due, oldest first, stopping at the first
    /// undecodable one.
    pub fn receive(&mut self) -> Result<Vec<T>, WireError> {
        std::iter::from_fn(|| self.poll()).collect()
    }

    /// Frames sent but not yet received.
    pub fn in_flight(&self) -> usize {
        self.frames.len()
    }

    /// Total encoded payload bytes sent so far.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }
}

// ---------------------------------------------------------------------------
// AbilityUplink
// ---------------------------------------------------------------------------

/// Forwards a predicting client's accepted ability requests to the
/// authority.
pub struct AbilityUplink<'a> {
    pub player_id: u64,
    pub channel: &'a mut RpcChannel<ClientMessage>,
}

impl AbilityRpcSink for AbilityUplink<'_> {
    fn send(&mut self, request: AbilityRequest) {
        let message = ClientMessage::Ability {
            player_id: self.player_id,
            request,
        };
        if let Err(err) = self.channel.send(&message) {
            warn!(%err, ?request, "dropping ability request");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use strider_movement::AbilityKind;

    use super::*;

    fn move_message(tick: u64) -> ClientMessage {
        ClientMessage::Move {
            player_id: 7,
            step: ClientMove {
                tick,
                dt: 1.0 / 60.0,
                input: MoveInput {
                    direction: Vec3::X,
                    facing: Vec3::NEG_Z,
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_client_message_serialization_roundtrip() {
        let messages = vec![
            ClientMessage::Ability {
                player_id: 1,
                request: AbilityRequest {
                    kind: AbilityKind::WallRun,
                    active: true,
                },
            },
            move_message(42),
        ];
        for message in &messages {
            let bytes = postcard::to_allocvec(message).expect("serialize");
            let decoded: ClientMessage = postcard::from_bytes(&bytes).expect("deserialize");
            assert_eq!(*message, decoded);

            let json = serde_json::to_string(message).expect("json serialize");
            let from_json: ClientMessage = serde_json::from_str(&json).expect("json deserialize");
            assert_eq!(*message, from_json);
        }
    }

    #[test]
    fn test_channel_without_latency_delivers_immediately() {
        let mut channel = RpcChannel::<ClientMessage>::new(0);
        channel.send(&move_message(1)).unwrap();
        let received = channel.receive().unwrap();
        assert_eq!(received, vec![move_message(1)]);
        assert_eq!(channel.in_flight(), 0);
    }

    #[test]
    fn test_channel_holds_frames_for_latency() {
        let mut channel = RpcChannel::<ClientMessage>::new(2);
        channel.send(&move_message(1)).unwrap();
        assert!(channel.receive().unwrap().is_empty());
        channel.advance();
        channel.send(&move_message(2)).unwrap();
        assert!(channel.receive().unwrap().is_empty());
        channel.advance();
        assert_eq!(channel.receive().unwrap(), vec![move_message(1)]);
        channel.advance();
        assert_eq!(channel.receive().unwrap(), vec![move_message(2)]);
        assert!(channel.bytes_sent() > 0);
    }

    #[test]
    fn test_channel_preserves_order() {
        let mut channel = RpcChannel::<ClientMessage>::new(1);
        for tick in 0..5 {
            channel.send(&move_message(tick)).unwrap();
        }
        channel.advance();
        let ticks: Vec<u64> = channel
            .receive()
            .unwrap()
            .into_iter()
            .map(|m| match m {
                ClientMessage::Move { step, .. } => step.tick,
                ClientMessage::Ability { .. } => u64::MAX,
            })
            .collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_uplink_tags_requests_with_player() {
        let mut channel = RpcChannel::<ClientMessage>::new(0);
        let mut uplink = AbilityUplink {
            player_id: 3,
            channel: &mut channel,
        };
        uplink.send(AbilityRequest {
            kind: AbilityKind::Teleport,
            active: true,
        });
        let received = channel.receive().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].player_id(), 3);
    }
}
