//! Lock-free input buffering between connection handlers and the tick loop.
//!
//! Connection tasks push [`InputCommand`]s through cloned senders; the room
//! drains everything at the start of each tick. Nothing mutates game state
//! mid-tick.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::game::state::PlayerId;

/// One input message from a client. Validation (sequence monotonicity,
/// non-finite coercion, unit clamping) happens in the room, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputCommand {
    /// Client-assigned sequence number, must strictly increase per player
    pub seq: u32,
    /// Joystick axes, nominally in [-1, 1]
    pub move_x: f32,
    pub move_y: f32,
    /// Requested ability slot activation, if any
    pub ability_slot: Option<u8>,
    /// Talent card pick (index into the offered choices), if any
    pub talent_choice: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct InputMessage {
    pub player_id: PlayerId,
    pub command: InputCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Buffer full, message dropped (backpressure)
    #[error("input buffer full")]
    Full,
    /// Room stopped consuming
    #[error("input channel disconnected")]
    Disconnected,
}

/// Bounded MPSC buffer. Senders never block; when the buffer fills, the
/// newest messages are dropped and the client resends naturally next frame.
pub struct InputBuffer {
    sender: Sender<InputMessage>,
    receiver: Receiver<InputMessage>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// New sender handle; each connection holds its own clone
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Drain everything buffered since the previous tick, in arrival order
    pub fn drain(&self) -> Vec<InputMessage> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        // Generous headroom for a full room sending at client frame rate
        Self::new(1024)
    }
}

/// Clonable non-blocking sender handle
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputMessage>,
}

impl InputSender {
    #[inline]
    pub fn try_send(
        &self,
        player_id: PlayerId,
        command: InputCommand,
    ) -> Result<(), InputBufferError> {
        self.sender
            .try_send(InputMessage { player_id, command })
            .map_err(|e| match e {
                TrySendError::Full(_) => InputBufferError::Full,
                TrySendError::Disconnected(_) => InputBufferError::Disconnected,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(seq: u32) -> InputCommand {
        InputCommand {
            seq,
            move_x: 1.0,
            move_y: 0.0,
            ability_slot: None,
            talent_choice: None,
        }
    }

    #[test]
    fn test_submit_and_drain_in_order() {
        let buffer = InputBuffer::new(10);
        let sender = buffer.sender();
        for seq in 1..=3 {
            sender.try_send("p1".to_string(), cmd(seq)).unwrap();
        }
        assert_eq!(buffer.pending_count(), 3);

        let messages = buffer.drain();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].command.seq, 1);
        assert_eq!(messages[2].command.seq, 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_backpressure_drops_when_full() {
        let buffer = InputBuffer::new(2);
        let sender = buffer.sender();
        sender.try_send("p1".to_string(), cmd(1)).unwrap();
        sender.try_send("p1".to_string(), cmd(2)).unwrap();
        assert_eq!(
            sender.try_send("p1".to_string(), cmd(3)),
            Err(InputBufferError::Full)
        );

        buffer.drain();
        assert!(sender.try_send("p1".to_string(), cmd(3)).is_ok());
    }

    #[test]
    fn test_multiple_senders_interleave() {
        let buffer = InputBuffer::new(16);
        let a = buffer.sender();
        let b = buffer.sender();
        a.try_send("p1".to_string(), cmd(1)).unwrap();
        b.try_send("p2".to_string(), cmd(1)).unwrap();
        a.try_send("p1".to_string(), cmd(2)).unwrap();

        let messages = buffer.drain();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].player_id, "p1");
        assert_eq!(messages[1].player_id, "p2");
    }

    #[test]
    fn test_disconnected_after_drop() {
        let buffer = InputBuffer::new(4);
        let sender = buffer.sender();
        drop(buffer);
        assert_eq!(
            sender.try_send("p1".to_string(), cmd(1)),
            Err(InputBufferError::Disconnected)
        );
    }
}
