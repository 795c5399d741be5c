// Lock-free communication channels

use ringbuf::{HeapRb, traits::Split};

use crate::messaging::command::Command;

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

/// SPSC command channel; the buffer is allocated up front so the audio side
/// never allocates.
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}
