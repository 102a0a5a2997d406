//! The child-to-parent drop-box: a bounded MPSC channel of `(index, value)`
//! pairs, sized exactly to the parent's arity so producers never block.

use crossbeam_channel::{bounded, Receiver, Select, Sender};

use crate::cancel::CancelToken;
use crate::error::Cancelled;

/// One child's completion, as delivered to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChildMessage {
    pub(crate) index: usize,
    pub(crate) value: bool,
}

/// Creates a child channel sized to `arity`. `send` on the returned sender
/// never blocks: capacity equals the number of children, so a child that
/// completes can always deposit its result even if the parent has already
/// decided and stopped reading.
pub(crate) fn child_channel(arity: usize) -> (Sender<ChildMessage>, Receiver<ChildMessage>) {
    bounded(arity.max(1))
}

/// Blocks until either a message arrives on `rx` or `cancel` fires,
/// whichever comes first. This is the one place operator rules suspend, so
/// it is the mechanism by which an operator rule's `recv` loop stays
/// responsive to cancellation (spec.md §5, suspension point iii).
pub(crate) fn recv_cancellable(
    rx: &Receiver<ChildMessage>,
    cancel: &CancelToken,
) -> Result<ChildMessage, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let mut select = Select::new();
    let rx_index = select.recv(rx);
    let cancel_index = select.recv(cancel.signal());

    let op = select.select();
    match op.index() {
        i if i == rx_index => match op.recv(rx) {
            Ok(message) => Ok(message),
            // The channel can only disconnect once every sender (every
            // child) has dropped, which only happens after they've all
            // either published or been cancelled — by construction a rule
            // never needs more messages than it has outstanding children
            // for, so this arm is unreachable in practice but still safe.
            Err(_) => Err(Cancelled),
        },
        i if i == cancel_index => {
            let _ = op.recv(cancel.signal());
            Err(Cancelled)
        }
        _ => unreachable!("Select only registered two operations"),
    }
}
