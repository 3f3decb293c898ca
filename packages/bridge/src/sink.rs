//! Where bridge events go.

use std::sync::mpsc;

use crate::BridgeMessage;

/// Receives bridge events from an executing context.
///
/// The context is constructed with its sink; delivery is the only side
/// effect the bridge adds to a wrapped console call.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn ConsoleSink>`.
pub trait ConsoleSink: Send {
    fn deliver(&mut self, message: BridgeMessage);
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for Box<T> {
    fn deliver(&mut self, message: BridgeMessage) {
        self.as_mut().deliver(message)
    }
}

/// Sink that forwards events over a channel to the host.
///
/// When the receiving half is gone (the host replaced the context on a
/// rerun), deliveries are silently discarded: late messages from a dead
/// context are unobservable.
pub struct ChannelSink {
    sender: mpsc::Sender<BridgeMessage>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<BridgeMessage>) -> Self {
        ChannelSink { sender }
    }

    /// A connected sink/receiver pair.
    pub fn pair() -> (Self, mpsc::Receiver<BridgeMessage>) {
        let (sender, receiver) = mpsc::channel();
        (ChannelSink::new(sender), receiver)
    }
}

impl ConsoleSink for ChannelSink {
    fn deliver(&mut self, message: BridgeMessage) {
        if self.sender.send(message).is_err() {
            log::debug!("dropping bridge message for a replaced context");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;

    #[test]
    fn events_arrive_in_emission_order() {
        let (mut sink, receiver) = ChannelSink::pair();

        for i in 0..3 {
            sink.deliver(BridgeMessage::new(EventKind::Log, vec![i.to_string()]));
        }

        let received: Vec<String> = receiver.try_iter().map(|m| m.args.join(" ")).collect();
        assert_eq!(received, vec!["0", "1", "2"]);
    }

    #[test]
    fn delivery_to_a_dropped_receiver_is_silent() {
        let (mut sink, receiver) = ChannelSink::pair();
        drop(receiver);

        // Must not panic or error.
        sink.deliver(BridgeMessage::new(EventKind::Log, vec!["late".to_string()]));
    }
}
