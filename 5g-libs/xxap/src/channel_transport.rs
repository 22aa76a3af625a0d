//! channel_transport - in-memory transport made of a pair of async channels

use crate::{Transport, TransportError, TransportHandler};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use stop_token::prelude::*;
use stop_token::{StopSource, StopToken};

type Message = (u16, Vec<u8>);

/// One end of an in-memory link.  Messages are delivered in the order they were sent, across
/// all streams.
pub struct ChannelTransport {
    streams: u16,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    open: AtomicBool,
    // Dropping the source stops the token.
    stop_source: Mutex<Option<StopSource>>,
    stop_token: StopToken,
}

impl ChannelTransport {
    /// Two connected ends, each with `streams` streams.
    pub fn pair(streams: u16) -> (Self, Self) {
        let (a_tx, b_rx) = async_channel::unbounded();
        let (b_tx, a_rx) = async_channel::unbounded();
        (
            Self::new(streams, a_tx, a_rx),
            Self::new(streams, b_tx, b_rx),
        )
    }

    fn new(streams: u16, sender: Sender<Message>, receiver: Receiver<Message>) -> Self {
        let stop_source = StopSource::new();
        let stop_token = stop_source.token();
        ChannelTransport {
            streams,
            sender,
            receiver,
            open: AtomicBool::new(false),
            stop_source: Mutex::new(Some(stop_source)),
            stop_token,
        }
    }

    fn shut(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.sender.close();
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn start(&self) -> Result<(), TransportError> {
        if self.sender.is_closed() {
            return Err(TransportError::Closed);
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, stream: u16, bytes: Vec<u8>) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        if stream >= self.streams {
            return Err(TransportError::NoSuchStream(stream));
        }
        self.sender
            .send((stream, bytes))
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn receive_loop<H: TransportHandler>(&self, handler: &H) -> Result<(), TransportError> {
        loop {
            match self
                .receiver
                .recv()
                .timeout_at(self.stop_token.clone())
                .await
            {
                Err(_stopped) => return Err(TransportError::Aborted),
                Ok(Err(_closed)) => return Err(TransportError::Closed),
                Ok(Ok((stream, bytes))) => handler.handle(stream, bytes).await,
            }
        }
    }

    fn close(&self) {
        self.shut();
    }

    fn abort(&self) {
        self.shut();
        if let Ok(mut stop_source) = self.stop_source.lock() {
            stop_source.take();
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::future::timeout;
    use async_std::sync::Mutex as AsyncMutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Collect(AsyncMutex<Vec<Message>>);

    #[async_trait]
    impl TransportHandler for Collect {
        async fn handle(&self, stream: u16, bytes: Vec<u8>) {
            self.0.lock().await.push((stream, bytes));
        }
    }

    async fn started_pair(streams: u16) -> anyhow::Result<(ChannelTransport, ChannelTransport)> {
        let (a, b) = ChannelTransport::pair(streams);
        a.start().await?;
        b.start().await?;
        Ok((a, b))
    }

    #[async_std::test]
    async fn messages_arrive_in_order() -> anyhow::Result<()> {
        let (a, b) = started_pair(2).await?;
        a.send(0, vec![1]).await?;
        a.send(1, vec![2]).await?;
        a.send(0, vec![3]).await?;
        a.close();
        let handler = Collect::default();
        assert_eq!(b.receive_loop(&handler).await, Err(TransportError::Closed));
        assert_eq!(
            *handler.0.lock().await,
            vec![(0, vec![1]), (1, vec![2]), (0, vec![3])]
        );
        Ok(())
    }

    #[async_std::test]
    async fn abort_ends_a_pending_receive_promptly() -> anyhow::Result<()> {
        let (a, _b) = started_pair(1).await?;
        let a = Arc::new(a);
        let receiving = a.clone();
        let task = async_std::task::spawn(async move {
            receiving.receive_loop(&Collect::default()).await
        });
        async_std::task::sleep(Duration::from_millis(10)).await;
        a.abort();
        let result = timeout(Duration::from_secs(1), task).await?;
        assert_eq!(result, Err(TransportError::Aborted));
        assert!(!a.is_open());
        Ok(())
    }

    #[async_std::test]
    async fn send_errors() -> anyhow::Result<()> {
        let (a, b) = ChannelTransport::pair(2);
        assert_eq!(a.send(0, vec![]).await, Err(TransportError::Closed));
        a.start().await?;
        b.start().await?;
        assert_eq!(a.send(2, vec![]).await, Err(TransportError::NoSuchStream(2)));
        b.close();
        assert!(a.is_open());
        a.close();
        assert_eq!(a.send(0, vec![]).await, Err(TransportError::Closed));
        Ok(())
    }
}
