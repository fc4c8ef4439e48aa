// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 线程间有界通道 + 结束标记 + 取消令牌
/// Bounded stage hand-off with an end-of-stream sentinel and shared cancellation
use crossbeam_channel::{
    bounded, select_biased, Receiver, RecvTimeoutError, Sender, TryRecvError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 通道消息: 数据项或结束标记
#[derive(Debug, PartialEq, Eq)]
pub enum Message<T> {
    Item(T),
    EndOfStream,
}

/// Why a blocking hand-off returned without transferring anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// 取消令牌已触发
    Cancelled,
    /// 对端已退出
    Disconnected,
}

/// 共享取消令牌
///
/// Cancelling drops the only sender of a zero-capacity channel, which wakes
/// every `select!` waiting on [`CancelToken::signal`].
#[derive(Clone, Debug)]
pub struct CancelToken {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        let sender = match self.trigger.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// 可取消的等待. Returns `true` when woken by cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_cancelled();
        }
        matches!(
            self.signal.recv_timeout(duration),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a bounded FIFO between one producer stage and one consumer stage.
pub fn hand_off<T>(capacity: usize, cancel: &CancelToken) -> (Outlet<T>, Inlet<T>) {
    let (tx, rx) = bounded(capacity);
    (
        Outlet {
            tx,
            cancel: cancel.clone(),
            sealed: false,
        },
        Inlet {
            rx,
            cancel: cancel.clone(),
        },
    )
}

/// 对端退出与取消同时发生时按取消处理
fn disconnected(cancel: &CancelToken) -> Interrupted {
    if cancel.is_cancelled() {
        Interrupted::Cancelled
    } else {
        Interrupted::Disconnected
    }
}

/// 生产端
///
/// The sentinel is sent by [`Outlet::finish`] or, failing that, when the
/// outlet is dropped, so every exit path of the producing stage ends the
/// stream. After cancellation nothing more is sent.
pub struct Outlet<T> {
    tx: Sender<Message<T>>,
    cancel: CancelToken,
    sealed: bool,
}

impl<T> Outlet<T> {
    /// Blocks while the channel is full.
    pub fn send(&self, item: T) -> Result<(), Interrupted> {
        self.deliver(Message::Item(item))
    }

    /// Sends the end-of-stream sentinel once. Later calls do nothing.
    pub fn finish(&mut self) -> Result<(), Interrupted> {
        if self.sealed {
            return Ok(());
        }
        self.sealed = true;
        self.deliver(Message::EndOfStream)
    }

    fn deliver(&self, msg: Message<T>) -> Result<(), Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        // 取消优先于发送
        select_biased! {
            recv(self.cancel.signal()) -> _ => Err(Interrupted::Cancelled),
            send(self.tx, msg) -> res => res.map_err(|_| disconnected(&self.cancel)),
        }
    }
}

impl<T> Drop for Outlet<T> {
    fn drop(&mut self) {
        if !self.sealed {
            log::debug!("outlet dropped without finish, sending end-of-stream");
            let _ = self.finish();
        }
    }
}

/// 消费端
pub struct Inlet<T> {
    rx: Receiver<Message<T>>,
    cancel: CancelToken,
}

impl<T> Inlet<T> {
    /// Blocks while the channel is empty.
    pub fn recv(&self) -> Result<Message<T>, Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        select_biased! {
            recv(self.cancel.signal()) -> _ => Err(Interrupted::Cancelled),
            recv(self.rx) -> msg => msg.map_err(|_| disconnected(&self.cancel)),
        }
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
