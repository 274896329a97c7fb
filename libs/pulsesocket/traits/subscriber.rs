use crate::core::event::SocketEvent;
use crate::error::Result;

/// Receives every event fanned out by a connection manager
///
/// Subscribers run on the connection task, one after another, in the order
/// frames arrive. An `Err` is logged and does not stop delivery to other
/// subscribers; neither does a panic.
///
/// Closures taking `&SocketEvent<M>` are subscribers:
///
/// ```ignore
/// let sub = manager.subscribe(|event: &SocketEvent<Value>| {
///     if let SocketEvent::Message(msg) = event {
///         println!("{msg}");
///     }
/// });
/// ```
pub trait Subscriber<M>: Send + Sync + 'static {
    fn on_event(&self, event: &SocketEvent<M>) -> Result<()>;
}

impl<M, F> Subscriber<M> for F
where
    F: Fn(&SocketEvent<M>) + Send + Sync + 'static,
{
    fn on_event(&self, event: &SocketEvent<M>) -> Result<()> {
        self(event);
        Ok(())
    }
}
