use crate::network::client::CommandErrors;
use crate::network::future::Identity;
use crate::network::protocol::Protocol;
use crate::network::response::ResponseBuffer;
use alloc::vec::Vec;
use bytes::BytesMut;
use core::cell::{Cell, RefCell};
use core::fmt::{Debug, Formatter};
use core::ops::DerefMut;
use embedded_nal::TcpClientStack;

/// Size of the chunks read from the socket
const CHUNK_SIZE: usize = 32;

/// Socket + frame buffer of one Redis connection
///
/// Sends encoded commands and delivers decoded frames, either mapped to request futures or in
/// arrival order.
pub(crate) struct Connection<'a, N: TcpClientStack, P: Protocol> {
    protocol: P,
    stack: RefCell<&'a mut N>,
    socket: RefCell<&'a mut N::TcpSocket>,
    buffer: RefCell<ResponseBuffer<P>>,

    /// Current valid future series
    /// Gets incremented on fatal errors, on which frame<->future mapping can no longer be guaranteed
    current_series: Cell<usize>,

    /// Index of next future
    next_index: Cell<usize>,

    /// Indicates a pending buffer clearance on fatal errors
    clear_buffer: Cell<bool>,

    /// Futures dropped without calling wait(). Their response data is dropped on next send().
    dropped_futures: RefCell<Vec<Identity>>,
}

impl<'a, N: TcpClientStack, P: Protocol> Connection<'a, N, P> {
    pub(crate) fn new(stack: &'a mut N, socket: &'a mut N::TcpSocket, protocol: P) -> Self {
        Connection {
            protocol: protocol.clone(),
            stack: RefCell::new(stack),
            socket: RefCell::new(socket),
            buffer: RefCell::new(ResponseBuffer::new(protocol)),
            current_series: Cell::new(0),
            next_index: Cell::new(0),
            clear_buffer: Cell::new(false),
            dropped_futures: RefCell::new(Vec::new()),
        }
    }

    /// Reads the next chunk of pending socket data into the frame buffer
    pub(crate) fn receive_chunk(&self) -> nb::Result<(), N::Error> {
        let mut chunk = [0; CHUNK_SIZE];
        let mut stack = self.stack.borrow_mut();
        let mut socket = self.socket.borrow_mut();

        let byte_count = stack.receive(socket.deref_mut(), &mut chunk)?;
        self.buffer.borrow_mut().append(&chunk[..byte_count]);
        Ok(())
    }

    /// Reads socket data until no more data is pending
    /// Network errors are returned, WouldBlock ends reading.
    pub(crate) fn receive_pending(&self) -> Result<(), N::Error> {
        loop {
            match self.receive_chunk() {
                Ok(()) => {}
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(error)) => return Err(error),
            }
        }
    }

    /// Sends the given command and returns the identity of the response
    pub(crate) fn send(&self, frame: P::FrameType) -> Result<Identity, CommandErrors> {
        // A fatal error invalidated the current series, so the stream needs to be cleared
        if self.clear_buffer.replace(false) {
            self.clear_socket();
        }

        self.handle_dropped_futures();
        self.send_frame(frame)?;

        let identity = Identity {
            series: self.current_series.get(),
            index: self.next_index.get(),
        };
        self.next_index.set(identity.index + 1);
        Ok(identity)
    }

    /// Encodes and writes a frame without reserving a response slot
    pub(crate) fn send_frame(&self, frame: P::FrameType) -> Result<(), CommandErrors> {
        let mut buffer = BytesMut::new();
        self.protocol
            .encode_bytes(&mut buffer, &frame)
            .map_err(|_| CommandErrors::EncodingCommandFailed)?;

        let mut stack = self.stack.borrow_mut();
        let mut socket = self.socket.borrow_mut();

        stack
            .send(socket.deref_mut(), buffer.as_ref())
            .map_err(|_| CommandErrors::TcpError)?;
        Ok(())
    }

    /// Is the response of the given future complete?
    pub(crate) fn is_complete(&self, id: &Identity) -> Result<bool, CommandErrors> {
        if self.current_series.get() != id.series {
            return Err(CommandErrors::InvalidFuture);
        }

        if self.buffer.borrow().is_complete(id.index) {
            return Ok(true);
        }

        if self.buffer.borrow().is_faulty() {
            self.invalidate_futures();
            return Err(CommandErrors::ProtocolViolation);
        }

        Ok(false)
    }

    /// Takes the response mapped to the future
    pub(crate) fn take_frame(&self, id: &Identity) -> Option<P::FrameType> {
        if self.current_series.get() != id.series {
            return None;
        }

        self.buffer.borrow_mut().take_frame(id.index)
    }

    /// Takes the oldest received frame
    pub(crate) fn take_next_frame(&self) -> Option<P::FrameType> {
        self.buffer.borrow_mut().take_next_frame()
    }

    /// True if received data could not be decoded
    pub(crate) fn is_faulty(&self) -> bool {
        self.buffer.borrow().is_faulty()
    }

    /// In case of fatal errors all current futures are invalidated
    pub(crate) fn invalidate_futures(&self) {
        self.current_series.set(self.current_series.get() + 1);
        self.next_index.set(0);
        self.clear_buffer.set(true);
    }

    /// Future was dropped before fetching its response
    pub(crate) fn drop_future(&self, id: Identity) {
        self.dropped_futures.borrow_mut().push(id);
    }

    /// Drops response data of dropped futures
    pub(crate) fn handle_dropped_futures(&self) {
        if self.dropped_futures.borrow().is_empty() {
            return;
        }

        let _ = self.receive_pending();
        let series = self.current_series.get();
        let mut buffer = self.buffer.borrow_mut();

        self.dropped_futures.borrow_mut().retain(|id| {
            // Future got invalidated in the meanwhile
            if id.series != series {
                return false;
            }

            if buffer.is_complete(id.index) {
                buffer.take_frame(id.index);
                return false;
            }

            true
        })
    }

    /// Returns true if there are any remaining dropped futures
    pub(crate) fn remaining_dropped_futures(&self) -> bool {
        !self.dropped_futures.borrow().is_empty()
    }

    /// Clears buffer and pending socket data
    fn clear_socket(&self) {
        let mut stack = self.stack.borrow_mut();
        let mut socket = self.socket.borrow_mut();
        let mut chunk = [0; CHUNK_SIZE];

        while stack.receive(socket.deref_mut(), &mut chunk).is_ok() {}
        self.buffer.borrow_mut().clear();
    }

    pub(crate) fn get_protocol(&self) -> P {
        self.protocol.clone()
    }

    #[cfg(test)]
    pub(crate) fn get_dropped_future_count(&self) -> usize {
        self.dropped_futures.borrow().len()
    }

    #[cfg(test)]
    pub(crate) fn get_pending_frame_count(&self) -> usize {
        self.buffer.borrow().pending_frame_count()
    }
}

impl<'a, N: TcpClientStack, P: Protocol> Debug for Connection<'a, N, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Connection")
            .field("series", &self.current_series.get())
            .field("next_index", &self.next_index.get())
            .finish()
    }
}
