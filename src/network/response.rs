use crate::network::protocol::Protocol;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use bytes::Bytes;

/// Buffer for unparsed/incomplete + parsed/complete frames
///
/// Frames are addressed by a monotonic index, which maps request futures to their responses.
/// Push messages of a subscribed connection are instead consumed in arrival order.
pub(crate) struct ResponseBuffer<P: Protocol> {
    decoder: P,

    /// Unparsed data
    buffer: Vec<u8>,

    /// Parsed frames. Taken frames leave a None gap until everything before them is taken as well.
    frames: VecDeque<Option<P::FrameType>>,

    /// Index of the first element in `frames`
    frame_offset: usize,

    /// Number of non taken frames
    frame_count: usize,

    /// Received data violating the protocol
    faulty: bool,
}

impl<P: Protocol> ResponseBuffer<P> {
    pub fn new(protocol: P) -> ResponseBuffer<P> {
        Self {
            decoder: protocol,
            buffer: Vec::new(),
            frames: VecDeque::new(),
            frame_offset: 0,
            frame_count: 0,
            faulty: false,
        }
    }

    /// Appends data to buffer and parses all complete frames
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.parse_frames();
    }

    /// Takes the frame at the given index
    /// None if the frame was already taken or has not been received yet
    pub fn take_frame(&mut self, index: usize) -> Option<P::FrameType> {
        if index < self.frame_offset {
            return None;
        }

        let frame = self.frames.get_mut(index - self.frame_offset)?.take();
        if frame.is_some() {
            self.frame_count -= 1;
            self.compact();
        }

        frame
    }

    /// Takes the oldest frame which is not taken yet
    pub fn take_next_frame(&mut self) -> Option<P::FrameType> {
        let frame = self.frames.iter_mut().find_map(Option::take);
        if frame.is_some() {
            self.frame_count -= 1;
            self.compact();
        }

        frame
    }

    /// Was the frame at the given index received?
    pub fn is_complete(&self, index: usize) -> bool {
        index >= self.frame_offset && self.frames.len() > index - self.frame_offset
    }

    /// If true, a protocol violation was detected
    /// Since the cause (e.g. Redis bug, network fault, etc.) is unclear, this is a fatal problem.
    /// The mapping of frames to requests can no longer be guaranteed from this point on.
    pub fn is_faulty(&self) -> bool {
        self.faulty
    }

    /// Resets the buffer in case of fatal error
    pub fn clear(&mut self) {
        self.frames.clear();
        self.buffer.clear();
        self.frame_offset = 0;
        self.frame_count = 0;
        self.faulty = false;
    }

    /// Drops the leading gaps of already taken frames
    fn compact(&mut self) {
        while let Some(None) = self.frames.front() {
            self.frames.pop_front();
            self.frame_offset += 1;
        }
    }

    /// Parses all complete frames and drains their bytes from the buffer
    fn parse_frames(&mut self) {
        let mut consumed = 0;

        while !self.faulty && consumed < self.buffer.len() {
            let bytes = Bytes::copy_from_slice(&self.buffer[consumed..]);

            match self.decoder.decode(&bytes) {
                Ok(Some((frame, size))) => {
                    self.frames.push_back(Some(frame));
                    self.frame_count += 1;
                    consumed += size;
                }
                Ok(None) => break,
                Err(_) => self.faulty = true,
            }
        }

        self.buffer.drain(..consumed);
    }

    #[cfg(test)]
    pub fn pending_frame_count(&self) -> usize {
        self.frame_count
    }

    #[cfg(test)]
    pub fn frame_offset(&self) -> usize {
        self.frame_offset
    }
}
