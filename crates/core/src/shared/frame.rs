/// A single camera frame: contiguous pixel bytes in row-major order.
///
/// The gesture core never inspects pixels itself; frames are handed
/// through to the detector, selector and tracker collaborators.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// A zero-filled single-channel frame, used when collaborators work
    /// from recorded results rather than pixels.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        Self::new(vec![0; (width as usize) * (height as usize)], width, height, 1, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
