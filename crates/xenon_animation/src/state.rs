/// Keyframe cursors of one node, one per channel.
///
/// Each cursor only moves forward within a playback cycle and returns to 0
/// on wraparound or when another animation is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCursors {
    pub translation: usize,
    pub rotation: usize,
    pub scale: usize,
    pub weight: usize,
}

impl ChannelCursors {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-instance playback state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationPlaybackState {
    /// Index into the model's animations, if one is playing.
    pub animation: Option<usize>,
    /// Seconds into the current cycle.
    pub time: f32,
    /// Indexed by dense node index.
    pub cursors: Vec<ChannelCursors>,
    /// Set when sampling wrote a local transform since the last propagation.
    pub dirty: bool,
}

impl AnimationPlaybackState {
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            animation: None,
            time: 0.0,
            cursors: vec![ChannelCursors::default(); node_count],
            dirty: false,
        }
    }

    /// Switches to `animation` (or stops) and rewinds to time 0.
    pub fn select(&mut self, animation: Option<usize>) {
        self.animation = animation;
        self.time = 0.0;
        self.reset_cursors();
    }

    pub fn reset_cursors(&mut self) {
        self.cursors.iter_mut().for_each(ChannelCursors::reset);
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
