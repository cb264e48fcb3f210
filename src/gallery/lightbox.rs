//! Full-screen single image viewer state

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lightbox {
    #[default]
    Closed,
    Open {
        /// Resolved full-size paths of every image of the opened vehicle
        images: Vec<String>,
        position: usize,
    },
}

impl Lightbox {
    /// Replaces any previous viewing state. Opening an empty list stays closed.
    pub fn open(&mut self, images: Vec<String>, start: usize) {
        if images.is_empty() {
            *self = Self::Closed;
            return;
        }
        let position = start.min(images.len() - 1);
        *self = Self::Open { images, position };
    }

    pub fn next(&mut self) {
        if let Self::Open { images, position } = self {
            *position = (*position + 1) % images.len();
        }
    }

    pub fn prev(&mut self) {
        if let Self::Open { images, position } = self {
            *position = (*position + images.len() - 1) % images.len();
        }
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Gallery scrolling is suppressed while the viewer is up
    pub fn scroll_locked(&self) -> bool {
        self.is_open()
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Open { position, .. } => Some(*position),
            Self::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Open { images, position } => images.get(*position).map(String::as_str),
            Self::Closed => None,
        }
    }

    /// One-based position and image count, for the "n / m" label
    pub fn counter(&self) -> Option<(usize, usize)> {
        let position = self.position()?;
        match self {
            Self::Open { images, .. } => Some((position + 1, images.len())),
            Self::Closed => None,
        }
    }
}
