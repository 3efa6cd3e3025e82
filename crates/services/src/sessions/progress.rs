/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the question on screen.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Completed fraction in `[0, 1]`, for progress bars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.current as f32 / self.total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_tracks_position() {
        let progress = SessionProgress {
            current: 1,
            total: 4,
            answered: 0,
            is_complete: false,
        };
        assert!((progress.fraction() - 0.25).abs() < f32::EPSILON);

        let empty = SessionProgress {
            current: 0,
            total: 0,
            answered: 0,
            is_complete: false,
        };
        assert!(empty.fraction().abs() < f32::EPSILON);
    }
}
