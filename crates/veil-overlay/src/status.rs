#![forbid(unsafe_code)]

//! Lifecycle checkpoints and status reports.

/// One of the four lifecycle checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    WillShow,
    DidShow,
    WillHide,
    DidHide,
}

impl Checkpoint {
    /// Whether the overlay counts as open when this checkpoint is reported.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::DidShow | Self::WillHide)
    }
}

/// Snapshot delivered to `get_status` after every checkpoint.
///
/// Exactly one checkpoint flag is set, except for [`OverlayStatus::INITIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayStatus {
    pub is_open: bool,
    pub will_show: bool,
    pub did_show: bool,
    pub will_hide: bool,
    pub did_hide: bool,
}

impl OverlayStatus {
    /// Before any transition.
    pub const INITIAL: Self = Self {
        is_open: false,
        will_show: false,
        did_show: false,
        will_hide: false,
        did_hide: false,
    };

    /// Status reported at `checkpoint`.
    pub const fn at(checkpoint: Checkpoint) -> Self {
        let mut status = Self::INITIAL;
        status.is_open = checkpoint.is_open();
        match checkpoint {
            Checkpoint::WillShow => status.will_show = true,
            Checkpoint::DidShow => status.did_show = true,
            Checkpoint::WillHide => status.will_hide = true,
            Checkpoint::DidHide => status.did_hide = true,
        }
        status
    }

    /// The checkpoint this status reports, if any.
    pub const fn checkpoint(&self) -> Option<Checkpoint> {
        if self.will_show {
            Some(Checkpoint::WillShow)
        } else if self.did_show {
            Some(Checkpoint::DidShow)
        } else if self.will_hide {
            Some(Checkpoint::WillHide)
        } else if self.did_hide {
            Some(Checkpoint::DidHide)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_flag_per_checkpoint() {
        for checkpoint in [
            Checkpoint::WillShow,
            Checkpoint::DidShow,
            Checkpoint::WillHide,
            Checkpoint::DidHide,
        ] {
            let status = OverlayStatus::at(checkpoint);
            let set = [
                status.will_show,
                status.did_show,
                status.will_hide,
                status.did_hide,
            ]
            .iter()
            .filter(|f| **f)
            .count();
            assert_eq!(set, 1);
            assert_eq!(status.checkpoint(), Some(checkpoint));
        }
        assert_eq!(OverlayStatus::INITIAL.checkpoint(), None);
    }

    #[test]
    fn still_open_while_hiding() {
        assert!(OverlayStatus::at(Checkpoint::WillHide).is_open);
        assert!(OverlayStatus::at(Checkpoint::DidShow).is_open);
        assert!(!OverlayStatus::at(Checkpoint::WillShow).is_open);
        assert!(!OverlayStatus::at(Checkpoint::DidHide).is_open);
    }
}
