use crate::LayoutError;
use std::str::FromStr;

/// Reference point an element is positioned (and for stretch anchors sized)
/// against inside its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    BottomCenter,
    BottomRight,
    StretchLeft,
    StretchTop,
    StretchRight,
    StretchBottom,
    StretchCenter,
}

const ANCHOR_NAMES: [(&str, Anchor); 14] = [
    ("top-left", Anchor::TopLeft),
    ("top-center", Anchor::TopCenter),
    ("top-right", Anchor::TopRight),
    ("left", Anchor::Left),
    ("center", Anchor::Center),
    ("right", Anchor::Right),
    ("bottom-left", Anchor::BottomLeft),
    ("bottom-center", Anchor::BottomCenter),
    ("bottom-right", Anchor::BottomRight),
    ("stretch-left", Anchor::StretchLeft),
    ("stretch-top", Anchor::StretchTop),
    ("stretch-right", Anchor::StretchRight),
    ("stretch-bottom", Anchor::StretchBottom),
    ("stretch-center", Anchor::StretchCenter),
];

impl Anchor {
    /// Resolves a raw style value, aborting on garbage.
    ///
    /// Anchors come from static style data, so an unknown value is a bug in
    /// that data rather than something to recover from.
    ///
    /// # Panics
    ///
    /// Panics when `raw` is not in `1..=14`.
    pub fn from_style(raw: i32) -> Self {
        match Self::try_from(raw) {
            Ok(anchor) => anchor,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn is_stretch(self) -> bool {
        matches!(
            self,
            Self::StretchLeft
                | Self::StretchTop
                | Self::StretchRight
                | Self::StretchBottom
                | Self::StretchCenter
        )
    }

    pub fn is_left(self) -> bool {
        matches!(
            self,
            Self::Left | Self::TopLeft | Self::BottomLeft | Self::StretchLeft
        )
    }

    pub fn is_right(self) -> bool {
        matches!(
            self,
            Self::Right | Self::TopRight | Self::BottomRight | Self::StretchRight
        )
    }

    pub fn is_top(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopCenter | Self::TopRight | Self::StretchTop
        )
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight | Self::StretchBottom
        )
    }

    /// Width is derived from the parent for these anchors.
    pub fn stretches_horizontally(self) -> bool {
        matches!(
            self,
            Self::StretchTop | Self::StretchBottom | Self::StretchCenter
        )
    }

    /// Height is derived from the parent for these anchors.
    pub fn stretches_vertically(self) -> bool {
        matches!(
            self,
            Self::StretchLeft | Self::StretchRight | Self::StretchCenter
        )
    }

    pub fn convert_to_top(self) -> Self {
        match self {
            Self::BottomLeft => Self::TopLeft,
            Self::BottomCenter => Self::TopCenter,
            Self::BottomRight => Self::TopRight,
            Self::StretchBottom => Self::StretchTop,
            other => other,
        }
    }

    pub fn convert_to_bottom(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomLeft,
            Self::TopCenter => Self::BottomCenter,
            Self::TopRight => Self::BottomRight,
            Self::StretchTop => Self::StretchBottom,
            other => other,
        }
    }

    pub fn convert_to_left(self) -> Self {
        match self {
            Self::TopRight => Self::TopLeft,
            Self::Right => Self::Left,
            Self::BottomRight => Self::BottomLeft,
            Self::StretchRight => Self::StretchLeft,
            other => other,
        }
    }

    pub fn convert_to_right(self) -> Self {
        match self {
            Self::TopLeft => Self::TopRight,
            Self::Left => Self::Right,
            Self::BottomLeft => Self::BottomRight,
            Self::StretchLeft => Self::StretchRight,
            other => other,
        }
    }

    pub fn convert_to_center(self) -> Self {
        match self {
            Self::TopLeft | Self::TopRight => Self::TopCenter,
            Self::Left | Self::Right => Self::Center,
            Self::BottomLeft | Self::BottomRight => Self::BottomCenter,
            other => other,
        }
    }
}

impl TryFrom<i32> for Anchor {
    type Error = LayoutError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| ANCHOR_NAMES.get(index))
            .map(|(_, anchor)| *anchor)
            .ok_or_else(|| LayoutError::InvalidAnchor(raw.to_string()))
    }
}

impl FromStr for Anchor {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        ANCHOR_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(needle))
            .map(|(_, anchor)| *anchor)
            .ok_or_else(|| LayoutError::InvalidAnchor(value.to_string()))
    }
}

/// Flow participation class of an element inside its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Positioning {
    #[default]
    Static,
    Absolute,
    Fixed,
    Relative,
    Sticky,
}

const POSITIONING_NAMES: [(&str, Positioning); 5] = [
    ("static", Positioning::Static),
    ("absolute", Positioning::Absolute),
    ("fixed", Positioning::Fixed),
    ("relative", Positioning::Relative),
    ("sticky", Positioning::Sticky),
];

impl Positioning {
    /// # Panics
    ///
    /// Panics when `raw` is not in `0..=4`.
    pub fn from_style(raw: i32) -> Self {
        match Self::try_from(raw) {
            Ok(positioning) => positioning,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn participates_in_flow(self) -> bool {
        matches!(self, Self::Static | Self::Relative)
    }
}

impl TryFrom<i32> for Positioning {
    type Error = LayoutError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| POSITIONING_NAMES.get(index))
            .map(|(_, positioning)| *positioning)
            .ok_or_else(|| LayoutError::InvalidPositioning(raw.to_string()))
    }
}

impl FromStr for Positioning {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        POSITIONING_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(needle))
            .map(|(_, positioning)| *positioning)
            .ok_or_else(|| LayoutError::InvalidPositioning(value.to_string()))
    }
}
