//! Page feedback model behind the emoji widget.

use serde::{Deserialize, Serialize};

/// How helpful a reader found a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Bad,
    Meh,
    Good,
    Great,
}

impl Rating {
    /// All ratings in display order.
    pub const ALL: [Rating; 4] = [Rating::Bad, Rating::Meh, Rating::Good, Rating::Great];

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Bad => "😞",
            Self::Meh => "😐",
            Self::Good => "🙂",
            Self::Great => "🤩",
        }
    }

    /// Accessible label of the emoji button.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bad => "Not helpful",
            Self::Meh => "Somewhat helpful",
            Self::Good => "Helpful",
            Self::Great => "Very helpful",
        }
    }

    /// Numeric score from 1 to 4.
    pub fn score(self) -> u8 {
        match self {
            Self::Bad => 1,
            Self::Meh => 2,
            Self::Good => 3,
            Self::Great => 4,
        }
    }
}

/// Feedback submitted for a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub page: String,
    pub rating: Rating,
    pub score: u8,
}

/// Selection state of one widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackState {
    selected: Option<Rating>,
}

impl FeedbackState {
    pub fn selected(&self) -> Option<Rating> {
        self.selected
    }

    /// Select `rating` for `page`.
    ///
    /// A new rating is recorded and reported. Picking the current rating
    /// again clears it and reports nothing.
    pub fn select(&mut self, page: &str, rating: Rating) -> Option<FeedbackEvent> {
        if self.selected == Some(rating) {
            self.selected = None;
            return None;
        }

        self.selected = Some(rating);
        Some(FeedbackEvent {
            page: page.to_string(),
            rating,
            score: rating.score(),
        })
    }

    /// Forget the selection, e.g. after navigating to another page.
    pub fn reset(&mut self) {
        self.selected = None;
    }
}
