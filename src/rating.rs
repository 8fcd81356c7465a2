use serde::{Deserialize, Serialize};
use strum::VariantArray;
use strum_macros::{Display, VariantArray};

/// Star rating of a review, kept numeric until it is rendered.
#[derive(Display, Debug, VariantArray, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[strum(to_string = "1")]
    One,
    #[strum(to_string = "2")]
    Two,
    #[strum(to_string = "3")]
    Three,
    #[strum(to_string = "4")]
    Four,
    #[strum(to_string = "5")]
    Five,
    #[strum(to_string = "unrated")]
    Unrated,
}

impl Rating {
    /// Localized phrase the storefront puts in the rating's `aria-label`.
    pub const fn phrase(&self) -> Option<&'static str> {
        match self {
            Self::One => Some("1つ星"),
            Self::Two => Some("2つ星"),
            Self::Three => Some("3つ星"),
            Self::Four => Some("4つ星"),
            Self::Five => Some("5つ星"),
            Self::Unrated => None,
        }
    }

    pub const fn stars(&self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Unrated => 0,
        }
    }

    /// Maps an accessible label such as `5つ星のうち4つ星で評価しました` to a rating.
    ///
    /// Labels mention the scale ("out of 5 stars") too, so phrases are tried
    /// from one star upwards and the first contained phrase wins.
    pub fn from_label(label: &str) -> Self {
        Self::VARIANTS
            .iter()
            .find(|rating| rating.phrase().is_some_and(|phrase| label.contains(phrase)))
            .copied()
            .unwrap_or(Self::Unrated)
    }

    pub fn render(&self, glyph: &str) -> String {
        glyph.repeat(self.stars())
    }
}
