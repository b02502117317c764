//! Stable per-model display colors.

use ahash::AHashMap;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Colors handed out to models, in order of preference.
pub const LLM_COLOR_PALETTE: &[&str] = &[
    "#44d044", "#f1b933", "#e46161", "#8888f9", "#33bef0", "#bb55f9", "#f7ee45", "#f955cd",
    "#26e080", "#2654e0", "#7d8191", "#bea5d1",
];

/// Colors for prompt variables. Also the fallback once the model palette is used up.
pub const VAR_COLOR_PALETTE: &[&str] = &[
    "#0bdb52", "#e71861", "#7161de", "#f6d714", "#80bedb", "#ffa995", "#a9b399", "#dc6f0f",
    "#8d022e", "#138e7d", "#c6924f", "#885818", "#616b6d",
];

/// Remembers which color each model name was given so plots stay consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorRegistry {
    colors: AHashMap<String, String>,
}

impl ColorRegistry {
    pub fn new(initial: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            colors: initial.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    /// The color recorded for `name`, assigning a fresh one first if there is none.
    pub fn get_or_assign<R: Rng + ?Sized>(&mut self, name: &str, rng: &mut R) -> String {
        if let Some(color) = self.colors.get(name) {
            return color.clone();
        }
        let color = self.unique_color(rng);
        self.set(name, &color);
        color
    }

    pub fn set(&mut self, name: &str, color: &str) {
        self.colors.insert(name.to_string(), color.to_string());
    }

    /// Forgets every assignment, including the initial ones.
    pub fn reset(&mut self) {
        self.colors.clear();
    }

    /// The first palette color not yet assigned to any name.
    ///
    /// Model colors are tried before variable colors. When both palettes are exhausted a
    /// color is repeated at random.
    pub fn unique_color<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let unused = |palette: &[&str]| {
            palette
                .iter()
                .find(|c| !self.colors.values().any(|used| used == *c))
                .map(|c| c.to_string())
        };
        if let Some(color) = unused(LLM_COLOR_PALETTE).or_else(|| unused(VAR_COLOR_PALETTE)) {
            return color;
        }

        let all: Vec<&str> = LLM_COLOR_PALETTE
            .iter()
            .chain(VAR_COLOR_PALETTE)
            .copied()
            .collect();
        all.choose(rng)
            .map(|c| c.to_string())
            .unwrap_or_else(|| LLM_COLOR_PALETTE[0].to_string())
    }

    pub fn colors(&self) -> &AHashMap<String, String> {
        &self.colors
    }
}
