//! Build-time options shared by every statement.

use serde::{Deserialize, Serialize};

/// How LIKE / ILIKE pattern values reach the SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeValues {
    /// Inline the pattern as a single-quoted literal, doubling embedded `'`.
    #[default]
    Inline,
    /// Bind the pattern to a placeholder like any other value.
    Bind,
}

/// Options consulted while rendering a statement.
///
/// Options travel with the [`ParamContext`](crate::qb::ParamContext), so a
/// subquery always renders with the options of the statement embedding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// LIKE / ILIKE value handling.
    pub like_values: LikeValues,
    /// Number of the first placeholder (`$0` by default).
    pub first_placeholder: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            like_values: LikeValues::Inline,
            first_placeholder: 0,
        }
    }
}

impl BuildOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how LIKE / ILIKE values are rendered.
    pub fn like_values(mut self, mode: LikeValues) -> Self {
        self.like_values = mode;
        self
    }

    /// Set the number of the first placeholder.
    ///
    /// Use `1` for engines that number placeholders from `$1`.
    pub fn first_placeholder(mut self, n: usize) -> Self {
        self.first_placeholder = n;
        self
    }
}
