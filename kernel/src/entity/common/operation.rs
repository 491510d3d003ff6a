use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectLimit(i64);

impl SelectLimit {
    pub const MAX: i64 = 100;

    /// Non-positive values fall back to the default, large ones are capped at [`Self::MAX`].
    pub fn new(value: impl Into<i64>) -> Self {
        let value = value.into();
        if value < 1 {
            Self::default()
        } else {
            SelectLimit(value.min(Self::MAX))
        }
    }
}

impl Default for SelectLimit {
    fn default() -> Self {
        SelectLimit(30)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectOffset(i64);

impl SelectOffset {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectOffset(value.into().max(0))
    }
}

/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectPage(i64);

impl SelectPage {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectPage(value.into().max(1))
    }

    pub fn offset(&self, limit: &SelectLimit) -> SelectOffset {
        SelectOffset::new((self.0 - 1).saturating_mul(*limit.as_ref()))
    }
}

impl Default for SelectPage {
    fn default() -> Self {
        SelectPage(1)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
