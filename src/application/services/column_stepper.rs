//! Bounded grid column count.

use std::ops::RangeInclusive;

/// Steps the grid column count within a fixed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStepper {
    columns: u8,
    range: RangeInclusive<u8>,
}

impl ColumnStepper {
    /// Creates a stepper, clamping `columns` into `range`.
    ///
    /// An empty or zero-based range is widened to start at one column.
    #[must_use]
    pub fn new(columns: u8, range: RangeInclusive<u8>) -> Self {
        let min = (*range.start()).max(1);
        let max = (*range.end()).max(min);
        let range = min..=max;
        Self {
            columns: columns.clamp(min, max),
            range,
        }
    }

    /// Current column count.
    #[must_use]
    pub const fn columns(&self) -> u8 {
        self.columns
    }

    /// Selectable range.
    #[must_use]
    pub const fn range(&self) -> &RangeInclusive<u8> {
        &self.range
    }

    /// Adds a column. Returns false at the upper bound.
    pub fn increment(&mut self) -> bool {
        self.set(self.columns.saturating_add(1))
    }

    /// Removes a column. Returns false at the lower bound.
    pub fn decrement(&mut self) -> bool {
        self.set(self.columns.saturating_sub(1))
    }

    /// Sets the column count if it is within range.
    pub fn set(&mut self, columns: u8) -> bool {
        if !self.range.contains(&columns) || columns == self.columns {
            return false;
        }
        self.columns = columns;
        true
    }

    /// Title shown next to the stepper, e.g. "3 Columns".
    #[must_use]
    pub fn title(&self) -> String {
        if self.columns > 1 {
            format!("{} Columns", self.columns)
        } else {
            "1 Column".to_string()
        }
    }
}

impl Default for ColumnStepper {
    fn default() -> Self {
        Self::new(3, 1..=8)
    }
}
