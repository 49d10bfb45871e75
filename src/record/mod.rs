//! Record and work-unit types
//!
//! A [`Record`] is one listing in the closed 26-column schema. Every column
//! is always present; a column the listing did not provide holds `None`.
//! A [`Combination`] is one (make, model) search and the unit of work
//! distribution and retry.

mod extract;
mod schema;

pub use extract::{extract_record, parse_feature_group, SkipReason};
pub use schema::{output_header, source_header, Field};

use std::fmt;

/// One (make, model) pair advertised by the search form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Combination {
    pub make: String,
    pub model: String,
}

impl Combination {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}

/// Ordered run of combinations handed to one worker
pub type Chunk = Vec<Combination>;

/// One extracted listing
///
/// Values are indexed by [`Field`], so the key set is the schema by
/// construction. `Some("")` and `None` are different: an empty feature group
/// is `Some("")`, a missing one is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    values: [Option<String>; 26],
}

impl Record {
    /// Creates a record with every field set to "no value"
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from values in column order
    pub fn from_values(values: [Option<String>; 26]) -> Self {
        Self { values }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = Some(value.into());
    }

    /// Sets a field from an optional value, `None` leaves it as "no value"
    pub fn set_opt(&mut self, field: Field, value: Option<String>) {
        self.values[field.index()] = value;
    }

    /// Values in column order
    pub fn values(&self) -> &[Option<String>; 26] {
        &self.values
    }

    /// Fields paired with their values, in column order
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> + '_ {
        Field::ALL
            .iter()
            .map(move |field| (*field, self.get(*field)))
    }

    /// Cells for a CSV row, "no value" written as an empty cell
    pub fn to_row(&self) -> Vec<&str> {
        self.values
            .iter()
            .map(|value| value.as_deref().unwrap_or(""))
            .collect()
    }

    /// Reads a CSV row back, empty cells become "no value"
    ///
    /// Returns `None` if the row does not have exactly one cell per field.
    pub fn from_row<'a, I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values: [Option<String>; 26] = Default::default();
        let mut count = 0;

        for cell in cells {
            if count == values.len() {
                return None;
            }
            if !cell.is_empty() {
                values[count] = Some(cell.to_string());
            }
            count += 1;
        }

        if count != values.len() {
            return None;
        }

        Some(Self { values })
    }
}
