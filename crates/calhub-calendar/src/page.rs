//! Offset/limit paging and the paged result envelope.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CalendarError;

/// Offset/limit window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageParams")]
pub struct PageParams {
    from: u32,
    size: u32,
}

/// Unchecked wire form; missing fields take the defaults.
#[derive(Deserialize)]
struct RawPageParams {
    #[serde(default)]
    from: Option<i64>,
    #[serde(default)]
    size: Option<i64>,
}

impl TryFrom<RawPageParams> for PageParams {
    type Error = CalendarError;

    fn try_from(raw: RawPageParams) -> Result<Self, Self::Error> {
        PageParams::new(
            raw.from.unwrap_or(i64::from(PageParams::DEFAULT_FROM)),
            raw.size.unwrap_or(i64::from(PageParams::DEFAULT_SIZE)),
        )
    }
}

impl PageParams {
    pub const FROM: &'static str = "from";
    pub const SIZE: &'static str = "size";

    pub const DEFAULT_FROM: u32 = 0;
    pub const DEFAULT_SIZE: u32 = 100;

    /// Upper bound on `from + size`.
    pub const MAX_FROM_SIZE_SUM: i64 = 10_000;

    pub fn default_params() -> Self {
        Self {
            from: Self::DEFAULT_FROM,
            size: Self::DEFAULT_SIZE,
        }
    }

    /// Build a page window from caller-supplied values.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidArgument` if either value is negative or
    /// the window ends past `MAX_FROM_SIZE_SUM`.
    pub fn new(from: i64, size: i64) -> Result<Self, CalendarError> {
        if from < 0 {
            return Err(CalendarError::invalid_argument(format!(
                "Parameter [{}] cannot be < 0",
                Self::FROM
            )));
        }
        if size < 0 {
            return Err(CalendarError::invalid_argument(format!(
                "Parameter [{}] cannot be < 0",
                Self::SIZE
            )));
        }
        if from.saturating_add(size) > Self::MAX_FROM_SIZE_SUM {
            return Err(CalendarError::invalid_argument(format!(
                "The sum of parameters [{}] and [{}] cannot be higher than {}.",
                Self::FROM,
                Self::SIZE,
                Self::MAX_FROM_SIZE_SUM
            )));
        }

        // Both fit: each is non-negative and their sum is at most MAX_FROM_SIZE_SUM.
        Ok(Self {
            from: from as u32,
            size: size as u32,
        })
    }

    pub fn from(&self) -> u32 {
        self.from
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::default_params()
    }
}

/// One page of results plus the size of the full matching set.
///
/// `count` may exceed `results().len()`: it describes everything that matched,
/// not just the returned window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPage<T> {
    results: Vec<T>,
    count: u64,
    results_field: String,
}

impl<T> QueryPage<T> {
    pub const COUNT: &'static str = "count";

    pub fn new(results: Vec<T>, count: u64, results_field: impl Into<String>) -> Self {
        Self {
            results,
            count,
            results_field: results_field.into(),
        }
    }

    /// Page holding exactly one item, with a count of 1.
    pub fn single(item: T, results_field: impl Into<String>) -> Self {
        Self::new(vec![item], 1, results_field)
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn results_field(&self) -> &str {
        &self.results_field
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

/// Serializes as `{"count": n, "<results_field>": [...]}`.
impl<T: Serialize> Serialize for QueryPage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(Self::COUNT, &self.count)?;
        map.serialize_entry(&self.results_field, &self.results)?;
        map.end()
    }
}
