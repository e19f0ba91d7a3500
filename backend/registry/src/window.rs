use thiserror::Error;

use crate::PAGE_SIZE;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("startIdx와 endIdx는 1 이상의 정수여야 합니다.")]
    NotPositive,

    #[error("endIdx는 startIdx보다 작을 수 없습니다.")]
    Inverted,
}

/// Inclusive, 1-based row range requested from the upstream in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    start: u32,
    end: u32,
}

impl PageWindow {
    pub fn new(start: u32, end: u32) -> Result<Self, WindowError> {
        if start == 0 || end == 0 {
            return Err(WindowError::NotPositive);
        }

        if end < start {
            return Err(WindowError::Inverted);
        }

        Ok(Self { start, end })
    }

    pub fn first() -> Self {
        Self {
            start: 1,
            end: PAGE_SIZE,
        }
    }

    /// Parses raw query values, falling back to the first window for missing ones.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, WindowError> {
        let first = Self::first();

        let start = parse_index(start, first.start)?;
        let end = parse_index(end, first.end)?;

        Self::new(start, end)
    }

    pub fn next(self) -> Self {
        let len = self.len();

        Self {
            start: self.end + 1,
            end: self.end + len,
        }
    }

    pub fn start(self) -> u32 {
        self.start
    }

    pub fn end(self) -> u32 {
        self.end
    }

    pub fn len(self) -> u32 {
        self.end - self.start + 1
    }
}

fn parse_index(raw: Option<&str>, default: u32) -> Result<u32, WindowError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| WindowError::NotPositive),
    }
}
