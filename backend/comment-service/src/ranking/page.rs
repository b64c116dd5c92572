use crate::error::{AppError, Result};
use serde::Serialize;

/// Zero-based page request. `offset = page_number * page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    page_number: i64,
    page_size: i64,
}

impl PageWindow {
    /// Build a window with no upper bound on the page size.
    pub fn new(page_number: i64, page_size: i64) -> Result<Self> {
        Self::bounded(page_number, page_size, i64::MAX)
    }

    /// Build a window whose page size may not exceed `max_page_size`.
    pub fn bounded(page_number: i64, page_size: i64, max_page_size: i64) -> Result<Self> {
        if page_size <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "Page size must be at least 1, got {}",
                page_size
            )));
        }
        if page_size > max_page_size {
            return Err(AppError::InvalidArgument(format!(
                "Page size must not exceed {}, got {}",
                max_page_size, page_size
            )));
        }
        if page_number < 0 {
            return Err(AppError::InvalidArgument(format!(
                "Page number cannot be negative, got {}",
                page_number
            )));
        }
        if page_number.checked_mul(page_size).is_none() {
            return Err(AppError::InvalidArgument(format!(
                "Page {} of size {} is out of range",
                page_number, page_size
            )));
        }

        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        // Overflow is rejected at construction.
        self.page_number * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        let first = PageWindow::new(0, 5).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 5);

        let second = PageWindow::new(1, 5).unwrap();
        assert_eq!(second.offset(), 5);

        let fourth = PageWindow::new(3, 20).unwrap();
        assert_eq!(fourth.offset(), 60);
    }

    #[test]
    fn rejects_non_positive_page_size() {
        assert!(matches!(
            PageWindow::new(0, 0),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageWindow::new(0, -3),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_negative_page_number() {
        assert!(matches!(
            PageWindow::new(-1, 5),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn enforces_upper_bound() {
        assert!(PageWindow::bounded(0, 100, 100).is_ok());
        assert!(matches!(
            PageWindow::bounded(0, 101, 100),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_overflowing_offset() {
        assert!(matches!(
            PageWindow::new(i64::MAX, 2),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
