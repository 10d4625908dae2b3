use crate::store::error::StoreError;

/// A validated, 1-indexed window over the active subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    count: i64,
    offset: i64,
}

impl Page {
    pub fn new(page: i64, count: i64) -> Result<Page, StoreError> {
        if page < 1 {
            return Err(StoreError::Validation(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if count < 1 {
            return Err(StoreError::Validation(format!(
                "count must be at least 1, got {}",
                count
            )));
        }

        let offset = (page - 1).checked_mul(count).ok_or_else(|| {
            StoreError::Validation(format!("page {} with count {} is out of range", page, count))
        })?;

        Ok(Page { count, offset })
    }

    pub fn limit(&self) -> i64 {
        self.count
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}
