use std::num::NonZeroU32;

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(20) {
    Some(size) => size,
    None => unreachable!(),
};

/// Pagination metadata for the page a controller currently displays.
///
/// `total_pages` is derived from `total_count` on every read, so it always
/// agrees with the most recently observed count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub page_size: NonZeroU32,
    pub total_count: u64,
}

impl PageState {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.get()))
    }

    fn page_offset(&self) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size.get())
    }

    /// 1-based index of the first displayed record, or 0 for an empty collection.
    pub fn display_range_start(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        self.page_offset() + 1
    }

    /// 1-based index of the last displayed record, or 0 for an empty collection.
    pub fn display_range_end(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        (self.page_offset() + u64::from(self.page_size.get())).min(self.total_count)
    }

    pub fn range_label(&self) -> String {
        format!(
            "{} - {} of {}",
            self.display_range_start(),
            self.display_range_end(),
            self.total_count
        )
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.current_page) < self.total_pages()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    PageLoaded {
        page: u32,
        records: usize,
        total_count: u64,
    },
    RecordRemoved {
        id: String,
    },
    StaleResponseDiscarded {
        page: u32,
    },
    Error(String),
}
