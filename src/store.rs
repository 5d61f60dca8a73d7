//! Page-backed row storage.
//!
//! Rows live in fixed-size pages with no header. A logical row index maps to
//! `(index / rows_per_page, index % rows_per_page)`; pages are allocated the
//! first time a row in their range is written and are only released when the
//! whole store is dropped.

use tracing::{debug, trace};

use crate::error::{ConfigError, ExecuteError};
use crate::row::{Row, RowCodec};
use crate::{PAGE_SIZE, ROW_SIZE, TABLE_MAX_PAGES};

type Page = Box<[u8]>;

/// Largest page a table may be configured with.
pub const MAX_PAGE_SIZE: usize = 1 << 20;
/// Largest number of pages a table may be configured with.
pub const MAX_TABLE_PAGES: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            max_pages: TABLE_MAX_PAGES,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < ROW_SIZE {
            return Err(ConfigError::PageTooSmall {
                page_size: self.page_size,
                row_size: ROW_SIZE,
            });
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageTooLarge {
                page_size: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::NoPages);
        }
        if self.max_pages > MAX_TABLE_PAGES {
            return Err(ConfigError::TooManyPages {
                max_pages: self.max_pages,
                max: MAX_TABLE_PAGES,
            });
        }
        Ok(())
    }

    pub fn rows_per_page(&self) -> usize {
        self.page_size / ROW_SIZE
    }

    /// Row capacity; saturates for configs that were never validated.
    pub fn max_rows(&self) -> usize {
        self.rows_per_page().saturating_mul(self.max_pages)
    }
}

#[derive(Debug)]
pub struct PagedStore {
    config: StoreConfig,
    codec: RowCodec,
    pages: Vec<Option<Page>>,
    num_rows: usize,
}

impl Default for PagedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PagedStore {
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        debug!(
            page_size = config.page_size,
            max_pages = config.max_pages,
            capacity = config.max_rows(),
            "creating paged store"
        );
        Self {
            config,
            codec: RowCodec::new(),
            pages: (0..config.max_pages).map(|_| None).collect(),
            num_rows: 0,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn capacity(&self) -> usize {
        self.config.max_rows()
    }

    pub fn rows_per_page(&self) -> usize {
        self.config.rows_per_page()
    }

    pub fn is_full(&self) -> bool {
        self.num_rows >= self.capacity()
    }

    pub fn is_page_allocated(&self, page_index: usize) -> bool {
        matches!(self.pages.get(page_index), Some(Some(_)))
    }

    pub fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the slot for `row_index`, allocating its page if needed.
    ///
    /// # Panics
    ///
    /// Panics if the row falls beyond the last page of the table.
    pub fn locate(&mut self, row_index: usize) -> &mut [u8] {
        let (page_index, offset) = self.address(row_index);
        assert!(
            page_index < self.config.max_pages,
            "row {row_index} is beyond the last page ({page_index} >= {})",
            self.config.max_pages
        );

        let page_size = self.config.page_size;
        let page = self.pages[page_index].get_or_insert_with(|| {
            debug!(page_index, "allocating page");
            vec![0u8; page_size].into_boxed_slice()
        });
        &mut page[offset..offset + ROW_SIZE]
    }

    /// Read-only view of a written slot.
    fn slot(&self, row_index: usize) -> Option<&[u8]> {
        let (page_index, offset) = self.address(row_index);
        let page = self.pages.get(page_index)?.as_ref()?;
        Some(&page[offset..offset + ROW_SIZE])
    }

    fn address(&self, row_index: usize) -> (usize, usize) {
        let rows_per_page = self.rows_per_page();
        (
            row_index / rows_per_page,
            (row_index % rows_per_page) * ROW_SIZE,
        )
    }

    pub fn append(&mut self, row: &Row) -> Result<(), ExecuteError> {
        if self.is_full() {
            debug!(capacity = self.capacity(), "table full, rejecting row {}", row.id);
            return Err(ExecuteError::TableFull);
        }

        let index = self.num_rows;
        let bytes = self.codec.encode(row);
        self.locate(index).copy_from_slice(&bytes);
        self.num_rows += 1;

        trace!(index, id = row.id, "appended row");
        Ok(())
    }

    /// Decodes every stored row in insertion order.
    pub fn scan(&self) -> Vec<Row> {
        trace!(rows = self.num_rows, "scanning table");
        (0..self.num_rows)
            .filter_map(|i| self.slot(i))
            .map(|bytes| self.codec.decode(bytes))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ROWS_PER_PAGE, TABLE_MAX_ROWS};

    fn three_row_store() -> PagedStore {
        PagedStore::with_config(StoreConfig {
            page_size: ROW_SIZE,
            max_pages: 3,
        })
        .unwrap()
    }

    fn user(i: u32) -> Row {
        Row::new(i, format!("user{i}"), format!("person{i}@example.com"))
    }

    #[test]
    fn it_starts_empty() {
        let store = PagedStore::new();

        assert_eq!(store.num_rows(), 0);
        assert_eq!(store.capacity(), TABLE_MAX_ROWS);
        assert_eq!(store.rows_per_page(), ROWS_PER_PAGE);
        assert_eq!(store.allocated_pages(), 0);
        assert!(store.scan().is_empty());
    }

    #[test]
    fn it_rejects_the_fourth_row_of_a_three_row_table() {
        let mut store = three_row_store();

        assert_eq!(store.append(&Row::new(1, "alice", "alice@x.com")), Ok(()));
        assert_eq!(store.append(&Row::new(2, "bob", "bob@x.com")), Ok(()));
        assert_eq!(store.append(&Row::new(3, "cara", "cara@x.com")), Ok(()));
        assert_eq!(
            store.append(&Row::new(4, "dan", "dan@x.com")),
            Err(ExecuteError::TableFull)
        );

        let ids: Vec<u32> = store.scan().iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(store.num_rows(), 3);
    }

    #[test]
    fn it_fills_the_default_table() {
        let mut store = PagedStore::new();
        for i in 0..TABLE_MAX_ROWS as u32 {
            store.append(&user(i)).unwrap();
        }

        assert_eq!(store.append(&user(0)), Err(ExecuteError::TableFull));
        assert_eq!(store.num_rows(), TABLE_MAX_ROWS);
        assert_eq!(store.allocated_pages(), TABLE_MAX_PAGES);
    }

    #[test]
    fn it_preserves_append_order() {
        let mut store = PagedStore::new();
        let rows: Vec<Row> = [5, 3, 9, 1].into_iter().map(user).collect();
        for row in &rows {
            store.append(row).unwrap();
        }

        assert_eq!(store.scan(), rows);
    }

    #[test]
    fn it_allocates_pages_lazily() {
        let mut store = PagedStore::new();
        assert!(!store.is_page_allocated(0));

        store.append(&user(0)).unwrap();
        assert!(store.is_page_allocated(0));
        assert!(!store.is_page_allocated(1));

        for i in 1..ROWS_PER_PAGE as u32 {
            store.append(&user(i)).unwrap();
        }
        assert_eq!(store.allocated_pages(), 1);

        store.append(&user(ROWS_PER_PAGE as u32)).unwrap();
        assert!(store.is_page_allocated(1));
        assert_eq!(store.allocated_pages(), 2);
    }

    #[test]
    fn it_scans_idempotently() {
        let mut store = three_row_store();
        store.append(&user(1)).unwrap();
        store.append(&user(2)).unwrap();

        assert_eq!(store.scan(), store.scan());
    }

    #[test]
    fn it_leaves_the_table_readable_after_table_full() {
        let mut store = three_row_store();
        for i in 1..=3 {
            store.append(&user(i)).unwrap();
        }
        let before = store.scan();

        assert!(store.append(&user(4)).is_err());
        assert_eq!(store.scan(), before);
    }

    #[test]
    fn it_maps_rows_to_page_slots() {
        let mut store = PagedStore::new();
        let index = ROWS_PER_PAGE + 2;

        store.locate(index)[0] = 0xab;

        assert!(!store.is_page_allocated(0));
        assert!(store.is_page_allocated(1));
        let page = store.pages[1].as_ref().unwrap();
        assert_eq!(page[2 * ROW_SIZE], 0xab);
    }

    #[test]
    #[should_panic(expected = "beyond the last page")]
    fn it_panics_when_locating_past_the_last_page() {
        let mut store = three_row_store();
        store.locate(3);
    }

    #[test]
    fn it_rejects_invalid_configs() {
        let too_small = StoreConfig {
            page_size: ROW_SIZE - 1,
            max_pages: 1,
        };
        assert_eq!(
            PagedStore::with_config(too_small).unwrap_err(),
            ConfigError::PageTooSmall {
                page_size: ROW_SIZE - 1,
                row_size: ROW_SIZE
            }
        );

        let no_pages = StoreConfig {
            page_size: PAGE_SIZE,
            max_pages: 0,
        };
        assert_eq!(
            PagedStore::with_config(no_pages).unwrap_err(),
            ConfigError::NoPages
        );
    }

    #[test]
    fn it_rejects_oversized_configs() {
        let huge_pages = StoreConfig {
            page_size: 2 * ROW_SIZE,
            max_pages: usize::MAX / 2 + 1,
        };
        assert_eq!(
            PagedStore::with_config(huge_pages).unwrap_err(),
            ConfigError::TooManyPages {
                max_pages: usize::MAX / 2 + 1,
                max: MAX_TABLE_PAGES
            }
        );

        let huge_page = StoreConfig {
            page_size: usize::MAX,
            max_pages: 1,
        };
        assert_eq!(
            PagedStore::with_config(huge_page).unwrap_err(),
            ConfigError::PageTooLarge {
                page_size: usize::MAX,
                max: MAX_PAGE_SIZE
            }
        );
    }

    #[test]
    fn it_accepts_the_largest_allowed_config() {
        let store = PagedStore::with_config(StoreConfig {
            page_size: MAX_PAGE_SIZE,
            max_pages: MAX_TABLE_PAGES,
        })
        .unwrap();

        assert_eq!(
            store.capacity(),
            (MAX_PAGE_SIZE / ROW_SIZE) * MAX_TABLE_PAGES
        );
        assert_eq!(store.allocated_pages(), 0);
    }

    #[test]
    fn it_saturates_capacity_of_unvalidated_configs() {
        let config = StoreConfig {
            page_size: 2 * ROW_SIZE,
            max_pages: usize::MAX,
        };
        assert_eq!(config.max_rows(), usize::MAX);
    }
}
