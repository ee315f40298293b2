//! Paginated song listing with search snapshot and insert-next

use super::track::Track;

/// The visible song sequence, split into fixed-size pages.
///
/// Page numbers are 1-based and there is always at least one page, even when
/// the listing is empty.
#[derive(Clone, Debug)]
pub struct Listing {
    songs: Vec<Track>,
    saved: Option<Vec<Track>>,
    page_size: usize,
    current_page: usize,
    total_pages: usize,
    selected_row: usize,
}

/// Read-only copy of the visible page for rendering.
#[derive(Clone, Debug, Default)]
pub struct ListingView {
    pub rows: Vec<Track>,
    pub page_start: usize,
    pub selected_row: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_songs: usize,
    pub search_mode: bool,
}

impl Listing {
    pub fn new(page_size: usize) -> Self {
        Self {
            songs: Vec::new(),
            saved: None,
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            selected_row: 0,
        }
    }

    #[cfg(test)]
    pub fn songs(&self) -> &[Track] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.songs.get(index)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[cfg(test)]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[cfg(test)]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_search_mode(&self) -> bool {
        self.saved.is_some()
    }

    /// Replace the sequence with freshly loaded songs.
    ///
    /// Returns `false` and keeps the current page when the new songs are
    /// identical to what is already shown.
    pub fn replace(&mut self, songs: Vec<Track>) -> bool {
        if songs == self.songs {
            return false;
        }
        self.songs = songs;
        self.reset_to_first_page();
        true
    }

    /// Show search results, remembering the pre-search listing the first time.
    pub fn apply_search(&mut self, results: Vec<Track>) {
        if self.saved.is_none() {
            self.saved = Some(std::mem::take(&mut self.songs));
        }
        self.songs = results;
        self.reset_to_first_page();
    }

    /// Restore the pre-search listing. Returns `false` when not searching.
    pub fn clear_search(&mut self) -> bool {
        match self.saved.take() {
            Some(saved) => {
                self.songs = saved;
                self.reset_to_first_page();
                true
            }
            None => false,
        }
    }

    /// Place `track` right after the current track.
    ///
    /// An existing copy is moved rather than duplicated. Returns the current
    /// index corrected for the removal, which the caller writes back to the
    /// player state.
    pub fn insert_next(&mut self, track: Track, current: Option<usize>) -> Option<usize> {
        let mut current_pos = current.map(|i| i as isize).unwrap_or(-1);
        let mut moved_current = false;

        if let Some(existing) = self.songs.iter().position(|s| s.id == track.id) {
            self.songs.remove(existing);
            let existing = existing as isize;
            if existing <= current_pos {
                moved_current = existing == current_pos;
                current_pos -= 1;
            }
        }

        let insert_at = ((current_pos + 1).max(0) as usize).min(self.songs.len());
        self.songs.insert(insert_at, track);
        self.recompute_pages();

        if moved_current {
            // The current track itself was re-inserted; follow it.
            Some(insert_at)
        } else {
            current.map(|_| current_pos as usize)
        }
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages {
            self.current_page += 1;
            self.selected_row = 0;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            self.selected_row = 0;
            true
        } else {
            false
        }
    }

    pub fn first_page(&mut self) {
        self.current_page = 1;
        self.selected_row = 0;
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages;
        self.selected_row = 0;
    }

    pub fn page_start(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    pub fn page_rows(&self) -> &[Track] {
        let start = self.page_start().min(self.songs.len());
        let end = (start + self.page_size).min(self.songs.len());
        &self.songs[start..end]
    }

    pub fn select_next_row(&mut self) {
        let rows = self.page_rows().len();
        if self.selected_row + 1 < rows {
            self.selected_row += 1;
        }
    }

    pub fn select_prev_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    /// Global index of the highlighted row, if the page has any rows.
    pub fn selected_index(&self) -> Option<usize> {
        let index = self.page_start() + self.selected_row;
        (index < self.songs.len()).then_some(index)
    }

    pub fn view(&self) -> ListingView {
        ListingView {
            rows: self.page_rows().to_vec(),
            page_start: self.page_start(),
            selected_row: self.selected_row,
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_songs: self.songs.len(),
            search_mode: self.is_search_mode(),
        }
    }

    fn reset_to_first_page(&mut self) {
        self.recompute_pages();
        self.current_page = 1;
        self.selected_row = 0;
    }

    fn recompute_pages(&mut self) {
        self.total_pages = self.songs.len().div_ceil(self.page_size).max(1);
        if self.current_page > self.total_pages {
            self.current_page = self.total_pages;
        }
        let rows = self.page_rows().len();
        if self.selected_row >= rows {
            self.selected_row = rows.saturating_sub(1);
        }
    }
}
