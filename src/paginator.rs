/// Fixed size pages over a slice. Pages are 1-based.
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: u32,
    page_count: u32,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page_count = (items.len() as u32).div_ceil(page_size);
        Paginator {
            items,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn get_page(&self, page: u32) -> Result<&'a [T], String> {
        match page {
            0 => return Err("Page has to be greater than 0".to_string()),
            x if x > self.page_count => return Err(format!("Page has to be at most page_count ({})", self.page_count)),
            _ => {}
        };

        let start = ((page - 1) * self.page_size) as usize;
        let end = (start + self.page_size as usize).min(self.items.len());
        Ok(&self.items[start..end])
    }

    /// The requested page, or page 1 when it is out of range.
    pub fn page_or_first(&self, page: u32) -> (u32, &'a [T]) {
        match self.get_page(page) {
            Ok(items) => (page, items),
            Err(_) => (1, self.get_page(1).unwrap_or(&[])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages() {
        let items = vec![1, 2, 3, 4, 5, 6, 7];
        let paginator = Paginator::from(&items, 3);
        assert_eq!(paginator.page_count(), 3);
        assert_eq!(paginator.get_page(1), Ok([1, 2, 3].as_slice()));
        assert_eq!(paginator.get_page(3), Ok([7].as_slice()));
        assert_eq!(paginator.get_page(0), Err("Page has to be greater than 0".to_string()));
        assert_eq!(paginator.get_page(4), Err("Page has to be at most page_count (3)".to_string()));
    }

    #[test]
    fn test_out_of_range_falls_back_to_first() {
        let items = vec!["a", "b", "c"];
        let paginator = Paginator::from(&items, 2);
        assert_eq!(paginator.page_or_first(2), (2, ["c"].as_slice()));
        assert_eq!(paginator.page_or_first(9), (1, ["a", "b"].as_slice()));
    }

    #[test]
    fn test_empty() {
        let items: Vec<u32> = vec![];
        let paginator = Paginator::from(&items, 10);
        assert_eq!(paginator.page_count(), 0);
        let nothing: &[u32] = &[];
        assert_eq!(paginator.page_or_first(1), (1, nothing));
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let items = vec![1, 2];
        assert_eq!(Paginator::from(&items, 0).page_count(), 2);
    }
}
