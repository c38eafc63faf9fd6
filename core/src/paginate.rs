/// Split `items` into pages of `page_size`; the last page may be shorter.
/// A zero page size puts everything on a single page.
pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    if page_size == 0 {
        return vec![items];
    }
    items.chunks(page_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_every_item() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(paginate(&items, 2), vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
        assert_eq!(paginate(&items, 0), vec![&items[..]]);
        assert!(paginate::<i32>(&[], 3).is_empty());
    }
}
