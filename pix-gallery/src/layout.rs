use serde::Serialize;

/// One row of the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<T> {
    pub index: usize,
    pub items: Vec<T>,
}

/// How many tiles of `item_width` fit in `viewport_width`; never less than 1.
///
/// Non-finite or non-positive widths fall back to a single column.
pub fn images_per_row(viewport_width: f32, item_width: f32) -> usize {
    if !viewport_width.is_finite() || !item_width.is_finite() || viewport_width <= 0.0 || item_width <= 0.0 {
        return 1;
    }
    ((viewport_width / item_width).floor() as usize).max(1)
}

/// Split `items` into consecutive rows of `per_row` (the last may be shorter)
pub fn chunk_rows<T: Clone>(items: &[T], per_row: usize) -> Vec<Row<T>> {
    items
        .chunks(per_row.max(1))
        .enumerate()
        .map(|(index, chunk)| Row {
            index,
            items: chunk.to_vec(),
        })
        .collect()
}

/// Grid layout of `items` for a viewport
pub fn layout_rows<T: Clone>(items: &[T], viewport_width: f32, item_width: f32) -> Vec<Row<T>> {
    chunk_rows(items, images_per_row(viewport_width, item_width))
}
