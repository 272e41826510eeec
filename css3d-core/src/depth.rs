/// Painter's-order stacking for browsers without preserve-3d
///
/// Sort by squared camera distance, nearest first, and hand out z-indices
/// counting down from the item count so the nearest item is drawn on top.
/// Intersecting elements can't be resolved this way.
pub fn stacking_order<K: Copy>(mut items: Vec<(K, f64)>) -> Vec<(K, usize)> {
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
    let z_max = items.len();
    items
        .into_iter()
        .enumerate()
        .map(|(index, (key, _))| (key, z_max - index))
        .collect()
}
