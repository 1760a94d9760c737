/// Removes the value at `source_idx` and reinserts it so that it ends up at `target_idx`. Does
/// nothing if `source_idx` is equal to `target_idx` or if either index is outside the vec bounds.
pub fn shift_vec<T>(source_idx: usize, target_idx: usize, vec: &mut Vec<T>) {
    if source_idx == target_idx || source_idx >= vec.len() || target_idx >= vec.len() {
        return;
    }

    let item = vec.remove(source_idx);
    vec.insert(target_idx, item);
}

/// Maps an index of the virtual list onto the backing list.
///
/// During a drag the virtual list is the backing list with the item at `selected` taken out and
/// an empty placeholder slot inserted at `empty`. Every index except `empty` resolves to exactly
/// one item of the backing list.
///
/// # Panics
///
/// Panics if `index == empty`: the empty slot holds no item and must never be looked up.
pub fn virtual_to_real(selected: usize, empty: usize, index: usize) -> usize {
    assert_ne!(index, empty, "no item in virtual slot {index}");

    if empty == selected {
        return index;
    }

    let mut index = index;
    if index > empty {
        index -= 1;
    }
    if index >= selected {
        index += 1;
    }
    index
}

/// Resolves the row under a container-relative `y` coordinate.
///
/// Rows start at `top` and repeat every `item_height + gap`. Returns `None` for coordinates above
/// `top` or inside the gap between two rows.
pub fn row_at(y: f32, top: f32, item_height: f32, gap: f32) -> Option<usize> {
    let pitch = item_height + gap;
    let dy = y - top;
    if dy < 0.0 || pitch <= 0.0 {
        return None;
    }

    let quotient = (dy / pitch).floor();
    let remainder = dy - quotient * pitch;
    (remainder < item_height).then_some(quotient as usize)
}

/// Resolves a possibly negative index against a list of `len` elements. Valid indices lie in
/// `[-len, len)`.
pub(crate) fn resolve_index(index: isize, len: usize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}
