/// How reads outside a buffer are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum BorderMode<T> {
    /// Repeat the edge sample.
    Clamp,
    /// Fill with a fixed value.
    Constant(T),
    /// Half-sample symmetric mirror: `-1 -> 0`, `-2 -> 1`, `len -> len - 1`.
    Reflect,
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// Returns `None` for [`BorderMode::Constant`] (the caller substitutes the
/// constant) and for empty axes.
pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match mode {
        BorderMode::Constant(_) => {
            if i >= 0 && (i as usize) < len {
                Some(i as usize)
            } else {
                None
            }
        }
        BorderMode::Clamp => {
            if i < 0 {
                Some(0)
            } else {
                Some((i as usize).min(len - 1))
            }
        }
        BorderMode::Reflect => {
            let period = (2 * len) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { Some(r) } else { Some(2 * len - 1 - r) }
        }
    }
}
