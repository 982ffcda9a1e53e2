/// Adds `mode` unless it is already set. Returns whether anything changed.
pub(crate) fn add_mode(modes: &mut String, mode: char) -> bool {
    if modes.contains(mode) {
        return false;
    }
    modes.push(mode);
    true
}

/// Removes every occurrence of `mode`. Returns whether anything changed.
pub(crate) fn remove_mode(modes: &mut String, mode: char) -> bool {
    if !modes.contains(mode) {
        return false;
    }
    modes.retain(|c| c != mode);
    true
}
