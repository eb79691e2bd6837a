use slugsync_model::EntrySys;

/// Whether an automatic recompute must leave the slug alone.
///
/// With `lock_when_published` set, a published entry keeps its slug until
/// the user explicitly asks for a recompute (`force`).
pub fn is_locked(sys: &EntrySys, lock_when_published: bool, force: bool) -> bool {
    if force || !lock_when_published {
        return false;
    }
    sys.publication_state().is_published()
}
