use tokio::{
    runtime::{Handle, RuntimeFlavor},
    task::block_in_place,
};

/// Runs blocking file I/O from async code.
///
/// `block_in_place` panics outside of a multi-threaded runtime, so `f` is
/// called directly there.
#[inline]
pub fn maybe_block_in_place<R>(f: impl FnOnce() -> R) -> R {
    let multi_thread = Handle::try_current()
        .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);
    if multi_thread { block_in_place(f) } else { f() }
}
