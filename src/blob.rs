// src/blob.rs

//! Defines `Blob`, a capacity-managed contiguous storage region with
//! amortized geometric growth.
//!
//! `Blob` tracks *capacity only* — it has no notion of a logical length.
//! Higher-level owners (e.g. the pixel `Surface`) layer their own length
//! semantics on top. Two compile-time policies shape the type:
//!
//! - `INLINE`: element count of a fixed-size on-instance array used as the
//!   backing store until a request outgrows it. `0` disables inline storage
//!   entirely (the blob then starts unallocated with capacity 0).
//! - `LOCKABLE`: when `true`, the blob enforces a lock/unlock discipline so
//!   that a caller holding a raw view can rely on the storage neither moving
//!   nor being freed. When `false`, every lock check is a constant branch the
//!   optimizer removes, and `direct_mut` provides unconditional access — the
//!   designed fast path for single-owner, performance-critical use.
//!
//! The lock is a same-thread aliasing guard, not a synchronization primitive:
//! it prevents a reallocation from invalidating a view the same caller is
//! actively using. A blob dropped while locked simply frees its storage; the
//! borrow checker already guarantees no view can outlive the blob, so there is
//! no dangling-pointer hazard to guard against.

use std::fmt;
use std::marker::PhantomData;

/// Maps (current capacity, requested capacity) to the capacity actually
/// allocated, amortizing reallocation cost over a sequence of growth calls.
pub trait GrowthPolicy {
    /// Returns the new capacity, in elements. Must be >= `requested`.
    fn next_capacity(current: usize, requested: usize) -> usize;
}

/// Default growth policy: from an empty blob, allocate exactly the request;
/// otherwise repeatedly scale the current capacity by 1.5 (truncating) until
/// it covers the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amortized;

impl GrowthPolicy for Amortized {
    fn next_capacity(current: usize, requested: usize) -> usize {
        if current == 0 {
            return requested;
        }
        let mut cap = current;
        while cap < requested {
            // max(1): a capacity of 1 has a zero half-step and would never grow.
            cap += (cap >> 1).max(1);
        }
        cap
    }
}

/// Failure conditions reported by `Blob` operations. None of these are fatal;
/// the blob stays valid in its prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobError {
    /// A reallocation or release was attempted while the blob is locked.
    Locked,
    /// A lock was requested on a blob with zero capacity.
    ZeroCapacityLock,
    /// The allocator could not satisfy a growth request.
    Alloc,
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::Locked => write!(f, "operation rejected: blob is locked"),
            BlobError::ZeroCapacityLock => {
                write!(f, "cannot lock a blob with zero capacity")
            }
            BlobError::Alloc => write!(f, "allocation failure during blob growth"),
        }
    }
}

impl std::error::Error for BlobError {}

/// Backing storage. `Inline` is only ever constructed when `INLINE > 0`.
enum Storage<T, const INLINE: usize> {
    Inline([T; INLINE]),
    Heap(Box<[T]>),
    Unallocated,
}

/// A growable contiguous buffer of `T` with optional inline (small-buffer)
/// storage and an optional lock discipline. See the module docs for the
/// policy parameters.
///
/// Capacity never shrinks while the blob is in use: requesting a capacity at
/// or below the current one is a true no-op that leaves the storage address
/// untouched. `release` is the only way back to the minimal state.
///
/// `T: Copy + Default` because grown capacity is default-filled rather than
/// left uninitialized; existing content is preserved byte-for-byte across
/// growth.
pub struct Blob<T, P = Amortized, const INLINE: usize = 0, const LOCKABLE: bool = true> {
    storage: Storage<T, INLINE>,
    locked: bool,
    _policy: PhantomData<P>,
}

impl<T, P, const INLINE: usize, const LOCKABLE: bool> Blob<T, P, INLINE, LOCKABLE>
where
    T: Copy + Default,
    P: GrowthPolicy,
{
    /// Creates an empty blob. With inline storage enabled the capacity starts
    /// at `INLINE` and the storage points at the on-instance array; otherwise
    /// the blob starts unallocated with capacity 0.
    pub fn new() -> Self {
        let storage = if INLINE > 0 {
            Storage::Inline([T::default(); INLINE])
        } else {
            Storage::Unallocated
        };
        Self {
            storage,
            locked: false,
            _policy: PhantomData,
        }
    }

    /// Current allocated capacity in elements. This is not a logical length.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => INLINE,
            Storage::Heap(s) => s.len(),
            Storage::Unallocated => 0,
        }
    }

    /// True while the backing store is the on-instance inline array.
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// True if the blob is lockable and currently locked.
    pub fn is_locked(&self) -> bool {
        LOCKABLE && self.locked
    }

    /// Shared view of the full capacity. Empty when unallocated.
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Inline(arr) => arr,
            Storage::Heap(s) => s,
            Storage::Unallocated => &[],
        }
    }

    fn slice_mut(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Inline(arr) => arr,
            Storage::Heap(s) => s,
            Storage::Unallocated => &mut [],
        }
    }

    /// Guarantees capacity for at least `n` elements.
    ///
    /// A no-op when the current capacity already covers `n` (the storage
    /// address is untouched). Otherwise grows to `P::next_capacity(current, n)`
    /// and preserves existing content. Fails with `Locked` while a lock is
    /// held and with `Alloc` if the allocator refuses; the blob is left in its
    /// prior valid state on every failure path.
    pub fn ensure_capacity(&mut self, n: usize) -> Result<(), BlobError> {
        if self.is_locked() {
            return Err(BlobError::Locked);
        }
        let current = self.capacity();
        if current >= n {
            return Ok(());
        }
        let new_cap = P::next_capacity(current, n);
        let mut grown: Vec<T> = Vec::new();
        grown
            .try_reserve_exact(new_cap)
            .map_err(|_| BlobError::Alloc)?;
        grown.resize(new_cap, T::default());
        let old = self.as_slice();
        grown[..old.len()].copy_from_slice(old);
        self.storage = Storage::Heap(grown.into_boxed_slice());
        Ok(())
    }

    /// Returns the blob to its minimal state: back to the inline array (with
    /// capacity `INLINE`) when inline storage is enabled, otherwise
    /// unallocated with capacity 0. Fails with `Locked` while a lock is held;
    /// succeeds as a no-op when already minimal.
    pub fn release(&mut self) -> Result<(), BlobError> {
        if self.is_locked() {
            return Err(BlobError::Locked);
        }
        if INLINE > 0 {
            if !self.is_inline() {
                self.storage = Storage::Inline([T::default(); INLINE]);
            }
        } else if !matches!(self.storage, Storage::Unallocated) {
            self.storage = Storage::Unallocated;
        }
        Ok(())
    }

    /// Marks the blob locked, pinning its storage in place.
    ///
    /// On a non-lockable blob this always succeeds without side effects. On a
    /// lockable blob it fails with `ZeroCapacityLock` when there is no storage
    /// to pin. Locking is not reference-counted; a second `lock` is a no-op.
    pub fn lock(&mut self) -> Result<(), BlobError> {
        if !LOCKABLE {
            return Ok(());
        }
        if self.capacity() == 0 {
            return Err(BlobError::ZeroCapacityLock);
        }
        self.locked = true;
        Ok(())
    }

    /// Clears the lock flag. Always succeeds, including when not locked.
    pub fn unlock(&mut self) {
        if LOCKABLE {
            self.locked = false;
        }
    }

    /// Ensures capacity for `n` elements, locks, and returns the mutable
    /// view — `ensure_capacity` followed by `lock` in one call.
    ///
    /// Pair every successful call with `unlock` on every exit path. Fails
    /// without state change if already locked, if growth fails, or if the
    /// resulting capacity cannot be locked.
    pub fn acquire(&mut self, n: usize) -> Result<&mut [T], BlobError> {
        if self.is_locked() {
            return Err(BlobError::Locked);
        }
        self.ensure_capacity(n)?;
        self.lock()?;
        Ok(self.slice_mut())
    }

    /// Mutable view of the storage, gated by the lock discipline: `Some` only
    /// while locked (or always, on a non-lockable blob).
    pub fn raw_view_mut(&mut self) -> Option<&mut [T]> {
        if LOCKABLE && !self.locked {
            return None;
        }
        Some(self.slice_mut())
    }
}

impl<T, P, const INLINE: usize> Blob<T, P, INLINE, false>
where
    T: Copy + Default,
    P: GrowthPolicy,
{
    /// Unconditional mutable view. Only exists on non-lockable blobs, where
    /// the single owner is responsible for not holding this across a resize
    /// (the borrow checker enforces exactly that).
    pub fn direct_mut(&mut self) -> &mut [T] {
        self.slice_mut()
    }
}

impl<T, P, const INLINE: usize, const LOCKABLE: bool> Default for Blob<T, P, INLINE, LOCKABLE>
where
    T: Copy + Default,
    P: GrowthPolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, const INLINE: usize, const LOCKABLE: bool> fmt::Debug for Blob<T, P, INLINE, LOCKABLE>
where
    T: Copy + Default,
    P: GrowthPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("capacity", &self.capacity())
            .field("inline", &self.is_inline())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Blob with a small-buffer fast path of `N` elements.
pub type InlineBlob<T, const N: usize> = Blob<T, Amortized, N, true>;

/// Heap-only blob without lock bookkeeping; see `Blob::direct_mut`.
pub type RawBlob<T> = Blob<T, Amortized, 0, false>;
