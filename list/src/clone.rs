use stack_allocator::{AllocError, Allocator};
use tracing::debug;

use crate::{List, NodeAllocator, Rollback};

impl<T: Clone, A: Allocator<Value = T>> List<T, A> {
    /// Copies the list element by element.
    ///
    /// The copy gets its allocator from [`Allocator::select_on_copy`] on this
    /// list's allocator.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        let mut copy = List::with_node_allocator(self.alloc.select_on_copy())?;
        copy.append_clones(self)?;
        Ok(copy)
    }

    /// Replaces the contents of `self` with copies of `source`'s elements.
    ///
    /// The copies are appended behind the existing elements first and the old
    /// elements are erased only once every copy succeeded. If an allocation
    /// fails or a `clone` panics, the copies made so far are erased again and
    /// `self` is left exactly as it was.
    ///
    /// When the allocator asks for [propagation on copy
    /// assignment](Allocator::PROPAGATE_ON_COPY_ASSIGNMENT), `self` ends up
    /// with `source`'s allocator. If the two allocators differ, the copy is
    /// built in a separate list on the new allocator and swapped in, so the
    /// old nodes are freed by the allocator that produced them.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError> {
        let propagate = <NodeAllocator<T, A> as Allocator>::PROPAGATE_ON_COPY_ASSIGNMENT;
        if propagate && self.alloc != source.alloc {
            debug!(len = source.len, "copy assignment adopts the source allocator");
            let mut copy = List::with_node_allocator(source.alloc.clone())?;
            copy.append_clones(source)?;
            *self = copy;
            return Ok(());
        }
        if propagate {
            self.alloc = source.alloc.clone();
        }

        let rollback = Rollback::new(self);
        let old_len = rollback.len();
        rollback.list.append_clones(source)?;
        rollback.commit();

        for _ in 0..old_len {
            if let Some(first) = self.first() {
                unsafe { self.erase(first) };
            }
        }
        Ok(())
    }

    fn append_clones(&mut self, source: &Self) -> Result<(), AllocError> {
        for value in source {
            self.push_back_with(|| value.clone())?;
        }
        Ok(())
    }
}

/// Like [`List::try_clone`] and [`List::try_clone_from`], panicking if an
/// allocation fails.
impl<T: Clone, A: Allocator<Value = T>> Clone for List<T, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("failed to clone list: {err}"),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            panic!("failed to assign list: {err}");
        }
    }
}
