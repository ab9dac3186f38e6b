use core::{
    mem::MaybeUninit,
    ptr::{addr_of_mut, NonNull},
};

// Links are the first field of every `Node`, so a `NonNull<Links>` can be
// cast back to the node it belongs to. The sentinel is a `Node` whose value
// is never initialized.
#[repr(C)]
pub(crate) struct Links {
    prev: NonNull<Links>,
    next: NonNull<Links>,
}

/// The storage a list allocates per element, plus one for its sentinel.
#[repr(C)]
pub struct Node<T> {
    links: Links,
    value: MaybeUninit<T>,
}

impl Links {
    /// Makes `this` a one-element ring.
    ///
    /// # Safety
    ///
    /// `this` must be valid for writes.
    pub(crate) unsafe fn init(this: NonNull<Links>) {
        unsafe {
            this.as_ptr().write(Links {
                prev: this,
                next: this,
            })
        }
    }

    /// # Safety
    ///
    /// `this` must point to initialized links.
    pub(crate) unsafe fn next(this: NonNull<Links>) -> NonNull<Links> {
        unsafe { (*this.as_ptr()).next }
    }

    /// # Safety
    ///
    /// `this` must point to initialized links.
    pub(crate) unsafe fn prev(this: NonNull<Links>) -> NonNull<Links> {
        unsafe { (*this.as_ptr()).prev }
    }

    /// Splices the unlinked `node` in right before `next`.
    ///
    /// # Safety
    ///
    /// `next` must be part of a consistent ring and `node` must not be.
    pub(crate) unsafe fn link_before(node: NonNull<Links>, next: NonNull<Links>) {
        unsafe {
            let prev = Links::prev(next);
            node.as_ptr().write(Links { prev, next });
            (*prev.as_ptr()).next = node;
            (*next.as_ptr()).prev = node;
            debug_assert!(Links::next(Links::prev(node)) == node);
            debug_assert!(Links::prev(Links::next(node)) == node);
        }
    }

    /// Takes `node` out of its ring, joining its neighbours.
    ///
    /// # Safety
    ///
    /// `node` must be part of a consistent ring of at least two nodes.
    pub(crate) unsafe fn unlink(node: NonNull<Links>) {
        unsafe {
            let prev = Links::prev(node);
            let next = Links::next(node);
            debug_assert!(prev != node && next != node, "unlinking a lone node");
            (*prev.as_ptr()).next = next;
            (*next.as_ptr()).prev = prev;
        }
    }
}

impl<T> Node<T> {
    /// # Safety
    ///
    /// `node` must point into an allocation at least as large as `Node<T>`.
    pub(crate) unsafe fn links(node: NonNull<Node<T>>) -> NonNull<Links> {
        // SAFETY: a field of a non-null allocation is non-null.
        unsafe { NonNull::new_unchecked(addr_of_mut!((*node.as_ptr()).links)) }
    }

    /// Address of the value slot of the node owning `links`.
    ///
    /// # Safety
    ///
    /// `links` must be the links of an allocated `Node<T>`.
    pub(crate) unsafe fn value_ptr(links: NonNull<Links>) -> NonNull<T> {
        let node = links.cast::<Node<T>>().as_ptr();
        // SAFETY: a field of a non-null allocation is non-null.
        unsafe { NonNull::new_unchecked(addr_of_mut!((*node).value)).cast() }
    }

    /// # Safety
    ///
    /// `links` must belong to an element node whose value outlives `'a`
    /// without being mutated.
    pub(crate) unsafe fn value<'a>(links: NonNull<Links>) -> &'a T {
        unsafe { Node::value_ptr(links).as_ref() }
    }

    /// # Safety
    ///
    /// `links` must belong to an element node whose value is not otherwise
    /// accessed during `'a`.
    pub(crate) unsafe fn value_mut<'a>(links: NonNull<Links>) -> &'a mut T {
        unsafe { Node::value_ptr(links).as_mut() }
    }
}

#[cfg(test)]
mod tests {
    use core::{mem, ptr::NonNull};

    use static_assertions::const_assert_eq;

    use super::{Links, Node};

    const_assert_eq!(mem::size_of::<Node<()>>(), mem::size_of::<Links>());
    const_assert_eq!(mem::align_of::<Node<u8>>(), mem::align_of::<Links>());
    const_assert_eq!(mem::align_of::<Node<u128>>(), mem::align_of::<u128>());

    #[test]
    fn test() {
        let mut nodes: [mem::MaybeUninit<Node<u32>>; 3] =
            [const { mem::MaybeUninit::uninit() }; 3];
        let [a, b, c] = nodes
            .each_mut()
            .map(|n| unsafe { Node::links(NonNull::from(n).cast::<Node<u32>>()) });
        unsafe {
            Links::init(a);
            Links::link_before(b, a);
            Links::link_before(c, a);
            assert!(Links::next(a) == b && Links::next(b) == c && Links::next(c) == a);
            assert!(Links::prev(a) == c && Links::prev(c) == b && Links::prev(b) == a);

            Links::unlink(b);
            assert!(Links::next(a) == c && Links::prev(c) == a);
            assert!(Links::next(c) == a && Links::prev(a) == c);

            Node::<u32>::value_ptr(c).as_ptr().write(9);
            *Node::<u32>::value_mut(c) += 1;
            assert_eq!(*Node::<u32>::value(c), 10);
        }
    }
}
