//! Ordered, owning list of sub-kernels

use crate::kernel::Kernel;

/// Ordered collection of boxed kernels
///
/// Position `i` in the list is the canonical index for everything parallel
/// to it: combination weights, feature slots, per-sub-kernel outputs.
#[derive(Debug, Default)]
pub struct KernelList {
    kernels: Vec<Box<dyn Kernel>>,
}

impl KernelList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `kernel` at the tail
    pub fn append(&mut self, kernel: Box<dyn Kernel>) {
        self.kernels.push(kernel);
    }

    /// Head of the list as `(position, kernel)`
    pub fn first(&self) -> Option<(usize, &dyn Kernel)> {
        self.get(0).map(|k| (0, k))
    }

    /// Successor of position `current`, or `None` at the tail
    pub fn next(&self, current: usize) -> Option<(usize, &dyn Kernel)> {
        let pos = current.checked_add(1)?;
        self.get(pos).map(|k| (pos, k))
    }

    pub fn get(&self, pos: usize) -> Option<&dyn Kernel> {
        self.kernels.get(pos).map(|k| k.as_ref())
    }

    pub fn get_mut(&mut self, pos: usize) -> Option<&mut (dyn Kernel + 'static)> {
        self.kernels.get_mut(pos).map(|k| k.as_mut())
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Kernel> {
        self.kernels.iter().map(|k| k.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Kernel>> {
        self.kernels.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Linear, LinearKernel, Rbf, RbfKernel};

    fn list() -> KernelList {
        let mut list = KernelList::new();
        list.append(Box::new(LinearKernel::new(Linear)));
        list.append(Box::new(RbfKernel::new(Rbf::new(1.0))));
        list
    }

    #[test]
    fn test_first_next_walk() {
        let list = list();

        let (pos, first) = list.first().unwrap();
        assert_eq!(pos, 0);
        assert_eq!(first.name(), "linear");

        let (pos, second) = list.next(pos).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(second.name(), "rbf");

        assert!(list.next(pos).is_none());
    }

    #[test]
    fn test_empty_list() {
        let list = KernelList::new();
        assert!(list.is_empty());
        assert!(list.first().is_none());
        assert!(list.next(0).is_none());
    }

    #[test]
    fn test_reiteration_is_stable() {
        let list = list();
        let names: Vec<_> = list.iter().map(|k| k.name().to_string()).collect();
        let again: Vec<_> = list.iter().map(|k| k.name().to_string()).collect();
        assert_eq!(names, vec!["linear", "rbf"]);
        assert_eq!(names, again);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = list();
        list.get_mut(1).unwrap().set_combined_kernel_weight(0.5);
        assert_eq!(list.get(1).unwrap().combined_kernel_weight(), 0.5);
        assert!(list.get(2).is_none());
    }
}
