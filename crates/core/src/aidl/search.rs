//! First-match search over class symbols.
//!
//! Nothing here knows about AIDL or signatures; the resolver passes in its
//! predicate, and tests can substitute their own [`ClassSearch`].

use crate::model::ClassSymbol;

/// Finds the first class matching a predicate.
pub trait ClassSearch {
    fn find_class(&self, predicate: &dyn Fn(&ClassSymbol) -> bool) -> Option<&ClassSymbol>;
}

/// [`ClassSearch`] over a borrowed, ordered class list.
#[derive(Debug, Clone, Copy)]
pub struct ListClassSearch<'a> {
    classes: &'a [&'a ClassSymbol],
}

impl<'a> ListClassSearch<'a> {
    pub fn new(classes: &'a [&'a ClassSymbol]) -> Self {
        Self { classes }
    }
}

impl ClassSearch for ListClassSearch<'_> {
    fn find_class(&self, predicate: &dyn Fn(&ClassSymbol) -> bool) -> Option<&ClassSymbol> {
        find_first(self.classes, predicate)
    }
}

/// Linear, short-circuiting scan; returns the first class for which
/// `predicate` holds, in slice order.
pub fn find_first<'a, P>(classes: &[&'a ClassSymbol], predicate: P) -> Option<&'a ClassSymbol>
where
    P: Fn(&ClassSymbol) -> bool,
{
    classes.iter().copied().find(|class| predicate(class))
}
