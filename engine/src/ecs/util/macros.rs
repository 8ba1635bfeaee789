/// Invoke a macro once for every non-empty suffix of the given identifier list, so a trait can be
/// implemented for tuples of each arity.
#[macro_export]
#[doc(hidden)]
macro_rules! for_every_tuple {
    ($m:ident !! $head_ty:ident) => {
        $m!($head_ty);
    };
    ($m:ident !! $head_ty:ident, $($tail_ty:ident),*) => (
        $m!($head_ty, $( $tail_ty ),*);
        $crate::for_every_tuple!($m !! $( $tail_ty ),*);
    );
}

/// Apply a macro to every tuple arity from 1 to 12.
#[macro_export]
#[doc(hidden)]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::for_every_tuple!($m !! P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12);
    };
}

/// Count a comma separated list of token trees as a `usize` constant expression.
#[macro_export]
#[doc(hidden)]
macro_rules! count {
    () => { 0usize };
    ($head:tt $(, $tail:tt)*) => { 1usize + $crate::count!($($tail),*) };
}
