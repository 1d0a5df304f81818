/// Unwraps a `Result` inside a function returning `Option<Result<T, E>>`.
///
/// `Ok(t)` yields `t`; `Err(e)` makes the enclosing function return `Some(Err(e))`.
///
/// Intended for `next()` of an `Iterator<Item = Result<T, E>>` built on top of
/// fallible cursor or decoder calls:
///
/// ```ignore
/// fn next(&mut self) -> Option<Result<u64>> {
///     if !try_or_ret_some_err!(self.decoder.next()) {
///         return None;
///     }
///     Some(self.decoder.get_position())
/// }
/// ```
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => {
                return Some(Err(err));
            }
        }
    };
}
