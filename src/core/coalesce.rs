use crate::domain::truthy::Truthy;
use crate::domain::value::Value;

/// Returns the first truthy element of `values`, unchanged.
///
/// The scan stops at the first hit, so later elements of a lazy iterator
/// are never produced. `None` means no element was truthy, which includes
/// the empty sequence.
pub fn coalesce<I>(values: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: Truthy,
{
    values.into_iter().find(|value| value.is_truthy())
}

/// [`coalesce`] over loosely typed values, yielding [`Value::Undefined`]
/// when nothing is truthy.
pub fn coalesce_values<I>(values: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    values
        .into_iter()
        .map(Into::into)
        .find(Truthy::is_truthy)
        .unwrap_or_default()
}

pub fn coalesce_or<I>(values: I, default: I::Item) -> I::Item
where
    I: IntoIterator,
    I::Item: Truthy,
{
    coalesce(values).unwrap_or(default)
}

/// Same scan as [`coalesce`] with a caller supplied acceptance rule.
pub fn coalesce_by<I, F>(values: I, mut accept: F) -> Option<I::Item>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> bool,
{
    values.into_iter().find(|value| accept(value))
}

/// Variadic [`coalesce`]. Arguments are evaluated left to right and
/// evaluation stops at the first truthy one.
///
/// ```
/// use coalesce::coalesce;
///
/// assert_eq!(coalesce!(0u32, 0, 3, 4), Some(3));
/// assert_eq!(coalesce!("", "fallback"), Some("fallback"));
/// assert_eq!(coalesce!(None, Some(0i32), Some(2)), Some(Some(2)));
/// ```
#[macro_export]
macro_rules! coalesce {
    () => {
        ::core::option::Option::None
    };
    ($($value:expr),+ $(,)?) => {
        'coalesce: {
            $(
                let value = $value;
                if $crate::Truthy::is_truthy(&value) {
                    break 'coalesce ::core::option::Option::Some(value);
                }
            )+
            ::core::option::Option::None
        }
    };
}
