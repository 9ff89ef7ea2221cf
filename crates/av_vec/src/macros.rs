/// Creates a [`DynamicArray`](crate::DynamicArray) containing the arguments.
///
/// Like `vec!`, there are two forms:
///
/// - a list of elements, the capacity equals the element count,
/// - `[elem; n]`, which clones `elem` `n - 1` times (`T: Clone`).
///
/// # Examples
///
/// ```
/// use av_vec::{DynamicArray, dyn_array};
///
/// let empty: DynamicArray<u8> = dyn_array![];
/// assert!(empty.is_empty());
///
/// let listed = dyn_array![1, 2, 3];
/// assert_eq!(listed.capacity(), 3);
///
/// let repeated = dyn_array![String::from("x"); 2];
/// assert_eq!(repeated, ["x", "x"]);
/// ```
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($x),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::DynamicArray;

    #[test]
    fn repeat_form() {
        let zero: DynamicArray<u8> = dyn_array![7; 0];
        assert_eq!(zero.capacity(), 0);

        let four = dyn_array![7u8; 4];
        assert_eq!(four, [7, 7, 7, 7]);
        assert_eq!(four.capacity(), 4);
    }

    #[test]
    fn trailing_comma() {
        let array = dyn_array![1, 2,];
        assert_eq!(array, [1, 2]);
    }
}
