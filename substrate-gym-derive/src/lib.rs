use proc_macro_error::proc_macro_error;

mod sub_action;

/// Derives `SubAction` for a fieldless enum.
///
/// Variants map to consecutive values starting at `minimum` (default 0).
/// The action name defaults to the lowercased enum name.
///
/// ```ignore
/// #[derive(SubAction)]
/// #[sub_action(name = "turn", minimum = "-1")]
/// enum Turn { Left, Straight, Right }
/// ```
#[proc_macro_error]
#[proc_macro_derive(SubAction, attributes(sub_action))]
pub fn derive_sub_action(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    sub_action::derive(input)
}
