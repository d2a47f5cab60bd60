//! Accessor generation macros
//!
//! These macros eliminate repetitive match code on the node sum type.
//! They use `paste` internally for identifier concatenation.

/// Generate is_xxx, as_xxx, as_xxx_mut for enums with typed variants
///
/// Uses paste's `:camel` modifier to convert method name to variant name.
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool`
/// - `as_xxx(&self) -> Option<&Type>`
/// - `as_xxx_mut(&mut self) -> Option<&mut Type>`
///
/// # Example
/// ```ignore
/// impl Node {
///     // element -> Element, text -> Text
///     impl_enum_accessors!(element, text);
/// }
/// ```
macro_rules! impl_enum_accessors {
    ($($variant:ident),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a " [<$variant:camel>] " node"]
                #[inline]
                pub fn [<is_ $variant>](&self) -> bool {
                    matches!(self, Self::[<$variant:camel>](_))
                }

                #[doc = "Try to get as " $variant " reference"]
                #[inline]
                pub fn [<as_ $variant>](&self) -> Option<&[<$variant:camel>]> {
                    match self { Self::[<$variant:camel>](v) => Some(v), _ => None }
                }

                #[doc = "Try to get as mutable " $variant " reference"]
                #[inline]
                pub fn [<as_ $variant _mut>](&mut self) -> Option<&mut [<$variant:camel>]> {
                    match self { Self::[<$variant:camel>](v) => Some(v), _ => None }
                }
            )*
        }
    };
}

/// Generate `Element` constructors for element kinds without payload
///
/// # Example
/// ```ignore
/// impl Element {
///     impl_kind_constructors!(root => Root, paragraph => Paragraph);
///     // Expands to: pub fn root() -> Self { Self::new(ElementKind::Root) } ...
/// }
/// ```
macro_rules! impl_kind_constructors {
    ($($method:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Create an empty `", stringify!($kind), "` element")]
            pub fn $method() -> Self {
                Self::new(ElementKind::$kind)
            }
        )*
    };
}
