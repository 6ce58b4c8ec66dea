/// Declares a `u32`-backed enum and implements
/// [`EffectEnum`](crate::boxed::EffectEnum) for it.
///
/// ```ignore
/// effect_enum! {
///     /// Border handling.
///     pub enum BorderMode {
///         Soft = 0,
///         Hard = 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! effect_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $value
            ),+
        }

        impl $crate::boxed::EffectEnum for $name {
            fn to_u32(self) -> u32 {
                self as u32
            }

            fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value as u32
            }
        }
    };
}
