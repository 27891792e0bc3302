//! Declaration helper for string-labelled enums.

/// Define a `Copy` enum whose variants serialize as fixed lowercase labels.
///
/// Generates `ALL`, `VALUES`, `as_str`, `Display`, a `FromStr` that fails
/// with a validation error listing the accepted labels, and a
/// [`Label`](crate::entity::Label) impl.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Every serialized label, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($label),+];

            /// Return the serialized label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = grc_core::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok(Self::$variant),)+
                    other => Err(grc_core::AppError::validation(format!(
                        "'{other}' is not a valid {} (expected one of: {})",
                        stringify!($name),
                        Self::VALUES.join(", ")
                    ))),
                }
            }
        }

        impl $crate::entity::Label for $name {
            fn label(&self) -> &'static str {
                self.as_str()
            }

            fn labels() -> &'static [&'static str] {
                Self::VALUES
            }
        }
    };
}
