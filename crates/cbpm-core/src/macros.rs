//! Enums persisted as text columns.
//!
//! Each variant has one stored spelling, used by serde, sqlx, `Display` and
//! `FromStr`. Parsing ignores ASCII case and surrounding whitespace, and
//! unknown text is a [`ValidationError::NotAllowed`](crate::error::ValidationError).

macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $stored:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize, ::ts_rs::TS,
        )]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[ts(export)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $stored)]
                #[cfg_attr(feature = "sqlx", sqlx(rename = $stored))]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored/serialized spelling.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $stored),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| $crate::error::ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: Self::ALL.iter().map(|v| v.as_str().to_string()).collect(),
                    })
            }
        }
    };
}
