/// Wire-string conversions for enums stored as text.
///
/// `string_enum!(Name { Variant => "wire", .. })` is closed: it adds `ALL`,
/// `as_str`, `Display`, `From<Name> for String` and a `TryFrom<String>` that
/// rejects unknown strings. `string_enum!(open Name, "label" { .. })` is for
/// values written by outside providers: anything unlisted lands in
/// `Other(String)` and only the empty string is rejected.
///
/// Pair with `#[serde(into = "String", try_from = "String")]` on the enum.
macro_rules! string_enum {
    (@display $name:ident) => {
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };

    (open $name:ident, $label:literal { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $str,)+
                    $name::Other(s) => s,
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                match v {
                    $name::Other(s) => s,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                match s.as_str() {
                    $($str => Ok($name::$variant),)+
                    "" => Err(format!("{} cannot be empty", $label)),
                    _ => Ok($name::Other(s)),
                }
            }
        }

        string_enum!(@display $name);
    };

    ($name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                match s.as_str() {
                    $($str => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }

        string_enum!(@display $name);
    };
}
