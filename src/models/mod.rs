/// Declares a Rust mirror of a Postgres enum type: sqlx/serde mappings in
/// SCREAMING_SNAKE_CASE, `ALL` in declaration order, and a lenient `FromStr`
/// used for query-string filters.
macro_rules! pg_enum {
    ($(#[$meta:meta])* $name:ident, $pg:tt, $label:tt, { $($variant:ident => $text:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[sqlx(type_name = $pg, rename_all = "SCREAMING_SNAKE_CASE")]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Invalid {}: {}", $label, other)),
                }
            }
        }

        impl crate::database::query::PgEnum for $name {
            const PG_TYPE: &'static str = $pg;

            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }
    };
}

pub mod course;
pub mod follow_up;
pub mod interaction;
pub mod lead;
pub mod user;
