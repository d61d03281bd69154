/// `config_struct!` defines a configuration structure with its defaults in a
/// single declaration and generates:
/// - The struct with public fields
/// - The Default implementation
/// - Serde support with `#[serde(default)]`, so partial TOML files load
/// - `FIELDS`, the accepted keys, used to flag typos in config files
///
/// # Example
/// ```
/// marketdash::config_struct! {
///     pub struct PollConfig {
///         interval_secs: u64 = 30,
///         enabled: bool = true,
///     }
/// }
///
/// assert_eq!(PollConfig::default().interval_secs, 30);
/// assert_eq!(PollConfig::FIELDS, &["interval_secs", "enabled"]);
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$attr:meta])*
        $vis:vis struct $section:ident {
            $( $(#[$doc:meta])* $field:ident: $ty:ty = $default:expr ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $section {
            $( $(#[$doc])* pub $field: $ty, )*
        }

        impl $section {
            /// Keys accepted in this section
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
        }

        impl Default for $section {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }
    };
}
