/// UUID v7 をラップする ID 型を定義する
///
/// 生成される型は `Copy` で、`Display` と serde では UUID の
/// ハイフン区切り表記になる。`FromStr` の失敗は `DomainError::InvalidId`。
///
/// ```rust
/// use todo_domain::todo::TodoId;
///
/// let id = TodoId::new();
/// assert_eq!(TodoId::parse(&id.to_string()), Ok(id));
/// assert!("65a1f0c2e4b0a1b2c3d4e5f6".parse::<TodoId>().is_err());
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[serde(transparent)]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// 時刻順に並ぶ新しい ID を採番する
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// 文字列表現から ID を復元する
            pub fn parse(value: &str) -> Result<Self, $crate::DomainError> {
                value.parse()
            }
        }

        impl std::str::FromStr for $Name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| $crate::DomainError::InvalidId(e.to_string()))
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
