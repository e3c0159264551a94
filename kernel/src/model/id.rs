use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::error::AppError;
use uuid::Uuid;

macro_rules! define_id {
    ($id_type:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $id_type(Uuid);

        impl $id_type {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn raw(self) -> Uuid {
                self.0
            }
        }

        impl Default for $id_type {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $id_type {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $id_type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $id_type {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(BookId);
define_id!(UserId);
define_id!(CheckoutId);
define_id!(ReservationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_string() {
        let id = BookId::new();
        let parsed: BookId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn malformed_id_is_rejected() {
        let res: Result<UserId, _> = "not-a-uuid".parse();
        assert!(matches!(res, Err(AppError::ConvertToUuidError(_))));
    }
}
