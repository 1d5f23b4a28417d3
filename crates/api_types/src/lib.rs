use serde::{Deserialize, Serialize};

pub use money::{Balance, MoneyCents, MoneyError};

pub mod money;

pub mod account {
    use std::fmt;

    use super::*;

    /// Server-assigned account identifier.
    ///
    /// Treated as opaque by the client: it is only compared, displayed and
    /// put back into request paths.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AccountId(pub i64);

    impl fmt::Display for AccountId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Account {
        pub id: AccountId,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub balance: Balance,
        /// Raw server timestamp. Usually RFC3339, sometimes a bare date.
        #[serde(default)]
        pub created_at: Option<String>,
    }

    /// Request body for `POST /api/accounts/` and `PUT /api/accounts/{id}`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct AccountPayload {
        pub name: String,
        /// Serialized as a decimal string with two places (`"250.00"`).
        #[serde(with = "crate::money::decimal")]
        pub balance: MoneyCents,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub username: String,
        pub email: String,
        pub password: String,
        /// Confirmation, checked server-side against `password`.
        pub password2: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub username: String,
        #[serde(default)]
        pub email: Option<String>,
    }

    /// Returned by both login and register.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub user: UserView,
        pub refresh: String,
        pub access: String,
    }
}
