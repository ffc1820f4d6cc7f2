//! Identity snapshot handed over by the external login provider.
//!
//! The provider (wallet or email login) lives outside this crate; the web
//! client reads its state as JSON and we only interpret it here: whether the
//! shell may render, who the user is, and which linked account to show.

use serde::{Deserialize, Serialize};

/// Wallet client type the provider uses for the wallets it embeds itself.
pub const EMBEDDED_WALLET_CLIENT: &str = "privy";

/// Chain the embedded wallet is delegated on so the agent can sign for it.
pub const DELEGATED_CHAIN_TYPE: &str = "ethereum";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkedAccount {
    Email {
        address: String,
    },
    #[serde(rename_all = "camelCase")]
    Wallet {
        address: String,
        #[serde(default)]
        wallet_client_type: Option<String>,
        #[serde(default)]
        chain_type: Option<String>,
    },
    /// Social logins, phone numbers and the like. Not shown.
    #[serde(other)]
    Other,
}

impl LinkedAccount {
    fn is_embedded_wallet(&self) -> bool {
        matches!(
            self,
            Self::Wallet { wallet_client_type: Some(client), .. } if client == EMBEDDED_WALLET_CLIENT
        )
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

/// Arguments for the provider's `delegateWallet` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDelegation {
    pub address: String,
    pub chain_type: String,
}

/// What the sidebar shows under "Connected Account".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectedAccount {
    Email(String),
    Wallet(String),
    None,
}

impl IdentityUser {
    pub fn email(&self) -> Option<&str> {
        self.linked_accounts.iter().find_map(|account| match account {
            LinkedAccount::Email { address } => Some(address.as_str()),
            _ => None,
        })
    }

    /// A wallet the user brought (anything the provider did not embed).
    pub fn external_wallet(&self) -> Option<&str> {
        self.linked_accounts.iter().find_map(|account| match account {
            LinkedAccount::Wallet { address, .. } if !account.is_embedded_wallet() => {
                Some(address.as_str())
            }
            _ => None,
        })
    }

    pub fn embedded_wallet(&self) -> Option<&str> {
        self.linked_accounts.iter().find_map(|account| match account {
            LinkedAccount::Wallet { address, .. } if account.is_embedded_wallet() => {
                Some(address.as_str())
            }
            _ => None,
        })
    }

    /// The embedded wallet has to be delegated before the agent can act
    /// on-chain. Users without one skip delegation.
    pub fn wallet_delegation(&self) -> Option<WalletDelegation> {
        self.embedded_wallet().map(|address| WalletDelegation {
            address: address.to_string(),
            chain_type: DELEGATED_CHAIN_TYPE.to_string(),
        })
    }

    /// Email wins over an external wallet.
    pub fn connected_account(&self) -> ConnectedAccount {
        if let Some(email) = self.email() {
            ConnectedAccount::Email(email.to_string())
        } else if let Some(wallet) = self.external_wallet() {
            ConnectedAccount::Wallet(wallet.to_string())
        } else {
            ConnectedAccount::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Provider has not finished initialising.
    #[default]
    Loading,
    /// Provider is ready, nobody is logged in.
    Unauthenticated,
    Authenticated(IdentityUser),
}

impl AuthState {
    /// Interpret the provider's `ready`/`authenticated` flags.
    ///
    /// An authenticated session without a user record is treated as still
    /// loading; the provider fills the user in shortly after.
    pub fn from_provider(ready: bool, authenticated: bool, user: Option<IdentityUser>) -> Self {
        match (ready, authenticated, user) {
            (false, _, _) => Self::Loading,
            (true, false, _) => Self::Unauthenticated,
            (true, true, Some(user)) => Self::Authenticated(user),
            (true, true, None) => Self::Loading,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&IdentityUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|user| user.id.as_str())
    }
}
