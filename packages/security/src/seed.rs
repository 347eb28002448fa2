// ABOUTME: Default accounts created on first start
// ABOUTME: One account per role, inserted only when the email is not yet registered

use tracing::info;

use crate::error::SecurityResult;
use crate::roles::Role;
use crate::users::{UserCreateInput, UserStorage};

pub struct SeedAccount {
    pub email: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub role: Role,
}

pub const DEFAULT_ACCOUNTS: [SeedAccount; 3] = [
    SeedAccount {
        email: "admin@plankit.com",
        username: "Admin User",
        password: "admin123",
        role: Role::Admin,
    },
    SeedAccount {
        email: "editor@plankit.com",
        username: "Editor User",
        password: "editor123",
        role: Role::Editor,
    },
    SeedAccount {
        email: "viewer@plankit.com",
        username: "Viewer User",
        password: "viewer123",
        role: Role::Viewer,
    },
];

/// Insert the default accounts that are missing. Returns how many were created.
pub async fn seed_default_users(users: &UserStorage) -> SecurityResult<usize> {
    let mut created = 0;

    for account in &DEFAULT_ACCOUNTS {
        if users.find_by_email(account.email).await?.is_some() {
            continue;
        }

        users
            .create_user(UserCreateInput {
                email: account.email.to_string(),
                username: account.username.to_string(),
                password: account.password.to_string(),
                role: account.role.as_str().to_string(),
            })
            .await?;
        info!("Seeded {} account {}", account.role, account.email);
        created += 1;
    }

    Ok(created)
}
