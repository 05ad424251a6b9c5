//! Account lifecycle and the "my quotes" list

use crate::models::{fields, Account, NewAccount, PROTECTED_FIELDS};
use crate::repository::AccountRepository;
use access_control::{self_or_admin, OwnershipVerifier, ResolvedAccount};
use error_types::ServiceError;
use record_store::{Filter, RecordId, Update};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Clone)]
pub struct AccountService {
    accounts: AccountRepository,
    ownership: OwnershipVerifier,
}

impl AccountService {
    pub fn new(accounts: AccountRepository, ownership: OwnershipVerifier) -> Self {
        Self {
            accounts,
            ownership,
        }
    }

    pub fn repository(&self) -> &AccountRepository {
        &self.accounts
    }

    pub async fn create(&self, body: NewAccount) -> Result<Account, ServiceError> {
        let document = body.into_document()?;
        let email = document
            .get(fields::EMAIL)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".into()));
        }

        let id = self.accounts.insert(document).await?;
        info!(account_id = %id, "Account created");
        self.get(id).await
    }

    pub async fn get(&self, id: RecordId) -> Result<Account, ServiceError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account not found"))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Account, ServiceError> {
        self.accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account not found"))
    }

    /// Set the given fields on `target`; caller must be the owner or an admin
    pub async fn update(
        &self,
        caller: &ResolvedAccount<Account>,
        target: RecordId,
        changes: Map<String, Value>,
    ) -> Result<Account, ServiceError> {
        self_or_admin(
            &caller.account_id.to_string(),
            &target.to_string(),
            caller.is_admin(),
        )
        .into_result("Only the account owner or an admin may update this account")?;

        if changes.is_empty() {
            return Err(ServiceError::BadInput("No fields to update".into()));
        }
        if let Some(field) = PROTECTED_FIELDS.iter().find(|f| changes.contains_key(**f)) {
            return Err(ServiceError::BadInput(format!("Field {field} cannot be updated")));
        }

        let current = self.get(target).await?;

        if let Some(email) = changes.get(fields::EMAIL) {
            let email = email
                .as_str()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| ServiceError::BadInput("email must be a non-empty string".into()))?;
            if email != current.email {
                if let Some(other) = self.accounts.find_by_email(email).await? {
                    if other.id != target {
                        return Err(ServiceError::Conflict("Email already exists".into()));
                    }
                }
            }
        }

        let update = changes
            .into_iter()
            .fold(Update::new(), |update, (field, value)| update.set(field, value));
        self.accounts.update(&Filter::by_id(target), &update).await?;

        info!(account_id = %target, by = %caller.account_id, "Account updated");
        self.get(target).await
    }

    pub async fn delete(
        &self,
        caller: &ResolvedAccount<Account>,
        target: RecordId,
    ) -> Result<(), ServiceError> {
        self_or_admin(
            &caller.account_id.to_string(),
            &target.to_string(),
            caller.is_admin(),
        )
        .into_result("Only the account owner or an admin may delete this account")?;

        if self.accounts.delete(target).await? == 0 {
            return Err(ServiceError::not_found("Account not found"));
        }
        info!(account_id = %target, by = %caller.account_id, "Account deleted");
        Ok(())
    }

    /// Add `quote_id` to the caller's own list after the quote service confirms the caller created it
    pub async fn insert_my_quote(
        &self,
        caller: &ResolvedAccount<Account>,
        user_id: RecordId,
        quote_id: RecordId,
        auth_header: &str,
    ) -> Result<Account, ServiceError> {
        if caller.account_id != user_id {
            return Err(ServiceError::forbidden(
                "Quotes can only be added to your own list",
            ));
        }

        self.ownership
            .require_ownership(&quote_id, &caller.account_id.to_string(), Some(auth_header))
            .await?;

        let update = Update::new().add_to_set(fields::MY_QUOTES, quote_id.to_string());
        self.accounts.update(&Filter::by_id(user_id), &update).await?;
        self.get(user_id).await
    }

    pub async fn remove_my_quote(
        &self,
        caller: &ResolvedAccount<Account>,
        user_id: RecordId,
        quote_id: RecordId,
    ) -> Result<Account, ServiceError> {
        self_or_admin(
            &caller.account_id.to_string(),
            &user_id.to_string(),
            caller.is_admin(),
        )
        .into_result("Only the account owner or an admin may edit this list")?;

        let update = Update::new().pull(fields::MY_QUOTES, quote_id.to_string());
        self.accounts.update(&Filter::by_id(user_id), &update).await?;
        self.get(user_id).await
    }
}
