// Profile registry — registration, profile edits, and model lookup.
//
// Owns the `user` collection. Model accounts carry the payment contact
// fields buyers see when quoting a purchase; subscriber accounts leave
// them unset.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fangate_core::db::backend::{from_record, to_record, Filter, Query, SortBy, SortDirection};
use fangate_core::db::schema::USER_COLLECTION;
use fangate_core::utils::generate_id;
use fangate_core::{ErrorCode, MarketError, Result, Role, StorageBackend, User};

/// Input for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Subscription price for model accounts; the configured default
    /// applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NewUser {
    /// A new creator account.
    pub fn model(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Model,
            monthly_price: None,
            phone: None,
        }
    }

    /// A new subscriber account.
    pub fn subscriber(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::User,
            monthly_price: None,
            phone: None,
        }
    }

    pub fn monthly_price(mut self, price: i64) -> Self {
        self.monthly_price = Some(price);
        self
    }
}

/// Partial profile update. Only provided fields change; `id` and `role`
/// are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mercado_pago_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<i64>,
}

/// Store for account records.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    backend: Arc<dyn StorageBackend>,
    default_monthly_price: i64,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn StorageBackend>, default_monthly_price: i64) -> Self {
        Self {
            backend,
            default_monthly_price,
        }
    }

    /// Register a new account at `now`.
    ///
    /// Emails are normalized to lowercase and must be unique across all
    /// accounts. Model accounts registered without a price get the
    /// configured default.
    pub async fn register(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User> {
        let name = new_user.name.trim();
        if name.is_empty() {
            return Err(MarketError::Validation(ErrorCode::NameRequired));
        }
        let email = new_user.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(MarketError::Validation(ErrorCode::EmailRequired));
        }

        let existing = self
            .backend
            .find_one(USER_COLLECTION, &[Filter::eq("email", email.as_str())])
            .await?;
        if existing.is_some() {
            return Err(MarketError::Conflict(ErrorCode::EmailAlreadyRegistered));
        }

        let price = new_user.monthly_price.unwrap_or(self.default_monthly_price);
        let mut user = User::new(
            generate_id(),
            name.to_string(),
            email,
            new_user.role,
            price,
            now,
        );
        user.phone = new_user.phone;

        let created = self
            .backend
            .create(USER_COLLECTION, to_record(&user)?)
            .await?;
        from_record(created)
    }

    /// Apply a partial profile update.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User> {
        if self.find(id).await?.is_none() {
            return Err(MarketError::NotFound(ErrorCode::UserNotFound));
        }

        let mut patch = serde_json::Map::new();

        if let Some(name) = &update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(MarketError::Validation(ErrorCode::NameRequired));
            }
            patch.insert("name".into(), Value::String(name.to_string()));
        }

        if let Some(email) = &update.email {
            let email = email.trim().to_lowercase();
            if email.is_empty() {
                return Err(MarketError::Validation(ErrorCode::EmailRequired));
            }
            // Some other account already holding this address is a conflict;
            // the account's own current address is not.
            let taken = self
                .backend
                .find_one(
                    USER_COLLECTION,
                    &[Filter::eq("email", email.as_str()), Filter::ne("id", id)],
                )
                .await?;
            if taken.is_some() {
                return Err(MarketError::Conflict(ErrorCode::EmailAlreadyRegistered));
            }
            patch.insert("email".into(), Value::String(email));
        }

        if let Some(phone) = update.phone {
            patch.insert("phone".into(), Value::String(phone));
        }
        if let Some(profile_image) = update.profile_image {
            patch.insert("profileImage".into(), Value::String(profile_image));
        }
        if let Some(description) = update.description {
            patch.insert("description".into(), Value::String(description));
        }
        if let Some(pix_key) = update.pix_key {
            patch.insert("pixKey".into(), Value::String(pix_key));
        }
        if let Some(mercado_pago_email) = update.mercado_pago_email {
            patch.insert("mercadoPagoEmail".into(), Value::String(mercado_pago_email));
        }
        if let Some(contact_number) = update.contact_number {
            patch.insert("contactNumber".into(), Value::String(contact_number));
        }
        if let Some(monthly_price) = update.monthly_price {
            patch.insert("monthlyPrice".into(), Value::from(monthly_price));
        }

        let updated = self
            .backend
            .update(
                USER_COLLECTION,
                &[Filter::eq("id", id)],
                Value::Object(patch),
            )
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::UserNotFound))?;
        from_record(updated)
    }

    /// Look up an account by id.
    pub async fn find(&self, id: &str) -> Result<Option<User>> {
        let record = self
            .backend
            .find_one(USER_COLLECTION, &[Filter::eq("id", id)])
            .await?;
        record.map(from_record).transpose()
    }

    /// Look up an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let record = self
            .backend
            .find_one(USER_COLLECTION, &[Filter::eq("email", email.as_str())])
            .await?;
        record.map(from_record).transpose()
    }

    /// All model accounts, sorted by name.
    pub async fn list_models(&self) -> Result<Vec<User>> {
        let records = self
            .backend
            .find_many(
                USER_COLLECTION,
                Query {
                    filters: vec![Filter::eq("role", Role::Model.as_str())],
                    sort_by: Some(SortBy {
                        field: "name".into(),
                        direction: SortDirection::Asc,
                    }),
                    ..Default::default()
                },
            )
            .await?;
        records.into_iter().map(from_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangate_memory::MemoryBackend;

    fn store() -> ProfileStore {
        ProfileStore::new(Arc::new(MemoryBackend::new()), 30)
    }

    #[tokio::test]
    async fn test_register_applies_defaults() {
        let store = store();
        let now = Utc::now();
        let user = store
            .register(NewUser::model("Ana", "  Ana@Example.COM "), now)
            .await
            .unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::Model);
        assert_eq!(user.monthly_price, 30);
        assert_eq!(user.created_at, now);
        assert!(user.pix_key.is_none());
    }

    #[tokio::test]
    async fn test_register_keeps_explicit_price() {
        let store = store();
        let user = store
            .register(
                NewUser::model("Bia", "bia@example.com").monthly_price(75),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(user.monthly_price, 75);
    }

    #[tokio::test]
    async fn test_register_validates_inputs() {
        let store = store();
        let err = store
            .register(NewUser::model("   ", "ana@example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(ErrorCode::NameRequired)));

        let err = store
            .register(NewUser::model("Ana", ""), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(ErrorCode::EmailRequired)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitive() {
        let store = store();
        store
            .register(NewUser::model("Ana", "ana@example.com"), Utc::now())
            .await
            .unwrap();

        let err = store
            .register(NewUser::subscriber("Impostor", "ANA@example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Conflict(ErrorCode::EmailAlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn test_update_merges_only_provided_fields() {
        let store = store();
        let user = store
            .register(NewUser::model("Ana", "ana@example.com"), Utc::now())
            .await
            .unwrap();

        let updated = store
            .update_profile(
                &user.id,
                ProfileUpdate {
                    description: Some("Travel and lifestyle".into()),
                    pix_key: Some("ana-pix".into()),
                    monthly_price: Some(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.email, "ana@example.com");
        assert_eq!(updated.description.as_deref(), Some("Travel and lifestyle"));
        assert_eq!(updated.pix_key.as_deref(), Some("ana-pix"));
        assert_eq!(updated.monthly_price, 50);
        assert_eq!(updated.role, Role::Model);
    }

    #[tokio::test]
    async fn test_update_unknown_id_not_found() {
        let store = store();
        let err = store
            .update_profile("missing", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound(ErrorCode::UserNotFound)));
    }

    #[tokio::test]
    async fn test_email_change_checks_uniqueness() {
        let store = store();
        let ana = store
            .register(NewUser::model("Ana", "ana@example.com"), Utc::now())
            .await
            .unwrap();
        store
            .register(NewUser::subscriber("Bia", "bia@example.com"), Utc::now())
            .await
            .unwrap();

        let err = store
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    email: Some("bia@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Conflict(ErrorCode::EmailAlreadyRegistered)
        ));

        // Re-submitting the account's own address is allowed.
        let updated = store
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    email: Some("Ana@Example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes() {
        let store = store();
        store
            .register(NewUser::model("Ana", "ana@example.com"), Utc::now())
            .await
            .unwrap();

        let found = store.find_by_email(" ANA@EXAMPLE.COM ").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_models_sorted_by_name() {
        let store = store();
        for (name, email) in [
            ("Carla", "carla@example.com"),
            ("Ana", "ana@example.com"),
            ("Bia", "bia@example.com"),
        ] {
            store
                .register(NewUser::model(name, email), Utc::now())
                .await
                .unwrap();
        }
        store
            .register(NewUser::subscriber("Zeca", "zeca@example.com"), Utc::now())
            .await
            .unwrap();

        let models = store.list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bia", "Carla"]);
    }
}
