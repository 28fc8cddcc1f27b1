//! End-to-end login pipeline tests over the in-memory backend:
//! external callback -> claims resolution -> user provisioning.

use gatehouse_identity::claims::types::{
    AuthProperties, AuthorizationContext, Claim, ExternalAuthResult, Principal, claim_types,
};
use gatehouse_identity::claims::{ClaimsResolver, find_claim};
use gatehouse_identity::config::AzureAdConfig;
use gatehouse_identity::directory::NoopDirectoryService;
use gatehouse_identity::provisioning::UserLoginManager;
use gatehouse_identity::storage::user::UserStore;
use gatehouse_store_memory::{DocumentUserStore, MemoryDocumentStore};
use time::OffsetDateTime;

fn external_login(claims: Vec<Claim>, scheme: &str) -> ExternalAuthResult {
    let mut properties = AuthProperties::new();
    properties.set_item("scheme", scheme);
    ExternalAuthResult {
        principal: Some(Principal::new(claims)),
        properties,
    }
}

#[tokio::test]
async fn test_external_login_provisions_user() {
    let resolver = ClaimsResolver::new(AzureAdConfig::default(), NoopDirectoryService);
    let manager = UserLoginManager::new(DocumentUserStore::new(MemoryDocumentStore::new()));

    let callback = external_login(
        vec![
            Claim::new(claim_types::SUBJECT, "u1"),
            Claim::new(claim_types::GIVEN_NAME, "Ann"),
        ],
        "corp",
    );
    let context = AuthorizationContext {
        client_id: "app1".to_string(),
    };

    let before = OffsetDateTime::now_utc();
    let resolved = resolver.resolve(&callback, Some(&context)).await.unwrap();

    let mut login_claims = resolved.claims.clone();
    login_claims.extend(resolved.additional_claims.clone());
    let user = manager
        .user_login(
            &resolved.provider,
            resolved.effective_user_id(),
            &login_claims,
            resolved.client_id.as_deref(),
        )
        .await
        .unwrap();

    assert_eq!(user.subject_id, "u1");
    assert_eq!(user.provider_name, "corp");
    assert_eq!(user.first_name.as_deref(), Some("Ann"));

    // A name claim is synthesized from the given name.
    let name = find_claim(&user.claims, claim_types::NAME).unwrap();
    assert_eq!(name.value, "Ann");
    assert_eq!(user.username.as_deref(), Some("Ann"));

    let last_login = user.last_login_date_for_client("app1").unwrap();
    assert!(last_login >= before);
    assert!(last_login <= OffsetDateTime::now_utc());
}

#[tokio::test]
async fn test_returning_login_updates_same_record() {
    let resolver = ClaimsResolver::new(AzureAdConfig::default(), NoopDirectoryService);
    let store = DocumentUserStore::new(MemoryDocumentStore::new());
    let manager = UserLoginManager::new(store.clone());
    let context = AuthorizationContext {
        client_id: "app1".to_string(),
    };

    for value in ["first@example.com", "second@example.com"] {
        let callback = external_login(
            vec![
                Claim::new(claim_types::SUBJECT, "u1"),
                Claim::new(claim_types::EMAIL, value),
            ],
            "corp",
        );
        let resolved = resolver.resolve(&callback, Some(&context)).await.unwrap();
        manager
            .user_login(
                &resolved.provider,
                resolved.effective_user_id(),
                &resolved.claims,
                resolved.client_id.as_deref(),
            )
            .await
            .unwrap();
    }

    let user = store.find_by_provider("corp", "u1").await.unwrap().unwrap();
    let email = find_claim(&user.claims, claim_types::EMAIL).unwrap();
    assert_eq!(email.value, "second@example.com");
    assert!(store.find_by_subject_id("u1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_concurrent_first_logins_yield_one_user() {
    let store = DocumentUserStore::new(MemoryDocumentStore::new());

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = UserLoginManager::new(store.clone());
        handles.push(tokio::spawn(async move {
            manager
                .user_login(
                    "corp",
                    "u1",
                    &[Claim::new(claim_types::GIVEN_NAME, format!("Ann{i}"))],
                    Some("app1"),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let users = store.find_by_subject_ids(&["u1".to_string()]).await.unwrap();
    assert_eq!(users.len(), 1);
}
