//! Integration property tests for usecase-core.
//!
//! These tests validate cross-module invariants and end-to-end flows
//! using property-based testing.

use std::sync::Arc;

use proptest::prelude::*;
use usecase_core::{
    audit::AuditTrail, Command, Ctx, EntityStore, FanoutNotifier, FieldValue, Fields, NewRecord,
    Notification, Notifier, NotifyError, Principal, RecordId, RecordKind, RequestHandler,
    RequestMeta, ResultCode, Role, Rule, ScriptedDependency, Secret, SessionGate, ValidationRules,
    Validator,
};

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Tourist),
        Just(Role::AgencyOperator),
        Just(Role::Administrator),
    ]
}

fn arb_principal() -> impl Strategy<Value = Principal> {
    (
        prop::string::string_regex("[a-z0-9-]{3,10}").unwrap(),
        prop::string::string_regex("[A-Za-z ]{3,15}").unwrap(),
        arb_role(),
    )
        .prop_map(|(id, name, role)| Principal::new(id, name, role))
}

fn arb_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![
        Just(RecordKind::Site),
        Just(RecordKind::RefreshmentPoint),
        Just(RecordKind::Banner),
        Just(RecordKind::News),
    ]
}

#[derive(Default)]
struct Captured(parking_lot::Mutex<Vec<Notification>>);

impl Notifier for Captured {
    fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        self.0.lock().push(n.clone());
        Ok(())
    }
}

fn tourist(id: &str) -> Ctx {
    SessionGate::new(RequestMeta::for_principal(
        "req-p",
        Principal::new(id, id, Role::Tourist),
    ))
    .build()
    .unwrap()
}

proptest! {
    /// Property: a guest never gets past the gate when a requirement is set,
    /// and an authenticated principal always does for `Authenticated`.
    #[test]
    fn proptest_gate_requires_principal(
        request_id in prop::string::string_regex("[a-z0-9-]{5,20}").unwrap(),
        principal in prop::option::of(arb_principal()),
    ) {
        let meta = RequestMeta {
            request_id,
            principal: principal.clone(),
        };

        let result = SessionGate::new(meta).require(usecase_core::Authenticated).build();

        match (principal, result) {
            (Some(p), Ok(ctx)) => prop_assert_eq!(ctx.principal(), Some(&p)),
            (None, Err(_)) => {}
            (Some(_), Err(v)) => {
                return Err(TestCaseError::fail(format!("principal rejected: {v}")));
            }
            (None, Ok(_)) => {
                return Err(TestCaseError::fail(
                    "Build succeeded without principal - authentication invariant violated"
                ));
            }
        }
    }

    /// Property: votes are accepted exactly inside the configured range.
    #[test]
    fn proptest_vote_range(vote in -20i64..20) {
        let rules = ValidationRules::default();
        let command = Command::SubmitFeedback {
            tourist_id: "t1".into(),
            site_id: "s1".into(),
            vote,
            comment: String::new(),
        };

        let result = command.validator(&rules).validate(&command.payload());

        prop_assert_eq!(result.is_valid(), (rules.vote_min..=rules.vote_max).contains(&vote));
        prop_assert_eq!(result.mentions("vote"), !result.is_valid());
    }

    /// Property: blank or missing required fields always fail, naming the field.
    #[test]
    fn proptest_required_rejects_blank(
        field in "[a-z_]{1,12}",
        blank in "[ \\t]{0,6}",
        present in any::<bool>(),
    ) {
        let validator = Validator::new().rule(field.as_str(), Rule::Required);
        let mut fields = Fields::new();
        if present {
            fields.insert(field.clone(), FieldValue::from(blank));
        }

        let result = validator.validate(&fields);

        prop_assert!(!result.is_valid());
        prop_assert!(result.mentions(&field));
    }

    /// Property: created records are found by id with the stored fields.
    #[test]
    fn proptest_create_then_find(
        kind in arb_kind(),
        owner in "[a-z0-9]{1,8}",
        values in prop::collection::btree_map("[a-z]{1,6}", "[A-Za-z0-9 ]{0,12}", 0..5),
    ) {
        let store = EntityStore::new();
        let mut draft = NewRecord::new(kind, owner.clone());
        for (name, value) in &values {
            draft = draft.with_field(name.clone(), value.clone());
        }

        let id = store.create(draft).unwrap();
        let record = store.find_by_id(&id).unwrap();

        prop_assert_eq!(record.kind(), kind);
        prop_assert_eq!(record.owner_id(), owner.as_str());
        prop_assert!(record.is_active());
        for (name, value) in &values {
            prop_assert_eq!(record.text(name), Some(value.as_str()));
        }
    }

    /// Property: ids that were never issued are NOT_FOUND for every operation.
    #[test]
    fn proptest_unknown_id_not_found(bytes in any::<u128>()) {
        let store = EntityStore::new();
        store.create(NewRecord::new(RecordKind::News, "root")).unwrap();
        let raw = format!("{:032x}", bytes);
        let id = RecordId::parse(&raw).unwrap();
        prop_assume!(store.find_by_id(&id).is_err());

        prop_assert_eq!(store.delete(&id).code(), ResultCode::NotFound);
        prop_assert_eq!(store.update(&id, |_| {}).code(), ResultCode::NotFound);
        prop_assert_eq!(store.len(), 1);
    }

    /// Property: a failing dependency never changes the store.
    #[test]
    fn proptest_dependency_failure_is_atomic(script in prop::collection::vec(any::<bool>(), 1..8)) {
        let store = Arc::new(EntityStore::new());
        let handler = RequestHandler::builder(Arc::clone(&store))
            .dependency(ScriptedDependency::new(script.clone()))
            .build();
        let ctx = tourist("t1");

        for (i, ok) in script.iter().enumerate() {
            let before = store.len();
            let outcome = handler.handle(
                &ctx,
                Command::AddPreferredSite {
                    tourist_id: "t1".into(),
                    site_id: format!("s{i}"),
                },
            );

            if *ok {
                prop_assert!(outcome.is_success());
                prop_assert_eq!(store.len(), before + 1);
            } else {
                prop_assert_eq!(outcome.code(), ResultCode::ConnectionError);
                prop_assert_eq!(store.len(), before);
            }
        }
    }

    /// Property: registration never stores or logs the clear-text password.
    #[test]
    fn proptest_password_never_stored(password in "[A-Za-z0-9]{8,24}") {
        let store = Arc::new(EntityStore::new());
        let handler = RequestHandler::builder(Arc::clone(&store)).build();
        let guest = SessionGate::new(RequestMeta::guest("req-pw")).build().unwrap();

        let outcome = handler.handle(
            &guest,
            Command::RegisterTourist {
                name: "Ada".into(),
                surname: "Lovelace".into(),
                email: "ada@example.com".into(),
                password: Secret::new(password.clone()),
            },
        );

        prop_assert!(outcome.is_success());
        prop_assert!(!outcome.to_string().contains(&password));
        let record = store.find_by_id(&outcome.record_id().unwrap()).unwrap();
        prop_assert!(record.fields().values().all(|v| v.as_text() != Some(password.as_str())));
    }

    /// Property: the password never reaches notifications or audit events.
    #[test]
    fn proptest_password_never_reaches_audit(
        request_id in prop::string::string_regex("[a-z0-9-]{5,20}").unwrap(),
        password in prop::string::string_regex("[A-Z]{4}[A-Z0-9]{6,16}").unwrap(),
        email_ok in any::<bool>(),
    ) {
        let trail = Arc::new(AuditTrail::new());
        let captured = Arc::new(Captured::default());
        let handler = RequestHandler::builder(Arc::new(EntityStore::new()))
            .notifier(
                FanoutNotifier::new()
                    .with(Arc::clone(&trail))
                    .with(Arc::clone(&captured)),
            )
            .build();
        let guest = SessionGate::new(RequestMeta::guest(request_id.clone())).build().unwrap();
        let email = if email_ok { "ada@example.com" } else { "ada-at-example" };

        handler.handle(
            &guest,
            Command::RegisterTourist {
                name: "Ada".into(),
                surname: "Lovelace".into(),
                email: email.into(),
                password: Secret::new(password.clone()),
            },
        );

        let events = trail.events();
        prop_assert_eq!(events.len(), 1);
        for event in &events {
            let event_display = format!("{}", event);
            let event_debug = format!("{:?}", event);
            prop_assert!(!event_display.contains(&password));
            prop_assert!(!event_debug.contains(&password));
            prop_assert!(event_display.contains(&request_id));
        }
        for notification in captured.0.lock().iter() {
            let notification_display = format!("{}", notification);
            let notification_debug = format!("{:?}", notification);
            prop_assert!(!notification_display.contains(&password));
            prop_assert!(!notification_debug.contains(&password));
        }
    }
}
