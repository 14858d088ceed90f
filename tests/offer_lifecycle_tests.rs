mod common;

use fightcard::db::{bout_repo, notification_repo, offer_repo, payment_repo};
use fightcard::models::{Decision, Notification, Side};
use fightcard::services::settlement_sweeper::{sweep_refunds, sweep_transfers};
use fightcard::workflow::{CreateOfferOutcome, WorkflowError};
use uuid::Uuid;

fn of_type<'a>(notifications: &'a [Notification], ty: &str) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| n.notification_type == ty)
        .collect()
}

#[tokio::test]
async fn test_free_offer_end_to_end_accept() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "Coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", Some("Kings MMA")).await;
    let fan_a = common::seed_profile(&pool, "fan_a", "fighter", None).await;
    let fan_b = common::seed_profile(&pool, "fan_b", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Fight Night 12").await;
    common::seed_follower(&pool, event.id, fan_a.id).await;
    common::seed_follower(&pool, event.id, fan_b.id).await;
    let bout = common::seed_bout(&pool, event.id, None).await;

    // Coach proposes the fighter for the red corner; no fee configured.
    let outcome = ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .expect("offer creation should succeed");

    let offer = match outcome {
        CreateOfferOutcome::Created { offer, payment } => {
            assert!(payment.is_none(), "free bout must not create a payment");
            offer
        }
        other => panic!("expected a created offer, got {other:?}"),
    };
    assert_eq!(offer.status, "pending");
    assert_eq!(gateway.checkout_calls(), 0);

    // Event owner was told about the incoming offer.
    let owner_notifs = notification_repo::list_for_recipient(&pool, owner.id)
        .await
        .unwrap();
    let bout_offers = of_type(&owner_notifs, "bout_offer");
    assert_eq!(bout_offers.len(), 1);
    assert_eq!(bout_offers[0].data["bout_id"], serde_json::json!(bout.id));
    assert_eq!(bout_offers[0].data["side"], "red");

    // Organizer accepts.
    let accepted = ledger
        .resolve_offer(offer.id, Decision::Accept, owner.id)
        .await
        .expect("accept should succeed");
    assert_eq!(accepted.status, "accepted");

    // Roster mutated: red slot holds the fighter, flag cleared.
    let bout = bout_repo::get_bout(&pool, bout.id).await.unwrap().unwrap();
    assert_eq!(bout.red_fighter_id, Some(fighter.id));
    assert_eq!(bout.red_name.as_deref(), Some("fighter"));
    assert!(!bout.red_seeking_opponent);

    // Three notification classes: fighter, sender, and every follower.
    let fighter_notifs = notification_repo::list_for_recipient(&pool, fighter.id)
        .await
        .unwrap();
    assert_eq!(of_type(&fighter_notifs, "bout_assigned").len(), 1);

    let coach_notifs = notification_repo::list_for_recipient(&pool, coach.id)
        .await
        .unwrap();
    assert_eq!(of_type(&coach_notifs, "offer_accepted").len(), 1);

    for fan in [&fan_a, &fan_b] {
        let notifs = notification_repo::list_for_recipient(&pool, fan.id)
            .await
            .unwrap();
        assert_eq!(
            of_type(&notifs, "event_bout_matched").len(),
            1,
            "each follower gets exactly one broadcast"
        );
    }
}

#[tokio::test]
async fn test_only_coach_or_gym_may_send_offers() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "Fighter", None).await;
    let candidate = common::seed_profile(&pool, "candidate", "fighter", None).await;
    let gym = common::seed_profile(&pool, "gym", "  GYM ", None).await;

    let event = common::seed_event(&pool, owner.id, "Contenders").await;
    let bout = common::seed_bout(&pool, event.id, None).await;

    // A fighter profile cannot send offers.
    let err = ledger
        .create_offer(bout.id, Side::Red, fighter.id, candidate.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)), "got {err:?}");

    // Role comparison is case-insensitive: "  GYM " may send.
    let outcome = ledger
        .create_offer(bout.id, Side::Red, gym.id, candidate.id)
        .await
        .expect("gym role should be allowed regardless of case");
    assert!(matches!(outcome, CreateOfferOutcome::Created { .. }));
}

#[tokio::test]
async fn test_duplicate_offer_is_conflict() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let rival_coach = common::seed_profile(&pool, "rival", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Duplicate Night").await;
    let bout = common::seed_bout(&pool, event.id, None).await;

    ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .expect("first offer should succeed");

    // Same triple again, even from a different sender.
    let err = ledger
        .create_offer(bout.id, Side::Red, rival_coach.id, fighter.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict(_)), "got {err:?}");

    // Same fighter on the other side is a different triple and fine.
    ledger
        .create_offer(bout.id, Side::Blue, coach.id, fighter.id)
        .await
        .expect("other corner is a distinct triple");
}

#[tokio::test]
async fn test_terminal_offer_is_immutable() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Terminal Night").await;
    let bout = common::seed_bout(&pool, event.id, Some(1000)).await;

    let offer = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };

    ledger
        .resolve_offer(offer.id, Decision::Decline, owner.id)
        .await
        .expect("decline should succeed");
    assert_eq!(gateway.refund_calls(), 1);

    // A retried resolution of either kind fails and has no side effects.
    for decision in [Decision::Decline, Decision::Accept] {
        let err = ledger
            .resolve_offer(offer.id, decision, owner.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)), "got {err:?}");
    }
    assert_eq!(gateway.refund_calls(), 1, "retry must not refund again");

    let bout = bout_repo::get_bout(&pool, bout.id).await.unwrap().unwrap();
    assert_eq!(bout.red_fighter_id, None, "declined offer never touches the roster");
}

#[tokio::test]
async fn test_decline_with_refund() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Refund Night").await;
    let bout = common::seed_bout(&pool, event.id, Some(1000)).await;

    let (offer, payment) = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, payment } => (offer, payment.unwrap()),
        other => panic!("expected created offer, got {other:?}"),
    };
    assert_eq!(payment.amount_paid, 1000);
    assert_eq!(payment.platform_fee, 0);
    assert_eq!(gateway.checkout_calls(), 1);

    let declined = ledger
        .resolve_offer(offer.id, Decision::Decline, owner.id)
        .await
        .expect("decline should succeed");
    assert_eq!(declined.status, "declined");
    assert_eq!(gateway.refund_calls(), 1);

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_refunded());
    assert_eq!(payment.platform_fee, 0, "declines never earn a commission");

    let coach_notifs = notification_repo::list_for_recipient(&pool, coach.id)
        .await
        .unwrap();
    let declined_notifs = of_type(&coach_notifs, "offer_declined");
    assert_eq!(declined_notifs.len(), 1);
    assert_eq!(declined_notifs[0].data["refund_amount"], 1000);
    assert_eq!(declined_notifs[0].data["refunded"], true);
}

#[tokio::test]
async fn test_decline_survives_refund_failure_and_sweeper_settles() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Outage Night").await;
    let bout = common::seed_bout(&pool, event.id, Some(2500)).await;

    let offer = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };

    // Refund plumbing is down; the decline must still succeed.
    gateway.set_fail_refund(true);
    let declined = ledger
        .resolve_offer(offer.id, Decision::Decline, owner.id)
        .await
        .expect("decline succeeds even when the refund fails");
    assert_eq!(declined.status, "declined");

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!payment.is_refunded());

    let coach_notifs = notification_repo::list_for_recipient(&pool, coach.id)
        .await
        .unwrap();
    let declined_notifs = of_type(&coach_notifs, "offer_declined");
    assert_eq!(declined_notifs[0].data["refunded"], false);

    // Gateway recovers; the sweeper settles the refund.
    gateway.set_fail_refund(false);
    sweep_refunds(&pool, gateway.as_ref()).await;

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_refunded());

    // Settled rows are not picked up again.
    sweep_refunds(&pool, gateway.as_ref()).await;
    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_refunded());
}

#[tokio::test]
async fn test_fee_lifecycle_commission_set_once() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Commission Night").await;
    let bout = common::seed_bout(&pool, event.id, Some(5000)).await;

    let (offer, payment) = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, payment } => (offer, payment.unwrap()),
        other => panic!("expected created offer, got {other:?}"),
    };
    assert_eq!(payment.amount_paid, 5000);
    assert_eq!(payment.platform_fee, 0);

    ledger
        .resolve_offer(offer.id, Decision::Accept, owner.id)
        .await
        .expect("accept should succeed");

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.platform_fee, 250, "5% of 5000");
    assert!(payment.is_transferred());
    assert_eq!(gateway.transfer_calls(), 1);

    // The fee is set at most once, even if settlement logic runs again.
    let changed = payment_repo::set_platform_fee(&pool, payment.id, 9999)
        .await
        .unwrap();
    assert!(!changed);
    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.platform_fee, 250);
}

#[tokio::test]
async fn test_accept_survives_transfer_failure_and_sweeper_settles() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Transfer Outage").await;
    let bout = common::seed_bout(&pool, event.id, Some(4000)).await;

    let offer = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };

    gateway.set_fail_transfer(true);
    let accepted = ledger
        .resolve_offer(offer.id, Decision::Accept, owner.id)
        .await
        .expect("accept must not fail over commission plumbing");
    assert_eq!(accepted.status, "accepted");

    let bout_row = bout_repo::get_bout(&pool, bout.id).await.unwrap().unwrap();
    assert_eq!(bout_row.red_fighter_id, Some(fighter.id));

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.platform_fee, 200, "5% of 4000, committed with the accept");
    assert!(!payment.is_transferred());

    gateway.set_fail_transfer(false);
    sweep_transfers(&pool, gateway.as_ref(), "platform").await;

    let payment = payment_repo::get_by_offer(&pool, offer.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_transferred());
}

#[tokio::test]
async fn test_checkout_failure_writes_nothing() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Gateway Down").await;
    let bout = common::seed_bout(&pool, event.id, Some(1000)).await;

    gateway.set_fail_checkout(true);
    let err = ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Payment(_)), "got {err:?}");

    let offers = offer_repo::list_offers_for_bout(&pool, bout.id).await.unwrap();
    assert!(offers.is_empty(), "no offer row without a confirmed payment");
}

#[tokio::test]
async fn test_second_accept_for_same_side_conflicts() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter_a = common::seed_profile(&pool, "fighter_a", "fighter", None).await;
    let fighter_b = common::seed_profile(&pool, "fighter_b", "fighter", None).await;

    let event = common::seed_event(&pool, owner.id, "Race Night").await;
    let bout = common::seed_bout(&pool, event.id, None).await;

    let offer_a = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter_a.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };
    let offer_b = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter_b.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };

    ledger
        .resolve_offer(offer_a.id, Decision::Accept, owner.id)
        .await
        .expect("first accept wins the slot");

    // The slot is taken; the second accept must not overwrite it.
    let err = ledger
        .resolve_offer(offer_b.id, Decision::Accept, owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict(_)), "got {err:?}");

    let bout_row = bout_repo::get_bout(&pool, bout.id).await.unwrap().unwrap();
    assert_eq!(bout_row.red_fighter_id, Some(fighter_a.id));

    // The losing offer rolled back to pending and can still be declined.
    let offer_b = offer_repo::get_offer(&pool, offer_b.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer_b.status, "pending");
}

#[tokio::test]
async fn test_resolve_requires_event_owner() {
    let pool = common::setup_test_db().await;
    let gateway = common::MockGateway::new();
    let ledger = common::build_ledger(&pool, gateway.clone());

    let owner = common::seed_profile(&pool, "owner", "promotion", None).await;
    let coach = common::seed_profile(&pool, "coach", "coach", None).await;
    let fighter = common::seed_profile(&pool, "fighter", "fighter", None).await;
    let stranger = common::seed_profile(&pool, "stranger", "promotion", None).await;

    let event = common::seed_event(&pool, owner.id, "Authz Night").await;
    let bout = common::seed_bout(&pool, event.id, None).await;

    let offer = match ledger
        .create_offer(bout.id, Side::Red, coach.id, fighter.id)
        .await
        .unwrap()
    {
        CreateOfferOutcome::Created { offer, .. } => offer,
        other => panic!("expected created offer, got {other:?}"),
    };

    let err = ledger
        .resolve_offer(offer.id, Decision::Accept, stranger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)), "got {err:?}");

    let err = ledger
        .resolve_offer(Uuid::new_v4(), Decision::Accept, owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)), "got {err:?}");
}
