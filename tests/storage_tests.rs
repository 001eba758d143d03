//! Storage backend integration tests against throwaway SQLite stores.

mod common;

use chrono::{Duration, Utc};

use linkledger::errors::LedgerError;
use linkledger::storage::backend::{ClickFilter, ConversionFilter, LinkFilter};
use linkledger::storage::{
    ConversionStatus, LinkStatus, NewClick, NewConversion, NewLink, PayoutStatus,
};

#[tokio::test]
async fn partner_and_product_round_trip() {
    let (storage, _dir) = common::temp_storage().await;

    let partner = common::seed_partner(&storage, "Trailhead Gear", 1_200).await;
    assert!(partner.id > 0);
    assert_eq!(partner.commission_rate_bps, 1_200);

    let loaded = storage.get_partner(partner.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Trailhead Gear");

    let product = common::seed_product(&storage, partner.id, "Ridge Tent").await;
    let loaded = storage.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(loaded.partner_id, partner.id);
    assert_eq!(loaded.slug, "ridge-tent");
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let (storage, _dir) = common::temp_storage().await;
    let (partner, product, _link) = common::seed_funnel(&storage, "summer-sale").await;

    let err = storage
        .insert_link(NewLink {
            partner_id: partner.id,
            product_id: product.id,
            slug: "summer-sale".to_string(),
            destination_url: "https://shop.example.com/other".to_string(),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            status: LinkStatus::Active,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn slug_lookup_finds_exact_match_only() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "summer-sale").await;

    let found = storage.get_link_by_slug("summer-sale").await.unwrap();
    assert_eq!(found.map(|l| l.id), Some(link.id));

    assert!(storage.get_link_by_slug("summer").await.unwrap().is_none());
    assert!(
        storage
            .get_link_by_slug("SUMMER-SALE")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn repeated_request_id_returns_original_click() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;

    let new = NewClick {
        link_id: link.id,
        clicked_at: Utc::now(),
        referrer: Some("https://news.example.org".to_string()),
        conversion_value_minor: None,
        request_id: Some("req-abc-123".to_string()),
    };

    let first = storage.insert_click(new.clone()).await.unwrap();
    let second = storage.insert_click(new).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.referrer.as_deref(), Some("https://news.example.org"));

    let count = storage.count_clicks(&ClickFilter::default()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn clicks_without_request_id_always_append() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;

    for _ in 0..3 {
        storage
            .insert_click(NewClick {
                link_id: link.id,
                clicked_at: Utc::now(),
                referrer: None,
                conversion_value_minor: None,
                request_id: None,
            })
            .await
            .unwrap();
    }

    let filter = ClickFilter {
        link_id: Some(link.id),
        ..Default::default()
    };
    assert_eq!(storage.count_clicks(&filter).await.unwrap(), 3);
}

#[tokio::test]
async fn last_used_at_never_moves_backwards() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;
    assert!(link.last_used_at.is_none());

    let later = Utc::now();
    let earlier = later - Duration::minutes(10);

    storage.touch_last_used(link.id, later).await.unwrap();
    let loaded = storage.get_link(link.id).await.unwrap().unwrap();
    assert_eq!(loaded.last_used_at, Some(later));

    // an out-of-order click must not regress the marker
    storage.touch_last_used(link.id, earlier).await.unwrap();
    let loaded = storage.get_link(link.id).await.unwrap().unwrap();
    assert_eq!(loaded.last_used_at, Some(later));
}

async fn seed_conversion(
    storage: &linkledger::storage::SeaOrmStorage,
    link: &linkledger::storage::TrackedLink,
    amount_minor: i64,
) -> linkledger::storage::Conversion {
    storage
        .insert_conversion(NewConversion {
            link_id: link.id,
            partner_id: link.partner_id,
            product_id: link.product_id,
            product_name: "Ridge Tent".to_string(),
            product_category: "tents".to_string(),
            amount_minor,
            currency: "USD".to_string(),
            notes: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn conversion_lifecycle_walks_pending_confirmed_reversed() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;
    let conversion = seed_conversion(&storage, &link, 10_000).await;
    assert_eq!(conversion.status, ConversionStatus::Pending);
    assert_eq!(conversion.version, 0);

    let confirmed = storage
        .transition_conversion(conversion.id, ConversionStatus::Confirmed, Utc::now())
        .await
        .unwrap();
    assert_eq!(confirmed.status, ConversionStatus::Confirmed);
    assert_eq!(confirmed.version, 1);
    assert!(confirmed.confirmed_at.is_some());
    assert!(confirmed.reversed_at.is_none());

    // charge-back after confirmation is legal
    let reversed = storage
        .transition_conversion(conversion.id, ConversionStatus::Reversed, Utc::now())
        .await
        .unwrap();
    assert_eq!(reversed.status, ConversionStatus::Reversed);
    assert_eq!(reversed.version, 2);
    assert!(reversed.reversed_at.is_some());
}

#[tokio::test]
async fn reversal_is_terminal() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;
    let conversion = seed_conversion(&storage, &link, 5_000).await;

    storage
        .transition_conversion(conversion.id, ConversionStatus::Reversed, Utc::now())
        .await
        .unwrap();

    let err = storage
        .transition_conversion(conversion.id, ConversionStatus::Confirmed, Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::InvalidTransition(_)),
        "got {:?}",
        err
    );

    let loaded = storage.get_conversion(conversion.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ConversionStatus::Reversed);
}

#[tokio::test]
async fn repeated_transition_is_idempotent() {
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;
    let conversion = seed_conversion(&storage, &link, 5_000).await;

    let first = storage
        .transition_conversion(conversion.id, ConversionStatus::Confirmed, Utc::now())
        .await
        .unwrap();
    let second = storage
        .transition_conversion(conversion.id, ConversionStatus::Confirmed, Utc::now())
        .await
        .unwrap();

    assert_eq!(first.version, second.version);
    assert_eq!(first.confirmed_at, second.confirmed_at);
}

#[tokio::test]
async fn conversion_filters_narrow_listings() {
    let (storage, _dir) = common::temp_storage().await;
    let (partner, product, link) = common::seed_funnel(&storage, "promo").await;
    let other_link = common::seed_link(&storage, partner.id, product.id, "other").await;

    let a = seed_conversion(&storage, &link, 1_000).await;
    let _b = seed_conversion(&storage, &other_link, 2_000).await;
    storage
        .transition_conversion(a.id, ConversionStatus::Confirmed, Utc::now())
        .await
        .unwrap();

    let by_link = storage
        .list_conversions(
            &ConversionFilter {
                link_id: Some(link.id),
                ..Default::default()
            },
            100,
        )
        .await
        .unwrap();
    assert_eq!(by_link.len(), 1);
    assert_eq!(by_link[0].id, a.id);

    let confirmed_only = storage
        .list_conversions(
            &ConversionFilter {
                status: Some(ConversionStatus::Confirmed),
                ..Default::default()
            },
            100,
        )
        .await
        .unwrap();
    assert_eq!(confirmed_only.len(), 1);

    let all = storage
        .list_conversions(&ConversionFilter::default(), 100)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn payout_status_is_guarded_and_terminal() {
    let (storage, _dir) = common::temp_storage().await;
    let (partner, _, _) = common::seed_funnel(&storage, "promo").await;

    let payout = storage
        .insert_payout(linkledger::storage::NewPayout {
            partner_id: partner.id,
            period: "2025-07".to_string(),
            clicks: 10,
            conversions: 1,
            revenue_minor: 10_000,
            commission_minor: 1_500,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(payout.status, PayoutStatus::Pending);
    assert!(payout.settled_at.is_none());

    let paid = storage
        .set_payout_status(payout.id, PayoutStatus::Paid, Utc::now())
        .await
        .unwrap();
    assert_eq!(paid.status, PayoutStatus::Paid);
    assert!(paid.settled_at.is_some());

    // repeating the settled state succeeds without writing
    let again = storage
        .set_payout_status(payout.id, PayoutStatus::Paid, Utc::now())
        .await
        .unwrap();
    assert_eq!(again.settled_at, paid.settled_at);

    // but flipping a settled payout is rejected
    let err = storage
        .set_payout_status(payout.id, PayoutStatus::Cancelled, Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::InvalidTransition(_)),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn payout_details_editable_only_while_pending() {
    let (storage, _dir) = common::temp_storage().await;
    let (partner, _, _) = common::seed_funnel(&storage, "promo").await;

    let payout = storage
        .insert_payout(linkledger::storage::NewPayout {
            partner_id: partner.id,
            period: "2025-07".to_string(),
            clicks: 0,
            conversions: 0,
            revenue_minor: 0,
            commission_minor: 0,
            notes: None,
        })
        .await
        .unwrap();

    let edited = storage
        .update_payout_details(
            payout.id,
            Some("WIRE-42".to_string()),
            Some("July batch".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(edited.transaction_ref.as_deref(), Some("WIRE-42"));

    storage
        .set_payout_status(payout.id, PayoutStatus::Cancelled, Utc::now())
        .await
        .unwrap();

    let err = storage
        .update_payout_details(payout.id, Some("WIRE-43".to_string()), None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::InvalidTransition(_)),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn link_listing_paginates_and_filters() {
    let (storage, _dir) = common::temp_storage().await;
    let (partner, product, _) = common::seed_funnel(&storage, "promo-0").await;
    for i in 1..5 {
        common::seed_link(&storage, partner.id, product.id, &format!("promo-{}", i)).await;
    }

    let (page_one, total) = storage
        .list_links(&LinkFilter::default(), 1, 2)
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page_one.len(), 2);

    let (page_three, _) = storage
        .list_links(&LinkFilter::default(), 3, 2)
        .await
        .unwrap();
    assert_eq!(page_three.len(), 1);

    let (matches, total) = storage
        .list_links(
            &LinkFilter {
                search: Some("promo-3".to_string()),
                ..Default::default()
            },
            1,
            10,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(matches[0].slug, "promo-3");
}
