//! Conversions between SeaORM models and domain records
//!
//! Statuses are stored as lowercase strings; an unknown value in the
//! store is a serialization error, not a panic.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::errors::{LedgerError, Result};
use crate::storage::models::{
    ClickEvent, Conversion, ConversionStatus, NewClick, NewConversion, NewLink, NewPartner,
    NewPayout, NewProduct, Partner, Payout, PayoutStatus, Product, TrackedLink,
};
use migration::entities::{click_event, conversion, partner, payout, product, tracked_link};

fn parse_status<T: std::str::FromStr>(raw: &str, entity: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        LedgerError::serialization(format!("Unknown {} status in store: {}", entity, raw))
    })
}

// ============ Partner ============

pub fn model_to_partner(model: partner::Model) -> Result<Partner> {
    Ok(Partner {
        id: model.id,
        name: model.name,
        category: model.category,
        commission_rate_bps: model.commission_rate_bps,
        commission_terms: model.commission_terms,
        destination_url: model.destination_url,
        status: parse_status(&model.status, "partner")?,
        created_at: model.created_at,
    })
}

pub fn partner_to_active_model(new: &NewPartner, now: DateTime<Utc>) -> partner::ActiveModel {
    partner::ActiveModel {
        id: NotSet,
        name: Set(new.name.clone()),
        category: Set(new.category.clone()),
        commission_rate_bps: Set(new.commission_rate_bps),
        commission_terms: Set(new.commission_terms.clone()),
        destination_url: Set(new.destination_url.clone()),
        status: Set(new.status.to_string()),
        created_at: Set(now),
    }
}

// ============ Product ============

pub fn model_to_product(model: product::Model) -> Result<Product> {
    Ok(Product {
        id: model.id,
        partner_id: model.partner_id,
        name: model.name,
        category: model.category,
        commission_text: model.commission_text,
        slug: model.slug,
        featured: model.featured,
        status: parse_status(&model.status, "product")?,
        created_at: model.created_at,
    })
}

pub fn product_to_active_model(new: &NewProduct, now: DateTime<Utc>) -> product::ActiveModel {
    product::ActiveModel {
        id: NotSet,
        partner_id: Set(new.partner_id),
        name: Set(new.name.clone()),
        category: Set(new.category.clone()),
        commission_text: Set(new.commission_text.clone()),
        slug: Set(new.slug.clone()),
        featured: Set(new.featured),
        status: Set(new.status.to_string()),
        created_at: Set(now),
    }
}

// ============ Tracked link ============

pub fn model_to_link(model: tracked_link::Model) -> Result<TrackedLink> {
    Ok(TrackedLink {
        id: model.id,
        partner_id: model.partner_id,
        product_id: model.product_id,
        slug: model.slug,
        destination_url: model.destination_url,
        utm_source: model.utm_source,
        utm_medium: model.utm_medium,
        utm_campaign: model.utm_campaign,
        status: parse_status(&model.status, "link")?,
        last_used_at: model.last_used_at,
        created_at: model.created_at,
    })
}

pub fn link_to_active_model(new: &NewLink, now: DateTime<Utc>) -> tracked_link::ActiveModel {
    tracked_link::ActiveModel {
        id: NotSet,
        partner_id: Set(new.partner_id),
        product_id: Set(new.product_id),
        slug: Set(new.slug.clone()),
        destination_url: Set(new.destination_url.clone()),
        utm_source: Set(new.utm_source.clone()),
        utm_medium: Set(new.utm_medium.clone()),
        utm_campaign: Set(new.utm_campaign.clone()),
        status: Set(new.status.to_string()),
        last_used_at: Set(None),
        created_at: Set(now),
    }
}

// ============ Click event ============

pub fn model_to_click(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        link_id: model.link_id,
        clicked_at: model.clicked_at,
        referrer: model.referrer,
        is_conversion: model.is_conversion,
        conversion_value_minor: model.conversion_value_minor,
        request_id: model.request_id,
    }
}

pub fn click_to_active_model(new: &NewClick) -> click_event::ActiveModel {
    click_event::ActiveModel {
        id: NotSet,
        link_id: Set(new.link_id),
        clicked_at: Set(new.clicked_at),
        referrer: Set(new.referrer.clone()),
        is_conversion: Set(new.conversion_value_minor.is_some()),
        conversion_value_minor: Set(new.conversion_value_minor),
        request_id: Set(new.request_id.clone()),
    }
}

// ============ Conversion ============

pub fn model_to_conversion(model: conversion::Model) -> Result<Conversion> {
    Ok(Conversion {
        id: model.id,
        link_id: model.link_id,
        partner_id: model.partner_id,
        product_id: model.product_id,
        product_name: model.product_name,
        product_category: model.product_category,
        amount_minor: model.amount_minor,
        currency: model.currency,
        status: parse_status(&model.status, "conversion")?,
        notes: model.notes,
        version: model.version,
        created_at: model.created_at,
        confirmed_at: model.confirmed_at,
        reversed_at: model.reversed_at,
    })
}

pub fn conversion_to_active_model(
    new: &NewConversion,
    now: DateTime<Utc>,
) -> conversion::ActiveModel {
    conversion::ActiveModel {
        id: NotSet,
        link_id: Set(new.link_id),
        partner_id: Set(new.partner_id),
        product_id: Set(new.product_id),
        product_name: Set(new.product_name.clone()),
        product_category: Set(new.product_category.clone()),
        amount_minor: Set(new.amount_minor),
        currency: Set(new.currency.clone()),
        status: Set(ConversionStatus::Pending.to_string()),
        notes: Set(new.notes.clone()),
        version: Set(0),
        created_at: Set(now),
        confirmed_at: Set(None),
        reversed_at: Set(None),
    }
}

// ============ Payout ============

pub fn model_to_payout(model: payout::Model) -> Result<Payout> {
    Ok(Payout {
        id: model.id,
        partner_id: model.partner_id,
        period: model.period,
        clicks: model.clicks,
        conversions: model.conversions,
        revenue_minor: model.revenue_minor,
        commission_minor: model.commission_minor,
        status: parse_status(&model.status, "payout")?,
        transaction_ref: model.transaction_ref,
        notes: model.notes,
        created_at: model.created_at,
        settled_at: model.settled_at,
    })
}

pub fn payout_to_active_model(new: &NewPayout, now: DateTime<Utc>) -> payout::ActiveModel {
    payout::ActiveModel {
        id: NotSet,
        partner_id: Set(new.partner_id),
        period: Set(new.period.clone()),
        clicks: Set(new.clicks),
        conversions: Set(new.conversions),
        revenue_minor: Set(new.revenue_minor),
        commission_minor: Set(new.commission_minor),
        status: Set(PayoutStatus::Pending.to_string()),
        transaction_ref: Set(None),
        notes: Set(new.notes.clone()),
        created_at: Set(now),
        settled_at: Set(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{LinkStatus, PartnerStatus};
    use sea_orm::ActiveValue;

    #[test]
    fn link_model_converts_with_parsed_status() {
        let model = tracked_link::Model {
            id: 7,
            partner_id: 1,
            product_id: 2,
            slug: "spring-sale".to_string(),
            destination_url: "https://shop.example.com".to_string(),
            utm_source: Some("newsletter".to_string()),
            utm_medium: None,
            utm_campaign: None,
            status: "testing".to_string(),
            last_used_at: None,
            created_at: Utc::now(),
        };

        let link = model_to_link(model).unwrap();
        assert_eq!(link.status, LinkStatus::Testing);
        assert_eq!(link.slug, "spring-sale");
        assert!(link.last_used_at.is_none());
    }

    #[test]
    fn unknown_status_is_a_serialization_error() {
        let model = tracked_link::Model {
            id: 7,
            partner_id: 1,
            product_id: 2,
            slug: "x".to_string(),
            destination_url: "https://example.com".to_string(),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            status: "defunct".to_string(),
            last_used_at: None,
            created_at: Utc::now(),
        };

        let err = model_to_link(model).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
    }

    #[test]
    fn new_conversion_starts_pending_at_version_zero() {
        let new = NewConversion {
            link_id: 3,
            partner_id: 1,
            product_id: 2,
            product_name: "Espresso Grinder".to_string(),
            product_category: "kitchen".to_string(),
            amount_minor: 12_999,
            currency: "USD".to_string(),
            notes: None,
        };

        let active = conversion_to_active_model(&new, Utc::now());
        assert_eq!(active.status, ActiveValue::Set("pending".to_string()));
        assert_eq!(active.version, ActiveValue::Set(0));
        assert!(matches!(active.id, ActiveValue::NotSet));
    }

    #[test]
    fn click_with_value_is_flagged_as_conversion() {
        let new = NewClick {
            link_id: 3,
            clicked_at: Utc::now(),
            referrer: None,
            conversion_value_minor: Some(4_500),
            request_id: Some("req-1".to_string()),
        };
        let active = click_to_active_model(&new);
        assert_eq!(active.is_conversion, ActiveValue::Set(true));

        let plain = NewClick {
            link_id: 3,
            clicked_at: Utc::now(),
            referrer: None,
            conversion_value_minor: None,
            request_id: None,
        };
        let active = click_to_active_model(&plain);
        assert_eq!(active.is_conversion, ActiveValue::Set(false));
    }

    #[test]
    fn partner_model_round_trips_status() {
        let model = partner::Model {
            id: 1,
            name: "Acme Outdoors".to_string(),
            category: "outdoor".to_string(),
            commission_rate_bps: 850,
            commission_terms: "8.5% of net order value".to_string(),
            destination_url: "https://acme.example.com".to_string(),
            status: "active".to_string(),
            created_at: Utc::now(),
        };

        let partner = model_to_partner(model).unwrap();
        assert_eq!(partner.status, PartnerStatus::Active);
        assert_eq!(partner.commission_rate_bps, 850);
    }
}
