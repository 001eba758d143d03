//! Partner and product management endpoints

use actix_web::{HttpResponse, Responder, web};

use super::helpers::api_result;
use super::types::{
    GetPartnersQuery, PostPartner, PostProduct, PutPartner, PutProduct,
};
use crate::services::{CatalogService, PartnerDraft, ProductDraft};
use crate::storage::{PartnerStatus, ProductStatus};

// ============ Partners ============

pub async fn list_partners(
    query: web::Query<GetPartnersQuery>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.list_partners(query.status).await)
}

pub async fn create_partner(
    payload: web::Json<PostPartner>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    let payload = payload.into_inner();
    let draft = PartnerDraft {
        name: payload.name,
        category: payload.category,
        commission_rate_bps: payload.commission_rate_bps,
        commission_terms: payload.commission_terms.unwrap_or_default(),
        destination_url: payload.destination_url,
        status: payload.status.unwrap_or(PartnerStatus::Active),
    };
    api_result(catalog.create_partner(draft).await)
}

pub async fn get_partner(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.get_partner(path.into_inner()).await)
}

pub async fn update_partner(
    path: web::Path<i64>,
    payload: web::Json<PutPartner>,
    catalog: web::Data<CatalogService>,
) -> HttpResponse {
    let id = path.into_inner();
    let payload = payload.into_inner();

    let mut partner = match catalog.get_partner(id).await {
        Ok(partner) => partner,
        Err(e) => return super::helpers::error_from_ledger(&e),
    };
    if let Some(name) = payload.name {
        partner.name = name;
    }
    if let Some(category) = payload.category {
        partner.category = category;
    }
    if let Some(rate) = payload.commission_rate_bps {
        partner.commission_rate_bps = rate;
    }
    if let Some(terms) = payload.commission_terms {
        partner.commission_terms = terms;
    }
    if let Some(url) = payload.destination_url {
        partner.destination_url = url;
    }
    if let Some(status) = payload.status {
        partner.status = status;
    }

    api_result(catalog.update_partner(partner).await)
}

pub async fn archive_partner(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.archive_partner(path.into_inner()).await)
}

// ============ Products ============

pub async fn list_partner_products(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.list_products(Some(path.into_inner())).await)
}

pub async fn create_product(
    payload: web::Json<PostProduct>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    let payload = payload.into_inner();
    let draft = ProductDraft {
        partner_id: payload.partner_id,
        name: payload.name,
        category: payload.category,
        commission_text: payload.commission_text.unwrap_or_default(),
        slug: payload.slug,
        featured: payload.featured.unwrap_or(false),
        status: payload.status.unwrap_or(ProductStatus::Active),
    };
    api_result(catalog.create_product(draft).await)
}

pub async fn get_product(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.get_product(path.into_inner()).await)
}

pub async fn update_product(
    path: web::Path<i64>,
    payload: web::Json<PutProduct>,
    catalog: web::Data<CatalogService>,
) -> HttpResponse {
    let id = path.into_inner();
    let payload = payload.into_inner();

    let mut product = match catalog.get_product(id).await {
        Ok(product) => product,
        Err(e) => return super::helpers::error_from_ledger(&e),
    };
    if let Some(name) = payload.name {
        product.name = name;
    }
    if let Some(category) = payload.category {
        product.category = category;
    }
    if let Some(text) = payload.commission_text {
        product.commission_text = text;
    }
    if let Some(slug) = payload.slug {
        product.slug = slug;
    }
    if let Some(featured) = payload.featured {
        product.featured = featured;
    }
    if let Some(status) = payload.status {
        product.status = status;
    }

    api_result(catalog.update_product(product).await)
}

pub async fn delete_product(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    api_result(catalog.delete_product(path.into_inner()).await)
}
