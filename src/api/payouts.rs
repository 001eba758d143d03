//! Payout reconciliation endpoints

use actix_web::{Responder, web};

use super::helpers::api_result;
use super::types::{GetPayoutsQuery, PostPayout, PostPayoutStatus, PutPayout};
use crate::services::PayoutService;
use crate::storage::backend::PayoutFilter;

pub async fn build_payout(
    payload: web::Json<PostPayout>,
    payouts: web::Data<PayoutService>,
) -> impl Responder {
    api_result(payouts.build(payload.partner_id, &payload.period).await)
}

pub async fn get_payout(path: web::Path<i64>, payouts: web::Data<PayoutService>) -> impl Responder {
    api_result(payouts.get(path.into_inner()).await)
}

pub async fn list_payouts(
    query: web::Query<GetPayoutsQuery>,
    payouts: web::Data<PayoutService>,
) -> impl Responder {
    let filter = PayoutFilter {
        partner_id: query.partner_id,
        status: query.status,
        period: query.period.clone(),
    };
    api_result(payouts.list(&filter).await)
}

pub async fn update_payout(
    path: web::Path<i64>,
    payload: web::Json<PutPayout>,
    payouts: web::Data<PayoutService>,
) -> impl Responder {
    let payload = payload.into_inner();
    api_result(
        payouts
            .edit_details(path.into_inner(), payload.transaction_ref, payload.notes)
            .await,
    )
}

pub async fn set_payout_status(
    path: web::Path<i64>,
    payload: web::Json<PostPayoutStatus>,
    payouts: web::Data<PayoutService>,
) -> impl Responder {
    api_result(payouts.set_status(path.into_inner(), payload.status).await)
}
